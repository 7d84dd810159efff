//! Request/response surface of the toolkit.
//!
//! Every request is validated and rendered on its own; nothing is kept between calls.
//! Errors abort only the request at hand, recoverable conditions come back as
//! [`RenderWarning`]s inside an otherwise empty [`RenderResponse`].
use crate::errors::{RenderError, RenderResult, RenderWarning};
use crate::numerical::continuity::{CatalogFunction, ContinuityView};
use crate::numerical::grid::{SampleWindow, check_finite, check_positive};
use crate::numerical::level_ladder::LevelLadder;
use crate::plotting::colormaps::Colormap;
use crate::plotting::contour_plot::ContourScene;
use crate::plotting::heatmap::HeatmapScene;
use crate::plotting::png_output::{PlotStyle, PngImage};
use crate::plotting::surface3d::SurfaceMesh;
use crate::plotting::tangent_plot::TangentScene;
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use log::{info, warn};

const XY: [&str; 2] = ["x", "y"];

/// What a render hands back.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderResponse {
    pub images: Vec<PngImage>,
    pub surface: Option<SurfaceMesh>,
    /// e.g. `f(x0, y0) = 2`
    pub summary: Option<String>,
    /// prose accompanying the continuity panels
    pub explanation: Option<String>,
    pub warnings: Vec<RenderWarning>,
}

impl RenderResponse {
    fn skipped(warning: RenderWarning) -> Self {
        warn!("render skipped: {}", warning);
        RenderResponse {
            warnings: vec![warning],
            ..Default::default()
        }
    }
}

/// Anything that can be rendered into a [`RenderResponse`].
pub trait RenderRequest {
    /// short name of the request kind, used for logs and file names
    fn kind(&self) -> &'static str;
    fn render(&self, style: &PlotStyle) -> RenderResult<RenderResponse>;
}

/// `%.6g`-style text for a value, integral values without decimals.
pub fn format_basepoint(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value == value.trunc() {
        return format!("{:.0}", value);
    }
    // rounding to six significant digits can carry into the next decade
    let sci = format!("{:.5e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };
    if !(-4..6).contains(&exponent) {
        let mantissa = strip_zeros(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else {
        let decimals = (5 - exponent) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn square_window(
    center: (f64, f64),
    half_width: f64,
    resolution: Option<usize>,
) -> RenderResult<SampleWindow> {
    let window = SampleWindow::new(center.0, center.1, half_width)?;
    match resolution {
        Some(n) => window.with_resolution(n),
        None => Ok(window),
    }
}

fn parse_optional(text: &Option<String>, vars: &[&str]) -> RenderResult<Option<EvaluableFunction>> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(Some(EvaluableFunction::parse(text, vars)?)),
        _ => Ok(None),
    }
}

/// The extra level is drawn only when asked for; it defaults to 0.
fn requested_level(show_level: bool, level: Option<f64>) -> RenderResult<Option<f64>> {
    if !show_level {
        return Ok(None);
    }
    let level = level.unwrap_or(0.0);
    check_finite("level", level)?;
    Ok(Some(level))
}

/// Value at the window centre, or the warning that stops the render.
fn basepoint(f: &EvaluableFunction, center: (f64, f64)) -> RenderResult<Result<f64, RenderWarning>> {
    let value = f.call(&[center.0, center.1])?;
    if value.is_finite() {
        Ok(Ok(value))
    } else {
        Ok(Err(RenderWarning::NonFiniteBasepoint {
            x0: center.0,
            y0: Some(center.1),
            value,
        }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderHeatmapRequest {
    pub expression: String,
    /// zero set drawn over the heatmap
    pub constraint_expression: Option<String>,
    pub center: (f64, f64),
    pub half_width: f64,
    pub colormap: Colormap,
    pub show_center: bool,
    pub show_level: bool,
    pub level: Option<f64>,
    /// also build the 3-D surface description and picture
    pub surface: bool,
    /// overrides the default resolution policy
    pub resolution: Option<usize>,
}

impl Default for RenderHeatmapRequest {
    fn default() -> Self {
        RenderHeatmapRequest {
            expression: "exp(x*y + x**2)".to_string(),
            constraint_expression: None,
            center: (0.0, 0.0),
            half_width: 1.0,
            colormap: Colormap::Viridis,
            show_center: false,
            show_level: false,
            level: None,
            surface: false,
            resolution: None,
        }
    }
}

impl RenderRequest for RenderHeatmapRequest {
    fn kind(&self) -> &'static str {
        "heatmap"
    }

    fn render(&self, style: &PlotStyle) -> RenderResult<RenderResponse> {
        let window = square_window(self.center, self.half_width, self.resolution)?;
        let level = requested_level(self.show_level, self.level)?;
        let f = EvaluableFunction::parse(&self.expression, &XY)?;
        let g = parse_optional(&self.constraint_expression, &XY)?;
        let f0 = match basepoint(&f, self.center)? {
            Ok(f0) => f0,
            Err(warning) => return Ok(RenderResponse::skipped(warning)),
        };
        let scene =
            HeatmapScene::build(&f, g.as_ref(), window, self.colormap, self.show_center, level)?;
        let mut images = vec![scene.render(style)?];
        let surface = if self.surface {
            let mesh = SurfaceMesh::from_grid(&scene.grid, self.colormap);
            images.push(mesh.render(style)?);
            Some(mesh)
        } else {
            None
        };
        info!("heatmap request done, {} image(s)", images.len());
        Ok(RenderResponse {
            images,
            surface,
            summary: Some(format!("f(x0, y0) = {}", format_basepoint(f0))),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderContourRequest {
    pub expression: String,
    /// zero set drawn over the level curves
    pub constraint_expression: Option<String>,
    pub center: (f64, f64),
    pub half_width: f64,
    /// half the spacing between neighbouring ladder levels
    pub step: f64,
    pub show_center: bool,
    pub show_level: bool,
    pub level: Option<f64>,
    pub resolution: Option<usize>,
}

impl Default for RenderContourRequest {
    fn default() -> Self {
        RenderContourRequest {
            expression: "exp(x*y + x**2)".to_string(),
            constraint_expression: None,
            center: (0.0, 0.0),
            half_width: 1.0,
            step: 0.01,
            show_center: false,
            show_level: false,
            level: None,
            resolution: None,
        }
    }
}

impl RenderRequest for RenderContourRequest {
    fn kind(&self) -> &'static str {
        "contour"
    }

    fn render(&self, style: &PlotStyle) -> RenderResult<RenderResponse> {
        check_positive("step", self.step)?;
        let window = square_window(self.center, self.half_width, self.resolution)?;
        let level = requested_level(self.show_level, self.level)?;
        let f = EvaluableFunction::parse(&self.expression, &XY)?;
        let g = parse_optional(&self.constraint_expression, &XY)?;
        let f0 = match basepoint(&f, self.center)? {
            Ok(f0) => f0,
            Err(warning) => return Ok(RenderResponse::skipped(warning)),
        };
        let ladder = LevelLadder::new(f0, self.step)?;
        let scene = ContourScene::build(&f, g.as_ref(), window, ladder, self.show_center, level)?;
        Ok(RenderResponse {
            images: vec![scene.render(style)?],
            summary: Some(format!("f(x0, y0) = {}", format_basepoint(f0))),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderTangentRequest {
    pub expression: String,
    pub x0: f64,
    /// secant offset; half of `half_width` when absent
    pub h: Option<f64>,
    pub half_width: f64,
}

impl Default for RenderTangentRequest {
    fn default() -> Self {
        RenderTangentRequest {
            expression: "x**2".to_string(),
            x0: 1.0,
            h: None,
            half_width: 1.0,
        }
    }
}

impl RenderRequest for RenderTangentRequest {
    fn kind(&self) -> &'static str {
        "tangent"
    }

    fn render(&self, style: &PlotStyle) -> RenderResult<RenderResponse> {
        check_positive("half_width", self.half_width)?;
        let h = self.h.unwrap_or(self.half_width / 2.0);
        let f = EvaluableFunction::parse(&self.expression, &["x"])?;
        let scene = TangentScene::build(&f, self.x0, h, self.half_width)?;
        if let Some(warning) = scene.lines.warning() {
            return Ok(RenderResponse::skipped(warning));
        }
        let ts = &scene.lines;
        Ok(RenderResponse {
            images: vec![scene.render(style)?],
            summary: Some(format!(
                "f(x0) = {}, secant slope = {}, f'(x0) = {} with f'(x) = {}",
                format_basepoint(ts.fx0),
                format_basepoint(ts.secant_slope),
                format_basepoint(ts.tangent_slope),
                ts.derivative
            )),
            ..Default::default()
        })
    }
}

/// How the continuity view picks its function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionChoice {
    Named(CatalogFunction),
    Seed(u64),
}

impl FunctionChoice {
    pub fn resolve(&self) -> CatalogFunction {
        match self {
            FunctionChoice::Named(f) => *f,
            FunctionChoice::Seed(seed) => CatalogFunction::from_seed(*seed),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderContinuityRequest {
    pub function: FunctionChoice,
    pub x0: f64,
    pub epsilon: f64,
    pub radius: f64,
}

impl Default for RenderContinuityRequest {
    fn default() -> Self {
        RenderContinuityRequest {
            function: FunctionChoice::Named(CatalogFunction::Polynomial),
            x0: 0.0,
            epsilon: 0.5,
            radius: 1.0,
        }
    }
}

impl RenderRequest for RenderContinuityRequest {
    fn kind(&self) -> &'static str {
        "continuity"
    }

    fn render(&self, style: &PlotStyle) -> RenderResult<RenderResponse> {
        let function = self.function.resolve();
        let view = ContinuityView::compute(function, self.x0, self.epsilon, self.radius)?;
        if let Some(warning) = view.warning() {
            return Ok(RenderResponse::skipped(warning));
        }
        Ok(RenderResponse {
            images: vec![view.render(style)?],
            summary: Some(format!(
                "{}, f(x0) = {}",
                function.label(),
                format_basepoint(view.fx0)
            )),
            explanation: Some(view.explanation()),
            ..Default::default()
        })
    }
}

impl From<CatalogFunction> for FunctionChoice {
    fn from(f: CatalogFunction) -> Self {
        FunctionChoice::Named(f)
    }
}

impl std::str::FromStr for FunctionChoice {
    type Err = RenderError;

    /// a catalog identifier, or `seed:<u64>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().strip_prefix("seed:") {
            Some(seed) => seed
                .trim()
                .parse::<u64>()
                .map(FunctionChoice::Seed)
                .map_err(|_| RenderError::invalid("function", s, "seed must be an unsigned integer")),
            None => Ok(FunctionChoice::Named(CatalogFunction::by_name(s)?)),
        }
    }
}
