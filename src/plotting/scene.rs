//! What a panel shows, independent of pixels: styled contour sets and markers,
//! plus the helpers that put them on a plotters chart.
use crate::errors::{RenderResult, drawing_error};
use crate::numerical::grid::Grid2D;
use crate::numerical::marching_squares::{ContourLine, contour_lines};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

pub type Chart2D<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// stroke width of ladder levels, the basepoint level and the constraint
pub const LEVEL_STROKE: f64 = 1.5;
/// the caller's extra level stands out at three times the normal weight
pub const SINGLE_LEVEL_STROKE: f64 = 3.0 * LEVEL_STROKE;
pub const OVERLAY_ALPHA: f64 = 0.5;
pub const MARKER_SIZE: i32 = 10;
pub const LIME: RGBColor = RGBColor(0, 255, 0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: RGBColor,
    pub alpha: f64,
    pub width: f64,
}

impl Stroke {
    pub fn solid(color: RGBColor, width: f64) -> Self {
        Stroke {
            color,
            alpha: 1.0,
            width,
        }
    }

    pub fn shape_style(&self) -> ShapeStyle {
        self.color
            .mix(self.alpha)
            .stroke_width(self.width.round().max(1.0) as u32)
    }
}

/// Why a contour set is on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContourRole {
    /// `k`-th level above the basepoint
    Above(i32),
    Basepoint,
    /// `k`-th level below the basepoint, `k` counted outward from 1
    Below(i32),
    /// zero set of the constraint function
    Constraint,
    /// the single extra level asked for by the caller
    SingleLevel,
}

/// All lines of one level drawn with one stroke.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledContour {
    pub role: ContourRole,
    pub level: f64,
    pub stroke: Stroke,
    pub lines: Vec<ContourLine>,
}

impl StyledContour {
    pub fn trace(grid: &Grid2D, level: f64, role: ContourRole, stroke: Stroke) -> Self {
        StyledContour {
            role,
            level,
            stroke,
            lines: contour_lines(grid, level),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

pub(crate) fn draw_contours<DB: DrawingBackend>(
    chart: &mut Chart2D<'_, DB>,
    contours: &[StyledContour],
) -> RenderResult<()> {
    for contour in contours {
        let style = contour.stroke.shape_style();
        chart
            .draw_series(
                contour
                    .lines
                    .iter()
                    .map(|line| PathElement::new(line.points.clone(), style)),
            )
            .map_err(drawing_error)?;
    }
    Ok(())
}

/// The `x` glyph at the window centre.
pub(crate) fn draw_center_marker<DB: DrawingBackend>(
    chart: &mut Chart2D<'_, DB>,
    center: (f64, f64),
) -> RenderResult<()> {
    chart
        .draw_series(std::iter::once(Cross::new(
            center,
            MARKER_SIZE,
            BLACK.stroke_width(2),
        )))
        .map_err(drawing_error)?;
    Ok(())
}

/// Polyline runs of a sampled curve, split where it is not finite.
pub(crate) fn draw_runs<DB: DrawingBackend>(
    chart: &mut Chart2D<'_, DB>,
    runs: Vec<Vec<(f64, f64)>>,
    style: ShapeStyle,
) -> RenderResult<()> {
    chart
        .draw_series(runs.into_iter().map(|run| PathElement::new(run, style)))
        .map_err(drawing_error)?;
    Ok(())
}

/// Dashed straight segment from `a` to `b`.
pub(crate) fn draw_dashed<DB: DrawingBackend>(
    chart: &mut Chart2D<'_, DB>,
    a: (f64, f64),
    b: (f64, f64),
    dashes: usize,
    style: ShapeStyle,
) -> RenderResult<()> {
    let n = dashes.max(1);
    let at = |s: f64| (a.0 + s * (b.0 - a.0), a.1 + s * (b.1 - a.1));
    chart
        .draw_series((0..n).map(|i| {
            let s0 = i as f64 / n as f64;
            let s1 = (i as f64 + 0.6) / n as f64;
            PathElement::new(vec![at(s0), at(s1)], style)
        }))
        .map_err(drawing_error)?;
    Ok(())
}

/// Range padded by a fraction of its width; degenerate ranges get a unit pad.
pub(crate) fn padded(range: (f64, f64), fraction: f64) -> (f64, f64) {
    let (lo, hi) = range;
    let pad = if hi > lo { (hi - lo) * fraction } else { 1.0 };
    (lo - pad, hi + pad)
}
