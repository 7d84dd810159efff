//! Curve with the secant through `x0` and `x0 + h` and the tangent at `x0`.
use crate::errors::{RenderError, RenderResult, drawing_error};
use crate::numerical::grid::{Curve1D, check_positive, sample_curve};
use crate::numerical::tangent_secant::TangentSecant;
use crate::plotting::png_output::{PlotStyle, PngImage, render_png};
use crate::plotting::scene::{draw_dashed, draw_runs, padded};
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use plotters::prelude::*;

pub const CURVE_SAMPLES: usize = 500;
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const GREEN_LINE: RGBColor = RGBColor(0, 128, 0);

#[derive(Debug, Clone, PartialEq)]
pub struct TangentScene {
    pub curve: Curve1D,
    pub lines: TangentSecant,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub title: String,
}

impl TangentScene {
    /// `0 < |h| <= half_width`; the curve is sampled on `[x0 - d, x0 + d]`.
    pub fn build(f: &EvaluableFunction, x0: f64, h: f64, half_width: f64) -> RenderResult<Self> {
        check_positive("half_width", half_width)?;
        if h.abs() > half_width {
            return Err(RenderError::invalid(
                "h",
                h,
                "the secant offset must not exceed the half-width",
            ));
        }
        let lines = TangentSecant::compute(f, x0, h)?;
        let x_range = (x0 - half_width, x0 + half_width);
        let curve = sample_curve(f, x_range.0, x_range.1, CURVE_SAMPLES)?;
        let (lo, hi) = curve.finite_y_range().unwrap_or((lines.fx0, lines.fx0));
        Ok(TangentScene {
            curve,
            lines,
            x_range,
            y_range: padded((lo, hi), 0.1),
            title: format!("f(x) = {}", f.source()),
        })
    }

    pub fn render(&self, style: &PlotStyle) -> RenderResult<PngImage> {
        render_png("tangent", style, |root| {
            let mut builder = ChartBuilder::on(root);
            builder.margin(10);
            if style.annotate {
                builder
                    .caption(&self.title, ("sans-serif", 22))
                    .x_label_area_size(35)
                    .y_label_area_size(50);
            }
            let (x_lo, x_hi) = self.x_range;
            let (y_lo, y_hi) = self.y_range;
            let mut chart = builder
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(drawing_error)?;
            if style.annotate {
                chart
                    .configure_mesh()
                    .x_desc("x")
                    .y_desc("f(x)")
                    .draw()
                    .map_err(drawing_error)?;
            }
            draw_runs(&mut chart, self.curve.finite_runs(), BLUE.stroke_width(2))?;
            let ts = &self.lines;
            draw_dashed(
                &mut chart,
                (x_lo, ts.secant_at(x_lo)),
                (x_hi, ts.secant_at(x_hi)),
                30,
                ORANGE.stroke_width(2),
            )?;
            draw_dashed(
                &mut chart,
                (x_lo, ts.tangent_at(x_lo)),
                (x_hi, ts.tangent_at(x_hi)),
                90,
                GREEN_LINE.stroke_width(2),
            )?;
            chart
                .draw_series(
                    [(ts.x0, ts.fx0), (ts.x0 + ts.h, ts.fx0_h)]
                        .into_iter()
                        .filter(|(_, y)| y.is_finite())
                        .map(|p| Circle::new(p, 5, RED.filled())),
                )
                .map_err(drawing_error)?;
            if style.annotate {
                chart
                    .draw_series(std::iter::once(Text::new(
                        format!(
                            "secant slope {:.6}, tangent slope {:.6}",
                            ts.secant_slope, ts.tangent_slope
                        ),
                        (x_lo + 0.05 * (x_hi - x_lo), y_hi - 0.05 * (y_hi - y_lo)),
                        ("sans-serif", 16),
                    )))
                    .map_err(drawing_error)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn f(text: &str) -> EvaluableFunction {
        EvaluableFunction::parse(text, &["x"]).unwrap()
    }

    #[test]
    fn test_scene_ranges() {
        let scene = TangentScene::build(&f("x**2"), 1.0, 0.5, 2.0).unwrap();
        assert_eq!(scene.x_range, (-1.0, 3.0));
        assert_eq!(scene.curve.xs.len(), CURVE_SAMPLES);
        assert_relative_eq!(scene.curve.xs[CURVE_SAMPLES - 1], 3.0);
        // y in [0, 9] padded by 10 %
        assert!(scene.y_range.0 < 0.0 && scene.y_range.1 > 9.0);
        assert_relative_eq!(scene.lines.secant_slope, 2.5);
    }

    #[test]
    fn test_offset_bounded_by_half_width() {
        assert!(matches!(
            TangentScene::build(&f("x"), 0.0, 3.0, 2.0),
            Err(RenderError::InvalidParameter { ref name, .. }) if name == "h"
        ));
        assert!(TangentScene::build(&f("x"), 0.0, -2.0, 2.0).is_ok());
        assert!(TangentScene::build(&f("x"), 0.0, 0.5, 0.0).is_err());
    }

    #[test]
    fn test_render_plain_png() {
        let scene = TangentScene::build(&f("sin(x)"), 0.3, 0.4, 1.0).unwrap();
        assert!(scene.render(&PlotStyle::plain(100, 80)).unwrap().is_png());
    }
}
