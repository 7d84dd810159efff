//! Two-panel epsilon/delta picture: the wide view and the zoom on `(x0 - r, x0 + r)`.
use crate::errors::{RenderResult, drawing_error};
use crate::numerical::continuity::ContinuityView;
use crate::numerical::grid::Curve1D;
use crate::plotting::png_output::{PlotStyle, PngImage, render_png};
use crate::plotting::scene::{draw_dashed, draw_runs, padded};
use plotters::coord::Shift;
use plotters::prelude::*;

const ORANGE: RGBColor = RGBColor(255, 165, 0);
const BAND_GREEN: RGBColor = RGBColor(0, 128, 0);

/// y limits of a panel: the function's clip if it has one, otherwise the finite
/// range of the curve together with the epsilon band.
pub fn panel_y_range(view: &ContinuityView, curve: &Curve1D) -> (f64, f64) {
    if let Some(clip) = view.y_clip {
        return clip;
    }
    let (band_lo, band_hi) = view.band;
    let mut lo = band_lo;
    let mut hi = band_hi;
    if let Some((c_lo, c_hi)) = curve.finite_y_range() {
        if lo.is_finite() {
            lo = lo.min(c_lo);
            hi = hi.max(c_hi);
        } else {
            lo = c_lo;
            hi = c_hi;
        }
    }
    if !(lo.is_finite() && hi.is_finite()) {
        return (-1.0, 1.0);
    }
    padded((lo, hi), 0.1)
}

fn clipped_runs(curve: &Curve1D, (lo, hi): (f64, f64)) -> Vec<Vec<(f64, f64)>> {
    // points far outside the limits are dropped so poles do not draw vertical strokes
    let span = hi - lo;
    let masked = Curve1D {
        xs: curve.xs.clone(),
        ys: curve
            .ys
            .iter()
            .map(|&y| {
                if y < lo - span || y > hi + span {
                    f64::NAN
                } else {
                    y
                }
            })
            .collect(),
    };
    masked.finite_runs()
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    view: &ContinuityView,
    curve: &Curve1D,
    zoomed: bool,
    style: &PlotStyle,
) -> RenderResult<()> {
    let x_lo = curve.xs.first().copied().unwrap_or(view.x0 - 1.0);
    let x_hi = curve.xs.last().copied().unwrap_or(view.x0 + 1.0);
    let (y_lo, y_hi) = panel_y_range(view, curve);
    let mut builder = ChartBuilder::on(area);
    builder.margin(10);
    if style.annotate {
        let caption = if zoomed {
            format!("zoom: r = {}", view.radius)
        } else {
            view.function.label().to_string()
        };
        builder
            .caption(caption, ("sans-serif", 18))
            .x_label_area_size(30)
            .y_label_area_size(45);
    }
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
    draw_runs(&mut chart, clipped_runs(curve, (y_lo, y_hi)), BLUE.stroke_width(2))?;
    if zoomed {
        draw_runs(
            &mut chart,
            clipped_runs(&view.segment, (y_lo, y_hi)),
            ORANGE.stroke_width(4),
        )?;
    }
    if view.fx0.is_finite() {
        for y in [view.band.0, view.band.1] {
            draw_dashed(&mut chart, (x_lo, y), (x_hi, y), 40, BAND_GREEN.stroke_width(1))?;
        }
        chart
            .draw_series(std::iter::once(Circle::new(
                (view.x0, view.fx0),
                5,
                RED.filled(),
            )))
            .map_err(drawing_error)?;
    }
    draw_dashed(
        &mut chart,
        (view.x0, y_lo),
        (view.x0, y_hi),
        40,
        RED.stroke_width(1),
    )?;
    Ok(())
}

impl ContinuityView {
    pub fn render(&self, style: &PlotStyle) -> RenderResult<PngImage> {
        render_png("continuity", style, |root| {
            let panels = root.split_evenly((1, 2));
            draw_panel(&panels[0], self, &self.wide, false, style)?;
            draw_panel(&panels[1], self, &self.zoom, true, style)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::continuity::CatalogFunction;

    #[test]
    fn test_tangent_uses_fixed_limits() {
        let view = ContinuityView::compute(CatalogFunction::Tangent, 0.0, 0.5, 1.0).unwrap();
        assert_eq!(panel_y_range(&view, &view.wide), (-100.0, 100.0));
    }

    #[test]
    fn test_limits_contain_curve_and_band() {
        let view = ContinuityView::compute(CatalogFunction::Sine, 0.0, 2.0, 1.0).unwrap();
        let (lo, hi) = panel_y_range(&view, &view.wide);
        assert!(lo < -2.0 && hi > 2.0);
        let view = ContinuityView::compute(CatalogFunction::Exponential, 0.0, 0.1, 1.0).unwrap();
        let (lo, hi) = panel_y_range(&view, &view.wide);
        assert!(lo < 2.0f64.exp().recip() && hi > 2.0f64.exp());
    }

    #[test]
    fn test_render_every_catalog_entry() {
        for function in CatalogFunction::all() {
            let view = ContinuityView::compute(function, 0.0, 0.5, 1.0).unwrap();
            let image = view.render(&PlotStyle::plain(200, 100)).unwrap();
            assert!(image.is_png(), "{}", function);
        }
    }
}
