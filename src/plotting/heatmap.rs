//! Heatmap panel: symlog-coloured cells, a linear colour bar below them, the constraint zero set
//! in translucent white, the optional lime level and the centre marker.
use crate::errors::{RenderResult, drawing_error};
use crate::numerical::grid::{Grid2D, SampleWindow};
use crate::plotting::colormaps::Colormap;
use crate::plotting::png_output::{PlotStyle, PngImage, render_png};
use crate::plotting::scene::{
    LEVEL_STROKE, ContourRole, LIME, OVERLAY_ALPHA, SINGLE_LEVEL_STROKE, Stroke, StyledContour,
    draw_center_marker, draw_contours, padded,
};
use crate::plotting::symlog::SymLogNorm;
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use log::info;
use plotters::prelude::*;

/// number of colour stripes in the colour bar
const COLORBAR_STRIPES: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapScene {
    pub window: SampleWindow,
    pub grid: Grid2D,
    pub colormap: Colormap,
    /// `None` when the grid has no finite value
    pub norm: Option<SymLogNorm>,
    pub overlays: Vec<StyledContour>,
    pub center: Option<(f64, f64)>,
    pub title: String,
}

impl HeatmapScene {
    pub fn build(
        f: &EvaluableFunction,
        constraint: Option<&EvaluableFunction>,
        window: SampleWindow,
        colormap: Colormap,
        show_center: bool,
        level: Option<f64>,
    ) -> RenderResult<Self> {
        let grid = window.sample(f)?;
        let norm = SymLogNorm::for_grid(&grid);
        let mut overlays = Vec::new();
        if let Some(g) = constraint {
            let g_grid = window.sample(g)?;
            overlays.push(StyledContour::trace(
                &g_grid,
                0.0,
                ContourRole::Constraint,
                Stroke {
                    color: WHITE,
                    alpha: OVERLAY_ALPHA,
                    width: LEVEL_STROKE,
                },
            ));
        }
        if let Some(level) = level {
            overlays.push(StyledContour::trace(
                &grid,
                level,
                ContourRole::SingleLevel,
                Stroke::solid(LIME, SINGLE_LEVEL_STROKE),
            ));
        }
        info!(
            "heatmap of '{}' on {}x{} grid, colour range {:?}",
            f.source(),
            grid.nx(),
            grid.ny(),
            norm.map(|n| (n.vmin(), n.vmax()))
        );
        Ok(HeatmapScene {
            window,
            grid,
            colormap,
            norm,
            overlays,
            center: show_center.then(|| window.center()),
            title: format!("f(x, y) = {}", f.source()),
        })
    }

    /// Colour of a value under the panel's norm; `None` leaves the cell blank.
    pub fn color_of(&self, z: f64) -> Option<RGBColor> {
        let t = self.norm?.normalize(z)?;
        Some(self.colormap.color_at(t))
    }

    /// The linear colour bar spans the finite range of the grid.
    pub fn colorbar_range(&self) -> Option<(f64, f64)> {
        self.norm.map(|n| (n.vmin(), n.vmax()))
    }

    pub fn render(&self, style: &PlotStyle) -> RenderResult<PngImage> {
        render_png("heatmap", style, |root| {
            let bar_height = (style.height / 8).max(1);
            let (main, bar) = root.split_vertically(style.height.saturating_sub(bar_height));
            let (dx, dy) = self.grid.spacing();
            let (x_lo, x_hi) = self.window.x_range();
            let (y_lo, y_hi) = self.window.y_range();

            let mut builder = ChartBuilder::on(&main);
            builder.margin(10);
            if style.annotate {
                builder
                    .caption(&self.title, ("sans-serif", 22))
                    .x_label_area_size(35)
                    .y_label_area_size(50);
            }
            let mut chart = builder
                .build_cartesian_2d(
                    (x_lo - dx / 2.0)..(x_hi + dx / 2.0),
                    (y_lo - dy / 2.0)..(y_hi + dy / 2.0),
                )
                .map_err(drawing_error)?;
            if style.annotate {
                chart
                    .configure_mesh()
                    .disable_mesh()
                    .x_desc("x")
                    .y_desc("y")
                    .draw()
                    .map_err(drawing_error)?;
            }
            chart
                .draw_series(self.grid.z.indexed_iter().filter_map(|((i, j), &z)| {
                    let color = self.color_of(z)?;
                    let (x, y) = (self.grid.xs[j], self.grid.ys[i]);
                    Some(Rectangle::new(
                        [(x - dx / 2.0, y - dy / 2.0), (x + dx / 2.0, y + dy / 2.0)],
                        color.filled(),
                    ))
                }))
                .map_err(drawing_error)?;
            draw_contours(&mut chart, &self.overlays)?;
            if let Some(center) = self.center {
                draw_center_marker(&mut chart, center)?;
            }

            if let Some(range) = self.colorbar_range() {
                let (lo, hi) = if range.1 > range.0 {
                    range
                } else {
                    padded(range, 0.0)
                };
                let mut builder = ChartBuilder::on(&bar);
                builder.margin(10);
                if style.annotate {
                    builder.x_label_area_size(25);
                }
                let mut bar_chart = builder
                    .build_cartesian_2d(lo..hi, 0.0..1.0)
                    .map_err(drawing_error)?;
                if style.annotate {
                    bar_chart
                        .configure_mesh()
                        .disable_mesh()
                        .y_labels(0)
                        .draw()
                        .map_err(drawing_error)?;
                }
                // the bar itself is linear in the value, unlike the cells
                let stripe = (hi - lo) / COLORBAR_STRIPES as f64;
                bar_chart
                    .draw_series((0..COLORBAR_STRIPES).map(|k| {
                        let v0 = lo + stripe * k as f64;
                        let t = (k as f64 + 0.5) / COLORBAR_STRIPES as f64;
                        Rectangle::new(
                            [(v0, 0.0), (v0 + stripe, 1.0)],
                            self.colormap.color_at(t).filled(),
                        )
                    }))
                    .map_err(drawing_error)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f2(text: &str) -> EvaluableFunction {
        EvaluableFunction::parse(text, &["x", "y"]).unwrap()
    }

    fn window(d: f64, n: usize) -> SampleWindow {
        SampleWindow::new(0.0, 0.0, d)
            .unwrap()
            .with_resolution(n)
            .unwrap()
    }

    #[test]
    fn test_constraint_overlay_is_translucent_white_unit_circle() {
        let f = f2("exp(x*y + x**2)");
        let g = f2("x**2 + y**2 - 1");
        let scene =
            HeatmapScene::build(&f, Some(&g), window(1.5, 301), Colormap::Viridis, true, None)
                .unwrap();
        assert_eq!(scene.overlays.len(), 1);
        let overlay = &scene.overlays[0];
        assert_eq!(overlay.role, ContourRole::Constraint);
        assert_eq!(overlay.stroke.color, WHITE);
        assert_eq!(overlay.stroke.alpha, 0.5);
        assert_eq!(overlay.lines.len(), 1);
        for (x, y) in &overlay.lines[0].points {
            assert!(((x * x + y * y).sqrt() - 1.0).abs() < 1e-3);
        }
        assert_eq!(scene.center, Some((0.0, 0.0)));
    }

    #[test]
    fn test_constraint_does_not_change_colour_range() {
        let f = f2("x + y");
        let with = HeatmapScene::build(
            &f,
            Some(&f2("100*x**2 + y**2 - 1")),
            window(1.0, 21),
            Colormap::Greys,
            false,
            None,
        )
        .unwrap();
        let without =
            HeatmapScene::build(&f, None, window(1.0, 21), Colormap::Greys, false, None).unwrap();
        assert_eq!(with.colorbar_range(), Some((-2.0, 2.0)));
        assert_eq!(with.colorbar_range(), without.colorbar_range());
        assert_eq!(with.center, None);
    }

    #[test]
    fn test_single_level_is_thick_lime() {
        let scene = HeatmapScene::build(
            &f2("x**2 + y**2"),
            None,
            window(1.0, 51),
            Colormap::Autumn,
            false,
            Some(0.25),
        )
        .unwrap();
        let overlay = &scene.overlays[0];
        assert_eq!(overlay.role, ContourRole::SingleLevel);
        assert_eq!(overlay.stroke.color, LIME);
        assert_eq!(overlay.stroke.width, SINGLE_LEVEL_STROKE);
        assert!(!overlay.is_empty());
    }

    #[test]
    fn test_non_finite_cells_are_blank() {
        let scene = HeatmapScene::build(
            &f2("ln(x)"),
            None,
            window(1.0, 11),
            Colormap::Viridis,
            false,
            None,
        )
        .unwrap();
        assert!(scene.color_of(f64::NAN).is_none());
        assert!(scene.color_of(f64::NEG_INFINITY).is_none());
        assert!(scene.color_of(0.0).is_some());
    }

    #[test]
    fn test_render_plain_png() {
        let scene = HeatmapScene::build(
            &f2("x*y"),
            Some(&f2("x - y")),
            window(1.0, 30),
            Colormap::Coolwarm,
            true,
            Some(0.1),
        )
        .unwrap();
        let image = scene.render(&PlotStyle::plain(160, 120)).unwrap();
        assert!(image.is_png());
        assert_eq!(image.name, "heatmap");
    }

    #[test]
    fn test_render_without_finite_values() {
        let scene = HeatmapScene::build(
            &f2("ln(-1 - x**2) + y"),
            None,
            window(1.0, 10),
            Colormap::Viridis,
            false,
            None,
        )
        .unwrap();
        assert_eq!(scene.norm, None);
        assert!(scene.render(&PlotStyle::plain(80, 60)).unwrap().is_png());
    }
}
