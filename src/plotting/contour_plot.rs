//! Contour panel around the basepoint value `f0 = f(x0, y0)`, with the red ladder's colour
//! bar above it and the blue ladder's below.
use crate::errors::{RenderResult, drawing_error};
use crate::numerical::grid::{Grid2D, SampleWindow};
use crate::numerical::level_ladder::{LEVELS_PER_SIDE, LevelLadder};
use crate::plotting::colormaps::{above_level_color, below_level_color};
use crate::plotting::png_output::{PlotStyle, PngImage, render_png};
use crate::plotting::scene::{
    LEVEL_STROKE, ContourRole, LIME, OVERLAY_ALPHA, SINGLE_LEVEL_STROKE, Stroke,
    StyledContour, draw_center_marker, draw_contours, padded,
};
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;

/// One swatch per ladder level, centred on the level and `2 * half_gap` wide.
fn draw_level_bar(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    swatches: &[(f64, RGBColor)],
    half_gap: f64,
    annotate: bool,
) -> RenderResult<()> {
    let (Some(first), Some(last)) = (swatches.first(), swatches.last()) else {
        return Ok(());
    };
    let range = (first.0 - half_gap, last.0 + half_gap);
    let (lo, hi) = if range.1 > range.0 {
        range
    } else {
        padded(range, 0.0)
    };
    let mut builder = ChartBuilder::on(area);
    builder.margin(5);
    if annotate {
        builder.x_label_area_size(20);
    }
    let mut chart = builder
        .build_cartesian_2d(lo..hi, 0.0..1.0)
        .map_err(drawing_error)?;
    if annotate {
        chart
            .configure_mesh()
            .disable_mesh()
            .y_labels(0)
            .x_labels(6)
            .draw()
            .map_err(drawing_error)?;
    }
    chart
        .draw_series(swatches.iter().map(|&(level, color)| {
            Rectangle::new(
                [(level - half_gap, 0.0), (level + half_gap, 1.0)],
                color.filled(),
            )
        }))
        .map_err(drawing_error)?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContourScene {
    pub window: SampleWindow,
    pub grid: Grid2D,
    pub ladder: LevelLadder,
    /// in drawing order: below (outermost first), above, basepoint, overlays
    pub contours: Vec<StyledContour>,
    pub center: Option<(f64, f64)>,
    pub title: String,
}

impl ContourScene {
    /// `ladder.basepoint()` must be the (finite) value of `f` at the window centre.
    pub fn build(
        f: &EvaluableFunction,
        constraint: Option<&EvaluableFunction>,
        window: SampleWindow,
        ladder: LevelLadder,
        show_center: bool,
        level: Option<f64>,
    ) -> RenderResult<Self> {
        let grid = window.sample(f)?;
        let count = LEVELS_PER_SIDE as usize;
        let mut contours = Vec::with_capacity(2 * count + 3);
        for (idx, level) in ladder.below().into_iter().enumerate() {
            // below() is ascending, so the first entry is the farthest one
            let distance = count - idx;
            contours.push(StyledContour::trace(
                &grid,
                level,
                ContourRole::Below(distance as i32),
                Stroke::solid(below_level_color(distance, count), LEVEL_STROKE),
            ));
        }
        for (idx, level) in ladder.above().into_iter().enumerate() {
            let distance = idx + 1;
            contours.push(StyledContour::trace(
                &grid,
                level,
                ContourRole::Above(distance as i32),
                Stroke::solid(above_level_color(distance, count), LEVEL_STROKE),
            ));
        }
        contours.push(StyledContour::trace(
            &grid,
            ladder.basepoint(),
            ContourRole::Basepoint,
            Stroke::solid(BLACK, LEVEL_STROKE),
        ));
        if let Some(g) = constraint {
            let g_grid = window.sample(g)?;
            contours.push(StyledContour::trace(
                &g_grid,
                0.0,
                ContourRole::Constraint,
                Stroke {
                    color: BLACK,
                    alpha: OVERLAY_ALPHA,
                    width: LEVEL_STROKE,
                },
            ));
        }
        if let Some(level) = level {
            contours.push(StyledContour::trace(
                &grid,
                level,
                ContourRole::SingleLevel,
                Stroke::solid(LIME, SINGLE_LEVEL_STROKE),
            ));
        }
        let drawn = contours.iter().filter(|c| !c.is_empty()).count();
        debug!("{} of {} contour sets cross the window", drawn, contours.len());
        info!(
            "contour plot of '{}' around f0 = {} with step {}",
            f.source(),
            ladder.basepoint(),
            ladder.step()
        );
        Ok(ContourScene {
            window,
            grid,
            ladder,
            contours,
            center: show_center.then(|| window.center()),
            title: format!("level curves of {}", f.source()),
        })
    }

    /// Contour sets with the given role filter, e.g. all levels above the basepoint.
    pub fn with_role<P: Fn(&ContourRole) -> bool>(&self, pred: P) -> Vec<&StyledContour> {
        self.contours.iter().filter(|c| pred(&c.role)).collect()
    }

    /// Level and colour of every ladder level with the given role, ascending by level.
    pub fn level_swatches<P: Fn(&ContourRole) -> bool>(&self, pred: P) -> Vec<(f64, RGBColor)> {
        let mut swatches: Vec<(f64, RGBColor)> = self
            .with_role(pred)
            .into_iter()
            .map(|c| (c.level, c.stroke.color))
            .collect();
        swatches.sort_by(|a, b| a.0.total_cmp(&b.0));
        swatches
    }

    pub fn render(&self, style: &PlotStyle) -> RenderResult<PngImage> {
        render_png("contour", style, |root| {
            let bar_height = (style.height / 10).max(1);
            let (above_bar, rest) = root.split_vertically(bar_height);
            let (main, below_bar) =
                rest.split_vertically(style.height.saturating_sub(2 * bar_height));
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
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
                .map_err(drawing_error)?;
            if style.annotate {
                chart
                    .configure_mesh()
                    .light_line_style(BLACK.mix(0.05))
                    .x_desc("x")
                    .y_desc("y")
                    .draw()
                    .map_err(drawing_error)?;
            }
            draw_contours(&mut chart, &self.contours)?;
            if let Some(center) = self.center {
                draw_center_marker(&mut chart, center)?;
            }

            // neighbouring levels are 2 * step apart
            let half_gap = self.ladder.step();
            let above = self.level_swatches(|r| matches!(r, ContourRole::Above(_)));
            draw_level_bar(&above_bar, &above, half_gap, style.annotate)?;
            let below = self.level_swatches(|r| matches!(r, ContourRole::Below(_)));
            draw_level_bar(&below_bar, &below, half_gap, style.annotate)?;
            Ok(())
        })
    }
}
