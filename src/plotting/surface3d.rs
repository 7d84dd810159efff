//! 3-D surface description of a sampled grid and its static rendering.
use crate::errors::{RenderError, RenderResult, drawing_error};
use crate::numerical::grid::Grid2D;
use crate::plotting::colormaps::Colormap;
use crate::plotting::png_output::{PlotStyle, PngImage, render_png};
use crate::plotting::scene::padded;
use crate::plotting::symlog::SymLogNorm;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

/// at most this many vertices per axis in the static picture
pub const MAX_SURFACE_SIDE: usize = 60;

/// Vertex grid plus colour scale, ready for an interactive viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    /// `z[i][j]` at `(x[j], y[i])`; `None` where the function is not finite
    pub z: Vec<Vec<Option<f64>>>,
    pub colormap: Colormap,
    /// finite range of `z`, absent when nothing is finite
    pub color_min: Option<f64>,
    pub color_max: Option<f64>,
}

impl SurfaceMesh {
    pub fn from_grid(grid: &Grid2D, colormap: Colormap) -> Self {
        let z = grid
            .z
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .map(|&v| if v.is_finite() { Some(v) } else { None })
                    .collect()
            })
            .collect();
        let range = grid.finite_min_max();
        SurfaceMesh {
            x: grid.xs.clone(),
            y: grid.ys.clone(),
            z,
            colormap,
            color_min: range.map(|r| r.0),
            color_max: range.map(|r| r.1),
        }
    }

    pub fn to_json(&self) -> RenderResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Reads a mesh back; `z` must hold one row of `x.len()` values per `y`.
    pub fn from_json(text: &str) -> RenderResult<Self> {
        let mesh: SurfaceMesh = serde_json::from_str(text)?;
        mesh.check_shape()?;
        Ok(mesh)
    }

    pub fn check_shape(&self) -> RenderResult<()> {
        if self.z.len() != self.y.len() {
            return Err(RenderError::invalid(
                "z",
                format!("{} rows", self.z.len()),
                &format!("expected {} rows, one per y", self.y.len()),
            ));
        }
        if let Some((i, row)) = self
            .z
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != self.x.len())
        {
            return Err(RenderError::invalid(
                "z",
                format!("row {} of {} values", i, row.len()),
                &format!("expected {} values, one per x", self.x.len()),
            ));
        }
        Ok(())
    }

    /// Row and column indices of an evenly thinned sub-grid.
    fn thinned(len: usize) -> Vec<usize> {
        if len <= MAX_SURFACE_SIDE {
            return (0..len).collect();
        }
        let stride = len.div_ceil(MAX_SURFACE_SIDE);
        let mut idx: Vec<usize> = (0..len).step_by(stride).collect();
        if idx.last() != Some(&(len - 1)) {
            idx.push(len - 1);
        }
        idx
    }

    /// Static perspective view; faces touching missing values are not drawn.
    pub fn render(&self, style: &PlotStyle) -> RenderResult<PngImage> {
        self.check_shape()?;
        render_png("surface", style, |root| {
            let (Some(z_lo), Some(z_hi)) = (self.color_min, self.color_max) else {
                return Ok(());
            };
            let (Some(&x_lo), Some(&x_hi)) = (self.x.first(), self.x.last()) else {
                return Ok(());
            };
            let (Some(&y_lo), Some(&y_hi)) = (self.y.first(), self.y.last()) else {
                return Ok(());
            };
            let (z_lo, z_hi) = if z_hi > z_lo {
                (z_lo, z_hi)
            } else {
                padded((z_lo, z_hi), 0.0)
            };
            let norm = SymLogNorm::new(z_lo, z_hi)?;

            let mut builder = ChartBuilder::on(root);
            builder.margin(10);
            if style.annotate {
                builder.caption("surface", ("sans-serif", 22));
            }
            // plotters' vertical axis is y; the function value goes there
            let mut chart = builder
                .build_cartesian_3d(x_lo..x_hi, z_lo..z_hi, y_lo..y_hi)
                .map_err(drawing_error)?;
            chart.with_projection(|mut pb| {
                pb.yaw = 0.5;
                pb.scale = 0.9;
                pb.into_matrix()
            });
            if style.annotate {
                chart
                    .configure_axes()
                    .light_grid_style(BLACK.mix(0.15))
                    .max_light_lines(3)
                    .draw()
                    .map_err(drawing_error)?;
            }

            let rows = Self::thinned(self.y.len());
            let cols = Self::thinned(self.x.len());
            let mut faces = Vec::new();
            for r in rows.windows(2) {
                for c in cols.windows(2) {
                    let corners = [(r[0], c[0]), (r[0], c[1]), (r[1], c[1]), (r[1], c[0])];
                    let values: Option<Vec<f64>> =
                        corners.iter().map(|&(i, j)| self.z[i][j]).collect();
                    let Some(values) = values else {
                        continue;
                    };
                    let mean = values.iter().sum::<f64>() / 4.0;
                    let color = self.colormap.color_at(norm.normalize(mean).unwrap_or(0.0));
                    let points: Vec<(f64, f64, f64)> = corners
                        .iter()
                        .zip(values.iter())
                        .map(|(&(i, j), &v)| (self.x[j], v, self.y[i]))
                        .collect();
                    faces.push(Polygon::new(points, color.mix(0.8).filled()));
                }
            }
            chart.draw_series(faces).map_err(drawing_error)?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::grid::SampleWindow;
    use crate::symbolic::symbolic_lambdify::EvaluableFunction;

    fn grid_of(text: &str, n: usize) -> Grid2D {
        let f = EvaluableFunction::parse(text, &["x", "y"]).unwrap();
        SampleWindow::new(0.0, 0.0, 1.0)
            .unwrap()
            .with_resolution(n)
            .unwrap()
            .sample(&f)
            .unwrap()
    }

    #[test]
    fn test_non_finite_values_become_missing() {
        let mesh = SurfaceMesh::from_grid(&grid_of("1/x + y", 3), Colormap::Viridis);
        assert_eq!(mesh.z.len(), 3);
        assert!(mesh.z.iter().all(|row| row[1].is_none()));
        assert_eq!(mesh.z[0][0], Some(-2.0));
        assert_eq!((mesh.color_min, mesh.color_max), (Some(-2.0), Some(2.0)));
    }

    #[test]
    fn test_json_keeps_missing_values_as_null() {
        let mesh = SurfaceMesh::from_grid(&grid_of("ln(x) + 0*y", 3), Colormap::Greys);
        let json = mesh.to_json().unwrap();
        assert!(json.contains("null"));
        assert!(json.contains("\"colormap\":\"greys\""));
        let back = SurfaceMesh::from_json(&json).unwrap();
        assert_eq!(back.z, mesh.z);
        assert_eq!(back.colormap, Colormap::Greys);
    }

    #[test]
    fn test_ragged_json_is_rejected() {
        let mesh = SurfaceMesh::from_grid(&grid_of("x + y", 3), Colormap::Viridis);
        let mut short_row = mesh.clone();
        short_row.z[1].pop();
        let mut missing_row = mesh.clone();
        missing_row.z.pop();
        for bad in [short_row, missing_row] {
            let json = bad.to_json().unwrap();
            assert!(matches!(
                SurfaceMesh::from_json(&json),
                Err(RenderError::InvalidParameter { ref name, .. }) if name == "z"
            ));
            assert!(bad.render(&PlotStyle::plain(40, 40)).is_err());
        }
    }

    #[test]
    fn test_thinning_keeps_the_edges() {
        let idx = SurfaceMesh::thinned(500);
        assert!(idx.len() <= MAX_SURFACE_SIDE + 1);
        assert_eq!(idx[0], 0);
        assert_eq!(*idx.last().unwrap(), 499);
        assert_eq!(SurfaceMesh::thinned(7), (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_render_plain_png() {
        let mesh = SurfaceMesh::from_grid(&grid_of("x**2 - y**2", 80), Colormap::Coolwarm);
        assert!(mesh.render(&PlotStyle::plain(120, 100)).unwrap().is_png());
        let empty = SurfaceMesh::from_grid(&grid_of("ln(-1 - x**2 - y**2)", 4), Colormap::Viridis);
        assert!(empty.render(&PlotStyle::plain(40, 40)).unwrap().is_png());
    }
}
