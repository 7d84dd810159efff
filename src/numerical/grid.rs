//! Sampling windows and sampled grids.
//!
//! A [`SampleWindow`] is the square `[x0-d, x0+d] x [y0-d, y0+d]` with `n` samples per
//! axis; sampling it with a two-variable [`EvaluableFunction`] gives a [`Grid2D`] whose
//! rows follow `y` and columns follow `x`, `z[[i, j]] = f(xs[j], ys[i])`.
use crate::errors::{RenderError, RenderResult};
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use crate::symbolic::utils::linspace;
use itertools::{Itertools, MinMaxResult};
use log::{debug, info};
use ndarray::{Array1, Array2};

pub const MIN_RESOLUTION: usize = 100;
pub const MAX_RESOLUTION: usize = 500;
/// samples per unit of half-width before clamping
pub const SAMPLES_PER_UNIT: f64 = 500.0;

/// `clamp(trunc(500 * d), 100, 500)`
pub fn resolution_for(half_width: f64) -> usize {
    let raw = (SAMPLES_PER_UNIT * half_width).trunc();
    if raw.is_nan() || raw < MIN_RESOLUTION as f64 {
        MIN_RESOLUTION
    } else if raw > MAX_RESOLUTION as f64 {
        MAX_RESOLUTION
    } else {
        raw as usize
    }
}

pub(crate) fn check_finite(name: &str, value: f64) -> RenderResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RenderError::invalid(name, value, "must be a finite number"))
    }
}

pub(crate) fn check_positive(name: &str, value: f64) -> RenderResult<()> {
    check_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(RenderError::invalid(name, value, "must be greater than zero"))
    }
}

/// Square sampling window around a centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleWindow {
    x0: f64,
    y0: f64,
    half_width: f64,
    resolution: usize,
}

impl SampleWindow {
    /// Window with the default resolution policy, see [`resolution_for`].
    pub fn new(x0: f64, y0: f64, half_width: f64) -> RenderResult<Self> {
        check_finite("x0", x0)?;
        check_finite("y0", y0)?;
        check_positive("half_width", half_width)?;
        Ok(SampleWindow {
            x0,
            y0,
            half_width,
            resolution: resolution_for(half_width),
        })
    }

    /// Overrides the number of samples per axis, `2..=MAX_RESOLUTION`.
    pub fn with_resolution(mut self, resolution: usize) -> RenderResult<Self> {
        if resolution < 2 {
            return Err(RenderError::invalid(
                "resolution",
                resolution,
                "at least two samples per axis are needed",
            ));
        }
        if resolution > MAX_RESOLUTION {
            return Err(RenderError::invalid(
                "resolution",
                resolution,
                &format!("at most {} samples per axis", MAX_RESOLUTION),
            ));
        }
        self.resolution = resolution;
        Ok(self)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }

    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x0 - self.half_width, self.x0 + self.half_width)
    }

    pub fn y_range(&self) -> (f64, f64) {
        (self.y0 - self.half_width, self.y0 + self.half_width)
    }

    pub fn xs(&self) -> Vec<f64> {
        let (start, end) = self.x_range();
        linspace(start, end, self.resolution)
    }

    pub fn ys(&self) -> Vec<f64> {
        let (start, end) = self.y_range();
        linspace(start, end, self.resolution)
    }

    /// Evaluates a function of `(x, y)` on the outer-product grid.
    pub fn sample(&self, f: &EvaluableFunction) -> RenderResult<Grid2D> {
        let xs = self.xs();
        let ys = self.ys();
        let shape = (ys.len(), xs.len());
        let mesh_x = Array2::from_shape_fn(shape, |(_, j)| xs[j]);
        let mesh_y = Array2::from_shape_fn(shape, |(i, _)| ys[i]);
        let z = f.eval_arrays(&[mesh_x.view(), mesh_y.view()])?;
        let grid = Grid2D { xs, ys, z };
        debug!(
            "sampled '{}' on {}x{} grid, {} non-finite values",
            f.source(),
            shape.0,
            shape.1,
            grid.non_finite_count()
        );
        Ok(grid)
    }
}

/// Values of a function on a rectangular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid2D {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// shape `(ys.len(), xs.len())`
    pub z: Array2<f64>,
}

impl Grid2D {
    pub fn nx(&self) -> usize {
        self.xs.len()
    }

    pub fn ny(&self) -> usize {
        self.ys.len()
    }

    /// Minimum and maximum over the finite values, `None` when there are none.
    pub fn finite_min_max(&self) -> Option<(f64, f64)> {
        match self
            .z
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .minmax_by(|a, b| a.total_cmp(b))
        {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }

    pub fn non_finite_count(&self) -> usize {
        self.z.iter().filter(|v| !v.is_finite()).count()
    }

    /// Grid spacing along x and y (0 for single-sample axes).
    pub fn spacing(&self) -> (f64, f64) {
        let step = |axis: &[f64]| {
            if axis.len() < 2 {
                0.0
            } else {
                (axis[axis.len() - 1] - axis[0]) / (axis.len() - 1) as f64
            }
        };
        (step(&self.xs), step(&self.ys))
    }
}

/// Samples of a single-variable function.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve1D {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl Curve1D {
    /// Finite y range, `None` when nothing is finite.
    pub fn finite_y_range(&self) -> Option<(f64, f64)> {
        match self
            .ys
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .minmax_by(|a, b| a.total_cmp(b))
        {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }

    /// Splits the curve at non-finite samples into drawable runs.
    pub fn finite_runs(&self) -> Vec<Vec<(f64, f64)>> {
        let mut runs = Vec::new();
        let mut current: Vec<(f64, f64)> = Vec::new();
        for (&x, &y) in self.xs.iter().zip(self.ys.iter()) {
            if y.is_finite() {
                current.push((x, y));
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }
}

/// `n` samples of a function of `x` on `[start, end]`.
pub fn sample_curve(
    f: &EvaluableFunction,
    start: f64,
    end: f64,
    n: usize,
) -> RenderResult<Curve1D> {
    check_finite("start", start)?;
    check_finite("end", end)?;
    if start >= end {
        return Err(RenderError::invalid(
            "end",
            end,
            "the interval end must exceed its start",
        ));
    }
    let xs = Array1::from_vec(linspace(start, end, n));
    let ys = f.eval_arrays(&[xs.view()])?;
    info!("sampled '{}' at {} points on [{}, {}]", f.source(), n, start, end);
    Ok(Curve1D {
        xs: xs.to_vec(),
        ys: ys.to_vec(),
    })
}
