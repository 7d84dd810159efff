//! Catalog of single-variable functions for the epsilon/delta continuity view.
//!
//! Selection is explicit: a caller names a function or passes a seed; the same seed
//! always picks the same function. Plotting ranges come from the per-function
//! [`FunctionMetadata`] record instead of being hard-wired into the renderer.
use crate::errors::{RenderError, RenderResult, RenderWarning};
use crate::numerical::grid::{Curve1D, check_finite, check_positive, sample_curve};
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// samples per panel of the continuity view
pub const PANEL_SAMPLES: usize = 500;
/// samples on the highlighted segment `(x0 - r, x0 + r)`
pub const SEGMENT_SAMPLES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum CatalogFunction {
    Polynomial,
    Sine,
    Cosine,
    Exponential,
    Logarithm,
    Tangent,
    Step,
}

/// Plotting hints attached to a catalog function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunctionMetadata {
    /// how far the view reaches left and right of `x0`, in multiples of the view radius
    pub safe_domain_hint: (f64, f64),
    pub default_half_width_scale: f64,
    /// fixed y limits for functions with poles
    pub y_clip: Option<(f64, f64)>,
}

impl CatalogFunction {
    pub fn all() -> Vec<CatalogFunction> {
        CatalogFunction::iter().collect()
    }

    /// Looks a function up by identifier (`"sine"`, `"tangent"`, ...).
    pub fn by_name(name: &str) -> RenderResult<CatalogFunction> {
        CatalogFunction::from_str(name.trim()).map_err(|_| {
            let known: Vec<String> = CatalogFunction::iter().map(|f| f.to_string()).collect();
            RenderError::invalid(
                "function",
                name,
                &format!("unknown catalog function, expected one of {}", known.join(", ")),
            )
        })
    }

    /// Deterministic choice driven by a caller-supplied seed.
    pub fn from_seed(seed: u64) -> CatalogFunction {
        let all = CatalogFunction::all();
        let mut rng = StdRng::seed_from_u64(seed);
        all[rng.random_range(0..all.len())]
    }

    pub fn label(&self) -> &'static str {
        match self {
            CatalogFunction::Polynomial => "Polynomial: x^2 - 3x + 2",
            CatalogFunction::Sine => "Sine: sin(x)",
            CatalogFunction::Cosine => "Cosine: cos(x)",
            CatalogFunction::Exponential => "Exponential: exp(x)",
            CatalogFunction::Logarithm => "Logarithm: log(x+1)",
            CatalogFunction::Tangent => "Tangent: tan(x)",
            CatalogFunction::Step => "Step: heaviside(x)",
        }
    }

    pub fn expression(&self) -> &'static str {
        match self {
            CatalogFunction::Polynomial => "x**2 - 3*x + 2",
            CatalogFunction::Sine => "sin(x)",
            CatalogFunction::Cosine => "cos(x)",
            CatalogFunction::Exponential => "exp(x)",
            CatalogFunction::Logarithm => "log(x + 1)",
            CatalogFunction::Tangent => "tan(x)",
            CatalogFunction::Step => "heaviside(x)",
        }
    }

    pub fn metadata(&self) -> FunctionMetadata {
        let hint = match self {
            CatalogFunction::Logarithm => (0.8, 3.2),
            CatalogFunction::Tangent => (FRAC_PI_2, FRAC_PI_2),
            _ => (2.0, 2.0),
        };
        FunctionMetadata {
            safe_domain_hint: hint,
            default_half_width_scale: 1.0,
            y_clip: match self {
                CatalogFunction::Tangent => Some((-100.0, 100.0)),
                _ => None,
            },
        }
    }

    /// The logarithm is only shown for `x > 0`.
    pub fn in_domain(&self, x: f64) -> bool {
        match self {
            CatalogFunction::Logarithm => x > 0.0,
            _ => true,
        }
    }

    pub fn function(&self) -> RenderResult<EvaluableFunction> {
        Ok(EvaluableFunction::parse(self.expression(), &["x"])?)
    }

    /// `f(x)` with points outside the display domain mapped to NaN.
    pub fn value_at(&self, f: &EvaluableFunction, x: f64) -> RenderResult<f64> {
        if self.in_domain(x) {
            Ok(f.call(&[x])?)
        } else {
            Ok(f64::NAN)
        }
    }

    pub(crate) fn sample(
        &self,
        f: &EvaluableFunction,
        start: f64,
        end: f64,
        n: usize,
    ) -> RenderResult<Curve1D> {
        let mut curve = sample_curve(f, start, end, n)?;
        for (x, y) in curve.xs.iter().zip(curve.ys.iter_mut()) {
            if !self.in_domain(*x) {
                *y = f64::NAN;
            }
        }
        Ok(curve)
    }
}

/// Everything the two continuity panels show.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuityView {
    pub function: CatalogFunction,
    pub x0: f64,
    pub fx0: f64,
    pub epsilon: f64,
    pub radius: f64,
    pub wide: Curve1D,
    pub zoom: Curve1D,
    pub segment: Curve1D,
    /// `(f(x0) - epsilon, f(x0) + epsilon)`
    pub band: (f64, f64),
    pub y_clip: Option<(f64, f64)>,
}

impl ContinuityView {
    pub fn compute(
        function: CatalogFunction,
        x0: f64,
        epsilon: f64,
        radius: f64,
    ) -> RenderResult<Self> {
        check_finite("x0", x0)?;
        check_positive("epsilon", epsilon)?;
        check_positive("r", radius)?;
        let f = function.function()?;
        let meta = function.metadata();
        let (left, right) = meta.safe_domain_hint;
        let scale = meta.default_half_width_scale;
        let wide = function.sample(&f, x0 - left * scale, x0 + right * scale, PANEL_SAMPLES)?;
        let zoom = function.sample(
            &f,
            x0 - left * scale * radius,
            x0 + right * scale * radius,
            PANEL_SAMPLES,
        )?;
        let segment = function.sample(&f, x0 - radius, x0 + radius, SEGMENT_SAMPLES)?;
        let fx0 = function.value_at(&f, x0)?;
        info!(
            "continuity view of {} at x0 = {}: f(x0) = {}",
            function, x0, fx0
        );
        Ok(ContinuityView {
            function,
            x0,
            fx0,
            epsilon,
            radius,
            wide,
            zoom,
            segment,
            band: (fx0 - epsilon, fx0 + epsilon),
            y_clip: meta.y_clip,
        })
    }

    /// The textual explanation shown next to the panels.
    pub fn explanation(&self) -> String {
        format!(
            "The graph shows f(x) = {} around the point x0 = {}. \
             The epsilon neighbourhood of width {} is the interval ({}, {}) on the y-axis. \
             The highlighted segment on the x-axis is the interval ({}, {}). \
             f is continuous at x0 when for every epsilon > 0 there is a delta > 0 such that \
             |x - x0| < delta implies |f(x) - f(x0)| < epsilon.",
            self.function.expression(),
            self.x0,
            self.epsilon,
            self.band.0,
            self.band.1,
            self.x0 - self.radius,
            self.x0 + self.radius
        )
    }

    pub fn warning(&self) -> Option<RenderWarning> {
        if self.fx0.is_finite() {
            None
        } else {
            Some(RenderWarning::NonFiniteBasepoint {
                x0: self.x0,
                y0: None,
                value: self.fx0,
            })
        }
    }

    /// Whether every finite sample of the highlighted segment stays inside the band.
    pub fn segment_within_band(&self) -> bool {
        self.segment
            .ys
            .iter()
            .filter(|y| y.is_finite())
            .all(|y| *y > self.band.0 && *y < self.band.1)
    }
}
