//! Symmetric-logarithmic colour normalisation.
//!
//! `T(a) = a * c` for `|a| <= linthresh` and
//! `T(a) = sign(a) * linthresh * (c + log_base(|a| / linthresh))` outside, with
//! `c = linscale / (1 - 1/base)`. Both pieces agree at the threshold. Values are then
//! mapped linearly from `[T(vmin), T(vmax)]` onto `[0, 1]`.
use crate::errors::{RenderError, RenderResult};
use crate::numerical::grid::{Grid2D, check_finite, check_positive};

pub const LINTHRESH: f64 = 0.5;
pub const LINSCALE: f64 = 1.0;
pub const BASE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymLogNorm {
    vmin: f64,
    vmax: f64,
    linthresh: f64,
    linscale: f64,
    base: f64,
}

impl SymLogNorm {
    /// Norm over `[vmin, vmax]` with the default threshold, scale and base.
    pub fn new(vmin: f64, vmax: f64) -> RenderResult<Self> {
        Self::with_params(vmin, vmax, LINTHRESH, LINSCALE, BASE)
    }

    pub fn with_params(
        vmin: f64,
        vmax: f64,
        linthresh: f64,
        linscale: f64,
        base: f64,
    ) -> RenderResult<Self> {
        check_finite("vmin", vmin)?;
        check_finite("vmax", vmax)?;
        check_positive("linthresh", linthresh)?;
        check_positive("linscale", linscale)?;
        check_positive("base", base)?;
        if base == 1.0 {
            return Err(RenderError::invalid("base", base, "logarithm base must differ from 1"));
        }
        if vmin > vmax {
            return Err(RenderError::invalid("vmin", vmin, "must not exceed vmax"));
        }
        Ok(SymLogNorm {
            vmin,
            vmax,
            linthresh,
            linscale,
            base,
        })
    }

    /// Norm spanning the finite values of a grid; `None` when nothing is finite.
    pub fn for_grid(grid: &Grid2D) -> Option<Self> {
        let (min, max) = grid.finite_min_max()?;
        SymLogNorm::new(min, max).ok()
    }

    pub fn vmin(&self) -> f64 {
        self.vmin
    }

    pub fn vmax(&self) -> f64 {
        self.vmax
    }

    fn linscale_adj(&self) -> f64 {
        self.linscale / (1.0 - 1.0 / self.base)
    }

    pub fn transform(&self, a: f64) -> f64 {
        let c = self.linscale_adj();
        if a.abs() <= self.linthresh {
            a * c
        } else {
            a.signum() * self.linthresh * (c + (a.abs() / self.linthresh).log(self.base))
        }
    }

    /// Position of `z` in `[0, 1]`; `None` for non-finite `z`.
    /// A degenerate range (`vmin == vmax`) maps everything to 0.
    pub fn normalize(&self, z: f64) -> Option<f64> {
        if !z.is_finite() {
            return None;
        }
        let lo = self.transform(self.vmin);
        let hi = self.transform(self.vmax);
        if hi <= lo {
            return Some(0.0);
        }
        Some(((self.transform(z) - lo) / (hi - lo)).clamp(0.0, 1.0))
    }
}
