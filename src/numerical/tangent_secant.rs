//! Tangent line as the limit of secant lines through `(x0, f(x0))` and `(x0+h, f(x0+h))`.
use crate::errors::{RenderError, RenderResult, RenderWarning};
use crate::numerical::grid::check_finite;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_lambdify::EvaluableFunction;
use log::info;

#[derive(Debug, Clone, PartialEq)]
pub struct TangentSecant {
    pub x0: f64,
    pub h: f64,
    pub fx0: f64,
    pub fx0_h: f64,
    pub secant_slope: f64,
    pub tangent_slope: f64,
    /// simplified analytical derivative, for display
    pub derivative: Expr,
}

impl TangentSecant {
    /// `f` must be a function of `x` alone.
    pub fn compute(f: &EvaluableFunction, x0: f64, h: f64) -> RenderResult<Self> {
        check_finite("x0", x0)?;
        check_finite("h", h)?;
        if h == 0.0 {
            return Err(RenderError::invalid("h", h, "the secant offset must not be zero"));
        }
        let derivative = f.derivative("x")?;
        let fx0 = f.call(&[x0])?;
        let fx0_h = f.call(&[x0 + h])?;
        let tangent_slope = derivative.call(&[x0])?;
        let secant_slope = (fx0_h - fx0) / h;
        info!(
            "f'({}) = {}, secant slope with h = {}: {}",
            x0, tangent_slope, h, secant_slope
        );
        Ok(TangentSecant {
            x0,
            h,
            fx0,
            fx0_h,
            secant_slope,
            tangent_slope,
            derivative: derivative.expr().simplify(),
        })
    }

    /// Why the picture cannot be drawn, if it cannot.
    pub fn warning(&self) -> Option<RenderWarning> {
        if !self.fx0.is_finite() {
            Some(RenderWarning::NonFiniteBasepoint {
                x0: self.x0,
                y0: None,
                value: self.fx0,
            })
        } else if !self.tangent_slope.is_finite() {
            Some(RenderWarning::NonFiniteSlope {
                x0: self.x0,
                value: self.tangent_slope,
            })
        } else {
            None
        }
    }

    pub fn secant_at(&self, x: f64) -> f64 {
        self.fx0 + self.secant_slope * (x - self.x0)
    }

    pub fn tangent_at(&self, x: f64) -> f64 {
        self.fx0 + self.tangent_slope * (x - self.x0)
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
    fn test_parabola() {
        let ts = TangentSecant::compute(&f("x**2"), 1.0, 0.5).unwrap();
        assert_eq!(ts.fx0, 1.0);
        assert_eq!(ts.fx0_h, 2.25);
        assert_relative_eq!(ts.secant_slope, 2.5);
        assert_relative_eq!(ts.tangent_slope, 2.0);
        assert_relative_eq!(ts.tangent_at(2.0), 3.0);
        assert_relative_eq!(ts.secant_at(1.5), 2.25);
        assert!(ts.warning().is_none());
        assert_eq!(ts.derivative.to_string(), "(2 * x)");
    }

    #[test]
    fn test_secant_slope_approaches_tangent() {
        let g = f("sin(x)");
        let errors: Vec<f64> = [0.5, 0.1, 0.01]
            .iter()
            .map(|&h| {
                let ts = TangentSecant::compute(&g, 0.3, h).unwrap();
                (ts.secant_slope - ts.tangent_slope).abs()
            })
            .collect();
        assert!(errors[0] > errors[1] && errors[1] > errors[2]);
        assert!(errors[2] < 1e-2);
    }

    #[test]
    fn test_negative_offset_is_allowed() {
        let ts = TangentSecant::compute(&f("x**3"), 1.0, -0.5).unwrap();
        assert_relative_eq!(ts.secant_slope, (1.0 - 0.125) / 0.5);
    }

    #[test]
    fn test_warnings() {
        let ts = TangentSecant::compute(&f("ln(x)"), 0.0, 0.5).unwrap();
        assert!(matches!(
            ts.warning(),
            Some(RenderWarning::NonFiniteBasepoint { y0: None, .. })
        ));
        let ts = TangentSecant::compute(&f("abs(x)"), 0.0, 0.5).unwrap();
        assert!(matches!(ts.warning(), Some(RenderWarning::NonFiniteSlope { .. })));
    }

    #[test]
    fn test_zero_offset_is_rejected() {
        assert!(matches!(
            TangentSecant::compute(&f("x"), 0.0, 0.0),
            Err(RenderError::InvalidParameter { .. })
        ));
    }
}
