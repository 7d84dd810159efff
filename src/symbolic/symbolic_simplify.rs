//! # Symbolic Expression Simplification Module
//!
//! Derivatives produced by `diff` are full of `0 * ...`, `1 * ...` and constant
//! subtrees. This module folds them away so derivative formulas stay readable in
//! the tangent summary and cheap to evaluate.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: arithmetic and elementary functions on numerical constants
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x ^ 1 = x, x - x = 0
//! 3. **Power Rules**: x * x = x^2, x^a * x^b = x^(a+b)
//! 4. **Constant Collection**: (c1 * e) * c2 = (c1 * c2) * e

use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// Bottom-up rewrite applying constant folding and algebraic identities.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
                    (Expr::Const(z), _) if *z == 0.0 => rhs, // 0 + x = x
                    (_, Expr::Const(z)) if *z == 0.0 => lhs, // x + 0 = x
                    _ if lhs == rhs => {
                        Expr::Mul(Box::new(Expr::Const(2.0)), Box::new(lhs)).simplify_()
                    }
                    _ => Expr::Add(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Sub(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
                    (_, Expr::Const(z)) if *z == 0.0 => lhs, // x - 0 = x
                    (Expr::Const(z), _) if *z == 0.0 => {
                        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(rhs)).simplify_()
                    }
                    _ if lhs == rhs => Expr::Const(0.0),
                    _ => Expr::Sub(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Mul(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
                    (Expr::Const(z), _) | (_, Expr::Const(z)) if *z == 0.0 => Expr::Const(0.0),
                    (Expr::Const(o), _) if *o == 1.0 => rhs,
                    (_, Expr::Const(o)) if *o == 1.0 => lhs,
                    (Expr::Pow(base1, exp1), Expr::Pow(base2, exp2)) if base1 == base2 => {
                        let new_exp = Expr::Add(exp1.clone(), exp2.clone()).simplify_();
                        Expr::Pow(base1.clone(), Box::new(new_exp))
                    }
                    (Expr::Var(v1), Expr::Var(v2)) if v1 == v2 => {
                        Expr::Pow(Box::new(lhs.clone()), Box::new(Expr::Const(2.0)))
                    }
                    // keep constants on the left: e * c = c * e
                    (_, Expr::Const(c)) => {
                        Expr::Mul(Box::new(Expr::Const(*c)), Box::new(lhs)).simplify_()
                    }
                    (Expr::Const(c), Expr::Mul(inner_lhs, inner_rhs)) => {
                        match (inner_lhs.as_ref(), inner_rhs.as_ref()) {
                            (Expr::Const(c1), _) => {
                                Expr::Mul(Box::new(Expr::Const(c * c1)), inner_rhs.clone())
                                    .simplify_()
                            }
                            (_, Expr::Const(c1)) => {
                                Expr::Mul(Box::new(Expr::Const(c * c1)), inner_lhs.clone())
                                    .simplify_()
                            }
                            _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
                        }
                    }
                    _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Div(lhs, rhs) => {
                let lhs = lhs.simplify_();
                let rhs = rhs.simplify_();
                match (&lhs, &rhs) {
                    (Expr::Const(a), Expr::Const(b)) if *b != 0.0 => Expr::Const(a / b),
                    (Expr::Const(z), _) if *z == 0.0 && !rhs.is_zero() => Expr::Const(0.0),
                    (_, Expr::Const(o)) if *o == 1.0 => lhs,
                    (Expr::Var(v1), Expr::Var(v2)) if v1 == v2 => Expr::Const(1.0),
                    _ => Expr::Div(Box::new(lhs), Box::new(rhs)),
                }
            }
            Expr::Pow(base, exp) => {
                let base = base.simplify_();
                let exp = exp.simplify_();
                match (&base, &exp) {
                    (Expr::Const(a), Expr::Const(b)) => Expr::Const(a.powf(*b)),
                    (_, Expr::Const(z)) if *z == 0.0 => Expr::Const(1.0),
                    (_, Expr::Const(o)) if *o == 1.0 => base,
                    _ => Expr::Pow(Box::new(base), Box::new(exp)),
                }
            }
            Expr::Exp(e) => fold(e, Expr::Exp, f64::exp),
            Expr::Ln(e) => fold(e, Expr::Ln, f64::ln),
            Expr::sin(e) => fold(e, Expr::sin, f64::sin),
            Expr::cos(e) => fold(e, Expr::cos, f64::cos),
            Expr::tg(e) => fold(e, Expr::tg, f64::tan),
            Expr::ctg(e) => fold(e, Expr::ctg, |v| 1.0 / v.tan()),
            Expr::arcsin(e) => fold(e, Expr::arcsin, f64::asin),
            Expr::arccos(e) => fold(e, Expr::arccos, f64::acos),
            Expr::arctg(e) => fold(e, Expr::arctg, f64::atan),
            Expr::arcctg(e) => fold(e, Expr::arcctg, |v| PI / 2.0 - v.atan()),
            Expr::Abs(e) => fold(e, Expr::Abs, f64::abs),
            Expr::Heaviside(e) => fold(e, Expr::Heaviside, heaviside),
        }
    }

    /// Public interface for expression simplification.
    pub fn simplify(&self) -> Expr {
        self.simplify_()
    }
}

/// unit step with the value 0 at the origin
pub(crate) fn heaviside(v: f64) -> f64 {
    if v.is_nan() {
        f64::NAN
    } else if v > 0.0 {
        1.0
    } else {
        0.0
    }
}

fn fold(arg: &Expr, rebuild: fn(Box<Expr>) -> Expr, eval: impl Fn(f64) -> f64) -> Expr {
    match arg.simplify_() {
        Expr::Const(v) => {
            let folded = eval(v);
            // never fold into a non-finite constant, keep the formula readable instead
            if folded.is_finite() {
                Expr::Const(folded)
            } else {
                rebuild(Box::new(Expr::Const(v)))
            }
        }
        other => rebuild(Box::new(other)),
    }
}
