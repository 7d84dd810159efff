//! LAMBDIFICATION - converting symbolic expressions into evaluable functions.
//!
//! `Expr::compile` turns a tree into a [`Lambda`] whose variables are resolved to
//! argument positions once, so evaluation is a plain recursive match with no name
//! lookups. [`EvaluableFunction`] bundles the user text, the tree and the compiled
//! form for a fixed, ordered variable set and evaluates it elementwise over ndarray
//! arrays of any dimension.
//!
//! Evaluation follows IEEE-754 throughout: `ln(-1)` is NaN, `1/0` is inf, nothing panics.
use crate::errors::{ExprError, ExprResult};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::heaviside;
use log::debug;
use ndarray::{Array, ArrayView, Dimension};
use std::f64::consts::PI;

/// integral constant exponents up to this magnitude use `powi`
const MAX_POWI_EXPONENT: f64 = 64.0;

#[derive(Clone, Debug)]
pub enum Lambda {
    Var(usize),
    Const(f64),
    Add(Box<Lambda>, Box<Lambda>),
    Sub(Box<Lambda>, Box<Lambda>),
    Mul(Box<Lambda>, Box<Lambda>),
    Div(Box<Lambda>, Box<Lambda>),
    Pow(Box<Lambda>, Box<Lambda>),
    PowI(Box<Lambda>, i32),
    Exp(Box<Lambda>),
    Ln(Box<Lambda>),
    Sin(Box<Lambda>),
    Cos(Box<Lambda>),
    Tg(Box<Lambda>),
    Ctg(Box<Lambda>),
    ArcSin(Box<Lambda>),
    ArcCos(Box<Lambda>),
    ArcTg(Box<Lambda>),
    ArcCtg(Box<Lambda>),
    Abs(Box<Lambda>),
    Heaviside(Box<Lambda>),
}

impl Expr {
    /// Resolves every variable to its position in `vars`.
    /// A variable missing from `vars` gives `UndeclaredVariable`.
    pub fn compile(&self, vars: &[&str]) -> ExprResult<Lambda> {
        let lambda = match self {
            Expr::Var(name) => match vars.iter().position(|&v| v == name) {
                Some(idx) => Lambda::Var(idx),
                None => {
                    return Err(ExprError::UndeclaredVariable {
                        input: self.to_string(),
                        name: name.clone(),
                        declared: vars.join(", "),
                    });
                }
            },
            Expr::Const(v) => Lambda::Const(*v),
            Expr::Add(a, b) => Lambda::Add(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Sub(a, b) => Lambda::Sub(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Mul(a, b) => Lambda::Mul(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Div(a, b) => Lambda::Div(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            Expr::Pow(a, b) => match b.as_ref() {
                Expr::Const(n) if n.fract() == 0.0 && n.abs() <= MAX_POWI_EXPONENT => {
                    Lambda::PowI(Box::new(a.compile(vars)?), *n as i32)
                }
                _ => Lambda::Pow(Box::new(a.compile(vars)?), Box::new(b.compile(vars)?)),
            },
            Expr::Exp(e) => Lambda::Exp(Box::new(e.compile(vars)?)),
            Expr::Ln(e) => Lambda::Ln(Box::new(e.compile(vars)?)),
            Expr::sin(e) => Lambda::Sin(Box::new(e.compile(vars)?)),
            Expr::cos(e) => Lambda::Cos(Box::new(e.compile(vars)?)),
            Expr::tg(e) => Lambda::Tg(Box::new(e.compile(vars)?)),
            Expr::ctg(e) => Lambda::Ctg(Box::new(e.compile(vars)?)),
            Expr::arcsin(e) => Lambda::ArcSin(Box::new(e.compile(vars)?)),
            Expr::arccos(e) => Lambda::ArcCos(Box::new(e.compile(vars)?)),
            Expr::arctg(e) => Lambda::ArcTg(Box::new(e.compile(vars)?)),
            Expr::arcctg(e) => Lambda::ArcCtg(Box::new(e.compile(vars)?)),
            Expr::Abs(e) => Lambda::Abs(Box::new(e.compile(vars)?)),
            Expr::Heaviside(e) => Lambda::Heaviside(Box::new(e.compile(vars)?)),
        };
        Ok(lambda)
    }
}

impl Lambda {
    /// `args` must hold at least as many values as the compiled variable set.
    #[inline(always)]
    pub fn eval(&self, args: &[f64]) -> f64 {
        match self {
            Lambda::Var(i) => args[*i],
            Lambda::Const(v) => *v,
            Lambda::Add(a, b) => a.eval(args) + b.eval(args),
            Lambda::Sub(a, b) => a.eval(args) - b.eval(args),
            Lambda::Mul(a, b) => a.eval(args) * b.eval(args),
            Lambda::Div(a, b) => a.eval(args) / b.eval(args),
            Lambda::Pow(a, b) => a.eval(args).powf(b.eval(args)),
            Lambda::PowI(a, n) => a.eval(args).powi(*n),
            Lambda::Exp(e) => e.eval(args).exp(),
            Lambda::Ln(e) => e.eval(args).ln(),
            Lambda::Sin(e) => e.eval(args).sin(),
            Lambda::Cos(e) => e.eval(args).cos(),
            Lambda::Tg(e) => e.eval(args).tan(),
            Lambda::Ctg(e) => 1.0 / e.eval(args).tan(),
            Lambda::ArcSin(e) => e.eval(args).asin(),
            Lambda::ArcCos(e) => e.eval(args).acos(),
            Lambda::ArcTg(e) => e.eval(args).atan(),
            Lambda::ArcCtg(e) => (PI / 2.0) - e.eval(args).atan(),
            Lambda::Abs(e) => e.eval(args).abs(),
            Lambda::Heaviside(e) => heaviside(e.eval(args)),
        }
    }
}

/// A user formula bound to an ordered set of declared variables.
///
/// Immutable once built; cloning is cheap enough for request-scoped use and the
/// value can be shared between threads.
#[derive(Clone, Debug)]
pub struct EvaluableFunction {
    source: String,
    expr: Expr,
    vars: Vec<String>,
    compiled: Lambda,
}

impl EvaluableFunction {
    /// Parses `text` and binds it to `vars` (in argument order).
    ///
    /// # Examples
    /// ```
    /// use RustedContours::symbolic::symbolic_lambdify::EvaluableFunction;
    /// let f = EvaluableFunction::parse("x**2 + y**2", &["x", "y"]).unwrap();
    /// assert_eq!(f.call(&[3.0, 4.0]).unwrap(), 25.0);
    /// assert!(EvaluableFunction::parse("x + z", &["x", "y"]).is_err());
    /// ```
    pub fn parse(text: &str, vars: &[&str]) -> ExprResult<Self> {
        let expr = Expr::parse_expression(text)?;
        Self::from_expr(text, expr, vars)
    }

    /// Binds an already built tree; `source` is the text echoed in errors.
    pub fn from_expr(source: &str, expr: Expr, vars: &[&str]) -> ExprResult<Self> {
        expr.check_declared_variables(source, vars)?;
        let compiled = expr.compile(vars)?;
        debug!("compiled '{}' over [{}]", source, vars.join(", "));
        Ok(EvaluableFunction {
            source: source.to_string(),
            expr,
            vars: vars.iter().map(|v| v.to_string()).collect(),
            compiled,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variables(&self) -> &[String] {
        &self.vars
    }

    pub fn arity(&self) -> usize {
        self.vars.len()
    }

    /// Scalar call; `args` follow the declared variable order.
    pub fn call(&self, args: &[f64]) -> ExprResult<f64> {
        if args.len() != self.arity() {
            return Err(ExprError::Arity {
                expected: self.arity(),
                found: args.len(),
            });
        }
        Ok(self.compiled.eval(args))
    }

    /// Analytical partial derivative with respect to `var`, bound to the same variables.
    pub fn derivative(&self, var: &str) -> ExprResult<EvaluableFunction> {
        let derivative = self.expr.diff(var);
        let source = format!("d/d{} {}", var, self.source);
        let vars: Vec<&str> = self.vars.iter().map(|v| v.as_str()).collect();
        Self::from_expr(&source, derivative, &vars)
    }

    /// Elementwise evaluation over same-shaped arrays, one per declared variable.
    pub fn eval_arrays<D: Dimension>(&self, args: &[ArrayView<f64, D>]) -> ExprResult<Array<f64, D>> {
        if args.len() != self.arity() || args.is_empty() {
            return Err(ExprError::Arity {
                expected: self.arity(),
                found: args.len(),
            });
        }
        let shape = args[0].raw_dim();
        if args.iter().any(|a| a.raw_dim() != shape) {
            return Err(ExprError::ShapeMismatch);
        }
        let mut iters: Vec<_> = args.iter().map(|a| a.iter()).collect();
        let mut point = vec![0.0; args.len()];
        let mut out = Array::<f64, D>::zeros(shape);
        for value in out.iter_mut() {
            for (slot, it) in point.iter_mut().zip(iters.iter_mut()) {
                if let Some(v) = it.next() {
                    *slot = *v;
                }
            }
            *value = self.compiled.eval(&point);
        }
        Ok(out)
    }
}
