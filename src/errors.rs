//! Error and warning types shared by the expression evaluator and the renderers.
//!
//! Errors abort the current render only; warnings travel inside a successful
//! [`crate::plotting::render_api::RenderResponse`].
use std::fmt;
use thiserror::Error;

/// Failures while turning user text into an evaluable function.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("cannot parse '{input}' at position {position}: {reason}")]
    Parse {
        input: String,
        position: usize,
        reason: String,
    },

    #[error("'{input}' uses the variable '{name}', only [{declared}] may appear")]
    UndeclaredVariable {
        input: String,
        name: String,
        declared: String,
    },

    #[error("function of {expected} variable(s) called with {found} argument array(s)")]
    Arity { expected: usize, found: usize },

    #[error("argument arrays must all have the same shape")]
    ShapeMismatch,
}

pub type ExprResult<T> = Result<T, ExprError>;

/// Failures of a render request.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Expr(#[from] ExprError),

    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("drawing failed: {0}")]
    Drawing(String),

    #[error("task file error: {0}")]
    Task(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RenderResult<T> = Result<T, RenderError>;

impl RenderError {
    pub fn invalid(name: &str, value: impl fmt::Display, reason: &str) -> Self {
        RenderError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Recoverable conditions reported next to (instead of) the rendered images.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderWarning {
    /// f is undefined or infinite at the centre; the panel is not drawn.
    NonFiniteBasepoint {
        x0: f64,
        y0: Option<f64>,
        value: f64,
    },
    /// The derivative needed for a tangent line is undefined at x0.
    NonFiniteSlope { x0: f64, value: f64 },
}

impl fmt::Display for RenderWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RenderWarning::NonFiniteBasepoint {
                x0,
                y0: Some(y0),
                value,
            } => write!(
                f,
                "function is undefined or infinite at ({}, {}): value {}",
                x0, y0, value
            ),
            RenderWarning::NonFiniteBasepoint {
                x0,
                y0: None,
                value,
            } => write!(
                f,
                "function is undefined or infinite at x = {}: value {}",
                x0, value
            ),
            RenderWarning::NonFiniteSlope { x0, value } => {
                write!(f, "derivative is undefined at x = {}: value {}", x0, value)
            }
        }
    }
}

/// Plotters errors carry backend-specific generics; keep only the message.
pub(crate) fn drawing_error<E: fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}
