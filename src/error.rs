use thiserror::Error;

/// Error taxonomy of the engine.
///
/// Every variant is a terminal condition for the current solve; nothing is
/// retried internally. Reaching the iteration ceiling without convergence is
/// deliberately *not* represented here: it is a valid result reported as
/// `converged = false` with the best available estimate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Malformed formula: unbalanced delimiters, unsupported operators,
    /// undeclared variables. The message names the offending construct.
    #[error("parse error: {0}")]
    Parse(String),

    /// Evaluation left the function's domain (division by zero, logarithm of
    /// a non-positive value, fractional power of a negative base). Raised at
    /// evaluation time, never at parse time, since it depends on the iterate.
    #[error("domain error: {0}")]
    Domain(String),

    /// Bisection precondition: f(a) and f(b) must differ in sign.
    #[error("the function does not change sign on [{a}, {b}]")]
    NoSignChange { a: f64, b: f64 },

    /// Secant requires two distinct initial estimates.
    #[error("initial estimates must differ, got x0 = x1 = {0}")]
    InvalidSeed(f64),

    /// A solver denominator (secant secant-slope, Newton derivative, zero
    /// matrix diagonal) vanished.
    #[error("division by zero: {0}")]
    DivisionByZero(String),

    /// An iterate became non-finite or left the divergence bound.
    #[error("divergence detected: {0}")]
    Divergence(String),

    /// Equations, variables and initial guess must have matching lengths.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The Broyden inverse-Jacobian update became numerically singular.
    #[error("singular update: {0}")]
    SingularUpdate(String),

    /// Jacobi/Gauss-Seidel received an equation that is not linear in the
    /// declared variables.
    #[error("equation '{0}' is not linear in the declared variables")]
    NotLinear(String),

    /// The request omitted a field the selected method requires.
    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),

    /// A parameter is present but outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}
