use crate::error::EngineError;
use crate::numerical::trace::{DEFAULT_TOLERANCE, ToleranceConfig};
use serde::Deserialize;
use strum_macros::{Display, EnumString};

/// Wire method names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Method {
    Bisection,
    Secant,
    NewtonRaphson,
    FixedPoint,
    Jacobi,
    GaussSeidel,
    Broyden,
    Trapezoidal,
    Simpson,
    Euler,
    EulerImproved,
}

/// Scalar for the single-variable methods, vector for the system methods.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InitialGuess {
    Scalar(f64),
    Vector(Vec<f64>),
}

/// Union of every method's parameters; the dispatcher checks that the
/// fields the selected method needs are actually present.
#[derive(Debug, Clone, Deserialize)]
pub struct SolveRequest {
    pub method: Method,
    #[serde(default)]
    pub equation: Option<String>,
    #[serde(default)]
    pub equations: Option<Vec<String>>,
    #[serde(default)]
    pub variables: Option<Vec<String>>,
    #[serde(default)]
    pub initial_guess: Option<InitialGuess>,
    #[serde(default)]
    pub a: Option<f64>,
    #[serde(default)]
    pub b: Option<f64>,
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub x0: Option<f64>,
    #[serde(default)]
    pub x1: Option<f64>,
    #[serde(default, rename = "gFunction")]
    pub g_function: Option<String>,
    #[serde(default)]
    pub h: Option<f64>,
    #[serde(default)]
    pub y0: Option<f64>,
    #[serde(default)]
    pub iterations: Option<usize>,
    #[serde(default)]
    pub tolerance: Option<f64>,
}

impl SolveRequest {
    /// Iteration budget and tolerance, defaulted and clamped to the hard
    /// ceiling.
    pub fn tolerance_config(&self) -> ToleranceConfig {
        ToleranceConfig::new(
            self.iterations.unwrap_or(100),
            self.tolerance.unwrap_or(DEFAULT_TOLERANCE),
        )
    }

    pub fn require_equation(&self) -> Result<&str, EngineError> {
        self.equation
            .as_deref()
            .ok_or(EngineError::MissingParameter("equation"))
    }

    pub fn require_f64(
        value: Option<f64>,
        name: &'static str,
    ) -> Result<f64, EngineError> {
        value.ok_or(EngineError::MissingParameter(name))
    }

    pub fn require_usize(
        value: Option<usize>,
        name: &'static str,
    ) -> Result<usize, EngineError> {
        value.ok_or(EngineError::MissingParameter(name))
    }

    /// The scalar seed of the single-variable iterative methods.
    pub fn require_scalar_guess(&self) -> Result<f64, EngineError> {
        match &self.initial_guess {
            Some(InitialGuess::Scalar(value)) => Ok(*value),
            Some(InitialGuess::Vector(_)) => Err(EngineError::InvalidParameter(
                "initial_guess must be a single number for this method".to_string(),
            )),
            None => Err(EngineError::MissingParameter("initial_guess")),
        }
    }

    /// The vector seed of the system methods.
    pub fn require_vector_guess(&self) -> Result<Vec<f64>, EngineError> {
        match &self.initial_guess {
            Some(InitialGuess::Vector(values)) => Ok(values.clone()),
            Some(InitialGuess::Scalar(value)) => Ok(vec![*value]),
            None => Err(EngineError::MissingParameter("initial_guess")),
        }
    }

    pub fn require_equations(&self) -> Result<&[String], EngineError> {
        self.equations
            .as_deref()
            .ok_or(EngineError::MissingParameter("equations"))
    }

    pub fn require_variables(&self) -> Result<&[String], EngineError> {
        self.variables
            .as_deref()
            .ok_or(EngineError::MissingParameter("variables"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::trace::MAX_ITERATION_CEILING;

    #[test]
    fn deserializes_a_scalar_request() {
        let request: SolveRequest = serde_json::from_str(
            r#"{ "method": "bisection", "equation": "x^2 - 4",
                 "a": 0.0, "b": 5.0, "iterations": 50 }"#,
        )
        .unwrap();
        assert_eq!(request.method, Method::Bisection);
        assert_eq!(request.a, Some(0.0));
        assert_eq!(request.tolerance_config().max_iterations, 50);
        assert_eq!(request.tolerance_config().tolerance, 1e-6);
    }

    #[test]
    fn deserializes_a_system_request_with_vector_guess() {
        let request: SolveRequest = serde_json::from_str(
            r#"{ "method": "gauss_seidel",
                 "equations": ["10x - y - 8", "x + 5y - 11"],
                 "variables": ["x", "y"],
                 "initial_guess": [0.0, 0.0],
                 "iterations": 25 }"#,
        )
        .unwrap();
        assert_eq!(request.method, Method::GaussSeidel);
        assert_eq!(request.require_vector_guess().unwrap(), vec![0.0, 0.0]);
        assert!(request.require_scalar_guess().is_err());
    }

    #[test]
    fn unknown_method_names_fail_to_deserialize() {
        let result = serde_json::from_str::<SolveRequest>(r#"{ "method": "muller" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn g_function_uses_the_camel_case_wire_name() {
        let request: SolveRequest = serde_json::from_str(
            r#"{ "method": "fixed_point", "gFunction": "cos(x)", "initial_guess": 0.5 }"#,
        )
        .unwrap();
        assert_eq!(request.g_function.as_deref(), Some("cos(x)"));
        assert_eq!(request.require_scalar_guess().unwrap(), 0.5);
    }

    #[test]
    fn requested_budget_is_clamped_to_the_ceiling() {
        let request: SolveRequest = serde_json::from_str(
            r#"{ "method": "secant", "equation": "x", "x0": 0.0, "x1": 1.0,
                 "iterations": 999999 }"#,
        )
        .unwrap();
        assert_eq!(
            request.tolerance_config().max_iterations,
            MAX_ITERATION_CEILING
        );
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let request: SolveRequest =
            serde_json::from_str(r#"{ "method": "bisection" }"#).unwrap();
        assert!(matches!(
            request.require_equation(),
            Err(EngineError::MissingParameter("equation"))
        ));
        assert!(matches!(
            SolveRequest::require_f64(request.a, "a"),
            Err(EngineError::MissingParameter("a"))
        ));
    }
}
