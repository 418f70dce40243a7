use crate::error::EngineError;
use crate::numerical::trace::{
    IterationRecord, IterationTrace, SolverResult, SolverValue, ToleranceConfig,
};
use crate::symbolic::compiled::Expression;
use log::{info, warn};

/// Secant iteration `x_{n+1} = x_n - f(x_n)(x_n - x_{n-1}) / (f(x_n) - f(x_{n-1}))`.
///
/// Two distinct seeds are required; equal seeds fail with
/// [`EngineError::InvalidSeed`] before any iteration is recorded. A
/// vanishing secant slope fails with [`EngineError::DivisionByZero`] rather
/// than producing NaN.
#[derive(Debug)]
pub struct Secant {
    f: Expression,
    x0: f64,
    x1: f64,
    config: ToleranceConfig,
    trace: IterationTrace,
}

impl Secant {
    pub fn new(
        f: Expression,
        x0: f64,
        x1: f64,
        config: ToleranceConfig,
    ) -> Result<Self, EngineError> {
        if f.arity() != 1 {
            return Err(EngineError::DimensionMismatch(format!(
                "secant expects a single-variable function, got {} variables",
                f.arity()
            )));
        }
        if x0 == x1 {
            return Err(EngineError::InvalidSeed(x0));
        }
        Ok(Secant {
            f,
            x0,
            x1,
            config,
            trace: IterationTrace::new(),
        })
    }

    pub fn solve(mut self) -> Result<SolverResult, EngineError> {
        let mut x0 = self.x0;
        let mut x1 = self.x1;
        let tolerance = self.config.tolerance;
        for i in 1..=self.config.max_iterations {
            let fx0 = self.f.call(&[x0])?;
            let fx1 = self.f.call(&[x1])?;
            let denominator = fx1 - fx0;
            if denominator.abs() < f64::EPSILON {
                return Err(EngineError::DivisionByZero(format!(
                    "f(x1) - f(x0) vanished at iteration {} (x0 = {}, x1 = {})",
                    i, x0, x1
                )));
            }
            let x2 = x1 - fx1 * (x1 - x0) / denominator;
            let error = (x2 - x1).abs();
            let fx2 = self.f.call(&[x2])?;
            self.trace.push(IterationRecord::scalar(i, x2, Some(fx2), error));
            info!("secant iteration {}: x = {}, f(x) = {}, error = {}", i, x2, fx2, error);
            if error < tolerance {
                return Ok(SolverResult::converged(i, SolverValue::Root(x2), self.trace));
            }
            x0 = x1;
            x1 = x2;
        }
        warn!(
            "secant reached the iteration ceiling ({}) without converging",
            self.config.max_iterations
        );
        Ok(SolverResult::exhausted(
            self.config.max_iterations,
            SolverValue::Root(x1),
            self.trace,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver(formula: &str, x0: f64, x1: f64) -> Result<Secant, EngineError> {
        let f = Expression::compile(formula, &["x"]).unwrap();
        Secant::new(f, x0, x1, ToleranceConfig::new(100, 1e-6))
    }

    #[test]
    fn converges_on_a_quadratic() {
        let result = solver("x^2 - 4", 1.0, 3.0).unwrap().solve().unwrap();
        assert!(result.converged);
        let SolverValue::Root(root) = result.value else {
            panic!("expected a root");
        };
        assert_relative_eq!(root, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn equal_seeds_are_rejected_before_any_iteration() {
        let err = solver("x^2 - 4", 1.5, 1.5).unwrap_err();
        assert_eq!(err, EngineError::InvalidSeed(1.5));
    }

    #[test]
    fn flat_function_fails_with_division_by_zero() {
        // constant function: f(x1) - f(x0) is exactly zero
        let f = Expression::compile("0x + 7", &["x"]).unwrap();
        let result = Secant::new(f, 0.0, 1.0, ToleranceConfig::default())
            .unwrap()
            .solve();
        assert!(matches!(result, Err(EngineError::DivisionByZero(_))));
    }

    #[test]
    fn trace_length_matches_iterations() {
        let result = solver("cos(x) - x", 0.0, 1.0).unwrap().solve().unwrap();
        assert!(result.converged);
        assert_eq!(result.trace.len(), result.iterations);
    }
}
