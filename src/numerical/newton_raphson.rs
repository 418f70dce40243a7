use crate::error::EngineError;
use crate::numerical::trace::{
    IterationRecord, IterationTrace, SolverResult, SolverValue, ToleranceConfig,
};
use crate::symbolic::compiled::Expression;
use log::{info, warn};

/// Newton-Raphson iteration `x_{n+1} = x_n - f(x_n) / f'(x_n)`.
///
/// The derivative is obtained analytically from the compiled expression via
/// symbolic differentiation — a fixed choice, never a finite-difference
/// approximation, so convergence behavior does not depend on a step-size
/// heuristic. A derivative that vanishes at an iterate fails with
/// [`EngineError::DivisionByZero`].
pub struct NewtonRaphson {
    f: Expression,
    dfdx: Expression,
    x0: f64,
    config: ToleranceConfig,
    trace: IterationTrace,
}

impl NewtonRaphson {
    pub fn new(f: Expression, x0: f64, config: ToleranceConfig) -> Result<Self, EngineError> {
        if f.arity() != 1 {
            return Err(EngineError::DimensionMismatch(format!(
                "Newton-Raphson expects a single-variable function, got {} variables",
                f.arity()
            )));
        }
        let var = f.variables()[0].clone();
        let dfdx = f.differentiate(&var);
        Ok(NewtonRaphson {
            f,
            dfdx,
            x0,
            config,
            trace: IterationTrace::new(),
        })
    }

    pub fn solve(mut self) -> Result<SolverResult, EngineError> {
        let mut x_prev = self.x0;
        let tolerance = self.config.tolerance;
        for i in 1..=self.config.max_iterations {
            let fx = self.f.call(&[x_prev])?;
            let fpx = self.dfdx.call(&[x_prev])?;
            if fpx.abs() < f64::EPSILON {
                return Err(EngineError::DivisionByZero(format!(
                    "derivative vanished at x = {} (iteration {})",
                    x_prev, i
                )));
            }
            let x_next = x_prev - fx / fpx;
            let error = (x_next - x_prev).abs();
            self.trace.push(IterationRecord::scalar(i, x_next, Some(fx), error));
            info!(
                "newton-raphson iteration {}: x = {}, f(x) = {}, error = {}",
                i, x_next, fx, error
            );
            if error < tolerance {
                return Ok(SolverResult::converged(i, SolverValue::Root(x_next), self.trace));
            }
            x_prev = x_next;
        }
        warn!(
            "newton-raphson reached the iteration ceiling ({}) without converging",
            self.config.max_iterations
        );
        Ok(SolverResult::exhausted(
            self.config.max_iterations,
            SolverValue::Root(x_prev),
            self.trace,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn solver(formula: &str, x0: f64) -> NewtonRaphson {
        let f = Expression::compile(formula, &["x"]).unwrap();
        NewtonRaphson::new(f, x0, ToleranceConfig::new(100, 1e-6)).unwrap()
    }

    #[test]
    fn converges_quadratically_on_a_square_root() {
        let result = solver("x^2 - 2", 1.0).solve().unwrap();
        assert!(result.converged);
        let SolverValue::Root(root) = result.value else {
            panic!("expected a root");
        };
        assert_relative_eq!(root, 2f64.sqrt(), epsilon = 1e-9);
        // quadratic convergence: a handful of iterations suffices
        assert!(result.iterations < 10);
    }

    #[test]
    fn stationary_start_fails_with_division_by_zero() {
        // f'(0) = 0 for x^2 - 2
        let result = solver("x^2 - 2", 0.0).solve();
        assert!(matches!(result, Err(EngineError::DivisionByZero(_))));
    }

    #[test]
    fn transcendental_root() {
        let result = solver("cos(x) - x", 1.0).solve().unwrap();
        assert!(result.converged);
        let SolverValue::Root(root) = result.value else {
            panic!("expected a root");
        };
        assert_relative_eq!(root.cos(), root, epsilon = 1e-9);
    }

    #[test]
    fn trace_length_matches_iterations() {
        let result = solver("x^3 - x - 2", 1.5).solve().unwrap();
        assert_eq!(result.trace.len(), result.iterations);
    }
}
