use crate::error::EngineError;
use crate::numerical::trace::{
    IterationRecord, IterationTrace, SolverResult, SolverValue, ToleranceConfig,
};
use crate::symbolic::compiled::Expression;
use log::{info, warn};

/// Interval-halving root finder.
///
/// Requires a bracketing interval: `f(a)` and `f(b)` must differ in sign, or
/// the solve fails with [`EngineError::NoSignChange`] before any iteration
/// is recorded. Exhausting the iteration budget is not a failure; the
/// midpoint reached so far is returned with `converged = false`.
#[derive(Debug)]
pub struct Bisection {
    f: Expression,
    a: f64,
    b: f64,
    config: ToleranceConfig,
    trace: IterationTrace,
}

impl Bisection {
    pub fn new(
        f: Expression,
        a: f64,
        b: f64,
        config: ToleranceConfig,
    ) -> Result<Self, EngineError> {
        if f.arity() != 1 {
            return Err(EngineError::DimensionMismatch(format!(
                "bisection expects a single-variable function, got {} variables",
                f.arity()
            )));
        }
        if !(a < b) {
            return Err(EngineError::InvalidParameter(format!(
                "interval bounds must satisfy a < b, got a = {}, b = {}",
                a, b
            )));
        }
        Ok(Bisection {
            f,
            a,
            b,
            config,
            trace: IterationTrace::new(),
        })
    }

    pub fn solve(mut self) -> Result<SolverResult, EngineError> {
        let mut a = self.a;
        let mut b = self.b;
        let mut fa = self.f.call(&[a])?;
        let fb = self.f.call(&[b])?;
        if fa * fb >= 0.0 {
            return Err(EngineError::NoSignChange { a, b });
        }

        let tolerance = self.config.tolerance;
        let mut c = (a + b) / 2.0;
        for i in 1..=self.config.max_iterations {
            c = (a + b) / 2.0;
            let fc = self.f.call(&[c])?;
            let error = (b - a).abs() / 2.0;
            self.trace.push(IterationRecord::scalar(i, c, Some(fc), error));
            info!("bisection iteration {}: x = {}, f(x) = {}, error = {}", i, c, fc, error);
            if fc.abs() < tolerance || error < tolerance {
                return Ok(SolverResult::converged(i, SolverValue::Root(c), self.trace));
            }
            if fa * fc < 0.0 {
                b = c;
            } else {
                a = c;
                fa = fc;
            }
        }
        warn!(
            "bisection reached the iteration ceiling ({}) without converging",
            self.config.max_iterations
        );
        Ok(SolverResult::exhausted(
            self.config.max_iterations,
            SolverValue::Root(c),
            self.trace,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::trace::{SolverStatus, SolverValue};
    use approx::assert_relative_eq;

    fn solver(formula: &str, a: f64, b: f64, max_iter: usize) -> Bisection {
        let f = Expression::compile(formula, &["x"]).unwrap();
        Bisection::new(f, a, b, ToleranceConfig::new(max_iter, 1e-6)).unwrap()
    }

    #[test]
    fn finds_the_root_of_a_quadratic() {
        let result = solver("x^2 - 4", 0.0, 5.0, 100).solve().unwrap();
        assert!(result.converged);
        assert_eq!(result.status, SolverStatus::Converged);
        let SolverValue::Root(root) = result.value else {
            panic!("expected a root");
        };
        assert_relative_eq!(root, 2.0, epsilon = 1e-5);
        // converged means the residual or the half-interval fell below tol
        let f = Expression::compile("x^2 - 4", &["x"]).unwrap();
        assert!(f.call(&[root]).unwrap().abs() < 1e-4);
    }

    #[test]
    fn rejects_interval_without_sign_change() {
        let err = solver("x^2 + 1", -1.0, 1.0, 100).solve().unwrap_err();
        assert!(matches!(err, EngineError::NoSignChange { .. }));
    }

    #[test]
    fn rejects_reversed_interval() {
        let f = Expression::compile("x", &["x"]).unwrap();
        let err = Bisection::new(f, 2.0, -2.0, ToleranceConfig::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter(_)));
    }

    #[test]
    fn exhaustion_returns_best_estimate_not_error() {
        let result = solver("x^2 - 2", 0.0, 2.0, 3).solve().unwrap();
        assert!(!result.converged);
        assert_eq!(result.status, SolverStatus::MaxIterationsReached);
        assert_eq!(result.iterations, 3);
        assert_eq!(result.trace.len(), 3);
        let SolverValue::Root(root) = result.value else {
            panic!("expected a root");
        };
        // 3 halvings of [0,2] still land near sqrt(2)
        assert!((root - 2f64.sqrt()).abs() < 0.25);
    }

    #[test]
    fn trace_length_matches_iterations() {
        let result = solver("x^3 - x - 2", 1.0, 2.0, 200).solve().unwrap();
        assert_eq!(result.trace.len(), result.iterations);
    }

    #[test]
    fn reruns_produce_identical_traces() {
        let first = solver("x^2 - 4", 0.0, 5.0, 100).solve().unwrap();
        let second = solver("x^2 - 4", 0.0, 5.0, 100).solve().unwrap();
        assert_eq!(first.trace, second.trace);
    }
}
