use crate::error::EngineError;
use crate::numerical::trace::{
    DIVERGENCE_BOUND, IterationRecord, IterationTrace, SolverResult, SolverValue,
    ToleranceConfig,
};
use crate::symbolic::compiled::Expression;
use log::{info, warn};

/// Fixed-point iteration `x_{n+1} = g(x_n)`.
///
/// No sign-change or derivative precondition, but divergence is detected
/// eagerly: a non-finite iterate or one beyond [`DIVERGENCE_BOUND`] fails
/// with [`EngineError::Divergence`] instead of silently iterating to the
/// ceiling.
pub struct FixedPoint {
    g: Expression,
    x0: f64,
    config: ToleranceConfig,
    trace: IterationTrace,
}

impl FixedPoint {
    pub fn new(g: Expression, x0: f64, config: ToleranceConfig) -> Result<Self, EngineError> {
        if g.arity() != 1 {
            return Err(EngineError::DimensionMismatch(format!(
                "fixed-point expects a single-variable function, got {} variables",
                g.arity()
            )));
        }
        Ok(FixedPoint {
            g,
            x0,
            config,
            trace: IterationTrace::new(),
        })
    }

    pub fn solve(mut self) -> Result<SolverResult, EngineError> {
        let mut x_prev = self.x0;
        let mut x_next = self.x0;
        let tolerance = self.config.tolerance;
        for i in 1..=self.config.max_iterations {
            x_next = self.g.call(&[x_prev])?;
            if !x_next.is_finite() || x_next.abs() > DIVERGENCE_BOUND {
                return Err(EngineError::Divergence(format!(
                    "iterate {} at iteration {} left the bound {}",
                    x_next, i, DIVERGENCE_BOUND
                )));
            }
            let step = x_next - x_prev;
            let error = step.abs();
            self.trace.push(IterationRecord::scalar(i, x_next, Some(step), error));
            info!("fixed-point iteration {}: x = {}, error = {}", i, x_next, error);
            if error < tolerance {
                return Ok(SolverResult::converged(i, SolverValue::Root(x_next), self.trace));
            }
            x_prev = x_next;
        }
        warn!(
            "fixed-point reached the iteration ceiling ({}) without converging",
            self.config.max_iterations
        );
        Ok(SolverResult::exhausted(
            self.config.max_iterations,
            SolverValue::Root(x_next),
            self.trace,
        ))
    }
}
