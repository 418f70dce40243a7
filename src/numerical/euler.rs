use crate::error::EngineError;
use crate::numerical::trace::{
    IterationRecord, IterationTrace, MAX_ITERATION_CEILING, SolverResult, SolverValue,
};
use crate::symbolic::compiled::Expression;
use log::info;

/// Which update rule the stepper applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EulerVariant {
    /// Explicit Euler: `y_next = y + h·f(x, y)`.
    Basic,
    /// Heun's predictor-corrector: predict with explicit Euler, correct with
    /// the averaged slope `y_next = y + h/2·(f(x, y) + f(x_next, y_pred))`.
    Improved,
}

/// Fixed-step integrator for `dy/dx = f(x, y)` from `(x0, y0)`.
///
/// The step count is the iteration count; every step is recorded and the
/// run always terminates as converged. The per-step `error` is a proxy, not
/// a global bound: `|h·slope|` for the basic variant (0 on the first step),
/// `|y_corrector - y_predictor|` for the improved one.
#[derive(Debug)]
pub struct Euler {
    f: Expression,
    x0: f64,
    y0: f64,
    h: f64,
    n: usize,
    variant: EulerVariant,
}

impl Euler {
    pub fn new(
        f: Expression,
        x0: f64,
        y0: f64,
        h: f64,
        n: usize,
        variant: EulerVariant,
    ) -> Result<Self, EngineError> {
        if f.arity() != 2 {
            return Err(EngineError::DimensionMismatch(format!(
                "the right-hand side f(x, y) must use exactly 2 variables, got {}",
                f.arity()
            )));
        }
        if !(h > 0.0 && h <= 1.0) {
            return Err(EngineError::InvalidParameter(format!(
                "step size must satisfy 0 < h <= 1, got h = {}",
                h
            )));
        }
        if n == 0 || n > MAX_ITERATION_CEILING {
            return Err(EngineError::InvalidParameter(format!(
                "step count must be in 1..={}, got n = {}",
                MAX_ITERATION_CEILING, n
            )));
        }
        Ok(Euler { f, x0, y0, h, n, variant })
    }

    pub fn solve(self) -> Result<SolverResult, EngineError> {
        let mut trace = IterationTrace::new();
        let mut x = self.x0;
        let mut y = self.y0;
        let h = self.h;
        for i in 1..=self.n {
            let slope = self.f.call(&[x, y])?;
            let x_next = x + h;
            let (y_next, record) = match self.variant {
                EulerVariant::Basic => {
                    let y_next = y + h * slope;
                    let error = if i == 1 { 0.0 } else { (h * slope).abs() };
                    let record =
                        IterationRecord::ode_step(i, x, y, slope, x_next, y_next, Some(error));
                    (y_next, record)
                }
                EulerVariant::Improved => {
                    let y_predictor = y + h * slope;
                    let slope2 = self.f.call(&[x_next, y_predictor])?;
                    let y_next = y + h / 2.0 * (slope + slope2);
                    let error = (y_next - y_predictor).abs();
                    let mut record =
                        IterationRecord::ode_step(i, x, y, slope, x_next, y_next, Some(error));
                    record.y_predictor = Some(y_predictor);
                    record.slope2 = Some(slope2);
                    (y_next, record)
                }
            };
            trace.push(record);
            x = x_next;
            y = y_next;
        }
        info!(
            "euler ({:?}) completed {} step(s) from x = {} to x = {}: y = {}",
            self.variant, self.n, self.x0, x, y
        );
        Ok(SolverResult::converged(
            self.n,
            SolverValue::FinalPoint { x, y },
            trace,
        ))
    }
}
