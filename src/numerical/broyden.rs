use crate::error::EngineError;
use crate::numerical::trace::{
    DIVERGENCE_BOUND, IterationRecord, IterationTrace, SolverResult, SolverValue,
    ToleranceConfig,
};
use crate::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};

/// Broyden's method for systems of nonlinear equations `F(x) = 0`.
///
/// The inverse Jacobian approximation starts as the identity matrix and is
/// updated rank-one after every step:
///
/// ```text
/// J⁻¹ += (Δx - J⁻¹·y) Δxᵀ / (Δx·Δx)     where y = F(x_new) - F(x)
/// ```
///
/// No derivatives are evaluated, symbolically or otherwise. A vanishing
/// update denominator or a non-finite approximation fails with
/// [`EngineError::SingularUpdate`]; iterates escaping [`DIVERGENCE_BOUND`]
/// fail with [`EngineError::Divergence`].
#[derive(Debug)]
pub struct Broyden {
    system: Vec<Expr>,
    variables: Vec<String>,
    x0: DVector<f64>,
    config: ToleranceConfig,
    trace: IterationTrace,
}

impl Broyden {
    pub fn new(
        system: &[Expr],
        variables: &[String],
        initial_guess: &[f64],
        config: ToleranceConfig,
    ) -> Result<Self, EngineError> {
        let n = variables.len();
        if system.len() != n || initial_guess.len() != n {
            return Err(EngineError::DimensionMismatch(format!(
                "{} equation(s), {} variable(s), {} initial guess entr(ies) — all must match",
                system.len(),
                n,
                initial_guess.len()
            )));
        }
        Ok(Broyden {
            system: system.to_vec(),
            variables: variables.to_vec(),
            x0: DVector::from_row_slice(initial_guess),
            config,
            trace: IterationTrace::new(),
        })
    }

    fn evaluate_system(&self, x: &DVector<f64>) -> Result<DVector<f64>, EngineError> {
        let values: Vec<f64> = x.iter().copied().collect();
        let mut out = DVector::zeros(self.system.len());
        for (i, eq) in self.system.iter().enumerate() {
            out[i] = eq.eval(&self.variables, &values)?;
        }
        Ok(out)
    }

    pub fn solve(mut self) -> Result<SolverResult, EngineError> {
        let n = self.x0.len();
        let mut x = self.x0.clone();
        let mut j_inv = DMatrix::<f64>::identity(n, n);
        let tolerance = self.config.tolerance;
        for i in 1..=self.config.max_iterations {
            let f_val = self.evaluate_system(&x)?;
            let delta_x = -(&j_inv * &f_val);
            let x_new = &x + &delta_x;
            if x_new.iter().any(|v| !v.is_finite()) || x_new.amax() > DIVERGENCE_BOUND {
                return Err(EngineError::Divergence(format!(
                    "iterate left the bound {} at iteration {}",
                    DIVERGENCE_BOUND, i
                )));
            }
            let error = delta_x.amax();
            self.trace
                .push(IterationRecord::vector(i, x_new.iter().copied().collect(), error));
            info!("broyden iteration {}: x = {:?}, error = {}", i, x_new.as_slice(), error);
            if error < tolerance {
                return Ok(SolverResult::converged(
                    i,
                    SolverValue::Solution(x_new.iter().copied().collect()),
                    self.trace,
                ));
            }
            let f_val_new = self.evaluate_system(&x_new)?;
            let y = &f_val_new - &f_val;
            let denominator = delta_x.dot(&delta_x);
            if denominator.abs() < f64::EPSILON {
                return Err(EngineError::SingularUpdate(format!(
                    "step vanished before convergence at iteration {}",
                    i
                )));
            }
            let correction = (&delta_x - &j_inv * &y) * delta_x.transpose() / denominator;
            j_inv += correction;
            if j_inv.iter().any(|v| !v.is_finite()) {
                return Err(EngineError::SingularUpdate(format!(
                    "inverse Jacobian approximation became non-finite at iteration {}",
                    i
                )));
            }
            x = x_new;
        }
        warn!(
            "broyden reached the iteration ceiling ({}) without converging",
            self.config.max_iterations
        );
        Ok(SolverResult::exhausted(
            self.config.max_iterations,
            SolverValue::Solution(x.iter().copied().collect()),
            self.trace,
        ))
    }
}
