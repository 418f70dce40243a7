use crate::error::EngineError;
use crate::numerical::trace::{
    IterationRecord, IterationTrace, SolverResult, SolverValue, ToleranceConfig,
};
use crate::symbolic::symbolic_engine::Expr;
use log::{info, warn};
use nalgebra::{DMatrix, DVector};

/// The two classical stationary sweeps over `Ax = b`. They differ in one
/// place only: Jacobi reads the previous full vector while Gauss-Seidel
/// reads components already updated within the current sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    Jacobi,
    GaussSeidel,
}

/// Jacobi / Gauss-Seidel iteration for a system of `n` linear equations in
/// `n` named variables.
///
/// The coefficient matrix is extracted symbolically: for each equation
/// `f_i = 0`, `A[i][j]` is the partial derivative `∂f_i/∂x_j`, which must
/// constant-fold to a number ([`EngineError::NotLinear`] otherwise), and
/// `b_i = -f_i(0, ..., 0)`. Dimension mismatches and zero diagonal entries
/// are rejected before the first iteration.
#[derive(Debug)]
pub struct LinearStationary {
    a: DMatrix<f64>,
    b: DVector<f64>,
    x0: DVector<f64>,
    sweep: Sweep,
    config: ToleranceConfig,
    trace: IterationTrace,
}

impl LinearStationary {
    pub fn new(
        system: &[Expr],
        variables: &[String],
        initial_guess: &[f64],
        sweep: Sweep,
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
        let (a, b) = extract_linear_system(system, variables)?;
        for (i, var) in variables.iter().enumerate() {
            if a[(i, i)] == 0.0 {
                return Err(EngineError::DivisionByZero(format!(
                    "zero diagonal coefficient for variable '{}' in equation {}",
                    var,
                    i + 1
                )));
            }
        }
        Ok(LinearStationary {
            a,
            b,
            x0: DVector::from_row_slice(initial_guess),
            sweep,
            config,
            trace: IterationTrace::new(),
        })
    }

    pub fn solve(mut self) -> Result<SolverResult, EngineError> {
        let n = self.b.len();
        let mut x = self.x0.clone();
        let tolerance = self.config.tolerance;
        let label = match self.sweep {
            Sweep::Jacobi => "jacobi",
            Sweep::GaussSeidel => "gauss-seidel",
        };
        for i in 1..=self.config.max_iterations {
            let x_old = x.clone();
            for j in 0..n {
                let mut s = 0.0;
                for k in 0..n {
                    if k != j {
                        // the defining difference between the two sweeps
                        let source = match self.sweep {
                            Sweep::Jacobi => x_old[k],
                            Sweep::GaussSeidel => x[k],
                        };
                        s += self.a[(j, k)] * source;
                    }
                }
                x[j] = (self.b[j] - s) / self.a[(j, j)];
            }
            let error = (&x - &x_old).amax();
            self.trace
                .push(IterationRecord::vector(i, x.iter().copied().collect(), error));
            info!("{} iteration {}: x = {:?}, error = {}", label, i, x.as_slice(), error);
            if error < tolerance {
                return Ok(SolverResult::converged(
                    i,
                    SolverValue::Solution(x.iter().copied().collect()),
                    self.trace,
                ));
            }
        }
        warn!(
            "{} reached the iteration ceiling ({}) without converging",
            label, self.config.max_iterations
        );
        Ok(SolverResult::exhausted(
            self.config.max_iterations,
            SolverValue::Solution(x.iter().copied().collect()),
            self.trace,
        ))
    }
}

/// Symbolic replacement for a dedicated linear-equation parser: partial
/// derivatives of a linear form are its coefficients.
fn extract_linear_system(
    system: &[Expr],
    variables: &[String],
) -> Result<(DMatrix<f64>, DVector<f64>), EngineError> {
    let n = variables.len();
    let mut a = DMatrix::zeros(n, n);
    let mut b = DVector::zeros(n);
    let zeros = vec![0.0; n];
    for (i, eq) in system.iter().enumerate() {
        for (j, var) in variables.iter().enumerate() {
            match eq.diff(var).fold_constants() {
                Expr::Const(coefficient) => a[(i, j)] = coefficient,
                _ => return Err(EngineError::NotLinear(eq.to_string())),
            }
        }
        b[i] = -eq.eval(variables, &zeros)?;
    }
    Ok((a, b))
}
