//! Numerical solvers. Every solver follows the same lifecycle: construction
//! validates the method's preconditions, `solve(self)` consumes the solver,
//! runs to convergence or to the iteration ceiling, and returns a
//! [`trace::SolverResult`] carrying one [`trace::IterationRecord`] per
//! executed iteration. A solver that reached a terminal state cannot be
//! re-entered.

/// Interval-halving root bracketing.
pub mod bisection;
/// Broyden's method for nonlinear systems (rank-one inverse-Jacobian update).
pub mod broyden;
/// Explicit and improved (Heun) Euler stepping for dy/dx = f(x, y).
pub mod euler;
/// Fixed-point iteration x = g(x) with divergence detection.
pub mod fixed_point;
/// Jacobi and Gauss-Seidel stationary iterations for linear systems.
pub mod linear_stationary;
/// Newton-Raphson with an analytically derived slope.
pub mod newton_raphson;
/// Composite trapezoidal and Simpson quadrature.
pub mod quadrature;
/// Secant iteration from two seeds.
pub mod secant;
/// Iteration records, traces, solver results and tolerance settings.
pub mod trace;
