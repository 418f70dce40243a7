//! # numethods
//!
//! A numerical methods engine. String expressions are parsed into a symbolic
//! tree ([`symbolic::symbolic_engine::Expr`]), compiled into evaluable
//! functions, and fed to iterative solvers that produce a structured trace of
//! every iteration:
//!
//! - root finding: bisection, secant, Newton-Raphson (symbolic derivative),
//!   fixed-point iteration
//! - linear systems: Jacobi and Gauss-Seidel stationary iterations over a
//!   coefficient matrix extracted symbolically from the equations
//! - nonlinear systems: Broyden with a rank-one inverse-Jacobian update
//! - quadrature: composite trapezoidal and Simpson rules
//! - ODE: explicit and improved (Heun) Euler stepping
//!
//! The [`api`] module exposes the request/response contract: a
//! [`api::request::SolveRequest`] names a method and its parameters, and
//! [`api::dispatch::solve_request`] returns either the converged/exhausted
//! result with its `iteration_history` or a categorized error message.
//!
//! ```
//! use numethods::api::dispatch::solve_request;
//! use numethods::api::request::SolveRequest;
//!
//! let request: SolveRequest = serde_json::from_str(
//!     r#"{ "method": "bisection", "equation": "x^2 - 4",
//!          "a": 0.0, "b": 5.0, "iterations": 100 }"#,
//! )
//! .unwrap();
//! let response = serde_json::to_value(solve_request(&request)).unwrap();
//! assert_eq!(response["converged"], true);
//! assert!((response["root"].as_f64().unwrap() - 2.0).abs() < 1e-4);
//! ```
pub mod api;
pub mod error;
pub mod numerical;
pub mod symbolic;
pub mod utils;
