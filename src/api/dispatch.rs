use crate::api::plot;
use crate::api::request::{Method, SolveRequest};
use crate::api::response::SolveResponse;
use crate::error::EngineError;
use crate::numerical::bisection::Bisection;
use crate::numerical::broyden::Broyden;
use crate::numerical::euler::{Euler, EulerVariant};
use crate::numerical::fixed_point::FixedPoint;
use crate::numerical::linear_stationary::{LinearStationary, Sweep};
use crate::numerical::newton_raphson::NewtonRaphson;
use crate::numerical::quadrature::{Simpson, Trapezoidal};
use crate::numerical::secant::Secant;
use crate::numerical::trace::SolverResult;
use crate::symbolic::compiled::Expression;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;
use log::warn;

/// Runs the method a request names and assembles the wire response. Every
/// error, from a malformed formula to a singular update deep in a solver,
/// comes back as a failure payload; this function never panics.
pub fn solve_request(request: &SolveRequest) -> SolveResponse {
    match run(request) {
        Ok(response) => response,
        Err(err) => {
            warn!("{} request failed: {}", request.method, err);
            SolveResponse::failure(err)
        }
    }
}

fn run(request: &SolveRequest) -> Result<SolveResponse, EngineError> {
    let config = request.tolerance_config();
    let method = request.method.to_string();
    match request.method {
        Method::Bisection => {
            let f = compile_single_variable(request.require_equation()?)?;
            let a = SolveRequest::require_f64(request.a, "a")?;
            let b = SolveRequest::require_f64(request.b, "b")?;
            let result = Bisection::new(f, a, b, config)?.solve()?;
            Ok(scalar_response(&method, result))
        }
        Method::Secant => {
            let f = compile_single_variable(request.require_equation()?)?;
            let x0 = SolveRequest::require_f64(request.x0, "x0")?;
            let x1 = SolveRequest::require_f64(request.x1, "x1")?;
            let result = Secant::new(f, x0, x1, config)?.solve()?;
            Ok(scalar_response(&method, result))
        }
        Method::NewtonRaphson => {
            let f = compile_single_variable(request.require_equation()?)?;
            let x0 = request.require_scalar_guess()?;
            let result = NewtonRaphson::new(f, x0, config)?.solve()?;
            Ok(scalar_response(&method, result))
        }
        Method::FixedPoint => {
            let g = request
                .g_function
                .as_deref()
                .ok_or(EngineError::MissingParameter("gFunction"))?;
            let g = compile_single_variable(g)?;
            let x0 = request.require_scalar_guess()?;
            let result = FixedPoint::new(g, x0, config)?.solve()?;
            Ok(scalar_response(&method, result))
        }
        Method::Jacobi | Method::GaussSeidel => {
            let variables = request.require_variables()?;
            let system = compile_system(request.require_equations()?, variables)?;
            let guess = request.require_vector_guess()?;
            let sweep = match request.method {
                Method::Jacobi => Sweep::Jacobi,
                _ => Sweep::GaussSeidel,
            };
            let result =
                LinearStationary::new(&system, variables, &guess, sweep, config)?.solve()?;
            Ok(vector_response(&method, result, variables))
        }
        Method::Broyden => {
            let variables = request.require_variables()?;
            let system = compile_system(request.require_equations()?, variables)?;
            let guess = request.require_vector_guess()?;
            let result = Broyden::new(&system, variables, &guess, config)?.solve()?;
            Ok(vector_response(&method, result, variables))
        }
        Method::Trapezoidal => {
            let f = compile_single_variable(request.require_equation()?)?;
            let a = SolveRequest::require_f64(request.a, "a")?;
            let b = SolveRequest::require_f64(request.b, "b")?;
            let n = SolveRequest::require_usize(request.n, "n")?;
            let result = Trapezoidal::new(f, a, b, n)?.solve()?;
            Ok(area_response(&method, result))
        }
        Method::Simpson => {
            let f = compile_single_variable(request.require_equation()?)?;
            let a = SolveRequest::require_f64(request.a, "a")?;
            let b = SolveRequest::require_f64(request.b, "b")?;
            let n = SolveRequest::require_usize(request.n, "n")?;
            let result = Simpson::new(f, a, b, n)?.solve()?;
            Ok(area_response(&method, result))
        }
        Method::Euler | Method::EulerImproved => {
            let rhs = parse_expression(request.require_equation()?)?;
            let f = Expression::from_expr(rhs, vec!["x".to_string(), "y".to_string()])?;
            let x0 = SolveRequest::require_f64(request.x0, "x0")?;
            let y0 = SolveRequest::require_f64(request.y0, "y0")?;
            let h = SolveRequest::require_f64(request.h, "h")?;
            let n = SolveRequest::require_usize(request.n, "n")?;
            let variant = match request.method {
                Method::Euler => EulerVariant::Basic,
                _ => EulerVariant::Improved,
            };
            let result = Euler::new(f, x0, y0, h, n, variant)?.solve()?;
            let plot = plot::ode_polyline(&method, result.trace.records());
            Ok(SolveResponse::success(result, &[], plot))
        }
    }
}

fn scalar_response(method: &str, result: SolverResult) -> SolveResponse {
    let plot = plot::scalar_convergence(method, result.trace.records());
    SolveResponse::success(result, &[], plot)
}

fn vector_response(
    method: &str,
    result: SolverResult,
    variables: &[String],
) -> SolveResponse {
    let plot = plot::vector_convergence(method, result.trace.records(), variables);
    SolveResponse::success(result, variables, plot)
}

fn area_response(method: &str, result: SolverResult) -> SolveResponse {
    let plot = plot::cumulative_area(method, result.trace.records());
    SolveResponse::success(result, &[], plot)
}

/// Parses a formula that may be written as an equation: `lhs = rhs` is
/// rewritten to `lhs - (rhs)` so both spellings name the same root problem.
fn parse_equation(input: &str) -> Result<Expr, EngineError> {
    match input.split_once('=') {
        Some((_, rhs)) if rhs.contains('=') => Err(EngineError::Parse(format!(
            "more than one '=' in '{}'",
            input
        ))),
        Some((lhs, rhs)) => Ok(parse_expression(lhs)? - parse_expression(rhs)?),
        None => parse_expression(input),
    }
}

/// Compiles a single-variable formula, inferring the variable name from the
/// formula itself. A constant formula binds to `x`.
fn compile_single_variable(input: &str) -> Result<Expression, EngineError> {
    let expr = parse_equation(input)?;
    let mut names = expr.all_variables();
    match names.len() {
        0 => Expression::from_expr(expr, vec!["x".to_string()]),
        1 => {
            let name = names.remove(0);
            Expression::from_expr(expr, vec![name])
        }
        n => Err(EngineError::DimensionMismatch(format!(
            "expected a single-variable formula, '{}' uses {} variables",
            input, n
        ))),
    }
}

/// Parses each equation of a system and checks every mentioned variable is
/// declared.
fn compile_system(equations: &[String], variables: &[String]) -> Result<Vec<Expr>, EngineError> {
    let mut system = Vec::with_capacity(equations.len());
    for equation in equations {
        let expr = parse_equation(equation)?;
        for name in expr.all_variables() {
            if !variables.contains(&name) {
                return Err(EngineError::Parse(format!(
                    "unknown variable '{}' in '{}'",
                    name, equation
                )));
            }
        }
        system.push(expr);
    }
    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn solve(payload: &str) -> Value {
        let request: SolveRequest = serde_json::from_str(payload).unwrap();
        serde_json::to_value(solve_request(&request)).unwrap()
    }

    #[test]
    fn bisection_round_trip() {
        let value = solve(
            r#"{ "method": "bisection", "equation": "x^2 - 4",
                 "a": 0.0, "b": 5.0, "iterations": 100 }"#,
        );
        assert_eq!(value["converged"], true);
        assert!((value["root"].as_f64().unwrap() - 2.0).abs() < 1e-4);
        let history = value["iteration_history"].as_array().unwrap();
        assert_eq!(history.len(), value["iterations"].as_u64().unwrap() as usize);
        assert_eq!(history[0]["iteration"], 1);
        // plot_json is an opaque string but must itself be valid JSON
        let plot: Value =
            serde_json::from_str(value["plot_json"].as_str().unwrap()).unwrap();
        assert!(plot["data"].is_array());
    }

    #[test]
    fn equation_form_with_equals_sign_is_accepted() {
        let value = solve(
            r#"{ "method": "bisection", "equation": "x^2 = 4",
                 "a": 0.0, "b": 5.0 }"#,
        );
        assert!((value["root"].as_f64().unwrap() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn missing_required_field_becomes_a_failure_payload() {
        let value = solve(r#"{ "method": "bisection", "equation": "x^2 - 4" }"#);
        assert_eq!(
            value,
            json!({ "error": "missing required parameter 'a'" })
        );
    }

    #[test]
    fn malformed_equation_becomes_a_parse_failure() {
        let value = solve(
            r#"{ "method": "secant", "equation": "2x +* 1", "x0": 0.0, "x1": 1.0 }"#,
        );
        assert!(value["error"].as_str().unwrap().starts_with("parse error"));
    }

    #[test]
    fn no_sign_change_becomes_a_categorized_failure() {
        let value = solve(
            r#"{ "method": "bisection", "equation": "x^2 + 1",
                 "a": -1.0, "b": 1.0 }"#,
        );
        assert!(value["error"]
            .as_str()
            .unwrap()
            .contains("does not change sign"));
    }

    #[test]
    fn newton_raphson_uses_the_scalar_initial_guess() {
        let value = solve(
            r#"{ "method": "newton_raphson", "equation": "x^2 - 2",
                 "initial_guess": 1.0 }"#,
        );
        assert_eq!(value["converged"], true);
        assert!((value["root"].as_f64().unwrap() - 2f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn fixed_point_reads_g_function() {
        let value = solve(
            r#"{ "method": "fixed_point", "gFunction": "cos(x)",
                 "initial_guess": 0.5, "iterations": 200 }"#,
        );
        assert_eq!(value["converged"], true);
        let root = value["root"].as_f64().unwrap();
        assert!((root.cos() - root).abs() < 1e-5);
    }

    #[test]
    fn exhausting_the_budget_is_a_success_with_converged_false() {
        let value = solve(
            r#"{ "method": "fixed_point", "gFunction": "-x",
                 "initial_guess": 1.0, "iterations": 5 }"#,
        );
        assert_eq!(value["converged"], false);
        assert_eq!(value["iterations"], 5);
        assert!(value.get("error").is_none());
    }

    #[test]
    fn gauss_seidel_round_trip_keys_solution_by_variable() {
        let value = solve(
            r#"{ "method": "gauss_seidel",
                 "equations": ["10x - y - 8", "x + 5y - 11"],
                 "variables": ["x", "y"],
                 "initial_guess": [0.0, 0.0],
                 "iterations": 50 }"#,
        );
        assert_eq!(value["converged"], true);
        assert!((value["solution"]["x"].as_f64().unwrap() - 1.0).abs() < 1e-4);
        assert!((value["solution"]["y"].as_f64().unwrap() - 2.0).abs() < 1e-4);
        // vector history entries carry the iterate as an array
        assert!(value["iteration_history"][0]["x"].is_array());
    }

    #[test]
    fn undeclared_variable_in_a_system_is_a_parse_failure() {
        let value = solve(
            r#"{ "method": "jacobi",
                 "equations": ["10x - z - 8", "x + 5y - 11"],
                 "variables": ["x", "y"],
                 "initial_guess": [0.0, 0.0] }"#,
        );
        assert!(value["error"].as_str().unwrap().contains("'z'"));
    }

    #[test]
    fn simpson_area_of_a_parabola() {
        let value = solve(
            r#"{ "method": "simpson", "equation": "x^2",
                 "a": 0.0, "b": 2.0, "n": 4 }"#,
        );
        assert!((value["area"].as_f64().unwrap() - 8.0 / 3.0).abs() < 1e-4);
        assert!(value.get("root").is_none());
    }

    #[test]
    fn simpson_rejects_odd_n_through_the_wire() {
        let value = solve(
            r#"{ "method": "simpson", "equation": "x^2",
                 "a": 0.0, "b": 2.0, "n": 5 }"#,
        );
        assert!(value["error"].as_str().unwrap().contains("even"));
    }

    #[test]
    fn euler_with_zero_slope_holds_the_initial_value() {
        let value = solve(
            r#"{ "method": "euler", "equation": "0x + 0y",
                 "x0": 0.0, "y0": 5.0, "h": 0.1, "n": 10 }"#,
        );
        assert_eq!(value["converged"], true);
        assert!((value["final_point"]["y"].as_f64().unwrap() - 5.0).abs() < 1e-12);
        for record in value["iteration_history"].as_array().unwrap() {
            assert_eq!(record["slope"], 0.0);
        }
    }

    #[test]
    fn improved_euler_history_carries_predictor_fields() {
        let value = solve(
            r#"{ "method": "euler_improved", "equation": "y + 0x",
                 "x0": 0.0, "y0": 1.0, "h": 0.1, "n": 5 }"#,
        );
        let first = &value["iteration_history"][0];
        assert!(first["y_predictor"].is_number());
        assert!(first["slope2"].is_number());
    }

    #[test]
    fn single_variable_methods_accept_any_variable_name() {
        let value = solve(
            r#"{ "method": "newton_raphson", "equation": "t^2 - 9",
                 "initial_guess": 5.0 }"#,
        );
        assert!((value["root"].as_f64().unwrap() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn two_variables_in_a_scalar_method_is_a_dimension_failure() {
        let value = solve(
            r#"{ "method": "bisection", "equation": "x + y",
                 "a": 0.0, "b": 1.0 }"#,
        );
        assert!(value["error"].as_str().unwrap().starts_with("dimension mismatch"));
    }
}
