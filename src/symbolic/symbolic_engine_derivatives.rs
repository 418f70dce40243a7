use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// Computes the analytical derivative of the expression with respect to
    /// a variable.
    ///
    /// Implements the standard rules (power, product, quotient, chain); for
    /// multivariable expressions this is the partial derivative. The result
    /// is not simplified; pass it through
    /// [`fold_constants`](Expr::fold_constants) when a tidy tree matters.
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Mul(rhs.clone(), rhs.clone())),
            ),
            // d/dx f^g covers both the power rule (constant g) and the
            // general case f^g * (g'*ln(f) + g*f'/f)
            Expr::Pow(base, exp) => {
                if !exp.contains_variable(var) {
                    Expr::Mul(
                        Box::new(Expr::Mul(
                            exp.clone(),
                            Box::new(Expr::Pow(
                                base.clone(),
                                Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                            )),
                        )),
                        Box::new(base.diff(var)),
                    )
                } else {
                    Expr::Mul(
                        Box::new(Expr::Pow(base.clone(), exp.clone())),
                        Box::new(Expr::Add(
                            Box::new(Expr::Mul(
                                Box::new(exp.diff(var)),
                                Box::new(Expr::Ln(base.clone())),
                            )),
                            Box::new(Expr::Div(
                                Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                                base.clone(),
                            )),
                        )),
                    )
                }
            }
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::ctg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::sin(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression;
    use approx::assert_relative_eq;

    fn eval1(expr: &Expr, x: f64) -> f64 {
        expr.eval(&["x".to_string()], &[x]).unwrap()
    }

    #[test]
    fn power_rule() {
        let d = parse_expression("x^3").unwrap().diff("x").fold_constants();
        assert_relative_eq!(eval1(&d, 2.0), 12.0);
    }

    #[test]
    fn product_and_chain_rule() {
        // d/dx x*sin(x^2) = sin(x^2) + 2x^2 cos(x^2)
        let d = parse_expression("x * sin(x^2)").unwrap().diff("x");
        let x: f64 = 0.7;
        let expected = (x * x).sin() + 2.0 * x * x * (x * x).cos();
        assert_relative_eq!(eval1(&d, x), expected, epsilon = 1e-12);
    }

    #[test]
    fn quotient_rule() {
        // d/dx (x / (x+1)) = 1/(x+1)^2
        let d = parse_expression("x / (x + 1)").unwrap().diff("x");
        assert_relative_eq!(eval1(&d, 1.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn exp_and_ln() {
        let d = parse_expression("exp(2x)").unwrap().diff("x");
        assert_relative_eq!(eval1(&d, 0.5), 2.0 * 1f64.exp(), epsilon = 1e-12);
        let d = parse_expression("ln(x)").unwrap().diff("x");
        assert_relative_eq!(eval1(&d, 4.0), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn variable_exponent_uses_general_rule() {
        // d/dx 2^x = 2^x ln 2
        let d = parse_expression("2^x").unwrap().diff("x");
        assert_relative_eq!(
            eval1(&d, 3.0),
            8.0 * 2f64.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn partial_derivative_ignores_other_variables() {
        let expr = parse_expression("x^2 + y^2").unwrap();
        let d = expr.diff("y").fold_constants();
        let value = d
            .eval(&["x".to_string(), "y".to_string()], &[10.0, 3.0])
            .unwrap();
        assert_relative_eq!(value, 6.0);
    }
}
