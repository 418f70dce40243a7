#![allow(non_camel_case_types)]

use std::fmt;

/// Core symbolic expression enum representing a formula as an abstract
/// syntax tree.
///
/// Variants use `Box<Expr>` for recursive structure, so arbitrarily deep
/// trees are possible. Function names follow mathematical notation (`tg`,
/// `ctg`) rather than programming conventions; the parser accepts both
/// spellings. `sqrt`, `sec` and `csc` have no variants of their own: the
/// parser rewrites them to `Pow(·, 0.5)`, `1/cos(·)` and `1/sin(·)`.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g. "x", "y")
    Var(String),
    /// Numerical constant value
    Const(f64),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    /// Tangent, mathematical notation `tg`
    tg(Box<Expr>),
    /// Cotangent, mathematical notation `ctg`
    ctg(Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// Convenience wrapper for building the recursive variants.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Collects every variable name occurring in the expression, sorted and
    /// deduplicated.
    pub fn all_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            Expr::Var(name) => names.push(name.clone()),
            Expr::Const(_) => {}
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.collect_variables(names);
                rhs.collect_variables(names);
            }
            Expr::Exp(expr) | Expr::Ln(expr) | Expr::sin(expr) | Expr::cos(expr)
            | Expr::tg(expr) | Expr::ctg(expr) => expr.collect_variables(names),
        }
    }

    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => {
                lhs.contains_variable(var_name) || rhs.contains_variable(var_name)
            }
            Expr::Exp(expr) | Expr::Ln(expr) | Expr::sin(expr) | Expr::cos(expr)
            | Expr::tg(expr) | Expr::ctg(expr) => expr.contains_variable(var_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_overloads_build_the_expected_tree() {
        let x = Expr::Var("x".to_string());
        let expr = x.clone() * x + Expr::Const(1.0);
        assert_eq!(
            expr,
            Expr::Add(
                Box::new(Expr::Mul(
                    Box::new(Expr::Var("x".to_string())),
                    Box::new(Expr::Var("x".to_string()))
                )),
                Box::new(Expr::Const(1.0))
            )
        );
    }

    #[test]
    fn all_variables_is_sorted_and_deduplicated() {
        let expr = Expr::Var("y".to_string())
            + Expr::Var("x".to_string()) * Expr::Var("y".to_string());
        assert_eq!(expr.all_variables(), vec!["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn display_round_trips_through_the_parser() {
        let expr = Expr::sin(Expr::Var("x".to_string()).boxed())
            / (Expr::Var("x".to_string()) + Expr::Const(2.0));
        let reparsed = crate::symbolic::parse_expr::parse_expression(&expr.to_string()).unwrap();
        assert_eq!(reparsed, expr);
    }

    #[test]
    fn contains_variable_sees_through_functions() {
        let expr = Expr::Exp(Expr::Ln(Expr::Var("alpha".to_string()).boxed()).boxed());
        assert!(expr.contains_variable("alpha"));
        assert!(!expr.contains_variable("beta"));
    }
}
