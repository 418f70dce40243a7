use crate::error::EngineError;
use crate::symbolic::parse_expr::parse_expression;
use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// Checked evaluation with the declared variable names bound to `vals`
    /// position by position.
    ///
    /// Division by zero, `ln` of a non-positive value and fractional powers
    /// of negative bases surface as [`EngineError::Domain`]; they depend on
    /// the iterate and therefore cannot be caught at parse time.
    pub(crate) fn eval(&self, names: &[String], vals: &[f64]) -> Result<f64, EngineError> {
        match self {
            Expr::Var(name) => names
                .iter()
                .position(|n| n == name)
                .map(|i| vals[i])
                .ok_or_else(|| EngineError::Parse(format!("unknown variable '{}'", name))),
            Expr::Const(val) => Ok(*val),
            Expr::Add(lhs, rhs) => Ok(lhs.eval(names, vals)? + rhs.eval(names, vals)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval(names, vals)? - rhs.eval(names, vals)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval(names, vals)? * rhs.eval(names, vals)?),
            Expr::Div(lhs, rhs) => {
                let denominator = rhs.eval(names, vals)?;
                if denominator == 0.0 {
                    return Err(EngineError::Domain(format!(
                        "division by zero in '{}'",
                        self
                    )));
                }
                Ok(lhs.eval(names, vals)? / denominator)
            }
            Expr::Pow(base, exp) => {
                let b = base.eval(names, vals)?;
                let e = exp.eval(names, vals)?;
                let value = b.powf(e);
                if value.is_nan() {
                    return Err(EngineError::Domain(format!(
                        "'{}' is undefined for base {} and exponent {}",
                        self, b, e
                    )));
                }
                Ok(value)
            }
            Expr::Exp(expr) => Ok(expr.eval(names, vals)?.exp()),
            Expr::Ln(expr) => {
                let arg = expr.eval(names, vals)?;
                if arg <= 0.0 {
                    return Err(EngineError::Domain(format!(
                        "ln of non-positive value {} in '{}'",
                        arg, self
                    )));
                }
                Ok(arg.ln())
            }
            Expr::sin(expr) => Ok(expr.eval(names, vals)?.sin()),
            Expr::cos(expr) => Ok(expr.eval(names, vals)?.cos()),
            Expr::tg(expr) => {
                let arg = expr.eval(names, vals)?;
                let c = arg.cos();
                if c == 0.0 {
                    return Err(EngineError::Domain(format!(
                        "tangent undefined at {} in '{}'",
                        arg, self
                    )));
                }
                Ok(arg.sin() / c)
            }
            Expr::ctg(expr) => {
                let arg = expr.eval(names, vals)?;
                let s = arg.sin();
                if s == 0.0 {
                    return Err(EngineError::Domain(format!(
                        "cotangent undefined at {} in '{}'",
                        arg, self
                    )));
                }
                Ok(arg.cos() / s)
            }
        }
    }
}

/// A formula compiled against a declared, ordered variable list.
///
/// Immutable once built; evaluation is pure, so the same `Expression` may be
/// shared across any number of concurrent solves.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    expr: Expr,
    variables: Vec<String>,
}

impl Expression {
    /// Parses `formula` and binds it to `variables`. Fails with a parse
    /// error when the formula is malformed or mentions a variable that was
    /// not declared.
    pub fn compile(formula: &str, variables: &[&str]) -> Result<Self, EngineError> {
        let expr = parse_expression(formula)?;
        Self::from_expr(expr, variables.iter().map(|s| s.to_string()).collect())
    }

    /// Binds an already-parsed tree to a variable list, with the same
    /// undeclared-variable check as [`compile`](Self::compile).
    pub fn from_expr(expr: Expr, variables: Vec<String>) -> Result<Self, EngineError> {
        for name in expr.all_variables() {
            if !variables.contains(&name) {
                return Err(EngineError::Parse(format!(
                    "unknown variable '{}' in '{}'",
                    name, expr
                )));
            }
        }
        Ok(Expression { expr, variables })
    }

    /// Evaluates the formula at `args`, given position by position in the
    /// declared variable order.
    pub fn call(&self, args: &[f64]) -> Result<f64, EngineError> {
        if args.len() != self.variables.len() {
            return Err(EngineError::DimensionMismatch(format!(
                "expression over {} variable(s) called with {} argument(s)",
                self.variables.len(),
                args.len()
            )));
        }
        self.expr.eval(&self.variables, args)
    }

    /// The symbolic derivative with respect to `var`, constant-folded,
    /// bound to the same variable list.
    pub fn differentiate(&self, var: &str) -> Expression {
        Expression {
            expr: self.expr.diff(var).fold_constants(),
            variables: self.variables.clone(),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn arity(&self) -> usize {
        self.variables.len()
    }
}
