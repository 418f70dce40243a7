use crate::symbolic::symbolic_engine::Expr;

impl Expr {
    /// Collapses numeric subtrees and the cheap algebraic identities
    /// (`x + 0`, `x * 1`, `x * 0`, `x ^ 1`, ...).
    ///
    /// Derivatives come out of [`diff`](Expr::diff) littered with `0 * ...`
    /// and `... + 0` terms; folding keeps evaluation cheap and lets the
    /// linear-system extraction decide whether a partial derivative is a
    /// plain constant.
    pub fn fold_constants(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => match (lhs.fold_constants(), rhs.fold_constants()) {
                (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
                (Expr::Const(a), r) if a == 0.0 => r,
                (l, Expr::Const(b)) if b == 0.0 => l,
                (l, r) => Expr::Add(l.boxed(), r.boxed()),
            },
            Expr::Sub(lhs, rhs) => match (lhs.fold_constants(), rhs.fold_constants()) {
                (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
                (l, Expr::Const(b)) if b == 0.0 => l,
                (l, r) => Expr::Sub(l.boxed(), r.boxed()),
            },
            Expr::Mul(lhs, rhs) => match (lhs.fold_constants(), rhs.fold_constants()) {
                (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
                (Expr::Const(a), _) | (_, Expr::Const(a)) if a == 0.0 => Expr::Const(0.0),
                (Expr::Const(a), r) if a == 1.0 => r,
                (l, Expr::Const(b)) if b == 1.0 => l,
                (l, r) => Expr::Mul(l.boxed(), r.boxed()),
            },
            Expr::Div(lhs, rhs) => match (lhs.fold_constants(), rhs.fold_constants()) {
                // constant folding must not swallow division by zero
                (Expr::Const(a), Expr::Const(b)) if b != 0.0 => Expr::Const(a / b),
                (Expr::Const(a), r) if a == 0.0 && !r.is_zero() => Expr::Const(0.0),
                (l, Expr::Const(b)) if b == 1.0 => l,
                (l, r) => Expr::Div(l.boxed(), r.boxed()),
            },
            Expr::Pow(base, exp) => match (base.fold_constants(), exp.fold_constants()) {
                (Expr::Const(a), Expr::Const(b)) if a.powf(b).is_finite() => {
                    Expr::Const(a.powf(b))
                }
                (l, Expr::Const(b)) if b == 1.0 => l,
                (_, Expr::Const(b)) if b == 0.0 => Expr::Const(1.0),
                (l, r) => Expr::Pow(l.boxed(), r.boxed()),
            },
            Expr::Exp(expr) => match expr.fold_constants() {
                Expr::Const(a) => Expr::Const(a.exp()),
                e => Expr::Exp(e.boxed()),
            },
            Expr::Ln(expr) => match expr.fold_constants() {
                // non-positive arguments stay symbolic; they are a domain
                // error at evaluation time, not a folding concern
                Expr::Const(a) if a > 0.0 => Expr::Const(a.ln()),
                e => Expr::Ln(e.boxed()),
            },
            Expr::sin(expr) => match expr.fold_constants() {
                Expr::Const(a) => Expr::Const(a.sin()),
                e => Expr::sin(e.boxed()),
            },
            Expr::cos(expr) => match expr.fold_constants() {
                Expr::Const(a) => Expr::Const(a.cos()),
                e => Expr::cos(e.boxed()),
            },
            Expr::tg(expr) => Expr::tg(expr.fold_constants().boxed()),
            Expr::ctg(expr) => Expr::ctg(expr.fold_constants().boxed()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::parse_expression;

    #[test]
    fn folds_numeric_subtrees() {
        let expr = parse_expression("2 * 3 + x").unwrap().fold_constants();
        assert_eq!(
            expr,
            Expr::Add(
                Expr::Const(6.0).boxed(),
                Expr::Var("x".to_string()).boxed()
            )
        );
    }

    #[test]
    fn derivative_of_linear_term_folds_to_constant() {
        let d = parse_expression("3x + 2y - 5")
            .unwrap()
            .diff("x")
            .fold_constants();
        assert_eq!(d, Expr::Const(3.0));
    }

    #[test]
    fn division_derivative_folds_to_constant() {
        let d = parse_expression("x / 2").unwrap().diff("x").fold_constants();
        assert_eq!(d, Expr::Const(0.5));
    }

    #[test]
    fn nonlinear_partial_keeps_its_variable() {
        let d = parse_expression("x * y").unwrap().diff("x").fold_constants();
        assert_eq!(d, Expr::Var("y".to_string()));
    }

    #[test]
    fn does_not_fold_division_by_zero() {
        let expr = parse_expression("1 / (x - x)").unwrap().fold_constants();
        assert!(matches!(expr, Expr::Div(_, _)));
    }
}
