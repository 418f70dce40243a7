//! Symbolic layer: expression trees, parsing, differentiation and checked
//! evaluation.
//!
//! ```
//! use numethods::symbolic::compiled::Expression;
//!
//! let f = Expression::compile("x^2 - 4", &["x"]).unwrap();
//! assert_eq!(f.call(&[3.0]).unwrap(), 5.0);
//! ```

/// Compiled formulas bound to a declared variable list.
pub mod compiled;
/// Tokenizer and precedence-climbing parser producing [`symbolic_engine::Expr`].
pub mod parse_expr;
/// The `Expr` tree and its basic manipulation methods.
pub mod symbolic_engine;
/// Analytical differentiation rules.
pub mod symbolic_engine_derivatives;
/// Constant folding used to tidy derivatives and prove linearity.
pub mod symbolic_fold;
