//! Turns a string formula into a symbolic [`Expr`].
//!
//! A small tokenizer feeds a precedence-climbing parser, replacing the ad hoc
//! string-splitting approach with a proper expression tree. Supported syntax:
//! `+ - * / ^`, parentheses, implicit multiplication (`2x`, `3(x+1)`,
//! `x sin(x)`), the constants `pi` and `e`, and the functions `sqrt`, `exp`,
//! `ln`/`log`, `sin`, `cos`, `tan`/`tg`, `cot`/`ctg`, `sec`, `csc`.
//!
//! ```
//! use numethods::symbolic::parse_expr::parse_expression;
//! use numethods::symbolic::symbolic_engine::Expr;
//!
//! let expr = parse_expression("2x + 1").unwrap();
//! assert_eq!(
//!     expr,
//!     Expr::Const(2.0) * Expr::Var("x".to_string()) + Expr::Const(1.0)
//! );
//! ```

use crate::error::EngineError;
use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::{E, PI};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(input: &str) -> Result<Vec<Token>, EngineError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Token::Slash);
                i += 1;
            }
            '^' => {
                tokens.push(Token::Caret);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text.parse::<f64>().map_err(|_| {
                    EngineError::Parse(format!("malformed number '{}' at position {}", text, start))
                })?;
                tokens.push(Token::Num(value));
            }
            _ if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Token::Ident(chars[start..i].iter().collect()));
            }
            _ => {
                return Err(EngineError::Parse(format!(
                    "unsupported character '{}' at position {}",
                    c, i
                )));
            }
        }
    }
    if tokens.is_empty() {
        return Err(EngineError::Parse("empty expression".to_string()));
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

const ADD_PREC: u8 = 1;
const MUL_PREC: u8 = 2;
const POW_PREC: u8 = 3;

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, EngineError> {
        let mut lhs = self.parse_unary()?;
        loop {
            // (precedence, right-associative, consume the token)
            let (prec, right_assoc, explicit) = match self.peek() {
                Some(Token::Plus) | Some(Token::Minus) => (ADD_PREC, false, true),
                Some(Token::Star) | Some(Token::Slash) => (MUL_PREC, false, true),
                Some(Token::Caret) => (POW_PREC, true, true),
                // adjacency means multiplication: `2x`, `3(x+1)`, `x sin(x)`
                Some(Token::Num(_)) | Some(Token::Ident(_)) | Some(Token::LParen) => {
                    (MUL_PREC, false, false)
                }
                _ => break,
            };
            if prec < min_prec {
                break;
            }
            let op = if explicit { self.next() } else { Some(Token::Star) };
            let next_min = if right_assoc { prec } else { prec + 1 };
            let rhs = self.parse_expr(next_min)?;
            lhs = match op {
                Some(Token::Plus) => Expr::Add(lhs.boxed(), rhs.boxed()),
                Some(Token::Minus) => Expr::Sub(lhs.boxed(), rhs.boxed()),
                Some(Token::Star) => Expr::Mul(lhs.boxed(), rhs.boxed()),
                Some(Token::Slash) => Expr::Div(lhs.boxed(), rhs.boxed()),
                Some(Token::Caret) => Expr::Pow(lhs.boxed(), rhs.boxed()),
                _ => unreachable!(),
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr, EngineError> {
        match self.peek() {
            Some(Token::Minus) => {
                self.next();
                // binds looser than ^ so that -x^2 reads -(x^2)
                let inner = self.parse_expr(POW_PREC)?;
                Ok(Expr::Mul(Expr::Const(-1.0).boxed(), inner.boxed()))
            }
            Some(Token::Plus) => {
                self.next();
                self.parse_unary()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, EngineError> {
        match self.next() {
            Some(Token::Num(value)) => Ok(Expr::Const(value)),
            Some(Token::Ident(name)) => {
                if self.peek() == Some(&Token::LParen) && is_function(&name) {
                    self.next();
                    let arg = self.parse_expr(0)?;
                    match self.next() {
                        Some(Token::RParen) => Ok(apply_function(&name, arg)),
                        _ => Err(EngineError::Parse(format!(
                            "unbalanced parentheses: '{}(' is never closed",
                            name
                        ))),
                    }
                } else if is_function(&name) {
                    Err(EngineError::Parse(format!(
                        "function '{}' must be followed by a parenthesized argument",
                        name
                    )))
                } else {
                    Ok(named_constant(&name).unwrap_or(Expr::Var(name)))
                }
            }
            Some(Token::LParen) => {
                let inner = self.parse_expr(0)?;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(EngineError::Parse(
                        "unbalanced parentheses: '(' is never closed".to_string(),
                    )),
                }
            }
            Some(token) => Err(EngineError::Parse(format!(
                "unexpected token {:?}",
                token
            ))),
            None => Err(EngineError::Parse(
                "expression ends where an operand was expected".to_string(),
            )),
        }
    }
}

fn is_function(name: &str) -> bool {
    matches!(
        name,
        "sqrt" | "exp" | "ln" | "log" | "sin" | "cos" | "tan" | "tg" | "cot" | "ctg" | "sec"
            | "csc"
    )
}

fn named_constant(name: &str) -> Option<Expr> {
    match name {
        "pi" => Some(Expr::Const(PI)),
        "e" => Some(Expr::Const(E)),
        _ => None,
    }
}

/// `sqrt`, `sec` and `csc` are rewritten in terms of the core variants so
/// that differentiation and evaluation only ever see the base set.
fn apply_function(name: &str, arg: Expr) -> Expr {
    match name {
        "sqrt" => Expr::Pow(arg.boxed(), Expr::Const(0.5).boxed()),
        "exp" => Expr::Exp(arg.boxed()),
        "ln" | "log" => Expr::Ln(arg.boxed()),
        "sin" => Expr::sin(arg.boxed()),
        "cos" => Expr::cos(arg.boxed()),
        "tan" | "tg" => Expr::tg(arg.boxed()),
        "cot" | "ctg" => Expr::ctg(arg.boxed()),
        "sec" => Expr::Div(Expr::Const(1.0).boxed(), Expr::cos(arg.boxed()).boxed()),
        "csc" => Expr::Div(Expr::Const(1.0).boxed(), Expr::sin(arg.boxed()).boxed()),
        _ => unreachable!("is_function() gates the names reaching here"),
    }
}

/// Parses a formula into a symbolic expression tree.
pub fn parse_expression(input: &str) -> Result<Expr, EngineError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr(0)?;
    if parser.pos != parser.tokens.len() {
        return Err(EngineError::Parse(format!(
            "trailing input after a complete expression: {:?}",
            parser.tokens[parser.pos]
        )));
    }
    Ok(expr)
}
