//! Arithmetic Expressions
//!
//! A closed expression language for datapoints such as
//! `{task-clock} / 1000` or `({ops} * {threads}) / {time}`. The grammar only
//! knows numbers, metric references, parentheses, unary minus and the four
//! arithmetic operators:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := unary (('*' | '/') unary)*
//! unary   := ('-' | '+') unary | primary
//! primary := number | '{' name '}' | ident | '(' expr ')'
//! ```
//!
//! Metric names containing characters outside `[A-Za-z0-9_.]` (perf event
//! names like `L1-dcache-load-misses`) must be written in braces.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ExprError {
    /// The expression text is not well formed.
    #[error("Parse error at offset {position}: {message}")]
    Parse {
        /// Byte offset of the offending token
        position: usize,
        /// What went wrong
        message: String,
    },

    /// A referenced metric has no value in the evaluation context.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

/// Binary arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

impl BinaryOp {
    fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            BinaryOp::Add => lhs + rhs,
            BinaryOp::Sub => lhs - rhs,
            BinaryOp::Mul => lhs * rhs,
            BinaryOp::Div => lhs / rhs,
        }
    }

    fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Sub => '-',
            BinaryOp::Mul => '*',
            BinaryOp::Div => '/',
        }
    }
}

/// Source of metric values during evaluation
pub trait MetricLookup {
    /// Value of the named metric, if known
    fn metric(&self, name: &str) -> Option<f64>;
}

impl<S: std::hash::BuildHasher> MetricLookup for std::collections::HashMap<String, f64, S> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl MetricLookup for std::collections::BTreeMap<String, f64> {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// Parsed arithmetic expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expr {
    /// Numeric literal
    Number(f64),
    /// Reference to a metric by name
    Metric(String),
    /// Unary negation
    Neg(Box<Expr>),
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        lhs: Box<Expr>,
        /// Right operand
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// Parse an expression from text
    pub fn parse(input: &str) -> Result<Self, ExprError> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens: &tokens,
            pos: 0,
            end: input.len(),
        };
        let expr = parser.expr()?;
        if let Some(tok) = parser.peek() {
            return Err(ExprError::Parse {
                position: tok.offset,
                message: format!("unexpected {}", tok.kind),
            });
        }
        Ok(expr)
    }

    /// Evaluate against a metric source
    ///
    /// Arithmetic follows IEEE semantics: division by zero yields an infinity
    /// or NaN rather than an error.
    pub fn eval(&self, metrics: &impl MetricLookup) -> Result<f64, ExprError> {
        match self {
            Expr::Number(n) => Ok(*n),
            Expr::Metric(name) => metrics
                .metric(name)
                .ok_or_else(|| ExprError::UnknownMetric(name.clone())),
            Expr::Neg(inner) => Ok(-inner.eval(metrics)?),
            Expr::Binary { op, lhs, rhs } => Ok(op.apply(lhs.eval(metrics)?, rhs.eval(metrics)?)),
        }
    }

    /// Names of all referenced metrics, first occurrence order, no duplicates
    pub fn metrics(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_metrics(&mut names);
        names
    }

    fn collect_metrics<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Number(_) => {}
            Expr::Metric(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::Neg(inner) => inner.collect_metrics(names),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_metrics(names);
                rhs.collect_metrics(names);
            }
        }
    }
}

impl FromStr for Expr {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expr::parse(s)
    }
}

impl TryFrom<String> for Expr {
    type Error = ExprError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Expr::parse(&value)
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Metric(name) => write!(f, "{{{}}}", name),
            Expr::Neg(inner) => write!(f, "-{}", inner),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number(f64),
    Ident(String),
    Op(BinaryOp),
    LParen,
    RParen,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Ident(name) => write!(f, "metric '{}'", name),
            TokenKind::Op(op) => write!(f, "'{}'", op.symbol()),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
        }
    }
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExprError> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        let start = i;
        let kind = match c {
            b' ' | b'\t' | b'\n' | b'\r' => {
                i += 1;
                continue;
            }
            b'+' => TokenKind::Op(BinaryOp::Add),
            b'-' => TokenKind::Op(BinaryOp::Sub),
            b'*' => TokenKind::Op(BinaryOp::Mul),
            b'/' => TokenKind::Op(BinaryOp::Div),
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b'{' => {
                let close = input[start + 1..].find('}').ok_or(ExprError::Parse {
                    position: start,
                    message: "unterminated '{'".to_string(),
                })?;
                let name = &input[start + 1..start + 1 + close];
                if name.is_empty() {
                    return Err(ExprError::Parse {
                        position: start,
                        message: "empty metric name".to_string(),
                    });
                }
                i = start + close + 2;
                tokens.push(Token {
                    kind: TokenKind::Ident(name.to_string()),
                    offset: start,
                });
                continue;
            }
            b'0'..=b'9' | b'.' => {
                i = scan_number(bytes, start);
                let text = &input[start..i];
                let value = text.parse::<f64>().map_err(|_| ExprError::Parse {
                    position: start,
                    message: format!("invalid number '{}'", text),
                })?;
                tokens.push(Token {
                    kind: TokenKind::Number(value),
                    offset: start,
                });
                continue;
            }
            c if c.is_ascii_alphabetic() || c == b'_' => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'.')
                {
                    i += 1;
                }
                tokens.push(Token {
                    kind: TokenKind::Ident(input[start..i].to_string()),
                    offset: start,
                });
                continue;
            }
            _ => {
                let ch = input[start..].chars().next().unwrap_or('?');
                return Err(ExprError::Parse {
                    position: start,
                    message: format!("unexpected character '{}'", ch),
                });
            }
        };
        tokens.push(Token {
            kind,
            offset: start,
        });
        i += 1;
    }

    Ok(tokens)
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
        i += 1;
    }
    // Exponent: e, optional sign, at least one digit
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    end: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        self.pos += 1;
        tok
    }

    fn peek_op(&self, ops: &[BinaryOp]) -> Option<BinaryOp> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Op(op),
                ..
            }) if ops.contains(op) => Some(*op),
            _ => None,
        }
    }

    fn expr(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.term()?;
        while let Some(op) = self.peek_op(&[BinaryOp::Add, BinaryOp::Sub]) {
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.unary()?;
        while let Some(op) = self.peek_op(&[BinaryOp::Mul, BinaryOp::Div]) {
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> Result<Expr, ExprError> {
        match self.peek_op(&[BinaryOp::Add, BinaryOp::Sub]) {
            Some(BinaryOp::Sub) => {
                self.pos += 1;
                Ok(Expr::Neg(Box::new(self.unary()?)))
            }
            Some(_) => {
                self.pos += 1;
                self.unary()
            }
            None => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<Expr, ExprError> {
        let end = self.end;
        let Some(tok) = self.next().cloned() else {
            return Err(ExprError::Parse {
                position: end,
                message: "unexpected end of expression".to_string(),
            });
        };

        match tok.kind {
            TokenKind::Number(n) => Ok(Expr::Number(n)),
            TokenKind::Ident(name) => Ok(Expr::Metric(name)),
            TokenKind::LParen => {
                let inner = self.expr()?;
                match self.next() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    Some(other) => Err(ExprError::Parse {
                        position: other.offset,
                        message: format!("expected ')', found {}", other.kind),
                    }),
                    None => Err(ExprError::Parse {
                        position: end,
                        message: "missing ')'".to_string(),
                    }),
                }
            }
            other => Err(ExprError::Parse {
                position: tok.offset,
                message: format!("unexpected {}", other),
            }),
        }
    }
}
