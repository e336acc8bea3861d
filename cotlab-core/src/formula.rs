//! Derived-series formulas such as `(MM Long - MM Short) / Open Interest`.
//!
//! A formula is arithmetic over metric columns. Columns are referenced by
//! short name or technical name, case-insensitively. Short names contain
//! spaces and operator characters (`Prod/Merc Long`, `Non-Rept Short`), so
//! the tokenizer tries the longest column name first at every position and
//! only falls back to operators when no name matches.

use std::fmt;
use std::sync::OnceLock;

use thiserror::Error;

use crate::columns::Metric;
use crate::record::CotRecord;

/// Longest accepted formula, in bytes.
pub const MAX_FORMULA_LEN: usize = 1024;

/// Deepest accepted nesting of parentheses and unary signs.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,

    #[error("invalid character '{ch}' at position {position}")]
    InvalidCharacter { ch: char, position: usize },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("columns not found: {0}")]
    UnknownColumn(String),

    #[error("unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("unexpected end of formula")]
    UnexpectedEnd,

    #[error("unexpected '{0}'")]
    UnexpectedToken(String),

    #[error("formula is longer than {} characters", MAX_FORMULA_LEN)]
    TooLong,

    #[error("formula nests deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Column(Metric),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Column(m) => f.write_str(m.short_name()),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::Slash => f.write_str("/"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Column(Metric),
    Neg(Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
}

/// A parsed formula, ready to evaluate against records.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    source: String,
    expr: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self, FormulaError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(FormulaError::Empty);
        }
        if source.len() > MAX_FORMULA_LEN {
            return Err(FormulaError::TooLong);
        }
        let tokens = tokenize(source)?;
        let mut parser = Parser {
            tokens,
            pos: 0,
            depth: 0,
        };
        let expr = parser.expr()?;
        match parser.peek() {
            None => Ok(Self {
                source: source.to_string(),
                expr,
            }),
            Some(Token::RParen) => Err(FormulaError::UnbalancedParentheses),
            Some(tok) => Err(FormulaError::UnexpectedToken(tok.to_string())),
        }
    }

    /// The formula text as entered (trimmed).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Metrics referenced by the formula, in order of first appearance.
    pub fn columns(&self) -> Vec<Metric> {
        fn walk(expr: &Expr, out: &mut Vec<Metric>) {
            match expr {
                Expr::Number(_) => {}
                Expr::Column(m) => {
                    if !out.contains(m) {
                        out.push(*m);
                    }
                }
                Expr::Neg(inner) => walk(inner, out),
                Expr::Binary(_, l, r) => {
                    walk(l, out);
                    walk(r, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.expr, &mut out);
        out
    }

    /// Evaluate for one record. Missing inputs and non-finite results give `None`.
    pub fn evaluate(&self, record: &CotRecord) -> Option<f64> {
        eval(&self.expr, record)
    }

    pub fn evaluate_series(&self, records: &[CotRecord]) -> Vec<Option<f64>> {
        records.iter().map(|r| self.evaluate(r)).collect()
    }
}

fn eval(expr: &Expr, record: &CotRecord) -> Option<f64> {
    let value = match expr {
        Expr::Number(n) => *n,
        Expr::Column(m) => record.metric(*m)?,
        Expr::Neg(inner) => -eval(inner, record)?,
        Expr::Binary(op, l, r) => {
            let (l, r) = (eval(l, record)?, eval(r, record)?);
            match op {
                BinOp::Add => l + r,
                BinOp::Sub => l - r,
                BinOp::Mul => l * r,
                BinOp::Div => l / r,
            }
        }
    };
    value.is_finite().then_some(value)
}

// ── Tokenizer ───────────────────────────────────────────────────────

/// Every referenceable name, longest first.
fn column_names() -> &'static [(&'static str, Metric)] {
    static NAMES: OnceLock<Vec<(&'static str, Metric)>> = OnceLock::new();
    NAMES.get_or_init(|| {
        let mut names: Vec<(&'static str, Metric)> = Metric::ALL
            .iter()
            .flat_map(|m| [(m.short_name(), *m), (m.column(), *m)])
            .collect();
        names.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        names
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Match a column name at the start of `rest`, requiring a word boundary after it.
fn match_column(rest: &str) -> Option<(Metric, usize)> {
    column_names().iter().find_map(|(name, metric)| {
        let len = name.len();
        if !rest.is_char_boundary(len) || !rest[..len].eq_ignore_ascii_case(name) {
            return None;
        }
        match rest[len..].chars().next() {
            Some(c) if is_word_char(c) => None,
            _ => Some((*metric, len)),
        }
    })
}

fn tokenize(source: &str) -> Result<Vec<Token>, FormulaError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = source[pos..].chars().next() {
        if c.is_whitespace() {
            pos += c.len_utf8();
            continue;
        }

        let rest = &source[pos..];
        if let Some((metric, len)) = match_column(rest) {
            tokens.push(Token::Column(metric));
            pos += len;
            continue;
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(tok) = single {
            tokens.push(tok);
            pos += 1;
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let len = rest
                .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
                .unwrap_or(rest.len());
            let text = &rest[..len];
            let value = text
                .parse::<f64>()
                .map_err(|_| FormulaError::InvalidNumber(text.to_string()))?;
            tokens.push(Token::Number(value));
            pos += len;
            continue;
        }

        if is_word_char(c) || c == '%' {
            let len = rest
                .char_indices()
                .skip(1)
                .find(|(_, ch)| !(is_word_char(*ch) || *ch == '%'))
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            return Err(FormulaError::UnknownColumn(rest[..len].to_string()));
        }

        return Err(FormulaError::InvalidCharacter { ch: c, position: pos });
    }

    Ok(tokens)
}

// ── Parser ──────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    /// Open parentheses and unary signs above the current token.
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.peek();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<Expr, FormulaError> {
        let mut lhs = self.factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                _ => return Ok(lhs),
            };
            self.pos += 1;
            let rhs = self.factor()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, FormulaError>,
    ) -> Result<T, FormulaError> {
        if self.depth >= MAX_DEPTH {
            return Err(FormulaError::TooDeep);
        }
        self.depth += 1;
        let out = f(self);
        self.depth -= 1;
        out
    }

    // factor := ('-' | '+') factor | number | column | '(' expr ')'
    fn factor(&mut self) -> Result<Expr, FormulaError> {
        match self.next() {
            None => Err(FormulaError::UnexpectedEnd),
            Some(Token::Minus) => self.nested(|p| Ok(Expr::Neg(Box::new(p.factor()?)))),
            Some(Token::Plus) => self.nested(Self::factor),
            Some(Token::Number(n)) => Ok(Expr::Number(n)),
            Some(Token::Column(m)) => Ok(Expr::Column(m)),
            Some(Token::LParen) => self.nested(|p| {
                let inner = p.expr()?;
                match p.next() {
                    Some(Token::RParen) => Ok(inner),
                    None => Err(FormulaError::UnbalancedParentheses),
                    Some(tok) => Err(FormulaError::UnexpectedToken(tok.to_string())),
                }
            }),
            Some(Token::RParen) => Err(FormulaError::UnbalancedParentheses),
            Some(tok) => Err(FormulaError::UnexpectedToken(tok.to_string())),
        }
    }
}
