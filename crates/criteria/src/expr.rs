//! Filter expressions
//!
//! ```text
//! id = 6
//! status != 'closed' and total >= 10.5
//! customer.name = "Ada" or vip = true
//! ```
//!
//! `and` binds tighter than `or`. Literals are integers, floats, quoted
//! strings, `true`, `false` and `null`.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use shared::{DomainName, InvalidFilterShapeError, Result};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^(?:'(?P<sq>[^']*)'|"(?P<dq>[^"]*)"|(?P<op>!=|<>|>=|<=|=|>|<)|(?P<word>[^\s=<>!'"]+))"#)
        .expect("valid filter token regex")
});

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    NotEq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(Op::Eq),
            "!=" | "<>" => Some(Op::NotEq),
            ">" => Some(Op::Gt),
            ">=" => Some(Op::Gte),
            "<" => Some(Op::Lt),
            "<=" => Some(Op::Lte),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::NotEq => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }

    /// Apply the operator to `left <op> right`
    ///
    /// Numbers compare numerically and strings lexically. Ordering
    /// operators on any other pair are false.
    pub fn apply(&self, left: &Value, right: &Value) -> bool {
        match self {
            Op::Eq => values_equal(left, right),
            Op::NotEq => !values_equal(left, right),
            Op::Gt => compare_values(left, right) == Some(Ordering::Greater),
            Op::Gte => matches!(compare_values(left, right), Some(Ordering::Greater | Ordering::Equal)),
            Op::Lt => compare_values(left, right) == Some(Ordering::Less),
            Op::Lte => matches!(compare_values(left, right), Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(l), Some(r)) if left.is_number() && right.is_number() => l == r,
        _ => left == right,
    }
}

/// Ordering of two literals: numbers numerically, strings lexically
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// A single `<attr> <op> <value>` comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    attr_list: Vec<String>,
    op: Op,
    value: Value,
}

impl Expr {
    pub fn new(attr: &str, op: Op, value: impl Into<Value>) -> Result<Self> {
        let attr_list: Vec<String> = attr.split('.').map(|s| s.to_string()).collect();
        if attr_list.iter().any(|s| s.trim().is_empty()) {
            return Err(parse_error(attr, "attribute has an empty segment").into());
        }
        Ok(Self {
            attr_list,
            op,
            value: value.into(),
        })
    }

    /// Attribute path segments
    pub fn attr_list(&self) -> &[String] {
        &self.attr_list
    }

    /// Attribute path joined with `.`
    pub fn attr(&self) -> String {
        self.attr_list.join(".")
    }

    pub fn op(&self) -> Op {
        self.op
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Check if the path already carries the domain's qualifier
    pub fn is_qualified(&self, domain: &DomainName) -> bool {
        domain.is_qualified_path(&self.attr_list)
    }

    /// Prefix the attribute path with the domain's qualifier
    pub fn qualify(self, domain: &DomainName) -> Result<Self> {
        if self.is_qualified(domain) {
            return Err(InvalidFilterShapeError::QualifiedAttribute.into());
        }
        Ok(Self {
            attr_list: domain.qualify_attr(&self.attr_list),
            ..self
        })
    }

    /// Attribute path relative to the entity, with any qualifier removed
    pub fn relative_attr(&self, domain: &DomainName) -> String {
        let qualifier = domain.qualify_attr::<&str>(&[]);
        if self.attr_list.starts_with(&qualifier) {
            self.attr_list[qualifier.len()..].join(".")
        } else {
            self.attr()
        }
    }

    /// Test a stored value against this comparison
    pub fn matches(&self, value: &Value) -> bool {
        self.op.apply(value, &self.value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.attr(), self.op.symbol(), self.value)
    }
}

/// Boolean tree of comparisons
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Expr(Expr),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    /// Parse a textual filter
    pub fn parse(input: &str) -> Result<Self> {
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let filter = parser.parse_or()?;
        if parser.pos < parser.tokens.len() {
            return Err(parse_error(input, "unexpected trailing input").into());
        }
        Ok(filter)
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Check if this is more than a single comparison
    pub fn is_conjunction(&self) -> bool {
        !matches!(self, Filter::Expr(_))
    }

    /// All comparisons, left to right
    pub fn exprs(&self) -> Vec<&Expr> {
        match self {
            Filter::Expr(expr) => vec![expr],
            Filter::And(l, r) | Filter::Or(l, r) => {
                let mut exprs = l.exprs();
                exprs.extend(r.exprs());
                exprs
            }
        }
    }

    /// Qualify every comparison with the domain's qualifier
    pub fn qualify(self, domain: &DomainName) -> Result<Self> {
        Ok(match self {
            Filter::Expr(expr) => Filter::Expr(expr.qualify(domain)?),
            Filter::And(l, r) => l.qualify(domain)?.and(r.qualify(domain)?),
            Filter::Or(l, r) => l.qualify(domain)?.or(r.qualify(domain)?),
        })
    }

    /// Evaluate the tree, deciding each comparison with `eval`
    pub fn evaluate<F>(&self, eval: &F) -> Result<bool>
    where
        F: Fn(&Expr) -> Result<bool>,
    {
        match self {
            Filter::Expr(expr) => eval(expr),
            Filter::And(l, r) => Ok(l.evaluate(eval)? && r.evaluate(eval)?),
            Filter::Or(l, r) => Ok(l.evaluate(eval)? || r.evaluate(eval)?),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Word(String),
    Str(String),
    Op(Op),
}

fn parse_error(expr: &str, reason: &str) -> InvalidFilterShapeError {
    InvalidFilterShapeError::Parse {
        expr: expr.to_string(),
        reason: reason.to_string(),
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut rest = input.trim_start();

    while !rest.is_empty() {
        let caps = TOKEN_RE
            .captures(rest)
            .ok_or_else(|| parse_error(input, &format!("unexpected input at `{}`", rest)))?;

        let token = if let Some(m) = caps.name("sq").or_else(|| caps.name("dq")) {
            Token::Str(m.as_str().to_string())
        } else if let Some(m) = caps.name("op") {
            let op = Op::from_symbol(m.as_str())
                .ok_or_else(|| parse_error(input, "unknown operator"))?;
            Token::Op(op)
        } else {
            Token::Word(caps["word"].to_string())
        };
        tokens.push(token);

        let consumed = caps.get(0).map_or(rest.len(), |m| m.end());
        rest = rest[consumed..].trim_start();
    }

    if tokens.is_empty() {
        return Err(parse_error(input, "empty expression").into());
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn parse_or(&mut self) -> Result<Filter> {
        let mut left = self.parse_and()?;
        while self.eat_keyword("or") {
            let right = self.parse_and()?;
            left = left.or(right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Filter> {
        let mut left = self.parse_comparison()?;
        while self.eat_keyword("and") {
            let right = self.parse_comparison()?;
            left = left.and(right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Filter> {
        let attr = match self.next() {
            Some(Token::Word(word)) if !is_keyword(&word) => word,
            _ => return Err(parse_error(self.input, "expected an attribute").into()),
        };
        let op = match self.next() {
            Some(Token::Op(op)) => op,
            _ => return Err(parse_error(self.input, "expected an operator").into()),
        };
        let value = match self.next() {
            Some(Token::Str(s)) => Value::String(s),
            Some(Token::Word(word)) => literal(&word)
                .ok_or_else(|| parse_error(self.input, &format!("expected a literal, got `{}`", word)))?,
            _ => return Err(parse_error(self.input, "expected a literal").into()),
        };
        Ok(Filter::Expr(Expr::new(&attr, op, value)?))
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        match self.tokens.get(self.pos) {
            Some(Token::Word(word)) if word.eq_ignore_ascii_case(keyword) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }
}

fn is_keyword(word: &str) -> bool {
    word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("or")
}

fn literal(word: &str) -> Option<Value> {
    match word {
        "true" => return Some(Value::Bool(true)),
        "false" => return Some(Value::Bool(false)),
        "null" => return Some(Value::Null),
        _ => {}
    }
    if let Ok(i) = word.parse::<i64>() {
        return Some(Value::from(i));
    }
    word.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
