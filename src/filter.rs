//! The sandboxed predicate language used inside `[?( ... )]`.
//!
//! ```text
//! or      := and ( "||" and )*
//! and     := term ( "&&" term )*
//! term    := "(" or ")" | operand ( cmpop operand )?
//! cmpop   := "==" | "===" | "!=" | "!==" | "<" | "<=" | ">" | ">="
//! operand := "@" | "@." ident | number | string | "true" | "false" | "null"
//! ```
//!
//! Anything outside this grammar fails to parse, and a predicate that fails to
//! parse matches nothing. Parentheses nest at most [`MAX_NESTING`] levels deep.

use std::borrow::Cow;
use std::cmp::Ordering;

use serde_json::Value;
use tracing::debug;

use crate::comparison::{cmp_values, truthy};
use crate::errors::{QueryError, Result};
use crate::parser::{ParseError, Parser};

/// Deepest parenthesis nesting a filter may use.
pub const MAX_NESTING: usize = 64;

/// `&&` and `||` chains are kept flat, so tree depth only grows with
/// parentheses.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare(Operand, CmpOp, Operand),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
    Test(Operand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Current,          // @
    Property(String), // @.name, @.length
    Literal(Value),   // "abc", 123, true/false/null
}

/// Compiles `expr` into a [`Predicate`].
pub fn parse_predicate(expr: &str) -> Result<Predicate> {
    let mut parser = Parser::new(expr);
    let parsed = parse_or(&mut parser, 0).and_then(|pred| {
        parser.skip_ws();
        if parser.eof() {
            Ok(pred)
        } else {
            Err(ParseError::InvalidSyntax(format!(
                "unexpected input at position {}",
                parser.pos()
            )))
        }
    });
    parsed.map_err(|e| QueryError::InvalidFilter(format!("{e} in {expr:?}")))
}

/// Evaluates `expr` against `item`; any parse failure yields `false`.
pub fn evaluate_predicate(expr: &str, item: &Value) -> bool {
    match parse_predicate(expr) {
        Ok(pred) => pred.matches(item),
        Err(err) => {
            debug!(error = %err, "filter expression rejected");
            false
        }
    }
}

fn parse_or(parser: &mut Parser, depth: usize) -> std::result::Result<Predicate, ParseError> {
    let mut alternatives = vec![parse_and(parser, depth)?];
    loop {
        parser.skip_ws();
        if parser.consume_str("||") {
            alternatives.push(parse_and(parser, depth)?);
        } else {
            break;
        }
    }
    Ok(flatten(alternatives, Predicate::Any))
}

fn parse_and(parser: &mut Parser, depth: usize) -> std::result::Result<Predicate, ParseError> {
    let mut terms = vec![parse_term(parser, depth)?];
    loop {
        parser.skip_ws();
        if parser.consume_str("&&") {
            terms.push(parse_term(parser, depth)?);
        } else {
            break;
        }
    }
    Ok(flatten(terms, Predicate::All))
}

fn flatten(mut parts: Vec<Predicate>, chain: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if parts.len() == 1 {
        parts.swap_remove(0)
    } else {
        chain(parts)
    }
}

fn parse_term(parser: &mut Parser, depth: usize) -> std::result::Result<Predicate, ParseError> {
    parser.skip_ws();
    if parser.consume_char('(') {
        if depth >= MAX_NESTING {
            return Err(ParseError::InvalidSyntax("nesting too deep".into()));
        }
        let inner = parse_or(parser, depth + 1)?;
        parser.skip_ws();
        parser.expect(')')?;
        return Ok(inner);
    }
    let left = parse_operand(parser)?;
    parser.skip_ws();
    match parse_cmp_op(parser) {
        Some(op) => {
            let right = parse_operand(parser)?;
            Ok(Predicate::Compare(left, op, right))
        }
        None => Ok(Predicate::Test(left)),
    }
}

fn parse_cmp_op(parser: &mut Parser) -> Option<CmpOp> {
    // Longest spellings first so `<=` is not read as `<`.
    const OPS: [(&str, CmpOp); 8] = [
        ("===", CmpOp::Eq),
        ("!==", CmpOp::Ne),
        ("==", CmpOp::Eq),
        ("!=", CmpOp::Ne),
        ("<=", CmpOp::Lte),
        (">=", CmpOp::Gte),
        ("<", CmpOp::Lt),
        (">", CmpOp::Gt),
    ];
    OPS.iter()
        .find(|(lit, _)| parser.consume_str(lit))
        .map(|(_, op)| *op)
}

fn parse_operand(parser: &mut Parser) -> std::result::Result<Operand, ParseError> {
    parser.skip_ws();
    match parser.peek_char() {
        Some('"' | '\'') => Ok(Operand::Literal(Value::String(
            parser.parse_quoted_string()?,
        ))),
        Some('@') => {
            parser.bump();
            if parser.consume_char('.') {
                Ok(Operand::Property(parser.parse_identifier()?))
            } else {
                Ok(Operand::Current)
            }
        }
        Some(c) if c == '-' || c.is_ascii_digit() => {
            Ok(Operand::Literal(parser.parse_number_literal()?))
        }
        _ if parser.consume_keyword("true") => Ok(Operand::Literal(Value::Bool(true))),
        _ if parser.consume_keyword("false") => Ok(Operand::Literal(Value::Bool(false))),
        _ if parser.consume_keyword("null") => Ok(Operand::Literal(Value::Null)),
        _ => Err(ParseError::InvalidSyntax("invalid operand".into())),
    }
}

impl Predicate {
    pub fn matches(&self, item: &Value) -> bool {
        match self {
            Predicate::Compare(a, op, b) => compare(
                resolve(a, item).as_deref(),
                *op,
                resolve(b, item).as_deref(),
            ),
            Predicate::All(terms) => terms.iter().all(|t| t.matches(item)),
            Predicate::Any(alternatives) => alternatives.iter().any(|a| a.matches(item)),
            Predicate::Test(op) => test(op, item),
        }
    }
}

/// `None` stands for an undefined reference, such as a missing property.
fn resolve<'v>(op: &'v Operand, item: &'v Value) -> Option<Cow<'v, Value>> {
    match op {
        Operand::Current => Some(Cow::Borrowed(item)),
        Operand::Literal(v) => Some(Cow::Borrowed(v)),
        Operand::Property(name) => match item {
            Value::Array(arr) if name == "length" => Some(Cow::Owned(Value::from(arr.len()))),
            Value::Object(map) => map.get(name).map(Cow::Borrowed),
            _ => None,
        },
    }
}

fn test(op: &Operand, item: &Value) -> bool {
    match (op, item) {
        (Operand::Property(name), Value::Array(arr)) if name == "length" => !arr.is_empty(),
        // A bare property is an existence check, even when its value is falsy.
        (Operand::Property(_), _) => resolve(op, item).is_some(),
        (Operand::Current, _) => truthy(item),
        (Operand::Literal(v), _) => truthy(v),
    }
}

fn compare(left: Option<&Value>, op: CmpOp, right: Option<&Value>) -> bool {
    let ord = match (left, right) {
        (Some(l), Some(r)) => cmp_values(l, r),
        _ => None,
    };
    match (op, ord) {
        (CmpOp::Ne, None) => true,
        (_, None) => false,
        (CmpOp::Eq, Some(o)) => o == Ordering::Equal,
        (CmpOp::Ne, Some(o)) => o != Ordering::Equal,
        (CmpOp::Lt, Some(o)) => o == Ordering::Less,
        (CmpOp::Lte, Some(o)) => o != Ordering::Greater,
        (CmpOp::Gt, Some(o)) => o == Ordering::Greater,
        (CmpOp::Gte, Some(o)) => o != Ordering::Less,
    }
}
