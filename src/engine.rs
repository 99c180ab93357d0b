use serde_json::Value;

use crate::errors::Result;
use crate::evaluator::evaluate;
use crate::path::{Path, QueryResult};
use crate::token::Token;
use crate::tokenizer::tokenize;

// =========================
// Public API (one-shot queries)
// =========================
//
// Every function here tokenizes the expression from scratch, evaluates it in
// full and only then applies `count`. A `count` of `None` or `Some(0)` means
// "all results".

/// Tokens for `expression`, for inspection and debugging.
pub fn parse(expression: &str) -> Vec<Token> {
    tokenize(expression)
}

/// Matching (path, value) pairs in evaluation order.
pub fn nodes<'a>(root: &'a Value, expression: &str, count: Option<usize>) -> Vec<QueryResult<'a>> {
    limit(evaluate(&tokenize(expression), root), count)
}

/// Matching values in evaluation order.
pub fn query<'a>(root: &'a Value, expression: &str, count: Option<usize>) -> Vec<&'a Value> {
    nodes(root, expression, count)
        .into_iter()
        .map(|r| r.value)
        .collect()
}

/// Paths of the matching values in evaluation order.
pub fn paths(root: &Value, expression: &str, count: Option<usize>) -> Vec<Path> {
    nodes(root, expression, count)
        .into_iter()
        .map(|r| r.path)
        .collect()
}

/// First matching value, if any.
pub fn value<'a>(root: &'a Value, expression: &str) -> Option<&'a Value> {
    query(root, expression, Some(1)).into_iter().next()
}

/// Convenience: parse JSON text and return all matches as a JSON array.
pub fn from_json(json_str: &str, expression: &str) -> Result<Value> {
    let data: Value = serde_json::from_str(json_str)?;
    Ok(Value::Array(
        query(&data, expression, None).into_iter().cloned().collect(),
    ))
}

fn limit<T>(mut items: Vec<T>, count: Option<usize>) -> Vec<T> {
    if let Some(n) = count.filter(|n| *n > 0) {
        items.truncate(n);
    }
    items
}
