use serde_json::Value;
use tracing::{debug, trace};

use crate::filter::parse_predicate;
use crate::path::QueryResult;
use crate::token::Token;

/// Runs `tokens` against `root`.
///
/// Each token maps every (path, value) pair of the working set to zero or
/// more new pairs, keeping the order of the pairs it started from. The
/// working set starts as the single root pair. Values are never copied: every
/// result borrows from `root`.
pub fn evaluate<'a>(tokens: &[Token], root: &'a Value) -> Vec<QueryResult<'a>> {
    let mut current = vec![QueryResult::root(root)];
    for token in tokens {
        if !token.is_identity() {
            current = apply(token, current);
        }
        trace!(token = %token, matches = current.len(), "applied token");
        if current.is_empty() {
            break;
        }
    }
    current
}

fn apply<'a>(token: &Token, current: Vec<QueryResult<'a>>) -> Vec<QueryResult<'a>> {
    match token {
        Token::Root | Token::Dot | Token::Script { .. } => current,
        Token::RecursiveDescent => current.into_iter().flat_map(descendants).collect(),
        Token::Wildcard => current.iter().flat_map(children).collect(),
        Token::Identifier { key } => current.iter().filter_map(|r| member(r, key)).collect(),
        Token::Index { index } => current.iter().filter_map(|r| element(r, *index)).collect(),
        Token::Slice { start, end, step } => current
            .iter()
            .flat_map(|r| match r.value {
                Value::Array(arr) => slice_indices(arr.len(), *start, *end, *step)
                    .into_iter()
                    .map(|i| r.child(i, &arr[i]))
                    .collect(),
                _ => Vec::new(),
            })
            .collect(),
        Token::Union { items } => {
            let selectors: Vec<Selector> =
                items.iter().map(|item| Selector::from(item.as_str())).collect();
            current
                .iter()
                .flat_map(|r| {
                    selectors.iter().filter_map(move |sel| match sel {
                        Selector::Index(i) => element(r, *i),
                        Selector::Key(k) => member(r, k),
                    })
                })
                .collect()
        }
        Token::Filter { expr } => match parse_predicate(expr) {
            Ok(pred) => current
                .iter()
                .flat_map(children)
                .filter(|child| pred.matches(child.value))
                .collect(),
            Err(err) => {
                debug!(error = %err, "filter expression rejected");
                Vec::new()
            }
        },
    }
}

/// A union item: integers select elements, anything else selects members.
enum Selector<'t> {
    Index(i64),
    Key(&'t str),
}

impl<'t> From<&'t str> for Selector<'t> {
    fn from(item: &'t str) -> Self {
        match item.parse::<i64>() {
            Ok(i) => Selector::Index(i),
            Err(_) => Selector::Key(item),
        }
    }
}

/// Direct children: elements by index, or members in insertion order.
fn children<'a>(r: &QueryResult<'a>) -> Vec<QueryResult<'a>> {
    match r.value {
        Value::Array(arr) => arr.iter().enumerate().map(|(i, v)| r.child(i, v)).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| r.child(k.as_str(), v)).collect(),
        _ => Vec::new(),
    }
}

/// The node followed by all of its descendants in document order. Walks an
/// explicit stack so document depth is not limited by the call stack.
fn descendants(start: QueryResult<'_>) -> Vec<QueryResult<'_>> {
    let mut out = Vec::new();
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        stack.extend(children(&node).into_iter().rev());
        out.push(node);
    }
    out
}

/// Own member `key` of an object.
fn member<'a>(r: &QueryResult<'a>, key: &str) -> Option<QueryResult<'a>> {
    match r.value {
        Value::Object(map) => map.get(key).map(|v| r.child(key, v)),
        _ => None,
    }
}

/// Element `index` of an array; negative indices count from the end.
fn element<'a>(r: &QueryResult<'a>, index: i64) -> Option<QueryResult<'a>> {
    match r.value {
        Value::Array(arr) => {
            let resolved = if index < 0 {
                i64::try_from(arr.len()).ok()?.checked_add(index)?
            } else {
                index
            };
            let resolved = usize::try_from(resolved).ok()?;
            arr.get(resolved).map(|v| r.child(resolved, v))
        }
        _ => None,
    }
}

/// Indices visited by `[start:end:step]` over a sequence of `len` elements,
/// in visiting order.
pub(crate) fn slice_indices(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
    step: Option<i64>,
) -> Vec<usize> {
    let n = i64::try_from(len).unwrap_or(i64::MAX);
    let step = step.unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }

    let mut lo = start.unwrap_or(if step > 0 { 0 } else { n - 1 });
    let mut hi = end.unwrap_or(if step > 0 { n } else { -n - 1 });
    if lo < 0 {
        lo = (n + lo).max(0);
    }
    if hi < 0 {
        hi = n + hi;
    }
    lo = lo.clamp(0, n);
    hi = hi.clamp(-1, n);

    let mut out = Vec::new();
    let mut i = lo;
    while (step > 0 && i < hi) || (step < 0 && i > hi) {
        // A reverse walk may start one past the last element.
        if i < n {
            out.push(i as usize);
        }
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    out
}
