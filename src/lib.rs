//! Path-expression queries over `serde_json::Value` documents.
//!
//! An expression such as `$.store.book[?(@.price < 10)].title` is compiled by
//! [`tokenize`] into a flat list of [`Token`]s, and [`evaluate`] folds those
//! tokens over the document, producing every match as a [`QueryResult`]: the
//! [`Path`] it was reached by plus a borrow of the matched value.
//!
//! Malformed expressions are not rejected. Characters without a meaning are
//! skipped, and evaluation of a mismatched or out-of-range step yields no
//! results rather than an error. [`tokenize_strict`] and
//! [`JsonPath::parse_strict`] are available when diagnostics are wanted.

pub mod errors;
pub mod engine;
pub mod options;
mod comparison;
mod evaluator;
mod filter;
mod parser;
mod path;
mod token;
mod tokenizer;

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

pub use engine::{from_json, nodes, parse, paths, query, value};
pub use errors::{QueryError, Result};
pub use evaluator::evaluate;
pub use filter::{evaluate_predicate, parse_predicate, CmpOp, Operand, Predicate};
pub use options::{jsonpath, Callback, JsonPathOptions, ResultType};
pub use path::{format_path, resolve_path, Path, PathSegment, QueryResult};
pub use token::Token;
pub use tokenizer::{tokenize, tokenize_strict};

/// A tokenized expression that can be evaluated against many documents
/// without tokenizing again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath {
    source: String,
    tokens: Vec<Token>,
}

impl JsonPath {
    /// Lenient compile; never fails.
    pub fn parse(expression: &str) -> Self {
        Self {
            source: expression.to_string(),
            tokens: tokenize(expression),
        }
    }

    /// Strict compile; rejects input the lenient tokenizer would skip.
    pub fn parse_strict(expression: &str) -> Result<Self> {
        Ok(Self {
            source: expression.to_string(),
            tokens: tokenize_strict(expression)?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn nodes<'a>(&self, root: &'a Value) -> Vec<QueryResult<'a>> {
        evaluate(&self.tokens, root)
    }

    pub fn query<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        self.nodes(root).into_iter().map(|r| r.value).collect()
    }

    pub fn paths(&self, root: &Value) -> Vec<Path> {
        self.nodes(root).into_iter().map(|r| r.path).collect()
    }
}

impl FromStr for JsonPath {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_strict(s)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
