use std::fmt;

use itertools::Itertools;
use serde::Serialize;

/// One compiled instruction of a path expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Token {
    Root,                          // $
    Dot,                           // .
    RecursiveDescent,              // ..
    Wildcard,                      // [*] or []
    Identifier { key: String },    // name, ['name']
    Index { index: i64 },          // [0], [-1]
    Slice {
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<i64>,
    },                             // [start:end:step]
    Union { items: Vec<String> },  // [0,2] or ['a','b']
    Filter { expr: String },       // [?(expr)]
    Script { expr: String },       // [(expr)], never evaluated
}

impl Token {
    pub fn identifier(key: impl Into<String>) -> Self {
        Token::Identifier { key: key.into() }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Token::Root | Token::Dot | Token::Script { .. })
    }
}

/// Renders a token back into dialect text. Identifiers always use the quoted
/// bracket form so that keys with spaces or punctuation survive.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: &Option<i64>| b.map(|n| n.to_string()).unwrap_or_default();
        match self {
            Token::Root => f.write_str("$"),
            Token::Dot => f.write_str("."),
            Token::RecursiveDescent => f.write_str(".."),
            Token::Wildcard => f.write_str("[*]"),
            Token::Identifier { key } => write!(f, "['{key}']"),
            Token::Index { index } => write!(f, "[{index}]"),
            Token::Slice { start, end, step } => match step {
                Some(s) => write!(f, "[{}:{}:{s}]", bound(start), bound(end)),
                None => write!(f, "[{}:{}]", bound(start), bound(end)),
            },
            Token::Union { items } => {
                let rendered = items
                    .iter()
                    .map(|item| {
                        if item.parse::<i64>().is_ok() {
                            item.clone()
                        } else {
                            format!("'{item}'")
                        }
                    })
                    .join(",");
                write!(f, "[{rendered}]")
            }
            Token::Filter { expr } => write!(f, "[?({expr})]"),
            Token::Script { expr } => write!(f, "[({expr})]"),
        }
    }
}
