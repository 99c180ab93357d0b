use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use serde_json::Value;

/// One step from a node to one of its children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Location of a node relative to the document root; empty for the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Path(Vec<PathSegment>);

impl Path {
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path one level deeper than `self`.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment.into());
        Path(segments)
    }
}

impl Deref for Path {
    type Target = [PathSegment];

    fn deref(&self) -> &[PathSegment] {
        &self.0
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Path(segments)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_path(&self.0))
    }
}

/// A matched node: how it was reached and a borrow of the node itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult<'a> {
    pub path: Path,
    pub value: &'a Value,
}

impl<'a> QueryResult<'a> {
    pub fn root(value: &'a Value) -> Self {
        Self {
            path: Path::root(),
            value,
        }
    }

    pub fn child(&self, segment: impl Into<PathSegment>, value: &'a Value) -> Self {
        Self {
            path: self.path.child(segment),
            value,
        }
    }
}

/// Renders a path in the dialect's own syntax, e.g. `$.store.book[0]['first name']`.
///
/// Keys that are not plain identifiers are wrapped in `['...']` without
/// escaping, so a key containing `'` does not round-trip.
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::from("$");
    for segment in segments {
        match segment {
            PathSegment::Index(i) => {
                out.push('[');
                out.push_str(&i.to_string());
                out.push(']');
            }
            PathSegment::Key(key) if is_identifier(key) => {
                out.push('.');
                out.push_str(key);
            }
            PathSegment::Key(key) => {
                out.push_str("['");
                out.push_str(key);
                out.push_str("']");
            }
        }
    }
    out
}

/// `^[A-Za-z_$][A-Za-z0-9_$]*$`
fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Follows `segments` from `root` with plain member and element lookups.
pub fn resolve_path<'a>(root: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| match (segment, node) {
        (PathSegment::Key(key), Value::Object(map)) => map.get(key),
        (PathSegment::Index(i), Value::Array(arr)) => arr.get(*i),
        _ => None,
    })
}
