use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::evaluator::evaluate;
use crate::tokenizer::tokenize;

/// What each entry of a [`jsonpath`] result holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    /// The matched value.
    #[default]
    Value,
    /// The formatted path of the match, e.g. `$.store.book[0]`.
    Path,
    /// `{"path": ..., "value": ...}` objects.
    All,
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResultType::Value => "value",
            ResultType::Path => "path",
            ResultType::All => "all",
        })
    }
}

/// Per-result post-processing hook: receives the shaped entry, the result
/// type and the queried document, and returns the entry to emit.
pub type Callback = Arc<dyn Fn(Value, ResultType, &Value) -> Value + Send + Sync>;

/// Options for the [`jsonpath`] entry point.
#[derive(Clone)]
pub struct JsonPathOptions {
    pub json: Option<Value>,
    pub path: Option<String>,
    pub result_type: ResultType,
    /// When false, a single result is returned bare instead of in an array.
    pub wrap: bool,
    /// Keep only the first N results; `None` or `Some(0)` keeps all.
    pub count: Option<usize>,
    pub callback: Option<Callback>,
}

impl Default for JsonPathOptions {
    fn default() -> Self {
        Self {
            json: None,
            path: None,
            result_type: ResultType::default(),
            wrap: true,
            count: None,
            callback: None,
        }
    }
}

impl fmt::Debug for JsonPathOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonPathOptions")
            .field("json", &self.json)
            .field("path", &self.path)
            .field("result_type", &self.result_type)
            .field("wrap", &self.wrap)
            .field("count", &self.count)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl JsonPathOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn result_type(mut self, result_type: ResultType) -> Self {
        self.result_type = result_type;
        self
    }

    pub fn wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn callback<F>(mut self, f: F) -> Self
    where
        F: Fn(Value, ResultType, &Value) -> Value + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(f));
        self
    }
}

/// Options-driven query.
///
/// Returns `None` when the document or the expression is missing (an empty
/// expression counts as missing). Otherwise returns a JSON array shaped by
/// `result_type`, or the single entry itself when `wrap` is off and exactly
/// one result remains after applying `count`.
pub fn jsonpath(options: &JsonPathOptions) -> Option<Value> {
    let json = options.json.as_ref()?;
    let path = options.path.as_deref().filter(|p| !p.is_empty())?;

    let mut results = evaluate(&tokenize(path), json);
    if let Some(n) = options.count.filter(|n| *n > 0) {
        results.truncate(n);
    }
    let mut output: Vec<Value> = results
        .iter()
        .map(|r| match options.result_type {
            ResultType::Value => r.value.clone(),
            ResultType::Path => Value::String(r.path.to_string()),
            ResultType::All => json!({ "path": r.path.to_string(), "value": r.value }),
        })
        .collect();

    if let Some(callback) = &options.callback {
        output = output
            .into_iter()
            .map(|entry| callback(entry, options.result_type, json))
            .collect();
    }

    if !options.wrap && output.len() == 1 {
        return output.pop();
    }
    Some(Value::Array(output))
}
