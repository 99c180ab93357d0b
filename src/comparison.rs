use std::cmp::Ordering;

use serde_json::Value;

/// Orders two JSON values for filter comparisons.
///
/// `None` means the pair is unordered: such pairs are never equal and never
/// less or greater than each other.
pub fn cmp_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(ba), Value::Bool(bb)) => Some(ba.cmp(bb)),
        (Value::String(sa), Value::String(sb)) => Some(sa.cmp(sb)),
        (Value::Number(na), Value::Number(nb)) => {
            if let (Some(ia), Some(ib)) = (na.as_i64(), nb.as_i64()) {
                return Some(ia.cmp(&ib));
            }
            na.as_f64()?.partial_cmp(&nb.as_f64()?)
        }
        // Numeric strings compare as numbers, the way loose equality does.
        (Value::Number(na), Value::String(sb)) => {
            na.as_f64()?.partial_cmp(&sb.trim().parse::<f64>().ok()?)
        }
        (Value::String(sa), Value::Number(nb)) => {
            sa.trim().parse::<f64>().ok()?.partial_cmp(&nb.as_f64()?)
        }
        (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
            (a == b).then_some(Ordering::Equal)
        }
        _ => None,
    }
}

/// Truthiness used by bare filter operands.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
