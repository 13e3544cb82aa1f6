//! Binding expression evaluation.
//!
//! The runtime's expression language is dot paths into JSON-shaped scope
//! state: `user.address.city`. Compilation treats expressions as opaque
//! strings; this module is the one place that gives them meaning.

use serde_json::{Map, Value};

/// Binding state a render callable reads from.
pub type Scope = Map<String, Value>;

/// Resolve a dot path against the scope. Missing segments resolve to `None`.
pub fn lookup<'a>(scope: &'a Scope, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = scope.get(segments.next()?)?;
    for segment in segments {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Truthiness for conditionals: absent, `null`, `false`, `0` and the empty
/// string are false, everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form of a value for interpolation output. Strings render bare,
/// `null` renders empty, containers render as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
    }
}

/// Whether `expr` is a well-formed dot path: one or more identifier
/// segments separated by single dots. Array positions are written as bare
/// numeric segments (`items.0.name`).
pub fn is_valid_path(expr: &str) -> bool {
    if expr.is_empty() {
        return false;
    }
    expr.split('.').all(is_valid_segment)
}

fn is_valid_segment(segment: &str) -> bool {
    if segment.is_empty() {
        return false;
    }
    if segment.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    let mut chars = segment.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !(first.is_alphabetic() || first == '_' || first == '$') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// First segment of a path, used when checking binding roots.
pub fn path_root(expr: &str) -> &str {
    expr.split('.').next().unwrap_or(expr)
}
