//! Input normalization: request bodies (JSON or form) to column-ready values keyed by API name.
//!
//! JSON path: numbers parse leniently (unparsable -> null), booleans accept native or "true"/"false",
//! an explicit `photo` string is kept with the legacy prefix rewritten.
//! Form path: strings are trimmed (empty -> null), booleans follow checkbox semantics (absent -> false).

use crate::config::{FieldKind, ResolvedField, ResolvedResource, PHOTO_FIELD};
use serde_json::{Map, Number, Value};
use std::collections::HashMap;

/// Normalized values keyed by API field name.
pub type Values = HashMap<String, Value>;

/// Legacy photo prefix rewritten to the canonical one.
const LEGACY_IMAGE_PREFIX: &str = "/img/";
const IMAGE_PREFIX: &str = "/images/";

/// Rewrite the first legacy `/img/` prefix to `/images/`.
pub fn normalize_photo_path(path: &str) -> String {
    path.replacen(LEGACY_IMAGE_PREFIX, IMAGE_PREFIX, 1)
}

/// Normalize a JSON body. Unknown keys are ignored; every declared field gets an entry (possibly null).
pub fn normalize_json(resource: &ResolvedResource, body: &Map<String, Value>) -> Values {
    let mut out = Values::with_capacity(resource.fields.len() + 1);
    for f in &resource.fields {
        let v = body.get(&f.name).map(|v| coerce_json(f, v)).unwrap_or(Value::Null);
        out.insert(f.name.clone(), v);
    }
    let photo = match body.get(PHOTO_FIELD) {
        Some(Value::String(s)) if !s.trim().is_empty() => Value::String(normalize_photo_path(s.trim())),
        _ => Value::Null,
    };
    out.insert(PHOTO_FIELD.to_string(), photo);
    out
}

/// Normalize the text parts of a multipart form. The photo is handled by the upload path, not here.
pub fn normalize_form(resource: &ResolvedResource, form: &HashMap<String, String>) -> Values {
    let mut out = Values::with_capacity(resource.fields.len());
    for f in &resource.fields {
        let raw = form.get(&f.name).map(|s| s.trim());
        let v = match f.kind {
            FieldKind::Boolean => Value::Bool(raw.map(form_truthy).unwrap_or(false)),
            _ => match raw {
                None | Some("") => Value::Null,
                Some(s) => coerce_json(f, &Value::String(s.to_string())),
            },
        };
        out.insert(f.name.clone(), v);
    }
    out
}

fn form_truthy(s: &str) -> bool {
    s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("on")
}

fn coerce_json(f: &ResolvedField, v: &Value) -> Value {
    match f.kind {
        FieldKind::Text | FieldKind::LongText => coerce_text(v),
        FieldKind::Integer => coerce_integer(v),
        FieldKind::Decimal => coerce_decimal(v),
        FieldKind::Boolean => coerce_bool(v),
    }
}

fn coerce_text(v: &Value) -> Value {
    match v {
        Value::String(_) => v.clone(),
        Value::Number(n) => Value::String(n.to_string()),
        Value::Bool(b) => Value::String(b.to_string()),
        _ => Value::Null,
    }
}

/// Integers: JSON ints, floats truncated, numeric strings. Out of `integer` range -> null.
pub fn coerce_integer(v: &Value) -> Value {
    let n = match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    };
    n.and_then(|n| i32::try_from(n).ok())
        .map(|n| Value::Number(n.into()))
        .unwrap_or(Value::Null)
}

fn truncate(f: f64) -> Option<i64> {
    if f.is_finite() && f.abs() < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

/// Decimals: JSON numbers or numeric strings; NaN/inf -> null.
pub fn coerce_decimal(v: &Value) -> Value {
    let f = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    f.and_then(Number::from_f64).map(Value::Number).unwrap_or(Value::Null)
}

/// Booleans: true/false or "true"/"false" (any case); anything else -> null.
pub fn coerce_bool(v: &Value) -> Value {
    match v {
        Value::Bool(b) => Value::Bool(*b),
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if s.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    }
}
