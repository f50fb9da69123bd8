use std::fs;
use std::path::Path;

use crate::error::{Result, ViewError};
use crate::value::{JsonNumber, JsonValue, NonFinite};

// Placeholder strings stand in for non-standard literals during parsing so
// the document can go through a strict JSON parser unchanged otherwise.
const NAN_PLACEHOLDER: &str = "__json_view_nan__";
const INF_PLACEHOLDER: &str = "__json_view_inf__";
const NEG_INF_PLACEHOLDER: &str = "__json_view_neg_inf__";

/// One loaded JSON document plus its origin name and raw byte size.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub byte_size: u64,
    pub value: JsonValue,
}

impl Document {
    pub fn parse(name: &str, contents: &str) -> Result<Self> {
        let value = parse_with_special_numbers(contents)?;
        Ok(Self {
            name: name.to_string(),
            byte_size: contents.len() as u64,
            value,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| ViewError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&path.display().to_string(), &contents)
    }
}

/// Parse JSON text, accepting the non-standard literals `NaN`, `Infinity`
/// and `-Infinity` outside of strings. The literals are masked with
/// placeholder strings before parsing and restored as non-finite number
/// markers afterwards.
pub fn parse_with_special_numbers(contents: &str) -> Result<JsonValue> {
    let masked = mask_special_literals(contents);
    let parsed: serde_json::Value = serde_json::from_str(&masked)?;
    Ok(convert(parsed))
}

/// Replace non-standard literals with quoted placeholders, leaving string
/// contents untouched.
fn mask_special_literals(contents: &str) -> String {
    let bytes = contents.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            out.push(c);
            if c == b'\\' {
                i += 1;
                if i < bytes.len() {
                    out.push(bytes[i]);
                }
                i += 1;
            } else {
                if c == b'"' {
                    in_string = false;
                }
                i += 1;
            }
        } else if c == b'"' {
            in_string = true;
            out.push(c);
            i += 1;
        } else if bytes[i..].starts_with(b"NaN") {
            out.extend_from_slice(format!("\"{NAN_PLACEHOLDER}\"").as_bytes());
            i += 3;
        } else if bytes[i..].starts_with(b"Infinity") {
            out.extend_from_slice(format!("\"{INF_PLACEHOLDER}\"").as_bytes());
            i += 8;
        } else if bytes[i..].starts_with(b"-Infinity") {
            out.extend_from_slice(format!("\"{NEG_INF_PLACEHOLDER}\"").as_bytes());
            i += 9;
        } else {
            out.push(c);
            i += 1;
        }
    }
    // The input was valid UTF-8 and only ASCII was inserted.
    String::from_utf8(out).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Convert a parsed `serde_json` value into the crate value type,
/// restoring placeholder strings to non-finite number markers.
fn convert(value: serde_json::Value) -> JsonValue {
    match value {
        serde_json::Value::Null => JsonValue::Null,
        serde_json::Value::Bool(b) => JsonValue::Bool(b),
        serde_json::Value::Number(n) => JsonValue::Number(JsonNumber::Finite(n)),
        serde_json::Value::String(s) => match s.as_str() {
            NAN_PLACEHOLDER => JsonValue::Number(JsonNumber::NonFinite(NonFinite::NaN)),
            INF_PLACEHOLDER => JsonValue::Number(JsonNumber::NonFinite(NonFinite::PosInf)),
            NEG_INF_PLACEHOLDER => JsonValue::Number(JsonNumber::NonFinite(NonFinite::NegInf)),
            _ => JsonValue::String(s),
        },
        serde_json::Value::Array(items) => {
            JsonValue::Array(items.into_iter().map(convert).collect())
        }
        serde_json::Value::Object(entries) => JsonValue::Object(
            entries.into_iter().map(|(k, v)| (k, convert(v))).collect(),
        ),
    }
}
