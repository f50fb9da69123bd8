use std::fmt;

/// Marker for floating-point values that originated from a non-standard
/// JSON literal. `serde_json::Number` cannot represent these, so they are
/// carried explicitly and re-emitted as their source literal on output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonFinite {
    NaN,
    PosInf,
    NegInf,
}

impl NonFinite {
    pub fn literal(self) -> &'static str {
        match self {
            Self::NaN => "NaN",
            Self::PosInf => "Infinity",
            Self::NegInf => "-Infinity",
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Self::NaN => f64::NAN,
            Self::PosInf => f64::INFINITY,
            Self::NegInf => f64::NEG_INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsonNumber {
    Finite(serde_json::Number),
    NonFinite(NonFinite),
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::NonFinite(nf) => f.write_str(nf.literal()),
        }
    }
}

/// One JSON value. Objects keep their source key order.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonValue {
    Null,
    Bool(bool),
    Number(JsonNumber),
    String(String),
    Array(Vec<JsonValue>),
    Object(Vec<(String, JsonValue)>),
}

impl JsonValue {
    /// Human-readable kind word, also used as the canonical search text of
    /// container values.
    pub fn kind_word(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "list",
            Self::Object(_) => "dictionary",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Child count for containers, 0 for scalars.
    pub fn len(&self) -> usize {
        match self {
            Self::Array(items) => items.len(),
            Self::Object(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-print with 2-space indentation, re-emitting `NaN`,
    /// `Infinity` and `-Infinity` literals instead of failing on them.
    pub fn to_pretty_string(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, indent: usize) {
        match self {
            Self::Object(entries) => {
                if entries.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{\n");
                for (i, (key, value)) in entries.iter().enumerate() {
                    push_indent(out, indent + 2);
                    out.push_str(&quote_json_string(key));
                    out.push_str(": ");
                    value.write_pretty(out, indent + 2);
                    if i + 1 < entries.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                push_indent(out, indent);
                out.push('}');
            }
            Self::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                    return;
                }
                out.push_str("[\n");
                for (i, item) in items.iter().enumerate() {
                    push_indent(out, indent + 2);
                    item.write_pretty(out, indent + 2);
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                push_indent(out, indent);
                out.push(']');
            }
            Self::String(s) => out.push_str(&quote_json_string(s)),
            Self::Number(n) => {
                use std::fmt::Write;
                let _ = write!(out, "{n}");
            }
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Null => out.push_str("null"),
        }
    }
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push(' ');
    }
}

/// Quote and escape a string as a JSON string token.
fn quote_json_string(s: &str) -> String {
    // serde_json serializes &str with standard JSON escaping.
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}
