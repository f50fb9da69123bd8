use std::collections::HashMap;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::search::SearchState;
use crate::style::Role;
use crate::tree::{NodeId, Tree};
use crate::value::JsonValue;

/// Terminal column width of a string: wide and combining code points are
/// honored, not byte counts. Rust strings are always valid UTF-8, so the
/// byte-length fallback of the original contract is unreachable here.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `max` columns.
pub fn truncate_to_width(text: &str, max: usize) -> &str {
    let mut used = 0;
    for (i, c) in text.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > max {
            return &text[..i];
        }
        used += w;
    }
    text
}

fn tail_to_width(text: &str, max: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > max {
            break;
        }
        used += w;
        start = i;
    }
    &text[start..]
}

/// Shorten an over-long path by keeping the filename intact and eliding the
/// middle of the directory portion.
pub fn shorten_path(path: &str, max_width: usize) -> String {
    if display_width(path) <= max_width {
        return path.to_string();
    }

    let Some(last_slash) = path.rfind('/') else {
        // No directory portion, plain tail truncation.
        return format!("{}...", truncate_to_width(path, max_width.saturating_sub(3)));
    };

    let filename = &path[last_slash + 1..];
    let directory = &path[..last_slash];

    // Filename alone too long: keep its head.
    if display_width(filename) + 4 > max_width {
        return format!(
            ".../{}...",
            truncate_to_width(filename, max_width.saturating_sub(7))
        );
    }

    let remaining = max_width - display_width(filename) - 1;
    if display_width(directory) <= remaining {
        return path.to_string();
    }

    let prefix_len = (remaining / 3).max(1);
    let suffix_len = remaining.saturating_sub(prefix_len + 3).max(1);
    if prefix_len + suffix_len + 3 >= display_width(directory) {
        return path.to_string();
    }

    format!(
        "{}...{}/{}",
        truncate_to_width(directory, prefix_len),
        tail_to_width(directory, suffix_len),
        filename
    )
}

/// Branch glyphs leading up to a node: one segment per non-root ancestor
/// (continuation bar or blank, depending on whether that ancestor is its
/// parent's last child), then the branch glyph for the node itself.
pub fn tree_prefix(tree: &Tree<'_>, id: NodeId, ascii: bool) -> String {
    let (bar, blank, tee, corner) = if ascii {
        ("|   ", "    ", "+-- ", "`-- ")
    } else {
        ("\u{2502}   ", "    ", "\u{251c}\u{2500}\u{2500} ", "\u{2514}\u{2500}\u{2500} ")
    };

    let mut segments = Vec::new();
    let mut cur = id;
    while let Some(parent) = tree.node(cur).parent {
        if tree.node(parent).parent.is_some() {
            segments.push(if tree.node(parent).is_last_sibling {
                blank
            } else {
                bar
            });
        }
        cur = parent;
    }

    let mut prefix: String = segments.into_iter().rev().collect();
    let node = tree.node(id);
    if node.parent.is_some() {
        prefix.push_str(if node.is_last_sibling { corner } else { tee });
    }
    prefix
}

/// Per-type leaf icon; containers and roots have none.
pub fn type_icon(tree: &Tree<'_>, id: NodeId) -> &'static str {
    let node = tree.node(id);
    if node.is_root {
        return "";
    }
    match node.value {
        JsonValue::String(_) => "\u{2100} ",
        JsonValue::Bool(true) => "\u{2612} ",
        JsonValue::Bool(false) => "\u{2610} ",
        JsonValue::Number(_) => "\u{2151} ",
        JsonValue::Null => "\u{2298} ",
        JsonValue::Object(entries) if entries.is_empty() => "\u{205e} ",
        _ => "",
    }
}

/// Escape control characters, quotes and backslashes for single-line
/// string display.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Human-readable byte count: exact bytes, one decimal below 10 in the
/// larger units, whole numbers above.
pub fn format_file_size(size: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", size, UNITS[unit])
    } else if value < 10.0 {
        format!("{value:.1} {}", UNITS[unit])
    } else {
        format!("{} {}", (value + 0.5) as u64, UNITS[unit])
    }
}

fn count_suffix(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

fn scalar_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => format!("\"{}\"", escape_string(s)),
        JsonValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Null => "null".to_string(),
        _ => String::new(),
    }
}

fn root_label(
    tree: &Tree<'_>,
    id: NodeId,
    max_width: usize,
    sizes: &HashMap<String, u64>,
) -> String {
    let node = tree.node(id);
    let mut kind = match node.value {
        JsonValue::Object(entries) => format!(
            "\u{1f4e6} dictionary, {}",
            count_suffix(entries.len(), "key", "keys")
        ),
        JsonValue::Array(items) => format!(
            "\u{1f5c2}\u{fe0f} list, {}",
            count_suffix(items.len(), "item", "items")
        ),
        JsonValue::String(_) => "\u{2100} string".to_string(),
        JsonValue::Number(_) => "\u{2151} number".to_string(),
        JsonValue::Bool(_) => "\u{2612} boolean".to_string(),
        JsonValue::Null => "\u{2298} null".to_string(),
    };
    if let Some(size) = sizes.get(&node.key) {
        kind.push_str(", ");
        kind.push_str(&format_file_size(*size));
    }
    let key_budget = max_width.saturating_sub(display_width(&kind) + 4);
    let short_key = shorten_path(&node.key, key_budget);
    format!("{short_key} ({kind})")
}

/// Label text for one row, without the inline array preview (that part is
/// width-budgeted separately, see [`row_spans`]). Containers render
/// `key (kind, count)`; roots add the kind icon, byte size and a shortened
/// origin path; scalars render `key: value`.
pub fn content_label(
    tree: &Tree<'_>,
    id: NodeId,
    max_width: usize,
    sizes: &HashMap<String, u64>,
) -> String {
    let node = tree.node(id);
    if node.is_root {
        return root_label(tree, id, max_width, sizes);
    }
    match node.value {
        JsonValue::Object(entries) => format!(
            "{} (dictionary, {})",
            node.key,
            count_suffix(entries.len(), "key", "keys")
        ),
        JsonValue::Array(items) => format!(
            "{} (list, {})",
            node.key,
            count_suffix(items.len(), "item", "items")
        ),
        _ => format!("{}: {}", node.key, scalar_text(node.value)),
    }
}

/// [`content_label`] plus, for document roots during an active search, the
/// per-document match count inserted before the closing parenthesis.
pub fn content_label_with_search(
    tree: &Tree<'_>,
    id: NodeId,
    search: &SearchState,
    max_width: usize,
    sizes: &HashMap<String, u64>,
) -> String {
    let mut label = content_label(tree, id, max_width, sizes);
    if tree.node(id).is_root && search.is_active() && !search.matches.is_empty() {
        let count = search.matches_under_root(tree, id);
        if count > 0 {
            if let Some(pos) = label.rfind(')') {
                let info = format!(
                    ", \u{1f50d} {}",
                    count_suffix(count, "match", "matches")
                );
                label.insert_str(pos, &info);
            }
        }
    }
    label
}

/// One styled text run of a rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub role: Role,
}

impl Span {
    fn new(text: impl Into<String>, role: Role) -> Self {
        Self {
            text: text.into(),
            role,
        }
    }
}

/// Preview token for one array element.
fn preview_token(item: &JsonValue) -> Span {
    match item {
        JsonValue::String(s) => Span::new(format!("\"{s}\""), Role::StringValue),
        JsonValue::Number(n) => Span::new(n.to_string(), Role::NumberValue),
        JsonValue::Bool(b) => Span::new(if *b { "true" } else { "false" }, Role::BoolValue),
        JsonValue::Null => Span::new("null", Role::NullValue),
        JsonValue::Object(_) => Span::new("{...}", Role::Normal),
        JsonValue::Array(_) => Span::new("[...]", Role::Normal),
    }
}

/// Bounded inline preview of an array's leading elements: `: a, b, ...`
/// stopping with an ellipsis once `budget` columns would be exceeded.
pub fn array_preview_spans(items: &[JsonValue], budget: usize) -> Vec<Span> {
    let mut spans = vec![Span::new(": ", Role::Normal)];
    let mut printed = 2usize;
    let mut first = true;
    for item in items {
        let token = preview_token(item);
        let sep_width = if first { 0 } else { 2 };
        let token_width = display_width(&token.text);
        if printed + sep_width + token_width + 3 > budget {
            if printed < budget {
                spans.push(Span::new("...", Role::Normal));
            }
            break;
        }
        if !first {
            spans.push(Span::new(", ", Role::Normal));
            printed += 2;
        }
        printed += token_width;
        spans.push(token);
        first = false;
    }
    spans
}

/// Full styled row for a node: tree prefix, expand indicator or type icon,
/// then the label broken into key/value (or label plus array preview) runs.
/// `cols` is the total terminal width; the label budget is derived from it
/// the same way the renderer budgets rows.
pub fn row_spans(
    tree: &Tree<'_>,
    id: NodeId,
    search: &SearchState,
    cols: usize,
    ascii: bool,
    sizes: &HashMap<String, u64>,
) -> Vec<Span> {
    let node = tree.node(id);
    let prefix = tree_prefix(tree, id, ascii);
    let available = cols.saturating_sub(display_width(&prefix) + 4 + 5);

    let mut spans = Vec::new();
    if !prefix.is_empty() {
        spans.push(Span::new(prefix, Role::TreeStructure));
    }

    let icon = type_icon(tree, id);
    if !node.children.is_empty() {
        let indicator = match (node.expanded, ascii) {
            (true, false) => "\u{25bc} ",
            (false, false) => "\u{25b6} ",
            (true, true) => "v ",
            (false, true) => "> ",
        };
        spans.push(Span::new(indicator, Role::ExpandIndicator));
    } else if icon.is_empty() {
        spans.push(Span::new("  ", Role::Normal));
    } else {
        spans.push(Span::new(icon, Role::ExpandIndicator));
    }

    match node.value {
        // Collapsed non-empty arrays get the inline element preview.
        JsonValue::Array(items) if !node.expanded && !node.is_root && !items.is_empty() => {
            let base = content_label(tree, id, available, sizes);
            let budget = available.saturating_sub(display_width(&base));
            spans.push(Span::new(base, Role::Normal));
            spans.extend(array_preview_spans(items, budget));
        }
        JsonValue::Object(_) | JsonValue::Array(_) => {
            spans.push(Span::new(
                content_label_with_search(tree, id, search, available, sizes),
                Role::Normal,
            ));
        }
        _ if node.is_root => {
            spans.push(Span::new(
                content_label_with_search(tree, id, search, available, sizes),
                Role::Normal,
            ));
        }
        _ => {
            spans.push(Span::new(node.key.clone(), Role::KeyName));
            spans.push(Span::new(": ", Role::Normal));
            let role = match node.value {
                JsonValue::String(_) => Role::StringValue,
                JsonValue::Number(_) => Role::NumberValue,
                JsonValue::Bool(_) => Role::BoolValue,
                JsonValue::Null => Role::NullValue,
                _ => Role::Normal,
            };
            spans.push(Span::new(scalar_text(node.value), role));
        }
    }
    spans
}

/// Plain text of a row, used for tests and width accounting.
pub fn row_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}
