mod clipboard;
mod doc;
mod error;
mod format;
mod render;
mod screen;
mod search;
mod style;
mod tree;
mod value;

pub use crate::clipboard::{clipboard_status_message, copy_to_clipboard, osc52_likely};
pub use crate::doc::Document;
pub use crate::error::{Result, ViewError};
pub use crate::format::{
    content_label, content_label_with_search, display_width, escape_string, format_file_size,
    row_spans, row_text, shorten_path, tree_prefix, truncate_to_width, Span,
};
pub use crate::render::{ClickHint, RenderEngine, Strategy};
pub use crate::screen::{Screen, TerminalScreen};
pub use crate::search::{value_search_text, SearchScope, SearchState};
pub use crate::style::{role_style, Role, RoleStyle, SchemeId};
pub use crate::tree::{Node, NodeId, Tree};
pub use crate::value::{JsonNumber, JsonValue, NonFinite};
