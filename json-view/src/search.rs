use crate::tree::{NodeId, Tree};
use crate::value::JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchScope {
    #[default]
    Keys,
    Values,
    Both,
}

impl SearchScope {
    pub fn keys(self) -> bool {
        matches!(self, Self::Keys | Self::Both)
    }

    pub fn values(self) -> bool {
        matches!(self, Self::Values | Self::Both)
    }
}

/// Result of one search submission. Rebuilt wholesale per submission;
/// node ids stay valid as long as the tree is not rebuilt.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    /// Case-normalized term. Empty means no active search.
    pub term: String,
    pub scope: SearchScope,
    /// Matching nodes in tree pre-order.
    pub matches: Vec<NodeId>,
    pub current: usize,
}

impl SearchState {
    /// Lowercase `term` and collect every matching node in pre-order,
    /// ignoring the current expansion state. An empty term matches nothing.
    pub fn build(tree: &Tree<'_>, term: &str, scope: SearchScope) -> Self {
        let term = term.to_lowercase();
        let mut matches = Vec::new();
        if !term.is_empty() {
            for id in tree.preorder() {
                if node_matches(tree, id, &term, scope) {
                    matches.push(id);
                }
            }
        }
        Self {
            term,
            scope,
            matches,
            current: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.term.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.matches.contains(&id)
    }

    /// Step to the next (`+1`) or previous (`-1`) match with wraparound.
    /// The step is taken relative to `focused` when it sits on a match,
    /// otherwise relative to the stored index. No-op on an empty list.
    pub fn advance(&mut self, focused: NodeId, direction: i32) -> Option<NodeId> {
        if self.matches.is_empty() {
            return None;
        }
        if let Some(pos) = self.matches.iter().position(|&m| m == focused) {
            self.current = pos;
        }
        let count = self.matches.len() as i32;
        self.current = ((self.current as i32 + direction % count + count) % count) as usize;
        Some(self.matches[self.current])
    }

    /// Number of matches inside the given document root's subtree. Shown in
    /// root-row labels while a search is active.
    pub fn matches_under_root(&self, tree: &Tree<'_>, root: NodeId) -> usize {
        self.matches
            .iter()
            .filter(|&&m| tree.root_of(m) == root)
            .count()
    }
}

fn node_matches(tree: &Tree<'_>, id: NodeId, term: &str, scope: SearchScope) -> bool {
    let node = tree.node(id);
    if scope.keys() && node.key.to_lowercase().contains(term) {
        return true;
    }
    if scope.values() && value_search_text(node.value).to_lowercase().contains(term) {
        return true;
    }
    false
}

/// Canonical string form of a value for searching: string content verbatim,
/// canonical number text, `true`/`false`, `null`, and the kind word for
/// containers.
pub fn value_search_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Object(_) | JsonValue::Array(_) => value.kind_word().to_string(),
    }
}
