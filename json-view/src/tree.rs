use crate::doc::Document;
use crate::value::JsonValue;

/// Stable handle to a node in a [`Tree`]. Ids never move or expire for the
/// lifetime of the tree; the arena only grows during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// One JSON value plus its UI state.
#[derive(Debug)]
pub struct Node<'v> {
    pub value: &'v JsonValue,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Property name, synthetic `[index]`, or the document origin name for
    /// root nodes.
    pub key: String,
    pub expanded: bool,
    pub is_root: bool,
    pub is_last_sibling: bool,
}

/// Forest of document trees stored in a single arena. Parents are plain
/// indices; the arena owns every node and is freed in one drop.
#[derive(Debug, Default)]
pub struct Tree<'v> {
    nodes: Vec<Node<'v>>,
    roots: Vec<NodeId>,
}

impl<'v> Tree<'v> {
    /// Build one synthetic root per document. Object children keep source
    /// key order, array children get `[i]` keys. Roots start expanded, all
    /// other nodes collapsed.
    pub fn from_documents(docs: &'v [Document]) -> Self {
        let mut tree = Self::default();
        for doc in docs {
            let id = tree.build(&doc.value, doc.name.clone(), None, true);
            tree.roots.push(id);
        }
        let count = tree.roots.len();
        for i in 0..count {
            let id = tree.roots[i];
            tree.nodes[id.0].is_last_sibling = i + 1 == count;
        }
        tree
    }

    fn build(
        &mut self,
        value: &'v JsonValue,
        key: String,
        parent: Option<NodeId>,
        is_root: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent,
            children: Vec::new(),
            key,
            expanded: is_root,
            is_root,
            is_last_sibling: false,
        });

        let mut children = Vec::new();
        match value {
            JsonValue::Object(entries) => {
                children.reserve(entries.len());
                for (child_key, child_value) in entries {
                    children.push(self.build(child_value, child_key.clone(), Some(id), false));
                }
            }
            JsonValue::Array(items) => {
                children.reserve(items.len());
                for (idx, item) in items.iter().enumerate() {
                    children.push(self.build(item, format!("[{idx}]"), Some(id), false));
                }
            }
            _ => {}
        }
        let count = children.len();
        for (i, &child) in children.iter().enumerate() {
            self.nodes[child.0].is_last_sibling = i + 1 == count;
        }
        self.nodes[id.0].children = children;
        id
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node<'v> {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node<'v> {
        &mut self.nodes[id.0]
    }

    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) {
        self.nodes[id.0].expanded = expanded;
    }

    /// Pre-order ids over every node in the forest, ignoring expansion.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for &root in &self.roots {
            self.preorder_from(root, &mut out);
        }
        out
    }

    fn preorder_from(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for i in 0..self.nodes[id.0].children.len() {
            self.preorder_from(self.nodes[id.0].children[i], out);
        }
    }

    /// Flatten the forest into the current visible row sequence: pre-order,
    /// descending into children only below expanded nodes. Roots are always
    /// emitted.
    pub fn collect_visible(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &root in &self.roots {
            self.collect_visible_from(root, &mut out);
        }
        out
    }

    pub fn collect_visible_from(&self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        if self.nodes[id.0].expanded {
            for i in 0..self.nodes[id.0].children.len() {
                self.collect_visible_from(self.nodes[id.0].children[i], out);
            }
        }
    }

    pub fn expand_all(&mut self, id: NodeId) {
        self.nodes[id.0].expanded = true;
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.expand_all(child);
        }
    }

    /// Collapse the whole subtree. With `keep_root` the node itself stays
    /// expanded when it is a document root.
    pub fn collapse_all(&mut self, id: NodeId, keep_root: bool) {
        if !self.nodes[id.0].is_root || !keep_root {
            self.nodes[id.0].expanded = false;
        }
        let children = self.nodes[id.0].children.clone();
        for child in children {
            self.collapse_all(child, false);
        }
    }

    /// Expand down to `target` levels below the document root. Level 0
    /// collapses everything including the root node itself (its row stays
    /// visible, its children disappear); for any level above 0 roots are
    /// forced expanded and their direct children sit at level 1.
    pub fn expand_to_level(&mut self, id: NodeId, target: usize) {
        self.expand_to_level_at(id, target, 0)
    }

    fn expand_to_level_at(&mut self, id: NodeId, target: usize, current: usize) {
        if target == 0 {
            self.nodes[id.0].expanded = false;
            let children = self.nodes[id.0].children.clone();
            for child in children {
                self.collapse_all(child, false);
            }
            return;
        }

        if self.nodes[id.0].is_root {
            self.nodes[id.0].expanded = true;
            let children = self.nodes[id.0].children.clone();
            for child in children {
                self.expand_to_level_at(child, target, 1);
            }
            return;
        }

        if current < target {
            self.nodes[id.0].expanded = true;
            let children = self.nodes[id.0].children.clone();
            for child in children {
                self.expand_to_level_at(child, target, current + 1);
            }
        } else {
            self.nodes[id.0].expanded = false;
            let children = self.nodes[id.0].children.clone();
            for child in children {
                self.collapse_all(child, false);
            }
        }
    }

    /// Force every ancestor of `id` expanded so the node is reachable in
    /// [`collect_visible`](Self::collect_visible). The node's own state is
    /// untouched.
    pub fn expand_path(&mut self, id: NodeId) {
        let mut cur = self.nodes[id.0].parent;
        while let Some(p) = cur {
            self.nodes[p.0].expanded = true;
            cur = self.nodes[p.0].parent;
        }
    }

    /// Nesting level below the document root (roots are level 0).
    pub fn level(&self, id: NodeId) -> usize {
        let mut level = 0;
        let mut cur = id;
        while let Some(p) = self.nodes[cur.0].parent {
            level += 1;
            if self.nodes[p.0].is_root {
                break;
            }
            cur = p;
        }
        level
    }

    /// Document root this node belongs to.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(p) = self.nodes[cur.0].parent {
            cur = p;
        }
        cur
    }

    /// Slash-joined path for the status bar. The root segment is reduced to
    /// the origin's filename component.
    pub fn path_string(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cur = Some(id);
        while let Some(c) = cur {
            parts.push(self.nodes[c.0].key.clone());
            cur = self.nodes[c.0].parent;
        }
        let mut path = String::new();
        for (i, part) in parts.iter().rev().enumerate() {
            if i == 0 {
                path.push_str(part.rsplit('/').next().unwrap_or(part));
            } else {
                path.push('/');
                path.push_str(part);
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }
}
