//! # Name Tree
//!
//! Rebuilds the hierarchy implied by dash separated names, for display.
//!
//! The tree is an arena: nodes live in one `Vec` and refer to their children by
//! index. It is built in a single pass over the entries, each name walked
//! segment by segment from the requested prefix, so shared prefixes collapse
//! into one node and no subtree is repeated.
//!
//! ```text
//! go(61)
//! ├── search(6101)
//! └── sort(6100)
//! ```

use crate::model::{name_has_prefix, Entry, NAME_SEP};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Label used for the root when no prefix was given.
pub const ROOT_LABEL: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub segment: String,
    /// Set when an entry's name ends exactly at this node.
    pub id: Option<String>,
    pub children: Vec<usize>,
}

impl TreeNode {
    fn new(segment: &str) -> Self {
        Self {
            segment: segment.to_string(),
            id: None,
            children: Vec::new(),
        }
    }

    pub fn label(&self) -> String {
        match &self.id {
            Some(id) => format!("{}({})", self.segment, id),
            None => self.segment.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTree {
    nodes: Vec<TreeNode>,
}

impl NameTree {
    /// Builds the tree of every entry at or below `prefix`.
    pub fn build<'a, I>(entries: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let prefix = prefix.trim();
        let root_label = prefix.rsplit(NAME_SEP).next().unwrap_or_default();
        let root_label = if root_label.is_empty() {
            ROOT_LABEL
        } else {
            root_label
        };
        let mut tree = NameTree {
            nodes: vec![TreeNode::new(root_label)],
        };

        for entry in entries {
            if !name_has_prefix(&entry.name, prefix) {
                continue;
            }
            let rest = if prefix.is_empty() {
                entry.name.as_str()
            } else {
                entry.name[prefix.len()..].trim_start_matches(NAME_SEP)
            };

            let mut at = 0;
            if !rest.is_empty() {
                for segment in rest.split(NAME_SEP) {
                    at = tree.child(at, segment);
                }
            }
            tree.nodes[at].id = Some(entry.id.clone());
        }

        tree.sort_children();
        tree
    }

    fn child(&mut self, parent: usize, segment: &str) -> usize {
        if let Some(&existing) = self.nodes[parent]
            .children
            .iter()
            .find(|&&c| self.nodes[c].segment == segment)
        {
            return existing;
        }
        self.nodes.push(TreeNode::new(segment));
        let index = self.nodes.len() - 1;
        self.nodes[parent].children.push(index);
        index
    }

    fn sort_children(&mut self) {
        for i in 0..self.nodes.len() {
            let mut children = std::mem::take(&mut self.nodes[i].children);
            children.sort_by(|a, b| self.nodes[*a].segment.cmp(&self.nodes[*b].segment));
            self.nodes[i].children = children;
        }
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[0]
    }

    pub fn node(&self, index: usize) -> &TreeNode {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1 && self.nodes[0].id.is_none()
    }

    /// Depth-first walk yielding `(depth, node)` with the root at depth 0.
    pub fn walk(&self) -> Vec<(usize, &TreeNode)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(0usize, 0usize)];
        while let Some((depth, index)) = stack.pop() {
            let node = &self.nodes[index];
            out.push((depth, node));
            for &child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Renders box-drawing lines. Nodes deeper than `max_depth` (root = 0)
    /// are left out.
    pub fn render(&self, max_depth: Option<usize>) -> Vec<String> {
        let mut lines = vec![self.root().label()];
        self.render_children(0, 1, "", max_depth, &mut lines);
        lines
    }

    fn render_children(
        &self,
        index: usize,
        depth: usize,
        indent: &str,
        max_depth: Option<usize>,
        lines: &mut Vec<String>,
    ) {
        if max_depth.is_some_and(|max| depth > max) {
            return;
        }
        let children = &self.nodes[index].children;
        for (i, &child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            let connector = if last { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{}{}{}", indent, connector, self.nodes[child].label()));

            let next_indent = format!("{}{}", indent, if last { SPACE } else { PIPE });
            self.render_children(child, depth + 1, &next_indent, max_depth, lines);
        }
    }
}
