//! Arena hierarchies built once per dated tree run.
//!
//! Nodes refer to each other by index. Each node carries a `custom_id` that
//! identifies the same logical node across reconciliation passes and across
//! runs: the parent's id, an `_` separator, then the node's escaped label.

use std::collections::{HashMap, VecDeque};

use crate::ir::{AttributeMap, DatedTree, NodeType, RecursiveTreeNode};
use crate::layout::{Canvas, Point};

pub type NodeIdx = usize;

pub const ROOT: NodeIdx = 0;

const ID_SEPARATOR: char = '_';

#[derive(Debug, Clone, PartialEq)]
pub struct HierarchyNode {
    pub custom_id: String,
    pub node_label: String,
    pub edge_label: String,
    pub node_type: NodeType,
    pub node_data: AttributeMap,
    pub edge_data: AttributeMap,
    pub parent: Option<NodeIdx>,
    pub depth: usize,
    pub is_visible: bool,
    pub start_position: Point,
    pub end_position: Point,
    pub children: Vec<NodeIdx>,
    pub hidden_children: Vec<NodeIdx>,
}

impl HierarchyNode {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty() || !self.hidden_children.is_empty()
    }

    pub fn is_collapsed(&self) -> bool {
        !self.hidden_children.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub fn from_tree(tree: &RecursiveTreeNode) -> Self {
        let mut hierarchy = Self { nodes: Vec::new() };
        hierarchy.push_subtree(tree, None, 0, escape_label(&tree.node_label));
        hierarchy
    }

    fn push_subtree(
        &mut self,
        source: &RecursiveTreeNode,
        parent: Option<NodeIdx>,
        depth: usize,
        custom_id: String,
    ) -> NodeIdx {
        let idx = self.nodes.len();
        self.nodes.push(HierarchyNode {
            custom_id,
            node_label: source.node_label.clone(),
            edge_label: source.edge_label.clone(),
            node_type: source.node_type,
            node_data: source.node_data.clone(),
            edge_data: source.edge_data.clone(),
            parent,
            depth,
            is_visible: true,
            start_position: Point::ORIGIN,
            end_position: Point::ORIGIN,
            children: Vec::new(),
            hidden_children: Vec::new(),
        });

        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut children = Vec::with_capacity(source.children.len());
        for child in &source.children {
            let occurrence = seen.entry(child.node_label.as_str()).or_insert(0);
            let mut segment = escape_label(&child.node_label);
            if *occurrence > 0 {
                segment.push_str(&format!("#{occurrence}"));
            }
            *occurrence += 1;
            let child_id = format!("{}{ID_SEPARATOR}{segment}", self.nodes[idx].custom_id);
            children.push(self.push_subtree(child, Some(idx), depth + 1, child_id));
        }
        self.nodes[idx].children = children;
        idx
    }

    pub fn root(&self) -> &HierarchyNode {
        &self.nodes[ROOT]
    }

    pub fn node(&self, idx: NodeIdx) -> &HierarchyNode {
        &self.nodes[idx]
    }

    pub fn node_mut(&mut self, idx: NodeIdx) -> &mut HierarchyNode {
        &mut self.nodes[idx]
    }

    /// Number of nodes in the arena, hidden ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn find(&self, custom_id: &str) -> Option<NodeIdx> {
        self.nodes.iter().position(|node| node.custom_id == custom_id)
    }

    /// Traversable nodes in breadth-first order, root first. Hidden subtrees are skipped.
    pub fn descendants(&self) -> Vec<NodeIdx> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([ROOT]);
        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            queue.extend(self.nodes[idx].children.iter().copied());
        }
        order
    }

    /// Depth of the deepest traversable node below the root.
    pub fn height(&self) -> usize {
        let root_depth = self.root().depth;
        self.descendants()
            .into_iter()
            .map(|idx| self.nodes[idx].depth - root_depth)
            .max()
            .unwrap_or(0)
    }

    /// Copy of the traversable part of the tree, re-indexed, without hidden subtrees.
    pub fn prune(&self) -> Hierarchy {
        let order = self.descendants();
        let mut remap: HashMap<NodeIdx, NodeIdx> = HashMap::with_capacity(order.len());
        for (new_idx, old_idx) in order.iter().enumerate() {
            remap.insert(*old_idx, new_idx);
        }
        let nodes = order
            .iter()
            .map(|&old_idx| {
                let source = &self.nodes[old_idx];
                HierarchyNode {
                    parent: source.parent.and_then(|p| remap.get(&p).copied()),
                    children: source.children.iter().map(|c| remap[c]).collect(),
                    hidden_children: Vec::new(),
                    ..source.clone()
                }
            })
            .collect();
        Hierarchy { nodes }
    }
}

/// Percent-encodes the characters that carry meaning inside a custom id.
pub fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        match ch {
            '%' => out.push_str("%25"),
            '_' => out.push_str("%5F"),
            '#' => out.push_str("%23"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatedHierarchy {
    pub dates: Vec<String>,
    pub tree: Hierarchy,
}

impl DatedHierarchy {
    pub fn date_index(&self, date: &str) -> Option<usize> {
        self.dates.iter().position(|d| d == date)
    }
}

/// Builds one hierarchy per run. An empty series yields a single `NO DATA` run.
pub fn build_dated_hierarchies(trees: &[DatedTree], canvas: &Canvas) -> Vec<DatedHierarchy> {
    let placeholder;
    let trees = if trees.is_empty() {
        placeholder = [DatedTree::no_data()];
        &placeholder[..]
    } else {
        trees
    };

    trees
        .iter()
        .map(|dated| {
            let mut tree = Hierarchy::from_tree(&dated.tree);
            tree.node_mut(ROOT).start_position = canvas.root_origin();
            DatedHierarchy {
                dates: dated.dates.clone(),
                tree,
            }
        })
        .collect()
}
