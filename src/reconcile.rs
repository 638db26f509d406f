//! Enter/update/exit reconciliation between the last rendered tree and the next one.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::directive::{
    Directive, EdgeLabelVisual, EdgeVisual, ElementKey, NodeVisual, RenderPass, TextAnchor, Visual,
};
use crate::hierarchy::{Hierarchy, NodeIdx, ROOT};
use crate::ir::MetadataTable;
use crate::layout::{Canvas, EdgePath, Point, assign_end_positions};
use crate::scale::EdgeScales;
use crate::text::{format_value, tooltip_text, value_at};
use crate::visibility::{closest_visible_end, closest_visible_start};

/// Keys split by presence in the old and new collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedDiff<K> {
    /// In `new` only, in `new` order.
    pub entering: Vec<K>,
    /// In both, in `new` order.
    pub updating: Vec<K>,
    /// In `old` only, in `old` order.
    pub exiting: Vec<K>,
}

pub fn diff_keys<K: Eq + Hash + Clone>(old: &[K], new: &[K]) -> KeyedDiff<K> {
    let old_set: HashSet<&K> = old.iter().collect();
    let new_set: HashSet<&K> = new.iter().collect();
    let (updating, entering) = new.iter().cloned().partition(|key| old_set.contains(key));
    let exiting = old
        .iter()
        .filter(|key| !new_set.contains(key))
        .cloned()
        .collect();
    KeyedDiff {
        entering,
        updating,
        exiting,
    }
}

/// Selection and shared lookups a pass needs to turn nodes into visuals.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub date_index: usize,
    pub edge_key: &'a str,
    pub node_key: &'a str,
    pub scales: &'a EdgeScales,
    pub metadata: &'a MetadataTable,
    pub canvas: &'a Canvas,
    pub layout: &'a LayoutConfig,
}

impl RenderContext<'_> {
    fn duration(&self) -> u32 {
        self.layout.transition_ms
    }

    fn node_visual(&self, tree: &Hierarchy, idx: NodeIdx, position: Point, radius: f64) -> NodeVisual {
        let node = tree.node(idx);
        let has_children = node.has_children();
        let (label_anchor, label_dx) = if has_children {
            (TextAnchor::End, -self.layout.label_offset)
        } else {
            (TextAnchor::Start, self.layout.label_offset)
        };
        NodeVisual {
            position,
            radius,
            opacity: 1.0,
            label: node.node_label.clone(),
            label_anchor,
            label_dx,
            value_text: format_value(value_at(&node.node_data, self.node_key, self.date_index)),
            unit_text: self.metadata.unit(self.node_key).to_string(),
            tooltip: tooltip_text(&node.node_data, self.date_index, self.metadata),
            node_type: node.node_type,
            has_children,
            collapsed: node.is_collapsed(),
        }
    }

    fn edge_visual(&self, tree: &Hierarchy, idx: NodeIdx, path: EdgePath) -> EdgeVisual {
        let node = tree.node(idx);
        let value = value_at(&node.edge_data, self.edge_key, self.date_index).unwrap_or(0.0);
        EdgeVisual {
            path,
            stroke_width: self.scales.width(self.edge_key, value),
            dashed: value <= 0.0,
            opacity: 1.0,
            class: format!("link grouptree_link grouptree_link__{}", self.edge_key),
            tooltip: tooltip_text(&node.edge_data, self.date_index, self.metadata),
        }
    }

    fn edge_label_visual(&self, tree: &Hierarchy, idx: NodeIdx, opacity: f64) -> EdgeLabelVisual {
        let node = tree.node(idx);
        EdgeLabelVisual {
            text: node.edge_label.clone(),
            path_id: node.custom_id.clone(),
            opacity,
        }
    }

    fn settled_edge_path(&self, tree: &Hierarchy, idx: NodeIdx) -> EdgePath {
        let node = tree.node(idx);
        let parent = node
            .parent
            .map(|p| tree.node(p).end_position)
            .unwrap_or(Point::ORIGIN);
        EdgePath::new(node.end_position, parent)
    }
}

fn ids_of(tree: &Hierarchy, order: &[NodeIdx]) -> Vec<String> {
    order.iter().map(|&idx| tree.node(idx).custom_id.clone()).collect()
}

/// Runs one reconciliation pass of `new` against the previously rendered `old`.
///
/// `new` is laid out, inherits start positions and visibility from matching
/// `old` nodes, and is left settled (`start == end`, all traversable nodes
/// visible) for the next pass. `old` receives the new end positions of its
/// surviving nodes and has its exiting nodes marked invisible.
pub fn reconcile(
    mut old: Option<&mut Hierarchy>,
    new: &mut Hierarchy,
    ctx: &RenderContext,
) -> RenderPass {
    assign_end_positions(new, ctx.canvas);

    let new_order = new.descendants();
    let new_ids = ids_of(new, &new_order);
    let new_index: HashMap<&str, NodeIdx> = new_ids
        .iter()
        .map(String::as_str)
        .zip(new_order.iter().copied())
        .collect();

    let old_order = old.as_deref().map(Hierarchy::descendants).unwrap_or_default();
    let old_ids = old
        .as_deref()
        .map(|tree| ids_of(tree, &old_order))
        .unwrap_or_default();

    for &idx in &new_order {
        new.node_mut(idx).is_visible = false;
    }
    if let Some(old) = old.as_deref_mut() {
        for (&old_idx, id) in old_order.iter().zip(&old_ids) {
            let Some(&new_idx) = new_index.get(id.as_str()) else {
                continue;
            };
            let old_node = old.node(old_idx);
            let (start, visible) = (old_node.start_position, old_node.is_visible);
            let end = new.node(new_idx).end_position;
            let new_node = new.node_mut(new_idx);
            new_node.start_position = start;
            new_node.is_visible = visible;
            old.node_mut(old_idx).end_position = end;
        }
    }

    let nodes = diff_keys(&old_ids, &new_ids);
    let edges = diff_keys(&old_ids[old_ids.len().min(1)..], &new_ids[1..]);

    // Every exiting node is hidden before any target is resolved, so a whole
    // departing subtree folds into its nearest surviving ancestor.
    let mut exit_targets: HashMap<&str, Point> = HashMap::with_capacity(nodes.exiting.len());
    if let Some(old) = old.as_deref_mut() {
        let old_index: HashMap<&str, NodeIdx> = old_ids
            .iter()
            .map(String::as_str)
            .zip(old_order.iter().copied())
            .collect();
        for id in &nodes.exiting {
            old.node_mut(old_index[id.as_str()]).is_visible = false;
        }
        for id in &nodes.exiting {
            let target = closest_visible_end(old, old_index[id.as_str()]);
            exit_targets.insert(id.as_str(), target);
        }
    }
    let exit_target = |id: &str| exit_targets.get(id).copied().unwrap_or(Point::ORIGIN);

    let duration = ctx.duration();
    let mut directives = Vec::with_capacity(new_order.len() * 3 + old_order.len());

    for id in &nodes.entering {
        let idx = new_index[id.as_str()];
        let origin = closest_visible_start(new, idx);
        let end = new.node(idx).end_position;
        directives.push(Directive::Create {
            key: ElementKey::node(id),
            from: Visual::Node(ctx.node_visual(new, idx, origin, ctx.layout.enter_node_radius)),
            to: Visual::Node(ctx.node_visual(new, idx, end, ctx.layout.node_radius)),
            duration_ms: duration,
        });
    }
    for id in &nodes.updating {
        let idx = new_index[id.as_str()];
        let end = new.node(idx).end_position;
        directives.push(Directive::Update {
            key: ElementKey::node(id),
            to: Visual::Node(ctx.node_visual(new, idx, end, ctx.layout.node_radius)),
            duration_ms: duration,
        });
    }
    for id in &nodes.exiting {
        directives.push(Directive::Remove {
            key: ElementKey::node(id),
            toward: exit_target(id),
            duration_ms: duration,
        });
    }

    for id in &edges.entering {
        let idx = new_index[id.as_str()];
        let origin = closest_visible_start(new, idx);
        let to = ctx.edge_visual(new, idx, ctx.settled_edge_path(new, idx));
        let from = EdgeVisual {
            path: EdgePath::collapsed(origin),
            ..to.clone()
        };
        directives.push(Directive::Create {
            key: ElementKey::edge(id),
            from: Visual::Edge(from),
            to: Visual::Edge(to),
            duration_ms: duration,
        });
    }
    for id in &edges.updating {
        let idx = new_index[id.as_str()];
        let to = ctx.edge_visual(new, idx, ctx.settled_edge_path(new, idx));
        directives.push(Directive::Update {
            key: ElementKey::edge(id),
            to: Visual::Edge(to),
            duration_ms: duration,
        });
    }
    for id in &edges.exiting {
        directives.push(Directive::Remove {
            key: ElementKey::edge(id),
            toward: exit_target(id),
            duration_ms: duration,
        });
    }

    for id in &edges.entering {
        let idx = new_index[id.as_str()];
        directives.push(Directive::Create {
            key: ElementKey::edge_label(id),
            from: Visual::EdgeLabel(ctx.edge_label_visual(new, idx, 0.0)),
            to: Visual::EdgeLabel(ctx.edge_label_visual(new, idx, 1.0)),
            duration_ms: duration,
        });
    }
    for id in &edges.updating {
        let idx = new_index[id.as_str()];
        directives.push(Directive::Update {
            key: ElementKey::edge_label(id),
            to: Visual::EdgeLabel(ctx.edge_label_visual(new, idx, 1.0)),
            duration_ms: duration,
        });
    }
    for id in &edges.exiting {
        directives.push(Directive::Remove {
            key: ElementKey::edge_label(id),
            toward: exit_target(id),
            duration_ms: duration,
        });
    }

    for &idx in &new_order {
        let node = new.node_mut(idx);
        node.start_position = node.end_position;
        node.is_visible = true;
    }

    debug!(
        entering = nodes.entering.len(),
        updating = nodes.updating.len(),
        exiting = nodes.exiting.len(),
        date_index = ctx.date_index,
        "reconciled group tree"
    );

    RenderPass { directives }
}

/// Re-styles the settled tree for a new attribute selection. Positions are
/// reused as-is; only `Update` directives are produced.
pub fn restyle(tree: &Hierarchy, ctx: &RenderContext) -> RenderPass {
    let order = tree.descendants();
    let duration = ctx.duration();
    let mut directives = Vec::with_capacity(order.len() * 3);

    for &idx in &order {
        let node = tree.node(idx);
        directives.push(Directive::Update {
            key: ElementKey::node(&node.custom_id),
            to: Visual::Node(ctx.node_visual(tree, idx, node.end_position, ctx.layout.node_radius)),
            duration_ms: duration,
        });
    }
    for &idx in order.iter().filter(|&&idx| idx != ROOT) {
        let node = tree.node(idx);
        directives.push(Directive::Update {
            key: ElementKey::edge(&node.custom_id),
            to: Visual::Edge(ctx.edge_visual(tree, idx, ctx.settled_edge_path(tree, idx))),
            duration_ms: duration,
        });
    }

    debug!(
        edge_key = ctx.edge_key,
        node_key = ctx.node_key,
        elements = directives.len(),
        "restyled group tree"
    );

    RenderPass { directives }
}
