use crate::hierarchy::{Hierarchy, NodeIdx};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Collapsed,
    Expanded,
    /// Nothing to collapse or expand.
    Leaf,
}

/// Moves a node's children to `hidden_children` or back.
///
/// The detached subtree is kept as-is, so expanding restores the exact child
/// list, and any collapse state further down survives the round trip.
pub fn toggle_branch(hierarchy: &mut Hierarchy, idx: NodeIdx) -> Toggle {
    let node = hierarchy.node_mut(idx);
    if !node.children.is_empty() {
        node.hidden_children = std::mem::take(&mut node.children);
        Toggle::Collapsed
    } else if !node.hidden_children.is_empty() {
        node.children = std::mem::take(&mut node.hidden_children);
        Toggle::Expanded
    } else {
        Toggle::Leaf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ROOT;
    use crate::hierarchy::tests::node;

    fn sample() -> Hierarchy {
        Hierarchy::from_tree(&node(
            "R",
            vec![node("G", vec![node("W1", vec![]), node("W2", vec![])]), node("W3", vec![])],
        ))
    }

    #[test]
    fn collapse_then_expand_restores_children() {
        let mut h = sample();
        let before = h.node(ROOT).children.clone();
        assert_eq!(toggle_branch(&mut h, ROOT), Toggle::Collapsed);
        assert!(h.node(ROOT).children.is_empty());
        assert_eq!(h.node(ROOT).hidden_children, before);
        assert_eq!(h.descendants(), vec![ROOT]);

        assert_eq!(toggle_branch(&mut h, ROOT), Toggle::Expanded);
        assert_eq!(h.node(ROOT).children, before);
        assert!(h.node(ROOT).hidden_children.is_empty());
        assert_eq!(h.descendants().len(), 5);
    }

    #[test]
    fn leaves_are_unaffected() {
        let mut h = sample();
        let leaf = h.find("R_W3").unwrap();
        assert_eq!(toggle_branch(&mut h, leaf), Toggle::Leaf);
        assert!(!h.node(leaf).has_children());
    }

    #[test]
    fn nested_collapse_survives_ancestor_round_trip() {
        let mut h = sample();
        let g = h.find("R_G").unwrap();
        toggle_branch(&mut h, g);
        toggle_branch(&mut h, ROOT);
        toggle_branch(&mut h, ROOT);
        assert!(h.node(g).is_collapsed());
        assert_eq!(h.descendants().len(), 3);
    }
}
