use crate::hierarchy::{Hierarchy, NodeIdx};
use crate::layout::Point;

/// Walks up from `idx` until a visible node or the root is reached.
///
/// Terminates because every walk ends at the root, which has no parent.
pub fn find_closest_visible_ancestor(hierarchy: &Hierarchy, idx: NodeIdx) -> NodeIdx {
    let mut current = idx;
    loop {
        let node = hierarchy.node(current);
        match node.parent {
            Some(parent) if !node.is_visible => current = parent,
            _ => return current,
        }
    }
}

pub fn closest_visible_start(hierarchy: &Hierarchy, idx: NodeIdx) -> Point {
    let anchor = find_closest_visible_ancestor(hierarchy, idx);
    hierarchy.node(anchor).start_position
}

pub fn closest_visible_end(hierarchy: &Hierarchy, idx: NodeIdx) -> Point {
    let anchor = find_closest_visible_ancestor(hierarchy, idx);
    hierarchy.node(anchor).end_position
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::ROOT;
    use crate::hierarchy::tests::node;

    fn chain() -> Hierarchy {
        Hierarchy::from_tree(&node("R", vec![node("G", vec![node("S", vec![node("W", vec![])])])]))
    }

    #[test]
    fn visible_node_resolves_to_itself() {
        let h = chain();
        let w = h.find("R_G_S_W").unwrap();
        assert_eq!(find_closest_visible_ancestor(&h, w), w);
    }

    #[test]
    fn skips_invisible_chain() {
        let mut h = chain();
        let g = h.find("R_G").unwrap();
        let s = h.find("R_G_S").unwrap();
        let w = h.find("R_G_S_W").unwrap();
        h.node_mut(s).is_visible = false;
        h.node_mut(w).is_visible = false;
        h.node_mut(g).end_position = Point::new(40.0, 12.0);
        assert_eq!(find_closest_visible_ancestor(&h, w), g);
        assert_eq!(closest_visible_end(&h, w), Point::new(40.0, 12.0));
    }

    #[test]
    fn stops_at_root_even_if_hidden() {
        let mut h = chain();
        for idx in 0..h.len() {
            h.node_mut(idx).is_visible = false;
        }
        h.node_mut(ROOT).start_position = Point::new(0.0, 230.0);
        let w = h.find("R_G_S_W").unwrap();
        assert_eq!(find_closest_visible_ancestor(&h, w), ROOT);
        assert_eq!(closest_visible_start(&h, w), Point::new(0.0, 230.0));
    }
}
