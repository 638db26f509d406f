mod tidy;
pub(crate) mod types;
pub use types::*;
use tidy::*;

use crate::hierarchy::{Hierarchy, NodeIdx};

fn separation(hierarchy: &Hierarchy, a: NodeIdx, b: NodeIdx) -> f64 {
    if hierarchy.node(a).parent == hierarchy.node(b).parent {
        1.0
    } else {
        2.0
    }
}

/// Lays out the traversable part of `hierarchy` and stores the result in each
/// node's `end_position`.
///
/// The sibling axis comes from the tidy tree, stretched to fill
/// `canvas.tree_height`. The depth axis puts depth `d` at
/// `d * tree_width / (height + 1)`, so the deepest level never touches the
/// right margin.
pub fn assign_end_positions(hierarchy: &mut Hierarchy, canvas: &Canvas) {
    let breadth = tidy_breadth(hierarchy);
    let order = hierarchy.descendants();
    let Some(&root) = order.first() else {
        return;
    };

    let mut left = root;
    let mut right = root;
    for &idx in &order {
        if breadth[idx] < breadth[left] {
            left = idx;
        }
        if breadth[idx] > breadth[right] {
            right = idx;
        }
    }
    let s = if left == right {
        1.0
    } else {
        separation(hierarchy, left, right) / 2.0
    };
    let tx = s - breadth[left];
    let kx = canvas.tree_height / (breadth[right] + s + tx);

    let root_depth = hierarchy.node(root).depth;
    let levels = (hierarchy.height() + 1) as f64;
    for idx in order {
        let node = hierarchy.node_mut(idx);
        let depth = (node.depth - root_depth) as f64;
        node.end_position = Point::new(
            depth * canvas.tree_width / levels,
            (breadth[idx] + tx) * kx,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collapse::toggle_branch;
    use crate::config::{LayoutConfig, RenderConfig};
    use crate::hierarchy::ROOT;
    use crate::hierarchy::tests::node;

    fn canvas() -> Canvas {
        let render = RenderConfig {
            width: 480.0,
            height: 540.0,
            ..Default::default()
        };
        // tree_width 300, tree_height 500
        Canvas::new(&render, &LayoutConfig::default())
    }

    #[test]
    fn single_node_sits_mid_height() {
        let mut h = Hierarchy::from_tree(&node("R", vec![]));
        assign_end_positions(&mut h, &canvas());
        assert_eq!(h.root().end_position, Point::new(0.0, 250.0));
    }

    #[test]
    fn two_children_split_the_height() {
        let mut h = Hierarchy::from_tree(&node("R", vec![node("A", vec![]), node("B", vec![])]));
        assign_end_positions(&mut h, &canvas());
        let a = h.node(h.find("R_A").unwrap()).end_position;
        let b = h.node(h.find("R_B").unwrap()).end_position;
        assert_eq!(h.root().end_position, Point::new(0.0, 250.0));
        assert_eq!(a, Point::new(150.0, 125.0));
        assert_eq!(b, Point::new(150.0, 375.0));
    }

    #[test]
    fn collapsing_shrinks_depth_axis() {
        let mut h = Hierarchy::from_tree(&node("R", vec![node("G", vec![node("W", vec![])])]));
        let c = canvas();
        assign_end_positions(&mut h, &c);
        let g = h.find("R_G").unwrap();
        assert_eq!(h.node(g).end_position.x, 100.0);

        toggle_branch(&mut h, g);
        assign_end_positions(&mut h, &c);
        assert_eq!(h.node(g).end_position.x, 150.0);
        assert_eq!(h.node(ROOT).end_position.x, 0.0);
    }
}
