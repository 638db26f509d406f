//! Buchheim, Jünger and Leipert's linear-time variant of the Reingold-Tilford
//! tidy tree algorithm. Produces an unscaled sibling-axis coordinate for every
//! traversable node; `layout::assign_end_positions` maps it onto the canvas.

use crate::hierarchy::{Hierarchy, NodeIdx, ROOT};

const VIRTUAL: usize = 0;

#[derive(Debug, Clone)]
struct TidyNode {
    node: Option<NodeIdx>,
    parent: Option<usize>,
    children: Vec<usize>,
    default_ancestor: Option<usize>,
    ancestor: usize,
    prelim: f64,
    modifier: f64,
    change: f64,
    shift: f64,
    thread: Option<usize>,
    number: usize,
}

impl TidyNode {
    fn new(slot: usize, node: Option<NodeIdx>, parent: Option<usize>, number: usize) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            default_ancestor: None,
            ancestor: slot,
            prelim: 0.0,
            modifier: 0.0,
            change: 0.0,
            shift: 0.0,
            thread: None,
            number,
        }
    }
}

struct TidyTree {
    nodes: Vec<TidyNode>,
}

impl TidyTree {
    fn build(hierarchy: &Hierarchy) -> Self {
        let mut nodes = vec![TidyNode::new(VIRTUAL, None, None, 0)];
        let mut stack = vec![(ROOT, VIRTUAL, 0usize)];
        while let Some((hier_idx, parent_slot, number)) = stack.pop() {
            let slot = nodes.len();
            nodes.push(TidyNode::new(slot, Some(hier_idx), Some(parent_slot), number));
            nodes[parent_slot].children.push(slot);
            let children = &hierarchy.node(hier_idx).children;
            for (i, &child) in children.iter().enumerate().rev() {
                stack.push((child, slot, i));
            }
        }
        // Depth-first construction appends children in order, so `number` matches
        // the position in each parent's child list.
        Self { nodes }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.nodes[a].parent == self.nodes[b].parent {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        node.children.first().copied().or(node.thread)
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        let node = &self.nodes[v];
        node.children.last().copied().or(node.thread)
    }

    fn parent_of(&self, v: usize) -> usize {
        self.nodes[v].parent.unwrap_or(VIRTUAL)
    }

    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let subtrees = self.nodes[wp].number as f64 - self.nodes[wm].number as f64;
        let change = shift / subtrees;
        self.nodes[wp].change -= change;
        self.nodes[wp].shift += shift;
        self.nodes[wm].change += change;
        self.nodes[wp].prelim += shift;
        self.nodes[wp].modifier += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let mut shift = 0.0;
        let mut change = 0.0;
        let children = self.nodes[v].children.clone();
        for &w in children.iter().rev() {
            let node = &mut self.nodes[w];
            node.prelim += shift;
            node.modifier += shift;
            change += node.change;
            shift += node.shift + change;
        }
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.nodes[vim].ancestor;
        if self.parent_of(candidate) == self.parent_of(v) {
            candidate
        } else {
            ancestor
        }
    }

    fn apportion(&mut self, v: usize, w: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = w else {
            return ancestor;
        };
        let mut vip = v;
        let mut vop = v;
        let mut vim = w;
        let mut vom = self.nodes[self.parent_of(v)].children[0];
        let mut sip = self.nodes[vip].modifier;
        let mut sop = self.nodes[vop].modifier;
        let mut sim = self.nodes[vim].modifier;
        let mut som = self.nodes[vom].modifier;

        let (next_vim, next_vip) = loop {
            let (Some(next_im), Some(next_ip)) = (self.next_right(vim), self.next_left(vip)) else {
                break (self.next_right(vim), self.next_left(vip));
            };
            vim = next_im;
            vip = next_ip;
            let (Some(next_om), Some(next_op)) = (self.next_left(vom), self.next_right(vop)) else {
                break (None, None);
            };
            vom = next_om;
            vop = next_op;
            self.nodes[vop].ancestor = v;
            let shift = self.nodes[vim].prelim + sim - self.nodes[vip].prelim - sip
                + self.separation(vim, vip);
            if shift > 0.0 {
                let from = self.next_ancestor(vim, v, ancestor);
                self.move_subtree(from, v, shift);
                sip += shift;
                sop += shift;
            }
            sim += self.nodes[vim].modifier;
            sip += self.nodes[vip].modifier;
            som += self.nodes[vom].modifier;
            sop += self.nodes[vop].modifier;
        };

        if let Some(next_im) = next_vim
            && self.next_right(vop).is_none()
        {
            self.nodes[vop].thread = Some(next_im);
            self.nodes[vop].modifier += sim - sop;
        }
        if let Some(next_ip) = next_vip
            && self.next_left(vom).is_none()
        {
            self.nodes[vom].thread = Some(next_ip);
            self.nodes[vom].modifier += sip - som;
            ancestor = v;
        }
        ancestor
    }

    fn first_walk(&mut self, v: usize) {
        let children = self.nodes[v].children.clone();
        for &child in &children {
            self.first_walk(child);
        }

        let parent = self.parent_of(v);
        let number = self.nodes[v].number;
        let w = (number > 0).then(|| self.nodes[parent].children[number - 1]);
        if let (Some(&first), Some(&last)) = (children.first(), children.last()) {
            self.execute_shifts(v);
            let midpoint = (self.nodes[first].prelim + self.nodes[last].prelim) / 2.0;
            if let Some(w) = w {
                self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
                self.nodes[v].modifier = self.nodes[v].prelim - midpoint;
            } else {
                self.nodes[v].prelim = midpoint;
            }
        } else if let Some(w) = w {
            self.nodes[v].prelim = self.nodes[w].prelim + self.separation(v, w);
        }
        let default_ancestor = self.nodes[parent]
            .default_ancestor
            .unwrap_or(self.nodes[parent].children[0]);
        let next = self.apportion(v, w, default_ancestor);
        self.nodes[parent].default_ancestor = Some(next);
    }

    fn second_walk(&mut self, v: usize, breadth: &mut [f64]) {
        let parent_modifier = self.nodes[self.parent_of(v)].modifier;
        let node = &mut self.nodes[v];
        if let Some(hier_idx) = node.node {
            breadth[hier_idx] = node.prelim + parent_modifier;
        }
        node.modifier += parent_modifier;
        let children = node.children.clone();
        for child in children {
            self.second_walk(child, breadth);
        }
    }
}

/// Unscaled sibling-axis coordinate per arena index. Hidden nodes keep 0.
pub(super) fn tidy_breadth(hierarchy: &Hierarchy) -> Vec<f64> {
    let mut tree = TidyTree::build(hierarchy);
    let root = tree.nodes[VIRTUAL].children[0];
    tree.first_walk(root);
    tree.nodes[VIRTUAL].modifier = -tree.nodes[root].prelim;
    let mut breadth = vec![0.0; hierarchy.len()];
    tree.second_walk(root, &mut breadth);
    breadth
}
