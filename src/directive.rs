use serde::Serialize;

use crate::ir::NodeType;
use crate::layout::{EdgePath, Point};

/// Drawing order: edges first, then their labels, nodes on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Edge,
    EdgeLabel,
    Node,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementKey {
    pub kind: ElementKind,
    pub id: String,
}

impl ElementKey {
    pub fn node(id: &str) -> Self {
        Self {
            kind: ElementKind::Node,
            id: id.to_string(),
        }
    }

    pub fn edge(id: &str) -> Self {
        Self {
            kind: ElementKind::Edge,
            id: id.to_string(),
        }
    }

    pub fn edge_label(id: &str) -> Self {
        Self {
            kind: ElementKind::EdgeLabel,
            id: id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    pub fn as_svg(&self) -> &'static str {
        match self {
            TextAnchor::Start => "start",
            TextAnchor::Middle => "middle",
            TextAnchor::End => "end",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeVisual {
    pub position: Point,
    pub radius: f64,
    pub opacity: f64,
    pub label: String,
    pub label_anchor: TextAnchor,
    pub label_dx: f64,
    pub value_text: String,
    pub unit_text: String,
    pub tooltip: String,
    pub node_type: NodeType,
    pub has_children: bool,
    pub collapsed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeVisual {
    pub path: EdgePath,
    pub stroke_width: f64,
    pub dashed: bool,
    pub opacity: f64,
    pub class: String,
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLabelVisual {
    pub text: String,
    /// Element id of the edge path the text follows.
    pub path_id: String,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visual {
    Node(NodeVisual),
    Edge(EdgeVisual),
    EdgeLabel(EdgeLabelVisual),
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

impl Visual {
    pub fn opacity(&self) -> f64 {
        match self {
            Visual::Node(node) => node.opacity,
            Visual::Edge(edge) => edge.opacity,
            Visual::EdgeLabel(label) => label.opacity,
        }
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        match self {
            Visual::Node(node) => node.opacity = opacity,
            Visual::Edge(edge) => edge.opacity = opacity,
            Visual::EdgeLabel(label) => label.opacity = opacity,
        }
    }

    /// Numeric fields move linearly from `self` to `to`; text and flags take `to`'s values.
    pub fn interpolate(&self, to: &Visual, t: f64) -> Visual {
        let t = t.clamp(0.0, 1.0);
        match (self, to) {
            (Visual::Node(a), Visual::Node(b)) => Visual::Node(NodeVisual {
                position: a.position.lerp(b.position, t),
                radius: lerp(a.radius, b.radius, t),
                opacity: lerp(a.opacity, b.opacity, t),
                ..b.clone()
            }),
            (Visual::Edge(a), Visual::Edge(b)) => Visual::Edge(EdgeVisual {
                path: a.path.lerp(b.path, t),
                stroke_width: lerp(a.stroke_width, b.stroke_width, t),
                opacity: lerp(a.opacity, b.opacity, t),
                ..b.clone()
            }),
            (Visual::EdgeLabel(a), Visual::EdgeLabel(b)) => Visual::EdgeLabel(EdgeLabelVisual {
                opacity: lerp(a.opacity, b.opacity, t),
                ..b.clone()
            }),
            _ => to.clone(),
        }
    }

    /// Where an exiting element ends up: folded into `toward` and faded out.
    pub fn collapsed_toward(&self, toward: Point) -> Visual {
        let mut out = self.clone();
        match &mut out {
            Visual::Node(node) => node.position = toward,
            Visual::Edge(edge) => edge.path = EdgePath::collapsed(toward),
            Visual::EdgeLabel(_) => {}
        }
        out.set_opacity(0.0);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Directive {
    Create {
        key: ElementKey,
        from: Visual,
        to: Visual,
        duration_ms: u32,
    },
    Update {
        key: ElementKey,
        to: Visual,
        duration_ms: u32,
    },
    Remove {
        key: ElementKey,
        toward: Point,
        duration_ms: u32,
    },
}

impl Directive {
    pub fn key(&self) -> &ElementKey {
        match self {
            Directive::Create { key, .. }
            | Directive::Update { key, .. }
            | Directive::Remove { key, .. } => key,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, Directive::Create { .. })
    }

    pub fn is_update(&self) -> bool {
        matches!(self, Directive::Update { .. })
    }

    pub fn is_remove(&self) -> bool {
        matches!(self, Directive::Remove { .. })
    }
}

/// Ordered directives produced by one reconciliation or restyle pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderPass {
    pub directives: Vec<Directive>,
}

impl RenderPass {
    pub fn creates(&self, kind: ElementKind) -> impl Iterator<Item = &Directive> {
        self.of_kind(kind).filter(|d| d.is_create())
    }

    pub fn updates(&self, kind: ElementKind) -> impl Iterator<Item = &Directive> {
        self.of_kind(kind).filter(|d| d.is_update())
    }

    pub fn removes(&self, kind: ElementKind) -> impl Iterator<Item = &Directive> {
        self.of_kind(kind).filter(|d| d.is_remove())
    }

    pub fn of_kind(&self, kind: ElementKind) -> impl Iterator<Item = &Directive> {
        self.directives.iter().filter(move |d| d.key().kind == kind)
    }

    pub fn find(&self, key: &ElementKey) -> Option<&Directive> {
        self.directives.iter().find(|d| d.key() == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(path: EdgePath, width: f64) -> Visual {
        Visual::Edge(EdgeVisual {
            path,
            stroke_width: width,
            dashed: false,
            opacity: 1.0,
            class: "link".into(),
            tooltip: String::new(),
        })
    }

    #[test]
    fn interpolates_numeric_fields_only() {
        let from = edge(EdgePath::collapsed(Point::new(0.0, 0.0)), 2.0);
        let mut to = edge(EdgePath::new(Point::new(100.0, 40.0), Point::new(0.0, 0.0)), 10.0);
        if let Visual::Edge(e) = &mut to {
            e.dashed = true;
        }
        let Visual::Edge(mid) = from.interpolate(&to, 0.5) else {
            panic!("edge expected");
        };
        assert_eq!(mid.path.child, Point::new(50.0, 20.0));
        assert_eq!(mid.stroke_width, 6.0);
        assert!(mid.dashed);
    }

    #[test]
    fn collapse_folds_edge_and_fades() {
        let visual = edge(EdgePath::new(Point::new(100.0, 40.0), Point::new(0.0, 0.0)), 10.0);
        let gone = visual.collapsed_toward(Point::new(5.0, 5.0));
        let Visual::Edge(e) = gone else {
            panic!("edge expected");
        };
        assert_eq!(e.path, EdgePath::collapsed(Point::new(5.0, 5.0)));
        assert_eq!(e.opacity, 0.0);
    }

    #[test]
    fn directives_serialize_with_op_tag() {
        let directive = Directive::Remove {
            key: ElementKey::node("R_W"),
            toward: Point::new(1.0, 2.0),
            duration_ms: 200,
        };
        let json = serde_json::to_value(&directive).unwrap();
        assert_eq!(json["op"], "remove");
        assert_eq!(json["key"]["kind"], "node");
        assert_eq!(json["toward"]["y"], 2.0);
    }
}
