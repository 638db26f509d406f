//! Retained element store that plays render passes over time.
//!
//! Elements are keyed by [`ElementKey`]; iteration follows key order, which
//! puts edges first, then edge labels, then nodes.

use std::collections::BTreeMap;

use tracing::trace;

use crate::directive::{Directive, ElementKey, RenderPass, Visual};

#[derive(Debug, Clone, PartialEq)]
struct Transition {
    from: Visual,
    to: Visual,
    elapsed_ms: f64,
    duration_ms: f64,
}

impl Transition {
    fn progress(&self) -> f64 {
        if self.duration_ms <= 0.0 {
            1.0
        } else {
            (self.elapsed_ms / self.duration_ms).min(1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub key: ElementKey,
    pub visual: Visual,
    pub exiting: bool,
    transition: Option<Transition>,
}

impl SceneElement {
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    /// Final state of the running transition, or the current state when idle.
    pub fn target(&self) -> &Visual {
        self.transition.as_ref().map_or(&self.visual, |t| &t.to)
    }

    fn start(&mut self, to: Visual, duration_ms: u32) {
        self.transition = Some(Transition {
            from: self.visual.clone(),
            to,
            elapsed_ms: 0.0,
            duration_ms: f64::from(duration_ms),
        });
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: BTreeMap<ElementKey, SceneElement>,
    clock_ms: f64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the transitions of a whole pass. Zero-length transitions settle at once.
    pub fn apply_pass(&mut self, pass: &RenderPass) {
        for directive in &pass.directives {
            self.apply(directive);
        }
        self.advance(0.0);
    }

    /// Retargets one element. The new transition starts from its current state.
    pub fn apply(&mut self, directive: &Directive) {
        match directive {
            Directive::Create {
                key,
                from,
                to,
                duration_ms,
            } => match self.elements.get_mut(key) {
                Some(element) => {
                    // interrupted exit: continue from wherever it got to
                    trace!(id = %key.id, "revived exiting element");
                    element.exiting = false;
                    element.visual.set_opacity(1.0);
                    element.start(to.clone(), *duration_ms);
                }
                None => {
                    let mut element = SceneElement {
                        key: key.clone(),
                        visual: from.clone(),
                        exiting: false,
                        transition: None,
                    };
                    element.start(to.clone(), *duration_ms);
                    self.elements.insert(key.clone(), element);
                }
            },
            Directive::Update {
                key,
                to,
                duration_ms,
            } => match self.elements.get_mut(key) {
                Some(element) => {
                    element.exiting = false;
                    element.start(to.clone(), *duration_ms);
                }
                None => {
                    trace!(id = %key.id, "update for unknown element, placing directly");
                    self.elements.insert(
                        key.clone(),
                        SceneElement {
                            key: key.clone(),
                            visual: to.clone(),
                            exiting: false,
                            transition: None,
                        },
                    );
                }
            },
            Directive::Remove {
                key,
                toward,
                duration_ms,
            } => {
                if let Some(element) = self.elements.get_mut(key) {
                    let target = element.visual.collapsed_toward(*toward);
                    element.exiting = true;
                    element.start(target, *duration_ms);
                }
            }
        }
    }

    /// Moves the clock forward, interpolating running transitions and dropping finished exits.
    pub fn advance(&mut self, ms: f64) {
        self.clock_ms += ms.max(0.0);
        let mut finished_exits = Vec::new();
        for (key, element) in &mut self.elements {
            let Some(transition) = element.transition.as_mut() else {
                continue;
            };
            transition.elapsed_ms += ms.max(0.0);
            let t = transition.progress();
            element.visual = transition.from.interpolate(&transition.to, t);
            if t >= 1.0 {
                element.transition = None;
                if element.exiting {
                    finished_exits.push(key.clone());
                }
            }
        }
        for key in finished_exits {
            self.elements.remove(&key);
        }
    }

    /// Runs every transition to completion.
    pub fn settle(&mut self) {
        while self.is_animating() {
            let remaining = self
                .elements
                .values()
                .filter_map(|e| e.transition.as_ref())
                .map(|t| t.duration_ms - t.elapsed_ms)
                .fold(0.0_f64, f64::max);
            self.advance(remaining.max(1.0));
        }
    }

    pub fn is_animating(&self) -> bool {
        self.elements.values().any(SceneElement::is_animating)
    }

    pub fn elements(&self) -> impl Iterator<Item = &SceneElement> {
        self.elements.values()
    }

    pub fn get(&self, key: &ElementKey) -> Option<&SceneElement> {
        self.elements.get(key)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::{ElementKind, NodeVisual, TextAnchor};
    use crate::ir::NodeType;
    use crate::layout::Point;

    fn node_visual(x: f64, opacity: f64) -> Visual {
        Visual::Node(NodeVisual {
            position: Point::new(x, 0.0),
            radius: 15.0,
            opacity,
            label: "W".into(),
            label_anchor: TextAnchor::Start,
            label_dx: 21.0,
            value_text: "NA".into(),
            unit_text: String::new(),
            tooltip: String::new(),
            node_type: NodeType::Well,
            has_children: false,
            collapsed: false,
        })
    }

    fn create(id: &str, from: f64, to: f64) -> Directive {
        Directive::Create {
            key: ElementKey::node(id),
            from: node_visual(from, 1.0),
            to: node_visual(to, 1.0),
            duration_ms: 200,
        }
    }

    fn remove(id: &str, toward: f64) -> Directive {
        Directive::Remove {
            key: ElementKey::node(id),
            toward: Point::new(toward, 0.0),
            duration_ms: 200,
        }
    }

    fn x_of(scene: &Scene, id: &str) -> f64 {
        match &scene.get(&ElementKey::node(id)).unwrap().visual {
            Visual::Node(n) => n.position.x,
            other => panic!("node expected, got {other:?}"),
        }
    }

    #[test]
    fn create_transitions_from_start_to_end() {
        let mut scene = Scene::new();
        scene.apply_pass(&RenderPass {
            directives: vec![create("R_W", 0.0, 100.0)],
        });
        assert_eq!(x_of(&scene, "R_W"), 0.0);
        scene.advance(100.0);
        assert_eq!(x_of(&scene, "R_W"), 50.0);
        scene.advance(150.0);
        assert_eq!(x_of(&scene, "R_W"), 100.0);
        assert!(!scene.is_animating());
    }

    #[test]
    fn removed_element_lingers_until_its_exit_finishes() {
        let mut scene = Scene::new();
        scene.apply_pass(&RenderPass {
            directives: vec![create("R_W", 100.0, 100.0)],
        });
        scene.settle();
        scene.apply_pass(&RenderPass {
            directives: vec![remove("R_W", 0.0)],
        });
        scene.advance(100.0);
        let element = scene.get(&ElementKey::node("R_W")).unwrap();
        assert!(element.exiting);
        assert_eq!(element.visual.opacity(), 0.5);
        scene.advance(100.0);
        assert!(scene.get(&ElementKey::node("R_W")).is_none());
    }

    #[test]
    fn create_revives_an_exiting_element() {
        let mut scene = Scene::new();
        scene.apply_pass(&RenderPass {
            directives: vec![create("R_W", 100.0, 100.0)],
        });
        scene.settle();
        scene.apply_pass(&RenderPass {
            directives: vec![remove("R_W", 0.0)],
        });
        scene.advance(100.0);
        assert_eq!(x_of(&scene, "R_W"), 50.0);

        scene.apply_pass(&RenderPass {
            directives: vec![create("R_W", 0.0, 100.0)],
        });
        // resumes from the interrupted position, not from the create's start
        assert_eq!(x_of(&scene, "R_W"), 50.0);
        let element = scene.get(&ElementKey::node("R_W")).unwrap();
        assert!(!element.exiting);
        assert_eq!(element.visual.opacity(), 1.0);
        scene.advance(50.0);
        assert_eq!(scene.get(&ElementKey::node("R_W")).unwrap().visual.opacity(), 1.0);
        scene.settle();
        let element = scene.get(&ElementKey::node("R_W")).unwrap();
        assert!(!element.exiting);
        assert_eq!(element.visual.opacity(), 1.0);
        assert_eq!(x_of(&scene, "R_W"), 100.0);
    }

    #[test]
    fn elements_iterate_edges_before_nodes() {
        let mut scene = Scene::new();
        scene.apply_pass(&RenderPass {
            directives: vec![
                create("R", 0.0, 0.0),
                Directive::Update {
                    key: ElementKey::edge("R_W"),
                    to: Visual::Edge(crate::directive::EdgeVisual {
                        path: crate::layout::EdgePath::collapsed(Point::ORIGIN),
                        stroke_width: 2.0,
                        dashed: true,
                        opacity: 1.0,
                        class: "link".into(),
                        tooltip: String::new(),
                    }),
                    duration_ms: 0,
                },
            ],
        });
        let kinds: Vec<ElementKind> = scene.elements().map(|e| e.key.kind).collect();
        assert_eq!(kinds, [ElementKind::Edge, ElementKind::Node]);
    }

    #[test]
    fn zero_duration_remove_is_immediate() {
        let mut scene = Scene::new();
        scene.apply_pass(&RenderPass {
            directives: vec![create("R", 0.0, 0.0)],
        });
        scene.apply_pass(&RenderPass {
            directives: vec![Directive::Remove {
                key: ElementKey::node("R"),
                toward: Point::ORIGIN,
                duration_ms: 0,
            }],
        });
        assert!(scene.is_empty());
    }
}
