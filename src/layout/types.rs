use serde::Serialize;

use crate::config::{LayoutConfig, Margin, RenderConfig};

/// Diagram coordinate. `x` runs along the depth axis (left to right),
/// `y` along the sibling axis (top to bottom).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Drawable area, read once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    pub tree_width: f64,
    pub tree_height: f64,
    #[serde(skip)]
    pub margin: Margin,
}

impl Canvas {
    pub fn new(render: &RenderConfig, layout: &LayoutConfig) -> Self {
        let margin = layout.margin;
        let height = render.height.max(layout.min_height);
        let tree_height = (height - margin.top - margin.bottom).max(0.0);
        let tree_width = (render.width - margin.left - margin.right).max(0.0);
        Self {
            width: render.width,
            height,
            tree_width,
            tree_height,
            margin,
        }
    }

    /// Where the root sits before anything has been laid out.
    pub fn root_origin(&self) -> Point {
        Point::new(0.0, self.tree_height / 2.0)
    }
}

/// Cubic curve from a child node back to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgePath {
    pub child: Point,
    pub parent: Point,
}

impl EdgePath {
    pub fn new(child: Point, parent: Point) -> Self {
        Self { child, parent }
    }

    /// Zero-length path at `at`, used for edges growing out of or collapsing into a node.
    pub fn collapsed(at: Point) -> Self {
        Self {
            child: at,
            parent: at,
        }
    }

    pub fn lerp(self, other: EdgePath, t: f64) -> EdgePath {
        EdgePath {
            child: self.child.lerp(other.child, t),
            parent: self.parent.lerp(other.parent, t),
        }
    }

    pub fn to_svg_d(&self) -> String {
        let (s, d) = (self.child, self.parent);
        let mid_x = (s.x + d.x) / 2.0;
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            d.x, d.y, mid_x, d.y, mid_x, s.y, s.x, s.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_respects_min_height_and_margins() {
        let render = RenderConfig {
            width: 1000.0,
            height: 300.0,
            ..Default::default()
        };
        let canvas = Canvas::new(&render, &LayoutConfig::default());
        assert_eq!(canvas.height, 500.0);
        assert_eq!(canvas.tree_height, 460.0);
        assert_eq!(canvas.tree_width, 820.0);
        assert_eq!(canvas.root_origin(), Point::new(0.0, 230.0));
    }

    #[test]
    fn edge_path_is_a_horizontal_cubic() {
        let path = EdgePath::new(Point::new(100.0, 10.0), Point::new(0.0, 50.0));
        assert_eq!(
            path.to_svg_d(),
            "M 0.00 50.00 C 50.00 50.00, 50.00 10.00, 100.00 10.00"
        );
    }
}
