use crate::config::Config;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::directive::{EdgeLabelVisual, EdgeVisual, NodeVisual, Visual};
use crate::ir::NodeType;
use crate::layout::Canvas;
use crate::scene::Scene;
use crate::text::escape_xml;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::HashMap;
use std::path::Path;

/// Draws the scene's current (possibly mid-transition) state.
pub fn render_svg(scene: &Scene, theme: &Theme, config: &Config) -> String {
    let mut svg = String::new();
    let canvas = Canvas::new(&config.render, &config.layout);
    let (width, height) = (canvas.width, canvas.height);
    let margin = canvas.margin;

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.render.background
    ));
    svg.push_str(&format!(
        "<g class=\"grouptree\" transform=\"translate({:.2},{:.2})\">",
        margin.left, margin.top
    ));

    // custom ids may hold '%' and '#', so paths get positional ids for textPath refs
    let mut path_ids: HashMap<&str, String> = HashMap::new();

    for element in scene.elements() {
        match &element.visual {
            Visual::Edge(edge) => {
                let path_id = format!("grouptree-path-{}", path_ids.len());
                svg.push_str(&edge_svg(edge, &path_id, theme, config));
                path_ids.insert(element.key.id.as_str(), path_id);
            }
            Visual::EdgeLabel(label) => {
                if let Some(path_id) = path_ids.get(label.path_id.as_str()) {
                    svg.push_str(&edge_label_svg(label, path_id, theme));
                }
            }
            Visual::Node(node) => {
                svg.push_str(&node_svg(node, &element.key.id, theme));
            }
        }
    }

    svg.push_str("</g>");
    svg.push_str("</svg>");
    svg
}

fn edge_svg(edge: &EdgeVisual, path_id: &str, theme: &Theme, config: &Config) -> String {
    let dash = if edge.dashed {
        format!(" stroke-dasharray=\"{}\"", config.layout.dash_pattern)
    } else {
        String::new()
    };
    let mut out = format!(
        "<path id=\"{path_id}\" class=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\" opacity=\"{:.3}\"{dash}>",
        escape_xml(&edge.class),
        edge.path.to_svg_d(),
        theme.line_color,
        edge.stroke_width,
        edge.opacity,
    );
    out.push_str(&title_svg(&edge.tooltip));
    out.push_str("</path>");
    out
}

fn edge_label_svg(label: &EdgeLabelVisual, path_id: &str, theme: &Theme) -> String {
    format!(
        "<text dominant-baseline=\"central\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\" fill-opacity=\"{:.3}\"><textPath class=\"edge_info_text\" startOffset=\"50%\" xlink:href=\"#{path_id}\">{}</textPath></text>",
        theme.font_family,
        theme.font_size,
        theme.edge_label_color,
        label.opacity,
        escape_xml(&label.text)
    )
}

fn node_svg(node: &NodeVisual, id: &str, theme: &Theme) -> String {
    let fill = if node.collapsed {
        theme.node_fill_with_children.as_str()
    } else {
        theme.node_fill.as_str()
    };
    let kind = match node.node_type {
        NodeType::Well => " grouptree__well",
        NodeType::Group => " grouptree__group",
        NodeType::Other => "",
    };
    let mut out = format!(
        "<g class=\"node{kind}\" id=\"{}\" transform=\"translate({:.2},{:.2})\" opacity=\"{:.3}\">",
        escape_xml(id),
        node.position.x,
        node.position.y,
        node.opacity,
    );
    out.push_str(&format!(
        "<circle r=\"{:.2}\" fill=\"{fill}\" stroke=\"{}\" stroke-width=\"2\"/>",
        node.radius, theme.node_stroke
    ));
    out.push_str(&format!(
        "<text class=\"grouptree__nodelabel\" x=\"{:.2}\" dy=\".35em\" text-anchor=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        node.label_dx,
        node.label_anchor.as_svg(),
        theme.font_family,
        theme.font_size,
        theme.text_color,
        escape_xml(&node.label)
    ));
    out.push_str(&format!(
        "<text class=\"grouptree__pressurelabel\" x=\"0\" dy=\"-.05em\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.font_size,
        theme.text_color,
        escape_xml(&node.value_text)
    ));
    out.push_str(&format!(
        "<text class=\"grouptree__pressureunit\" x=\"0\" dy=\".04em\" dominant-baseline=\"text-before-edge\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        theme.font_family,
        theme.font_size,
        theme.text_color,
        escape_xml(&node.unit_text)
    ));
    out.push_str(&title_svg(&node.tooltip));
    out.push_str("</g>");
    out
}

fn title_svg(tooltip: &str) -> String {
    if tooltip.is_empty() {
        return String::new();
    }
    format!("<title>{}</title>", escape_xml(tooltip))
}

/// Writes rendered text (SVG markup or a JSON dump) to `output`, or stdout when absent.
pub fn write_output(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, contents)?;
        }
        None => {
            print!("{}", contents);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or("sans-serif")
        .to_string();
    opt.fontdb_mut().load_system_fonts();
    opt.default_size = usvg::Size::from_wh(render_cfg.width as f32, render_cfg.height as f32)
        .ok_or_else(|| anyhow::anyhow!("Invalid canvas size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DiagramController;
    use crate::hierarchy::tests::node;
    use crate::ir::{DatedTree, MetadataEntry};
    use crate::selection::InitialSelection;

    fn settled_scene(tree: DatedTree) -> Scene {
        let config = Config::default();
        let (_, pass) = DiagramController::new(
            &[tree],
            &[MetadataEntry::new("oilrate", "Oil Rate", Some("Sm3/day"))],
            &[],
            InitialSelection::new("oilrate", "pressure", "2020-01-01"),
            &config,
        );
        let mut scene = Scene::new();
        scene.apply_pass(&pass);
        scene.settle();
        scene
    }

    #[test]
    fn render_svg_basic() {
        let mut well = node("A_1", vec![]);
        well.edge_data.insert("oilrate".into(), vec![Some(12.0)]);
        let scene = settled_scene(DatedTree {
            dates: vec!["2020-01-01".into()],
            tree: node("FIELD", vec![well]),
        });
        let config = Config::default();
        let svg = render_svg(&scene, &config.theme, &config);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("translate(90.00,10.00)"));
        assert!(svg.contains("grouptree_link__oilrate"));
        assert!(svg.contains("xlink:href=\"#grouptree-path-0\">A_1</textPath>"));
        assert!(svg.contains("<title>Oil Rate 12 Sm3/day</title>"));
        assert!(svg.contains(">NA</text>"));
    }

    #[test]
    fn zero_flow_edges_are_dashed() {
        let mut well = node("B", vec![]);
        well.edge_data.insert("oilrate".into(), vec![Some(0.0)]);
        let scene = settled_scene(DatedTree {
            dates: vec!["2020-01-01".into()],
            tree: node("R", vec![well]),
        });
        let config = Config::default();
        let svg = render_svg(&scene, &config.theme, &config);
        assert!(svg.contains("stroke-dasharray=\"5,5\""));
    }

    #[test]
    fn svg_size_matches_layout_canvas() {
        let mut config = Config::default();
        config.render.width = 150.0;
        config.render.height = 300.0;
        let canvas = Canvas::new(&config.render, &config.layout);
        let svg = render_svg(&Scene::new(), &config.theme, &config);
        assert_eq!((canvas.width, canvas.height), (150.0, 500.0));
        assert!(svg.contains("width=\"150\" height=\"500\" viewBox=\"0 0 150 500\""));
    }

    #[test]
    fn write_output_writes_any_text() {
        let path = std::env::temp_dir().join(format!("gtr-dump-{}.json", std::process::id()));
        write_output("[{\"step\":\"initial\"}]", Some(&path)).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written, "[{\"step\":\"initial\"}]");
    }

    #[test]
    fn labels_are_escaped() {
        let scene = settled_scene(DatedTree {
            dates: vec!["2020-01-01".into()],
            tree: node("R&D <1>", vec![]),
        });
        let config = Config::default();
        let svg = render_svg(&scene, &config.theme, &config);
        assert!(svg.contains("R&amp;D &lt;1&gt;"));
        assert!(!svg.contains("<1>"));
    }
}
