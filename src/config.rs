use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 90.0,
            bottom: 30.0,
            left: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub margin: Margin,
    /// Lower bound for the canvas height before margins are removed.
    pub min_height: f64,
    pub transition_ms: u32,
    pub min_stroke_width: f64,
    pub max_stroke_width: f64,
    pub enter_node_radius: f64,
    pub node_radius: f64,
    pub label_offset: f64,
    pub dash_pattern: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            min_height: 500.0,
            transition_ms: 200,
            min_stroke_width: 2.0,
            max_stroke_width: 100.0,
            enter_node_radius: 6.0,
            node_radius: 15.0,
            label_offset: 21.0,
            dash_pattern: "5,5".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    node_fill: Option<String>,
    node_fill_with_children: Option<String>,
    node_stroke: Option<String>,
    text_color: Option<String>,
    line_color: Option<String>,
    edge_label_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarginFile {
    top: Option<f64>,
    right: Option<f64>,
    bottom: Option<f64>,
    left: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    margin: Option<MarginFile>,
    min_height: Option<f64>,
    transition_ms: Option<u32>,
    min_stroke_width: Option<f64>,
    max_stroke_width: Option<f64>,
    node_radius: Option<f64>,
    dash_pattern: Option<String>,
    width: Option<f64>,
    height: Option<f64>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a JSON5 config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = json5::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme `{other}`"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.node_fill {
            config.theme.node_fill = v;
        }
        if let Some(v) = vars.node_fill_with_children {
            config.theme.node_fill_with_children = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.edge_label_color {
            config.theme.edge_label_color = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
    }

    if let Some(margin) = parsed.margin {
        let target = &mut config.layout.margin;
        if let Some(v) = margin.top {
            target.top = v;
        }
        if let Some(v) = margin.right {
            target.right = v;
        }
        if let Some(v) = margin.bottom {
            target.bottom = v;
        }
        if let Some(v) = margin.left {
            target.left = v;
        }
    }
    if let Some(v) = parsed.min_height {
        config.layout.min_height = v;
    }
    if let Some(v) = parsed.transition_ms {
        config.layout.transition_ms = v;
    }
    if let Some(v) = parsed.min_stroke_width {
        config.layout.min_stroke_width = v;
    }
    if let Some(v) = parsed.max_stroke_width {
        config.layout.max_stroke_width = v;
    }
    if let Some(v) = parsed.node_radius {
        config.layout.node_radius = v;
    }
    if let Some(v) = parsed.dash_pattern {
        config.layout.dash_pattern = v;
    }
    if let Some(v) = parsed.width {
        config.render.width = v;
    }
    if let Some(v) = parsed.height {
        config.render.height = v;
    }

    if config.layout.max_stroke_width < config.layout.min_stroke_width {
        anyhow::bail!(
            "maxStrokeWidth ({}) is smaller than minStrokeWidth ({})",
            config.layout.max_stroke_width,
            config.layout.min_stroke_width
        );
    }

    Ok(config)
}
