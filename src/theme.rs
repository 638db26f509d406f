use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub node_fill: String,
    pub node_fill_with_children: String,
    pub node_stroke: String,
    pub text_color: String,
    pub line_color: String,
    pub edge_label_color: String,
    pub background: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 10.0,
            node_fill: "#FFFFFF".to_string(),
            node_fill_with_children: "#B0C4DE".to_string(),
            node_stroke: "#4682B4".to_string(),
            text_color: "#333333".to_string(),
            line_color: "#CCCCCC".to_string(),
            edge_label_color: "#555555".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            node_fill: "#F8FAFF".to_string(),
            node_fill_with_children: "#C7D2E5".to_string(),
            node_stroke: "#7A8AA6".to_string(),
            text_color: "#1C2430".to_string(),
            line_color: "#9FB0C8".to_string(),
            edge_label_color: "#4A5568".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}
