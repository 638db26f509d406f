use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Per-date values of one attribute. `None` marks a date without a value.
pub type DatedValues = Vec<Option<f64>>;

/// Attribute key to dated values, in input order.
pub type AttributeMap = IndexMap<String, DatedValues>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    Well,
    Group,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecursiveTreeNode {
    pub node_label: String,
    #[serde(default)]
    pub edge_label: String,
    #[serde(default = "default_node_type")]
    pub node_type: NodeType,
    #[serde(default)]
    pub node_data: AttributeMap,
    #[serde(default)]
    pub edge_data: AttributeMap,
    #[serde(default)]
    pub children: Vec<RecursiveTreeNode>,
}

fn default_node_type() -> NodeType {
    NodeType::Group
}

impl RecursiveTreeNode {
    pub fn new(node_label: &str, edge_label: &str, node_type: NodeType) -> Self {
        Self {
            node_label: node_label.to_string(),
            edge_label: edge_label.to_string(),
            node_type,
            node_data: AttributeMap::new(),
            edge_data: AttributeMap::new(),
            children: Vec::new(),
        }
    }

    /// Pre-order walk over this node and all of its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a RecursiveTreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// One tree topology, valid for a contiguous run of dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedTree {
    pub dates: Vec<String>,
    pub tree: RecursiveTreeNode,
}

pub const NO_DATA_LABEL: &str = "NO DATA";

impl DatedTree {
    /// Stand-in run used when the input series is empty.
    pub fn no_data() -> Self {
        Self {
            dates: vec![String::new()],
            tree: RecursiveTreeNode::new(NO_DATA_LABEL, NO_DATA_LABEL, NodeType::Well),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MetadataEntry {
    pub fn new(key: &str, label: &str, unit: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            unit: unit.map(str::to_string),
        }
    }
}

/// Lookup from attribute key to display label and unit, shared by node and edge keys.
#[derive(Debug, Clone, Default)]
pub struct MetadataTable {
    entries: IndexMap<String, MetadataEntry>,
}

impl MetadataTable {
    pub fn new(edge_metadata: &[MetadataEntry], node_metadata: &[MetadataEntry]) -> Self {
        let mut entries = IndexMap::new();
        for entry in edge_metadata.iter().chain(node_metadata) {
            entries.insert(entry.key.clone(), entry.clone());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&MetadataEntry> {
        self.entries.get(key)
    }

    pub fn label(&self, key: &str) -> &str {
        self.get(key).map(|entry| entry.label.as_str()).unwrap_or("")
    }

    pub fn unit(&self, key: &str) -> &str {
        self.get(key)
            .and_then(|entry| entry.unit.as_deref())
            .unwrap_or("")
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

/// Everything a host hands over at construction, in the group tree JSON shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputDocument {
    #[serde(default)]
    pub data: Vec<DatedTree>,
    #[serde(default)]
    pub edge_metadata_list: Vec<MetadataEntry>,
    #[serde(default)]
    pub node_metadata_list: Vec<MetadataEntry>,
}

impl InputDocument {
    pub fn from_json(input: &str) -> Result<Self, crate::error::DiagramError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn first_date(&self) -> Option<&str> {
        self.data
            .iter()
            .flat_map(|run| run.dates.iter())
            .next()
            .map(String::as_str)
    }
}
