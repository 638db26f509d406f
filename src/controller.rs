//! The diagram controller: owns the hierarchies, scales and selection, and
//! drives one reconciliation pass per mutation.

use tracing::{debug, warn};

use crate::collapse::{Toggle, toggle_branch};
use crate::config::{Config, LayoutConfig};
use crate::directive::RenderPass;
use crate::error::DiagramError;
use crate::hierarchy::{DatedHierarchy, Hierarchy, build_dated_hierarchies};
use crate::ir::{DatedTree, InputDocument, MetadataEntry, MetadataTable};
use crate::layout::Canvas;
use crate::reconcile::{RenderContext, reconcile, restyle};
use crate::scale::EdgeScales;
use crate::selection::{InitialSelection, Selection, locate_date};

#[derive(Debug, Clone)]
pub struct DiagramController {
    runs: Vec<DatedHierarchy>,
    scales: EdgeScales,
    metadata: MetadataTable,
    selection: Selection,
    /// Traversable tree as of the last pass; seeds the next one.
    current: Option<Hierarchy>,
    canvas: Canvas,
    layout: LayoutConfig,
}

impl DiagramController {
    /// Builds hierarchies and scales for the whole series and renders the initial selection.
    pub fn new(
        trees: &[DatedTree],
        edge_metadata: &[MetadataEntry],
        node_metadata: &[MetadataEntry],
        initial: InitialSelection,
        config: &Config,
    ) -> (Self, RenderPass) {
        let canvas = Canvas::new(&config.render, &config.layout);
        let runs = build_dated_hierarchies(trees, &canvas);
        let scales = EdgeScales::from_dated_trees(
            trees,
            [config.layout.min_stroke_width, config.layout.max_stroke_width],
        );
        let metadata = MetadataTable::new(edge_metadata, node_metadata);

        let selection = match Selection::resolve(initial.clone(), &runs) {
            Some(selection) => selection,
            None => {
                let fallback = runs
                    .first()
                    .and_then(|run| run.dates.first())
                    .cloned()
                    .unwrap_or_default();
                warn!(
                    requested = %initial.date,
                    fallback = %fallback,
                    "initial date not found, showing the first date instead"
                );
                Selection {
                    edge_key: initial.edge_key,
                    node_key: initial.node_key,
                    date: fallback,
                    run: 0,
                    date_index: 0,
                }
            }
        };
        if !scales.is_empty() && scales.get(&selection.edge_key).is_none() {
            warn!(key = %selection.edge_key, "edge attribute has no observed values");
        }

        let mut controller = Self {
            runs,
            scales,
            metadata,
            selection,
            current: None,
            canvas,
            layout: config.layout.clone(),
        };
        let pass = controller.render();
        (controller, pass)
    }

    pub fn from_document(
        document: &InputDocument,
        initial: InitialSelection,
        config: &Config,
    ) -> (Self, RenderPass) {
        Self::new(
            &document.data,
            &document.edge_metadata_list,
            &document.node_metadata_list,
            initial,
            config,
        )
    }

    /// Shows `date`, swapping hierarchy and layout when it belongs to another run.
    pub fn set_date(&mut self, date: &str) -> Result<RenderPass, DiagramError> {
        let (run, date_index) =
            locate_date(&self.runs, date).ok_or_else(|| DiagramError::UnknownDate(date.to_string()))?;
        if run != self.selection.run {
            debug!(from = self.selection.run, to = run, "switching group tree run");
        }
        self.selection.move_to(date, run, date_index);
        Ok(self.render())
    }

    /// Changes the attribute driving edge width and dashing. No layout is recomputed.
    pub fn set_edge_attribute(&mut self, key: &str) -> RenderPass {
        self.selection.edge_key = key.to_string();
        self.restyle()
    }

    /// Changes the attribute shown as node value text. No layout is recomputed.
    pub fn set_node_attribute(&mut self, key: &str) -> RenderPass {
        self.selection.node_key = key.to_string();
        self.restyle()
    }

    /// Collapses or expands the node with `node_id` and re-renders the current date.
    pub fn toggle_branch(&mut self, node_id: &str) -> Result<RenderPass, DiagramError> {
        let shown = self
            .current
            .as_ref()
            .is_some_and(|tree| tree.find(node_id).is_some());
        let tree = &mut self.runs[self.selection.run].tree;
        let idx = tree
            .find(node_id)
            .filter(|_| shown)
            .ok_or_else(|| DiagramError::UnknownNode(node_id.to_string()))?;
        match toggle_branch(tree, idx) {
            Toggle::Collapsed => debug!(node = node_id, "collapsed branch"),
            Toggle::Expanded => debug!(node = node_id, "expanded branch"),
            Toggle::Leaf => debug!(node = node_id, "toggled a leaf, nothing to do"),
        }
        Ok(self.render())
    }

    fn render(&mut self) -> RenderPass {
        let Self {
            runs,
            scales,
            metadata,
            selection,
            current,
            canvas,
            layout,
        } = self;
        let ctx = RenderContext {
            date_index: selection.date_index,
            edge_key: &selection.edge_key,
            node_key: &selection.node_key,
            scales,
            metadata,
            canvas,
            layout,
        };
        let tree = &mut runs[selection.run].tree;
        let pass = reconcile(current.as_mut(), tree, &ctx);
        *current = Some(tree.prune());
        pass
    }

    fn restyle(&self) -> RenderPass {
        let ctx = RenderContext {
            date_index: self.selection.date_index,
            edge_key: &self.selection.edge_key,
            node_key: &self.selection.node_key,
            scales: &self.scales,
            metadata: &self.metadata,
            canvas: &self.canvas,
            layout: &self.layout,
        };
        restyle(&self.runs[self.selection.run].tree, &ctx)
    }

    pub fn current_date(&self) -> &str {
        &self.selection.date
    }

    pub fn current_edge_attribute(&self) -> &str {
        &self.selection.edge_key
    }

    pub fn current_node_attribute(&self) -> &str {
        &self.selection.node_key
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Every date of the series, in run order.
    pub fn dates(&self) -> Vec<&str> {
        self.runs
            .iter()
            .flat_map(|run| run.dates.iter().map(String::as_str))
            .collect()
    }

    /// The tree as rendered by the last pass.
    pub fn current_tree(&self) -> Option<&Hierarchy> {
        self.current.as_ref()
    }

    pub fn runs(&self) -> &[DatedHierarchy] {
        &self.runs
    }

    pub fn scales(&self) -> &EdgeScales {
        &self.scales
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }
}
