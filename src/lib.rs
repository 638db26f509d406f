#[cfg(feature = "cli")]
pub mod cli;
pub mod collapse;
pub mod config;
pub mod controller;
pub mod directive;
pub mod error;
pub mod hierarchy;
pub mod ir;
pub mod layout;
pub mod reconcile;
pub mod render;
pub mod scale;
pub mod scene;
pub mod selection;
pub mod text;
pub mod theme;
pub mod visibility;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::Config;
pub use controller::DiagramController;
pub use directive::{Directive, ElementKey, ElementKind, RenderPass, Visual};
pub use error::DiagramError;
pub use ir::{DatedTree, InputDocument, MetadataEntry, RecursiveTreeNode};
pub use scene::Scene;
pub use selection::InitialSelection;
