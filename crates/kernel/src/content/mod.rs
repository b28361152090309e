//! Article content editing.
//!
//! This module provides:
//! - ContentStore: CRUD and reorder over one article's node structure
//! - NodePatch / MetadataPatch / SettingsPatch: partial updates
//! - Integrity checks over the order list and section references
//! - StoreAction: serializable actions and atomic batches
//! - NodeRegistry: node type definitions with editor and preview renderers
//! - HTML rendering of whole articles

pub mod action;
pub mod html;
pub mod integrity;
pub mod patch;
pub mod registry;
pub mod render;
pub mod store;

pub use action::{ActionOutcome, StoreAction};
pub use integrity::{IntegrityPolicy, IntegrityReport, check_integrity};
pub use patch::{MetadataPatch, NodePatch, SettingsPatch};
pub use registry::{NodeRegistry, NodeTypeDefinition, RenderFn};
pub use render::{RenderContext, RenderMode, RenderOptions, render_article};
pub use store::{ContentStore, StoreOptions};
