//! Palika editor kernel library
//!
//! The content store, node registry, and renderers behind the article
//! editor, plus the configuration and command handlers used by the `palika`
//! binary.

pub mod cli;
pub mod config;
pub mod content;
pub mod error;

pub use config::Config;
pub use content::{ContentStore, NodeRegistry, StoreOptions};
pub use error::{BatchError, StoreError, StoreResult};
