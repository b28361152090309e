//! Palika SDK
//!
//! Article document types shared by the content store, the renderers, and
//! anything that reads or writes article JSON.

pub mod article;
pub mod multilingual;
pub mod node;

pub use article::{
    ARTICLE_FORMAT_VERSION, Article, ArticleId, ArticleMetadata, ArticleSettings, ArticleStatus,
    FeatureFlags, SeoMetadata, Structure, Theme,
};
pub use multilingual::{ENGLISH, MultilingualContent, NEPALI};
pub use node::{NewNode, Node, NodeBody, NodeId, NodeType};

pub mod prelude {
    pub use crate::article::*;
    pub use crate::multilingual::*;
    pub use crate::node::*;
}
