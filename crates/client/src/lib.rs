//! HTTP collaborators for docent.
//!
//! This crate provides the Weaviate search backend and the crawler service
//! client, both implementing the traits defined in `docent-core`.

pub mod crawler;
pub mod error;
mod http;
pub mod weaviate;

pub use crawler::{CrawlerClient, CrawlerConfig};
pub use error::ClientError;
pub use weaviate::{WeaviateClient, WeaviateConfig};
