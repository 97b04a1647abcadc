//! Crawl job tools.

pub mod crawl4ai;
pub mod start;
pub mod status;

pub use crawl4ai::{Crawl4aiDocsParams, crawl4ai_docs_impl};
pub use start::{CrawlStartParams, start_impl};
pub use status::{CrawlStatusParams, status_impl};
