//! Documentation search and lookup tools.

pub mod get;
pub mod search;

pub use get::{DocsGetParams, get_impl};
pub use search::{DocsSearchParams, search_impl};
