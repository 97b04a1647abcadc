//! Cache maintenance tools.

pub mod purge;

pub use purge::{CachePurgeOutput, purge_impl};
