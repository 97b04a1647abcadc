//! Cache key derivation.

use sha2::{Digest, Sha256};

/// Canonical form of a search query: trimmed, whitespace runs collapsed, lowercased.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Cache key for an unfiltered semantic search.
pub fn search_key(query: &str, limit: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_query(query).as_bytes());
    hasher.update(b"\n");
    hasher.update(limit.to_string().as_bytes());
    format!("search:{}", hex::encode(hasher.finalize()))
}

/// Cache key for a document lookup.
pub fn document_key(id: &str) -> String {
    format!("document:{id}")
}
