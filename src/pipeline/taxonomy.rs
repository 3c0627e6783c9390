//! Taxonomy resolution: category and tag names → term ids.
//!
//! For each name the site is searched, and the first term whose name is an
//! exact (case-sensitive) match wins. Otherwise a new term is created with a
//! slug derived from the name. A name that can be neither found nor created is
//! dropped from the result with a warning; it is not retried.

use crate::client::{Taxonomy, Term, WpClient};
use tracing::{debug, info, warn};

/// Id of the first term named exactly `name`.
pub fn exact_match(terms: &[Term], name: &str) -> Option<u64> {
    terms.iter().find(|t| t.name == name).map(|t| t.id)
}

/// Resolve one name, creating the term when it does not exist.
pub async fn get_or_create_term(client: &WpClient, taxonomy: Taxonomy, name: &str) -> Option<u64> {
    match client.search_terms(taxonomy, name).await {
        Ok(terms) => {
            if let Some(id) = exact_match(&terms, name) {
                debug!("Found {} '{}' → {}", taxonomy, name, id);
                return Some(id);
            }
        }
        Err(e) => warn!("Searching {} for '{}' failed: {}", taxonomy, name, e),
    }

    match client.create_term(taxonomy, name).await {
        Ok(term) => {
            info!("Created {} '{}' → {}", taxonomy, name, term.id);
            Some(term.id)
        }
        Err(e) => {
            warn!("Dropping {} '{}': {}", taxonomy, name, e);
            None
        }
    }
}

/// Resolve every name in order, skipping the ones that fail.
pub async fn resolve_terms(client: &WpClient, taxonomy: Taxonomy, names: &[String]) -> Vec<u64> {
    let mut ids = Vec::with_capacity(names.len());
    for name in names {
        if let Some(id) = get_or_create_term(client, taxonomy, name).await {
            ids.push(id);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(id: u64, name: &str) -> Term {
        Term { id, name: name.into() }
    }

    #[test]
    fn exact_match_is_case_sensitive() {
        let terms = vec![term(1, "rust"), term(2, "Rust"), term(3, "Rust")];
        assert_eq!(exact_match(&terms, "Rust"), Some(2));
        assert_eq!(exact_match(&terms, "rust"), Some(1));
        assert_eq!(exact_match(&terms, "RUST"), None);
    }

    #[test]
    fn partial_matches_do_not_count() {
        let terms = vec![term(4, "Rust Lang")];
        assert_eq!(exact_match(&terms, "Rust"), None);
    }
}
