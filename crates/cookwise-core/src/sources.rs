//! Source configuration: which aggregator categories and search terms to
//! query, how supplier ids map to chain names, and which retailer store to
//! fall back on when the store listing is unavailable.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A retailer store known ahead of time, used when store discovery fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackStore {
    pub store_id: String,
    pub slug: String,
    pub name: String,
}

impl Default for FallbackStore {
    fn default() -> Self {
        Self {
            store_id: "1004028".to_string(),
            slug: "maxi-ica-stormarknad-karlskrona".to_string(),
            name: "Maxi ICA Stormarknad Karlskrona".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Aggregator supplier id → chain display name.
    pub suppliers: BTreeMap<String, String>,
    pub search_terms: Vec<String>,
    /// Aggregator category slugs, e.g. `"kategori/frukt-gront"`.
    pub categories: Vec<String>,
    /// Only the first `category_limit` entries of `categories` are fetched.
    pub category_limit: usize,
    pub fallback_store: FallbackStore,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        let suppliers = [
            ("17", "ICA"),
            ("13", "Coop"),
            ("15", "Willys"),
            ("16", "Hemköp"),
            ("11", "MatHem"),
            ("18", "Citygross"),
        ]
        .into_iter()
        .map(|(id, chain)| (id.to_string(), chain.to_string()))
        .collect();

        let search_terms = ["mjölk", "bröd", "kyckling", "potatis", "ris"]
            .into_iter()
            .map(str::to_string)
            .collect();

        let categories = [
            "kategori/frukt-gront",
            "kategori/mejeri-ost-agg",
            "kategori/kott-fagel-chark",
            "kategori/fisk-skaldjur",
            "kategori/brod-bageri",
            "kategori/skafferi",
            "kategori/dryck",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            suppliers,
            search_terms,
            categories,
            category_limit: 4,
            fallback_store: FallbackStore::default(),
        }
    }
}

impl SourcesConfig {
    /// Category slugs that will actually be fetched, honoring `category_limit`.
    #[must_use]
    pub fn active_categories(&self) -> &[String] {
        let end = self.category_limit.min(self.categories.len());
        &self.categories[..end]
    }
}

/// Load and validate the source configuration from a YAML file.
///
/// Keys missing from the file take their built-in defaults.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sources(path: &Path) -> Result<SourcesConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sources(&content)
}

/// Parse and validate source configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sources(content: &str) -> Result<SourcesConfig, ConfigError> {
    let sources: SourcesConfig =
        serde_yaml::from_str(content).map_err(ConfigError::SourcesFileParse)?;

    validate_sources(&sources)?;

    Ok(sources)
}

fn is_numeric_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn validate_sources(sources: &SourcesConfig) -> Result<(), ConfigError> {
    for (id, chain) in &sources.suppliers {
        if !is_numeric_id(id) {
            return Err(ConfigError::Validation(format!(
                "supplier id '{id}' must be numeric"
            )));
        }
        if chain.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "supplier '{id}' has an empty chain name"
            )));
        }
    }

    if sources.search_terms.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "search terms must be non-empty".to_string(),
        ));
    }

    let mut seen_categories = HashSet::new();
    for slug in &sources.categories {
        if slug.trim().is_empty() {
            return Err(ConfigError::Validation(
                "category slugs must be non-empty".to_string(),
            ));
        }
        if !seen_categories.insert(slug.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate category slug: '{slug}'"
            )));
        }
    }

    if sources.category_limit == 0 {
        return Err(ConfigError::Validation(
            "category_limit must be at least 1".to_string(),
        ));
    }

    let fallback = &sources.fallback_store;
    if !is_numeric_id(&fallback.store_id) {
        return Err(ConfigError::Validation(format!(
            "fallback store id '{}' must be numeric",
            fallback.store_id
        )));
    }
    if fallback.slug.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fallback store slug must be non-empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "sources_test.rs"]
mod tests;
