//! Aggregator API adapter: supplier directory, search terms, and category
//! pages, all fetched one request at a time.

mod parse;
pub mod types;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use cookwise_core::SourcesConfig;
use serde_json::{json, Value};

pub use parse::{
    category_label, dedup_by_product_id, parse_product, parse_suppliers, raw_products,
    SupplierTable,
};
pub use types::{AggregatorProduct, AggregatorResults, ChainPrice, SupplierInfo};

use crate::client::{join_url, HttpFetcher};
use crate::error::ScraperError;

pub struct AggregatorAdapter {
    fetcher: HttpFetcher,
    base_url: String,
    sources: SourcesConfig,
}

impl AggregatorAdapter {
    #[must_use]
    pub fn new(fetcher: HttpFetcher, base_url: &str, sources: SourcesConfig) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_owned(),
            sources,
        }
    }

    /// Fetches the supplier directory and keeps grocery stores.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the directory cannot be fetched or decoded.
    pub async fn fetch_suppliers(&self) -> Result<BTreeMap<String, SupplierInfo>, ScraperError> {
        let url = join_url(&self.base_url, "/suppliers")?;
        let directory = self.fetcher.get_json(&url).await?;
        let suppliers = parse_suppliers(&directory);
        tracing::info!(count = suppliers.len(), "grocery suppliers found");
        Ok(suppliers)
    }

    /// Runs one free-text search.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the request fails or the body is not JSON.
    pub async fn search(
        &self,
        term: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<Vec<AggregatorProduct>, ScraperError> {
        let payload = self.post_slug(&format!("/?q={term}")).await?;
        let products = self.parse_payload(&payload, None, scraped_at);
        tracing::info!(term, count = products.len(), "search results parsed");
        Ok(products)
    }

    /// Fetches one category page; products are deduplicated by id within
    /// the page.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the request fails or the body is not JSON.
    pub async fn category(
        &self,
        slug: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<Vec<AggregatorProduct>, ScraperError> {
        let payload = self.post_slug(&format!("/{slug}")).await?;
        let label = category_label(slug);
        let products = self.parse_payload(&payload, Some(&label), scraped_at);
        let products = dedup_by_product_id(products, &mut HashSet::new());
        tracing::info!(category = slug, count = products.len(), "category products parsed");
        Ok(products)
    }

    /// Runs supplier discovery, every search term, and the active
    /// categories in sequence, then deduplicates across the whole run.
    ///
    /// Never fails: each failed request is logged and contributes nothing.
    pub async fn run(&self) -> AggregatorResults {
        let scraped_at = Utc::now();
        let mut results = AggregatorResults::empty(scraped_at);

        match self.fetch_suppliers().await {
            Ok(suppliers) => results.suppliers = suppliers,
            Err(e) => tracing::warn!(error = %e, "supplier directory fetch failed"),
        }

        let mut products = Vec::new();

        for term in &self.sources.search_terms {
            match self.search(term, scraped_at).await {
                Ok(found) => products.extend(found),
                Err(e) => tracing::warn!(term = %term, error = %e, "search failed"),
            }
        }

        for slug in self.sources.active_categories() {
            match self.category(slug, scraped_at).await {
                Ok(found) => {
                    products.extend(found);
                    results.categories_scraped.push(slug.clone());
                }
                Err(e) => tracing::warn!(category = %slug, error = %e, "category fetch failed"),
            }
        }

        results.products = dedup_by_product_id(products, &mut HashSet::new());
        tracing::info!(
            products = results.products.len(),
            categories = results.categories_scraped.len(),
            "aggregator run complete"
        );
        results
    }

    async fn post_slug(&self, slug: &str) -> Result<Value, ScraperError> {
        let url = join_url(&self.base_url, "/slug")?;
        let mut response = self.fetcher.post_json(&url, &json!({ "slug": slug })).await?;
        Ok(response
            .get_mut("payload")
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    fn parse_payload(
        &self,
        payload: &Value,
        category: Option<&str>,
        scraped_at: DateTime<Utc>,
    ) -> Vec<AggregatorProduct> {
        let suppliers = SupplierTable::new(&self.sources.suppliers);
        raw_products(payload)
            .into_iter()
            .filter_map(|raw| parse_product(raw, category, suppliers, scraped_at))
            .collect()
    }
}
