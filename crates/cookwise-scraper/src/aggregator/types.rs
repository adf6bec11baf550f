//! Intermediate records produced by the aggregator adapter.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A grocery chain listed in the aggregator's supplier directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupplierInfo {
    pub supplier_id: String,
    pub name: String,
    pub active: bool,
}

/// One chain's price for a product, in major units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainPrice {
    pub chain: String,
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatorProduct {
    pub product_name: String,
    pub brand: Option<String>,
    /// Pack size as the aggregator renders it, e.g. `"1 l"`.
    pub weight: Option<String>,
    /// Aggregator product id, used for deduplication.
    pub product_id: Option<String>,
    pub slug: Option<String>,
    pub base_price: Option<f64>,
    pub median_price: Option<f64>,
    pub stores: Vec<ChainPrice>,
    /// Display name of the category page the product came from; `None`
    /// for search results.
    pub category: Option<String>,
    pub source: String,
    pub scraped_at: DateTime<Utc>,
}

/// Everything one aggregator run collected.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatorResults {
    pub scraped_at: DateTime<Utc>,
    pub products: Vec<AggregatorProduct>,
    /// Category slugs whose fetch succeeded.
    pub categories_scraped: Vec<String>,
    pub suppliers: BTreeMap<String, SupplierInfo>,
}

impl AggregatorResults {
    #[must_use]
    pub fn empty(scraped_at: DateTime<Utc>) -> Self {
        Self {
            scraped_at,
            products: Vec::new(),
            categories_scraped: Vec::new(),
            suppliers: BTreeMap::new(),
        }
    }
}
