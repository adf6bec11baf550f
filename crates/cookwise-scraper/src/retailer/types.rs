//! Intermediate records produced by the retailer-site adapter.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::normalize::PriceField;

/// Chain label for everything the retailer site reports.
pub const RETAILER_CHAIN: &str = "ICA";

/// A store discovered on the locality listing page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetailerStore {
    /// Numeric id taken from the store page URL, e.g. `"1004028"`.
    pub store_id: String,
    pub store_name: String,
    pub chain: String,
    pub address: Option<String>,
    pub city: String,
    pub url: String,
    /// Store page slug without the trailing id.
    pub slug: String,
}

/// One weekly offer for a single store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetailerOffer {
    pub product_name: String,
    pub store_id: String,
    pub chain: String,
    pub regular_price: Option<PriceField>,
    pub sale_price: Option<PriceField>,
    pub discount_text: Option<String>,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

/// Which extraction path produced the offers of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStrategy {
    EmbeddedJson,
    HtmlFallback,
    /// No offers page could be fetched, or nothing was recognized on it.
    None,
}

/// Everything one retailer run collected.
#[derive(Debug, Clone, Serialize)]
pub struct RetailerResults {
    pub scraped_at: DateTime<Utc>,
    pub city: String,
    pub stores: Vec<RetailerStore>,
    pub offers: Vec<RetailerOffer>,
    pub offer_strategy: OfferStrategy,
}

impl RetailerResults {
    /// An empty result for `city`, stamped `scraped_at`.
    #[must_use]
    pub fn empty(city: &str, scraped_at: DateTime<Utc>) -> Self {
        Self {
            scraped_at,
            city: city.to_owned(),
            stores: Vec::new(),
            offers: Vec::new(),
            offer_strategy: OfferStrategy::None,
        }
    }
}
