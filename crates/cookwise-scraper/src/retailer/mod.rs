//! Retailer-site adapter: store listing plus weekly offers for one store.
//!
//! Offers come from the page's embedded state tree when one is present and
//! yields anything; otherwise the configured [`FallbackExtractor`] scans the
//! markup.

mod embedded;
mod stores;
pub mod types;

use chrono::{DateTime, Utc};
use cookwise_core::FallbackStore;

pub use embedded::{extract_embedded_json, offers_from_json, EmbedConvention};
pub use stores::{parse_store_href, parse_store_listing, StoreLink};
pub use types::{OfferStrategy, RetailerOffer, RetailerResults, RetailerStore, RETAILER_CHAIN};

use crate::client::{join_url, HttpFetcher};
use crate::error::ScraperError;
use crate::html_fallback::{FallbackExtractor, HtmlOffer, HtmlOfferExtractor};
use crate::normalize::PriceField;

/// Offers recovered from one offers page and how they were found.
#[derive(Debug, Clone)]
pub struct OfferPage {
    pub offers: Vec<RetailerOffer>,
    pub strategy: OfferStrategy,
}

pub struct RetailerAdapter {
    fetcher: HttpFetcher,
    base_url: String,
    city: String,
    fallback_store: FallbackStore,
    extractor: Box<dyn FallbackExtractor>,
}

impl RetailerAdapter {
    /// Creates an adapter using [`HtmlOfferExtractor`] as the HTML fallback.
    #[must_use]
    pub fn new(
        fetcher: HttpFetcher,
        base_url: &str,
        city: &str,
        fallback_store: FallbackStore,
    ) -> Self {
        Self {
            fetcher,
            base_url: base_url.trim_end_matches('/').to_owned(),
            city: city.to_owned(),
            fallback_store,
            extractor: Box::new(HtmlOfferExtractor),
        }
    }

    /// Replaces the HTML fallback strategy.
    #[must_use]
    pub fn with_fallback_extractor(mut self, extractor: Box<dyn FallbackExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Fetches the locality listing page and extracts its stores.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the listing page cannot be fetched.
    pub async fn scrape_stores(&self) -> Result<Vec<RetailerStore>, ScraperError> {
        let url = join_url(&self.base_url, &format!("/butiker/{}/", self.city))?;
        let html = self.fetcher.get_html(&url).await?;
        let stores = parse_store_listing(&html, &self.base_url, &self.city);
        tracing::info!(city = %self.city, count = stores.len(), "retailer stores parsed");
        Ok(stores)
    }

    /// Fetches one store's offers page and extracts its offers.
    ///
    /// An empty [`OfferPage`] is a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError`] if the offers page cannot be fetched.
    pub async fn scrape_offers(
        &self,
        slug: &str,
        store_id: &str,
        scraped_at: DateTime<Utc>,
    ) -> Result<OfferPage, ScraperError> {
        let url = join_url(&self.base_url, &format!("/erbjudanden/{slug}-{store_id}/"))?;
        let html = self.fetcher.get_html(&url).await?;

        let embedded = match extract_embedded_json(&html) {
            Ok(Some((convention, data))) => {
                tracing::debug!(
                    url = %url,
                    convention = convention.as_str(),
                    "embedded offer data found"
                );
                offers_from_json(&data, store_id, scraped_at)
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    "embedded offer data could not be decoded"
                );
                Vec::new()
            }
        };

        if !embedded.is_empty() {
            tracing::info!(store_id, count = embedded.len(), "offers mined from embedded JSON");
            return Ok(OfferPage {
                offers: embedded,
                strategy: OfferStrategy::EmbeddedJson,
            });
        }

        let offers: Vec<RetailerOffer> = self
            .extractor
            .extract(&html)
            .into_iter()
            .map(|o| html_offer_to_retailer(o, store_id, scraped_at))
            .collect();
        tracing::info!(
            store_id,
            extractor = self.extractor.name(),
            count = offers.len(),
            "offers extracted from HTML"
        );

        let strategy = if offers.is_empty() {
            OfferStrategy::None
        } else {
            OfferStrategy::HtmlFallback
        };
        Ok(OfferPage { offers, strategy })
    }

    /// Runs store discovery and offer collection end to end.
    ///
    /// Never fails: every fetch or decode failure is logged and leaves the
    /// corresponding part of the result empty. A listing that loads but names
    /// no stores yields no offers.
    pub async fn run(&self) -> RetailerResults {
        let scraped_at = Utc::now();
        let mut results = RetailerResults::empty(&self.city, scraped_at);

        let target = match self.scrape_stores().await {
            Ok(stores) => {
                results.stores = stores;
                self.select_offer_store(&results.stores)
            }
            Err(e) => {
                tracing::warn!(city = %self.city, error = %e, "retailer store listing failed");
                tracing::info!(
                    store_id = %self.fallback_store.store_id,
                    store = %self.fallback_store.name,
                    "using fallback store"
                );
                Some((
                    self.fallback_store.slug.clone(),
                    self.fallback_store.store_id.clone(),
                ))
            }
        };

        let Some((slug, store_id)) = target else {
            tracing::info!(city = %self.city, "no stores listed, skipping offers");
            return results;
        };

        let page = match self.scrape_offers(&slug, &store_id, scraped_at).await {
            Ok(page) => Some(page),
            Err(e @ ScraperError::UnexpectedStatus { .. })
                if store_id != self.fallback_store.store_id =>
            {
                tracing::warn!(
                    store_id = %store_id,
                    error = %e,
                    "offers page failed, trying fallback store"
                );
                self.fallback_offers(scraped_at).await
            }
            Err(e) => {
                tracing::warn!(store_id = %store_id, error = %e, "retailer offers failed");
                None
            }
        };

        if let Some(page) = page {
            results.offers = page.offers;
            results.offer_strategy = page.strategy;
        }

        results
    }

    async fn fallback_offers(&self, scraped_at: DateTime<Utc>) -> Option<OfferPage> {
        let fallback = &self.fallback_store;
        match self
            .scrape_offers(&fallback.slug, &fallback.store_id, scraped_at)
            .await
        {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::warn!(
                    store_id = %fallback.store_id,
                    store = %fallback.name,
                    error = %e,
                    "fallback store offers failed"
                );
                None
            }
        }
    }

    /// Prefers a store whose name mentions "maxi", else the first store.
    /// Returns `(slug, store_id)`, or `None` for an empty listing.
    fn select_offer_store(&self, stores: &[RetailerStore]) -> Option<(String, String)> {
        let store = stores
            .iter()
            .find(|s| s.store_name.to_lowercase().contains("maxi"))
            .or_else(|| stores.first())?;

        let slug = if store.slug.is_empty() {
            self.fallback_store.slug.clone()
        } else {
            store.slug.clone()
        };
        Some((slug, store.store_id.clone()))
    }
}

fn html_offer_to_retailer(
    offer: HtmlOffer,
    store_id: &str,
    scraped_at: DateTime<Utc>,
) -> RetailerOffer {
    RetailerOffer {
        product_name: offer.product_name,
        store_id: store_id.to_owned(),
        chain: RETAILER_CHAIN.to_owned(),
        regular_price: None,
        sale_price: Some(PriceField::Text(offer.sale_price)),
        discount_text: offer.discount_text,
        valid_from: None,
        valid_to: None,
        image_url: None,
        category: None,
        scraped_at,
    }
}
