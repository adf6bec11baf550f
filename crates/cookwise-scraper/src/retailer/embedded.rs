//! Embedded state-tree extraction from the offers page.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;

use super::types::{RetailerOffer, RETAILER_CHAIN};
use crate::error::ScraperError;
use crate::miner::{coerce_text, mine_offers, OfferAliases};
use crate::normalize::PriceField;

static INITIAL_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)window\.__INITIAL_DATA__\s*=\s*(\{.*?\});?\s*</script>").expect("valid regex")
});

static NEXT_DATA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<script id="__NEXT_DATA__"[^>]*>(.*?)</script>"#).expect("valid regex")
});

/// Known ways the offers page embeds its state tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedConvention {
    /// `window.__INITIAL_DATA__ = {...}` inside a script.
    InitialData,
    /// `<script id="__NEXT_DATA__">{...}</script>`.
    NextData,
}

impl EmbedConvention {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InitialData => "__INITIAL_DATA__",
            Self::NextData => "__NEXT_DATA__",
        }
    }
}

/// Locates and decodes the page's embedded JSON.
///
/// Conventions are tried in order and the first one whose marker is present
/// decides the outcome; a later convention is not consulted when an earlier
/// one matched but failed to decode.
///
/// Returns `Ok(None)` when no marker is present.
///
/// # Errors
///
/// Returns [`ScraperError::Deserialize`] when the matched body is not JSON.
pub fn extract_embedded_json(html: &str) -> Result<Option<(EmbedConvention, Value)>, ScraperError> {
    let matched = INITIAL_DATA_RE
        .captures(html)
        .map(|c| (EmbedConvention::InitialData, c))
        .or_else(|| {
            NEXT_DATA_RE
                .captures(html)
                .map(|c| (EmbedConvention::NextData, c))
        });

    let Some((convention, caps)) = matched else {
        return Ok(None);
    };
    let body = caps.get(1).map_or("", |m| m.as_str());

    let value: Value = serde_json::from_str(body).map_err(|e| ScraperError::Deserialize {
        context: format!("embedded {}", convention.as_str()),
        source: e,
    })?;

    Ok(Some((convention, value)))
}

/// Mines offers from an embedded state tree and binds them to `store_id`.
///
/// JSON integer prices are minor units; floats and strings are taken as-is.
#[must_use]
pub fn offers_from_json(
    data: &Value,
    store_id: &str,
    scraped_at: DateTime<Utc>,
) -> Vec<RetailerOffer> {
    let aliases = OfferAliases::default();
    mine_offers(data, &aliases)
        .map(|mined| RetailerOffer {
            product_name: mined.name,
            store_id: store_id.to_owned(),
            chain: RETAILER_CHAIN.to_owned(),
            regular_price: mined.regular_price.as_ref().and_then(PriceField::from_json),
            sale_price: mined.sale_price.as_ref().and_then(PriceField::from_json),
            discount_text: text_field(mined.discount.as_ref()),
            valid_from: text_field(mined.valid_from.as_ref()),
            valid_to: text_field(mined.valid_to.as_ref()),
            image_url: text_field(mined.image.as_ref()),
            category: text_field(mined.category.as_ref()),
            scraped_at,
        })
        .collect()
}

fn text_field(value: Option<&Value>) -> Option<String> {
    value.map(coerce_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn initial_data_script_is_decoded() {
        let html = r#"<html><script>window.__INITIAL_DATA__ = {"offers":[{"name":"Milk 1L","price":1990}]};</script></html>"#;
        let (convention, value) = extract_embedded_json(html).unwrap().unwrap();
        assert_eq!(convention, EmbedConvention::InitialData);
        assert_eq!(value["offers"][0]["name"], "Milk 1L");
    }

    #[test]
    fn next_data_script_is_decoded() {
        let html = r#"<script id="__NEXT_DATA__" type="application/json">{"props":{"pageProps":{}}}</script>"#;
        let (convention, value) = extract_embedded_json(html).unwrap().unwrap();
        assert_eq!(convention, EmbedConvention::NextData);
        assert!(value["props"]["pageProps"].is_object());
    }

    #[test]
    fn first_convention_wins_even_when_broken() {
        let html = r#"
            <script>window.__INITIAL_DATA__ = {broken};</script>
            <script id="__NEXT_DATA__">{"ok":true}</script>"#;
        let err = extract_embedded_json(html).unwrap_err();
        assert!(err.is_parse(), "expected parse error, got: {err:?}");
    }

    #[test]
    fn page_without_markers_is_none() {
        let html = "<html><body><div class=\"offer\">Bananas</div></body></html>";
        assert!(extract_embedded_json(html).unwrap().is_none());
    }

    #[test]
    fn mined_offers_convert_minor_units() {
        let data = json!({"name": "Milk 1L", "price": 1990});
        let offers = offers_from_json(&data, "1004028", Utc::now());
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].store_id, "1004028");
        assert_eq!(offers[0].chain, "ICA");
        let sale = offers[0].sale_price.as_ref().unwrap();
        assert_eq!(sale.major_units(), Some(19.9));
        assert!(offers[0].regular_price.is_none());
    }

    #[test]
    fn mined_offers_keep_text_fields() {
        let data = json!({"offers": [{
            "productName": "Kycklingfilé",
            "salePrice": "89,90 kr",
            "originalPrice": 119.0,
            "promotionText": "Max 2 köp",
            "startDate": "2026-10-12",
            "endDate": "2026-10-18",
            "imageUrl": "https://cdn.example/kyckling.jpg",
            "categoryName": "Kött"
        }]});
        let offers = offers_from_json(&data, "1004028", Utc::now());
        let offer = &offers[0];
        assert_eq!(offer.sale_price, Some(PriceField::Text("89,90 kr".to_string())));
        assert_eq!(offer.regular_price, Some(PriceField::Amount(119.0)));
        assert_eq!(offer.discount_text.as_deref(), Some("Max 2 köp"));
        assert_eq!(offer.valid_from.as_deref(), Some("2026-10-12"));
        assert_eq!(offer.valid_to.as_deref(), Some("2026-10-18"));
        assert_eq!(offer.image_url.as_deref(), Some("https://cdn.example/kyckling.jpg"));
        assert_eq!(offer.category.as_deref(), Some("Kött"));
    }
}
