use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source tag for records collected from the retailer's own site.
pub const SOURCE_RETAILER: &str = "ica.se";
/// Source tag for records collected from the price-comparison aggregator.
pub const SOURCE_AGGREGATOR: &str = "matspar.se";
/// Dataset format version written into [`Metadata::version`].
pub const DATASET_VERSION: &str = "PoC-0.1";

/// A physical store observed by a source adapter.
///
/// Coordinates are never populated by the scrapers; geocoding is a separate concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    /// Chain-prefixed identifier, e.g. `"ICA-1004028"`.
    pub store_id: String,
    pub name: String,
    pub chain: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// A product identity, deduplicated by exact (whitespace-normalized) name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Sequential identifier, e.g. `"ING-0001"`.
    pub ingredient_id: String,
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    /// Human-readable pack size as the source quotes it, e.g. `"1 l"`.
    pub weight: Option<String>,
    /// Source tag of the first adapter that observed this name.
    pub source: String,
}

/// One price observation for an ingredient at a store (or a whole chain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Sequential identifier, e.g. `"SALE-0001"`.
    pub sale_id: String,
    /// Either a concrete [`Store::store_id`] or a `"<CHAIN>-GENERIC"` key.
    pub store_id: String,
    pub ingredient_id: String,
    pub ingredient_name: String,
    /// Price in major currency units (kronor).
    pub sale_price: Option<f64>,
    pub regular_price: Option<f64>,
    pub discount_text: Option<String>,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: DateTime<Utc>,
    pub version: String,
    pub sources: Vec<String>,
}

impl Metadata {
    #[must_use]
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            version: DATASET_VERSION.to_string(),
            sources: vec![SOURCE_RETAILER.to_string(), SOURCE_AGGREGATOR.to_string()],
        }
    }
}

/// Read-only summary derived from the entity collections of a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_stores: usize,
    pub total_ingredients: usize,
    pub total_sale_items: usize,
    /// Number of offers the retailer adapter contributed.
    pub retailer_offers: usize,
    /// Number of distinct products the aggregator adapter contributed.
    pub aggregator_products: usize,
    pub sale_items_by_source: BTreeMap<String, usize>,
    pub sources_used: Vec<String>,
}

impl Stats {
    /// Derive run statistics from finished entity collections.
    #[must_use]
    pub fn derive(
        stores: &[Store],
        ingredients: &[Ingredient],
        sale_items: &[SaleItem],
        retailer_offers: usize,
        aggregator_products: usize,
    ) -> Self {
        let mut sale_items_by_source = BTreeMap::new();
        for item in sale_items {
            *sale_items_by_source.entry(item.source.clone()).or_insert(0) += 1;
        }

        Self {
            total_stores: stores.len(),
            total_ingredients: ingredients.len(),
            total_sale_items: sale_items.len(),
            retailer_offers,
            aggregator_products,
            sale_items_by_source,
            sources_used: vec![SOURCE_RETAILER.to_string(), SOURCE_AGGREGATOR.to_string()],
        }
    }
}

/// The complete output of one pipeline run, serialized as the JSON snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub metadata: Metadata,
    pub stores: Vec<Store>,
    pub ingredients: Vec<Ingredient>,
    pub sale_items: Vec<SaleItem>,
    pub stats: Stats,
}

impl Dataset {
    /// Returns `true` when no adapter contributed anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty() && self.ingredients.is_empty() && self.sale_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_sale(id: u32, source: &str) -> SaleItem {
        SaleItem {
            sale_id: format!("SALE-{id:04}"),
            store_id: "ICA-GENERIC".to_string(),
            ingredient_id: "ING-0001".to_string(),
            ingredient_name: "Mjölk 1L".to_string(),
            sale_price: Some(19.9),
            regular_price: None,
            discount_text: None,
            valid_from: None,
            valid_to: None,
            source: source.to_string(),
        }
    }

    fn make_ingredient() -> Ingredient {
        Ingredient {
            ingredient_id: "ING-0001".to_string(),
            name: "Mjölk 1L".to_string(),
            category: None,
            brand: Some("Arla".to_string()),
            weight: Some("1 l".to_string()),
            source: SOURCE_AGGREGATOR.to_string(),
        }
    }

    #[test]
    fn stats_counts_sale_items_per_source() {
        let sales = vec![
            make_sale(1, SOURCE_RETAILER),
            make_sale(2, SOURCE_AGGREGATOR),
            make_sale(3, SOURCE_AGGREGATOR),
        ];
        let stats = Stats::derive(&[], &[make_ingredient()], &sales, 1, 1);
        assert_eq!(stats.total_sale_items, 3);
        assert_eq!(stats.total_ingredients, 1);
        assert_eq!(stats.sale_items_by_source.get(SOURCE_RETAILER), Some(&1));
        assert_eq!(stats.sale_items_by_source.get(SOURCE_AGGREGATOR), Some(&2));
    }

    #[test]
    fn metadata_lists_both_sources() {
        let meta = Metadata::new(Utc::now());
        assert_eq!(meta.version, "PoC-0.1");
        assert_eq!(meta.sources, vec!["ica.se", "matspar.se"]);
    }

    #[test]
    fn store_serializes_missing_coordinates_as_null() {
        let store = Store {
            store_id: "ICA-1004028".to_string(),
            name: "Maxi Ica Stormarknad Karlskrona".to_string(),
            chain: "ICA".to_string(),
            address: None,
            city: Some("Karlskrona".to_string()),
            latitude: None,
            longitude: None,
        };
        let value = serde_json::to_value(&store).unwrap();
        assert!(value["latitude"].is_null());
        assert!(value["address"].is_null());
        assert_eq!(value["city"], "Karlskrona");
    }

    #[test]
    fn dataset_top_level_keys() {
        let sales = vec![make_sale(1, SOURCE_AGGREGATOR)];
        let ingredients = vec![make_ingredient()];
        let stats = Stats::derive(&[], &ingredients, &sales, 0, 1);
        let dataset = Dataset {
            metadata: Metadata::new(Utc::now()),
            stores: vec![],
            ingredients,
            sale_items: sales,
            stats,
        };
        let value = serde_json::to_value(&dataset).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        for key in ["metadata", "stores", "ingredients", "sale_items", "stats"] {
            assert!(keys.contains(&key), "missing top-level key {key}");
        }
        assert_eq!(value["stats"]["total_sale_items"], 1);
        assert!(!dataset.is_empty());
    }
}
