//! Folds both adapters' results into the canonical [`Dataset`].
//!
//! Ingredient identity is the whitespace-normalized product name; the first
//! source to report a name fixes its metadata. Ids are sequential per run.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use cookwise_core::{
    Dataset, Ingredient, Metadata, SaleItem, Stats, Store, SOURCE_AGGREGATOR, SOURCE_RETAILER,
};

use crate::aggregator::{AggregatorProduct, AggregatorResults};
use crate::normalize::{normalize_whitespace, PriceField};
use crate::retailer::{RetailerOffer, RetailerResults, RetailerStore, RETAILER_CHAIN};

/// Accumulates entities across adapters, holding the id counters and the
/// name → ingredient index for one run.
#[derive(Debug, Default)]
pub struct ModelMapper {
    stores: Vec<Store>,
    ingredients: Vec<Ingredient>,
    sale_items: Vec<SaleItem>,
    ingredient_index: HashMap<String, String>,
    ingredient_seq: u32,
    sale_seq: u32,
    retailer_offers: usize,
    aggregator_products: usize,
}

/// Ingredient metadata offered by the first observation of a name.
struct IngredientSeed<'a> {
    category: Option<&'a str>,
    brand: Option<&'a str>,
    weight: Option<&'a str>,
    source: &'static str,
}

impl ModelMapper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the retailer's stores, then one sale item per offer.
    pub fn add_retailer(&mut self, results: &RetailerResults) {
        for store in &results.stores {
            self.stores.push(map_store(store));
        }
        for offer in &results.offers {
            self.add_retailer_offer(offer);
        }
        self.retailer_offers += results.offers.len();
    }

    /// Adds one sale item per chain price of every aggregator product.
    pub fn add_aggregator(&mut self, results: &AggregatorResults) {
        for product in &results.products {
            self.add_aggregator_product(product);
        }
        self.aggregator_products += results.products.len();
    }

    /// Finalizes the dataset and derives its statistics.
    #[must_use]
    pub fn finish(self, generated_at: DateTime<Utc>) -> Dataset {
        let stats = Stats::derive(
            &self.stores,
            &self.ingredients,
            &self.sale_items,
            self.retailer_offers,
            self.aggregator_products,
        );
        Dataset {
            metadata: Metadata::new(generated_at),
            stores: self.stores,
            ingredients: self.ingredients,
            sale_items: self.sale_items,
            stats,
        }
    }

    fn add_retailer_offer(&mut self, offer: &RetailerOffer) {
        let seed = IngredientSeed {
            category: offer.category.as_deref(),
            brand: None,
            weight: None,
            source: SOURCE_RETAILER,
        };
        let Some((ingredient_id, name)) = self.ingredient_for(&offer.product_name, &seed) else {
            return;
        };

        let sale_id = self.next_sale_id();
        self.sale_items.push(SaleItem {
            sale_id,
            store_id: format!("{RETAILER_CHAIN}-{}", offer.store_id),
            ingredient_id,
            ingredient_name: name,
            sale_price: offer.sale_price.as_ref().and_then(PriceField::major_units),
            regular_price: offer.regular_price.as_ref().and_then(PriceField::major_units),
            discount_text: non_empty(offer.discount_text.as_deref()),
            valid_from: non_empty(offer.valid_from.as_deref()),
            valid_to: non_empty(offer.valid_to.as_deref()),
            source: SOURCE_RETAILER.to_owned(),
        });
    }

    fn add_aggregator_product(&mut self, product: &AggregatorProduct) {
        let seed = IngredientSeed {
            category: product.category.as_deref(),
            brand: product.brand.as_deref(),
            weight: product.weight.as_deref(),
            source: SOURCE_AGGREGATOR,
        };
        let Some((ingredient_id, name)) = self.ingredient_for(&product.product_name, &seed) else {
            return;
        };

        for chain_price in &product.stores {
            // Base price is kept as the regular price only under a promo.
            let (sale_price, regular_price) = match chain_price.promo_price {
                Some(promo) => (Some(promo), chain_price.price),
                None => (chain_price.price, None),
            };

            let sale_id = self.next_sale_id();
            self.sale_items.push(SaleItem {
                sale_id,
                store_id: generic_store_id(&chain_price.chain),
                ingredient_id: ingredient_id.clone(),
                ingredient_name: name.clone(),
                sale_price,
                regular_price,
                discount_text: None,
                valid_from: None,
                valid_to: None,
                source: SOURCE_AGGREGATOR.to_owned(),
            });
        }
    }

    /// Returns `(ingredient_id, normalized_name)`, creating the ingredient on
    /// first sight. Blank names yield `None`.
    fn ingredient_for(
        &mut self,
        raw_name: &str,
        seed: &IngredientSeed<'_>,
    ) -> Option<(String, String)> {
        let name = normalize_whitespace(raw_name);
        if name.is_empty() {
            return None;
        }

        if let Some(id) = self.ingredient_index.get(&name) {
            return Some((id.clone(), name));
        }

        self.ingredient_seq += 1;
        let id = format!("ING-{:04}", self.ingredient_seq);
        self.ingredients.push(Ingredient {
            ingredient_id: id.clone(),
            name: name.clone(),
            category: non_empty(seed.category),
            brand: non_empty(seed.brand),
            weight: non_empty(seed.weight),
            source: seed.source.to_owned(),
        });
        self.ingredient_index.insert(name.clone(), id.clone());
        Some((id, name))
    }

    fn next_sale_id(&mut self) -> String {
        self.sale_seq += 1;
        format!("SALE-{:04}", self.sale_seq)
    }
}

/// Maps both adapters' results in the canonical order: retailer first.
#[must_use]
pub fn map_to_dataset(
    retailer: &RetailerResults,
    aggregator: &AggregatorResults,
    generated_at: DateTime<Utc>,
) -> Dataset {
    let mut mapper = ModelMapper::new();
    mapper.add_retailer(retailer);
    mapper.add_aggregator(aggregator);
    mapper.finish(generated_at)
}

/// Store key for a chain with no concrete store: `"<CHAIN>-GENERIC"`.
#[must_use]
pub fn generic_store_id(chain: &str) -> String {
    format!("{}-GENERIC", chain.to_uppercase())
}

fn map_store(store: &RetailerStore) -> Store {
    Store {
        store_id: format!("{RETAILER_CHAIN}-{}", store.store_id),
        name: store.store_name.clone(),
        chain: store.chain.clone(),
        address: non_empty(store.address.as_deref()),
        city: non_empty(Some(&store.city)),
        latitude: None,
        longitude: None,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "mapper_test.rs"]
mod tests;
