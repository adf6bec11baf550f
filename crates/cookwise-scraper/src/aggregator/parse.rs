//! Decoding of aggregator payloads into [`AggregatorProduct`] records.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use cookwise_core::SOURCE_AGGREGATOR;
use serde_json::Value;

use super::types::{AggregatorProduct, ChainPrice, SupplierInfo};
use crate::miner::coerce_text;
use crate::normalize::{minor_to_major, slug_to_label};

const CATEGORY_PREFIX: &str = "kategori/";

/// Maps aggregator supplier ids to chain names.
#[derive(Debug, Clone, Copy)]
pub struct SupplierTable<'a> {
    chains: &'a BTreeMap<String, String>,
}

impl<'a> SupplierTable<'a> {
    #[must_use]
    pub fn new(chains: &'a BTreeMap<String, String>) -> Self {
        Self { chains }
    }

    /// Chain name for `supplier_id`; unknown ids become `"Store-<id>"`.
    #[must_use]
    pub fn chain_name(&self, supplier_id: &str) -> String {
        self.chains
            .get(supplier_id)
            .cloned()
            .unwrap_or_else(|| format!("Store-{supplier_id}"))
    }
}

/// Display name for a category slug: `"kategori/frukt-gront"` → `"Frukt Gront"`.
#[must_use]
pub fn category_label(slug: &str) -> String {
    slug_to_label(slug.trim_start_matches('/').trim_start_matches(CATEGORY_PREFIX))
}

/// Decodes one raw product. Products without a usable name yield `None`.
#[must_use]
pub fn parse_product(
    raw: &Value,
    category: Option<&str>,
    suppliers: SupplierTable<'_>,
    scraped_at: DateTime<Utc>,
) -> Option<AggregatorProduct> {
    let product_name = raw.get("name").map(coerce_text).unwrap_or_default();
    if product_name.is_empty() {
        return None;
    }

    Some(AggregatorProduct {
        product_name,
        brand: text_field(raw, "brand"),
        weight: text_field(raw, "weight_pretty"),
        product_id: text_field(raw, "productid"),
        slug: text_field(raw, "slug"),
        base_price: minor_to_major(raw.get("price").and_then(Value::as_f64)),
        median_price: minor_to_major(raw.get("median_price").and_then(Value::as_f64)),
        stores: chain_prices(raw, suppliers),
        category: category.map(str::to_owned),
        source: SOURCE_AGGREGATOR.to_owned(),
        scraped_at,
    })
}

/// Builds the per-chain price list from the `prices` and `promo` maps.
///
/// Only chains present in `prices` are listed; a promo for a chain without
/// a base price is dropped. When two supplier ids map to the same chain the
/// later one's values replace the earlier ones in place.
fn chain_prices(raw: &Value, suppliers: SupplierTable<'_>) -> Vec<ChainPrice> {
    let mut entries: Vec<ChainPrice> = Vec::new();

    if let Some(prices) = raw.get("prices").and_then(Value::as_object) {
        for (supplier_id, minor) in prices {
            let entry = ChainPrice {
                chain: suppliers.chain_name(supplier_id),
                price: minor_to_major(minor.as_f64()),
                promo_price: None,
                promo_type: None,
            };
            match entries.iter_mut().find(|e| e.chain == entry.chain) {
                Some(existing) => *existing = entry,
                None => entries.push(entry),
            }
        }
    }

    if let Some(promos) = raw.get("promo").and_then(Value::as_object) {
        for (supplier_id, promo) in promos {
            if !promo.is_object() {
                continue;
            }
            let chain = suppliers.chain_name(supplier_id);
            if let Some(entry) = entries.iter_mut().find(|e| e.chain == chain) {
                entry.promo_price = minor_to_major(promo.get("price").and_then(Value::as_f64));
                entry.promo_type = text_field(promo, "type");
            }
        }
    }

    entries
}

/// Raw product objects in a `payload`, in payload order.
///
/// Accepts a bare list, or an object holding `categories.<id>.products`
/// groups followed by a top-level `products` list.
#[must_use]
pub fn raw_products(payload: &Value) -> Vec<&Value> {
    let mut found = Vec::new();
    match payload {
        Value::Array(items) => found.extend(items.iter().filter(|v| v.is_object())),
        Value::Object(map) => {
            if let Some(groups) = map.get("categories").and_then(Value::as_object) {
                for group in groups.values() {
                    if let Some(products) = group.get("products").and_then(Value::as_array) {
                        found.extend(products.iter().filter(|v| v.is_object()));
                    }
                }
            }
            if let Some(products) = map.get("products").and_then(Value::as_array) {
                found.extend(products.iter().filter(|v| v.is_object()));
            }
        }
        _ => {}
    }
    found
}

/// Drops products whose id was already seen; products without an id pass.
pub fn dedup_by_product_id(
    products: Vec<AggregatorProduct>,
    seen: &mut HashSet<String>,
) -> Vec<AggregatorProduct> {
    products
        .into_iter()
        .filter(|p| match &p.product_id {
            Some(pid) => seen.insert(pid.clone()),
            None => true,
        })
        .collect()
}

/// Keeps grocery stores from the supplier directory response.
#[must_use]
pub fn parse_suppliers(directory: &Value) -> BTreeMap<String, SupplierInfo> {
    let Some(entries) = directory.as_object() else {
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter(|(_, info)| {
            let is_store = info.get("type").and_then(Value::as_str) == Some("store");
            let is_grocery = info
                .get("categories")
                .and_then(Value::as_array)
                .is_some_and(|cats| cats.iter().any(|c| c.as_str() == Some("grocery")));
            is_store && is_grocery
        })
        .map(|(id, info)| {
            let name = text_field(info, "longname")
                .or_else(|| text_field(info, "name"))
                .unwrap_or_default();
            let active = info.get("active").and_then(Value::as_bool).unwrap_or(false);
            (
                id.clone(),
                SupplierInfo {
                    supplier_id: id.clone(),
                    name,
                    active,
                },
            )
        })
        .collect()
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).map(coerce_text).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
