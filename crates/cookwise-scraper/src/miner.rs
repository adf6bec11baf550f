//! Heuristic search for offer-shaped objects inside arbitrary JSON.
//!
//! Sites embed their state trees in wildly different shapes, so instead of a
//! typed schema the miner walks every object and picks out the ones carrying
//! both a price-like key and a name-like key.

use serde::Serialize;
use serde_json::Value;

/// Nodes nested deeper than this (root = 0) are never inspected.
pub const MAX_DEPTH: usize = 10;

/// Key sets used to detect offer objects and to resolve their fields.
///
/// Detection only checks key presence; resolution walks each list in order
/// and takes the first value that is not absent, `null`, or `""`.
#[derive(Debug, Clone)]
pub struct OfferAliases {
    pub detect_price: &'static [&'static str],
    pub detect_name: &'static [&'static str],
    pub name: &'static [&'static str],
    pub sale_price: &'static [&'static str],
    pub regular_price: &'static [&'static str],
    pub discount: &'static [&'static str],
    pub valid_from: &'static [&'static str],
    pub valid_to: &'static [&'static str],
    pub image: &'static [&'static str],
    pub category: &'static [&'static str],
}

impl Default for OfferAliases {
    fn default() -> Self {
        Self {
            detect_price: &[
                "price",
                "salePrice",
                "currentPrice",
                "priceValue",
                "savePrice",
                "offerPrice",
            ],
            detect_name: &["name", "productName", "title", "heading"],
            name: &["name", "productName", "title", "heading"],
            sale_price: &["price", "salePrice", "currentPrice"],
            regular_price: &["regularPrice", "originalPrice"],
            discount: &["savePrice", "promotionText", "offerCondition"],
            valid_from: &["validFrom", "startDate"],
            valid_to: &["validTo", "endDate"],
            image: &["image", "imageUrl", "imageURL"],
            category: &["category", "categoryName"],
        }
    }
}

/// One offer-shaped object, with every field left as the raw JSON value.
///
/// Unit interpretation (minor vs. major currency units, text prices) belongs
/// to the adapter that knows the source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinedOffer {
    pub name: String,
    pub sale_price: Option<Value>,
    pub regular_price: Option<Value>,
    pub discount: Option<Value>,
    pub valid_from: Option<Value>,
    pub valid_to: Option<Value>,
    pub image: Option<Value>,
    pub category: Option<Value>,
}

/// Lazily yields offers found anywhere in `root`, in document pre-order.
#[must_use]
pub fn mine_offers<'a>(root: &'a Value, aliases: &'a OfferAliases) -> OfferMiner<'a> {
    OfferMiner {
        stack: vec![(root, 0)],
        aliases,
    }
}

/// Iterator returned by [`mine_offers`].
///
/// Uses an explicit stack, so pathological nesting costs heap rather than
/// call-stack depth.
#[derive(Debug)]
pub struct OfferMiner<'a> {
    stack: Vec<(&'a Value, usize)>,
    aliases: &'a OfferAliases,
}

impl Iterator for OfferMiner<'_> {
    type Item = MinedOffer;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, depth)) = self.stack.pop() {
            if depth > MAX_DEPTH {
                continue;
            }

            match node {
                Value::Object(map) => {
                    // Reverse push keeps siblings in document order.
                    for child in map.values().rev() {
                        self.stack.push((child, depth + 1));
                    }
                    let is_offer = self.aliases.detect_price.iter().any(|k| map.contains_key(*k))
                        && self.aliases.detect_name.iter().any(|k| map.contains_key(*k));
                    if is_offer {
                        if let Some(offer) = build_offer(node, self.aliases) {
                            return Some(offer);
                        }
                    }
                }
                Value::Array(items) => {
                    for child in items.iter().rev() {
                        self.stack.push((child, depth + 1));
                    }
                }
                _ => {}
            }
        }
        None
    }
}

fn build_offer(node: &Value, aliases: &OfferAliases) -> Option<MinedOffer> {
    let name = first_present(node, aliases.name)
        .map(coerce_text)
        .unwrap_or_default();
    if name.is_empty() {
        return None;
    }

    let field = |keys: &[&str]| first_present(node, keys).cloned();

    Some(MinedOffer {
        name,
        sale_price: field(aliases.sale_price),
        regular_price: field(aliases.regular_price),
        discount: field(aliases.discount),
        valid_from: field(aliases.valid_from),
        valid_to: field(aliases.valid_to),
        image: field(aliases.image),
        category: field(aliases.category),
    })
}

/// First value under `keys` that is not absent, `null`, or the empty string.
fn first_present<'a>(node: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().filter_map(|k| node.get(*k)).find(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

/// Renders any JSON value as trimmed display text.
pub(crate) fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_owned(),
        Value::Null => String::new(),
        other => other.to_string().trim().to_owned(),
    }
}
