//! Best-effort offer extraction from rendered HTML.
//!
//! Used only when a page carries no usable embedded JSON. Missed offers are
//! acceptable here; a wrong price is not, so a candidate is emitted only when
//! a concrete sale price was recognized in its text.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::normalize::{format_price_text, parse_decimal_price, parse_multi_offer};

static CANDIDATE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, article, li, a").expect("valid selector"));

static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)offer|product|campaign|deal").expect("valid regex"));

static TEST_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)offer|product").expect("valid regex"));

static SINGLE_PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+[,:]\d{2})\s*(?:kr)?").expect("valid regex"));

const TEXT_SEPARATOR: &str = " | ";
const MIN_NAME_LEN: usize = 3;
const MAX_NAME_LEN: usize = 100;

/// An offer recovered from page markup. Prices are display text such as
/// `"20 kr"`; the mapper resolves them to amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlOffer {
    pub product_name: String,
    pub sale_price: String,
    pub discount_text: Option<String>,
}

/// A swappable strategy for pulling offers out of a page that had no
/// embedded JSON.
pub trait FallbackExtractor: Send + Sync {
    /// Short label for logs.
    fn name(&self) -> &'static str;

    fn extract(&self, html: &str) -> Vec<HtmlOffer>;
}

/// Class- and test-id-driven card scan with price regexes.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlOfferExtractor;

impl FallbackExtractor for HtmlOfferExtractor {
    fn name(&self) -> &'static str {
        "html"
    }

    fn extract(&self, html: &str) -> Vec<HtmlOffer> {
        let document = Html::parse_document(html);
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut offers = Vec::new();

        // Class matches first, then test ids, each in document order.
        let class_cards = document
            .select(&CANDIDATE_SELECTOR)
            .filter(|el| attr_matches(el, "class", &CLASS_RE));
        let test_id_cards = document
            .select(&CANDIDATE_SELECTOR)
            .filter(|el| attr_matches(el, "data-testid", &TEST_ID_RE));

        for card in class_cards.chain(test_id_cards) {
            let text = card_text(&card);
            let name = text.split('|').next().unwrap_or_default().trim().to_owned();

            let name_len = name.chars().count();
            if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&name_len) || seen_names.contains(&name) {
                continue;
            }
            seen_names.insert(name.clone());

            if let Some(offer) = price_offer(name, &text) {
                offers.push(offer);
            }
        }

        offers
    }
}

/// Turns the HTML fallback off; the adapter then reports zero offers when
/// the page has no embedded JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledFallback;

impl FallbackExtractor for DisabledFallback {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn extract(&self, _html: &str) -> Vec<HtmlOffer> {
        Vec::new()
    }
}

fn attr_matches(el: &ElementRef<'_>, attr: &str, re: &Regex) -> bool {
    el.value().attr(attr).is_some_and(|v| re.is_match(v))
}

/// Visible text nodes, trimmed, empties dropped, joined with `" | "`.
fn card_text(el: &ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(TEXT_SEPARATOR)
}

/// A multi-buy promotion wins over a plain price.
fn price_offer(product_name: String, text: &str) -> Option<HtmlOffer> {
    if let Some(multi) = parse_multi_offer(text) {
        let price = format_price_text(multi.unit_price);
        return Some(HtmlOffer {
            product_name,
            sale_price: format!("{price} kr"),
            discount_text: Some(format!("{} för {price} kr", multi.quantity)),
        });
    }

    let single = SINGLE_PRICE_RE.captures(text)?.get(1)?.as_str();
    let price = parse_decimal_price(single)?;
    Some(HtmlOffer {
        product_name,
        sale_price: format!("{} kr", format_price_text(price)),
        discount_text: None,
    })
}
