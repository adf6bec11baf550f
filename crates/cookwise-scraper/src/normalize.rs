//! Price and text normalization shared by the adapters and the model mapper.
//!
//! Nothing here fails: an unrecognizable input yields `None`, which callers
//! treat as "unknown" rather than as zero.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static DECIMAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:[.,:](\d+))?").expect("valid regex"));

static MULTI_OFFER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)\s*(?:för|st)\s*(\d+(?:[,:.]\d+)?)\s*kr").expect("valid regex")
});

/// A quantity-for-price promotion such as `"2 för 20 kr"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiOffer {
    pub quantity: u32,
    /// Price quoted for the promotion as a whole, in major units
    /// (`20.0` for `"2 för 20 kr"`).
    pub unit_price: f64,
}

/// Parses the first number in `text`, accepting `,`, `.` or `:` as the
/// decimal separator and ignoring any currency suffix.
///
/// `"29,90 kr"` → `29.9`; `"Pris: 15:-"` → `15.0`; `"gratis"` → `None`.
#[must_use]
pub fn parse_decimal_price(text: &str) -> Option<f64> {
    let caps = DECIMAL_RE.captures(text)?;
    let whole = caps.get(1)?.as_str();
    let number = match caps.get(2) {
        Some(frac) => format!("{whole}.{}", frac.as_str()),
        None => whole.to_owned(),
    };
    number.parse::<f64>().ok()
}

/// Recognizes `"<qty> för <price> kr"` and `"<qty> st <price> kr"`,
/// case-insensitively.
#[must_use]
pub fn parse_multi_offer(text: &str) -> Option<MultiOffer> {
    let caps = MULTI_OFFER_RE.captures(text)?;
    let quantity = caps.get(1)?.as_str().parse::<u32>().ok()?;
    let unit_price = parse_decimal_price(caps.get(2)?.as_str())?;
    Some(MultiOffer {
        quantity,
        unit_price,
    })
}

/// Converts a hyphen-delimited URL slug into a title-cased label.
///
/// `"maxi-ica-stormarknad-karlskrona"` → `"Maxi Ica Stormarknad Karlskrona"`.
/// Numeric store-id suffixes must already be stripped by the caller.
#[must_use]
pub fn slug_to_label(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercases the first character and lowercases the rest.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Converts an amount in minor units (öre) to major units (kronor).
///
/// Missing and zero amounts are both reported as `None`: the aggregator uses
/// `0` for "no price".
#[must_use]
pub fn minor_to_major(value: Option<f64>) -> Option<f64> {
    match value {
        Some(v) if v != 0.0 => Some(v / 100.0),
        _ => None,
    }
}

/// Renders a major-unit amount with two decimals, dropping a `.00` tail.
///
/// `20.0` → `"20"`, `29.9` → `"29.90"`.
#[must_use]
pub fn format_price_text(value: f64) -> String {
    let fixed = format!("{value:.2}");
    match fixed.strip_suffix(".00") {
        Some(whole) => whole.to_owned(),
        None => fixed,
    }
}

/// Trims `text` and collapses internal whitespace runs to a single space.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A price as a source reported it, before unit resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceField {
    /// Already in major units.
    Amount(f64),
    /// Human-readable text such as `"29.90 kr"`.
    Text(String),
}

impl PriceField {
    /// Interprets a JSON price value at an adapter boundary.
    ///
    /// Integers are minor units, floats are major units, strings are kept as
    /// text. `null`, empty strings, zero, and non-scalar values yield `None`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => {
                if let Some(minor) = n.as_i64() {
                    minor_to_major(Some(minor as f64)).map(Self::Amount)
                } else {
                    n.as_f64().filter(|v| *v != 0.0).map(Self::Amount)
                }
            }
            serde_json::Value::String(s) if !s.trim().is_empty() => {
                Some(Self::Text(s.trim().to_owned()))
            }
            _ => None,
        }
    }

    /// Resolves the price to major units, parsing text when necessary.
    #[must_use]
    pub fn major_units(&self) -> Option<f64> {
        match self {
            Self::Amount(v) => Some(*v),
            Self::Text(s) => parse_decimal_price(s),
        }
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
