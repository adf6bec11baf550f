//! Store discovery on the retailer's locality listing page.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::types::{RetailerStore, RETAILER_CHAIN};
use crate::client::join_url;
use crate::normalize::{capitalize, slug_to_label};

static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

static STORE_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/butiker/.+-\d+/$").expect("valid regex"));

static STORE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)/$").expect("valid regex"));

static SLUG_ID_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+$").expect("valid regex"));

static STREET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)vägen|gatan|torget|väg").expect("valid regex"));

/// Parts of a store page link: `/butiker/<...>/<slug>-<id>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLink {
    pub store_id: String,
    pub slug: String,
}

/// Splits a store page href into id and slug.
///
/// Returns `None` for hrefs that are not store detail pages.
#[must_use]
pub fn parse_store_href(href: &str) -> Option<StoreLink> {
    if !STORE_HREF_RE.is_match(href) {
        return None;
    }
    let store_id = STORE_ID_RE.captures(href)?.get(1)?.as_str().to_owned();
    let last_segment = href.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let slug = SLUG_ID_SUFFIX_RE.replace(last_segment, "").into_owned();
    Some(StoreLink { store_id, slug })
}

/// Extracts every distinct store from a listing page, in document order.
///
/// `city` is the locality slug the page was requested for.
#[must_use]
pub fn parse_store_listing(html: &str, base_url: &str, city: &str) -> Vec<RetailerStore> {
    let document = Html::parse_document(html);
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut stores = Vec::new();

    for link in document.select(&LINK_SELECTOR) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(parsed) = parse_store_href(href) else {
            continue;
        };
        if !seen_ids.insert(parsed.store_id.clone()) {
            continue;
        }

        let store_name = if parsed.slug.is_empty() {
            link.text().map(str::trim).collect::<String>()
        } else {
            slug_to_label(&parsed.slug)
        };

        let url = join_url(base_url, href).unwrap_or_else(|_| href.to_owned());

        stores.push(RetailerStore {
            store_id: parsed.store_id,
            store_name,
            chain: RETAILER_CHAIN.to_owned(),
            address: find_address(&link),
            city: capitalize(city),
            url,
            slug: parsed.slug,
        });
    }

    stores
}

/// First street-like text near the link: inside the nearest enclosing `div`,
/// else the nearest enclosing `li`.
fn find_address(link: &ElementRef<'_>) -> Option<String> {
    let container = nearest_ancestor(link, "div").or_else(|| nearest_ancestor(link, "li"))?;
    container
        .text()
        .find(|t| STREET_RE.is_match(t))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

fn nearest_ancestor<'a>(el: &ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == tag)
}
