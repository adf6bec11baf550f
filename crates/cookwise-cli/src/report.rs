//! Human-readable run summary printed after mapping.

use std::fmt::Write as _;

use cookwise_core::{Dataset, SaleItem};
use cookwise_scraper::format_price_text;

const RULE_WIDTH: usize = 70;
const MAX_STORES: usize = 8;
const MAX_SALE_ITEMS: usize = 15;
const NAME_WIDTH: usize = 45;

/// Renders the summary report for a finished dataset.
#[must_use]
pub(crate) fn render_report(dataset: &Dataset) -> String {
    let stats = &dataset.stats;
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "  COOKWISE DATA COLLECTION RESULTS");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "  Generated: {}", dataset.metadata.generated_at.to_rfc3339());
    let _ = writeln!(out, "  Sources:   {}", stats.sources_used.join(", "));
    let _ = writeln!(out);

    let _ = writeln!(out, "  DATA COLLECTED:");
    for (label, count) in [
        ("Stores", stats.total_stores),
        ("Unique Ingredients", stats.total_ingredients),
        ("Sale Items", stats.total_sale_items),
        ("  from ICA.se", stats.retailer_offers),
        ("  from Matspar.se", stats.aggregator_products),
    ] {
        let _ = writeln!(out, "  {label:.<40} {count}");
    }
    let _ = writeln!(out);

    if dataset.is_empty() {
        let _ = writeln!(out, "  No data collected from any source.");
        let _ = writeln!(out);
    }

    if !dataset.stores.is_empty() {
        let _ = writeln!(out, "  STORES FOUND:");
        for store in dataset.stores.iter().take(MAX_STORES) {
            let _ = writeln!(out, "    - {} ({})", store.name, store.store_id);
        }
        if dataset.stores.len() > MAX_STORES {
            let _ = writeln!(out, "    ... and {} more", dataset.stores.len() - MAX_STORES);
        }
        let _ = writeln!(out);
    }

    if !dataset.sale_items.is_empty() {
        let _ = writeln!(out, "  SAMPLE SALE ITEMS:");
        for item in dataset.sale_items.iter().take(MAX_SALE_ITEMS) {
            let name: String = item.ingredient_name.chars().take(NAME_WIDTH).collect();
            let _ = writeln!(out, "    - {name:<NAME_WIDTH$} {}", price_label(item));
            let _ = writeln!(out, "      Store: {} | Source: {}", item.store_id, item.source);
        }
        if dataset.sale_items.len() > MAX_SALE_ITEMS {
            let _ = writeln!(
                out,
                "    ... and {} more",
                dataset.sale_items.len() - MAX_SALE_ITEMS
            );
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "  SOURCE STATUS:");
    let _ = writeln!(out, "  ICA.se:     {}", status(stats.retailer_offers));
    let _ = writeln!(out, "  Matspar.se: {}", status(stats.aggregator_products));
    let _ = write!(out, "{rule}");

    out
}

fn price_label(item: &SaleItem) -> String {
    let price = match (item.sale_price, item.discount_text.as_deref()) {
        (Some(p), _) => format!("{} kr", format_price_text(p)),
        (None, Some(text)) => text.to_owned(),
        (None, None) => "N/A".to_owned(),
    };
    match item.regular_price {
        Some(regular) => format!("{price} (reg: {} kr)", format_price_text(regular)),
        None => price,
    }
}

fn status(contributed: usize) -> &'static str {
    if contributed > 0 {
        "WORKING"
    } else {
        "FAILED"
    }
}
