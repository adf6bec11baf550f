use chrono::TimeZone;
use serde_json::json;

use super::*;
use crate::aggregator::ChainPrice;
use crate::retailer::OfferStrategy;

fn ts() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap()
}

fn retailer_store(id: &str, name: &str, address: Option<&str>) -> RetailerStore {
    RetailerStore {
        store_id: id.to_string(),
        store_name: name.to_string(),
        chain: "ICA".to_string(),
        address: address.map(str::to_string),
        city: "Karlskrona".to_string(),
        url: format!("https://www.ica.se/butiker/store-{id}/"),
        slug: format!("store-{id}"),
    }
}

fn retailer_offer(name: &str, sale: Option<PriceField>) -> RetailerOffer {
    RetailerOffer {
        product_name: name.to_string(),
        store_id: "1004028".to_string(),
        chain: "ICA".to_string(),
        regular_price: None,
        sale_price: sale,
        discount_text: None,
        valid_from: None,
        valid_to: None,
        image_url: None,
        category: None,
        scraped_at: ts(),
    }
}

fn retailer(stores: Vec<RetailerStore>, offers: Vec<RetailerOffer>) -> RetailerResults {
    RetailerResults {
        scraped_at: ts(),
        city: "karlskrona".to_string(),
        stores,
        offers,
        offer_strategy: OfferStrategy::EmbeddedJson,
    }
}

fn product(name: &str, pid: Option<&str>, stores: Vec<ChainPrice>) -> AggregatorProduct {
    AggregatorProduct {
        product_name: name.to_string(),
        brand: Some("Arla".to_string()),
        weight: Some("1 l".to_string()),
        product_id: pid.map(str::to_string),
        slug: None,
        base_price: None,
        median_price: None,
        stores,
        category: Some("Mejeri Ost Agg".to_string()),
        source: "matspar.se".to_string(),
        scraped_at: ts(),
    }
}

fn chain(chain: &str, price: Option<f64>, promo: Option<f64>) -> ChainPrice {
    ChainPrice {
        chain: chain.to_string(),
        price,
        promo_price: promo,
        promo_type: promo.map(|_| "temp".to_string()),
    }
}

fn aggregator(products: Vec<AggregatorProduct>) -> AggregatorResults {
    AggregatorResults {
        scraped_at: ts(),
        products,
        categories_scraped: vec![],
        suppliers: std::collections::BTreeMap::new(),
    }
}

#[test]
fn aggregator_promo_becomes_sale_with_regular_price() {
    let agg = aggregator(vec![product(
        "Mellanmjölk",
        Some("1"),
        vec![chain("ICA", Some(25.0), Some(19.9))],
    )]);
    let dataset = map_to_dataset(&retailer(vec![], vec![]), &agg, ts());

    assert_eq!(dataset.sale_items.len(), 1);
    let item = &dataset.sale_items[0];
    assert_eq!(item.store_id, "ICA-GENERIC");
    assert_eq!(item.sale_price, Some(19.9));
    assert_eq!(item.regular_price, Some(25.0));
    assert_eq!(item.source, "matspar.se");
}

#[test]
fn aggregator_without_promo_has_no_regular_price() {
    let agg = aggregator(vec![product(
        "Mellanmjölk",
        Some("1"),
        vec![chain("Willys", Some(17.5), None), chain("Hemköp", Some(18.9), None)],
    )]);
    let dataset = map_to_dataset(&retailer(vec![], vec![]), &agg, ts());

    let store_ids: Vec<&str> = dataset.sale_items.iter().map(|s| s.store_id.as_str()).collect();
    assert_eq!(store_ids, vec!["WILLYS-GENERIC", "HEMKÖP-GENERIC"]);
    assert!(dataset.sale_items.iter().all(|s| s.regular_price.is_none()));
    assert_eq!(dataset.sale_items[0].sale_price, Some(17.5));
    assert!(dataset.stores.is_empty(), "generic chain ids never become stores");
    let ids: Vec<&str> = dataset
        .sale_items
        .iter()
        .map(|s| s.ingredient_id.as_str())
        .collect();
    assert_eq!(ids, vec!["ING-0001", "ING-0001"]);
}

#[test]
fn retailer_store_and_offer_mapping() {
    let mut offer = retailer_offer("Milk 1L", Some(PriceField::Amount(19.9)));
    offer.regular_price = Some(PriceField::Text("24,90 kr".to_string()));
    offer.discount_text = Some("Max 2 köp".to_string());
    offer.valid_to = Some("2026-10-25".to_string());

    let ica = retailer(
        vec![
            retailer_store("1004028", "Maxi Ica Stormarknad Karlskrona", Some("")),
            retailer_store("1004101", "Ica Nara Trossö", Some("Borgmästaregatan 5")),
        ],
        vec![offer],
    );
    let dataset = map_to_dataset(&ica, &aggregator(vec![]), ts());

    assert_eq!(dataset.stores[0].store_id, "ICA-1004028");
    assert!(dataset.stores[0].address.is_none());
    assert!(dataset.stores[0].latitude.is_none());
    assert_eq!(dataset.stores[1].address.as_deref(), Some("Borgmästaregatan 5"));
    assert_eq!(dataset.stores[1].city.as_deref(), Some("Karlskrona"));

    let item = &dataset.sale_items[0];
    assert_eq!(item.sale_id, "SALE-0001");
    assert_eq!(item.store_id, "ICA-1004028");
    assert_eq!(item.sale_price, Some(19.9));
    assert_eq!(item.regular_price, Some(24.9));
    assert_eq!(item.discount_text.as_deref(), Some("Max 2 köp"));
    assert_eq!(item.valid_to.as_deref(), Some("2026-10-25"));
    assert_eq!(dataset.ingredients[0].source, "ica.se");
}

#[test]
fn html_fallback_text_price_resolves_to_amount() {
    let offer = retailer_offer("Bananas", Some(PriceField::Text("20 kr".to_string())));
    let dataset = map_to_dataset(&retailer(vec![], vec![offer]), &aggregator(vec![]), ts());
    assert_eq!(dataset.sale_items[0].sale_price, Some(20.0));
}

#[test]
fn unresolvable_price_stays_unknown() {
    let offer = retailer_offer("Veckans kupong", Some(PriceField::Text("se butik".to_string())));
    let dataset = map_to_dataset(&retailer(vec![], vec![offer]), &aggregator(vec![]), ts());
    assert_eq!(dataset.sale_items[0].sale_price, None);
}

#[test]
fn first_source_defines_ingredient_metadata() {
    let ica = retailer(vec![], vec![retailer_offer("Mellanmjölk", None)]);
    let agg = aggregator(vec![product(
        "Mellanmjölk",
        Some("1"),
        vec![chain("Coop", Some(16.9), None)],
    )]);
    let dataset = map_to_dataset(&ica, &agg, ts());

    assert_eq!(dataset.ingredients.len(), 1);
    let ingredient = &dataset.ingredients[0];
    assert_eq!(ingredient.source, "ica.se");
    assert!(ingredient.brand.is_none(), "later source must not overwrite metadata");
    assert!(ingredient.category.is_none());
    assert_eq!(dataset.sale_items.len(), 2);
    assert!(dataset
        .sale_items
        .iter()
        .all(|s| s.ingredient_id == ingredient.ingredient_id));
}

#[test]
fn names_are_deduplicated_after_whitespace_normalization() {
    let agg = aggregator(vec![
        product("Ägg  12-pack", Some("1"), vec![chain("ICA", Some(45.0), None)]),
        product(" Ägg 12-pack ", Some("2"), vec![chain("Coop", Some(47.0), None)]),
        product("ägg 12-pack", Some("3"), vec![chain("Willys", Some(42.0), None)]),
    ]);
    let dataset = map_to_dataset(&retailer(vec![], vec![]), &agg, ts());

    let names: Vec<&str> = dataset.ingredients.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Ägg 12-pack", "ägg 12-pack"]);
    assert_eq!(dataset.sale_items[1].ingredient_name, "Ägg 12-pack");
}

#[test]
fn ids_are_sequential_across_sources() {
    let ica = retailer(
        vec![],
        vec![
            retailer_offer("Ost", Some(PriceField::Amount(89.0))),
            retailer_offer("Smör", Some(PriceField::Amount(45.0))),
        ],
    );
    let agg = aggregator(vec![product(
        "Pasta",
        None,
        vec![chain("ICA", Some(19.0), None), chain("Coop", Some(21.0), None)],
    )]);
    let dataset = map_to_dataset(&ica, &agg, ts());

    let ingredient_ids: Vec<&str> = dataset
        .ingredients
        .iter()
        .map(|i| i.ingredient_id.as_str())
        .collect();
    assert_eq!(ingredient_ids, vec!["ING-0001", "ING-0002", "ING-0003"]);
    let sale_ids: Vec<&str> = dataset.sale_items.iter().map(|s| s.sale_id.as_str()).collect();
    assert_eq!(sale_ids, vec!["SALE-0001", "SALE-0002", "SALE-0003", "SALE-0004"]);
}

#[test]
fn every_sale_item_references_an_ingredient() {
    let ica = retailer(vec![], vec![retailer_offer("Ost", None)]);
    let agg = aggregator(vec![product(
        "Ost",
        Some("7"),
        vec![chain("ICA", Some(80.0), Some(70.0))],
    )]);
    let dataset = map_to_dataset(&ica, &agg, ts());
    for item in &dataset.sale_items {
        let ingredient = dataset
            .ingredients
            .iter()
            .find(|i| i.ingredient_id == item.ingredient_id)
            .unwrap();
        assert_eq!(ingredient.name, item.ingredient_name);
    }
}

#[test]
fn mapping_is_idempotent_with_fresh_state() {
    let ica = retailer(
        vec![retailer_store("1004028", "Maxi", None)],
        vec![retailer_offer("Ost", Some(PriceField::Amount(89.0)))],
    );
    let agg = aggregator(vec![product(
        "Pasta",
        Some("3"),
        vec![chain("ICA", Some(19.0), None)],
    )]);
    let first = map_to_dataset(&ica, &agg, ts());
    let second = map_to_dataset(&ica, &agg, ts());
    assert_eq!(first, second);
}

#[test]
fn stats_reflect_collections() {
    let ica = retailer(
        vec![retailer_store("1004028", "Maxi", None)],
        vec![retailer_offer("Ost", Some(PriceField::Amount(89.0)))],
    );
    let agg = aggregator(vec![product(
        "Pasta",
        Some("3"),
        vec![chain("ICA", Some(19.0), None), chain("Coop", Some(21.0), None)],
    )]);
    let dataset = map_to_dataset(&ica, &agg, ts());

    assert_eq!(dataset.stats.total_stores, 1);
    assert_eq!(dataset.stats.total_ingredients, 2);
    assert_eq!(dataset.stats.total_sale_items, 3);
    assert_eq!(dataset.stats.retailer_offers, 1);
    assert_eq!(dataset.stats.aggregator_products, 1);
    assert_eq!(dataset.stats.sale_items_by_source["ica.se"], 1);
    assert_eq!(dataset.stats.sale_items_by_source["matspar.se"], 2);
    assert_eq!(dataset.metadata.generated_at, ts());
}

#[test]
fn empty_inputs_produce_empty_dataset() {
    let dataset = map_to_dataset(&retailer(vec![], vec![]), &aggregator(vec![]), ts());
    assert!(dataset.is_empty());
    assert_eq!(dataset.stats.total_sale_items, 0);
    let value = serde_json::to_value(&dataset).unwrap();
    assert_eq!(value["metadata"]["version"], json!("PoC-0.1"));
}
