pub mod aggregator;
pub mod client;
pub mod error;
pub mod html_fallback;
pub mod mapper;
pub mod miner;
pub mod normalize;
pub mod retailer;

pub use aggregator::{AggregatorAdapter, AggregatorProduct, AggregatorResults};
pub use client::HttpFetcher;
pub use error::ScraperError;
pub use html_fallback::{DisabledFallback, FallbackExtractor, HtmlOffer, HtmlOfferExtractor};
pub use mapper::{map_to_dataset, ModelMapper};
pub use miner::{mine_offers, MinedOffer, OfferAliases, OfferMiner};
pub use normalize::{
    format_price_text, minor_to_major, normalize_whitespace, parse_decimal_price,
    parse_multi_offer, slug_to_label, MultiOffer, PriceField,
};
pub use retailer::{OfferStrategy, RetailerAdapter, RetailerOffer, RetailerResults, RetailerStore};
