pub mod app_config;
pub mod config;
pub mod model;
pub mod sources;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use model::{
    Dataset, Ingredient, Metadata, SaleItem, Stats, Store, DATASET_VERSION, SOURCE_AGGREGATOR,
    SOURCE_RETAILER,
};
pub use sources::{load_sources, parse_sources, FallbackStore, SourcesConfig};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read sources file {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse sources file: {0}")]
    SourcesFileParse(#[source] serde_yaml::Error),

    #[error("sources validation error: {0}")]
    Validation(String),
}
