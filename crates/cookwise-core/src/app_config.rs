use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for one collection run, read from `COOKWISE_*` variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Where the mapped dataset snapshot is written.
    pub output_path: PathBuf,
    /// Optional directory for per-source intermediate snapshots.
    pub snapshot_dir: Option<PathBuf>,
    /// Optional YAML source configuration; built-in defaults when unset.
    pub sources_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub retailer_base_url: String,
    pub aggregator_base_url: String,
    /// Locality slug for the retailer's store listing page, e.g. `"karlskrona"`.
    pub city: String,
}
