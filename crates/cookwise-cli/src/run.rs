//! End-to-end collection run: both adapters in sequence, then mapping,
//! reporting, and snapshot output.

use std::path::Path;

use anyhow::Context;
use cookwise_core::{AppConfig, SourcesConfig};
use cookwise_scraper::{map_to_dataset, AggregatorAdapter, HttpFetcher, RetailerAdapter};
use serde::Serialize;

use crate::report::render_report;

const RETAILER_SNAPSHOT: &str = "ica_results.json";
const AGGREGATOR_SNAPSHOT: &str = "matspar_results.json";

/// Runs the pipeline once.
///
/// Source failures only shrink the dataset; the run fails only when the
/// source configuration cannot be loaded or the dataset cannot be written.
pub(crate) async fn run_pipeline(config: &AppConfig) -> anyhow::Result<()> {
    let sources = load_sources(config)?;
    let fetcher = HttpFetcher::new(
        config.request_timeout_secs,
        &config.user_agent,
        &config.accept_language,
    )
    .context("failed to build HTTP client")?;

    tracing::info!(env = %config.env, city = %config.city, "starting collection run");

    let retailer = RetailerAdapter::new(
        fetcher.clone(),
        &config.retailer_base_url,
        &config.city,
        sources.fallback_store.clone(),
    )
    .run()
    .await;

    let aggregator = AggregatorAdapter::new(fetcher, &config.aggregator_base_url, sources)
        .run()
        .await;

    let dataset = map_to_dataset(&retailer, &aggregator, chrono::Utc::now());

    println!("{}", render_report(&dataset));

    write_json(&config.output_path, &dataset)
        .with_context(|| format!("failed to write dataset to {}", config.output_path.display()))?;
    tracing::info!(path = %config.output_path.display(), "dataset written");

    if let Some(dir) = &config.snapshot_dir {
        write_snapshots(dir, &retailer, &aggregator);
    }

    Ok(())
}

fn load_sources(config: &AppConfig) -> anyhow::Result<SourcesConfig> {
    match &config.sources_path {
        Some(path) => cookwise_core::load_sources(path)
            .with_context(|| format!("failed to load sources from {}", path.display())),
        None => Ok(SourcesConfig::default()),
    }
}

/// Per-source snapshots are diagnostic output; failures are logged only.
fn write_snapshots<R: Serialize, A: Serialize>(dir: &Path, retailer: &R, aggregator: &A) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "could not create snapshot directory");
        return;
    }

    for (file, result) in [
        (RETAILER_SNAPSHOT, write_json(&dir.join(RETAILER_SNAPSHOT), retailer)),
        (AGGREGATOR_SNAPSHOT, write_json(&dir.join(AGGREGATOR_SNAPSHOT), aggregator)),
    ] {
        match result {
            Ok(()) => tracing::debug!(file, "snapshot written"),
            Err(e) => tracing::warn!(file, error = %e, "snapshot write failed"),
        }
    }
}

/// Pretty-printed UTF-8 JSON; non-ASCII text is written unescaped.
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(value)?;
    std::fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use cookwise_scraper::{AggregatorResults, RetailerResults};

    use super::*;

    #[test]
    fn write_json_keeps_non_ascii_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &serde_json::json!({"name": "Mjölk"})).unwrap();
        let body = std::fs::read_to_string(&path).unwrap();
        assert!(body.contains("Mjölk"));
        assert!(body.contains('\n'), "expected pretty-printed output");
    }

    #[test]
    fn write_json_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        assert!(write_json(&path, &serde_json::json!({})).is_err());
    }

    #[test]
    fn snapshots_land_in_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snapshots");
        let now = Utc::now();
        write_snapshots(
            &target,
            &RetailerResults::empty("karlskrona", now),
            &AggregatorResults::empty(now),
        );

        let retailer: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(target.join(RETAILER_SNAPSHOT)).unwrap())
                .unwrap();
        assert_eq!(retailer["city"], "karlskrona");
        assert_eq!(retailer["offer_strategy"], "none");
        assert!(target.join(AGGREGATOR_SNAPSHOT).exists());
    }
}
