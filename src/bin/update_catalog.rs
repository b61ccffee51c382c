//! Refresh the asset catalog from the exchange and write the snapshot
//!
//! Run with: cargo run --bin update_catalog -- [snapshot.json] [config.json]
//!
//! Without a snapshot path the default cache location is used. An existing
//! snapshot is loaded first so known corporate events are kept.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use negotiation_notes::catalog::snapshot::default_snapshot_path;
use negotiation_notes::{Catalog, CatalogFetcher, CatalogStore, Config, ReqwestTransport};

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Catalog Update ===\n");

    let args: Vec<String> = env::args().collect();
    let snapshot_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => default_snapshot_path().context("No cache directory available")?,
    };
    let config = match args.get(2) {
        Some(path) => Config::load(Path::new(path)).with_context(|| format!("Failed to load config {}", path))?,
        None => Config::default(),
    };

    let catalog = if snapshot_path.exists() {
        Catalog::load(&snapshot_path)
            .with_context(|| format!("Failed to load snapshot {}", snapshot_path.display()))?
    } else {
        println!("No snapshot at {}, starting empty", snapshot_path.display());
        Catalog::new()
    };
    println!(
        "Known: {} equities, {} funds\n",
        catalog.equities().count(),
        catalog.funds().count()
    );

    let transport = ReqwestTransport::new(Duration::from_secs(config.crawler.request_timeout_secs))?;
    let fetcher = CatalogFetcher::new(Arc::new(CatalogStore::new(catalog)), Arc::new(transport), config.crawler);
    fetcher.subscribe(|catalog| {
        println!(
            "Catalog updated: {} equities, {} funds",
            catalog.equities().count(),
            catalog.funds().count()
        );
    });

    let started = Instant::now();
    let catalog = fetcher.refresh().await?;
    println!("Refresh took {:.1}s", started.elapsed().as_secs_f64());

    catalog.save(&snapshot_path)?;
    println!("Saved to {}", snapshot_path.display());

    Ok(())
}
