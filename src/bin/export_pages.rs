//! Make sure the search index exists, exporting every page if it does not.
//!
//! Run once at startup, before the web process takes traffic. Only the
//! database and search settings are read; `SECRET` is not needed here.

use anyhow::Context;
use std::sync::Arc;

use directory::config;
use directory::search::algolia::AlgoliaClient;
use directory::search::sync::{BootstrapOutcome, IndexSynchronizer};
use directory::store::postgres::PgStore;
use directory::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let cfg = config::load_export();

    if cfg.search.admin().is_none() {
        tracing::warn!("no admin search credentials, skipping index export");
        return Ok(());
    }

    let store = PgStore::connect(&cfg.database_url)
        .await
        .context("failed to connect to the page store")?;
    store.migrate().await.context("failed to run migrations")?;

    let client = AlgoliaClient::from_credentials(&cfg.search)?;
    let sync = IndexSynchronizer::new(Arc::new(client), Arc::new(store));

    match sync.bootstrap_if_absent().await? {
        BootstrapOutcome::AlreadyPresent => {
            tracing::info!(index = sync.index_name(), "search index already present");
        }
        BootstrapOutcome::Exported { records } => {
            tracing::info!(index = sync.index_name(), records, "search index created");
        }
    }
    Ok(())
}
