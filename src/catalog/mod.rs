//! Satellite catalog: loading, caching, and search

use bevy::prelude::*;

pub mod cache;
pub mod fetcher;
pub mod loader;
pub mod types;

pub use cache::{CachedCatalog, CatalogCache};
pub use fetcher::{CatalogFetchChannel, CatalogFetchResult, start_catalog_fetch};
pub use loader::{load_catalog_file, parse_catalog};
pub use types::{Catalog, DEFAULT_SEARCH_LIMIT};

use crate::config::ViewerConfig;

pub struct CatalogPlugin;

impl Plugin for CatalogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Catalog>()
            .add_systems(Startup, begin_catalog_load)
            .add_systems(Update, receive_catalog_fetch);
    }
}

/// Use a fresh cached download, else start one, else read the local file.
fn begin_catalog_load(mut commands: Commands, config: Res<ViewerConfig>) {
    let Some(url) = config.catalog_url.clone() else {
        load_local_catalog(&mut commands, &config);
        return;
    };

    match CatalogCache::new(config.cache_expiration_days).and_then(|c| c.read(&url)) {
        Ok(Some(cached)) if is_fresh(&config, &cached) => match parse_catalog(&cached.body) {
            Ok(catalog) => {
                info!("[CATALOG] cache hit url={} records={}", url, catalog.len());
                commands.insert_resource(catalog);
                return;
            }
            Err(e) => warn!("[CATALOG] cached body unusable: {}", e),
        },
        Ok(_) => {}
        Err(e) => warn!("[CATALOG] cache read failed: {}", e),
    }

    info!("[CATALOG] downloading {}", url);
    commands.insert_resource(start_catalog_fetch(url));
}

fn is_fresh(config: &ViewerConfig, cached: &CachedCatalog) -> bool {
    CatalogCache::new(config.cache_expiration_days)
        .map(|c| c.is_valid(cached))
        .unwrap_or(false)
}

fn load_local_catalog(commands: &mut Commands, config: &ViewerConfig) {
    match load_catalog_file(&config.catalog_path) {
        Ok(catalog) => {
            info!(
                "[CATALOG] loaded {} records from {}",
                catalog.len(),
                config.catalog_path.display()
            );
            commands.insert_resource(catalog);
        }
        Err(e) => error!(
            "[CATALOG] failed to load {}: {}",
            config.catalog_path.display(),
            e
        ),
    }
}

/// Pick up a finished download; on failure fall back to the local file.
fn receive_catalog_fetch(
    mut commands: Commands,
    config: Res<ViewerConfig>,
    channel: Option<Res<CatalogFetchChannel>>,
) {
    let Some(channel) = channel else {
        return;
    };
    let Ok(msg) = channel.res_rx.lock().map(|rx| rx.try_recv()) else {
        return;
    };
    let Ok(msg) = msg else {
        return;
    };
    commands.remove_resource::<CatalogFetchChannel>();

    match msg {
        CatalogFetchResult::Success { url, body } => match parse_catalog(&body) {
            Ok(catalog) => {
                let entry = CachedCatalog {
                    url,
                    body,
                    fetched_at: chrono::Utc::now(),
                };
                if let Err(e) =
                    CatalogCache::new(config.cache_expiration_days).and_then(|c| c.write(&entry))
                {
                    warn!("[CATALOG] cache write failed: {}", e);
                }
                info!("[CATALOG] downloaded {} records", catalog.len());
                commands.insert_resource(catalog);
            }
            Err(e) => {
                error!("[CATALOG] downloaded catalog unusable: {}", e);
                load_local_catalog(&mut commands, &config);
            }
        },
        CatalogFetchResult::Failure { url, error } => {
            warn!("[CATALOG] download of {} failed ({}), using local file", url, error);
            load_local_catalog(&mut commands, &config);
        }
    }
}
