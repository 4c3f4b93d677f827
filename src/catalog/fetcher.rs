//! Remote catalog download on a background thread

use bevy::log::{error, info};
use bevy::prelude::*;
use std::sync::{Mutex, mpsc};
use std::thread;

#[derive(Debug)]
pub enum CatalogFetchResult {
    Success { url: String, body: String },
    Failure { url: String, error: String },
}

/// Receiving end of an outstanding download.
#[derive(Resource)]
pub struct CatalogFetchChannel {
    pub res_rx: Mutex<mpsc::Receiver<CatalogFetchResult>>,
}

/// Download `url` once on a worker thread owning its own tokio runtime.
pub fn start_catalog_fetch(url: String) -> CatalogFetchChannel {
    let (res_tx, res_rx) = mpsc::channel::<CatalogFetchResult>();

    thread::spawn(move || {
        let result = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(fetch_body(&url)),
            Err(e) => Err(anyhow::anyhow!("tokio runtime: {}", e)),
        };
        let msg = match result {
            Ok(body) => {
                info!("[CATALOG FETCH] url={} bytes={}", url, body.len());
                CatalogFetchResult::Success { url, body }
            }
            Err(e) => {
                error!("[CATALOG FETCH] url={} FAILURE: {}", url, e);
                CatalogFetchResult::Failure {
                    url,
                    error: e.to_string(),
                }
            }
        };
        let _ = res_tx.send(msg);
    });

    CatalogFetchChannel {
        res_rx: Mutex::new(res_rx),
    }
}

async fn fetch_body(url: &str) -> anyhow::Result<String> {
    let client = reqwest::Client::new();
    let resp = client
        .get(url)
        .header("accept", "application/json")
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        anyhow::bail!("HTTP {}", status);
    }
    Ok(resp.text().await?)
}
