//! Opening source links in the default browser.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};

#[async_trait]
pub trait LinkOpener: Send + Sync {
    async fn open(&self, url: String) -> std::io::Result<()>;
}

/// Opens URLs with the platform's default browser (a new tab or window).
pub struct SystemBrowser;

#[async_trait]
impl LinkOpener for SystemBrowser {
    async fn open(&self, url: String) -> std::io::Result<()> {
        tokio::task::spawn_blocking(move || webbrowser::open(&url))
            .await
            .map_err(std::io::Error::other)?
    }
}

/// Open `url` without waiting; failures are logged.
pub fn open_in_background(opener: Arc<dyn LinkOpener>, url: String) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match opener.open(url.clone()).await {
            Ok(()) => debug!("Opened {}", url),
            Err(e) => warn!("Failed to open {}: {}", url, e),
        }
    })
}
