//! Waits for the consent tab to reach the approval page.
//!
//! The watcher registers its two listeners before the tab exists and
//! holds them only for the duration of [`TabWatcher::watch`]. Whichever
//! terminal event arrives first (approval page or tab closed) ends the
//! wait, and both listeners are dropped with it.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::auth::redirect::detect_outcome;
use crate::auth::{ApprovalSource, WatchOutcome};
use crate::events::{STATUS_COMPLETE, TabEvents, TabId};

/// A tab created by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub opener: Option<TabId>,
}

/// The slice of a browser's tab API the grant flow needs.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The tab the settings page lives in.
    async fn current_tab(&self) -> Result<TabId>;
    async fn create_tab(&self, url: &str, opener: TabId) -> Result<Tab>;
    /// Bring a tab to the foreground.
    async fn activate(&self, tab: TabId) -> Result<()>;
    async fn close(&self, tab: TabId) -> Result<()>;
    fn events(&self) -> &TabEvents;
}

/// [`ApprovalSource`] that opens the consent page in a new tab.
pub struct TabWatcher {
    host: Arc<dyn TabHost>,
    base_url: String,
}

impl TabWatcher {
    pub fn new(host: Arc<dyn TabHost>, base_url: impl Into<String>) -> Self {
        Self {
            host,
            base_url: base_url.into(),
        }
    }

    /// Open `url` next to the current tab and wait for the outcome.
    pub async fn watch(&self, url: &str) -> Result<WatchOutcome> {
        let mut updates = self.host.events().on_updated();
        let mut removals = self.host.events().on_removed();

        let opener = self.host.current_tab().await?;
        let tab = self.host.create_tab(url, opener).await?;

        let result = loop {
            tokio::select! {
                update = updates.recv() => {
                    let update = match update {
                        Ok(update) => update,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(skipped, "navigation listener lagged");
                            continue;
                        }
                        Err(RecvError::Closed) => return Ok(WatchOutcome::TabClosed),
                    };
                    if update.tab_id != tab.id || update.status != STATUS_COMPLETE {
                        continue;
                    }
                    match detect_outcome(&self.base_url, &update.url, &update.title) {
                        Some(result) => break result,
                        None => debug!(url = %update.url, "ignoring navigation"),
                    }
                }
                removed = removals.recv() => {
                    match removed {
                        Ok(id) if id == tab.id => return Ok(WatchOutcome::TabClosed),
                        Ok(_) | Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => return Ok(WatchOutcome::TabClosed),
                    }
                }
            }
        };

        drop(updates);
        drop(removals);
        if let Err(e) = self.host.activate(tab.opener.unwrap_or(opener)).await {
            debug!(error = %e, "could not bring the settings tab forward");
        }
        self.host.close(tab.id).await?;
        Ok(WatchOutcome::Approved(result))
    }
}

#[async_trait]
impl ApprovalSource for TabWatcher {
    async fn request_approval(&self, consent_url: &str) -> Result<WatchOutcome> {
        self.watch(consent_url).await
    }
}
