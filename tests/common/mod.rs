#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use oobgrant::auth::oauth::{self, ClientCredentials, Endpoints};
use oobgrant::auth::redirect::AuthorizationResult;
use oobgrant::auth::storage::{SqliteTokenStore, TokenStore};
use oobgrant::auth::{ApprovalSource, Authorizer, WatchOutcome};
use oobgrant::events::{TabEvents, TabId};
use oobgrant::query::from_query;
use oobgrant::ui::UiView;
use oobgrant::watcher::{Tab, TabHost};

/// Every call made on a view, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Grant(bool),
    Revoke(bool),
    Display(String),
    Error(String),
}

#[derive(Default)]
pub struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than error reports.
    pub fn control_calls(&self) -> Vec<ViewCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, ViewCall::Error(_)))
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ViewCall::Error(msg) => Some(msg),
                _ => None,
            })
            .collect()
    }
}

impl UiView for RecordingView {
    fn set_grant_enabled(&self, enabled: bool) {
        self.calls.lock().unwrap().push(ViewCall::Grant(enabled));
    }

    fn set_revoke_enabled(&self, enabled: bool) {
        self.calls.lock().unwrap().push(ViewCall::Revoke(enabled));
    }

    fn set_display(&self, text: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(ViewCall::Display(text.to_string()));
    }

    fn show_error(&self, message: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(ViewCall::Error(message.to_string()));
    }
}

/// Approval source that always answers the same way and remembers the URL.
pub struct ScriptedApproval {
    outcome: WatchOutcome,
    pub seen_url: Mutex<Option<String>>,
}

impl ScriptedApproval {
    pub fn new(outcome: WatchOutcome) -> Self {
        Self {
            outcome,
            seen_url: Mutex::new(None),
        }
    }

    pub fn code(code: &str) -> Self {
        Self::new(WatchOutcome::Approved(AuthorizationResult::Code {
            code: code.to_string(),
            state: None,
        }))
    }

    pub fn denied() -> Self {
        Self::new(WatchOutcome::Approved(AuthorizationResult::Denied {
            error: "access_denied".to_string(),
        }))
    }
}

#[async_trait]
impl ApprovalSource for ScriptedApproval {
    async fn request_approval(&self, consent_url: &str) -> Result<WatchOutcome> {
        *self.seen_url.lock().unwrap() = Some(consent_url.to_string());
        Ok(self.outcome.clone())
    }
}

/// Approval source that returns a code together with the request's state.
pub struct EchoStateApproval {
    pub code: String,
}

#[async_trait]
impl ApprovalSource for EchoStateApproval {
    async fn request_approval(&self, consent_url: &str) -> Result<WatchOutcome> {
        let (_, query) = consent_url.split_once('?').unwrap_or((consent_url, ""));
        let state = from_query(query).remove("state");
        Ok(WatchOutcome::Approved(AuthorizationResult::Code {
            code: self.code.clone(),
            state,
        }))
    }
}

/// Approval source whose host environment fails.
pub struct BrokenApproval;

#[async_trait]
impl ApprovalSource for BrokenApproval {
    async fn request_approval(&self, _consent_url: &str) -> Result<WatchOutcome> {
        anyhow::bail!("tabs API unavailable")
    }
}

/// Tab id of the settings page in [`FakeTabHost`].
pub const SETTINGS_TAB: TabId = 1;

/// In-process tab host. Created tabs are reported on a channel so tests
/// can wait for the watcher to open its tab before emitting events.
pub struct FakeTabHost {
    events: TabEvents,
    next_id: AtomicU64,
    created_tx: mpsc::UnboundedSender<(TabId, String)>,
    pub activated: Mutex<Vec<TabId>>,
    pub closed: Mutex<Vec<TabId>>,
    /// Make `activate` fail, as when the settings tab is already gone.
    pub fail_activate: AtomicBool,
}

impl FakeTabHost {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<(TabId, String)>) {
        let (created_tx, created_rx) = mpsc::unbounded_channel();
        let host = Arc::new(Self {
            events: TabEvents::default(),
            next_id: AtomicU64::new(SETTINGS_TAB + 1),
            created_tx,
            activated: Mutex::new(Vec::new()),
            closed: Mutex::new(Vec::new()),
            fail_activate: AtomicBool::new(false),
        });
        (host, created_rx)
    }
}

#[async_trait]
impl TabHost for FakeTabHost {
    async fn current_tab(&self) -> Result<TabId> {
        Ok(SETTINGS_TAB)
    }

    async fn create_tab(&self, url: &str, opener: TabId) -> Result<Tab> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let _ = self.created_tx.send((id, url.to_string()));
        Ok(Tab {
            id,
            opener: Some(opener),
        })
    }

    async fn activate(&self, tab: TabId) -> Result<()> {
        if self.fail_activate.load(Ordering::SeqCst) {
            anyhow::bail!("no tab with id {tab}");
        }
        self.activated.lock().unwrap().push(tab);
        Ok(())
    }

    async fn close(&self, tab: TabId) -> Result<()> {
        self.closed.lock().unwrap().push(tab);
        self.events.emit_removed(tab);
        Ok(())
    }

    fn events(&self) -> &TabEvents {
        &self.events
    }
}

pub fn credentials() -> ClientCredentials {
    ClientCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
}

pub struct Harness {
    pub authorizer: Authorizer,
    pub store: Arc<SqliteTokenStore>,
    pub view: Arc<RecordingView>,
}

/// Authorizer wired to an in-memory store, a recording view, and `base_url`.
pub fn harness(base_url: &str) -> Harness {
    harness_with(base_url, credentials(), Duration::from_secs(5))
}

pub fn harness_with(base_url: &str, creds: ClientCredentials, timeout: Duration) -> Harness {
    let store = Arc::new(SqliteTokenStore::open(":memory:").unwrap());
    let view = Arc::new(RecordingView::default());
    let http = oauth::http_client(timeout).unwrap();
    let authorizer = Authorizer::new(creds, http, store.clone(), view.clone())
        .with_endpoints(Endpoints::new(base_url));
    Harness {
        authorizer,
        store,
        view,
    }
}

pub fn stored(store: &SqliteTokenStore) -> Option<String> {
    store.get().unwrap()
}
