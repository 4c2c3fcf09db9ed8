//! The settings surface: a grant control, a revoke control, and a
//! display region for the token.

use std::sync::Mutex;

use crate::consts::NOT_OBTAINED;

/// What the settings surface needs from its host.
pub trait UiView: Send + Sync {
    fn set_grant_enabled(&self, enabled: bool);
    fn set_revoke_enabled(&self, enabled: bool);
    fn set_display(&self, text: &str);

    /// Surface a failure to the user. Defaults to doing nothing.
    fn show_error(&self, _message: &str) {}
}

/// Initial control state derived from the token store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState {
    Granted { token: String },
    NotGranted,
}

impl UiState {
    pub fn is_granted(&self) -> bool {
        matches!(self, UiState::Granted { .. })
    }

    /// Push this state onto a view.
    pub fn apply(&self, view: &dyn UiView) {
        match self {
            UiState::Granted { token } => {
                view.set_grant_enabled(false);
                view.set_revoke_enabled(true);
                view.set_display(token);
            }
            UiState::NotGranted => {
                view.set_grant_enabled(true);
                view.set_revoke_enabled(false);
                view.set_display(NOT_OBTAINED);
            }
        }
    }
}

/// Snapshot of a [`TerminalView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    pub grant_enabled: bool,
    pub revoke_enabled: bool,
    pub display: String,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            grant_enabled: true,
            revoke_enabled: true,
            display: String::new(),
        }
    }
}

/// Renders the settings surface as lines on stdout.
#[derive(Default)]
pub struct TerminalView {
    controls: Mutex<Controls>,
}

impl TerminalView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> Controls {
        self.controls.lock().unwrap().clone()
    }

    /// Print the current controls.
    pub fn render(&self) {
        let c = self.controls();
        println!("  grant   {}", enabled_label(c.grant_enabled));
        println!("  revoke  {}", enabled_label(c.revoke_enabled));
        println!("  token   {}", c.display);
    }
}

impl UiView for TerminalView {
    fn set_grant_enabled(&self, enabled: bool) {
        self.controls.lock().unwrap().grant_enabled = enabled;
    }

    fn set_revoke_enabled(&self, enabled: bool) {
        self.controls.lock().unwrap().revoke_enabled = enabled;
    }

    fn set_display(&self, text: &str) {
        self.controls.lock().unwrap().display = text.to_string();
    }

    fn show_error(&self, message: &str) {
        eprintln!("  ✗ {message}");
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled { "enabled" } else { "disabled" }
}
