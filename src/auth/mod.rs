pub mod oauth;
pub mod redirect;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::consts::REVOKED;
use crate::error::{GrantError, GrantResult};
use crate::ui::{UiState, UiView};
use oauth::{ClientCredentials, Endpoints, StateMode};
use redirect::AuthorizationResult;
use storage::TokenStore;

/// How a request for user approval ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The approval page was reached.
    Approved(AuthorizationResult),
    /// The user closed the consent page first.
    TabClosed,
}

/// Shows the consent page to the user and reports what they decided.
#[async_trait]
pub trait ApprovalSource: Send + Sync {
    async fn request_approval(&self, consent_url: &str) -> Result<WatchOutcome>;
}

/// Result of a grant attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    Granted { refresh_token: String },
    /// The consent page was closed; nothing changed.
    Abandoned,
}

/// Runs the authorization-code grant and owns revocation of its token.
pub struct Authorizer {
    credentials: ClientCredentials,
    endpoints: Endpoints,
    state_mode: StateMode,
    http: reqwest::Client,
    store: Arc<dyn TokenStore>,
    view: Arc<dyn UiView>,
}

impl Authorizer {
    pub fn new(
        credentials: ClientCredentials,
        http: reqwest::Client,
        store: Arc<dyn TokenStore>,
        view: Arc<dyn UiView>,
    ) -> Self {
        Self {
            credentials,
            endpoints: Endpoints::default(),
            state_mode: StateMode::default(),
            http,
            store,
            view,
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_state_mode(mut self, state_mode: StateMode) -> Self {
        self.state_mode = state_mode;
        self
    }

    /// Read the stored token and reflect it on the view.
    pub fn bootstrap(&self) -> GrantResult<UiState> {
        let state = match self.store.get()? {
            Some(token) => UiState::Granted { token },
            None => UiState::NotGranted,
        };
        state.apply(self.view.as_ref());
        Ok(state)
    }

    /// Obtain a refresh token through the user's browser and store it.
    ///
    /// The store and the view are only touched once the token endpoint has
    /// returned a refresh token.
    pub async fn start_grant(&self, approval: &dyn ApprovalSource) -> GrantResult<GrantOutcome> {
        self.run_grant(approval).await.inspect_err(|e| self.report(e))
    }

    async fn run_grant(&self, approval: &dyn ApprovalSource) -> GrantResult<GrantOutcome> {
        self.credentials.validate()?;

        let state = self.state_mode.next_state();
        let url = oauth::build_consent_url(&self.endpoints, &self.credentials, &state);
        info!("requesting user approval");

        let result = match approval
            .request_approval(&url)
            .await
            .map_err(GrantError::Host)?
        {
            WatchOutcome::Approved(result) => result,
            WatchOutcome::TabClosed => {
                info!("consent page closed before approval");
                return Ok(GrantOutcome::Abandoned);
            }
        };

        let code = match result {
            AuthorizationResult::Code {
                code,
                state: returned,
            } => {
                if self.state_mode == StateMode::Random
                    && returned.as_deref() != Some(state.as_str())
                {
                    return Err(GrantError::MalformedResponse(
                        "state does not match the request".to_string(),
                    ));
                }
                code
            }
            AuthorizationResult::Denied { error } => {
                info!(%error, "user denied access request");
                return Err(GrantError::AccessDenied);
            }
            AuthorizationResult::Malformed(reason) => {
                return Err(GrantError::MalformedResponse(reason));
            }
        };

        let refresh_token =
            oauth::exchange_code(&self.http, &self.endpoints, &self.credentials, &code).await?;
        self.store.set(&refresh_token)?;
        info!("refresh token stored");

        UiState::Granted {
            token: refresh_token.clone(),
        }
        .apply(self.view.as_ref());
        Ok(GrantOutcome::Granted { refresh_token })
    }

    /// Revoke the stored token at the provider, then forget it locally.
    pub async fn revoke(&self) -> GrantResult<()> {
        self.run_revoke().await.inspect_err(|e| self.report(e))
    }

    async fn run_revoke(&self) -> GrantResult<()> {
        let token = self.store.get()?.ok_or(GrantError::NoToken)?;

        oauth::revoke_token(&self.http, &self.endpoints, &token).await?;
        self.store.clear()?;
        info!("refresh token revoked");

        self.view.set_grant_enabled(true);
        self.view.set_revoke_enabled(false);
        self.view.set_display(REVOKED);
        Ok(())
    }

    fn report(&self, error: &GrantError) {
        match error {
            GrantError::AccessDenied => info!("{error}"),
            _ => warn!("{error}"),
        }
        self.view.show_error(&format!("{} ({error})", error.user_message()));
    }
}
