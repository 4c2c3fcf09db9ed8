use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use reqwest::StatusCode;

use crate::consts::{
    FIXED_STATE, GOOGLE_OAUTH2_BASE_URL, PLACEHOLDER_CLIENT_ID, PLACEHOLDER_CLIENT_SECRET,
    PROFILE_SCOPE, REDIRECT_URI,
};
use crate::error::{GrantError, GrantResult};
use crate::query::to_query;

/// Installed-application client registered with the provider.
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl ClientCredentials {
    /// Credentials using the out-of-band redirect URI.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: REDIRECT_URI.to_string(),
        }
    }

    /// Reject unset, placeholder, or non-OOB credentials.
    pub fn validate(&self) -> GrantResult<()> {
        if is_unset(&self.client_id, PLACEHOLDER_CLIENT_ID) {
            return Err(GrantError::Configuration("client_id is unset".to_string()));
        }
        if is_unset(&self.client_secret, PLACEHOLDER_CLIENT_SECRET) {
            return Err(GrantError::Configuration(
                "client_secret is unset".to_string(),
            ));
        }
        if self.redirect_uri != REDIRECT_URI {
            return Err(GrantError::Configuration(format!(
                "redirect_uri must be {REDIRECT_URI}"
            )));
        }
        Ok(())
    }
}

fn is_unset(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == placeholder
}

/// How the `state` parameter is chosen for each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateMode {
    /// Always send [`FIXED_STATE`] and do not check it on return.
    #[default]
    Fixed,
    /// Send a fresh random value and require it back.
    Random,
}

impl StateMode {
    pub fn next_state(self) -> String {
        match self {
            StateMode::Fixed => FIXED_STATE.to_string(),
            StateMode::Random => generate_state(),
        }
    }
}

/// 32 random bytes, URL-safe base64 without padding.
pub fn generate_state() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Provider endpoints derived from one base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base: impl Into<String>) -> Self {
        let base: String = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn auth(&self) -> String {
        format!("{}/auth", self.base)
    }

    pub fn token(&self) -> String {
        format!("{}/token", self.base)
    }

    pub fn revoke(&self) -> String {
        format!("{}/revoke", self.base)
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(GOOGLE_OAUTH2_BASE_URL)
    }
}

/// Build the consent URL for the user to visit.
pub fn build_consent_url(
    endpoints: &Endpoints,
    credentials: &ClientCredentials,
    state: &str,
) -> String {
    let params = [
        ("response_type", "code"),
        ("client_id", credentials.client_id.as_str()),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("scope", PROFILE_SCOPE),
        ("state", state),
    ];
    format!("{}?{}", endpoints.auth(), to_query(params))
}

/// Build the HTTP client used for token and revoke calls.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Token endpoint response. Only the refresh token is kept.
#[derive(Debug, serde::Deserialize)]
pub struct TokenResponse {
    pub refresh_token: Option<String>,
}

/// Exchange an authorization code for a refresh token.
pub async fn exchange_code(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    credentials: &ClientCredentials,
    code: &str,
) -> GrantResult<String> {
    let body = to_query([
        ("code", code),
        ("client_id", credentials.client_id.as_str()),
        ("client_secret", credentials.client_secret.as_str()),
        ("redirect_uri", credentials.redirect_uri.as_str()),
        ("grant_type", "authorization_code"),
    ]);

    let resp = client
        .post(endpoints.token())
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .map_err(|e| GrantError::TokenExchange(describe(&e)))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(GrantError::TokenExchange(format!("{status}: {text}")));
    }

    let text = resp
        .text()
        .await
        .map_err(|e| GrantError::TokenExchange(describe(&e)))?;
    let data: TokenResponse = serde_json::from_str(&text)
        .map_err(|e| GrantError::TokenExchange(format!("unreadable response: {e}")))?;

    match data.refresh_token {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(GrantError::TokenExchange(
            "response has no refresh_token".to_string(),
        )),
    }
}

/// Ask the provider to revoke a token. Only HTTP 200 counts as success.
pub async fn revoke_token(
    client: &reqwest::Client,
    endpoints: &Endpoints,
    token: &str,
) -> GrantResult<()> {
    let url = format!("{}?{}", endpoints.revoke(), to_query([("token", token)]));
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| GrantError::Revocation(describe(&e)))?;

    if resp.status() != StatusCode::OK {
        return Err(GrantError::Revocation(format!("status {}", resp.status())));
    }
    Ok(())
}

fn describe(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    }
}
