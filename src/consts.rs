//! Project-wide constants.

use std::path::PathBuf;

/// Google's OAuth2 service.
pub const GOOGLE_OAUTH2_BASE_URL: &str = "https://accounts.google.com/o/oauth2";

/// Out-of-band redirect URI for installed applications.
pub const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// The only scope ever requested.
pub const PROFILE_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.profile";

/// Fixed `state` value sent unless a random one is requested.
pub const FIXED_STATE: &str = "NotUsedInThisExample";

/// Storage key of the persisted refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Display text when no token has been obtained.
pub const NOT_OBTAINED: &str = "Not yet obtained";

/// Display text after a successful revoke.
pub const REVOKED: &str = "Revoked";

/// Placeholder values shipped in sample configuration.
pub const PLACEHOLDER_CLIENT_ID: &str = "{YOUR_CLIENT_ID}";
pub const PLACEHOLDER_CLIENT_SECRET: &str = "{YOUR_CLIENT_SECRET}";

/// Default timeout in seconds for each provider HTTP call.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Default database path: `~/.oobgrant/oobgrant.db`.
/// Single DB for the refresh token and config.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".oobgrant")
        .join("oobgrant.db")
}
