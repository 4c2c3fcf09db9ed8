use thiserror::Error;

/// Failures of a grant or revoke attempt. Each one ends the attempt.
#[derive(Debug, Error)]
pub enum GrantError {
    #[error("client credentials are not configured: {0}")]
    Configuration(String),
    #[error("user denied the access request")]
    AccessDenied,
    #[error("malformed approval response: {0}")]
    MalformedResponse(String),
    #[error("failed to get refresh token: {0}")]
    TokenExchange(String),
    #[error("no refresh token is stored")]
    NoToken,
    #[error("failed to revoke the token: {0}")]
    Revocation(String),
    #[error("host environment failed: {0:#}")]
    Host(anyhow::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl GrantError {
    /// Short message suitable for the display region.
    pub fn user_message(&self) -> &'static str {
        match self {
            GrantError::Configuration(_) => "Set a client ID and secret first.",
            GrantError::AccessDenied => "Access was denied.",
            GrantError::MalformedResponse(_) => "Unexpected approval response.",
            GrantError::TokenExchange(_) => "Could not obtain a refresh token.",
            GrantError::NoToken => "There is no token to revoke.",
            GrantError::Revocation(_) => "Could not revoke the token.",
            GrantError::Host(_) => "The browser could not show the consent page.",
            GrantError::Storage(_) => "Local storage failed.",
        }
    }
}

pub type GrantResult<T> = Result<T, GrantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_wraps_anyhow() {
        let err: GrantError = anyhow::anyhow!("disk full").into();
        assert!(matches!(err, GrantError::Storage(_)));
        assert_eq!(err.to_string(), "disk full");
    }

    #[test]
    fn every_variant_has_user_message() {
        let errors = [
            GrantError::Configuration("client_id".into()),
            GrantError::AccessDenied,
            GrantError::MalformedResponse("no code".into()),
            GrantError::TokenExchange("status 400".into()),
            GrantError::NoToken,
            GrantError::Revocation("status 400".into()),
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
