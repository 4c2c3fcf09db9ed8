//! Recognising the provider's approval page.
//!
//! With the out-of-band redirect the provider lands the user on
//! `{base}/approval?<query>` and puts the outcome in the page title as
//! `Success <query>` or `Denied <query>`. Everything that depends on that
//! format lives here.

use crate::query::from_query;

/// Outcome of one consent attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationResult {
    Code { code: String, state: Option<String> },
    Denied { error: String },
    Malformed(String),
}

/// Inspect a finished navigation and return the outcome if it is the
/// approval page. Any other page yields `None`.
pub fn detect_outcome(base_url: &str, url: &str, title: &str) -> Option<AuthorizationResult> {
    let approval = format!("{}/approval", base_url.trim_end_matches('/'));
    let mut parts = url.split('?');
    let (Some(path), Some(_), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if path != approval {
        return None;
    }
    parse_title(title)
}

/// Parse an approval page title, `Success <query>` or `Denied <query>`.
pub fn parse_title(title: &str) -> Option<AuthorizationResult> {
    let mut parts = title.split(' ');
    let (Some(verdict), Some(query), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if verdict != "Success" && verdict != "Denied" {
        return None;
    }
    Some(interpret_query(query))
}

/// Turn the approval query into a result. An `error` key wins over `code`.
pub fn interpret_query(query: &str) -> AuthorizationResult {
    let mut params = from_query(query);
    if let Some(error) = params.remove("error") {
        return AuthorizationResult::Denied { error };
    }
    match params.remove("code") {
        Some(code) if !code.is_empty() => AuthorizationResult::Code {
            code,
            state: params.remove("state"),
        },
        _ => AuthorizationResult::Malformed(format!("no authorization code in {query:?}")),
    }
}
