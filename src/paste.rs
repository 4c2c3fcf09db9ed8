//! Approval through the user's own browser, for terminals.
//!
//! There is no tab to watch from a terminal, so the user copies the
//! approval page title (`Success state=...&code=...`) or just the code
//! shown on the page and pastes it back.

use std::io::{BufRead, Write};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::auth::redirect::{AuthorizationResult, interpret_query, parse_title};
use crate::auth::{ApprovalSource, WatchOutcome};

/// [`ApprovalSource`] that reads the outcome from a line of input.
pub struct PasteApproval {
    input: Mutex<Box<dyn BufRead + Send>>,
    open_browser: bool,
}

impl PasteApproval {
    /// Read from stdin and try to open the consent page in a browser.
    pub fn stdin() -> Self {
        Self::new(Box::new(std::io::BufReader::new(std::io::stdin())), true)
    }

    pub fn new(input: Box<dyn BufRead + Send>, open_browser: bool) -> Self {
        Self {
            input: Mutex::new(input),
            open_browser,
        }
    }
}

#[async_trait]
impl ApprovalSource for PasteApproval {
    async fn request_approval(&self, consent_url: &str) -> Result<WatchOutcome> {
        if self.open_browser {
            // Try to open browser, silently ignore failures (e.g. headless/SSH)
            let _ = open::that(consent_url);
        }

        println!("Open this URL to grant access:\n");
        println!("  {consent_url}\n");
        print!("Paste the approval page title or code: ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        let read = self
            .input
            .lock()
            .unwrap()
            .read_line(&mut line)
            .context("failed to read input")?;

        // EOF before anything was pasted is the terminal equivalent of
        // closing the consent tab.
        if read == 0 {
            return Ok(WatchOutcome::TabClosed);
        }
        Ok(WatchOutcome::Approved(parse_pasted(&line)))
    }
}

/// Interpret a pasted line: a full approval title, a query, or a bare code.
pub fn parse_pasted(line: &str) -> AuthorizationResult {
    let line = line.trim();
    if line.is_empty() {
        return AuthorizationResult::Malformed("nothing was pasted".to_string());
    }
    if let Some(result) = parse_title(line) {
        return result;
    }
    if line.contains('=') {
        return interpret_query(line);
    }
    AuthorizationResult::Code {
        code: line.to_string(),
        state: None,
    }
}
