//! Google Drive / Docs integration.
//!
//! Sync HTTP client for the Drive v3 API with bearer-token authentication.

pub mod upload;

use std::fs;

use anyhow::{Context, Result};

use crate::config::DriveSection;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Connection settings for one Drive invocation.
///
/// Built at call time from the loaded configuration plus an optional token
/// override, then handed explicitly into each operation.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub api_base: String,
    pub access_token: String,
}

impl DriveConfig {
    /// Builds the per-invocation Drive configuration.
    ///
    /// The access token comes from `token_override` when given, otherwise
    /// from the configured token file.
    ///
    /// # Errors
    ///
    /// Returns an error if no override is given and the token file cannot be
    /// read.
    pub fn from_section(section: &DriveSection, token_override: Option<String>) -> Result<Self> {
        let access_token = match token_override {
            Some(token) => token,
            None => {
                let path = shellexpand::tilde(&section.token_file).into_owned();
                fs::read_to_string(&path)
                    .map(|token| token.trim().to_owned())
                    .with_context(|| format!("failed to read access token from {path}"))?
            }
        };
        Ok(Self {
            api_base: section.api_base.trim_end_matches('/').to_owned(),
            access_token,
        })
    }
}

/// Error from a single Drive API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    Http(#[from] ureq::Error),

    /// Server returned an error status.
    #[error("HTTP error: {status} - {body}")]
    Status { status: u16, body: String },
}
