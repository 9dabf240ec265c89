use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// A single `{code, message}` entry from a Cloudflare API error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiMessage {
    pub code: i64,
    pub message: String,
}

impl fmt::Display for ApiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request to Cloudflare API failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unable to parse Cloudflare API response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error in {method} request to Cloudflare API ({path}): {}", join_messages(.errors))]
    Api {
        method: String,
        path: String,
        errors: Vec<ApiMessage>,
    },

    #[error("Cloudflare API response to {method} {path} has no result")]
    MissingResult { method: String, path: String },

    #[error("Zone '{0}' not found")]
    ZoneNotFound(String),

    #[error("Config file {path:?} is not valid (Line {line}: {content})")]
    InvalidConfig {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("No Cloudflare token found")]
    MissingToken,
}

fn join_messages(errors: &[ApiMessage]) -> String {
    if errors.is_empty() {
        return "unknown error".to_string();
    }
    errors
        .iter()
        .map(ApiMessage::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
