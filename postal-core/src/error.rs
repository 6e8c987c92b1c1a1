use reqwest::StatusCode;
use thiserror::Error;

use crate::model::PostalCode;

/// Failure of a single lookup, or of writing its output line.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Failed to send request to OneMap for postal code {postal}: {source}")]
    Request {
        postal: PostalCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("OneMap request for postal code {postal} failed with status {status}: {body}")]
    Status {
        postal: PostalCode,
        status: StatusCode,
        body: String,
    },

    #[error("Failed to parse OneMap JSON for postal code {postal}: {source}")]
    Decode {
        postal: PostalCode,
        #[source]
        source: serde_json::Error,
    },

    #[error("OneMap reported {found} match(es) for postal code {postal} but returned no results")]
    MissingResult { postal: PostalCode, found: u64 },

    #[error("Failed to write output line: {0}")]
    Output(#[from] std::io::Error),
}

impl LookupError {
    /// Postal code the failure concerns, if it came from a lookup.
    pub fn postal(&self) -> Option<PostalCode> {
        match self {
            LookupError::Request { postal, .. }
            | LookupError::Status { postal, .. }
            | LookupError::Decode { postal, .. }
            | LookupError::MissingResult { postal, .. } => Some(*postal),
            LookupError::Output(_) => None,
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
