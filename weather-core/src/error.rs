use thiserror::Error;

/// Failures of a single gateway call.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The request never produced an HTTP response (connect, timeout, body read).
    #[error("Failed to reach the gateway while fetching {resource}: {source}")]
    Transport {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The gateway answered with a non-success status.
    #[error("Gateway responded with status {status}: {message}")]
    Upstream { status: u16, message: String },

    /// A success response whose body did not have the expected shape.
    #[error("Unexpected {resource} payload: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl QueryError {
    /// Builds an upstream error from a non-success response body.
    ///
    /// The gateway's `message` field wins when present; otherwise the generic
    /// "Failed to fetch <resource>" text is used.
    pub fn upstream(status: u16, body: &str, resource: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fetch_failed(resource));

        QueryError::Upstream { status, message }
    }

    /// The text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            QueryError::Upstream { message, .. } => message.clone(),
            QueryError::Transport { resource, .. } | QueryError::Decode { resource, .. } => {
                fetch_failed(resource)
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            QueryError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn fetch_failed(resource: &str) -> String {
    format!("Failed to fetch {resource}")
}
