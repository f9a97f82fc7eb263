use reqwest::StatusCode;
use shared::error::CartContractError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: StatusCode,
        message: Option<String>,
    },
    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
    #[error("server returned an invalid cart: {0}")]
    Contract(#[from] CartContractError),
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CartApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Human-readable text for a failed cart request, suitable for a toast.
pub fn error_text(err: &CartApiError) -> String {
    match err {
        CartApiError::Status {
            message: Some(message),
            ..
        } => message.clone(),
        CartApiError::Status { status, .. } => {
            format!("Request failed with status code {}", status.as_u16())
        }
        CartApiError::Transport { source, .. } if source.is_timeout() => {
            "Request timed out".to_string()
        }
        CartApiError::Transport { source, .. } if source.is_connect() || source.is_request() => {
            "Network Error".to_string()
        }
        other => other.to_string(),
    }
}
