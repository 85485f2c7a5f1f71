use thiserror::Error;
use validator::ValidationErrors;

use crate::tales::TaleId;

/// Failure talking to the TaleWeaver API.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("server responded with status {status}")]
    Status {
        status: u16,
        message: Option<String>,
    },
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the server in the error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum TaleError {
    #[error("sign in required")]
    Unauthenticated,
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Request(#[from] ApiError),
    #[error("deletion cancelled")]
    ConfirmationDeclined,
    #[error("a {0} request is already in progress")]
    Busy(&'static str),
    #[error("tale {0} is not loaded")]
    NotFound(TaleId),
    #[error("cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: &'static str,
    },
}

impl TaleError {
    /// Errors that abort quietly without a notification.
    pub fn is_silent(&self) -> bool {
        matches!(self, TaleError::ConfirmationDeclined)
    }
}
