//! ============================================================================
//! Admin Errors - HTTP-facing error mapping
//! ============================================================================

use serde_json::json;
use thiserror::Error;

use crate::rewards::{RewardError, ValidationErrors};
use crate::server::AdminResponse;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Validation(ValidationErrors),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body too large (limit {0} bytes)")]
    PayloadTooLarge(u64),

    #[error("Not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RewardError> for AdminError {
    fn from(err: RewardError) -> Self {
        match err {
            RewardError::Validation(errors) => AdminError::Validation(errors),
            RewardError::Storage(msg) => AdminError::Internal(msg),
        }
    }
}

impl AdminError {
    pub fn status(&self) -> u16 {
        match self {
            AdminError::MalformedPayload(_) => 400,
            AdminError::NotFound => 404,
            AdminError::MethodNotAllowed => 405,
            AdminError::PayloadTooLarge(_) => 413,
            AdminError::Validation(_) => 422,
            AdminError::Internal(_) => 500,
        }
    }

    pub fn into_response(self) -> AdminResponse {
        let status = self.status();
        let body = match &self {
            AdminError::Validation(errors) => json!({
                "error": self.to_string(),
                "violations": errors.violations,
            }),
            // Storage details stay in the logs
            AdminError::Internal(_) => json!({ "error": "Internal error" }),
            _ => json!({ "error": self.to_string() }),
        };
        AdminResponse::json(status, &body)
    }
}
