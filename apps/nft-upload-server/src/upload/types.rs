//! Upload types

use serde::{Deserialize, Serialize};

use crate::arweave::{ArweaveError, Winston};

// ============================================================================
// Constants
// ============================================================================

/// Endpoint path of the upload handler
pub const UPLOAD_PATH: &str = "/api/upload-nft-png";

/// Host serving stored content
pub const CONTENT_HOST: &str = "www.arweave.net";

/// PNG file signature
pub const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Retrieval URI for a stored transaction
pub fn content_uri(tx_id: &str) -> String {
    format!("https://{}/{}?ext=png", CONTENT_HOST, tx_id)
}

// ============================================================================
// Request / Response
// ============================================================================

/// Upload request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Base64-encoded PNG bytes, without a `data:` prefix
    pub b64string: String,
}

/// Upload response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub uri: String,
}

/// Outcome of a successful submission
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub tx_id: String,
    /// Status code from the last status read
    pub status: u16,
    pub balance: Winston,
    pub reward: Winston,
    pub uri: String,
}

// ============================================================================
// Error Types
// ============================================================================

/// Upload error types, one per step of the submission flow
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Failed to fetch wallet balance: {0}")]
    Balance(#[source] ArweaveError),

    #[error("Insufficient wallet balance: {balance} winston (required: {required})")]
    InsufficientBalance { balance: Winston, required: Winston },

    #[error("Failed to prepare transaction: {0}")]
    Prepare(#[source] ArweaveError),

    #[error("Failed to sign transaction: {0}")]
    Sign(#[source] ArweaveError),

    #[error("Failed to post transaction: {0}")]
    Post(#[source] ArweaveError),

    #[error("Failed to fetch transaction status: {0}")]
    Status(#[source] ArweaveError),
}

impl UploadError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            Self::Decode(_) => StatusCode::BAD_REQUEST,
            Self::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            Self::Sign(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Balance(_) | Self::Prepare(_) | Self::Post(_) | Self::Status(_) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Decode(_) => "INVALID_BASE64",
            Self::Balance(_) => "BALANCE_UNAVAILABLE",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::Prepare(_) => "PREPARE_FAILED",
            Self::Sign(_) => "SIGNING_FAILED",
            Self::Post(_) => "POST_FAILED",
            Self::Status(_) => "STATUS_UNAVAILABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_uri() {
        assert_eq!(
            content_uri("abc_DEF-123"),
            "https://www.arweave.net/abc_DEF-123?ext=png"
        );
    }

    #[test]
    fn test_status_codes() {
        use axum::http::StatusCode;

        let err = UploadError::InsufficientBalance {
            balance: 1,
            required: 2,
        };
        assert_eq!(err.status_code(), StatusCode::PAYMENT_REQUIRED);

        let err = UploadError::Post(ArweaveError::Http("connection refused".to_string()));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.code(), "POST_FAILED");
    }
}
