//! Arweave Types
//!
//! Wire types for the Arweave HTTP API and the storage client error type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Amounts on Arweave are expressed in winston (1 AR = 10^12 winston)
pub type Winston = u128;

/// Encode bytes the way Arweave serializes binary fields (unpadded base64url)
pub fn b64url_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode an unpadded base64url field
pub fn b64url_decode(data: &str) -> Result<Vec<u8>, ArweaveError> {
    URL_SAFE_NO_PAD
        .decode(data.trim_end_matches('='))
        .map_err(|e| ArweaveError::InvalidResponse(format!("Invalid base64url field: {}", e)))
}

/// Transaction tag
///
/// Names and values are held decoded; they are base64url-encoded on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Tag as it appears in transaction JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireTag {
    pub name: String,
    pub value: String,
}

impl From<&Tag> for WireTag {
    fn from(tag: &Tag) -> Self {
        Self {
            name: b64url_encode(tag.name.as_bytes()),
            value: b64url_encode(tag.value.as_bytes()),
        }
    }
}

/// Format 2 transaction as posted to `POST /tx`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionJson {
    pub format: u8,
    pub id: String,
    pub last_tx: String,
    pub owner: String,
    pub tags: Vec<WireTag>,
    pub target: String,
    pub quantity: String,
    pub data: String,
    pub data_size: String,
    pub data_root: String,
    pub reward: String,
    pub signature: String,
}

/// Chunk upload body for `POST /chunk`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkJson {
    pub data_root: String,
    pub data_size: String,
    pub data_path: String,
    pub offset: String,
    pub chunk: String,
}

/// Confirmation details returned with a 200 status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub block_height: u64,
    pub block_indep_hash: String,
    pub number_of_confirmations: u64,
}

/// Result of `GET /tx/{id}/status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxStatus {
    /// HTTP status returned by the gateway (200 mined, 202 pending, 404 unknown)
    pub status: u16,
    pub confirmed: Option<Confirmation>,
}

impl TxStatus {
    pub fn pending() -> Self {
        Self {
            status: 202,
            confirmed: None,
        }
    }

    /// Whether the gateway reports a final state for the transaction
    pub fn is_confirmed(&self) -> bool {
        self.status == 200 && self.confirmed.is_some()
    }
}

/// Storage client errors
#[derive(Debug, thiserror::Error)]
pub enum ArweaveError {
    #[error("Invalid wallet key: {0}")]
    InvalidKey(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Gateway returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid gateway response: {0}")]
    InvalidResponse(String),

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl From<reqwest::Error> for ArweaveError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_tag_encoding() {
        let tag = Tag::new("Content-Type", "image/png");
        let wire = WireTag::from(&tag);

        assert_eq!(wire.name, "Q29udGVudC1UeXBl");
        assert_eq!(wire.value, "aW1hZ2UvcG5n");
    }

    #[test]
    fn test_b64url_decode_tolerates_padding() {
        assert_eq!(b64url_decode("AAA=").unwrap(), vec![0, 0]);
        assert_eq!(b64url_decode("AAA").unwrap(), vec![0, 0]);
        assert!(b64url_decode("A+A/").is_err());
    }

    #[test]
    fn test_status_confirmation() {
        assert!(!TxStatus::pending().is_confirmed());

        let mined = TxStatus {
            status: 200,
            confirmed: Some(Confirmation {
                block_height: 1,
                block_indep_hash: "hash".to_string(),
                number_of_confirmations: 3,
            }),
        };
        assert!(mined.is_confirmed());
    }
}
