//! Sample upload trigger
//!
//! Posts an embedded sample PNG to the upload endpoint and reports the URI
//! it was stored under. Used to smoke-test a running server.

use crate::upload::{UploadRequest, UploadResponse, UPLOAD_PATH};

/// Base64 of a 240x240 sample PNG, without a `data:` prefix
pub const SAMPLE_PNG_B64: &str = include_str!("../assets/sample.b64");

/// Trigger errors
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Body sent by the trigger
pub fn sample_request() -> UploadRequest {
    UploadRequest {
        b64string: SAMPLE_PNG_B64.to_string(),
    }
}

/// POST the sample image to the server at `base_url` and return the URI
pub async fn send_sample(client: &reqwest::Client, base_url: &str) -> Result<String, TriggerError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), UPLOAD_PATH);

    let response = client.post(&url).json(&sample_request()).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TriggerError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        });
    }

    let UploadResponse { uri } = response.json().await?;
    tracing::info!(uri = %uri, "Sample uploaded");
    Ok(uri)
}
