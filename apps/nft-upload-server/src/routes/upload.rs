//! Upload Routes
//!
//! Endpoints:
//! - POST /api/upload-nft-png - Store a base64 PNG on Arweave, return its URI

use axum::{
    extract::State,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::state::AppState;
use crate::upload::{UploadError, UploadRequest, UploadResponse, UPLOAD_PATH};

// ============================================================================
// Error Response
// ============================================================================

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for UploadError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "Upload failed: {}", self);
        } else {
            tracing::warn!(code = self.code(), "Upload rejected: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.code().to_string(),
            message: self.to_string(),
        });

        (status, body).into_response()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create the upload router
pub fn router() -> Router<AppState> {
    Router::new().route(UPLOAD_PATH, post(upload_nft_png))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/upload-nft-png
///
/// Decode the image, store it on Arweave and reply with the content URI.
async fn upload_nft_png(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResponse>, UploadError> {
    let receipt = state.upload_service().upload(&request.b64string).await?;

    Ok(Json(UploadResponse { uri: receipt.uri }))
}
