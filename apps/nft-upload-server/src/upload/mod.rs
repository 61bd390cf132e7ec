//! Upload Module
//!
//! Stores base64-encoded PNG images on Arweave and hands back the URI the
//! content is served from.

mod service;
mod types;

pub use service::{decode_payload, UploadService};
pub use types::{
    content_uri, UploadError, UploadReceipt, UploadRequest, UploadResponse, CONTENT_HOST,
    PNG_MAGIC, UPLOAD_PATH,
};
