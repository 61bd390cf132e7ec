//! Application state management

use std::sync::Arc;

use crate::arweave::{Gateway, Wallet};
use crate::config::Config;
use crate::upload::UploadService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    upload_service: UploadService,
}

impl AppState {
    /// Create a new application state
    ///
    /// The wallet is injected here once and shared read-only by every request.
    pub fn new(config: Config, gateway: Arc<dyn Gateway>, wallet: Wallet) -> Self {
        let upload_service = UploadService::new(gateway, wallet, config.upload.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                upload_service,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the upload service
    pub fn upload_service(&self) -> &UploadService {
        &self.inner.upload_service
    }
}
