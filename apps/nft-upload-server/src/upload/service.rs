//! Upload Service
//!
//! Drives a gateway through the submission flow: decode, balance check,
//! transaction build, sign, post and status read.

use std::sync::Arc;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use crate::arweave::{submit, Gateway, Transaction, TxStatus, Wallet, Winston};
use crate::config::UploadConfig;

use super::types::{content_uri, UploadError, UploadReceipt, PNG_MAGIC};

/// Standard alphabet, trailing `=` optional
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decode the request payload
pub fn decode_payload(b64string: &str) -> Result<Vec<u8>, UploadError> {
    Ok(PAYLOAD_ENGINE.decode(b64string)?)
}

/// Stores images on Arweave on behalf of one wallet
#[derive(Clone)]
pub struct UploadService {
    gateway: Arc<dyn Gateway>,
    wallet: Arc<Wallet>,
    config: UploadConfig,
}

impl UploadService {
    pub fn new(gateway: Arc<dyn Gateway>, wallet: Wallet, config: UploadConfig) -> Self {
        Self {
            gateway,
            wallet: Arc::new(wallet),
            config,
        }
    }

    pub fn wallet_address(&self) -> &str {
        self.wallet.address()
    }

    /// Store a base64-encoded image and return its receipt
    pub async fn upload(&self, b64string: &str) -> Result<UploadReceipt, UploadError> {
        let data = decode_payload(b64string)?;
        if !data.starts_with(&PNG_MAGIC) {
            tracing::warn!(
                size = data.len(),
                content_type = %self.config.content_type,
                "Payload does not carry a PNG signature"
            );
        }

        let balance = self.check_balance().await?;

        let anchor = self
            .gateway
            .tx_anchor()
            .await
            .map_err(UploadError::Prepare)?;
        let reward = self
            .gateway
            .price(data.len())
            .await
            .map_err(UploadError::Prepare)?;

        let mut tx = Transaction::new(data, anchor, reward, self.wallet.owner());
        tx.add_tag("Content-Type", &self.config.content_type);
        tx.sign(&self.wallet).map_err(UploadError::Sign)?;

        let tx_id = tx.id();
        submit(self.gateway.as_ref(), &tx)
            .await
            .map_err(UploadError::Post)?;

        let status = self.read_status(&tx_id).await?;
        tracing::info!(
            tx_id = %tx_id,
            status = status.status,
            reward,
            "Completed transaction {} with status code {}",
            tx_id,
            status.status
        );

        Ok(UploadReceipt {
            uri: content_uri(&tx_id),
            tx_id,
            status: status.status,
            balance,
            reward,
        })
    }

    async fn check_balance(&self) -> Result<Winston, UploadError> {
        let balance = self
            .gateway
            .balance(self.wallet.address())
            .await
            .map_err(UploadError::Balance)?;

        tracing::debug!(address = %self.wallet.address(), balance, "Wallet balance");

        if let Some(required) = self.config.min_balance {
            if balance < required {
                return Err(UploadError::InsufficientBalance { balance, required });
            }
        }

        Ok(balance)
    }

    /// Read the transaction status, polling up to the configured attempts
    /// until it is confirmed
    async fn read_status(&self, tx_id: &str) -> Result<TxStatus, UploadError> {
        let attempts = self.config.status_attempts.max(1);
        let mut attempt = 1;

        loop {
            let status = self
                .gateway
                .status(tx_id)
                .await
                .map_err(UploadError::Status)?;

            if status.is_confirmed() || attempt >= attempts {
                return Ok(status);
            }

            tracing::debug!(tx_id, attempt, status = status.status, "Transaction not yet confirmed");
            attempt += 1;
            tokio::time::sleep(self.config.status_interval).await;
        }
    }
}
