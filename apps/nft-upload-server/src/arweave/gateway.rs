//! Arweave gateways
//!
//! Defines the gateway trait used by the upload flow and its HTTP
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::transaction::Transaction;
use super::types::{
    b64url_decode, ArweaveError, ChunkJson, Confirmation, TransactionJson, TxStatus, Winston,
};
use crate::config::ArweaveConfig;

/// Payloads with at most this many chunks are posted inline with the header
pub const MAX_CHUNKS_IN_BODY: usize = 1;

/// Arweave gateway trait
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Balance of a wallet address in winston
    async fn balance(&self, address: &str) -> Result<Winston, ArweaveError>;

    /// Anchor to use as `last_tx` for a new transaction
    async fn tx_anchor(&self) -> Result<Vec<u8>, ArweaveError>;

    /// Reward required to store `data_size` bytes
    async fn price(&self, data_size: usize) -> Result<Winston, ArweaveError>;

    /// Submit a signed transaction
    async fn post_transaction(&self, tx: &TransactionJson) -> Result<(), ArweaveError>;

    /// Upload one chunk of a transaction's data
    async fn post_chunk(&self, chunk: &ChunkJson) -> Result<(), ArweaveError>;

    /// Current status of a transaction
    async fn status(&self, id: &str) -> Result<TxStatus, ArweaveError>;
}

/// Post a signed transaction and its data
///
/// Small payloads travel inside the transaction body. Larger ones post the
/// header first and then upload every chunk with its proof.
pub async fn submit(gateway: &dyn Gateway, tx: &Transaction) -> Result<(), ArweaveError> {
    if !tx.is_signed() {
        return Err(ArweaveError::Signing("Transaction is not signed".to_string()));
    }

    let inline = tx.chunk_count() <= MAX_CHUNKS_IN_BODY;
    gateway.post_transaction(&tx.to_json(inline)).await?;

    if !inline {
        for index in 0..tx.chunk_count() {
            if let Some(chunk) = tx.chunk_json(index) {
                gateway.post_chunk(&chunk).await?;
            }
        }
        tracing::debug!(tx_id = %tx.id(), chunks = tx.chunk_count(), "Uploaded transaction chunks");
    }

    Ok(())
}

/// Gateway reached over HTTP
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(config: &ArweaveConfig) -> Result<Self, ArweaveError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_text(&self, path: &str) -> Result<String, ArweaveError> {
        let response = self.client.get(self.url(path)).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ArweaveError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn post_json<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<(), ArweaveError> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        let status = response.status();

        // 208: the gateway already has it
        if status.is_success() || status == StatusCode::ALREADY_REPORTED {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ArweaveError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }
}

fn parse_winston(body: &str) -> Result<Winston, ArweaveError> {
    body.trim()
        .parse()
        .map_err(|_| ArweaveError::InvalidResponse(format!("Not a winston amount: {}", body)))
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn balance(&self, address: &str) -> Result<Winston, ArweaveError> {
        let body = self.get_text(&format!("/wallet/{}/balance", address)).await?;
        parse_winston(&body)
    }

    async fn tx_anchor(&self) -> Result<Vec<u8>, ArweaveError> {
        let body = self.get_text("/tx_anchor").await?;
        b64url_decode(body.trim())
    }

    async fn price(&self, data_size: usize) -> Result<Winston, ArweaveError> {
        let body = self.get_text(&format!("/price/{}", data_size)).await?;
        parse_winston(&body)
    }

    async fn post_transaction(&self, tx: &TransactionJson) -> Result<(), ArweaveError> {
        self.post_json("/tx", tx).await
    }

    async fn post_chunk(&self, chunk: &ChunkJson) -> Result<(), ArweaveError> {
        self.post_json("/chunk", chunk).await
    }

    async fn status(&self, id: &str) -> Result<TxStatus, ArweaveError> {
        let response = self
            .client
            .get(self.url(&format!("/tx/{}/status", id)))
            .send()
            .await?;
        let status = response.status();

        let confirmed = if status == StatusCode::OK {
            let confirmation: Confirmation = response
                .json()
                .await
                .map_err(|e| ArweaveError::InvalidResponse(format!("Bad status body: {}", e)))?;
            Some(confirmation)
        } else {
            None
        };

        Ok(TxStatus {
            status: status.as_u16(),
            confirmed,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::Path,
        http::StatusCode as AxumStatus,
        routing::{get, post},
        Json, Router,
    };

    use super::mock::MockGateway;
    use crate::arweave::merkle::MAX_CHUNK_SIZE;
    use crate::arweave::wallet::tests::test_wallet;

    async fn spawn_gateway() -> String {
        let app = Router::new()
            .route(
                "/wallet/:address/balance",
                get(|Path(address): Path<String>| async move {
                    if address == "known" {
                        "1500000000000".to_string()
                    } else {
                        "0".to_string()
                    }
                }),
            )
            .route("/tx_anchor", get(|| async { "AAAA" }))
            .route(
                "/price/:size",
                get(|Path(size): Path<u64>| async move { (size * 10).to_string() }),
            )
            .route(
                "/tx",
                post(|Json(tx): Json<serde_json::Value>| async move {
                    if tx["signature"] == "" {
                        (AxumStatus::BAD_REQUEST, "Transaction verification failed.")
                    } else {
                        (AxumStatus::OK, "OK")
                    }
                }),
            )
            .route(
                "/tx/:id/status",
                get(|Path(id): Path<String>| async move {
                    match id.as_str() {
                        "mined" => (
                            AxumStatus::OK,
                            Json(serde_json::json!({
                                "block_height": 1200000,
                                "block_indep_hash": "abc",
                                "number_of_confirmations": 4
                            })),
                        ),
                        "pending" => (AxumStatus::ACCEPTED, Json(serde_json::json!("Pending"))),
                        _ => (AxumStatus::NOT_FOUND, Json(serde_json::json!("Not Found"))),
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn gateway(base_url: String) -> HttpGateway {
        HttpGateway {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn tx_json(signature: &str) -> TransactionJson {
        TransactionJson {
            format: 2,
            id: "id".to_string(),
            last_tx: String::new(),
            owner: String::new(),
            tags: vec![],
            target: String::new(),
            quantity: "0".to_string(),
            data: String::new(),
            data_size: "0".to_string(),
            data_root: String::new(),
            reward: "0".to_string(),
            signature: signature.to_string(),
        }
    }

    #[tokio::test]
    async fn test_balance_and_price() {
        let gateway = gateway(spawn_gateway().await);

        assert_eq!(gateway.balance("known").await.unwrap(), 1_500_000_000_000);
        assert_eq!(gateway.balance("other").await.unwrap(), 0);
        assert_eq!(gateway.price(3).await.unwrap(), 30);
        assert_eq!(gateway.tx_anchor().await.unwrap(), vec![0, 0, 0]);
    }

    #[tokio::test]
    async fn test_post_transaction_status_handling() {
        let gateway = gateway(spawn_gateway().await);

        assert!(gateway.post_transaction(&tx_json("sig")).await.is_ok());
        assert!(matches!(
            gateway.post_transaction(&tx_json("")).await,
            Err(ArweaveError::UnexpectedStatus { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_status_codes() {
        let gateway = gateway(spawn_gateway().await);

        let mined = gateway.status("mined").await.unwrap();
        assert!(mined.is_confirmed());
        assert_eq!(mined.confirmed.unwrap().number_of_confirmations, 4);

        assert_eq!(gateway.status("pending").await.unwrap(), TxStatus::pending());
        assert_eq!(gateway.status("missing").await.unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_submit_small_payload_inline() {
        let wallet = test_wallet();
        let mut tx = Transaction::new(vec![1, 2, 3], vec![0; 32], 1, wallet.owner());
        tx.sign(&wallet).unwrap();

        let gateway = MockGateway::new();
        submit(&gateway, &tx).await.unwrap();

        let posted = gateway.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].data, "AQID");
        assert!(gateway.chunks.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_large_payload_in_chunks() {
        let wallet = test_wallet();
        let data = vec![7u8; MAX_CHUNK_SIZE * 2 + 1000];
        let mut tx = Transaction::new(data, vec![0; 32], 1, wallet.owner());
        tx.sign(&wallet).unwrap();

        let gateway = MockGateway::new();
        submit(&gateway, &tx).await.unwrap();

        let posted = gateway.posted();
        assert_eq!(posted.len(), 1);
        assert_eq!(posted[0].data, "");

        let chunks = gateway.chunks.lock().unwrap();
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.data_root == posted[0].data_root));
    }

    #[tokio::test]
    async fn test_submit_requires_signature() {
        let tx = Transaction::new(vec![1], vec![0; 32], 1, b"owner");
        let gateway = MockGateway::new();

        assert!(matches!(
            submit(&gateway, &tx).await,
            Err(ArweaveError::Signing(_))
        ));
        assert!(gateway.posted().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_gateway() {
        let gateway = gateway("http://127.0.0.1:1".to_string());
        assert!(matches!(
            gateway.balance("known").await,
            Err(ArweaveError::Http(_))
        ));
    }
}
