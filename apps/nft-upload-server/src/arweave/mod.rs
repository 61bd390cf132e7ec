//! Arweave Module
//!
//! Client side of the Arweave storage network: wallets, transaction
//! construction and signing, and gateway access.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nft_upload_server::arweave::{submit, HttpGateway, Transaction, Wallet};
//!
//! let wallet = Wallet::from_json(&keyfile)?;
//! let gateway = HttpGateway::new(&config.arweave)?;
//!
//! let anchor = gateway.tx_anchor().await?;
//! let reward = gateway.price(data.len()).await?;
//!
//! let mut tx = Transaction::new(data, anchor, reward, wallet.owner());
//! tx.add_tag("Content-Type", "image/png");
//! tx.sign(&wallet)?;
//! submit(&gateway, &tx).await?;
//! ```

mod deep_hash;
mod gateway;
mod merkle;
mod transaction;
mod types;
mod wallet;

pub use deep_hash::{deep_hash, DeepHashItem};
pub use gateway::{submit, Gateway, HttpGateway, MAX_CHUNKS_IN_BODY};
pub use merkle::{generate_chunks, Chunk, ChunkedData, Proof, MAX_CHUNK_SIZE, MIN_CHUNK_SIZE};
pub use transaction::Transaction;
pub use types::{
    b64url_decode, b64url_encode, ArweaveError, ChunkJson, Confirmation, Tag, TransactionJson,
    TxStatus, Winston,
};
pub use wallet::{Jwk, Wallet};

#[cfg(test)]
pub(crate) use gateway::mock::MockGateway;
#[cfg(test)]
pub(crate) use wallet::tests::test_wallet;
