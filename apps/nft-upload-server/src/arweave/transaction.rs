//! Transaction building and signing
//!
//! Builds format 2 data transactions. The signature covers the deep hash of
//! the transaction fields and the transaction id is the SHA-256 of the
//! signature.

use sha2::{Digest, Sha256};

use super::deep_hash::{deep_hash, DeepHashItem};
use super::merkle::{generate_chunks, ChunkedData};
use super::types::{b64url_encode, ArweaveError, ChunkJson, Tag, TransactionJson, Winston};
use super::wallet::Wallet;

/// Data transaction under construction
#[derive(Debug, Clone)]
pub struct Transaction {
    pub last_tx: Vec<u8>,
    pub owner: Vec<u8>,
    pub tags: Vec<Tag>,
    pub reward: Winston,
    pub data: Vec<u8>,
    pub chunks: Option<ChunkedData>,
    pub id: Vec<u8>,
    pub signature: Vec<u8>,
}

impl Transaction {
    /// Create an unsigned transaction carrying `data`
    ///
    /// `last_tx` is the anchor from `GET /tx_anchor` and `reward` the price
    /// from `GET /price/{size}`.
    pub fn new(data: Vec<u8>, last_tx: Vec<u8>, reward: Winston, owner: &[u8]) -> Self {
        let chunks = if data.is_empty() {
            None
        } else {
            Some(generate_chunks(&data))
        };

        Self {
            last_tx,
            owner: owner.to_vec(),
            tags: Vec::new(),
            reward,
            data,
            chunks,
            id: Vec::new(),
            signature: Vec::new(),
        }
    }

    pub fn add_tag(&mut self, name: &str, value: &str) {
        self.tags.push(Tag::new(name, value));
    }

    pub fn data_size(&self) -> usize {
        self.data.len()
    }

    pub fn data_root(&self) -> &[u8] {
        self.chunks
            .as_ref()
            .map(|c| c.data_root.as_slice())
            .unwrap_or_default()
    }

    /// Id as a base64url string; empty until signed
    pub fn id(&self) -> String {
        b64url_encode(&self.id)
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Message covered by the signature
    pub fn signature_data(&self) -> [u8; 48] {
        let tags = self
            .tags
            .iter()
            .map(|tag| {
                DeepHashItem::List(vec![
                    DeepHashItem::blob(tag.name.as_bytes()),
                    DeepHashItem::blob(tag.value.as_bytes()),
                ])
            })
            .collect();

        deep_hash(&DeepHashItem::List(vec![
            DeepHashItem::blob(b"2"),
            DeepHashItem::blob(&self.owner),
            DeepHashItem::Blob(Vec::new()),
            DeepHashItem::blob(b"0"),
            DeepHashItem::blob(self.reward.to_string()),
            DeepHashItem::blob(&self.last_tx),
            DeepHashItem::List(tags),
            DeepHashItem::blob(self.data_size().to_string()),
            DeepHashItem::blob(self.data_root()),
        ]))
    }

    /// Sign with the wallet and derive the id
    pub fn sign(&mut self, wallet: &Wallet) -> Result<(), ArweaveError> {
        if wallet.owner() != self.owner.as_slice() {
            return Err(ArweaveError::Signing(
                "Transaction owner does not match signing wallet".to_string(),
            ));
        }

        let signature = wallet.sign(&self.signature_data())?;
        self.id = Sha256::digest(&signature).to_vec();
        self.signature = signature;
        Ok(())
    }

    /// Serialize for `POST /tx`, with or without the data inlined
    pub fn to_json(&self, include_data: bool) -> TransactionJson {
        TransactionJson {
            format: 2,
            id: self.id(),
            last_tx: b64url_encode(&self.last_tx),
            owner: b64url_encode(&self.owner),
            tags: self.tags.iter().map(Into::into).collect(),
            target: String::new(),
            quantity: "0".to_string(),
            data: if include_data {
                b64url_encode(&self.data)
            } else {
                String::new()
            },
            data_size: self.data_size().to_string(),
            data_root: b64url_encode(self.data_root()),
            reward: self.reward.to_string(),
            signature: b64url_encode(&self.signature),
        }
    }

    /// Number of chunks the payload is split into
    pub fn chunk_count(&self) -> usize {
        self.chunks.as_ref().map(|c| c.chunks.len()).unwrap_or(0)
    }

    /// Body for uploading chunk `index` to `POST /chunk`
    pub fn chunk_json(&self, index: usize) -> Option<ChunkJson> {
        let chunked = self.chunks.as_ref()?;
        let chunk = chunked.chunks.get(index)?;
        let proof = chunked.proofs.get(index)?;

        Some(ChunkJson {
            data_root: b64url_encode(&chunked.data_root),
            data_size: self.data_size().to_string(),
            data_path: b64url_encode(&proof.proof),
            offset: proof.offset.to_string(),
            chunk: b64url_encode(&self.data[chunk.min_byte_range..chunk.max_byte_range]),
        })
    }
}
