//! Deep hash
//!
//! Recursive SHA-384 hash over nested byte lists. This is the message that
//! gets signed for a transaction.

use sha2::{Digest, Sha384};

/// Input to the deep hash: a byte blob or a list of nested items
#[derive(Debug, Clone)]
pub enum DeepHashItem {
    Blob(Vec<u8>),
    List(Vec<DeepHashItem>),
}

impl DeepHashItem {
    pub fn blob(data: impl AsRef<[u8]>) -> Self {
        Self::Blob(data.as_ref().to_vec())
    }
}

fn sha384(parts: &[&[u8]]) -> [u8; 48] {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Compute the deep hash of an item
pub fn deep_hash(item: &DeepHashItem) -> [u8; 48] {
    match item {
        DeepHashItem::Blob(data) => {
            let tag = format!("blob{}", data.len());
            sha384(&[&sha384(&[tag.as_bytes()]), &sha384(&[data])])
        }
        DeepHashItem::List(items) => {
            let tag = format!("list{}", items.len());
            items.iter().fold(sha384(&[tag.as_bytes()]), |acc, item| {
                sha384(&[&acc, &deep_hash(item)])
            })
        }
    }
}
