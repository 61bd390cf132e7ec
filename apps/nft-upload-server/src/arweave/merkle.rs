//! Merkle data root
//!
//! Splits a payload into chunks, builds the SHA-256 merkle tree whose root is
//! committed to by the transaction, and produces the per-chunk inclusion
//! proofs needed by `POST /chunk`.

use sha2::{Digest, Sha256};

/// Maximum chunk size: 256KB
pub const MAX_CHUNK_SIZE: usize = 256 * 1024;

/// Minimum size of a trailing chunk: 32KB
pub const MIN_CHUNK_SIZE: usize = 32 * 1024;

/// Byte offsets are hashed as 32-byte big-endian notes
const NOTE_SIZE: usize = 32;

/// A chunk of the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub data_hash: [u8; 32],
    pub min_byte_range: usize,
    pub max_byte_range: usize,
}

/// Inclusion proof for one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof {
    /// Offset of the chunk's last byte
    pub offset: usize,
    pub proof: Vec<u8>,
}

/// Chunk layout, data root and proofs of a payload
#[derive(Debug, Clone)]
pub struct ChunkedData {
    pub data_root: [u8; 32],
    pub chunks: Vec<Chunk>,
    pub proofs: Vec<Proof>,
}

enum Node {
    Leaf {
        id: [u8; 32],
        data_hash: [u8; 32],
        max_byte_range: usize,
    },
    Branch {
        id: [u8; 32],
        byte_range: usize,
        max_byte_range: usize,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn id(&self) -> &[u8; 32] {
        match self {
            Node::Leaf { id, .. } | Node::Branch { id, .. } => id,
        }
    }

    fn max_byte_range(&self) -> usize {
        match self {
            Node::Leaf { max_byte_range, .. } | Node::Branch { max_byte_range, .. } => {
                *max_byte_range
            }
        }
    }
}

fn sha256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

fn note(value: usize) -> [u8; NOTE_SIZE] {
    let mut buf = [0u8; NOTE_SIZE];
    let bytes = (value as u64).to_be_bytes();
    buf[NOTE_SIZE - bytes.len()..].copy_from_slice(&bytes);
    buf
}

/// Split data into chunks
///
/// Chunks are `MAX_CHUNK_SIZE` long, except that a trailing remainder smaller
/// than `MIN_CHUNK_SIZE` is avoided by splitting the last two chunks evenly.
pub fn chunk_data(data: &[u8]) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut rest = data;
    let mut cursor = 0;

    while rest.len() >= MAX_CHUNK_SIZE {
        let mut chunk_size = MAX_CHUNK_SIZE;
        let next_chunk_size = rest.len() - MAX_CHUNK_SIZE;
        if next_chunk_size > 0 && next_chunk_size < MIN_CHUNK_SIZE {
            chunk_size = rest.len().div_ceil(2);
        }

        let (chunk, tail) = rest.split_at(chunk_size);
        chunks.push(Chunk {
            data_hash: sha256(&[chunk]),
            min_byte_range: cursor,
            max_byte_range: cursor + chunk.len(),
        });
        cursor += chunk.len();
        rest = tail;
    }

    chunks.push(Chunk {
        data_hash: sha256(&[rest]),
        min_byte_range: cursor,
        max_byte_range: cursor + rest.len(),
    });

    chunks
}

fn leaves(chunks: &[Chunk]) -> Vec<Node> {
    chunks
        .iter()
        .map(|chunk| Node::Leaf {
            id: sha256(&[
                &sha256(&[&chunk.data_hash]),
                &sha256(&[&note(chunk.max_byte_range)]),
            ]),
            data_hash: chunk.data_hash,
            max_byte_range: chunk.max_byte_range,
        })
        .collect()
}

fn branch(left: Node, right: Node) -> Node {
    let byte_range = left.max_byte_range();
    Node::Branch {
        id: sha256(&[
            &sha256(&[left.id()]),
            &sha256(&[right.id()]),
            &sha256(&[&note(byte_range)]),
        ]),
        byte_range,
        max_byte_range: right.max_byte_range(),
        left: Box::new(left),
        right: Box::new(right),
    }
}

fn build_layers(mut nodes: Vec<Node>) -> Option<Node> {
    while nodes.len() > 1 {
        let mut next = Vec::with_capacity(nodes.len().div_ceil(2));
        let mut iter = nodes.into_iter();
        while let Some(left) = iter.next() {
            match iter.next() {
                Some(right) => next.push(branch(left, right)),
                None => next.push(left),
            }
        }
        nodes = next;
    }
    nodes.pop()
}

fn resolve_proofs(node: &Node, prefix: Vec<u8>, proofs: &mut Vec<Proof>) {
    match node {
        Node::Leaf {
            data_hash,
            max_byte_range,
            ..
        } => {
            let mut proof = prefix;
            proof.extend_from_slice(data_hash);
            proof.extend_from_slice(&note(*max_byte_range));
            proofs.push(Proof {
                offset: max_byte_range.saturating_sub(1),
                proof,
            });
        }
        Node::Branch {
            byte_range,
            left,
            right,
            ..
        } => {
            let mut partial = prefix;
            partial.extend_from_slice(left.id());
            partial.extend_from_slice(right.id());
            partial.extend_from_slice(&note(*byte_range));
            resolve_proofs(left, partial.clone(), proofs);
            resolve_proofs(right, partial, proofs);
        }
    }
}

/// Chunk a payload and compute its data root and chunk proofs
///
/// An empty trailing chunk still contributes to the root but is not uploaded.
pub fn generate_chunks(data: &[u8]) -> ChunkedData {
    let mut chunks = chunk_data(data);
    let root = build_layers(leaves(&chunks));

    let mut proofs = Vec::with_capacity(chunks.len());
    let data_root = match root {
        Some(root) => {
            resolve_proofs(&root, Vec::new(), &mut proofs);
            *root.id()
        }
        None => [0u8; 32],
    };

    if chunks
        .last()
        .is_some_and(|last| last.max_byte_range == last.min_byte_range)
        && chunks.len() > 1
    {
        chunks.pop();
        proofs.pop();
    }

    ChunkedData {
        data_root,
        chunks,
        proofs,
    }
}
