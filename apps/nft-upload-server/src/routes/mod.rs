//! Route modules for NFT Upload Server

pub mod health;
pub mod upload;
