//! Wallet handling
//!
//! Loads an RSA JSON Web Key, derives the wallet address and signs
//! transaction messages with RSA-PSS.

use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::{BigUint, RsaPrivateKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::types::{b64url_decode, b64url_encode, ArweaveError};

/// RSA private key in JWK form, as exported by Arweave wallets
#[derive(Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub n: String,
    pub e: String,
    pub d: String,
    pub p: String,
    pub q: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dq: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qi: Option<String>,
}

impl std::fmt::Debug for Jwk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jwk")
            .field("kty", &self.kty)
            .field("n", &self.n)
            .field("e", &self.e)
            .finish_non_exhaustive()
    }
}

impl Jwk {
    /// Export a private key
    pub fn from_private_key(key: &RsaPrivateKey) -> Self {
        let encode = |n: &BigUint| b64url_encode(&n.to_bytes_be());
        let primes = key.primes();

        Self {
            kty: "RSA".to_string(),
            n: encode(key.n()),
            e: encode(key.e()),
            d: encode(key.d()),
            p: encode(&primes[0]),
            q: encode(&primes[1]),
            dp: key.dp().map(encode),
            dq: key.dq().map(encode),
            qi: None,
        }
    }
}

fn component(name: &str, value: &str) -> Result<BigUint, ArweaveError> {
    let bytes = b64url_decode(value)
        .map_err(|_| ArweaveError::InvalidKey(format!("Component '{}' is not base64url", name)))?;
    Ok(BigUint::from_bytes_be(&bytes))
}

/// Wallet used to own and sign transactions
#[derive(Clone)]
pub struct Wallet {
    key: RsaPrivateKey,
    owner: Vec<u8>,
    address: String,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl Wallet {
    /// Build a wallet from a JWK
    pub fn from_jwk(jwk: &Jwk) -> Result<Self, ArweaveError> {
        if jwk.kty != "RSA" {
            return Err(ArweaveError::InvalidKey(format!(
                "Unsupported key type: {}",
                jwk.kty
            )));
        }

        let key = RsaPrivateKey::from_components(
            component("n", &jwk.n)?,
            component("e", &jwk.e)?,
            component("d", &jwk.d)?,
            vec![component("p", &jwk.p)?, component("q", &jwk.q)?],
        )
        .map_err(|e| ArweaveError::InvalidKey(e.to_string()))?;

        key.validate()
            .map_err(|e| ArweaveError::InvalidKey(e.to_string()))?;

        Ok(Self::from_private_key(key))
    }

    /// Parse a wallet from the JSON text of a keyfile
    pub fn from_json(json: &str) -> Result<Self, ArweaveError> {
        let jwk: Jwk = serde_json::from_str(json)
            .map_err(|e| ArweaveError::InvalidKey(format!("Malformed JWK: {}", e)))?;
        Self::from_jwk(&jwk)
    }

    pub fn from_private_key(key: RsaPrivateKey) -> Self {
        let owner = key.n().to_bytes_be();
        let address = b64url_encode(&Sha256::digest(&owner));
        Self {
            key,
            owner,
            address,
        }
    }

    /// Wallet address: base64url SHA-256 of the public modulus
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Public modulus, the transaction `owner` field
    pub fn owner(&self) -> &[u8] {
        &self.owner
    }

    /// Sign a message with RSA-PSS (SHA-256, 32-byte salt)
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, ArweaveError> {
        let signing_key = BlindedSigningKey::<Sha256>::new(self.key.clone());
        let signature = signing_key
            .try_sign_with_rng(&mut rand::thread_rng(), message)
            .map_err(|e| ArweaveError::Signing(e.to_string()))?;
        Ok(signature.to_vec())
    }

    #[cfg(test)]
    pub(crate) fn public_key(&self) -> rsa::RsaPublicKey {
        self.key.to_public_key()
    }

    #[cfg(test)]
    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.key
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rsa::pss::{Signature, VerifyingKey};
    use rsa::signature::Verifier;

    /// Small key so tests stay fast
    pub(crate) fn test_wallet() -> Wallet {
        let key = RsaPrivateKey::new(&mut rand::thread_rng(), 1024).unwrap();
        Wallet::from_private_key(key)
    }

    #[test]
    fn test_jwk_round_trip_keeps_address() {
        let wallet = test_wallet();
        let jwk = Jwk::from_private_key(&wallet.key);
        let json = serde_json::to_string(&jwk).unwrap();

        let loaded = Wallet::from_json(&json).unwrap();
        assert_eq!(loaded.address(), wallet.address());
        assert_eq!(loaded.owner(), wallet.owner());
    }

    #[test]
    fn test_address_is_hash_of_modulus() {
        let wallet = test_wallet();
        let expected = b64url_encode(&Sha256::digest(wallet.owner()));

        assert_eq!(wallet.address(), expected);
        assert_eq!(wallet.address().len(), 43);
    }

    #[test]
    fn test_rejects_non_rsa_key() {
        let wallet = test_wallet();
        let mut jwk = Jwk::from_private_key(&wallet.key);
        jwk.kty = "EC".to_string();

        assert!(matches!(
            Wallet::from_jwk(&jwk),
            Err(ArweaveError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Wallet::from_json("{\"kty\":\"RSA\"}"),
            Err(ArweaveError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_signature_verifies() {
        let wallet = test_wallet();
        let signature = wallet.sign(b"message").unwrap();

        let verifying_key = VerifyingKey::<Sha256>::new(wallet.public_key());
        let signature = Signature::try_from(signature.as_slice()).unwrap();
        assert!(verifying_key.verify(b"message", &signature).is_ok());
        assert!(verifying_key.verify(b"other", &signature).is_err());
    }
}
