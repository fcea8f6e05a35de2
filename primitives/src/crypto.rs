//! Author keys and seal signatures.

use core::fmt;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a raw `NimbusId`.
pub const PUBLIC_LENGTH: usize = 32;
/// Length of a raw `NimbusSignature`.
pub const SIGNATURE_LENGTH: usize = 64;

/// Errors when handling raw key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid length {got}, expected {expected}")]
    InvalidLength { got: usize, expected: usize },
    #[error("invalid signature bytes")]
    InvalidSignature,
}

/// Public identity of a block author.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NimbusId([u8; PUBLIC_LENGTH]);

impl NimbusId {
    /// Parse from a byte slice of exactly `PUBLIC_LENGTH` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; PUBLIC_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidLength {
                got: bytes.len(),
                expected: PUBLIC_LENGTH,
            })?;

        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_LENGTH] {
        &self.0
    }

    /// Verify `signature` over `message` with this key.
    ///
    /// Keys that are not valid curve points never verify.
    pub fn verify(&self, message: &[u8], signature: &NimbusSignature) -> bool {
        match VerifyingKey::from_bytes(&self.0) {
            Ok(key) => key.verify(message, &signature.0).is_ok(),
            Err(_) => false,
        }
    }
}

impl AsRef<[u8]> for NimbusId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NimbusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NimbusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NimbusId({})", self)
    }
}

/// Signature placed in a nimbus seal.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct NimbusSignature(Signature);

impl NimbusSignature {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidLength {
                got: bytes.len(),
                expected: SIGNATURE_LENGTH,
            });
        }

        Signature::from_slice(bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        self.0.to_bytes()
    }
}

/// A nimbus signing key.
#[derive(Clone)]
pub struct NimbusPair {
    signing_key: SigningKey,
}

impl NimbusPair {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Deterministic key from a 32-byte seed. Used for dev chains and tests.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    pub fn public(&self) -> NimbusId {
        NimbusId(self.signing_key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> NimbusSignature {
        NimbusSignature(self.signing_key.sign(message))
    }
}

impl fmt::Debug for NimbusPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NimbusPair")
            .field("public", &self.public())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_verifies_only_for_signer_and_message() {
        let alice = NimbusPair::from_seed(&[1; 32]);
        let bob = NimbusPair::from_seed(&[2; 32]);
        let signature = alice.sign(b"header hash");

        assert!(alice.public().verify(b"header hash", &signature));
        assert!(!alice.public().verify(b"other hash", &signature));
        assert!(!bob.public().verify(b"header hash", &signature));
    }

    #[test]
    fn from_slice_rejects_wrong_length() {
        assert_eq!(
            NimbusId::from_slice(&[0u8; 31]),
            Err(CryptoError::InvalidLength {
                got: 31,
                expected: PUBLIC_LENGTH
            })
        );

        let id = NimbusPair::from_seed(&[7; 32]).public();
        assert_eq!(NimbusId::from_slice(id.as_ref()), Ok(id));
    }

    #[test]
    fn signature_bytes_roundtrip() {
        let pair = NimbusPair::generate();
        let signature = pair.sign(b"payload");
        let parsed = NimbusSignature::from_slice(&signature.to_bytes()).unwrap();

        assert_eq!(parsed, signature);
        assert!(NimbusSignature::from_slice(&[0u8; 10]).is_err());
    }
}
