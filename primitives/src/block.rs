use core::fmt;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::digests::Digest;

/// A block or a header that is identified. That is, it contains a hash, and
/// reference a parent via a parent hash.
///
/// The hash of a block is unique.
pub trait Identified {
    /// Identifier type.
    type Identifier;

    /// Get the block hash.
    fn id(&self) -> Self::Identifier;
    /// Get the parent block hash. None if this block is genesis.
    fn parent_id(&self) -> Option<Self::Identifier>;
}

/// 256-bit hash.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct H256(pub [u8; 32]);

impl H256 {
    pub const fn zero() -> Self {
        Self([0; 32])
    }

    /// SHA-256 of `data`.
    pub fn hash_of(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_fixed_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl AsRef<[u8]> for H256 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form, the way block hashes show up in logs.
        let encoded = hex::encode(self.0);
        write!(f, "0x{}…{}", &encoded[..4], &encoded[60..])
    }
}

/// Opaque extrinsic.
pub type Extrinsic = Vec<u8>;

/// Block header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: H256,
    pub number: u32,
    pub state_root: H256,
    pub extrinsics_root: H256,
    pub digest: Digest,
}

impl Header {
    pub fn new(
        number: u32,
        extrinsics_root: H256,
        state_root: H256,
        parent_hash: H256,
        digest: Digest,
    ) -> Self {
        Self {
            parent_hash,
            number,
            state_root,
            extrinsics_root,
            digest,
        }
    }

    /// Hash of the canonical encoding. Covers the digest, so sealing a
    /// header changes its hash.
    pub fn hash(&self) -> H256 {
        let encoded = bincode::serialize(self)
            .expect("header of integers, arrays and vectors always encodes; qed");
        H256::hash_of(&encoded)
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn digest_mut(&mut self) -> &mut Digest {
        &mut self.digest
    }
}

impl Identified for Header {
    type Identifier = H256;

    fn id(&self) -> H256 {
        self.hash()
    }

    fn parent_id(&self) -> Option<H256> {
        if self.number == 0 {
            None
        } else {
            Some(self.parent_hash)
        }
    }
}

/// A header together with its extrinsics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub extrinsics: Vec<Extrinsic>,
}

impl Block {
    pub fn new(header: Header, extrinsics: Vec<Extrinsic>) -> Self {
        Self { header, extrinsics }
    }

    pub fn deconstruct(self) -> (Header, Vec<Extrinsic>) {
        (self.header, self.extrinsics)
    }

    pub fn hash(&self) -> H256 {
        self.header.hash()
    }
}

impl Identified for Block {
    type Identifier = H256;

    fn id(&self) -> H256 {
        self.header.id()
    }

    fn parent_id(&self) -> Option<H256> {
        self.header.parent_id()
    }
}

/// Root committing to a list of extrinsics.
pub fn extrinsics_root(extrinsics: &[Extrinsic]) -> H256 {
    let encoded = bincode::serialize(extrinsics)
        .expect("a list of byte vectors always encodes; qed");
    H256::hash_of(&encoded)
}
