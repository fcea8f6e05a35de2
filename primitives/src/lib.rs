//! Nimbus consensus primitives.
//!
//! Nimbus is a framework for filtering authors. The runtime decides who may
//! author at a slot by running the set of potential authors through one or
//! more filters; the node asks the runtime whether any of its keys passed,
//! and seals the blocks it authors with that key.
//!
//! This crate holds what both sides share: author keys, digests, the block
//! model, and the traits at the seams between filters, pallets and the node.

mod block;
mod chain;
mod crypto;
pub mod digests;
mod dispatch;
pub mod inherents;
pub mod keystore;
pub mod metadata;
mod seal;
pub mod storage;
mod traits;

pub use crate::block::{extrinsics_root, Block, Extrinsic, Header, Identified, H256};
pub use crate::chain::{ExecuteBlock, OnRuntimeUpgrade};
pub use crate::crypto::{CryptoError, NimbusId, NimbusPair, NimbusSignature};
pub use crate::digests::{CompatibleDigestItem, ConsensusEngineId, Digest, DigestItem};
pub use crate::dispatch::{
    ensure_none, ensure_root, ensure_signed, DispatchClass, DispatchError, DispatchInfo,
    DispatchResult, GetDispatchInfo, Origin, Pays, Percent, RuntimeDbWeight, Weight,
};
pub use crate::inherents::{
    InherentData, InherentDataProvider, InherentError, InherentIdentifier, SlotInherentProvider,
};
pub use crate::keystore::{KeyTypeId, Keystore, KeystoreError, MemoryKeystore};
pub use crate::metadata::{TypeDescriptor, TypeInfo, TypeKind};
pub use crate::seal::{check_and_strip_seal, SealError};
pub use crate::storage::{MemoryStorage, Storage, StorageError};
pub use crate::traits::{
    AccountLookup, ApiError, CanAuthor, DigestsProvider, EventHandler, Get, HashRandomness,
    IdentityLookup, NimbusApi, Randomness, SlotBeacon,
};

/// Engine id tagging every nimbus digest.
pub const NIMBUS_ENGINE_ID: ConsensusEngineId = *b"nmbs";

/// The key type of nimbus author keys in a keystore.
pub const NIMBUS_KEY_ID: KeyTypeId = *b"nmbs";
