//! Seams between the nimbus pallets, the runtime and the node.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::{DigestItem, Header, NimbusId, H256};

/// Source of the current slot inside the runtime.
///
/// Nimbus does not dictate what a slot is. A solo chain may use the block
/// number, a parachain the relay parent number.
pub trait SlotBeacon {
    fn slot(&self) -> u32;
}

impl SlotBeacon for u32 {
    fn slot(&self) -> u32 {
        *self
    }
}

/// Whether an account may author at a slot.
///
/// Filters implement this and can be chained by the runtime.
pub trait CanAuthor<AccountId> {
    fn can_author(&self, author: &AccountId, slot: u32) -> bool;
}

/// Everyone may author.
impl<AccountId> CanAuthor<AccountId> for () {
    fn can_author(&self, _: &AccountId, _: u32) -> bool {
        true
    }
}

/// Map the author id found in a digest to a runtime account.
pub trait AccountLookup<AccountId> {
    fn lookup_account(&self, author: &NimbusId) -> Option<AccountId>;
}

impl<AccountId: Clone> AccountLookup<AccountId> for BTreeMap<NimbusId, AccountId> {
    fn lookup_account(&self, author: &NimbusId) -> Option<AccountId> {
        self.get(author).cloned()
    }
}

/// Accounts are nimbus ids.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityLookup;

impl AccountLookup<NimbusId> for IdentityLookup {
    fn lookup_account(&self, author: &NimbusId) -> Option<NimbusId> {
        Some(*author)
    }
}

/// Notified once the author of a block has been validated.
pub trait EventHandler<Author> {
    fn note_author(&self, author: Author);
}

impl<Author> EventHandler<Author> for () {
    fn note_author(&self, _: Author) {}
}

/// On-chain randomness beacon.
pub trait Randomness {
    /// Random value for `subject`, and the block number since which it has
    /// been known.
    fn random(&self, subject: &[u8]) -> (H256, u32);
}

/// Value provider.
pub trait Get<T> {
    fn get(&self) -> T;
}

impl<T: Clone> Get<T> for T {
    fn get(&self) -> T {
        self.clone()
    }
}

/// Extra digests a node appends to blocks it authors.
pub trait DigestsProvider<Id, BlockHash> {
    type Digests: IntoIterator<Item = DigestItem>;

    fn provide_digests(&self, id: Id, parent: BlockHash) -> Self::Digests;
}

impl<Id, BlockHash> DigestsProvider<Id, BlockHash> for () {
    type Digests = [DigestItem; 0];

    fn provide_digests(&self, _: Id, _: BlockHash) -> Self::Digests {
        []
    }
}

impl<F, Id, BlockHash> DigestsProvider<Id, BlockHash> for F
where
    F: Fn(Id, BlockHash) -> Vec<DigestItem>,
{
    type Digests = Vec<DigestItem>;

    fn provide_digests(&self, id: Id, parent: BlockHash) -> Self::Digests {
        self(id, parent)
    }
}

/// Error calling into the runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("unknown block {0}")]
    UnknownBlock(H256),
    #[error("runtime call failed: {0}")]
    Application(String),
}

/// Runtime API consulted by the node before authoring.
pub trait NimbusApi {
    /// Whether `author` may author a child of `parent` at `slot`.
    fn can_author(&self, parent: &Header, author: &NimbusId, slot: u32) -> Result<bool, ApiError>;
}

impl<T: NimbusApi + ?Sized> NimbusApi for std::sync::Arc<T> {
    fn can_author(&self, parent: &Header, author: &NimbusId, slot: u32) -> Result<bool, ApiError> {
        (**self).can_author(parent, author, slot)
    }
}

/// Randomness derived by hashing a fixed seed together with the subject.
///
/// Suitable for dev chains and tests; a live chain feeds the filter from a
/// beacon the author cannot bias.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashRandomness {
    pub seed: H256,
    pub known_since: u32,
}

impl HashRandomness {
    pub fn new(seed: H256) -> Self {
        Self {
            seed,
            known_since: 0,
        }
    }
}

impl Randomness for HashRandomness {
    fn random(&self, subject: &[u8]) -> (H256, u32) {
        let mut data = self.seed.as_bytes().to_vec();
        data.extend_from_slice(subject);

        (H256::hash_of(&data), self.known_since)
    }
}
