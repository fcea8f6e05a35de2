#![allow(dead_code)]

use nimbus_consensus::{Error, HeaderBackend, MemoryChain};
use nimbus_primitives::{
    extrinsics_root, ApiError, Block, CompatibleDigestItem, DigestItem, Header, IdentityLookup,
    MemoryKeystore, NimbusApi, NimbusId, NimbusPair, RuntimeDbWeight, H256, NIMBUS_KEY_ID,
};
use pallet_aura_style_filter::Pallet as AuraFilter;
use pallet_author_inherent::Pallet as AuthorInherent;
use std::sync::Arc;

pub struct Aura;

impl pallet_aura_style_filter::Config for Aura {
    type AccountId = NimbusId;
    type Authorities = Vec<NimbusId>;
}

/// Authors take turns by slot.
pub struct RoundRobin;

impl pallet_author_inherent::Config for RoundRobin {
    type AccountId = NimbusId;
    type AccountLookup = IdentityLookup;
    type CanAuthor = AuraFilter<Aura>;
    type EventHandler = ();
    type SlotBeacon = u32;
    type DbWeight = RuntimeDbWeight;
}

/// Anyone may author.
pub struct Open;

impl pallet_author_inherent::Config for Open {
    type AccountId = NimbusId;
    type AccountLookup = IdentityLookup;
    type CanAuthor = ();
    type EventHandler = ();
    type SlotBeacon = u32;
    type DbWeight = RuntimeDbWeight;
}

pub fn pairs() -> Vec<NimbusPair> {
    (1..=3u8).map(|i| NimbusPair::from_seed(&[i; 32])).collect()
}

pub fn authorities() -> Vec<NimbusId> {
    pairs().iter().map(NimbusPair::public).collect()
}

/// Keystore holding the authorities at `indices`.
pub fn keystore(indices: &[usize]) -> Arc<MemoryKeystore> {
    let keystore = MemoryKeystore::new();
    for &index in indices {
        keystore.insert(NIMBUS_KEY_ID, pairs()[index].clone());
    }
    Arc::new(keystore)
}

/// The chain together with runtime API access at its blocks.
pub struct TestClient<R: pallet_author_inherent::Config> {
    pub chain: MemoryChain,
    runtime: AuthorInherent<R>,
}

impl<R: pallet_author_inherent::Config> NimbusApi for TestClient<R> {
    fn can_author(&self, parent: &Header, author: &NimbusId, slot: u32) -> Result<bool, ApiError> {
        let parent_hash = parent.hash();
        if self.chain.block(parent_hash).is_none() {
            return Err(ApiError::UnknownBlock(parent_hash));
        }

        NimbusApi::can_author(&self.runtime, parent, author, slot)
    }
}

impl<R> HeaderBackend for TestClient<R>
where
    R: pallet_author_inherent::Config,
    AuthorInherent<R>: Send + Sync,
{
    fn header(&self, hash: H256) -> Result<Option<Header>, Error> {
        self.chain.header(hash)
    }
}

pub fn round_robin_client(chain: MemoryChain) -> Arc<TestClient<RoundRobin>> {
    Arc::new(TestClient {
        chain,
        runtime: AuthorInherent::new(
            IdentityLookup,
            AuraFilter::new(authorities()),
            (),
            0,
            RuntimeDbWeight::default(),
        ),
    })
}

pub fn open_client(chain: MemoryChain) -> Arc<TestClient<Open>> {
    Arc::new(TestClient {
        chain,
        runtime: AuthorInherent::new(IdentityLookup, (), (), 0, RuntimeDbWeight::default()),
    })
}

/// Empty block on top of `parent`, authored and sealed by `author`.
pub fn authored_block(parent: &Header, author: &NimbusPair) -> Block {
    let mut header = Header::new(
        parent.number + 1,
        extrinsics_root(&[]),
        parent.state_root,
        parent.hash(),
        Default::default(),
    );
    header
        .digest_mut()
        .push(DigestItem::nimbus_pre_digest(author.public()));

    let signature = author.sign(header.hash().as_bytes());
    header.digest_mut().push(DigestItem::nimbus_seal(signature));

    Block::new(header, Vec::new())
}

/// Author expected at `slot` by the round robin runtime.
pub fn round_robin_author(slot: u32) -> NimbusPair {
    pairs()[slot as usize % 3].clone()
}
