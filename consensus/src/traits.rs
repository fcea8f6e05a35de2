//! Seams between the consensus engine and the rest of the node.

use async_trait::async_trait;
use nimbus_primitives::{
    Block, Digest, DigestItem, Extrinsic, Header, InherentData, InherentDataProvider, H256,
};
use std::{sync::Arc, time::Duration};

use crate::Error;

/// Where a block being imported comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockOrigin {
    Genesis,
    NetworkInitialSync,
    NetworkBroadcast,
    /// Authored by this node.
    Own,
    File,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForkChoiceStrategy {
    /// The block becomes best if it is deeper than the current best.
    LongestChain,
    /// The importer decided: `true` makes the block best.
    Custom(bool),
}

/// A block on its way into the chain.
///
/// `header` is the pre-header the block was signed over; digests produced
/// by consensus, such as the seal, sit in `post_digests` and are appended
/// to form the header that is stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockImportParams {
    pub origin: BlockOrigin,
    pub header: Header,
    pub body: Option<Vec<Extrinsic>>,
    pub post_digests: Vec<DigestItem>,
    pub fork_choice: Option<ForkChoiceStrategy>,
    pub finalized: bool,
}

impl BlockImportParams {
    pub fn new(origin: BlockOrigin, header: Header) -> Self {
        Self {
            origin,
            header,
            body: None,
            post_digests: Vec::new(),
            fork_choice: None,
            finalized: false,
        }
    }

    /// Header with the post digests appended.
    pub fn post_header(&self) -> Header {
        let mut header = self.header.clone();
        for item in &self.post_digests {
            header.digest_mut().push(item.clone());
        }
        header
    }

    pub fn post_hash(&self) -> H256 {
        self.post_header().hash()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportResult {
    Imported { is_new_best: bool },
    AlreadyInChain,
}

/// Something blocks can be imported into.
#[async_trait]
pub trait BlockImport: Send {
    async fn import_block(&mut self, params: BlockImportParams) -> Result<ImportResult, Error>;
}

/// Factory of proposers.
#[async_trait]
pub trait Environment: Send {
    type Proposer: Proposer;

    /// A proposer building on top of `parent`.
    async fn init(&mut self, parent: &Header) -> Result<Self::Proposer, Error>;
}

pub struct Proposal {
    pub block: Block,
}

/// Builds one block.
#[async_trait]
pub trait Proposer: Send {
    /// Build a block carrying `inherent_digests` in its header. The block
    /// is not sealed.
    async fn propose(
        self,
        inherent_data: InherentData,
        inherent_digests: Digest,
        max_duration: Duration,
        block_size_limit: Option<usize>,
    ) -> Result<Proposal, Error>;
}

/// Picks the chain head to build on.
#[async_trait]
pub trait SelectChain: Send + Sync {
    async fn best_chain(&self) -> Result<Header, Error>;
}

pub trait SyncOracle {
    fn is_major_syncing(&self) -> bool;
}

/// Sync oracle of a node without network. Never syncing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoNetwork;

impl SyncOracle for NoNetwork {
    fn is_major_syncing(&self) -> bool {
        false
    }
}

impl<T: SyncOracle + ?Sized> SyncOracle for Arc<T> {
    fn is_major_syncing(&self) -> bool {
        (**self).is_major_syncing()
    }
}

/// Read access to stored headers.
pub trait HeaderBackend: Send + Sync {
    fn header(&self, hash: H256) -> Result<Option<Header>, Error>;
}

impl<T: HeaderBackend + ?Sized> HeaderBackend for Arc<T> {
    fn header(&self, hash: H256) -> Result<Option<Header>, Error> {
        (**self).header(hash)
    }
}

/// Creates the inherent data providers for a block on top of `parent`.
#[async_trait]
pub trait CreateInherentDataProviders: Send + Sync {
    type InherentDataProviders: InherentDataProvider + Send;

    async fn create_inherent_data_providers(
        &self,
        parent: H256,
        slot: u32,
    ) -> Result<Self::InherentDataProviders, Error>;
}

#[async_trait]
impl<F, P> CreateInherentDataProviders for F
where
    F: Fn(H256, u32) -> Result<P, Error> + Send + Sync,
    P: InherentDataProvider + Send,
{
    type InherentDataProviders = P;

    async fn create_inherent_data_providers(
        &self,
        parent: H256,
        slot: u32,
    ) -> Result<P, Error> {
        self(parent, slot)
    }
}
