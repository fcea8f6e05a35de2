//! A chain that resides entirely in memory. Useful for testing and for the
//! development node.

use async_trait::async_trait;
use nimbus_primitives::{
    extrinsics_root, Block, Digest, Extrinsic, Header, Identified, InherentData, H256,
};
use parking_lot::RwLock;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tracing::{debug, trace};

use crate::{
    BlockImport, BlockImportParams, Environment, Error, ForkChoiceStrategy, HeaderBackend,
    ImportResult, Proposal, Proposer, SelectChain,
};

const LOG_TARGET: &str = "memory-chain";

#[derive(Clone, Debug)]
struct MemoryChainItem {
    block: Block,
    depth: u32,
    children: Vec<H256>,
}

struct Inner {
    blocks: HashMap<H256, MemoryChainItem>,
    depths: HashMap<u32, Vec<H256>>,
    best: H256,
    pending: Vec<Extrinsic>,
}

/// Fork tree of stored blocks with a best-block pointer and a pool of
/// pending extrinsics. Clones share the same chain.
///
/// Proposing leaves the pool untouched; extrinsics leave it once a block
/// including them is imported.
///
/// Blocks are stored with their post header, so they are keyed by the hash
/// of the sealed header.
#[derive(Clone)]
pub struct MemoryChain {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryChain {
    pub fn new(genesis: Header) -> Self {
        let genesis = Block::new(genesis, Vec::new());
        let genesis_hash = genesis.id();

        let mut blocks = HashMap::new();
        blocks.insert(
            genesis_hash,
            MemoryChainItem {
                block: genesis,
                depth: 0,
                children: Vec::new(),
            },
        );
        let mut depths = HashMap::new();
        depths.insert(0, vec![genesis_hash]);

        Self {
            inner: Arc::new(RwLock::new(Inner {
                blocks,
                depths,
                best: genesis_hash,
                pending: Vec::new(),
            })),
        }
    }

    pub fn genesis_hash(&self) -> H256 {
        let inner = self.inner.read();
        inner.depths[&0][0]
    }

    pub fn best_hash(&self) -> H256 {
        self.inner.read().best
    }

    pub fn best_header(&self) -> Header {
        let inner = self.inner.read();
        inner.blocks[&inner.best].block.header.clone()
    }

    pub fn block(&self, hash: H256) -> Option<Block> {
        self.inner.read().blocks.get(&hash).map(|item| item.block.clone())
    }

    pub fn block_depth(&self, hash: H256) -> Option<u32> {
        self.inner.read().blocks.get(&hash).map(|item| item.depth)
    }

    pub fn children(&self, hash: H256) -> Vec<H256> {
        self.inner
            .read()
            .blocks
            .get(&hash)
            .map(|item| item.children.clone())
            .unwrap_or_default()
    }

    /// Hashes of all blocks at `depth`, in import order.
    pub fn blocks_at_depth(&self, depth: u32) -> Vec<H256> {
        self.inner
            .read()
            .depths
            .get(&depth)
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().blocks.is_empty()
    }

    /// Queue an extrinsic for the next proposed block.
    pub fn submit_extrinsic(&self, extrinsic: Extrinsic) {
        self.inner.write().pending.push(extrinsic);
    }

    pub fn pending_extrinsics(&self) -> usize {
        self.inner.read().pending.len()
    }

    /// Store `block`, whose parent must be known.
    pub fn insert(
        &self,
        block: Block,
        fork_choice: ForkChoiceStrategy,
    ) -> Result<ImportResult, Error> {
        let block_id = block.id();
        let mut inner = self.inner.write();

        if inner.blocks.contains_key(&block_id) {
            return Ok(ImportResult::AlreadyInChain);
        }

        let parent_id = block.header.parent_hash;
        let parent = inner
            .blocks
            .get_mut(&parent_id)
            .ok_or(Error::UnknownParent(parent_id))?;
        parent.children.push(block_id);
        let depth = parent.depth + 1;

        let is_new_best = match fork_choice {
            ForkChoiceStrategy::LongestChain => depth > inner.blocks[&inner.best].depth,
            ForkChoiceStrategy::Custom(is_new_best) => is_new_best,
        };

        let pruned = prune_included(&mut inner.pending, &block.extrinsics);
        inner.depths.entry(depth).or_default().push(block_id);
        inner.blocks.insert(
            block_id,
            MemoryChainItem {
                block,
                depth,
                children: Vec::new(),
            },
        );
        if is_new_best {
            inner.best = block_id;
        }

        debug!(target: LOG_TARGET, %block_id, depth, is_new_best, pruned, "Imported block.");

        Ok(ImportResult::Imported { is_new_best })
    }

    /// The longest prefix of the pool that fits in `block_size_limit`.
    fn ready_extrinsics(&self, block_size_limit: Option<usize>) -> Vec<Extrinsic> {
        let inner = self.inner.read();

        let limit = block_size_limit.unwrap_or(usize::MAX);
        let mut size = 0usize;
        let count = inner
            .pending
            .iter()
            .take_while(|extrinsic| {
                size = size.saturating_add(extrinsic.len());
                size <= limit
            })
            .count();

        inner.pending[..count].to_vec()
    }
}

/// Drop one pooled copy of each extrinsic in `included`.
fn prune_included(pending: &mut Vec<Extrinsic>, included: &[Extrinsic]) -> usize {
    let before = pending.len();
    for extrinsic in included {
        if let Some(position) = pending.iter().position(|queued| queued == extrinsic) {
            pending.remove(position);
        }
    }
    before - pending.len()
}

#[async_trait]
impl BlockImport for MemoryChain {
    async fn import_block(&mut self, params: BlockImportParams) -> Result<ImportResult, Error> {
        let header = params.post_header();
        let body = params.body.unwrap_or_default();
        let fork_choice = params
            .fork_choice
            .unwrap_or(ForkChoiceStrategy::LongestChain);

        if header.extrinsics_root != extrinsics_root(&body) {
            return Err(Error::ClientImport("extrinsics root mismatch".into()));
        }

        self.insert(Block::new(header, body), fork_choice)
    }
}

impl HeaderBackend for MemoryChain {
    fn header(&self, hash: H256) -> Result<Option<Header>, Error> {
        Ok(self
            .inner
            .read()
            .blocks
            .get(&hash)
            .map(|item| item.block.header.clone()))
    }
}

#[async_trait]
impl SelectChain for MemoryChain {
    async fn best_chain(&self) -> Result<Header, Error> {
        Ok(self.best_header())
    }
}

#[async_trait]
impl Environment for MemoryChain {
    type Proposer = MemoryProposer;

    async fn init(&mut self, parent: &Header) -> Result<MemoryProposer, Error> {
        let parent_hash = parent.hash();
        if self.block(parent_hash).is_none() {
            return Err(Error::UnknownParent(parent_hash));
        }

        Ok(MemoryProposer {
            chain: self.clone(),
            parent_hash,
            parent_number: parent.number,
            parent_state_root: parent.state_root,
        })
    }
}

/// Builds a block out of the chain's pending extrinsics.
pub struct MemoryProposer {
    chain: MemoryChain,
    parent_hash: H256,
    parent_number: u32,
    parent_state_root: H256,
}

#[async_trait]
impl Proposer for MemoryProposer {
    async fn propose(
        self,
        inherent_data: InherentData,
        inherent_digests: Digest,
        max_duration: Duration,
        block_size_limit: Option<usize>,
    ) -> Result<Proposal, Error> {
        let number = self
            .parent_number
            .checked_add(1)
            .ok_or_else(|| Error::Proposer("block number overflow".into()))?;
        let extrinsics = self.chain.ready_extrinsics(block_size_limit);
        let extrinsics_root = extrinsics_root(&extrinsics);

        // State is the hash chain of extrinsics roots.
        let mut state = self.parent_state_root.to_fixed_bytes().to_vec();
        state.extend_from_slice(extrinsics_root.as_bytes());
        let state_root = H256::hash_of(&state);

        trace!(
            target: LOG_TARGET,
            number,
            extrinsics = extrinsics.len(),
            inherents = inherent_data.len(),
            ?max_duration,
            "Proposed block.",
        );

        let header = Header::new(
            number,
            extrinsics_root,
            state_root,
            self.parent_hash,
            inherent_digests,
        );

        Ok(Proposal {
            block: Block::new(header, extrinsics),
        })
    }
}
