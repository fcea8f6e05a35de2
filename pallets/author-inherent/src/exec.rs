//! Block executive for validating blocks built with nimbus consensus.
//!
//! This will strip the seal digest, and confirm that it contains a valid
//! signature by the block author reported in the pre-runtime digest. Only
//! then is the unsealed block handed to the inner executive.

use nimbus_primitives::{check_and_strip_seal, Block, ExecuteBlock, SealError};
use thiserror::Error;
use tracing::debug;

const LOG_TARGET: &str = "executive";

#[derive(Error, Debug)]
pub enum ExecutorError<E> {
    #[error("invalid seal: {0}")]
    Seal(#[from] SealError),
    #[error("inner executive: {0}")]
    Inner(E),
}

/// Checks the nimbus seal, then executes with `I`.
pub struct BlockExecutor<I> {
    inner: I,
}

impl<I> BlockExecutor<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

impl<I: ExecuteBlock> ExecuteBlock for BlockExecutor<I> {
    type Error = ExecutorError<I::Error>;

    fn execute_block(&self, block: Block) -> Result<(), Self::Error> {
        let (mut header, extrinsics) = block.deconstruct();

        debug!(target: LOG_TARGET, digests = ?header.digest(), "Initial digests.");

        let (author, seal) = check_and_strip_seal(&mut header)?;

        debug!(
            target: LOG_TARGET,
            %author,
            ?seal,
            pre_hash = ?header.hash(),
            "Seal verified.",
        );

        self.inner
            .execute_block(Block::new(header, extrinsics))
            .map_err(ExecutorError::Inner)
    }
}
