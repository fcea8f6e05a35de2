//! Verification of incoming blocks.
//!
//! The verifier only checks that the seal was made by the author claimed in
//! the pre-runtime digest. Whether that author was eligible is a runtime
//! question, answered when the block executes; nodes that want to drop
//! ineligible blocks before execution can ask for the check with
//! `NimbusVerifier::with_eligibility_check`.

use nimbus_primitives::{check_and_strip_seal, Block, NimbusApi};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    BlockImport, BlockImportParams, BlockOrigin, Error, HeaderBackend, ImportResult, LOG_TARGET,
};

pub struct NimbusVerifier<C> {
    client: Arc<C>,
    check_eligibility: bool,
}

impl<C> Clone for NimbusVerifier<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            check_eligibility: self.check_eligibility,
        }
    }
}

impl<C: HeaderBackend + NimbusApi> NimbusVerifier<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            check_eligibility: false,
        }
    }

    /// A verifier that also asks the runtime, at the parent block, whether
    /// the author could author. The block number is taken as the slot.
    pub fn with_eligibility_check(client: Arc<C>) -> Self {
        Self {
            client,
            check_eligibility: true,
        }
    }

    /// Strip and check the seal of `params.header`, moving it to
    /// `post_digests`.
    pub fn verify(&self, mut params: BlockImportParams) -> Result<BlockImportParams, Error> {
        let hash = params.header.hash();

        let (author, seal) = check_and_strip_seal(&mut params.header)
            .map_err(|source| Error::InvalidSeal { hash, source })?;

        if self.check_eligibility {
            let parent_hash = params.header.parent_hash;
            let parent = self
                .client
                .header(parent_hash)?
                .ok_or(Error::UnknownParent(parent_hash))?;
            let slot = params.header.number;

            if !self.client.can_author(&parent, &author, slot)? {
                return Err(Error::CannotAuthor(author, slot));
            }
        }

        debug!(
            target: LOG_TARGET,
            %hash,
            %author,
            pre_hash = %params.header.hash(),
            "Verified seal.",
        );

        params.post_digests.push(seal);

        Ok(params)
    }
}

/// Verifies blocks, then hands them to the block import.
pub struct NimbusImportQueue<C, I> {
    verifier: NimbusVerifier<C>,
    block_import: I,
}

impl<C: HeaderBackend + NimbusApi, I: BlockImport> NimbusImportQueue<C, I> {
    pub fn new(verifier: NimbusVerifier<C>, block_import: I) -> Self {
        Self {
            verifier,
            block_import,
        }
    }

    pub async fn import_block(
        &mut self,
        origin: BlockOrigin,
        block: Block,
    ) -> Result<ImportResult, Error> {
        let (header, body) = block.deconstruct();
        let number = header.number;

        let mut params = BlockImportParams::new(origin, header);
        params.body = Some(body);

        let params = self.verifier.verify(params).map_err(|e| {
            warn!(target: LOG_TARGET, number, ?origin, error = %e, "Rejected block.");
            e
        })?;

        self.block_import.import_block(params).await
    }

    /// Import in order, stopping at the first failure. Returns the results
    /// of the blocks that were attempted.
    pub async fn import_blocks(
        &mut self,
        origin: BlockOrigin,
        blocks: Vec<Block>,
    ) -> Vec<Result<ImportResult, Error>> {
        let mut results = Vec::with_capacity(blocks.len());

        for block in blocks {
            let result = self.import_block(origin, block).await;
            let failed = result.is_err();
            results.push(result);
            if failed {
                break;
            }
        }

        results
    }

    pub fn block_import(&self) -> &I {
        &self.block_import
    }
}
