//! Slot worker authoring blocks for a standalone (non-parachain) chain.

use async_trait::async_trait;
use nimbus_primitives::{
    Block, CompatibleDigestItem, Digest, DigestItem, DigestsProvider, InherentDataProvider,
    Keystore, NimbusApi, NimbusId, H256,
};
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

use crate::{
    first_eligible_key, seal_header, BlockImport, BlockImportParams, BlockOrigin,
    CreateInherentDataProviders, Environment, ForkChoiceStrategy, Proposer, SlotInfo, SlotResult,
    SlotWorker, LOG_TARGET,
};

/// At each slot, finds a local key the runtime lets author, then proposes,
/// seals and imports a block with it.
pub struct NimbusStandaloneWorker<C, E, I, CIDP, DP = ()> {
    client: Arc<C>,
    keystore: Arc<dyn Keystore>,
    proposer_factory: E,
    block_import: I,
    create_inherent_data_providers: CIDP,
    additional_digests_provider: DP,
    proposing_duration: Duration,
}

impl<C, E, I, CIDP> NimbusStandaloneWorker<C, E, I, CIDP> {
    pub fn new(
        client: Arc<C>,
        keystore: Arc<dyn Keystore>,
        proposer_factory: E,
        block_import: I,
        create_inherent_data_providers: CIDP,
        proposing_duration: Duration,
    ) -> Self {
        Self {
            client,
            keystore,
            proposer_factory,
            block_import,
            create_inherent_data_providers,
            additional_digests_provider: (),
            proposing_duration,
        }
    }
}

impl<C, E, I, CIDP, DP> NimbusStandaloneWorker<C, E, I, CIDP, DP> {
    /// Append the digests of `provider` after the nimbus pre-digest of
    /// every authored block.
    pub fn with_additional_digests<DP2>(
        self,
        provider: DP2,
    ) -> NimbusStandaloneWorker<C, E, I, CIDP, DP2> {
        NimbusStandaloneWorker {
            client: self.client,
            keystore: self.keystore,
            proposer_factory: self.proposer_factory,
            block_import: self.block_import,
            create_inherent_data_providers: self.create_inherent_data_providers,
            additional_digests_provider: provider,
            proposing_duration: self.proposing_duration,
        }
    }

    pub fn block_import(&self) -> &I {
        &self.block_import
    }
}

#[async_trait]
impl<C, E, I, CIDP, DP> SlotWorker for NimbusStandaloneWorker<C, E, I, CIDP, DP>
where
    C: NimbusApi + Send + Sync,
    E: Environment,
    I: BlockImport,
    CIDP: CreateInherentDataProviders,
    DP: DigestsProvider<NimbusId, H256> + Send + Sync,
{
    async fn on_slot(&mut self, slot_info: SlotInfo) -> Option<SlotResult> {
        // Runtime slots are u32; long-running wall-clock slots wrap.
        let slot = slot_info.slot as u32;
        let parent = &slot_info.chain_head;
        let parent_hash = parent.hash();

        let nimbus_id = first_eligible_key(&*self.client, &*self.keystore, parent, slot)?;

        let mut logs = vec![DigestItem::nimbus_pre_digest(nimbus_id)];
        logs.extend(
            self.additional_digests_provider
                .provide_digests(nimbus_id, parent_hash),
        );
        let inherent_digests = Digest::new(logs);

        let inherent_data = match self
            .create_inherent_data_providers
            .create_inherent_data_providers(parent_hash, slot)
            .await
            .and_then(|providers| providers.create_inherent_data().map_err(Into::into))
        {
            Ok(data) => data,
            Err(e) => {
                error!(target: LOG_TARGET, error = %e, "Failed to create inherent data.");
                return None;
            }
        };

        let proposer = match self.proposer_factory.init(parent).await {
            Ok(proposer) => proposer,
            Err(e) => {
                error!(target: LOG_TARGET, error = %e, "Could not create proposer.");
                return None;
            }
        };

        let proposal = match proposer
            .propose(
                inherent_data,
                inherent_digests,
                self.proposing_duration,
                slot_info.block_size_limit,
            )
            .await
        {
            Ok(proposal) => proposal,
            Err(e) => {
                error!(target: LOG_TARGET, error = %e, "Proposing failed.");
                return None;
            }
        };

        let (header, extrinsics) = proposal.block.deconstruct();
        let pre_hash = header.hash();

        let sig_digest = match seal_header(&header, &*self.keystore, &nimbus_id) {
            Ok(digest) => digest,
            Err(e) => {
                error!(target: LOG_TARGET, error = %e, "Failed to seal block.");
                return None;
            }
        };

        let mut params = BlockImportParams::new(BlockOrigin::Own, header.clone());
        params.post_digests.push(sig_digest.clone());
        params.body = Some(extrinsics.clone());
        params.fork_choice = Some(ForkChoiceStrategy::LongestChain);

        if let Err(e) = self.block_import.import_block(params).await {
            error!(
                target: LOG_TARGET,
                at = %parent_hash,
                error = %e,
                "Error importing built block.",
            );
            return None;
        }

        let mut post_header = header;
        post_header.digest_mut().push(sig_digest);

        info!(
            target: LOG_TARGET,
            "🔖 Sealed block for proposal at {}. Hash now {}, previously {}.",
            post_header.number,
            post_header.hash(),
            pre_hash,
        );

        Some(SlotResult {
            block: Block::new(post_header, extrinsics),
        })
    }
}
