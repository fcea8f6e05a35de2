//! Instant and manual sealing with nimbus digests.
//!
//! Blocks are authored on command rather than per slot. The slot handed to
//! the runtime is the number of the block being built, which lets the
//! runtime's filters behave as they would on a live chain.

use futures::{channel::oneshot, Stream, StreamExt};
use nimbus_primitives::{
    CompatibleDigestItem, Digest, DigestItem, DigestsProvider, Header, InherentData,
    InherentDataProvider, Keystore, NimbusApi, NimbusId, SlotInherentProvider, H256,
};
use std::{sync::Arc, time::Duration};
use tracing::{debug, error, info};

use crate::{
    find_pre_digest, first_eligible_key, seal_header, BlockImport, BlockImportParams, BlockOrigin,
    CreateInherentDataProviders, Environment, Error, ForkChoiceStrategy, HeaderBackend,
    ImportResult, Proposer, SelectChain, LOG_TARGET,
};

/// Time given to the proposer of a manually sealed block.
pub const MAX_PROPOSAL_DURATION: Duration = Duration::from_secs(10);

/// Consensus-specific parts of a manually sealed block.
pub trait ConsensusDataProvider: Send + Sync {
    /// Pre-runtime digests for a block on top of `parent`.
    fn create_digest(&self, parent: &Header, inherents: &InherentData) -> Result<Digest, Error>;

    /// Finish the import params of a proposed block, e.g. by sealing it.
    fn append_block_import(
        &self,
        parent: &Header,
        params: &mut BlockImportParams,
        inherents: &InherentData,
    ) -> Result<(), Error>;
}

/// Authors manually sealed blocks with the first eligible local nimbus key.
pub struct NimbusManualSealConsensusDataProvider<C, DP = ()> {
    keystore: Arc<dyn Keystore>,
    client: Arc<C>,
    additional_digests_provider: DP,
}

impl<C, DP> NimbusManualSealConsensusDataProvider<C, DP> {
    pub fn new(keystore: Arc<dyn Keystore>, client: Arc<C>, additional_digests_provider: DP) -> Self {
        Self {
            keystore,
            client,
            additional_digests_provider,
        }
    }
}

impl<C, DP> ConsensusDataProvider for NimbusManualSealConsensusDataProvider<C, DP>
where
    C: NimbusApi + Send + Sync,
    DP: DigestsProvider<NimbusId, H256> + Send + Sync,
{
    fn create_digest(&self, parent: &Header, inherents: &InherentData) -> Result<Digest, Error> {
        let slot = match SlotInherentProvider::slot_from(inherents)? {
            Some(slot) => slot,
            None => parent.number.saturating_add(1),
        };

        let nimbus_id = first_eligible_key(&*self.client, &*self.keystore, parent, slot)
            .ok_or(Error::NoEligibleKey(slot))?;

        let mut logs = vec![DigestItem::nimbus_pre_digest(nimbus_id)];
        logs.extend(
            self.additional_digests_provider
                .provide_digests(nimbus_id, parent.hash()),
        );

        Ok(Digest::new(logs))
    }

    fn append_block_import(
        &self,
        _parent: &Header,
        params: &mut BlockImportParams,
        _inherents: &InherentData,
    ) -> Result<(), Error> {
        let nimbus_id = find_pre_digest(&params.header)?;
        let seal = seal_header(&params.header, &*self.keystore, &nimbus_id)?;

        params.post_digests.push(seal);

        Ok(())
    }
}

/// Block produced by `seal_block`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedBlock {
    pub hash: H256,
    pub number: u32,
    pub aux: ImportResult,
}

pub enum EngineCommand {
    /// Author, seal and import a block.
    SealNewBlock {
        /// Seal even when there are no pending extrinsics.
        create_empty: bool,
        /// Build on this block instead of the best one.
        parent_hash: Option<H256>,
        sender: Option<oneshot::Sender<Result<CreatedBlock, Error>>>,
    },
}

pub struct SealBlockParams<'a, B, E, C, P, CIDP> {
    pub create_empty: bool,
    pub parent_hash: Option<H256>,
    pub block_import: &'a mut B,
    pub env: &'a mut E,
    pub client: &'a C,
    pub consensus_data_provider: &'a P,
    pub create_inherent_data_providers: &'a CIDP,
}

/// Author one block and import it.
pub async fn seal_block<B, E, C, P, CIDP>(
    SealBlockParams {
        create_empty,
        parent_hash,
        block_import,
        env,
        client,
        consensus_data_provider,
        create_inherent_data_providers,
    }: SealBlockParams<'_, B, E, C, P, CIDP>,
) -> Result<CreatedBlock, Error>
where
    B: BlockImport,
    E: Environment,
    C: SelectChain + HeaderBackend,
    P: ConsensusDataProvider,
    CIDP: CreateInherentDataProviders,
{
    let parent = match parent_hash {
        Some(hash) => client.header(hash)?.ok_or(Error::UnknownBlock(hash))?,
        None => client.best_chain().await?,
    };
    let parent_hash = parent.hash();
    let slot = parent.number.saturating_add(1);

    let inherent_data = create_inherent_data_providers
        .create_inherent_data_providers(parent_hash, slot)
        .await?
        .create_inherent_data()?;

    let digest = consensus_data_provider.create_digest(&parent, &inherent_data)?;

    let proposal = env
        .init(&parent)
        .await?
        .propose(inherent_data.clone(), digest, MAX_PROPOSAL_DURATION, None)
        .await?;

    if proposal.block.extrinsics.is_empty() && !create_empty {
        return Err(Error::EmptyTransactionPool);
    }

    let (header, body) = proposal.block.deconstruct();
    let number = header.number;

    let mut params = BlockImportParams::new(BlockOrigin::Own, header);
    params.body = Some(body);
    params.fork_choice = Some(ForkChoiceStrategy::LongestChain);

    consensus_data_provider.append_block_import(&parent, &mut params, &inherent_data)?;

    let hash = params.post_hash();
    let aux = block_import.import_block(params).await?;

    info!(target: LOG_TARGET, number, %hash, %parent_hash, "✨ Manually sealed block.");

    Ok(CreatedBlock { hash, number, aux })
}

pub struct ManualSealParams<B, E, C, CS, P, CIDP> {
    pub block_import: B,
    pub env: E,
    /// Chain access used to find the parent of each block.
    pub client: C,
    pub commands_stream: CS,
    pub consensus_data_provider: P,
    pub create_inherent_data_providers: CIDP,
}

/// Seal a block for every command received, until the stream ends.
pub async fn run_manual_seal<B, E, C, CS, P, CIDP>(
    ManualSealParams {
        mut block_import,
        mut env,
        client,
        mut commands_stream,
        consensus_data_provider,
        create_inherent_data_providers,
    }: ManualSealParams<B, E, C, CS, P, CIDP>,
) where
    B: BlockImport,
    E: Environment,
    C: SelectChain + HeaderBackend,
    CS: Stream<Item = EngineCommand> + Unpin,
    P: ConsensusDataProvider,
    CIDP: CreateInherentDataProviders,
{
    while let Some(command) = commands_stream.next().await {
        match command {
            EngineCommand::SealNewBlock {
                create_empty,
                parent_hash,
                sender,
            } => {
                let result = seal_block(SealBlockParams {
                    create_empty,
                    parent_hash,
                    block_import: &mut block_import,
                    env: &mut env,
                    client: &client,
                    consensus_data_provider: &consensus_data_provider,
                    create_inherent_data_providers: &create_inherent_data_providers,
                })
                .await;

                match sender {
                    Some(sender) => {
                        if sender.send(result).is_err() {
                            debug!(target: LOG_TARGET, "Seal requester went away.");
                        }
                    }
                    None => {
                        if let Err(e) = result {
                            error!(target: LOG_TARGET, error = %e, "Failed to seal block.");
                        }
                    }
                }
            }
        }
    }

    info!(target: LOG_TARGET, "Manual seal command stream ended.");
}

/// Seal a block whenever the returned stream yields, e.g. on each new
/// extrinsic.
pub fn instant_seal_commands<S>(triggers: S) -> impl Stream<Item = EngineCommand>
where
    S: Stream,
{
    triggers.map(|_| EngineCommand::SealNewBlock {
        create_empty: false,
        parent_hash: None,
        sender: None,
    })
}
