//! A single-author development node on an in-memory chain.
//!
//! ```text
//! cargo run --example dev_node                 # author every slot
//! cargo run --example dev_node -- --instant    # seal on each new extrinsic
//! cargo run --example dev_node -- config.json  # read a NimbusConfig
//! ```

use futures::{channel::mpsc, select, FutureExt};
use nimbus_consensus::{
    manual_seal::{
        instant_seal_commands, run_manual_seal, ManualSealParams,
        NimbusManualSealConsensusDataProvider,
    },
    start_slot_worker, Error, MemoryChain, NimbusConfig, NimbusStandaloneWorker, NoNetwork,
};
use nimbus_primitives::{
    ApiError, Header, IdentityLookup, MemoryKeystore, NimbusApi, NimbusId, RuntimeDbWeight,
    SlotInherentProvider, H256, NIMBUS_KEY_ID,
};
use pallet_aura_style_filter::Pallet as AuraFilter;
use pallet_author_inherent::Pallet as AuthorInherent;
use std::sync::Arc;
use tracing::info;

struct Authorities;

impl pallet_aura_style_filter::Config for Authorities {
    type AccountId = NimbusId;
    type Authorities = Vec<NimbusId>;
}

struct Runtime;

impl pallet_author_inherent::Config for Runtime {
    type AccountId = NimbusId;
    type AccountLookup = IdentityLookup;
    type CanAuthor = AuraFilter<Authorities>;
    type EventHandler = ();
    type SlotBeacon = u32;
    type DbWeight = RuntimeDbWeight;
}

struct Client {
    runtime: AuthorInherent<Runtime>,
}

impl NimbusApi for Client {
    fn can_author(&self, parent: &Header, author: &NimbusId, slot: u32) -> Result<bool, ApiError> {
        NimbusApi::can_author(&self.runtime, parent, author, slot)
    }
}

fn slot_inherent(_: H256, slot: u32) -> Result<SlotInherentProvider, Error> {
    Ok(SlotInherentProvider(slot))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let instant = args.iter().any(|arg| arg == "--instant");
    let config = match args.iter().find(|arg| !arg.starts_with("--")) {
        Some(path) => NimbusConfig::from_file(path)?,
        None => NimbusConfig::default(),
    };

    let keystore = Arc::new(MemoryKeystore::new());
    let author = keystore.insert_seed(NIMBUS_KEY_ID, &[42; 32]);
    info!("Authoring as {}", author);

    let client = Arc::new(Client {
        runtime: AuthorInherent::new(
            IdentityLookup,
            AuraFilter::new(vec![author]),
            (),
            0,
            RuntimeDbWeight::default(),
        ),
    });
    let chain = MemoryChain::new(Header::default());

    if instant {
        let (mut triggers, trigger_stream) = mpsc::channel::<()>(16);
        let engine = run_manual_seal(ManualSealParams {
            block_import: chain.clone(),
            env: chain.clone(),
            client: chain.clone(),
            commands_stream: Box::pin(instant_seal_commands(trigger_stream)),
            consensus_data_provider: NimbusManualSealConsensusDataProvider::new(
                keystore,
                client,
                (),
            ),
            create_inherent_data_providers: slot_inherent,
        });
        let mut engine = Box::pin(engine.fuse());

        let mut nonce = 0u64;
        loop {
            let mut tick = Box::pin(tokio::time::sleep(config.slot_duration()).fuse());
            select! {
                _ = engine => break,
                _ = tick => {
                    nonce += 1;
                    chain.submit_extrinsic(nonce.to_le_bytes().to_vec());
                    if triggers.try_send(()).is_err() {
                        break;
                    }
                    info!("Best block #{}", chain.best_header().number);
                }
            }
        }
    } else {
        let worker = NimbusStandaloneWorker::new(
            client,
            keystore,
            chain.clone(),
            chain.clone(),
            slot_inherent,
            config.proposing_duration(),
        );

        let mut node = Box::pin(start_slot_worker(config, chain.clone(), worker, NoNetwork).fuse());
        let mut ctrl_c = Box::pin(tokio::signal::ctrl_c().fuse());

        select! {
            _ = node => {},
            _ = ctrl_c => info!("Shutting down at #{}", chain.best_header().number),
        }
    }

    Ok(())
}
