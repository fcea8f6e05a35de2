//! The nimbus consensus client.
//!
//! Nimbus leaves the choice of author to the runtime. At every slot the node
//! asks the runtime, through `NimbusApi`, whether any of its local keys may
//! author on top of the current best block. If one may, the node builds a
//! block carrying that key in a pre-runtime digest and seals it with the
//! key's signature. Importing nodes check the seal in the `NimbusVerifier`;
//! eligibility itself is checked again by the runtime when it executes the
//! block.

mod config;
mod error;
mod import_queue;
pub mod manual_seal;
mod memory;
pub mod slots;
mod standalone;
mod traits;

pub use crate::config::NimbusConfig;
pub use crate::error::Error;
pub use crate::import_queue::{NimbusImportQueue, NimbusVerifier};
pub use crate::memory::{MemoryChain, MemoryProposer};
pub use crate::slots::{start_slot_worker, SlotInfo, SlotResult, SlotWorker};
pub use crate::standalone::NimbusStandaloneWorker;
pub use crate::traits::{
    BlockImport, BlockImportParams, BlockOrigin, CreateInherentDataProviders, Environment,
    ForkChoiceStrategy, HeaderBackend, ImportResult, NoNetwork, Proposal, Proposer, SelectChain,
    SyncOracle,
};

use nimbus_primitives::{
    CompatibleDigestItem, DigestItem, Header, Keystore, NimbusApi, NimbusId, NIMBUS_KEY_ID,
};
use tracing::{info, warn};

pub const LOG_TARGET: &str = "filtering-consensus";

/// First local nimbus key the runtime lets author at `slot` on top of
/// `parent`, in keystore order.
///
/// Keys the runtime cannot check are skipped.
pub fn first_eligible_key<C: NimbusApi + ?Sized>(
    client: &C,
    keystore: &dyn Keystore,
    parent: &Header,
    slot: u32,
) -> Option<NimbusId> {
    let available_keys = keystore.keys(NIMBUS_KEY_ID);

    if available_keys.is_empty() {
        warn!(
            target: LOG_TARGET,
            "🔏 No Nimbus keys available. We will not be able to author."
        );
        return None;
    }

    let maybe_key = available_keys
        .into_iter()
        .find(|key| match client.can_author(parent, key, slot) {
            Ok(eligible) => eligible,
            Err(e) => {
                warn!(target: LOG_TARGET, %key, error = %e, "Runtime could not check eligibility.");
                false
            }
        });

    if maybe_key.is_none() {
        info!(
            target: LOG_TARGET,
            "🔮 Skipping candidate production because we are not eligible for slot {}", slot
        );
    }

    maybe_key
}

/// Sign the hash of `header` with `author`'s key. The header must not be
/// sealed yet.
pub fn seal_header(
    header: &Header,
    keystore: &dyn Keystore,
    author: &NimbusId,
) -> Result<DigestItem, Error> {
    let pre_hash = header.hash();

    let signature = keystore
        .sign_with(NIMBUS_KEY_ID, author, pre_hash.as_bytes())?
        .ok_or_else(|| Error::CannotSign(*author, "key not found in keystore".into()))?;

    Ok(DigestItem::nimbus_seal(signature))
}

/// Author named by the nimbus pre-runtime digest of `header`.
pub fn find_pre_digest(header: &Header) -> Result<NimbusId, Error> {
    header
        .digest()
        .convert_first(|item| item.as_nimbus_pre_digest())
        .ok_or_else(|| Error::NoPreRuntimeDigest(header.hash()))
}
