//! A convenient interface over the digests used in nimbus.
//!
//! Nimbus places two digests in every block:
//!
//! 1. A pre-runtime digest naming the block author, added before the block
//!    is executed. The runtime reads it in the author inherent.
//! 2. A seal digest, last in the header, holding the author's signature over
//!    the rest of the header including the first digest.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::trace;

use crate::{NimbusId, NimbusSignature, NIMBUS_ENGINE_ID};

/// Four-byte tag of a consensus engine.
pub type ConsensusEngineId = [u8; 4];

/// A single header log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DigestItem {
    /// Emitted by the block author before execution.
    PreRuntime(ConsensusEngineId, Vec<u8>),
    /// Consensus message emitted by the runtime.
    Consensus(ConsensusEngineId, Vec<u8>),
    /// Seal, always last. Not covered by the signature it carries.
    Seal(ConsensusEngineId, Vec<u8>),
    /// Anything else.
    Other(Vec<u8>),
}

impl DigestItem {
    fn try_decode<T: DeserializeOwned>(
        engine: &ConsensusEngineId,
        id: &ConsensusEngineId,
        data: &[u8],
    ) -> Option<T> {
        if engine == id {
            bincode::deserialize(data)
                .map_err(|e| trace!(target: "nimbus-digests", error = %e, "Undecodable digest payload."))
                .ok()
        } else {
            None
        }
    }

    /// Decode a pre-runtime payload tagged with `id`.
    pub fn pre_runtime_try_to<T: DeserializeOwned>(&self, id: &ConsensusEngineId) -> Option<T> {
        match self {
            DigestItem::PreRuntime(engine, data) => Self::try_decode(engine, id, data),
            _ => None,
        }
    }

    /// Decode a consensus payload tagged with `id`.
    pub fn consensus_try_to<T: DeserializeOwned>(&self, id: &ConsensusEngineId) -> Option<T> {
        match self {
            DigestItem::Consensus(engine, data) => Self::try_decode(engine, id, data),
            _ => None,
        }
    }

    /// Decode a seal payload tagged with `id`.
    pub fn seal_try_to<T: DeserializeOwned>(&self, id: &ConsensusEngineId) -> Option<T> {
        match self {
            DigestItem::Seal(engine, data) => Self::try_decode(engine, id, data),
            _ => None,
        }
    }

    /// Payloads are ids and signatures: fixed-size byte arrays.
    fn encode_payload<T: Serialize>(value: &T) -> Vec<u8> {
        bincode::serialize(value).expect("fixed-size byte arrays always encode; qed")
    }
}

/// Ordered header logs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub logs: Vec<DigestItem>,
}

impl Digest {
    pub fn new(logs: Vec<DigestItem>) -> Self {
        Self { logs }
    }

    pub fn logs(&self) -> &[DigestItem] {
        &self.logs
    }

    pub fn push(&mut self, item: DigestItem) {
        self.logs.push(item);
    }

    pub fn pop(&mut self) -> Option<DigestItem> {
        self.logs.pop()
    }

    pub fn last(&self) -> Option<&DigestItem> {
        self.logs.last()
    }

    /// First item for which `f` returns `Some`.
    pub fn convert_first<T, F: Fn(&DigestItem) -> Option<T>>(&self, f: F) -> Option<T> {
        self.logs.iter().find_map(f)
    }
}

impl From<Vec<DigestItem>> for Digest {
    fn from(logs: Vec<DigestItem>) -> Self {
        Self { logs }
    }
}

/// A digest item which is usable with nimbus consensus.
pub trait CompatibleDigestItem: Sized {
    /// Construct a pre-runtime digest from the given AuthorId
    fn nimbus_pre_digest(author: NimbusId) -> Self;

    /// If this item is a nimbus pre-runtime digest, return the author
    fn as_nimbus_pre_digest(&self) -> Option<NimbusId>;

    /// Construct a seal digest item from the given signature
    fn nimbus_seal(signature: NimbusSignature) -> Self;

    /// If this item is a nimbus seal, return the signature.
    fn as_nimbus_seal(&self) -> Option<NimbusSignature>;

    /// Construct a consensus digest from the given AuthorId.
    ///
    /// Older form of the author digest, superseded by the pre-runtime digest.
    fn nimbus_consensus_digest(author: NimbusId) -> Self;

    /// If this item is a nimbus consensus digest, return the author
    fn as_nimbus_consensus_digest(&self) -> Option<NimbusId>;
}

impl CompatibleDigestItem for DigestItem {
    fn nimbus_pre_digest(author: NimbusId) -> Self {
        DigestItem::PreRuntime(NIMBUS_ENGINE_ID, Self::encode_payload(&author))
    }

    fn as_nimbus_pre_digest(&self) -> Option<NimbusId> {
        self.pre_runtime_try_to(&NIMBUS_ENGINE_ID)
    }

    fn nimbus_seal(signature: NimbusSignature) -> Self {
        DigestItem::Seal(NIMBUS_ENGINE_ID, Self::encode_payload(&signature))
    }

    fn as_nimbus_seal(&self) -> Option<NimbusSignature> {
        self.seal_try_to(&NIMBUS_ENGINE_ID)
    }

    fn nimbus_consensus_digest(author: NimbusId) -> Self {
        DigestItem::Consensus(NIMBUS_ENGINE_ID, Self::encode_payload(&author))
    }

    fn as_nimbus_consensus_digest(&self) -> Option<NimbusId> {
        self.consensus_try_to(&NIMBUS_ENGINE_ID)
    }
}
