use nimbus_primitives::{ApiError, InherentError, KeystoreError, NimbusId, SealError, H256};
use thiserror::Error;

/// Consensus error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("cannot sign with {0}: {1}")]
    CannotSign(NimbusId, String),
    #[error("keystore: {0}")]
    Keystore(#[from] KeystoreError),
    #[error("invalid seal on {hash}: {source}")]
    InvalidSeal { hash: H256, source: SealError },
    #[error("header {0} has no nimbus pre-runtime digest")]
    NoPreRuntimeDigest(H256),
    #[error("no local key is eligible at slot {0}")]
    NoEligibleKey(u32),
    #[error("{0} cannot author at slot {1}")]
    CannotAuthor(NimbusId, u32),
    #[error("unknown parent {0}")]
    UnknownParent(H256),
    #[error("unknown block {0}")]
    UnknownBlock(H256),
    #[error("runtime api: {0}")]
    Api(#[from] ApiError),
    #[error("inherent data: {0}")]
    Inherent(#[from] InherentError),
    #[error("proposer: {0}")]
    Proposer(String),
    #[error("block import: {0}")]
    ClientImport(String),
    #[error("transaction pool is empty and empty blocks were not requested")]
    EmptyTransactionPool,
    #[error("invalid configuration: {0}")]
    Config(String),
}
