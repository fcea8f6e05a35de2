//! Seal checking shared by the node's verifier and the runtime executive.

use thiserror::Error;

use crate::{CompatibleDigestItem, DigestItem, Header, NimbusId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SealError {
    #[error("header has no digest items")]
    MissingSeal,
    #[error("last digest item is not a nimbus seal")]
    HeaderUnsealed,
    #[error("no nimbus pre-runtime digest names the author")]
    MissingAuthor,
    #[error("seal signature does not match author {0}")]
    InvalidSignature(NimbusId),
}

/// Pop the seal off `header` and check that it holds the claimed author's
/// signature over the remaining header.
///
/// On success returns the author and the seal item. On failure the seal has
/// been popped all the same.
pub fn check_and_strip_seal(header: &mut Header) -> Result<(NimbusId, DigestItem), SealError> {
    let seal = header.digest_mut().pop().ok_or(SealError::MissingSeal)?;
    let signature = seal.as_nimbus_seal().ok_or(SealError::HeaderUnsealed)?;

    let claimed_author = header
        .digest()
        .convert_first(|item| item.as_nimbus_pre_digest())
        .ok_or(SealError::MissingAuthor)?;

    let pre_hash = header.hash();
    if !claimed_author.verify(pre_hash.as_bytes(), &signature) {
        return Err(SealError::InvalidSignature(claimed_author));
    }

    Ok((claimed_author, seal))
}
