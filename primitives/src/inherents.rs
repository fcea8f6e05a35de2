//! Data supplied by the block author and checked by the runtime.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Eight-byte identifier of an inherent.
pub type InherentIdentifier = [u8; 8];

/// Identifier under which [`SlotInherentProvider`] writes the slot.
pub const SLOT_INHERENT_IDENTIFIER: InherentIdentifier = *b"nimbslot";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InherentError {
    #[error("inherent data for {0:?} already present")]
    AlreadyPresent(InherentIdentifier),
    #[error("failed to encode inherent {0:?}")]
    Encode(InherentIdentifier),
    #[error("failed to decode inherent {0:?}")]
    Decode(InherentIdentifier),
    #[error("{0}")]
    Other(String),
}

/// Encoded inherent values, keyed by identifier.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InherentData {
    data: BTreeMap<InherentIdentifier, Vec<u8>>,
}

impl InherentData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_data<T: Serialize>(
        &mut self,
        identifier: InherentIdentifier,
        value: &T,
    ) -> Result<(), InherentError> {
        if self.data.contains_key(&identifier) {
            return Err(InherentError::AlreadyPresent(identifier));
        }

        let encoded =
            bincode::serialize(value).map_err(|_| InherentError::Encode(identifier))?;
        self.data.insert(identifier, encoded);

        Ok(())
    }

    pub fn get_data<T: DeserializeOwned>(
        &self,
        identifier: &InherentIdentifier,
    ) -> Result<Option<T>, InherentError> {
        self.data
            .get(identifier)
            .map(|raw| bincode::deserialize(raw).map_err(|_| InherentError::Decode(*identifier)))
            .transpose()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Writes one or more inherents.
pub trait InherentDataProvider {
    fn provide_inherent_data(&self, data: &mut InherentData) -> Result<(), InherentError>;

    fn create_inherent_data(&self) -> Result<InherentData, InherentError> {
        let mut data = InherentData::new();
        self.provide_inherent_data(&mut data)?;
        Ok(data)
    }
}

impl InherentDataProvider for () {
    fn provide_inherent_data(&self, _: &mut InherentData) -> Result<(), InherentError> {
        Ok(())
    }
}

impl<A: InherentDataProvider, B: InherentDataProvider> InherentDataProvider for (A, B) {
    fn provide_inherent_data(&self, data: &mut InherentData) -> Result<(), InherentError> {
        self.0.provide_inherent_data(data)?;
        self.1.provide_inherent_data(data)
    }
}

/// Supplies the slot the block is authored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotInherentProvider(pub u32);

impl SlotInherentProvider {
    /// Read the slot back.
    pub fn slot_from(data: &InherentData) -> Result<Option<u32>, InherentError> {
        data.get_data(&SLOT_INHERENT_IDENTIFIER)
    }
}

impl InherentDataProvider for SlotInherentProvider {
    fn provide_inherent_data(&self, data: &mut InherentData) -> Result<(), InherentError> {
        data.put_data(SLOT_INHERENT_IDENTIFIER, &self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_identifier_is_rejected() {
        let providers = (SlotInherentProvider(3), SlotInherentProvider(4));

        assert_eq!(
            providers.create_inherent_data(),
            Err(InherentError::AlreadyPresent(SLOT_INHERENT_IDENTIFIER))
        );
    }

    #[test]
    fn slot_is_readable() {
        let data = (SlotInherentProvider(12), ()).create_inherent_data().unwrap();

        assert_eq!(SlotInherentProvider::slot_from(&data), Ok(Some(12)));
        assert_eq!(
            SlotInherentProvider::slot_from(&InherentData::new()),
            Ok(None)
        );
    }
}
