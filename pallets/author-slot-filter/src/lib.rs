//! Small pallet responsible for determining which accounts are eligible to
//! author at the current slot.
//!
//! Using a randomness beacon supplied by the `Randomness` trait, this pallet
//! takes the set of currently active accounts from an upstream source, and
//! filters them down to a pseudorandom subset of `EligibleCount` authors.
//! No author is favoured over another.

pub mod migration;
pub mod num;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

pub use crate::num::NonZeroU32;
pub use crate::pallet::*;

pub mod pallet {
    use core::fmt::Debug;
    use nimbus_primitives::{
        ensure_root, CanAuthor, DispatchError, DispatchResult, Get, Origin, Percent, Randomness,
        RuntimeDbWeight, Storage, StorageError, TypeDescriptor, TypeInfo, TypeKind,
    };
    use serde::{Deserialize, Serialize};
    use tracing::{debug, error};

    use crate::num::NonZeroU32;

    pub const LOG_TARGET: &str = "author-slot-filter";

    /// Storage prefix of the pallet.
    pub const PALLET_NAME: &[u8] = b"AuthorSlotFilter";
    /// Deprecated share of potential authors that is eligible.
    pub const ELIGIBLE_RATIO_ITEM_NAME: &[u8] = b"EligibleRatio";
    /// Number of authors eligible at each slot.
    pub const ELIGIBLE_COUNT_ITEM_NAME: &[u8] = b"EligibleCount";

    pub type EligibilityValue = NonZeroU32;

    pub const DEFAULT_TOTAL_ELIGIBLE_AUTHORS: EligibilityValue = NonZeroU32::new_unchecked(50);
    pub const DEFAULT_ELIGIBLE_RATIO: Percent = Percent::from_percent(50);

    /// Configuration of the filter.
    pub trait Config {
        type AccountId: Clone + PartialEq + Debug;
        /// Beacon deciding which authors are eligible.
        type RandomnessSource: Randomness;
        /// Set the filter picks from.
        type PotentialAuthors: Get<Vec<Self::AccountId>>;
        type Storage: Storage;
        type DbWeight: Get<RuntimeDbWeight>;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Event {
        /// The amount of eligible authors for the filter to select has been
        /// changed.
        EligibleUpdated(EligibilityValue),
    }

    impl TypeInfo for Event {
        fn type_info() -> TypeDescriptor {
            TypeDescriptor {
                path: "pallet_author_slot_filter::pallet",
                name: "Event",
                generic: false,
                kind: TypeKind::Enum {
                    variants: vec!["EligibleUpdated"],
                },
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Call {
        /// Update the eligible count. Intended to be called by governance.
        SetEligible { new: EligibilityValue },
    }

    impl TypeInfo for Call {
        fn type_info() -> TypeDescriptor {
            TypeDescriptor {
                path: "pallet_author_slot_filter::pallet",
                name: "Call",
                generic: false,
                kind: TypeKind::Enum {
                    variants: vec!["set_eligible"],
                },
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Error {
        /// The eligible count could not be written.
        StorageWrite,
    }

    impl Error {
        fn as_str(&self) -> &'static str {
            match self {
                Error::StorageWrite => "StorageWrite",
            }
        }
    }

    impl From<Error> for DispatchError {
        fn from(error: Error) -> Self {
            DispatchError::Module {
                pallet: "AuthorSlotFilter",
                error: error.as_str(),
            }
        }
    }

    pub struct Pallet<T: Config> {
        randomness: T::RandomnessSource,
        potential_authors: T::PotentialAuthors,
        storage: T::Storage,
        db_weight: T::DbWeight,
        events: Vec<Event>,
    }

    impl<T: Config> Pallet<T> {
        pub fn new(
            randomness: T::RandomnessSource,
            potential_authors: T::PotentialAuthors,
            storage: T::Storage,
            db_weight: T::DbWeight,
        ) -> Self {
            Self {
                randomness,
                potential_authors,
                storage,
                db_weight,
                events: Vec::new(),
            }
        }

        pub fn dispatch(&mut self, origin: Origin<T::AccountId>, call: Call) -> DispatchResult {
            match call {
                Call::SetEligible { new } => self.set_eligible(origin, new),
            }
        }

        /// Update the eligible count. Root only.
        pub fn set_eligible(
            &mut self,
            origin: Origin<T::AccountId>,
            new: EligibilityValue,
        ) -> DispatchResult {
            ensure_root(origin)?;

            self.storage
                .put_value(PALLET_NAME, ELIGIBLE_COUNT_ITEM_NAME, &new)
                .map_err(|e| {
                    error!(target: LOG_TARGET, error = %e, "Failed to store eligible count.");
                    Error::StorageWrite
                })?;
            self.deposit_event(Event::EligibleUpdated(new));

            Ok(())
        }

        /// Number of authors eligible at each slot.
        pub fn eligible_count(&self) -> EligibilityValue {
            self.read_or(ELIGIBLE_COUNT_ITEM_NAME, DEFAULT_TOTAL_ELIGIBLE_AUTHORS)
        }

        /// Deprecated in favour of `eligible_count`; kept readable for the
        /// migration.
        pub fn eligible_ratio(&self) -> Percent {
            self.read_or(ELIGIBLE_RATIO_ITEM_NAME, DEFAULT_ELIGIBLE_RATIO)
        }

        fn read_or<V: serde::de::DeserializeOwned>(&self, item: &[u8], default: V) -> V {
            match self.storage.get_value(PALLET_NAME, item) {
                Ok(value) => value.unwrap_or(default),
                Err(e) => {
                    error!(target: LOG_TARGET, error = %e, "Corrupted storage, using default.");
                    default
                }
            }
        }

        /// Split `set` into the authors eligible at `slot` and the rest.
        ///
        /// Eligible authors are returned in selection order.
        pub fn compute_pseudo_random_subset(
            &self,
            mut set: Vec<T::AccountId>,
            slot: u32,
        ) -> (Vec<T::AccountId>, Vec<T::AccountId>) {
            let num_eligible = (self.eligible_count().get() as usize).min(set.len());
            let mut eligible = Vec::with_capacity(num_eligible);

            for i in 0..num_eligible {
                let subject = randomness_subject(i, slot);
                let (randomness, _) = self.randomness.random(&subject);

                // Go through u32 so the pick is the same on 32 and 64-bit
                // platforms.
                let bytes = randomness.to_fixed_bytes();
                let random = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                let index = (random % set.len() as u32) as usize;

                eligible.push(set.remove(index));
            }

            (eligible, set)
        }

        pub fn deposit_event(&mut self, event: Event) {
            self.events.push(event);
        }

        pub fn events(&self) -> &[Event] {
            &self.events
        }

        pub fn take_events(&mut self) -> Vec<Event> {
            std::mem::take(&mut self.events)
        }

        pub fn potential_authors(&self) -> Vec<T::AccountId> {
            self.potential_authors.get()
        }

        pub fn storage(&self) -> &T::Storage {
            &self.storage
        }

        pub fn db_weight(&self) -> RuntimeDbWeight {
            self.db_weight.get()
        }
    }

    /// `b"filter"`, then the low two bytes of the selection index, then the
    /// slot in big-endian.
    pub(crate) fn randomness_subject(index: usize, slot: u32) -> [u8; 12] {
        let mut subject = [0u8; 12];
        subject[..6].copy_from_slice(b"filter");
        subject[6..8].copy_from_slice(&(index as u16).to_le_bytes());
        subject[8..].copy_from_slice(&slot.to_be_bytes());
        subject
    }

    impl<T: Config> CanAuthor<T::AccountId> for Pallet<T> {
        fn can_author(&self, author: &T::AccountId, slot: u32) -> bool {
            let active = self.potential_authors.get();
            let (eligible, ineligible) = self.compute_pseudo_random_subset(active, slot);

            debug!(target: LOG_TARGET, ?eligible, ?ineligible, slot, "Filtered authors.");

            eligible.contains(author)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct GenesisConfig {
        pub eligible_count: EligibilityValue,
    }

    impl Default for GenesisConfig {
        fn default() -> Self {
            Self {
                eligible_count: DEFAULT_TOTAL_ELIGIBLE_AUTHORS,
            }
        }
    }

    impl GenesisConfig {
        pub fn build<S: Storage>(&self, storage: &S) -> Result<(), StorageError> {
            storage.put_value(PALLET_NAME, ELIGIBLE_COUNT_ITEM_NAME, &self.eligible_count)
        }
    }
}
