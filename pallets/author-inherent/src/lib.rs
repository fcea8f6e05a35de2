//! Pallet that learns the author of each block from the nimbus pre-runtime
//! digest and validates it against the configured author filter.
//!
//! The author is read in `on_initialize`. The actual check happens in the
//! mandatory `kick_off_authorship_validation` inherent, so that a block whose
//! author is not eligible cannot be valid.

pub mod exec;

#[cfg(test)]
mod mock;

pub use crate::exec::{BlockExecutor, ExecutorError};
pub use crate::pallet::*;

pub mod pallet {
    use core::fmt::Debug;
    use nimbus_primitives::{
        ensure_none, AccountLookup, ApiError, CanAuthor, CompatibleDigestItem, Digest,
        DispatchClass, DispatchError, DispatchInfo, DispatchResult, EventHandler, Get,
        GetDispatchInfo, Header, InherentError, NimbusApi, NimbusId, Origin, Pays,
        RuntimeDbWeight, SlotBeacon, TypeDescriptor, TypeInfo, TypeKind, Weight,
    };
    use tracing::{debug, warn};

    const LOG_TARGET: &str = "author-inherent";

    pub trait Config {
        type AccountId: Clone + PartialEq + Debug;
        /// Maps the author id in the digest to an account.
        type AccountLookup: AccountLookup<Self::AccountId>;
        /// The filter deciding who may author.
        type CanAuthor: CanAuthor<Self::AccountId>;
        /// Told about each validated author.
        type EventHandler: EventHandler<Self::AccountId>;
        /// Where the slot being authored comes from.
        type SlotBeacon: SlotBeacon;
        type DbWeight: Get<RuntimeDbWeight>;
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Error {
        /// Author already set in block.
        AuthorAlreadySet,
        /// No AccountId was found to be associated with this author
        NoAccountId,
        /// The author in the inherent is not an eligible author.
        CannotBeAuthor,
        /// The block carries no nimbus pre-runtime digest.
        MissingAuthorDigest,
    }

    impl Error {
        pub fn as_str(&self) -> &'static str {
            match self {
                Error::AuthorAlreadySet => "AuthorAlreadySet",
                Error::NoAccountId => "NoAccountId",
                Error::CannotBeAuthor => "CannotBeAuthor",
                Error::MissingAuthorDigest => "MissingAuthorDigest",
            }
        }
    }

    impl From<Error> for DispatchError {
        fn from(error: Error) -> Self {
            DispatchError::Module {
                pallet: "AuthorInherent",
                error: error.as_str(),
            }
        }
    }

    impl TypeInfo for Error {
        fn type_info() -> TypeDescriptor {
            TypeDescriptor {
                path: "pallet_author_inherent::pallet",
                name: "Error",
                generic: false,
                kind: TypeKind::Enum {
                    variants: vec![
                        "AuthorAlreadySet",
                        "NoAccountId",
                        "CannotBeAuthor",
                        "MissingAuthorDigest",
                    ],
                },
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Call {
        /// Check that the author recorded in `on_initialize` is eligible.
        /// Unsigned, and must be in every block.
        KickOffAuthorshipValidation,
    }

    impl GetDispatchInfo for Call {
        fn get_dispatch_info(&self) -> DispatchInfo {
            match self {
                Call::KickOffAuthorshipValidation => DispatchInfo {
                    weight: 0,
                    class: DispatchClass::Mandatory,
                    pays_fee: Pays::No,
                },
            }
        }
    }

    impl TypeInfo for Call {
        fn type_info() -> TypeDescriptor {
            TypeDescriptor {
                path: "pallet_author_inherent::pallet",
                name: "Call",
                generic: false,
                kind: TypeKind::Enum {
                    variants: vec!["kick_off_authorship_validation"],
                },
            }
        }
    }

    pub struct Pallet<T: Config> {
        account_lookup: T::AccountLookup,
        can_author: T::CanAuthor,
        event_handler: T::EventHandler,
        slot_beacon: T::SlotBeacon,
        db_weight: T::DbWeight,
        /// Author id claimed in the current block's digest.
        claimed: Option<NimbusId>,
        /// Account of the current block's author.
        author: Option<T::AccountId>,
        validated: bool,
    }

    impl<T: Config> Pallet<T> {
        pub fn new(
            account_lookup: T::AccountLookup,
            can_author: T::CanAuthor,
            event_handler: T::EventHandler,
            slot_beacon: T::SlotBeacon,
            db_weight: T::DbWeight,
        ) -> Self {
            Self {
                account_lookup,
                can_author,
                event_handler,
                slot_beacon,
                db_weight,
                claimed: None,
                author: None,
                validated: false,
            }
        }

        /// Record the author claimed by the block's pre-runtime digest.
        pub fn on_initialize(&mut self, digest: &Digest) -> Weight {
            self.reset();

            if let Some(claimed) = digest.convert_first(|item| item.as_nimbus_pre_digest()) {
                self.author = self.account_lookup.lookup_account(&claimed);
                self.claimed = Some(claimed);
            }

            self.db_weight.get().reads_writes(1, 1)
        }

        pub fn on_finalize(&mut self) {
            self.reset();
        }

        fn reset(&mut self) {
            self.claimed = None;
            self.author = None;
            self.validated = false;
        }

        pub fn dispatch(&mut self, origin: Origin<T::AccountId>, call: Call) -> DispatchResult {
            match call {
                Call::KickOffAuthorshipValidation => self.kick_off_authorship_validation(origin),
            }
        }

        /// Validate the author of the current block.
        pub fn kick_off_authorship_validation(
            &mut self,
            origin: Origin<T::AccountId>,
        ) -> DispatchResult {
            ensure_none(origin)?;

            if self.validated {
                return Err(Error::AuthorAlreadySet.into());
            }

            let claimed = self.claimed.ok_or(Error::MissingAuthorDigest)?;
            let author = self.author.clone().ok_or_else(|| {
                warn!(target: LOG_TARGET, %claimed, "No account for the claimed author.");
                Error::NoAccountId
            })?;

            let slot = self.slot_beacon.slot();
            if !self.can_author.can_author(&author, slot) {
                debug!(target: LOG_TARGET, ?author, slot, "Author is not eligible.");
                return Err(Error::CannotBeAuthor.into());
            }

            self.validated = true;
            self.event_handler.note_author(author);

            Ok(())
        }

        /// Account of the current block's author, once `on_initialize` ran.
        pub fn author(&self) -> Option<T::AccountId> {
            self.author.clone()
        }

        /// Account named by the first nimbus pre-runtime digest in `digest`.
        pub fn find_author(&self, digest: &Digest) -> Option<T::AccountId> {
            digest
                .convert_first(|item| item.as_nimbus_pre_digest())
                .and_then(|id| self.account_lookup.lookup_account(&id))
        }

        /// Whether the holder of `author` may author at `slot`.
        ///
        /// Nodes reach this through the runtime API before they author.
        pub fn can_author(&self, author: &NimbusId, slot: u32) -> bool {
            match self.account_lookup.lookup_account(author) {
                Some(account) => self.can_author.can_author(&account, slot),
                None => {
                    debug!(target: LOG_TARGET, %author, "No account for author id.");
                    false
                }
            }
        }

        pub fn create_inherent(&self) -> Option<Call> {
            Some(Call::KickOffAuthorshipValidation)
        }

        pub fn is_inherent(call: &Call) -> bool {
            matches!(call, Call::KickOffAuthorshipValidation)
        }

        pub fn is_inherent_required(&self) -> bool {
            true
        }

        /// A block must validate its author exactly once.
        pub fn check_inherents(calls: &[Call]) -> Result<(), InherentError> {
            match calls.iter().filter(|call| Self::is_inherent(call)).count() {
                1 => Ok(()),
                0 => Err(InherentError::Other(
                    "authorship validation inherent missing".into(),
                )),
                _ => Err(InherentError::Other(
                    "authorship validation inherent included more than once".into(),
                )),
            }
        }
    }

    impl<T: Config> NimbusApi for Pallet<T> {
        fn can_author(
            &self,
            _parent: &Header,
            author: &NimbusId,
            slot: u32,
        ) -> Result<bool, ApiError> {
            Ok(Pallet::can_author(self, author, slot))
        }
    }
}
