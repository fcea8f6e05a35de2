//! Author filter that mimics Aura: the potential authors take turns, one per
//! slot, in the order the upstream source lists them.
//!
//! Useful as a drop-in for chains migrating from Aura, or as the last filter
//! in a chain to ensure exactly one author per slot.

pub use crate::pallet::*;

pub mod pallet {
    use core::fmt::Debug;
    use nimbus_primitives::{CanAuthor, Get, TypeDescriptor, TypeInfo, TypeKind};
    use tracing::debug;

    const LOG_TARGET: &str = "aura-style-filter";

    pub trait Config {
        type AccountId: PartialEq + Debug;
        /// Authors taking turns, in order.
        type Authorities: Get<Vec<Self::AccountId>>;
    }

    /// The filter has no calls.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Call {}

    impl TypeInfo for Call {
        fn type_info() -> TypeDescriptor {
            TypeDescriptor {
                path: "pallet_aura_style_filter::pallet",
                name: "Call",
                generic: false,
                kind: TypeKind::Enum {
                    variants: Vec::new(),
                },
            }
        }
    }

    pub struct Pallet<T: Config> {
        authorities: T::Authorities,
    }

    impl<T: Config> Pallet<T> {
        pub fn new(authorities: T::Authorities) -> Self {
            Self { authorities }
        }

        /// Author whose turn it is at `slot`, if there are any authors.
        pub fn slot_author(&self, slot: u32) -> Option<T::AccountId> {
            let mut active = self.authorities.get();
            if active.is_empty() {
                return None;
            }

            let index = slot as usize % active.len();
            Some(active.swap_remove(index))
        }
    }

    impl<T: Config> CanAuthor<T::AccountId> for Pallet<T> {
        fn can_author(&self, author: &T::AccountId, slot: u32) -> bool {
            let expected = self.slot_author(slot);
            debug!(target: LOG_TARGET, ?expected, ?author, slot, "Round-robin check.");

            expected.as_ref() == Some(author)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nimbus_primitives::CanAuthor;

    struct Test;

    impl Config for Test {
        type AccountId = u64;
        type Authorities = Vec<u64>;
    }

    #[test]
    fn authors_take_turns() {
        let pallet = Pallet::<Test>::new(vec![10, 20, 30]);

        assert!(pallet.can_author(&10, 0));
        assert!(pallet.can_author(&20, 1));
        assert!(pallet.can_author(&30, 2));
        assert!(pallet.can_author(&10, 3));
        assert!(!pallet.can_author(&20, 3));
        assert_eq!(pallet.slot_author(u32::MAX), Some(10));
    }

    #[test]
    fn nobody_authors_without_authorities() {
        let pallet = Pallet::<Test>::new(Vec::new());

        assert!(!pallet.can_author(&10, 0));
        assert_eq!(pallet.slot_author(5), None);
    }
}
