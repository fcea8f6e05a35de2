//! Origins, dispatch errors and weights for pallet calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Execution weight.
pub type Weight = u64;

/// Who dispatched a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Origin<AccountId> {
    Root,
    Signed(AccountId),
    /// Unsigned, used by inherents.
    None,
}

/// Error of a dispatched call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("bad origin")]
    BadOrigin,
    #[error("{pallet}: {error}")]
    Module {
        pallet: &'static str,
        error: &'static str,
    },
    #[error("{0}")]
    Other(String),
}

pub type DispatchResult = Result<(), DispatchError>;

pub fn ensure_root<AccountId>(origin: Origin<AccountId>) -> Result<(), DispatchError> {
    match origin {
        Origin::Root => Ok(()),
        _ => Err(DispatchError::BadOrigin),
    }
}

pub fn ensure_none<AccountId>(origin: Origin<AccountId>) -> Result<(), DispatchError> {
    match origin {
        Origin::None => Ok(()),
        _ => Err(DispatchError::BadOrigin),
    }
}

pub fn ensure_signed<AccountId>(origin: Origin<AccountId>) -> Result<AccountId, DispatchError> {
    match origin {
        Origin::Signed(who) => Ok(who),
        _ => Err(DispatchError::BadOrigin),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchClass {
    Normal,
    Operational,
    /// Must be included in every block, whatever the block weight.
    Mandatory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pays {
    Yes,
    No,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DispatchInfo {
    pub weight: Weight,
    pub class: DispatchClass,
    pub pays_fee: Pays,
}

/// Calls able to describe their dispatch class and weight.
pub trait GetDispatchInfo {
    fn get_dispatch_info(&self) -> DispatchInfo;
}

/// Cost of database accesses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuntimeDbWeight {
    pub read: Weight,
    pub write: Weight,
}

impl RuntimeDbWeight {
    pub fn reads(&self, r: Weight) -> Weight {
        self.read.saturating_mul(r)
    }

    pub fn writes(&self, w: Weight) -> Weight {
        self.write.saturating_mul(w)
    }

    pub fn reads_writes(&self, r: Weight, w: Weight) -> Weight {
        self.reads(r).saturating_add(self.writes(w))
    }
}

/// A percentage in `0..=100`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percent(u8);

impl Percent {
    /// Saturates at 100.
    pub const fn from_percent(p: u8) -> Self {
        if p > 100 {
            Self(100)
        } else {
            Self(p)
        }
    }

    pub fn deconstruct(self) -> u8 {
        self.0
    }

    /// `self * n`, rounded up.
    pub fn mul_ceil(self, n: u32) -> u32 {
        let scaled = u64::from(n) * u64::from(self.0);
        // At most n, so it fits.
        ((scaled + 99) / 100) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_mul_ceil_rounds_up() {
        assert_eq!(Percent::from_percent(50).mul_ceil(5), 3);
        assert_eq!(Percent::from_percent(50).mul_ceil(4), 2);
        assert_eq!(Percent::from_percent(0).mul_ceil(100), 0);
        assert_eq!(Percent::from_percent(1).mul_ceil(1), 1);
        assert_eq!(Percent::from_percent(100).mul_ceil(u32::MAX), u32::MAX);
        assert_eq!(Percent::from_percent(250), Percent::from_percent(100));
    }

    #[test]
    fn origins() {
        assert_eq!(ensure_root::<u64>(Origin::Root), Ok(()));
        assert_eq!(ensure_root(Origin::Signed(1u64)), Err(DispatchError::BadOrigin));
        assert_eq!(ensure_none::<u64>(Origin::None), Ok(()));
        assert_eq!(ensure_signed(Origin::Signed(7u64)), Ok(7));
        assert_eq!(ensure_signed::<u64>(Origin::None), Err(DispatchError::BadOrigin));
    }
}
