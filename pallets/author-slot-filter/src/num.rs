//! A `u32` that cannot be zero, also once it has gone through storage.

use core::ops::Deref;
use nimbus_primitives::{TypeDescriptor, TypeInfo, TypeKind};
use serde::{de::Error as DeserializeError, Deserialize, Deserializer, Serialize, Serializer};

/// Encodes as a plain `u32`. Decoding a zero fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonZeroU32(u32);

impl Deref for NonZeroU32 {
    type Target = u32;

    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl NonZeroU32 {
    /// `None` if `n` is zero.
    #[inline]
    pub const fn new(n: u32) -> Option<Self> {
        if n != 0 {
            Some(Self(n))
        } else {
            None
        }
    }

    /// The caller guarantees `n` is not zero.
    #[inline]
    pub const fn new_unchecked(n: u32) -> Self {
        Self(n)
    }

    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl Serialize for NonZeroU32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for NonZeroU32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        NonZeroU32::new(value).ok_or_else(|| D::Error::custom("expected a non-zero value"))
    }
}

impl TypeInfo for NonZeroU32 {
    fn type_info() -> TypeDescriptor {
        TypeDescriptor {
            path: "pallet_author_slot_filter::num",
            name: "NonZeroU32",
            generic: false,
            kind: TypeKind::Struct { fields: vec!["0"] },
        }
    }
}
