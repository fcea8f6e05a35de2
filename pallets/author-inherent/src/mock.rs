use nimbus_primitives::{
    CanAuthor, CompatibleDigestItem, Digest, DigestItem, EventHandler, NimbusId, NimbusPair,
    RuntimeDbWeight,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use crate::pallet::{Config, Pallet};

pub struct Test;

/// Accounts allowed to author, whatever the slot.
pub struct AllowList(pub Vec<u64>);

impl CanAuthor<u64> for AllowList {
    fn can_author(&self, author: &u64, _slot: u32) -> bool {
        self.0.contains(author)
    }
}

#[derive(Clone, Default)]
pub struct NotedAuthors(Arc<Mutex<Vec<u64>>>);

impl NotedAuthors {
    pub fn noted(&self) -> Vec<u64> {
        self.0.lock().unwrap().clone()
    }
}

impl EventHandler<u64> for NotedAuthors {
    fn note_author(&self, author: u64) {
        self.0.lock().unwrap().push(author);
    }
}

impl Config for Test {
    type AccountId = u64;
    type AccountLookup = BTreeMap<NimbusId, u64>;
    type CanAuthor = AllowList;
    type EventHandler = NotedAuthors;
    type SlotBeacon = u32;
    type DbWeight = RuntimeDbWeight;
}

pub const TEST_DB_WEIGHT: RuntimeDbWeight = RuntimeDbWeight { read: 1, write: 10 };

pub fn pair(seed: u8) -> NimbusPair {
    NimbusPair::from_seed(&[seed; 32])
}

/// Digest claiming `seed`'s key as the author.
pub fn author_digest(seed: u8) -> Digest {
    Digest::new(vec![DigestItem::nimbus_pre_digest(pair(seed).public())])
}

/// Keys 1, 2 and 3 map to accounts of the same number. Accounts 1 and 2 may
/// author.
pub fn new_test_ext() -> (Pallet<Test>, NotedAuthors) {
    let lookup = (1..=3u8).map(|i| (pair(i).public(), u64::from(i))).collect();
    let noted = NotedAuthors::default();
    let pallet = Pallet::new(
        lookup,
        AllowList(vec![1, 2]),
        noted.clone(),
        7,
        TEST_DB_WEIGHT,
    );

    (pallet, noted)
}
