use nimbus_primitives::{HashRandomness, MemoryStorage, Randomness, RuntimeDbWeight, H256};
use std::{cell::RefCell, rc::Rc};

use crate::pallet::{Config, Pallet};

pub struct Test;

pub const TEST_DB_WEIGHT: RuntimeDbWeight = RuntimeDbWeight { read: 1, write: 10 };

pub fn authors() -> Vec<u64> {
    vec![1, 2, 3, 4, 5]
}

impl Config for Test {
    type AccountId = u64;
    type RandomnessSource = HashRandomness;
    type PotentialAuthors = Vec<u64>;
    type Storage = MemoryStorage;
    type DbWeight = RuntimeDbWeight;
}

/// Fresh pallet over empty storage.
pub fn new_test_ext() -> Pallet<Test> {
    Pallet::new(
        HashRandomness::new(H256::hash_of(b"author-slot-filter")),
        authors(),
        MemoryStorage::new(),
        TEST_DB_WEIGHT,
    )
}

/// Hands out the same value for every subject and keeps the subjects asked
/// for.
#[derive(Clone)]
pub struct RecordingRandomness {
    pub value: H256,
    pub subjects: Rc<RefCell<Vec<Vec<u8>>>>,
}

impl RecordingRandomness {
    /// First four bytes are `first` in little-endian; the rest are set so a
    /// read from the wrong end is noticed.
    pub fn new(first: u32) -> Self {
        let mut value = [0xff; 32];
        value[..4].copy_from_slice(&first.to_le_bytes());
        Self {
            value: H256(value),
            subjects: Default::default(),
        }
    }

    pub fn subjects(&self) -> Vec<Vec<u8>> {
        self.subjects.borrow().clone()
    }
}

impl Randomness for RecordingRandomness {
    fn random(&self, subject: &[u8]) -> (H256, u32) {
        self.subjects.borrow_mut().push(subject.to_vec());
        (self.value, 0)
    }
}

pub struct Recording;

impl Config for Recording {
    type AccountId = u64;
    type RandomnessSource = RecordingRandomness;
    type PotentialAuthors = Vec<u64>;
    type Storage = MemoryStorage;
    type DbWeight = RuntimeDbWeight;
}

pub fn new_recording_ext(randomness: RecordingRandomness) -> Pallet<Recording> {
    Pallet::new(randomness, authors(), MemoryStorage::new(), TEST_DB_WEIGHT)
}
