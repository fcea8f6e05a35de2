use nimbus_primitives::{
    CanAuthor, DispatchError, HashRandomness, MemoryStorage, OnRuntimeUpgrade, Origin, Percent,
    RuntimeDbWeight, Storage, H256,
};

use crate::migration::{self, EligibleRatioToEligibilityCount};
use crate::mock::*;
use crate::num::NonZeroU32;
use crate::pallet::{Call, Event, GenesisConfig, DEFAULT_TOTAL_ELIGIBLE_AUTHORS};

#[test]
fn set_eligibility_works() {
    let mut pallet = new_test_ext();
    let value = NonZeroU32::new_unchecked(34);

    assert_eq!(pallet.set_eligible(Origin::Root, value), Ok(()));
    assert_eq!(pallet.eligible_count(), value);
    assert_eq!(pallet.events(), &[Event::EligibleUpdated(value)]);
}

#[test]
fn set_eligibility_requires_root() {
    let mut pallet = new_test_ext();
    let value = NonZeroU32::new_unchecked(2);

    assert_eq!(
        pallet.dispatch(Origin::Signed(1), Call::SetEligible { new: value }),
        Err(DispatchError::BadOrigin)
    );
    assert_eq!(pallet.eligible_count(), DEFAULT_TOTAL_ELIGIBLE_AUTHORS);
    assert!(pallet.take_events().is_empty());
}

#[test]
fn genesis_sets_eligible_count() {
    let pallet = new_test_ext();
    let genesis = GenesisConfig {
        eligible_count: NonZeroU32::new_unchecked(3),
    };

    genesis.build(pallet.storage()).unwrap();
    assert_eq!(pallet.eligible_count().get(), 3);
}

#[test]
fn subset_is_capped_by_set_size() {
    let pallet = new_test_ext();
    let (eligible, ineligible) = pallet.compute_pseudo_random_subset(authors(), 7);

    // Default count of 50 exceeds the 5 potential authors.
    assert_eq!(eligible.len(), 5);
    assert!(ineligible.is_empty());

    let mut sorted = eligible.clone();
    sorted.sort();
    assert_eq!(sorted, authors());
}

#[test]
fn subset_partitions_the_set() {
    let mut pallet = new_test_ext();
    pallet
        .set_eligible(Origin::Root, NonZeroU32::new_unchecked(2))
        .unwrap();

    let (eligible, ineligible) = pallet.compute_pseudo_random_subset(authors(), 11);
    assert_eq!(eligible.len(), 2);
    assert_eq!(ineligible.len(), 3);

    let mut all: Vec<u64> = eligible.iter().chain(ineligible.iter()).copied().collect();
    all.sort();
    assert_eq!(all, authors());

    // Same slot, same answer.
    assert_eq!(
        pallet.compute_pseudo_random_subset(authors(), 11),
        (eligible, ineligible)
    );
}

#[test]
fn randomness_subjects_carry_index_and_slot() {
    let randomness = RecordingRandomness::new(7);
    let mut pallet = new_recording_ext(randomness.clone());
    pallet
        .set_eligible(Origin::Root, NonZeroU32::new_unchecked(2))
        .unwrap();

    let (eligible, ineligible) = pallet.compute_pseudo_random_subset(authors(), 0x0102_0304);

    let mut first = b"filter".to_vec();
    first.extend_from_slice(&[0x00, 0x00, 0x01, 0x02, 0x03, 0x04]);
    let mut second = b"filter".to_vec();
    second.extend_from_slice(&[0x01, 0x00, 0x01, 0x02, 0x03, 0x04]);
    assert_eq!(randomness.subjects(), vec![first, second]);

    // 7 % 5 picks the third author, then 7 % 4 the last of the rest.
    assert_eq!(eligible, vec![3, 5]);
    assert_eq!(ineligible, vec![1, 2, 4]);
}

#[test]
fn only_eligible_authors_can_author() {
    let mut pallet = new_test_ext();
    pallet
        .set_eligible(Origin::Root, NonZeroU32::new_unchecked(1))
        .unwrap();

    let mut chosen = Vec::new();
    for slot in 0..50 {
        let able: Vec<u64> = authors()
            .into_iter()
            .filter(|author| pallet.can_author(author, slot))
            .collect();
        assert_eq!(able.len(), 1, "exactly one author at slot {}", slot);
        chosen.push(able[0]);
    }

    chosen.sort();
    chosen.dedup();
    assert!(chosen.len() > 1, "selection should vary with the slot");
    assert!(!pallet.can_author(&42, 0));
}

#[test]
fn migration_converts_existing_eligible_ratio_to_eligible_count() {
    let pallet = new_test_ext();
    let input_eligible_ratio = Percent::from_percent(50);
    let total_author_count = authors().len() as u32;
    let expected_eligible_count =
        NonZeroU32::new(input_eligible_ratio.mul_ceil(total_author_count));
    let expected_weight = TEST_DB_WEIGHT.write + TEST_DB_WEIGHT.read;

    pallet
        .storage()
        .put_value(
            migration::PALLET_NAME,
            migration::ELIGIBLE_RATIO_ITEM_NAME,
            &input_eligible_ratio,
        )
        .unwrap();

    let actual_weight = EligibleRatioToEligibilityCount::new(&pallet).on_runtime_upgrade();
    assert_eq!(expected_weight, actual_weight);

    assert_eq!(expected_eligible_count, Some(pallet.eligible_count()));
    assert_eq!(input_eligible_ratio, pallet.eligible_ratio());
}

#[test]
fn migration_weight_saturates() {
    let pallet = crate::pallet::Pallet::<Test>::new(
        HashRandomness::new(H256::hash_of(b"author-slot-filter")),
        authors(),
        MemoryStorage::new(),
        RuntimeDbWeight {
            read: u64::MAX - 1,
            write: 10,
        },
    );
    pallet
        .storage()
        .put_value(
            migration::PALLET_NAME,
            migration::ELIGIBLE_RATIO_ITEM_NAME,
            &Percent::from_percent(20),
        )
        .unwrap();

    let weight = EligibleRatioToEligibilityCount::new(&pallet).on_runtime_upgrade();
    assert_eq!(weight, u64::MAX);
    assert_eq!(pallet.eligible_count().get(), 1);
}

#[test]
fn migration_of_zero_ratio_falls_back_to_default() {
    let pallet = new_test_ext();
    pallet
        .storage()
        .put_value(
            migration::PALLET_NAME,
            migration::ELIGIBLE_RATIO_ITEM_NAME,
            &Percent::from_percent(0),
        )
        .unwrap();

    EligibleRatioToEligibilityCount::new(&pallet).on_runtime_upgrade();
    assert_eq!(pallet.eligible_count(), DEFAULT_TOTAL_ELIGIBLE_AUTHORS);
    assert!(pallet
        .storage()
        .exists(migration::PALLET_NAME, migration::ELIGIBLE_COUNT_ITEM_NAME));
}

#[test]
fn migration_leaves_corrupted_eligible_ratio_alone() {
    let pallet = new_test_ext();
    pallet.storage().put(
        migration::PALLET_NAME,
        migration::ELIGIBLE_RATIO_ITEM_NAME,
        Vec::new(),
    );

    let actual_weight = EligibleRatioToEligibilityCount::new(&pallet).on_runtime_upgrade();
    assert_eq!(TEST_DB_WEIGHT.read, actual_weight);

    assert!(!pallet
        .storage()
        .exists(migration::PALLET_NAME, migration::ELIGIBLE_COUNT_ITEM_NAME));
    assert_eq!(
        pallet
            .storage()
            .get(migration::PALLET_NAME, migration::ELIGIBLE_RATIO_ITEM_NAME),
        Some(Vec::new())
    );
    assert_eq!(pallet.storage().len(), 1);
}

#[test]
fn migration_skips_missing_eligible_ratio() {
    let pallet = new_test_ext();

    let actual_weight = EligibleRatioToEligibilityCount::new(&pallet).on_runtime_upgrade();
    assert_eq!(0, actual_weight);

    assert_eq!(DEFAULT_TOTAL_ELIGIBLE_AUTHORS, pallet.eligible_count());
    assert!(pallet.storage().is_empty());
}

#[cfg(feature = "try-runtime")]
#[test]
fn try_runtime_hooks_agree_with_migration() {
    let pallet = new_test_ext();
    pallet
        .storage()
        .put_value(
            migration::PALLET_NAME,
            migration::ELIGIBLE_RATIO_ITEM_NAME,
            &Percent::from_percent(40),
        )
        .unwrap();

    let migration = EligibleRatioToEligibilityCount::new(&pallet);
    let expected = migration.pre_upgrade().unwrap();
    assert_eq!(expected, NonZeroU32::new(2));

    migration.on_runtime_upgrade();
    assert_eq!(migration.post_upgrade(expected), Ok(()));
}
