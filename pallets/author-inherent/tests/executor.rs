//! A small runtime: the author inherent backed by the author slot filter,
//! executed behind the nimbus `BlockExecutor`.

use nimbus_primitives::{
    Block, CanAuthor, CompatibleDigestItem, DigestItem, DispatchError, ExecuteBlock, Header,
    HashRandomness, IdentityLookup, MemoryStorage, NimbusId, NimbusPair, Origin, RuntimeDbWeight,
    SealError, SlotBeacon, H256,
};
use pallet_author_inherent::{BlockExecutor, Call, ExecutorError, Pallet as AuthorInherent};
use pallet_author_slot_filter::{NonZeroU32, Pallet as AuthorSlotFilter};
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};

struct FilterRuntime;

impl pallet_author_slot_filter::Config for FilterRuntime {
    type AccountId = NimbusId;
    type RandomnessSource = HashRandomness;
    type PotentialAuthors = Vec<NimbusId>;
    type Storage = MemoryStorage;
    type DbWeight = RuntimeDbWeight;
}

/// Slot of the block being executed. Set by the executive.
#[derive(Clone, Default)]
struct CurrentSlot(Arc<AtomicU32>);

impl SlotBeacon for CurrentSlot {
    fn slot(&self) -> u32 {
        self.0.load(Ordering::SeqCst)
    }
}

struct Runtime;

impl pallet_author_inherent::Config for Runtime {
    type AccountId = NimbusId;
    type AccountLookup = IdentityLookup;
    type CanAuthor = AuthorSlotFilter<FilterRuntime>;
    type EventHandler = ();
    type SlotBeacon = CurrentSlot;
    type DbWeight = RuntimeDbWeight;
}

/// Runs the author inherent for every block, using the block number as slot.
struct Executive {
    slot: CurrentSlot,
    author_inherent: Mutex<AuthorInherent<Runtime>>,
}

impl ExecuteBlock for Executive {
    type Error = DispatchError;

    fn execute_block(&self, block: Block) -> Result<(), DispatchError> {
        let mut author_inherent = self.author_inherent.lock().unwrap();

        self.slot.0.store(block.header.number, Ordering::SeqCst);
        author_inherent.on_initialize(&block.header.digest);
        let result = author_inherent.dispatch(Origin::None, Call::KickOffAuthorshipValidation);
        author_inherent.on_finalize();

        result
    }
}

fn authors() -> Vec<NimbusPair> {
    (1..=4u8).map(|i| NimbusPair::from_seed(&[i; 32])).collect()
}

fn runtime() -> (BlockExecutor<Executive>, AuthorSlotFilter<FilterRuntime>) {
    let potential: Vec<NimbusId> = authors().iter().map(NimbusPair::public).collect();
    let randomness = HashRandomness::new(H256::hash_of(b"executor test"));
    let storage = MemoryStorage::new();

    let mut filter = AuthorSlotFilter::<FilterRuntime>::new(
        randomness,
        potential.clone(),
        storage.clone(),
        RuntimeDbWeight::default(),
    );
    filter
        .set_eligible(Origin::Root, NonZeroU32::new_unchecked(1))
        .unwrap();

    // A second handle over the same storage, owned by the author inherent.
    let shared_filter = AuthorSlotFilter::<FilterRuntime>::new(
        randomness,
        potential,
        storage,
        RuntimeDbWeight::default(),
    );

    let slot = CurrentSlot::default();
    let author_inherent = AuthorInherent::<Runtime>::new(
        IdentityLookup,
        shared_filter,
        (),
        slot.clone(),
        RuntimeDbWeight::default(),
    );

    (
        BlockExecutor::new(Executive {
            slot,
            author_inherent: Mutex::new(author_inherent),
        }),
        filter,
    )
}

fn sealed_block(author: &NimbusPair, number: u32) -> Block {
    let mut header = Header::default();
    header.number = number;
    header.parent_hash = H256::hash_of(&number.to_le_bytes());
    header
        .digest_mut()
        .push(DigestItem::nimbus_pre_digest(author.public()));

    let signature = author.sign(header.hash().as_bytes());
    header.digest_mut().push(DigestItem::nimbus_seal(signature));

    Block::new(header, Vec::new())
}

fn eligible_and_not(
    filter: &AuthorSlotFilter<FilterRuntime>,
    slot: u32,
) -> (NimbusPair, NimbusPair) {
    let (eligible, ineligible): (Vec<_>, Vec<_>) = authors()
        .into_iter()
        .partition(|pair| filter.can_author(&pair.public(), slot));

    assert_eq!(eligible.len(), 1);
    (eligible[0].clone(), ineligible[0].clone())
}

#[test]
fn sealed_block_by_eligible_author_executes() {
    let _ = tracing_subscriber::fmt::try_init();
    let (executor, filter) = runtime();

    for number in 1..10 {
        let (eligible, _) = eligible_and_not(&filter, number);
        executor
            .execute_block(sealed_block(&eligible, number))
            .expect("eligible author's block executes");
    }
}

#[test]
fn sealed_block_by_ineligible_author_is_rejected() {
    let (executor, filter) = runtime();
    let (_, ineligible) = eligible_and_not(&filter, 3);

    match executor.execute_block(sealed_block(&ineligible, 3)) {
        Err(ExecutorError::Inner(DispatchError::Module { error, .. })) => {
            assert_eq!(error, "CannotBeAuthor")
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn tampered_block_is_rejected_before_execution() {
    let (executor, filter) = runtime();
    let (eligible, _) = eligible_and_not(&filter, 5);

    let mut block = sealed_block(&eligible, 5);
    block.header.state_root = H256::hash_of(b"tampered");

    match executor.execute_block(block) {
        Err(ExecutorError::Seal(SealError::InvalidSignature(author))) => {
            assert_eq!(author, eligible.public())
        }
        other => panic!("unexpected {:?}", other),
    }

    let mut unsealed = sealed_block(&eligible, 5);
    unsealed.header.digest_mut().pop();
    assert!(matches!(
        executor.execute_block(unsealed),
        Err(ExecutorError::Seal(SealError::HeaderUnsealed))
    ));
}
