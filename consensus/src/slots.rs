//! Wall-clock slots and the loop driving a slot worker.

use async_trait::async_trait;
use futures_timer::Delay;
use nimbus_primitives::{Block, Header};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

use crate::{NimbusConfig, SelectChain, SyncOracle, LOG_TARGET};

/// A slot that just began.
#[derive(Clone, Debug)]
pub struct SlotInfo {
    pub slot: u64,
    /// Best block when the slot began.
    pub chain_head: Header,
    pub ends_at: Instant,
    pub duration: Duration,
    pub block_size_limit: Option<usize>,
}

/// The block authored in a slot, with its seal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotResult {
    pub block: Block,
}

#[async_trait]
pub trait SlotWorker: Send {
    /// Called at the beginning of every slot. Returns the block authored in
    /// it, if any.
    async fn on_slot(&mut self, slot_info: SlotInfo) -> Option<SlotResult>;
}

pub fn duration_now() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Slot containing `timestamp`.
pub fn slot_at(timestamp: Duration, slot_duration: Duration) -> u64 {
    let slot_duration = slot_duration.as_millis().max(1);
    (timestamp.as_millis() / slot_duration) as u64
}

/// Time left until the slot after the one containing `now` begins.
pub fn time_until_next_slot(now: Duration, slot_duration: Duration) -> Duration {
    let now = now.as_millis();
    let slot_duration = slot_duration.as_millis().max(1);
    let next_slot_start = (now / slot_duration + 1) * slot_duration;

    Duration::from_millis((next_slot_start - now) as u64)
}

/// Stream of slot beginnings. Every slot is yielded at most once, and only
/// once it has started.
pub struct Slots {
    last_slot: u64,
    slot_duration: Duration,
}

impl Slots {
    pub fn new(slot_duration: Duration) -> Self {
        Self {
            last_slot: 0,
            slot_duration,
        }
    }

    /// Wait for the next slot to begin. Returns it with the instant it ends.
    pub async fn next_slot(&mut self) -> (u64, Instant) {
        loop {
            Delay::new(time_until_next_slot(duration_now(), self.slot_duration)).await;

            let now = duration_now();
            let slot = slot_at(now, self.slot_duration);
            if slot > self.last_slot {
                self.last_slot = slot;
                let ends_at = Instant::now() + time_until_next_slot(now, self.slot_duration);
                return (slot, ends_at);
            }
        }
    }
}

/// Call `worker` at the beginning of each slot, on top of the best block.
///
/// Slots are skipped while the node is major syncing, unless the config
/// forces authoring. Runs forever.
pub async fn start_slot_worker<W, SC, SO>(
    config: NimbusConfig,
    select_chain: SC,
    mut worker: W,
    sync_oracle: SO,
) where
    W: SlotWorker,
    SC: SelectChain,
    SO: SyncOracle + Send,
{
    let mut slots = Slots::new(config.slot_duration());

    loop {
        let (slot, ends_at) = slots.next_slot().await;

        if sync_oracle.is_major_syncing() && !config.force_authoring {
            debug!(target: LOG_TARGET, slot, "Skipping slot while major syncing.");
            continue;
        }

        let chain_head = match select_chain.best_chain().await {
            Ok(header) => header,
            Err(e) => {
                warn!(
                    target: LOG_TARGET,
                    slot,
                    error = %e,
                    "Unable to author block in slot. No best block header.",
                );
                continue;
            }
        };

        let result = worker
            .on_slot(SlotInfo {
                slot,
                chain_head,
                ends_at,
                duration: config.slot_duration(),
                block_size_limit: config.block_size_limit,
            })
            .await;

        match result {
            Some(SlotResult { block }) => debug!(
                target: LOG_TARGET,
                slot,
                number = block.header.number,
                hash = %block.hash(),
                "Authored block in slot.",
            ),
            None => debug!(target: LOG_TARGET, slot, "Nothing authored in slot."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_arithmetic() {
        let duration = Duration::from_millis(6000);

        assert_eq!(slot_at(Duration::from_millis(0), duration), 0);
        assert_eq!(slot_at(Duration::from_millis(5999), duration), 0);
        assert_eq!(slot_at(Duration::from_millis(6000), duration), 1);

        assert_eq!(
            time_until_next_slot(Duration::from_millis(6000), duration),
            duration
        );
        assert_eq!(
            time_until_next_slot(Duration::from_millis(7500), duration),
            Duration::from_millis(4500)
        );
    }

    #[tokio::test]
    async fn slots_advance() {
        let mut slots = Slots::new(Duration::from_millis(20));

        let (first, _) = slots.next_slot().await;
        let (second, _) = slots.next_slot().await;

        assert!(second > first);
    }
}
