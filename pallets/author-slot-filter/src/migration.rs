//! Replace the eligible ratio with an absolute eligible count.

use nimbus_primitives::{OnRuntimeUpgrade, Percent, Storage, Weight};
use tracing::{error, info};

use crate::num::NonZeroU32;
use crate::pallet::{Config, Pallet, DEFAULT_TOTAL_ELIGIBLE_AUTHORS};

pub use crate::pallet::{ELIGIBLE_COUNT_ITEM_NAME, ELIGIBLE_RATIO_ITEM_NAME, PALLET_NAME};

const LOG_TARGET: &str = "EligibleRatioToEligibilityCount";

/// Converts a stored `EligibleRatio` into the `EligibleCount` it amounts to
/// for the current set of potential authors. The ratio entry is left in
/// place.
pub struct EligibleRatioToEligibilityCount<'a, T: Config> {
    pallet: &'a Pallet<T>,
}

impl<'a, T: Config> EligibleRatioToEligibilityCount<'a, T> {
    pub fn new(pallet: &'a Pallet<T>) -> Self {
        Self { pallet }
    }

    fn old_ratio(&self) -> Result<Option<Percent>, &'static str> {
        self.pallet
            .storage()
            .get_value::<Percent>(PALLET_NAME, ELIGIBLE_RATIO_ITEM_NAME)
            .map_err(|e| {
                error!(target: LOG_TARGET, error = %e, "Cannot read eligible ratio.");
                "eligible ratio is not decodable"
            })
    }

    fn eligible_count_for(&self, ratio: Percent) -> u32 {
        let total_authors = self.pallet.potential_authors().len() as u32;
        percent_of_num(ratio, total_authors)
    }

    /// Expected eligible count once the migration has run. `None` when
    /// there is nothing to migrate.
    #[cfg(feature = "try-runtime")]
    pub fn pre_upgrade(&self) -> Result<Option<NonZeroU32>, &'static str> {
        Ok(self.old_ratio()?.map(|ratio| {
            NonZeroU32::new(self.eligible_count_for(ratio))
                .unwrap_or(DEFAULT_TOTAL_ELIGIBLE_AUTHORS)
        }))
    }

    #[cfg(feature = "try-runtime")]
    pub fn post_upgrade(&self, expected: Option<NonZeroU32>) -> Result<(), &'static str> {
        let actual = self
            .pallet
            .storage()
            .get_value::<NonZeroU32>(PALLET_NAME, ELIGIBLE_COUNT_ITEM_NAME)
            .map_err(|_| "eligible count is not decodable")?;

        match expected {
            Some(expected) if actual != Some(expected) => Err("unexpected eligible count"),
            _ => Ok(()),
        }
    }
}

impl<'a, T: Config> OnRuntimeUpgrade for EligibleRatioToEligibilityCount<'a, T> {
    fn on_runtime_upgrade(&self) -> Weight {
        info!(target: LOG_TARGET, "starting migration");

        let db_weight = self.pallet.db_weight();
        let old_value = match self.old_ratio() {
            Ok(Some(old_value)) => old_value,
            Ok(None) => return 0,
            Err(_) => return db_weight.reads(1),
        };

        let new_value = NonZeroU32::new(self.eligible_count_for(old_value))
            .unwrap_or(DEFAULT_TOTAL_ELIGIBLE_AUTHORS);

        if let Err(e) =
            self.pallet
                .storage()
                .put_value(PALLET_NAME, ELIGIBLE_COUNT_ITEM_NAME, &new_value)
        {
            error!(target: LOG_TARGET, error = %e, "Cannot write eligible count.");
            return db_weight.reads(1);
        }

        info!(target: LOG_TARGET, eligible_count = new_value.get(), "migration done");

        db_weight.reads_writes(1, 1)
    }
}

fn percent_of_num(percent: Percent, num: u32) -> u32 {
    percent.mul_ceil(num)
}
