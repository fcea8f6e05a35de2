//! Node-side nimbus settings.

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

use crate::Error;

/// Settings of an authoring node.
///
/// Read from JSON; every field is optional:
///
/// ```json
/// { "slot_duration": 6000, "proposing_duration": 500,
///   "block_size_limit": null, "force_authoring": false }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NimbusConfig {
    /// Milliseconds per slot.
    #[serde(rename = "slot_duration", alias = "slot_duration_ms")]
    pub slot_duration_ms: u64,
    /// Time the proposer gets to fill a block, in milliseconds.
    #[serde(rename = "proposing_duration", alias = "proposing_duration_ms")]
    pub proposing_duration_ms: u64,
    /// Maximum encoded size of the extrinsics in an authored block.
    pub block_size_limit: Option<usize>,
    /// Author even while the node is doing a major sync.
    pub force_authoring: bool,
}

impl Default for NimbusConfig {
    fn default() -> Self {
        Self {
            slot_duration_ms: 6000,
            proposing_duration_ms: 500,
            block_size_limit: None,
            force_authoring: false,
        }
    }
}

impl NimbusConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(format!("{}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.slot_duration_ms == 0 {
            return Err(Error::Config("slot duration must be non-zero".into()));
        }
        if self.proposing_duration_ms > self.slot_duration_ms {
            return Err(Error::Config(
                "proposing duration exceeds the slot duration".into(),
            ));
        }

        Ok(())
    }

    pub fn slot_duration(&self) -> Duration {
        Duration::from_millis(self.slot_duration_ms)
    }

    pub fn proposing_duration(&self) -> Duration {
        Duration::from_millis(self.proposing_duration_ms)
    }
}
