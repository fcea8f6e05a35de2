use crate::{Block, Weight};

/// Executes a block against the runtime state.
pub trait ExecuteBlock {
    /// Error type.
    type Error;

    /// Execute the block, failing if it is invalid.
    fn execute_block(&self, block: Block) -> Result<(), Self::Error>;
}

/// Storage migration run once when the runtime is upgraded.
pub trait OnRuntimeUpgrade {
    /// Perform the migration, returning the weight it consumed.
    fn on_runtime_upgrade(&self) -> Weight;
}
