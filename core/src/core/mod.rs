// stagecoach/src/core/mod.rs

pub mod control;
pub mod scheduler;

// Re-export key types for easier access from other modules (and lib.rs)
pub use control::{RunState, StageGate};
pub use scheduler::{JobHandle, JobScheduler};
