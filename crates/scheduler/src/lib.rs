//! # Scheduler
//!
//! Work distribution across cooperating workers.
//!
//! Responsibilities:
//! - Static strided partition of the sorted work list
//! - One-shot broadcast of the frozen list from the coordinator
//! - End-of-run barrier rendezvous before aggregation

mod partition;
mod rendezvous;

pub use partition::{assigned, assigned_indices};
pub use rendezvous::{work_channel, Rendezvous, WorkBroadcast, WorkReceiver};
