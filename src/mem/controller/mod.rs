//! the three controller fidelities
//!
//! behavioral and transactional are deliberately simple foils to the cycle
//! accurate core; all three sit behind [`crate::mem::MemoryController`].

mod behavioral;
mod cycle_accurate;
mod transactional;

pub use behavioral::BehavioralController;
pub use cycle_accurate::CycleAccurateController;
pub use transactional::TransactionalController;
