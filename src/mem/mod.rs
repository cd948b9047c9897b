//! the memory controller module
//!
//! one controller instance owns one memory subsystem. the caller drives
//! progress with [`MemoryController::tick`]; completion callbacks fire
//! synchronously during a tick (or during `submit` for the behavioral
//! fidelity).

use self::bank::BankState;
use self::config::{ConfigError, ControllerConfig, Fidelity, Technology};
use self::request::{Request, RequestId, SubmitError};
use self::stats::Statistics;

pub mod address;
pub mod bank;
pub mod config;
pub mod controller;
pub mod refresh;
pub mod request;
pub mod scheduler;
pub mod stats;
pub mod technology;

/// cycles of the memory clock. the controller never reasons in absolute time.
pub type Cycle = u64;
/// a physical address
pub type Address = u64;

/// a recorded timing violation, only collected when invariant checking is on.
/// diagnostics, never a control signal.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Violation {
    pub cycle: Cycle,
    pub invariant_id: &'static str,
    pub message: String,
    pub channel: usize,
    pub bank: usize,
}

/// the capability set shared by all three fidelities
pub trait MemoryController {
    /// submit a request. assigns a fresh id and stamps the submit cycle.
    /// `Err(QueueFull)` means retry after a tick.
    fn submit(&mut self, request: Request) -> Result<RequestId, SubmitError>;

    /// can the controller accept one more request right now
    fn can_accept(&self) -> bool;
    /// are there requests that have not completed yet
    fn has_pending(&self) -> bool;
    /// number of requests that have not completed yet
    fn pending_count(&self) -> usize;

    /// advance the simulation by one cycle
    fn tick(&mut self);
    /// advance the simulation by `n` cycles
    fn tick_n(&mut self, n: Cycle) {
        for _ in 0..n {
            self.tick();
        }
    }
    /// tick until nothing is pending
    fn drain(&mut self) {
        while self.has_pending() {
            self.tick();
        }
    }
    /// zero the cycle, clear all banks, queues, refresh state and statistics.
    /// pending requests are discarded without firing their callbacks. the
    /// request id counter is preserved so ids stay unique over the
    /// controller lifetime.
    fn reset(&mut self);

    /// current simulation cycle
    fn cycle(&self) -> Cycle;
    /// set the cycle, for external clock management
    fn set_cycle(&mut self, cycle: Cycle);

    fn fidelity(&self) -> Fidelity;
    fn technology(&self) -> Technology;
    fn config(&self) -> &ControllerConfig;

    /// state of a bank, indexed within the channel
    fn bank_state(&self, channel: usize, bank: usize) -> BankState;
    /// is `row` currently open in the bank
    fn is_row_open(&self, channel: usize, bank: usize, row: usize) -> bool;
    /// the currently open row, if any
    fn open_row(&self, channel: usize, bank: usize) -> Option<usize>;
    fn num_channels(&self) -> usize {
        self.config().organization.num_channels
    }
    fn banks_per_channel(&self) -> usize {
        self.config().organization.banks_per_channel()
    }

    fn stats(&self) -> &Statistics;
    fn reset_stats(&mut self);

    fn enable_tracing(&mut self, enable: bool);
    fn tracing_enabled(&self) -> bool;
    fn enable_invariants(&mut self, enable: bool);
    fn invariants_enabled(&self) -> bool;

    /// recorded timing violations (cycle accurate only; empty otherwise)
    fn violations(&self) -> &[Violation];
    fn has_violations(&self) -> bool {
        !self.violations().is_empty()
    }
    fn clear_violations(&mut self);
}

/// create a controller for the configured fidelity level
pub fn create_controller(
    config: ControllerConfig,
) -> Result<Box<dyn MemoryController>, ConfigError> {
    config.validate()?;
    Ok(match config.fidelity {
        Fidelity::Behavioral => Box::new(controller::BehavioralController::new(config)),
        Fidelity::Transactional => Box::new(controller::TransactionalController::new(config)),
        Fidelity::CycleAccurate => Box::new(controller::CycleAccurateController::new(config)),
    })
}
