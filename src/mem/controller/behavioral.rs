//! behavioral fidelity: fixed latency, completion inside submit
//!
//! the fastest model by orders of magnitude. nothing queues; `tick` only
//! advances the cycle counter so the shared clock contract still holds.

use tracing::trace;

use crate::mem::address::AddressDecoder;
use crate::mem::bank::BankState;
use crate::mem::config::{ControllerConfig, Fidelity, Technology};
use crate::mem::request::{IdGen, PageClass, Request, RequestId, RequestType, SubmitError};
use crate::mem::stats::Statistics;
use crate::mem::{Cycle, MemoryController, Violation};

pub struct BehavioralController {
    config: ControllerConfig,
    decoder: AddressDecoder,
    current_cycle: Cycle,
    ids: IdGen,
    stats: Statistics,
    tracing: bool,
    violations: Vec<Violation>,
}

impl BehavioralController {
    pub fn new(config: ControllerConfig) -> Self {
        let decoder = AddressDecoder::new(
            &config.organization,
            config.address_mapping,
            config.custom_mapping.as_deref(),
        )
        .expect("config validated by the factory");
        let tracing = config.enable_tracing;
        Self {
            config,
            decoder,
            current_cycle: 0,
            ids: IdGen::default(),
            stats: Statistics::new(),
            tracing,
            violations: Vec::new(),
        }
    }
}

impl MemoryController for BehavioralController {
    fn submit(&mut self, mut request: Request) -> Result<RequestId, SubmitError> {
        request.loc = self.decoder.decode(request.address)?;
        request.id = self.ids.alloc();
        request.submit_cycle = self.current_cycle;

        let latency = match request.ty {
            RequestType::Read => self.config.timing.fixed_read_latency,
            RequestType::Write => self.config.timing.fixed_write_latency,
        };
        if self.config.enable_statistics {
            self.stats.record_completion(request.ty, latency);
            // no bank model at this fidelity; everything lands in a closed row
            self.stats.record_issue(PageClass::Empty);
        }
        if self.tracing {
            trace!(id = request.id, address = request.address, latency, "behavioral complete");
        }
        if let Some(callback) = request.take_callback() {
            callback(latency);
        }
        Ok(request.id)
    }

    fn can_accept(&self) -> bool {
        true
    }

    fn has_pending(&self) -> bool {
        false
    }

    fn pending_count(&self) -> usize {
        0
    }

    fn tick(&mut self) {
        self.current_cycle += 1;
    }

    fn reset(&mut self) {
        self.current_cycle = 0;
        self.stats.reset();
    }

    fn cycle(&self) -> Cycle {
        self.current_cycle
    }

    fn set_cycle(&mut self, cycle: Cycle) {
        self.current_cycle = cycle;
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Behavioral
    }

    fn technology(&self) -> Technology {
        self.config.technology
    }

    fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn bank_state(&self, _channel: usize, _bank: usize) -> BankState {
        BankState::Idle
    }

    fn is_row_open(&self, _channel: usize, _bank: usize, _row: usize) -> bool {
        false
    }

    fn open_row(&self, _channel: usize, _bank: usize) -> Option<usize> {
        None
    }

    fn stats(&self) -> &Statistics {
        &self.stats
    }

    fn reset_stats(&mut self) {
        self.stats.reset();
    }

    fn enable_tracing(&mut self, enable: bool) {
        self.tracing = enable;
    }

    fn tracing_enabled(&self) -> bool {
        self.tracing
    }

    fn enable_invariants(&mut self, _enable: bool) {}

    fn invariants_enabled(&self) -> bool {
        false
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }

    fn clear_violations(&mut self) {}
}
