//! transactional fidelity: queue delayed, statistically sampled latency
//!
//! latency is drawn from a normal distribution and scaled by the page state
//! of a simple per-bank open-row tracker. requests complete when their
//! sampled cycle arrives; backpressure kicks in at the configured queue
//! depth.

use std::collections::VecDeque;

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use tracing::trace;

use crate::mem::address::AddressDecoder;
use crate::mem::bank::BankState;
use crate::mem::config::{ControllerConfig, Fidelity, Technology};
use crate::mem::request::{IdGen, PageClass, Request, RequestId, RequestType, SubmitError};
use crate::mem::stats::Statistics;
use crate::mem::{Cycle, MemoryController, Violation};

struct PendingRequest {
    request: Request,
    class: PageClass,
    complete_cycle: Cycle,
}

pub struct TransactionalController {
    config: ControllerConfig,
    decoder: AddressDecoder,
    current_cycle: Cycle,
    ids: IdGen,
    pending: VecDeque<PendingRequest>,
    /// open row per flat bank, the whole page model at this fidelity
    open_rows: Vec<Option<usize>>,
    rng: StdRng,
    read_dist: Option<Normal>,
    write_dist: Option<Normal>,
    stats: Statistics,
    tracing: bool,
    violations: Vec<Violation>,
}

impl TransactionalController {
    pub fn new(config: ControllerConfig) -> Self {
        let decoder = AddressDecoder::new(
            &config.organization,
            config.address_mapping,
            config.custom_mapping.as_deref(),
        )
        .expect("config validated by the factory");
        let dist = |mean: Cycle, stddev: Cycle| {
            (stddev > 0).then(|| {
                Normal::new(mean as f64, stddev as f64).expect("stddev checked above")
            })
        };
        let total_banks = config.organization.total_banks();
        let tracing = config.enable_tracing;
        Self {
            decoder,
            current_cycle: 0,
            ids: IdGen::default(),
            pending: VecDeque::new(),
            open_rows: vec![None; total_banks],
            // fixed seed: identical configs replay identical latency streams
            rng: StdRng::seed_from_u64(0x6d656d73696d),
            read_dist: dist(config.timing.mean_read_latency, config.timing.latency_stddev),
            write_dist: dist(config.timing.mean_write_latency, config.timing.latency_stddev),
            stats: Statistics::new(),
            tracing,
            violations: Vec::new(),
            config,
        }
    }

    fn sample_latency(&mut self, ty: RequestType, class: PageClass) -> Cycle {
        let raw = match ty {
            RequestType::Read => match &self.read_dist {
                Some(dist) => dist.sample(&mut self.rng),
                None => self.config.timing.mean_read_latency as f64,
            },
            RequestType::Write => match &self.write_dist {
                Some(dist) => dist.sample(&mut self.rng),
                None => self.config.timing.mean_write_latency as f64,
            },
        };
        let factor = match class {
            PageClass::Hit => self.config.timing.page_hit_factor,
            PageClass::Empty => self.config.timing.page_empty_factor,
            PageClass::Conflict => self.config.timing.page_conflict_factor,
        };
        (raw.max(1.0) * factor).round().max(1.0) as Cycle
    }
}

impl MemoryController for TransactionalController {
    fn submit(&mut self, mut request: Request) -> Result<RequestId, SubmitError> {
        if self.pending.len() >= self.config.queue_depth {
            return Err(SubmitError::QueueFull);
        }
        request.loc = self.decoder.decode(request.address)?;
        request.id = self.ids.alloc();
        request.submit_cycle = self.current_cycle;

        let bank = request.loc.flat_bank(&self.config.organization);
        let class = match self.open_rows[bank] {
            Some(row) if row == request.loc.row => PageClass::Hit,
            Some(_) => PageClass::Conflict,
            None => PageClass::Empty,
        };
        self.open_rows[bank] = Some(request.loc.row);

        let latency = self.sample_latency(request.ty, class);
        let complete_cycle = self.current_cycle + latency;
        if self.tracing {
            trace!(id = request.id, bank, ?class, latency, "transactional enqueue");
        }
        let id = request.id;
        self.pending.push_back(PendingRequest {
            request,
            class,
            complete_cycle,
        });
        Ok(id)
    }

    fn can_accept(&self) -> bool {
        self.pending.len() < self.config.queue_depth
    }

    fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn tick(&mut self) {
        self.current_cycle += 1;
        // release everything whose time has come, in submission order
        let mut slot = 0;
        while slot < self.pending.len() {
            if self.pending[slot].complete_cycle <= self.current_cycle {
                let mut done = self.pending.remove(slot).expect("slot bounded by len");
                let latency = self.current_cycle - done.request.submit_cycle;
                if self.config.enable_statistics {
                    self.stats.record_completion(done.request.ty, latency);
                    self.stats.record_issue(done.class);
                }
                if let Some(callback) = done.request.take_callback() {
                    callback(latency);
                }
            } else {
                slot += 1;
            }
        }
    }

    fn reset(&mut self) {
        self.current_cycle = 0;
        self.pending.clear();
        self.open_rows.fill(None);
        self.stats.reset();
    }

    fn cycle(&self) -> Cycle {
        self.current_cycle
    }

    fn set_cycle(&mut self, cycle: Cycle) {
        self.current_cycle = cycle;
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::Transactional
    }

    fn technology(&self) -> Technology {
        self.config.technology
    }

    fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn bank_state(&self, channel: usize, bank: usize) -> BankState {
        let flat = channel * self.config.organization.banks_per_channel() + bank;
        match self.open_rows.get(flat) {
            Some(Some(_)) => BankState::Active,
            _ => BankState::Idle,
        }
    }

    fn is_row_open(&self, channel: usize, bank: usize, row: usize) -> bool {
        self.open_row(channel, bank) == Some(row)
    }

    fn open_row(&self, channel: usize, bank: usize) -> Option<usize> {
        let flat = channel * self.config.organization.banks_per_channel() + bank;
        self.open_rows.get(flat).copied().flatten()
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
