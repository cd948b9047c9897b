//! request scheduling
//!
//! the scheduler owns the request buffer and decides which request a bank
//! should serve next. the controller stays authoritative for timing; the
//! scheduler only picks which request to prefer. selection is handed out as
//! a (bank, slot) position and the request is moved out with [`Scheduler::take`]
//! when its cas actually issues.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::config::OrganizationParams;
use super::request::{PageClass, Request, RequestType};

mod fifo;
mod fr_fcfs;
mod fr_fcfs_grp;
mod grouped;
mod qos;

pub use fifo::FifoScheduler;
pub use fr_fcfs::FrFcfsScheduler;
pub use fr_fcfs_grp::FrFcfsGrpScheduler;
pub use grouped::{GrpFrFcfsScheduler, GrpFrFcfsWmScheduler};
pub use qos::QosAwareScheduler;

/// scheduling policy
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPolicy {
    /// oldest first, no row awareness
    Fifo,
    /// first-ready first-come-first-served, row hits preferred
    FrFcfs,
    /// fr-fcfs with read/write grouping and address hazard guard
    FrFcfsGrp,
    /// grouping priority over row hits
    GrpFrFcfs,
    /// grouping with watermark batch switching
    GrpFrFcfsWm,
    /// priority tiers first, fr-fcfs-grp within a tier
    QosAware,
}

/// buffer organization
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferType {
    /// one shared budget for all banks
    Shared,
    /// per bank slots drawn from the shared budget
    Bankwise,
    /// separate read and write budgets
    ReadWrite,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SchedulerConfig {
    pub policy: SchedulerPolicy,
    pub buffer_type: BufferType,
    /// read budget for [`BufferType::ReadWrite`]
    pub read_buffer_size: usize,
    /// write budget for [`BufferType::ReadWrite`]
    pub write_buffer_size: usize,
    /// switch away from the current type when the opposite queue exceeds this
    pub high_watermark: usize,
    /// switch away from the current type when it falls below this
    pub low_watermark: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: SchedulerPolicy::FrFcfs,
            buffer_type: BufferType::Bankwise,
            read_buffer_size: 16,
            write_buffer_size: 16,
            high_watermark: 8,
            low_watermark: 4,
        }
    }
}

/// the owning request store behind every policy. requests live in exactly one
/// per-bank queue slot; insertion order is preserved so "oldest" is well
/// defined.
#[derive(Debug)]
pub struct RequestBuffer {
    org: OrganizationParams,
    queues: Vec<VecDeque<Request>>,
    buffer_type: BufferType,
    capacity: usize,
    read_capacity: usize,
    write_capacity: usize,
    reads: usize,
    writes: usize,
    // lifetime selection counters, bumped only when a cas actually issues
    selected: u64,
    row_hits_selected: u64,
    grouping_decisions: u64,
    count_grouping: bool,
    last_taken: Option<RequestType>,
}

impl RequestBuffer {
    pub fn new(config: &SchedulerConfig, org: &OrganizationParams, capacity: usize) -> Self {
        Self {
            org: org.clone(),
            queues: (0..org.total_banks()).map(|_| VecDeque::new()).collect(),
            buffer_type: config.buffer_type,
            capacity,
            read_capacity: config.read_buffer_size,
            write_capacity: config.write_buffer_size,
            reads: 0,
            writes: 0,
            selected: 0,
            row_hits_selected: 0,
            grouping_decisions: 0,
            count_grouping: false,
            last_taken: None,
        }
    }

    fn with_grouping(mut self) -> Self {
        self.count_grouping = true;
        self
    }

    pub fn has_space(&self, count: usize) -> bool {
        self.occupancy() + count <= self.capacity
    }

    /// would a request of this type fit right now
    pub fn can_store(&self, ty: RequestType) -> bool {
        if !self.has_space(1) {
            return false;
        }
        if self.buffer_type == BufferType::ReadWrite {
            match ty {
                RequestType::Read => self.reads < self.read_capacity,
                RequestType::Write => self.writes < self.write_capacity,
            }
        } else {
            true
        }
    }

    /// store a request in its decoded bank queue; hands the request back when
    /// the relevant budget is full
    pub fn store(&mut self, request: Request) -> Result<(), Request> {
        if !self.can_store(request.ty) {
            return Err(request);
        }
        match request.ty {
            RequestType::Read => self.reads += 1,
            RequestType::Write => self.writes += 1,
        }
        let bank = request.loc.flat_bank(&self.org);
        self.queues[bank].push_back(request);
        Ok(())
    }

    /// move the selected request out at cas issue; updates the selection
    /// counters
    pub fn take(&mut self, bank: usize, slot: usize) -> Request {
        let request = self.queues[bank].remove(slot).expect("slot out of range");
        match request.ty {
            RequestType::Read => self.reads -= 1,
            RequestType::Write => self.writes -= 1,
        }
        self.selected += 1;
        if request.class == Some(PageClass::Hit) {
            self.row_hits_selected += 1;
        }
        if self.count_grouping && self.last_taken == Some(request.ty) {
            self.grouping_decisions += 1;
        }
        self.last_taken = Some(request.ty);
        request
    }

    pub fn peek(&self, bank: usize, slot: usize) -> &Request {
        &self.queues[bank][slot]
    }

    pub fn peek_mut(&mut self, bank: usize, slot: usize) -> &mut Request {
        &mut self.queues[bank][slot]
    }

    pub fn queue(&self, bank: usize) -> &VecDeque<Request> {
        &self.queues[bank]
    }

    pub fn occupancy(&self) -> usize {
        self.reads + self.writes
    }

    pub fn depth(&self, bank: usize) -> usize {
        self.queues[bank].len()
    }

    pub fn pending_reads(&self) -> usize {
        self.reads
    }

    pub fn pending_writes(&self) -> usize {
        self.writes
    }

    pub fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
        self.reads = 0;
        self.writes = 0;
        self.last_taken = None;
    }

    /// is an earlier queued request to the same address in the way. selecting
    /// the later one out of order would reorder a raw/war pair.
    pub fn hazard_blocked(&self, bank: usize, slot: usize) -> bool {
        let queue = &self.queues[bank];
        let address = queue[slot].address;
        queue.iter().take(slot).any(|req| req.address == address)
    }

    /// oldest request with a row hit, arrival order otherwise
    pub fn fr_fcfs_select(&self, bank: usize, open_row: Option<usize>) -> Option<usize> {
        let queue = &self.queues[bank];
        if queue.is_empty() {
            return None;
        }
        if let Some(row) = open_row {
            if let Some(slot) = queue.iter().position(|req| req.loc.row == row) {
                return Some(slot);
            }
        }
        Some(0)
    }
}

/// the scheduler interface the controller drives
pub trait Scheduler {
    fn buffer(&self) -> &RequestBuffer;
    fn buffer_mut(&mut self) -> &mut RequestBuffer;

    /// pick the preferred slot for a bank given its open row and the last
    /// issued command type. returns None when nothing should issue for this
    /// bank this cycle.
    fn select(
        &mut self,
        bank: usize,
        open_row: Option<usize>,
        last_cmd: RequestType,
    ) -> Option<usize>;

    fn has_space(&self, count: usize) -> bool {
        self.buffer().has_space(count)
    }
    fn can_store(&self, ty: RequestType) -> bool {
        self.buffer().can_store(ty)
    }
    fn store(&mut self, request: Request) -> Result<(), Request> {
        self.buffer_mut().store(request)
    }
    fn take(&mut self, bank: usize, slot: usize) -> Request {
        self.buffer_mut().take(bank, slot)
    }
    fn peek(&self, bank: usize, slot: usize) -> &Request {
        self.buffer().peek(bank, slot)
    }
    fn peek_mut(&mut self, bank: usize, slot: usize) -> &mut Request {
        self.buffer_mut().peek_mut(bank, slot)
    }
    fn occupancy(&self) -> usize {
        self.buffer().occupancy()
    }
    fn buffer_depth(&self, bank: usize) -> usize {
        self.buffer().depth(bank)
    }
    fn has_row_hit(&self, bank: usize, row: usize, ty: RequestType) -> bool {
        self.buffer()
            .queue(bank)
            .iter()
            .any(|req| req.loc.row == row && req.ty == ty)
    }
    fn has_pending(&self, bank: usize, ty: RequestType) -> bool {
        self.buffer().queue(bank).iter().any(|req| req.ty == ty)
    }
    fn has_any_pending(&self) -> bool {
        self.buffer().occupancy() > 0
    }
    fn clear(&mut self) {
        self.buffer_mut().clear()
    }

    fn requests_selected(&self) -> u64 {
        self.buffer().selected
    }
    fn row_hits_selected(&self) -> u64 {
        self.buffer().row_hits_selected
    }
    fn grouping_decisions(&self) -> u64 {
        self.buffer().grouping_decisions
    }
}

/// create a scheduler for the configured policy
pub fn create_scheduler(
    config: &SchedulerConfig,
    org: &OrganizationParams,
    capacity: usize,
) -> Box<dyn Scheduler> {
    let buffer = RequestBuffer::new(config, org, capacity);
    match config.policy {
        SchedulerPolicy::Fifo => Box::new(FifoScheduler::new(buffer)),
        SchedulerPolicy::FrFcfs => Box::new(FrFcfsScheduler::new(buffer)),
        SchedulerPolicy::FrFcfsGrp => Box::new(FrFcfsGrpScheduler::new(buffer.with_grouping())),
        SchedulerPolicy::GrpFrFcfs => Box::new(GrpFrFcfsScheduler::new(buffer.with_grouping())),
        SchedulerPolicy::GrpFrFcfsWm => Box::new(GrpFrFcfsWmScheduler::new(
            buffer.with_grouping(),
            config.high_watermark,
            config.low_watermark,
        )),
        SchedulerPolicy::QosAware => Box::new(QosAwareScheduler::new(buffer.with_grouping())),
    }
}
