//! first-ready first-come-first-served
//!
//! row hits are preferred over arrival order; with no hit (or a precharged
//! bank) the oldest request wins. the most common dram policy: a good
//! balance of throughput, fairness and hardware cost.

use super::{RequestBuffer, Scheduler};
use crate::mem::request::RequestType;

pub struct FrFcfsScheduler {
    buffer: RequestBuffer,
}

impl FrFcfsScheduler {
    pub fn new(buffer: RequestBuffer) -> Self {
        Self { buffer }
    }
}

impl Scheduler for FrFcfsScheduler {
    fn buffer(&self) -> &RequestBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut RequestBuffer {
        &mut self.buffer
    }

    fn select(
        &mut self,
        bank: usize,
        open_row: Option<usize>,
        _last_cmd: RequestType,
    ) -> Option<usize> {
        self.buffer.fr_fcfs_select(bank, open_row)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::super::SchedulerConfig;
    use super::*;

    fn scheduler() -> FrFcfsScheduler {
        FrFcfsScheduler::new(RequestBuffer::new(
            &SchedulerConfig::default(),
            &test_org(),
            8,
        ))
    }

    #[test]
    fn prefers_row_hit_over_older_request() {
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 3, 0), RequestType::Read)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 7, 0), RequestType::Read)).unwrap();

        let slot = scheduler.select(0, Some(7), RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 2);
    }

    #[test]
    fn falls_back_to_oldest_without_hit() {
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 3, 0), RequestType::Read)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 7, 0), RequestType::Read)).unwrap();

        let slot = scheduler.select(0, Some(9), RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
        let slot = scheduler.select(0, None, RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }

    #[test]
    fn hit_candidates_win_whenever_present() {
        // property: if any row hit exists for an active bank the returned
        // request is a row hit
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 1, 0), RequestType::Read)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 2, 0), RequestType::Write)).unwrap();
        scheduler.store(decoded(3, addr(0, 0, 2, 8), RequestType::Read)).unwrap();

        let slot = scheduler.select(0, Some(2), RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).loc.row, 2);
        // arrival order breaks the tie between the two row-2 requests
        assert_eq!(scheduler.peek(0, slot).id, 2);
    }
}
