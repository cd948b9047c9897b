//! fifo scheduling
//!
//! requests are served strictly in arrival order per bank, with no row
//! buffer awareness. starvation free and deterministic, at the cost of row
//! locality.

use super::{RequestBuffer, Scheduler};
use crate::mem::request::RequestType;

pub struct FifoScheduler {
    buffer: RequestBuffer,
}

impl FifoScheduler {
    pub fn new(buffer: RequestBuffer) -> Self {
        Self { buffer }
    }
}

impl Scheduler for FifoScheduler {
    fn buffer(&self) -> &RequestBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut RequestBuffer {
        &mut self.buffer
    }

    fn select(
        &mut self,
        bank: usize,
        _open_row: Option<usize>,
        _last_cmd: RequestType,
    ) -> Option<usize> {
        if self.buffer.queue(bank).is_empty() {
            None
        } else {
            Some(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::super::SchedulerConfig;
    use super::*;

    #[test]
    fn always_picks_the_oldest() {
        let org = test_org();
        let buffer = RequestBuffer::new(&SchedulerConfig::default(), &org, 8);
        let mut scheduler = FifoScheduler::new(buffer);
        scheduler.store(decoded(1, addr(0, 0, 3, 0), RequestType::Read)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 7, 0), RequestType::Read)).unwrap();

        // row 7 is open, fifo still returns the older row-3 request
        let slot = scheduler.select(0, Some(7), RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }

    #[test]
    fn empty_bank_returns_none() {
        let org = test_org();
        let buffer = RequestBuffer::new(&SchedulerConfig::default(), &org, 8);
        let mut scheduler = FifoScheduler::new(buffer);
        assert!(scheduler.select(0, None, RequestType::Read).is_none());
    }

    #[test]
    fn issue_order_matches_arrival_order() {
        let org = test_org();
        let buffer = RequestBuffer::new(&SchedulerConfig::default(), &org, 8);
        let mut scheduler = FifoScheduler::new(buffer);
        for id in 1..=4 {
            scheduler
                .store(decoded(id, addr(0, 0, id, 0), RequestType::Read))
                .unwrap();
        }
        let mut order = vec![];
        while let Some(slot) = scheduler.select(0, Some(1), RequestType::Read) {
            order.push(scheduler.take(0, slot).id);
        }
        assert_eq!(order, vec![1, 2, 3, 4]);
    }
}
