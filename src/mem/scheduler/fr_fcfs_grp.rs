//! fr-fcfs with read/write grouping
//!
//! among the row hits, requests whose type matches the last issued command
//! are preferred so the bus amortises turnaround penalties (tWTR, tRTW). an
//! earlier queued request to the same address blocks selection of a later
//! one out of order (raw/war guard).
//!
//! priority order: same-type hazard-free row hit, then any hazard-free row
//! hit, then the oldest request.

use itertools::Itertools;

use super::{RequestBuffer, Scheduler};
use crate::mem::request::RequestType;

pub struct FrFcfsGrpScheduler {
    buffer: RequestBuffer,
}

impl FrFcfsGrpScheduler {
    pub fn new(buffer: RequestBuffer) -> Self {
        Self { buffer }
    }
}

/// shared by the qos scheduler: grouped row-hit selection over an arbitrary
/// candidate slot list, hazard checked against the whole bank queue
pub(super) fn grouped_select(
    buffer: &RequestBuffer,
    bank: usize,
    open_row: Option<usize>,
    last_cmd: RequestType,
    candidates: &[usize],
) -> Option<usize> {
    if candidates.is_empty() {
        return None;
    }
    if let Some(row) = open_row {
        let hits = candidates
            .iter()
            .copied()
            .filter(|&slot| buffer.peek(bank, slot).loc.row == row)
            .collect_vec();
        // grouping first: same type as the last command, no address hazard
        if let Some(&slot) = hits.iter().find(|&&slot| {
            buffer.peek(bank, slot).ty == last_cmd && !buffer.hazard_blocked(bank, slot)
        }) {
            return Some(slot);
        }
        if let Some(&slot) = hits.iter().find(|&&slot| !buffer.hazard_blocked(bank, slot)) {
            return Some(slot);
        }
    }
    // no usable hit: oldest candidate that is not hazard blocked. the head of
    // the queue never is.
    candidates
        .iter()
        .copied()
        .find(|&slot| !buffer.hazard_blocked(bank, slot))
}

impl Scheduler for FrFcfsGrpScheduler {
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
        last_cmd: RequestType,
    ) -> Option<usize> {
        let all = (0..self.buffer.depth(bank)).collect_vec();
        grouped_select(&self.buffer, bank, open_row, last_cmd, &all)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::super::SchedulerConfig;
    use super::*;

    fn scheduler() -> FrFcfsGrpScheduler {
        FrFcfsGrpScheduler::new(
            RequestBuffer::new(&SchedulerConfig::default(), &test_org(), 8).with_grouping(),
        )
    }

    #[test]
    fn groups_same_type_row_hits() {
        // queue: W(A,row 2), R(B,row 2), W(C,row 2); last command write.
        // expected service order: W(A), W(C), R(B).
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 2, 0), RequestType::Write)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 2, 8), RequestType::Read)).unwrap();
        scheduler.store(decoded(3, addr(0, 0, 2, 16), RequestType::Write)).unwrap();

        let mut order = vec![];
        for _ in 0..3 {
            let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
            order.push(scheduler.take(0, slot).id);
        }
        assert_eq!(order, vec![1, 3, 2]);
    }

    #[test]
    fn hazard_blocks_out_of_order_same_address() {
        // an older read to the same address blocks the matching-type write
        let same = addr(0, 0, 2, 0);
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, same, RequestType::Read)).unwrap();
        scheduler.store(decoded(2, same, RequestType::Write)).unwrap();

        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }

    #[test]
    fn falls_back_to_any_row_hit_then_oldest() {
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 5, 0), RequestType::Write)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 2, 0), RequestType::Read)).unwrap();

        // no write row hit exists, the read hit wins over the older write
        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 2);

        // no hit at all: oldest
        let slot = scheduler.select(0, Some(9), RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }

    #[test]
    fn counts_grouping_decisions_on_take() {
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 2, 0), RequestType::Write)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 2, 8), RequestType::Write)).unwrap();
        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        scheduler.take(0, slot);
        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        scheduler.take(0, slot);
        assert_eq!(scheduler.requests_selected(), 2);
        assert_eq!(scheduler.grouping_decisions(), 1);
    }
}
