//! grouping-first policies
//!
//! these put read/write grouping above row locality: the queue is first
//! partitioned by command type and fr-fcfs runs inside the partition. the
//! watermark variant switches type in batches to keep turnarounds rare even
//! under mixed traffic.

use itertools::Itertools;

use super::{RequestBuffer, Scheduler};
use crate::mem::request::RequestType;

fn partition_select(
    buffer: &RequestBuffer,
    bank: usize,
    open_row: Option<usize>,
    ty: RequestType,
) -> Option<usize> {
    let partition = (0..buffer.depth(bank))
        .filter(|&slot| buffer.peek(bank, slot).ty == ty)
        .collect_vec();
    if partition.is_empty() {
        return None;
    }
    if let Some(row) = open_row {
        if let Some(&slot) = partition
            .iter()
            .find(|&&slot| buffer.peek(bank, slot).loc.row == row)
        {
            return Some(slot);
        }
    }
    partition.first().copied()
}

/// grouping priority over row hits: serve the last command's type first,
/// fr-fcfs within it, and only switch type when the partition is empty
pub struct GrpFrFcfsScheduler {
    buffer: RequestBuffer,
}

impl GrpFrFcfsScheduler {
    pub fn new(buffer: RequestBuffer) -> Self {
        Self { buffer }
    }
}

impl Scheduler for GrpFrFcfsScheduler {
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
        partition_select(&self.buffer, bank, open_row, last_cmd)
            .or_else(|| partition_select(&self.buffer, bank, open_row, last_cmd.other()))
    }
}

/// grouping with watermark hysteresis: the scheduler stays in the current
/// type until the opposite queue exceeds the high watermark or the current
/// one falls below the low watermark
pub struct GrpFrFcfsWmScheduler {
    buffer: RequestBuffer,
    high_watermark: usize,
    low_watermark: usize,
    current: RequestType,
}

impl GrpFrFcfsWmScheduler {
    pub fn new(buffer: RequestBuffer, high_watermark: usize, low_watermark: usize) -> Self {
        Self {
            buffer,
            high_watermark,
            low_watermark,
            current: RequestType::Read,
        }
    }

    /// the type the scheduler is currently batching
    pub fn current_type(&self) -> RequestType {
        self.current
    }

    fn update_batch(&mut self) {
        let (own, opposite) = match self.current {
            RequestType::Read => (self.buffer.pending_reads(), self.buffer.pending_writes()),
            RequestType::Write => (self.buffer.pending_writes(), self.buffer.pending_reads()),
        };
        // the zero guard keeps the batch from wedging when the low watermark
        // is zero and the own-type queue has run dry
        if opposite > self.high_watermark
            || own < self.low_watermark
            || (own == 0 && opposite > 0)
        {
            self.current = self.current.other();
        }
    }
}

impl Scheduler for GrpFrFcfsWmScheduler {
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
        self.update_batch();
        // no fallback to the other type: the batch boundary is the watermark
        partition_select(&self.buffer, bank, open_row, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::super::SchedulerConfig;
    use super::*;

    #[test]
    fn grouping_beats_row_hits() {
        let buffer =
            RequestBuffer::new(&SchedulerConfig::default(), &test_org(), 8).with_grouping();
        let mut scheduler = GrpFrFcfsScheduler::new(buffer);
        // a read row hit and an older write miss; last command write
        scheduler.store(decoded(1, addr(0, 0, 5, 0), RequestType::Write)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 2, 0), RequestType::Read)).unwrap();

        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }

    #[test]
    fn switches_partition_when_empty() {
        let buffer =
            RequestBuffer::new(&SchedulerConfig::default(), &test_org(), 8).with_grouping();
        let mut scheduler = GrpFrFcfsScheduler::new(buffer);
        scheduler.store(decoded(1, addr(0, 0, 2, 0), RequestType::Read)).unwrap();
        let slot = scheduler.select(0, None, RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }

    #[test]
    fn watermark_switch_on_opposite_pressure() {
        let config = SchedulerConfig {
            high_watermark: 2,
            low_watermark: 1,
            ..Default::default()
        };
        let buffer = RequestBuffer::new(&config, &test_org(), 16).with_grouping();
        let mut scheduler = GrpFrFcfsWmScheduler::new(buffer, 2, 1);
        for id in 1..=2 {
            scheduler
                .store(decoded(id, addr(0, 0, id, 0), RequestType::Read))
                .unwrap();
        }
        for id in 3..=6 {
            scheduler
                .store(decoded(id, addr(0, 0, id, 0), RequestType::Write))
                .unwrap();
        }
        // writes (4) exceed the high watermark (2): the read batch ends
        let slot = scheduler.select(0, None, RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).ty, RequestType::Write);
        assert_eq!(scheduler.current_type(), RequestType::Write);
    }

    #[test]
    fn watermark_switch_on_own_type_drained() {
        let buffer = RequestBuffer::new(&SchedulerConfig::default(), &test_org(), 16)
            .with_grouping();
        let mut scheduler = GrpFrFcfsWmScheduler::new(buffer, 8, 2);
        scheduler.store(decoded(1, addr(0, 0, 1, 0), RequestType::Read)).unwrap();
        scheduler.store(decoded(2, addr(0, 0, 2, 0), RequestType::Write)).unwrap();
        // one read left, below the low watermark of 2: switch to writes
        let slot = scheduler.select(0, None, RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).ty, RequestType::Write);
    }

    #[test]
    fn batch_holds_between_watermarks() {
        let buffer = RequestBuffer::new(&SchedulerConfig::default(), &test_org(), 16)
            .with_grouping();
        let mut scheduler = GrpFrFcfsWmScheduler::new(buffer, 8, 1);
        for id in 1..=3 {
            scheduler
                .store(decoded(id, addr(0, 0, id, 0), RequestType::Read))
                .unwrap();
        }
        for id in 4..=6 {
            scheduler
                .store(decoded(id, addr(0, 0, id, 0), RequestType::Write))
                .unwrap();
        }
        // 3 reads >= low, 3 writes <= high: stay with reads
        let slot = scheduler.select(0, None, RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).ty, RequestType::Read);
        assert_eq!(scheduler.current_type(), RequestType::Read);
    }
}
