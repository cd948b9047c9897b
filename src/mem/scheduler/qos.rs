//! qos aware scheduling
//!
//! lexicographic priority: realtime > high > normal > low; inside a tier the
//! fr-fcfs-grp rules apply. a hazard against an earlier lower-tier request
//! resolves to the blocking request itself so ordering is never violated and
//! the tier cannot livelock.

use itertools::Itertools;

use super::fr_fcfs_grp::grouped_select;
use super::{RequestBuffer, Scheduler};
use crate::mem::request::RequestType;

pub struct QosAwareScheduler {
    buffer: RequestBuffer,
}

impl QosAwareScheduler {
    pub fn new(buffer: RequestBuffer) -> Self {
        Self { buffer }
    }
}

impl Scheduler for QosAwareScheduler {
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
        let queue = self.buffer.queue(bank);
        let top = queue.iter().map(|req| req.priority).max()?;
        let tier = (0..queue.len())
            .filter(|&slot| queue[slot].priority == top)
            .collect_vec();

        if let Some(slot) = grouped_select(&self.buffer, bank, open_row, last_cmd, &tier) {
            return Some(slot);
        }
        // every tier candidate is hazard blocked: serve the earliest request
        // at the blocking address to clear the dependency
        let address = self.buffer.peek(bank, tier[0]).address;
        (0..self.buffer.depth(bank))
            .find(|&slot| self.buffer.peek(bank, slot).address == address)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testutil::*;
    use super::super::SchedulerConfig;
    use super::*;
    use crate::mem::request::Priority;

    fn scheduler() -> QosAwareScheduler {
        QosAwareScheduler::new(
            RequestBuffer::new(&SchedulerConfig::default(), &test_org(), 8).with_grouping(),
        )
    }

    #[test]
    fn realtime_preempts_older_normal() {
        let mut scheduler = scheduler();
        scheduler.store(decoded(1, addr(0, 0, 1, 0), RequestType::Read)).unwrap();
        let mut realtime = decoded(2, addr(0, 0, 9, 0), RequestType::Read);
        realtime.priority = Priority::Realtime;
        scheduler.store(realtime).unwrap();

        // the normal request is older and a row hit, the realtime one wins
        let slot = scheduler.select(0, Some(1), RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 2);
    }

    #[test]
    fn fr_fcfs_grp_within_tier() {
        let mut scheduler = scheduler();
        let mut a = decoded(1, addr(0, 0, 2, 0), RequestType::Write);
        a.priority = Priority::High;
        let mut b = decoded(2, addr(0, 0, 2, 8), RequestType::Read);
        b.priority = Priority::High;
        let mut c = decoded(3, addr(0, 0, 2, 16), RequestType::Write);
        c.priority = Priority::High;
        scheduler.store(a).unwrap();
        scheduler.store(b).unwrap();
        scheduler.store(c).unwrap();

        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
        scheduler.take(0, slot);
        let slot = scheduler.select(0, Some(2), RequestType::Write).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 3);
    }

    #[test]
    fn blocked_tier_serves_the_blocker() {
        let mut scheduler = scheduler();
        let same = addr(0, 0, 4, 0);
        scheduler.store(decoded(1, same, RequestType::Write)).unwrap();
        let mut realtime = decoded(2, same, RequestType::Read);
        realtime.priority = Priority::Realtime;
        scheduler.store(realtime).unwrap();

        // the realtime read aliases the older normal write: the write goes
        // first so the read observes its data
        let slot = scheduler.select(0, Some(4), RequestType::Read).unwrap();
        assert_eq!(scheduler.peek(0, slot).id, 1);
    }
}
