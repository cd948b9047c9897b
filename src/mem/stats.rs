//! controller statistics
//!
//! an additive counter bundle. counters are updated only on state changing
//! calls (submit, issue, completion, tick); observers are side effect free.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use super::request::{PageClass, RequestType};
use super::Cycle;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Statistics {
    // request counts
    pub reads: u64,
    pub writes: u64,

    // row buffer outcomes, classified at issue
    pub page_hits: u64,
    pub page_empty: u64,
    pub page_conflicts: u64,

    // latency, in cycles
    pub total_read_latency: u64,
    pub total_write_latency: u64,
    pub min_latency: u64,
    pub max_latency: u64,

    // utilization, in cycles
    pub busy_cycles: u64,
    pub idle_cycles: u64,
    pub stall_cycles: u64,

    // refresh
    pub refreshes: u64,
    pub refresh_cycles: u64,

    // bus turnarounds
    pub read_to_write_turnarounds: u64,
    pub write_to_read_turnarounds: u64,

    // bank state occupancy, in bank-cycles
    pub active_cycles: u64,
    pub precharge_cycles: u64,
    pub powerdown_cycles: u64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            reads: 0,
            writes: 0,
            page_hits: 0,
            page_empty: 0,
            page_conflicts: 0,
            total_read_latency: 0,
            total_write_latency: 0,
            min_latency: u64::MAX,
            max_latency: 0,
            busy_cycles: 0,
            idle_cycles: 0,
            stall_cycles: 0,
            refreshes: 0,
            refresh_cycles: 0,
            read_to_write_turnarounds: 0,
            write_to_read_turnarounds: 0,
            active_cycles: 0,
            precharge_cycles: 0,
            powerdown_cycles: 0,
        }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn reset(&mut self) {
        *self = Default::default();
    }

    /// record the row buffer outcome of a command issue
    pub fn record_issue(&mut self, class: PageClass) {
        match class {
            PageClass::Hit => self.page_hits += 1,
            PageClass::Empty => self.page_empty += 1,
            PageClass::Conflict => self.page_conflicts += 1,
        }
    }

    /// record a completed request
    pub fn record_completion(&mut self, ty: RequestType, latency: Cycle) {
        match ty {
            RequestType::Read => {
                self.reads += 1;
                self.total_read_latency += latency;
            }
            RequestType::Write => {
                self.writes += 1;
                self.total_write_latency += latency;
            }
        }
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);
    }

    pub fn merge(&mut self, other: &Statistics) {
        self.reads += other.reads;
        self.writes += other.writes;
        self.page_hits += other.page_hits;
        self.page_empty += other.page_empty;
        self.page_conflicts += other.page_conflicts;
        self.total_read_latency += other.total_read_latency;
        self.total_write_latency += other.total_write_latency;
        self.min_latency = self.min_latency.min(other.min_latency);
        self.max_latency = self.max_latency.max(other.max_latency);
        self.busy_cycles += other.busy_cycles;
        self.idle_cycles += other.idle_cycles;
        self.stall_cycles += other.stall_cycles;
        self.refreshes += other.refreshes;
        self.refresh_cycles += other.refresh_cycles;
        self.read_to_write_turnarounds += other.read_to_write_turnarounds;
        self.write_to_read_turnarounds += other.write_to_read_turnarounds;
        self.active_cycles += other.active_cycles;
        self.precharge_cycles += other.precharge_cycles;
        self.powerdown_cycles += other.powerdown_cycles;
    }

    // derived metrics

    pub fn total_requests(&self) -> u64 {
        self.reads + self.writes
    }

    pub fn avg_read_latency(&self) -> f64 {
        if self.reads > 0 {
            self.total_read_latency as f64 / self.reads as f64
        } else {
            0.0
        }
    }

    pub fn avg_write_latency(&self) -> f64 {
        if self.writes > 0 {
            self.total_write_latency as f64 / self.writes as f64
        } else {
            0.0
        }
    }

    pub fn avg_latency(&self) -> f64 {
        let total = self.total_requests();
        if total > 0 {
            (self.total_read_latency + self.total_write_latency) as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn page_hit_rate(&self) -> f64 {
        let total = self.page_hits + self.page_empty + self.page_conflicts;
        if total > 0 {
            self.page_hits as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn page_conflict_rate(&self) -> f64 {
        let total = self.page_hits + self.page_empty + self.page_conflicts;
        if total > 0 {
            self.page_conflicts as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn utilization(&self) -> f64 {
        let total = self.busy_cycles + self.idle_cycles;
        if total > 0 {
            self.busy_cycles as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn read_ratio(&self) -> f64 {
        let total = self.total_requests();
        if total > 0 {
            self.reads as f64 / total as f64
        } else {
            0.0
        }
    }

    /// json snapshot of the counters
    pub fn to_json(&self) -> eyre::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "reads: {} writes: {}", self.reads, self.writes)?;
        writeln!(
            f,
            "page hits: {} empty: {} conflicts: {} (hit rate {:.3})",
            self.page_hits,
            self.page_empty,
            self.page_conflicts,
            self.page_hit_rate()
        )?;
        writeln!(
            f,
            "avg latency: {:.2} (read {:.2}, write {:.2})",
            self.avg_latency(),
            self.avg_read_latency(),
            self.avg_write_latency()
        )?;
        writeln!(
            f,
            "refreshes: {} ({} cycles), utilization {:.3}",
            self.refreshes,
            self.refresh_cycles,
            self.utilization()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_classifies_by_type() {
        let mut stats = Statistics::new();
        stats.record_completion(RequestType::Read, 50);
        stats.record_completion(RequestType::Write, 70);
        assert_eq!(stats.total_requests(), 2);
        assert_eq!(stats.total_read_latency, 50);
        assert_eq!(stats.total_write_latency, 70);
        assert_eq!(stats.min_latency, 50);
        assert_eq!(stats.max_latency, 70);
        assert_eq!(stats.avg_latency(), 60.0);
    }

    #[test]
    fn issue_classification_partitions() {
        let mut stats = Statistics::new();
        stats.record_issue(PageClass::Hit);
        stats.record_issue(PageClass::Hit);
        stats.record_issue(PageClass::Empty);
        stats.record_issue(PageClass::Conflict);
        assert_eq!(stats.page_hits + stats.page_empty + stats.page_conflicts, 4);
        assert_eq!(stats.page_hit_rate(), 0.5);
        assert_eq!(stats.page_conflict_rate(), 0.25);
    }

    #[test]
    fn merge_adds_counters() {
        let mut a = Statistics::new();
        a.record_completion(RequestType::Read, 10);
        let mut b = Statistics::new();
        b.record_completion(RequestType::Read, 30);
        a.merge(&b);
        assert_eq!(a.reads, 2);
        assert_eq!(a.min_latency, 10);
        assert_eq!(a.max_latency, 30);
    }

    #[test]
    fn json_snapshot() {
        let stats = Statistics::new();
        let json = stats.to_json().unwrap();
        assert!(json.contains("\"reads\": 0"));
    }
}
