//! refresh management
//!
//! tracks per-unit refresh deadlines (a unit is a bank, a rank, or a bank
//! index across ranks, depending on policy), signals urgency, and books
//! postponement and pull-in. the controller owns arbitration: when a unit is
//! urgent, refresh preempts request issue on its banks; otherwise requests
//! win and the refresh postpones up to the limit.

use serde::{Deserialize, Serialize};

use super::config::{OrganizationParams, TimingParams};
use super::Cycle;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// no refresh at all (sram-like)
    None,
    /// one REF covers every bank of a rank, cost tRFC
    AllBank,
    /// REFpb targets one bank, cost tRFCpb, other banks stay available
    PerBank,
    /// ddr5 REFsb: the same bank index in every rank, cost tRFCsb
    SameBank,
    /// a bank pair per REF, cost tRFCpb
    Per2Bank,
    /// hbm3 fine granularity: half the interval, half the per-bank cost
    FineGranularity,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RefreshConfig {
    pub policy: RefreshPolicy,
    /// maximum deferrals of one deadline, in multiples of tREFI
    pub max_postpone: u32,
    /// maximum refreshes issued ahead of their deadline
    pub max_pull_in: u32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            policy: RefreshPolicy::PerBank,
            max_postpone: 8,
            max_pull_in: 8,
        }
    }
}

/// a bank addressed for refresh; `bank` indexes within the rank
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankId {
    pub channel: usize,
    pub rank: usize,
    pub bank: usize,
}

/// what the manager offers the controller for one refresh opportunity
#[derive(Debug, Clone)]
pub struct RefreshGrant {
    pub banks: Vec<BankId>,
    pub latency: Cycle,
    pub urgent: bool,
}

#[derive(Debug, Clone)]
struct Unit {
    channel: usize,
    banks: Vec<BankId>,
    deadline: Cycle,
    postpone_count: u32,
    pull_in_count: u32,
}

#[derive(Debug)]
pub struct RefreshManager {
    policy: RefreshPolicy,
    interval: Cycle,
    latency: Cycle,
    max_postpone: u32,
    max_pull_in: u32,
    units: Vec<Unit>,
    now: Cycle,
    // lifetime counters
    refresh_count: u64,
    postpone_total: u64,
    pull_in_total: u64,
    refresh_cycles: u64,
}

impl RefreshManager {
    pub fn new(config: &RefreshConfig, timing: &TimingParams, org: &OrganizationParams) -> Self {
        let (interval, latency) = match config.policy {
            RefreshPolicy::None => (timing.t_refi, 0),
            RefreshPolicy::AllBank => (timing.t_refi, timing.t_rfc),
            RefreshPolicy::PerBank => (timing.t_refi, timing.t_rfc_pb),
            RefreshPolicy::SameBank => (timing.t_refi, timing.t_rfc_sb),
            RefreshPolicy::Per2Bank => (timing.t_refi, timing.t_rfc_pb),
            RefreshPolicy::FineGranularity => {
                ((timing.t_refi / 2).max(1), (timing.t_rfc_pb / 2).max(1))
            }
        };
        let mut manager = Self {
            policy: config.policy,
            interval,
            latency,
            max_postpone: config.max_postpone,
            max_pull_in: config.max_pull_in,
            units: build_units(config.policy, org),
            now: 0,
            refresh_count: 0,
            postpone_total: 0,
            pull_in_total: 0,
            refresh_cycles: 0,
        };
        manager.stagger_deadlines();
        manager
    }

    /// spread initial deadlines over one interval so the units do not all
    /// come due in the same cycle
    fn stagger_deadlines(&mut self) {
        let count = self.units.len().max(1) as Cycle;
        for (i, unit) in self.units.iter_mut().enumerate() {
            unit.deadline = self.interval * (i as Cycle + 1) / count;
            unit.postpone_count = 0;
            unit.pull_in_count = 0;
        }
    }

    pub fn tick(&mut self) {
        self.now += 1;
    }

    /// align with an externally managed clock
    pub fn set_now(&mut self, now: Cycle) {
        self.now = now;
    }

    fn urgent(&self, unit: &Unit) -> bool {
        unit.deadline <= self.now && unit.postpone_count >= self.max_postpone
    }

    pub fn refresh_required(&self) -> bool {
        self.units.iter().any(|u| u.deadline <= self.now)
    }

    pub fn refresh_urgent(&self) -> bool {
        self.units.iter().any(|u| self.urgent(u))
    }

    /// banks of the most-due unit, across all channels
    pub fn banks_to_refresh(&self) -> Vec<BankId> {
        self.units
            .iter()
            .filter(|u| u.deadline <= self.now)
            .min_by_key(|u| (!self.urgent(u), u.deadline))
            .map(|u| u.banks.clone())
            .unwrap_or_default()
    }

    /// refresh cycle cost under the configured policy
    pub fn refresh_latency(&self) -> Cycle {
        self.latency
    }

    /// the most-due refresh opportunity in a channel, if any deadline has
    /// arrived. does not mutate; the controller commits with
    /// [`RefreshManager::refresh_issued`] or defers with
    /// [`RefreshManager::postpone`].
    pub fn due_in_channel(&self, channel: usize) -> Option<RefreshGrant> {
        self.units
            .iter()
            .filter(|u| u.channel == channel && u.deadline <= self.now)
            .min_by_key(|u| (!self.urgent(u), u.deadline))
            .map(|u| RefreshGrant {
                banks: u.banks.clone(),
                latency: self.latency,
                urgent: self.urgent(u),
            })
    }

    /// an early refresh opportunity for an idle channel: the unit with the
    /// nearest future deadline that still has pull-in budget
    pub fn pull_in_candidate(&self, channel: usize) -> Option<RefreshGrant> {
        self.units
            .iter()
            .filter(|u| {
                u.channel == channel
                    && u.deadline > self.now
                    && u.pull_in_count < self.max_pull_in
            })
            .min_by_key(|u| u.deadline)
            .map(|u| RefreshGrant {
                banks: u.banks.clone(),
                latency: self.latency,
                urgent: false,
            })
    }

    fn unit_of(&mut self, bank: BankId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.banks.contains(&bank))
    }

    /// a deadline-driven refresh went out for these banks: reset the unit
    pub fn refresh_issued(&mut self, banks: &[BankId]) {
        let now = self.now;
        let interval = self.interval;
        let latency = self.latency;
        let Some(&first) = banks.first() else {
            return;
        };
        let Some(unit) = self.unit_of(first) else {
            return;
        };
        unit.deadline = now + interval;
        unit.postpone_count = 0;
        unit.pull_in_count = 0;
        self.refresh_count += 1;
        self.refresh_cycles += latency;
    }

    /// an opportunistic early refresh went out: the next deadline is already
    /// satisfied, push it one interval out
    pub fn pull_in(&mut self, banks: &[BankId]) {
        let interval = self.interval;
        let latency = self.latency;
        let Some(&first) = banks.first() else {
            return;
        };
        let Some(unit) = self.unit_of(first) else {
            return;
        };
        unit.deadline += interval;
        unit.pull_in_count += 1;
        unit.postpone_count = 0;
        self.pull_in_total += 1;
        self.refresh_count += 1;
        self.refresh_cycles += latency;
    }

    /// true while no unit has exhausted its postponement budget
    pub fn can_postpone(&self) -> bool {
        !self.refresh_urgent()
    }

    /// defer the due refresh of the unit owning these banks by one interval.
    /// returns false at the postponement limit.
    pub fn postpone(&mut self, banks: &[BankId]) -> bool {
        let max_postpone = self.max_postpone;
        let interval = self.interval;
        let Some(&first) = banks.first() else {
            return false;
        };
        let Some(unit) = self.unit_of(first) else {
            return false;
        };
        if unit.postpone_count >= max_postpone {
            return false;
        }
        unit.postpone_count += 1;
        unit.deadline += interval;
        self.postpone_total += 1;
        true
    }

    /// highest postponement level over all units
    pub fn postpone_count(&self) -> u32 {
        self.units.iter().map(|u| u.postpone_count).max().unwrap_or(0)
    }

    /// highest pull-in level over all units
    pub fn pull_in_count(&self) -> u32 {
        self.units.iter().map(|u| u.pull_in_count).max().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.now = 0;
        self.refresh_count = 0;
        self.postpone_total = 0;
        self.pull_in_total = 0;
        self.refresh_cycles = 0;
        self.stagger_deadlines();
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    pub fn postpone_total(&self) -> u64 {
        self.postpone_total
    }

    pub fn pull_in_total(&self) -> u64 {
        self.pull_in_total
    }

    pub fn refresh_cycles(&self) -> u64 {
        self.refresh_cycles
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }
}

fn build_units(policy: RefreshPolicy, org: &OrganizationParams) -> Vec<Unit> {
    let unit = |channel, banks| Unit {
        channel,
        banks,
        deadline: 0,
        postpone_count: 0,
        pull_in_count: 0,
    };
    let banks_per_rank = org.banks_per_rank();
    let mut units = vec![];
    match policy {
        RefreshPolicy::None => {}
        RefreshPolicy::AllBank => {
            for channel in 0..org.num_channels {
                for rank in 0..org.ranks_per_channel {
                    let banks = (0..banks_per_rank)
                        .map(|bank| BankId { channel, rank, bank })
                        .collect();
                    units.push(unit(channel, banks));
                }
            }
        }
        RefreshPolicy::PerBank | RefreshPolicy::FineGranularity => {
            for channel in 0..org.num_channels {
                for rank in 0..org.ranks_per_channel {
                    for bank in 0..banks_per_rank {
                        units.push(unit(channel, vec![BankId { channel, rank, bank }]));
                    }
                }
            }
        }
        RefreshPolicy::SameBank => {
            for channel in 0..org.num_channels {
                for bank in 0..banks_per_rank {
                    let banks = (0..org.ranks_per_channel)
                        .map(|rank| BankId { channel, rank, bank })
                        .collect();
                    units.push(unit(channel, banks));
                }
            }
        }
        RefreshPolicy::Per2Bank => {
            let half = (banks_per_rank / 2).max(1);
            for channel in 0..org.num_channels {
                for rank in 0..org.ranks_per_channel {
                    for pair in 0..half {
                        let mut banks = vec![BankId { channel, rank, bank: pair }];
                        if pair + half < banks_per_rank {
                            banks.push(BankId { channel, rank, bank: pair + half });
                        }
                        units.push(unit(channel, banks));
                    }
                }
            }
        }
    }
    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(policy: RefreshPolicy) -> RefreshManager {
        let config = RefreshConfig {
            policy,
            max_postpone: 2,
            max_pull_in: 2,
        };
        let org = OrganizationParams {
            num_channels: 1,
            ranks_per_channel: 2,
            bank_groups_per_rank: 2,
            banks_per_bank_group: 2,
            ..Default::default()
        };
        RefreshManager::new(&config, &TimingParams::default(), &org)
    }

    fn tick_to(manager: &mut RefreshManager, cycle: Cycle) {
        while manager.now < cycle {
            manager.tick();
        }
    }

    #[test]
    fn none_policy_never_requires() {
        let mut manager = manager(RefreshPolicy::None);
        tick_to(&mut manager, 100_000);
        assert!(!manager.refresh_required());
        assert!(!manager.refresh_urgent());
    }

    #[test]
    fn deadlines_are_staggered() {
        let manager = manager(RefreshPolicy::PerBank);
        assert_eq!(manager.units.len(), 8);
        let first = manager.units.first().unwrap().deadline;
        let last = manager.units.last().unwrap().deadline;
        assert!(first < last);
        assert_eq!(last, TimingParams::default().t_refi);
    }

    #[test]
    fn becomes_due_then_urgent_after_postpones() {
        let mut manager = manager(RefreshPolicy::PerBank);
        let first_deadline = manager.units[0].deadline;
        tick_to(&mut manager, first_deadline);
        assert!(manager.refresh_required());
        assert!(!manager.refresh_urgent());

        let grant = manager.due_in_channel(0).unwrap();
        assert!(manager.postpone(&grant.banks));
        assert!(manager.postpone(&grant.banks));
        assert!(!manager.postpone(&grant.banks));
        assert_eq!(manager.postpone_count(), 2);

        let trefi = TimingParams::default().t_refi;
        tick_to(&mut manager, first_deadline + 2 * trefi);
        assert!(manager.refresh_urgent());
        let grant = manager.due_in_channel(0).unwrap();
        assert!(grant.urgent);
    }

    #[test]
    fn refresh_issued_resets_the_unit() {
        let mut manager = manager(RefreshPolicy::PerBank);
        let first_deadline = manager.units[0].deadline;
        tick_to(&mut manager, first_deadline);
        let grant = manager.due_in_channel(0).unwrap();
        manager.refresh_issued(&grant.banks);
        assert_eq!(manager.refresh_count(), 1);
        assert_eq!(
            manager.refresh_cycles(),
            TimingParams::default().t_rfc_pb
        );
        // the unit moved a full interval out
        let trefi = TimingParams::default().t_refi;
        assert!(!manager
            .units
            .iter()
            .any(|u| u.banks == grant.banks && u.deadline != manager.now + trefi));
    }

    #[test]
    fn all_bank_covers_the_rank() {
        let mut manager = manager(RefreshPolicy::AllBank);
        let deadline = manager.units[0].deadline;
        tick_to(&mut manager, deadline);
        let grant = manager.due_in_channel(0).unwrap();
        assert_eq!(grant.banks.len(), 4);
        assert_eq!(grant.latency, TimingParams::default().t_rfc);
    }

    #[test]
    fn same_bank_spans_ranks() {
        let manager = manager(RefreshPolicy::SameBank);
        assert_eq!(manager.units.len(), 4);
        let unit = &manager.units[0];
        assert_eq!(unit.banks.len(), 2);
        assert_eq!(unit.banks[0].bank, unit.banks[1].bank);
        assert_ne!(unit.banks[0].rank, unit.banks[1].rank);
    }

    #[test]
    fn pull_in_is_budgeted() {
        let mut manager = manager(RefreshPolicy::PerBank);
        let grant = manager.pull_in_candidate(0).unwrap();
        manager.pull_in(&grant.banks);
        manager.pull_in(&grant.banks);
        assert_eq!(manager.pull_in_total(), 2);
        // that unit is out of budget; the candidate moves to another unit
        let next = manager.pull_in_candidate(0).unwrap();
        assert_ne!(next.banks, grant.banks);
    }

    #[test]
    fn fine_granularity_halves_interval_and_cost() {
        let manager = manager(RefreshPolicy::FineGranularity);
        let timing = TimingParams::default();
        assert_eq!(manager.interval, timing.t_refi / 2);
        assert_eq!(manager.refresh_latency(), timing.t_rfc_pb / 2);
    }
}
