//! cycle accurate fidelity: per-bank protocol state machines
//!
//! every tick runs the fixed phase order: bank auto transitions, refresh
//! manager tick, per-channel arbitration (refresh against request issue, at
//! most one command per channel), burst completions in request id order, and
//! the invariant checker when enabled. channels are fully independent; no
//! command bus is shared across them.

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::mem::address::AddressDecoder;
use crate::mem::bank::{Bank, BankState};
use crate::mem::config::{ControllerConfig, Fidelity, Technology};
use crate::mem::refresh::{BankId, RefreshGrant, RefreshManager};
use crate::mem::request::{IdGen, PageClass, Request, RequestId, RequestType, SubmitError};
use crate::mem::scheduler::{create_scheduler, Scheduler};
use crate::mem::stats::Statistics;
use crate::mem::{Cycle, MemoryController, Violation};

/// commands on a channel bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Act,
    Rd,
    Wr,
    Pre,
    Ref,
}

#[derive(Debug, Clone, Copy)]
struct IssuedCommand {
    cycle: Cycle,
    command: Command,
    rank: usize,
    /// bank group index within the channel (rank major)
    group: usize,
    /// bank index within the channel
    bank: usize,
}

/// command history depth for the invariant checker; far wider than any
/// pairwise timing window at these queue depths
const HISTORY_DEPTH: usize = 64;

#[derive(Debug, Default)]
struct RankState {
    /// cycles of the last four ACTs, oldest first
    act_window: VecDeque<Cycle>,
    /// last ACT cycle and bank group, for tRRD
    last_act: Option<(Cycle, usize)>,
}

#[derive(Debug)]
struct ChannelState {
    /// last cas type taken on this channel, feeds scheduler grouping
    last_cmd: RequestType,
    /// last cas on the bus: cycle, group, type
    last_cas: Option<(Cycle, usize, RequestType)>,
    last_read: Option<(Cycle, usize)>,
    last_write: Option<(Cycle, usize)>,
    /// last cas cycle per bank group (rank major), for tCCD_L
    last_cas_per_group: Vec<Option<Cycle>>,
    ranks: Vec<RankState>,
    history: VecDeque<IssuedCommand>,
}

impl ChannelState {
    fn new(ranks: usize, groups_per_rank: usize) -> Self {
        Self {
            last_cmd: RequestType::Read,
            last_cas: None,
            last_read: None,
            last_write: None,
            last_cas_per_group: vec![None; ranks * groups_per_rank],
            ranks: (0..ranks).map(|_| RankState::default()).collect(),
            history: VecDeque::new(),
        }
    }

    fn record(&mut self, cmd: IssuedCommand) {
        if self.history.len() >= HISTORY_DEPTH {
            self.history.pop_front();
        }
        self.history.push_back(cmd);
    }
}

struct InFlight {
    request: Request,
    finish: Cycle,
}

pub struct CycleAccurateController {
    config: ControllerConfig,
    decoder: AddressDecoder,
    current_cycle: Cycle,
    ids: IdGen,
    /// all banks, channel major
    banks: Vec<Bank>,
    scheduler: Box<dyn Scheduler>,
    refresh: RefreshManager,
    channels: Vec<ChannelState>,
    in_flight: Vec<InFlight>,
    stats: Statistics,
    tracing: bool,
    check_invariants: bool,
    violations: Vec<Violation>,
}

impl CycleAccurateController {
    pub fn new(config: ControllerConfig) -> Self {
        let decoder = AddressDecoder::new(
            &config.organization,
            config.address_mapping,
            config.custom_mapping.as_deref(),
        )
        .expect("config validated by the factory");
        let org = &config.organization;
        let scheduler = create_scheduler(&config.scheduler, org, config.queue_depth);
        let refresh = RefreshManager::new(&config.refresh, &config.timing, org);
        let channels = (0..org.num_channels)
            .map(|_| ChannelState::new(org.ranks_per_channel, org.bank_groups_per_rank))
            .collect();
        let tracing = config.enable_tracing;
        let check_invariants = config.enable_invariants;
        Self {
            decoder,
            current_cycle: 0,
            ids: IdGen::default(),
            banks: (0..org.total_banks()).map(|_| Bank::new()).collect(),
            scheduler,
            refresh,
            channels,
            in_flight: Vec::new(),
            stats: Statistics::new(),
            tracing,
            check_invariants,
            violations: Vec::new(),
            config,
        }
    }

    /// the refresh collaborator, for its lifetime counters
    pub fn refresh_manager(&self) -> &RefreshManager {
        &self.refresh
    }

    /// the scheduler, for its selection counters
    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    /// (rank, group-in-channel, bank-in-rank) of a channel-local bank index
    fn geometry(&self, local: usize) -> (usize, usize, usize) {
        let org = &self.config.organization;
        let rank = local / org.banks_per_rank();
        let in_rank = local % org.banks_per_rank();
        let group = rank * org.bank_groups_per_rank + in_rank / org.banks_per_bank_group;
        (rank, group, in_rank)
    }

    fn flat_of(&self, bank: &BankId) -> usize {
        let org = &self.config.organization;
        (bank.channel * org.ranks_per_channel + bank.rank) * org.banks_per_rank() + bank.bank
    }

    fn arbitrate_channel(&mut self, channel: usize) -> bool {
        let mut excluded: Vec<usize> = vec![];
        if let Some(grant) = self.refresh.due_in_channel(channel) {
            if grant.urgent {
                // refresh preempts issue on the affected banks
                if self.try_issue_refresh(channel, &grant, false) {
                    return true;
                }
                if self.try_precharge_for_refresh(channel, &grant) {
                    return true;
                }
                excluded = grant.banks.iter().map(|b| self.flat_of(b)).collect();
            } else {
                let busy = grant.banks.iter().any(|bank| {
                    let flat = self.flat_of(bank);
                    self.scheduler.has_pending(flat, RequestType::Read)
                        || self.scheduler.has_pending(flat, RequestType::Write)
                });
                if busy {
                    // requests win until the postponement budget runs out
                    self.refresh.postpone(&grant.banks);
                } else {
                    if self.try_issue_refresh(channel, &grant, false) {
                        return true;
                    }
                    if self.try_precharge_for_refresh(channel, &grant) {
                        return true;
                    }
                }
            }
        }

        if self.try_issue_request(channel, &excluded) {
            return true;
        }

        // channel completely idle: pull a refresh in early
        if excluded.is_empty() && self.channel_idle(channel) {
            if let Some(grant) = self.refresh.pull_in_candidate(channel) {
                if self.try_issue_refresh(channel, &grant, true) {
                    return true;
                }
            }
        }
        false
    }

    fn channel_idle(&self, channel: usize) -> bool {
        let org = &self.config.organization;
        let base = channel * org.banks_per_channel();
        let no_queued = (base..base + org.banks_per_channel()).all(|flat| {
            !self.scheduler.has_pending(flat, RequestType::Read)
                && !self.scheduler.has_pending(flat, RequestType::Write)
        });
        let no_bursts = !self
            .in_flight
            .iter()
            .any(|f| f.request.loc.channel == channel);
        no_queued && no_bursts
    }

    /// issue REF on all banks of the grant if every one is precharged and
    /// past its activation gate
    fn try_issue_refresh(&mut self, channel: usize, grant: &RefreshGrant, pull_in: bool) -> bool {
        let now = self.current_cycle;
        let ready = grant.banks.iter().all(|bank| {
            let flat = self.flat_of(bank);
            self.banks[flat].state.is_idle() && now >= self.banks[flat].next_act
        });
        if !ready {
            return false;
        }
        for bank in &grant.banks {
            let flat = self.flat_of(bank);
            self.banks[flat].refresh(now, grant.latency);
        }
        if pull_in {
            self.refresh.pull_in(&grant.banks);
        } else {
            self.refresh.refresh_issued(&grant.banks);
        }
        if self.config.enable_statistics {
            self.stats.refreshes += 1;
            self.stats.refresh_cycles += grant.latency;
        }
        let local = self.flat_of(&grant.banks[0])
            - channel * self.config.organization.banks_per_channel();
        let (rank, group, _) = self.geometry(local);
        self.channels[channel].record(IssuedCommand {
            cycle: now,
            command: Command::Ref,
            rank,
            group,
            bank: local,
        });
        if self.tracing {
            trace!(channel, banks = grant.banks.len(), pull_in, "REF issued");
        }
        true
    }

    /// close one still-open bank that is in the way of a refresh
    fn try_precharge_for_refresh(&mut self, channel: usize, grant: &RefreshGrant) -> bool {
        let now = self.current_cycle;
        for bank in &grant.banks {
            let flat = self.flat_of(bank);
            if self.banks[flat].state.is_active() && now >= self.banks[flat].next_pre {
                let timing = self.config.timing.clone();
                self.banks[flat].precharge(now, &timing);
                let local = flat - channel * self.config.organization.banks_per_channel();
                let (rank, group, _) = self.geometry(local);
                self.issue_checked(
                    channel,
                    IssuedCommand { cycle: now, command: Command::Pre, rank, group, bank: local },
                );
                if self.tracing {
                    trace!(channel, bank = local, "PRE for refresh");
                }
                return true;
            }
        }
        false
    }

    fn try_issue_request(&mut self, channel: usize, excluded: &[usize]) -> bool {
        let org = self.config.organization.clone();
        let base = channel * org.banks_per_channel();
        let now = self.current_cycle;
        let last_cmd = self.channels[channel].last_cmd;

        for local in 0..org.banks_per_channel() {
            let flat = base + local;
            if excluded.contains(&flat) {
                continue;
            }
            let open_row = if self.banks[flat].state.is_active() {
                self.banks[flat].open_row
            } else {
                None
            };
            let Some(slot) = self.scheduler.select(flat, open_row, last_cmd) else {
                continue;
            };
            let (req_row, req_ty) = {
                let request = self.scheduler.peek(flat, slot);
                (request.loc.row, request.ty)
            };

            match self.banks[flat].state {
                BankState::Idle => {
                    if self.can_activate(channel, local, now) {
                        let request = self.scheduler.peek_mut(flat, slot);
                        if request.class.is_none() {
                            request.class = Some(PageClass::Empty);
                        }
                        let timing = self.config.timing.clone();
                        self.banks[flat].activate(now, req_row, &timing);
                        self.book_activate(channel, local, now);
                        if self.tracing {
                            trace!(channel, bank = local, row = req_row, "ACT");
                        }
                        return true;
                    }
                }
                BankState::Active => {
                    if self.banks[flat].open_row == Some(req_row) {
                        if self.cas_eligible(channel, local, req_ty, now) {
                            self.issue_cas(channel, flat, slot, now);
                            return true;
                        }
                    } else if now >= self.banks[flat].next_pre {
                        // row conflict: close the row first
                        let request = self.scheduler.peek_mut(flat, slot);
                        if request.class.is_none() {
                            request.class = Some(PageClass::Conflict);
                        }
                        let timing = self.config.timing.clone();
                        self.banks[flat].precharge(now, &timing);
                        let (rank, group, _) = self.geometry(local);
                        self.issue_checked(
                            channel,
                            IssuedCommand {
                                cycle: now,
                                command: Command::Pre,
                                rank,
                                group,
                                bank: local,
                            },
                        );
                        if self.tracing {
                            trace!(channel, bank = local, "PRE (conflict)");
                        }
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn can_activate(&self, channel: usize, local: usize, now: Cycle) -> bool {
        let flat = channel * self.config.organization.banks_per_channel() + local;
        if now < self.banks[flat].next_act {
            return false;
        }
        let t = &self.config.timing;
        let (rank, group, _) = self.geometry(local);
        let rank_state = &self.channels[channel].ranks[rank];
        // four activate window
        if rank_state.act_window.len() == 4 {
            if now < rank_state.act_window[0] + t.t_faw {
                return false;
            }
        }
        if let Some((cycle, last_group)) = rank_state.last_act {
            let gate = if last_group == group { t.t_rrd_l } else { t.t_rrd_s };
            if now < cycle + gate {
                return false;
            }
        }
        true
    }

    fn book_activate(&mut self, channel: usize, local: usize, now: Cycle) {
        let (rank, group, _) = self.geometry(local);
        self.issue_checked(
            channel,
            IssuedCommand { cycle: now, command: Command::Act, rank, group, bank: local },
        );
        let rank_state = &mut self.channels[channel].ranks[rank];
        if rank_state.act_window.len() == 4 {
            rank_state.act_window.pop_front();
        }
        rank_state.act_window.push_back(now);
        rank_state.last_act = Some((now, group));
    }

    fn cas_eligible(&self, channel: usize, local: usize, ty: RequestType, now: Cycle) -> bool {
        let flat = channel * self.config.organization.banks_per_channel() + local;
        if !self.banks[flat].ready_for(ty, now) {
            return false;
        }
        let t = &self.config.timing;
        let (_, group, _) = self.geometry(local);
        let state = &self.channels[channel];
        if let Some(cycle) = state.last_cas_per_group[group] {
            if now < cycle + t.t_ccd_l {
                return false;
            }
        }
        if let Some((cycle, _, _)) = state.last_cas {
            if now < cycle + t.t_ccd_s {
                return false;
            }
        }
        match ty {
            RequestType::Read => {
                if let Some((cycle, write_group)) = state.last_write {
                    let gate = if write_group == group { t.t_wtr_l } else { t.t_wtr_s };
                    if now < cycle + gate {
                        return false;
                    }
                }
            }
            RequestType::Write => {
                if let Some((cycle, _)) = state.last_read {
                    if now < cycle + t.t_rtw {
                        return false;
                    }
                }
            }
        }
        true
    }

    fn issue_cas(&mut self, channel: usize, flat: usize, slot: usize, now: Cycle) {
        let local = flat - channel * self.config.organization.banks_per_channel();
        let (_, group, _) = self.geometry(local);
        let timing = self.config.timing.clone();

        // first command on this request's behalf means it hit the open row
        {
            let request = self.scheduler.peek_mut(flat, slot);
            if request.class.is_none() {
                request.class = Some(PageClass::Hit);
            }
        }
        let request = self.scheduler.take(flat, slot);
        let ty = request.ty;
        let class = request.class.expect("stamped above");
        // the bank-local cas gate is L when the previous cas targeted this
        // bank group
        let same_group = matches!(
            self.channels[channel].last_cas,
            Some((_, last_group, _)) if last_group == group
        );
        let finish = match ty {
            RequestType::Read => {
                self.banks[flat].read(now, &timing, same_group);
                now + timing.t_cl + timing.t_burst
            }
            RequestType::Write => {
                self.banks[flat].write(now, &timing, same_group);
                now + timing.t_wl + timing.t_burst
            }
        };

        if self.config.enable_statistics {
            self.stats.record_issue(class);
            match (self.channels[channel].last_cas, ty) {
                (Some((_, _, RequestType::Write)), RequestType::Read) => {
                    self.stats.write_to_read_turnarounds += 1;
                }
                (Some((_, _, RequestType::Read)), RequestType::Write) => {
                    self.stats.read_to_write_turnarounds += 1;
                }
                _ => {}
            }
        }

        let (rank, _, _) = self.geometry(local);
        let command = match ty {
            RequestType::Read => Command::Rd,
            RequestType::Write => Command::Wr,
        };
        self.issue_checked(
            channel,
            IssuedCommand { cycle: now, command, rank, group, bank: local },
        );

        let state = &mut self.channels[channel];
        state.last_cas_per_group[group] = Some(now);
        state.last_cas = Some((now, group, ty));
        match ty {
            RequestType::Read => state.last_read = Some((now, group)),
            RequestType::Write => state.last_write = Some((now, group)),
        }
        state.last_cmd = ty;

        if self.tracing {
            trace!(
                channel,
                bank = local,
                id = request.id,
                ?ty,
                ?class,
                finish,
                "CAS"
            );
        }
        self.in_flight.push(InFlight { request, finish });
    }

    /// run the pairwise checks against the channel history, then record
    fn issue_checked(&mut self, channel: usize, cmd: IssuedCommand) {
        if self.check_invariants {
            self.check_command(channel, &cmd);
        }
        self.channels[channel].record(cmd);
    }

    fn check_command(&mut self, channel: usize, cmd: &IssuedCommand) {
        let t = &self.config.timing;
        let history = &self.channels[channel].history;
        let last = |pred: &dyn Fn(&IssuedCommand) -> bool| {
            history.iter().rev().find(|c| pred(c)).copied()
        };
        let mut found: Vec<(&'static str, String)> = Vec::new();

        match cmd.command {
            Command::Act => {
                if let Some(prev) = last(&|c| c.command == Command::Act && c.bank == cmd.bank) {
                    if cmd.cycle < prev.cycle + t.t_rc {
                        found.push((
                            "tRC",
                            format!(
                                "ACT to ACT on bank {} after {} cycles",
                                cmd.bank,
                                cmd.cycle - prev.cycle
                            ),
                        ));
                    }
                }
                if let Some(prev) = last(&|c| c.command == Command::Act && c.rank == cmd.rank) {
                    let gate = if prev.group == cmd.group { t.t_rrd_l } else { t.t_rrd_s };
                    if cmd.cycle < prev.cycle + gate {
                        found.push((
                            "tRRD",
                            format!(
                                "ACT to ACT on rank {} after {} cycles",
                                cmd.rank,
                                cmd.cycle - prev.cycle
                            ),
                        ));
                    }
                }
                let in_window = history
                    .iter()
                    .filter(|c| {
                        c.command == Command::Act
                            && c.rank == cmd.rank
                            && c.cycle + t.t_faw > cmd.cycle
                    })
                    .count();
                if in_window >= 4 {
                    found.push((
                        "tFAW",
                        format!("fifth ACT within the tFAW window on rank {}", cmd.rank),
                    ));
                }
            }
            Command::Rd | Command::Wr => {
                if let Some(prev) = last(&|c| c.command == Command::Act && c.bank == cmd.bank) {
                    if cmd.cycle < prev.cycle + t.t_rcd {
                        found.push((
                            "tRCD",
                            format!("cas issued before tRCD elapsed on bank {}", cmd.bank),
                        ));
                    }
                }
                if let Some(prev) = last(&|c| matches!(c.command, Command::Rd | Command::Wr)) {
                    let gate = if prev.group == cmd.group { t.t_ccd_l } else { t.t_ccd_s };
                    if cmd.cycle < prev.cycle + gate {
                        found.push(("tCCD", "cas to cas too close".to_string()));
                    }
                }
                if cmd.command == Command::Rd {
                    if let Some(prev) = last(&|c| c.command == Command::Wr) {
                        let gate = if prev.group == cmd.group { t.t_wtr_l } else { t.t_wtr_s };
                        if cmd.cycle < prev.cycle + gate {
                            found.push((
                                "tWTR",
                                "WR to RD before the turnaround elapsed".to_string(),
                            ));
                        }
                    }
                } else if let Some(prev) = last(&|c| c.command == Command::Rd) {
                    if cmd.cycle < prev.cycle + t.t_rtw {
                        found.push((
                            "tRTW",
                            "RD to WR before the turnaround elapsed".to_string(),
                        ));
                    }
                }
            }
            Command::Pre => {
                if let Some(prev) = last(&|c| c.command == Command::Act && c.bank == cmd.bank) {
                    if cmd.cycle < prev.cycle + t.t_ras {
                        found.push((
                            "tRAS",
                            format!("PRE before tRAS elapsed on bank {}", cmd.bank),
                        ));
                    }
                }
            }
            Command::Ref => {}
        }

        for (invariant_id, message) in found {
            self.violations.push(Violation {
                cycle: cmd.cycle,
                invariant_id,
                message,
                channel,
                bank: cmd.bank,
            });
        }
    }

    fn complete_bursts(&mut self) {
        let now = self.current_cycle;
        let mut done: Vec<InFlight> = Vec::new();
        let mut slot = 0;
        while slot < self.in_flight.len() {
            if self.in_flight[slot].finish <= now {
                done.push(self.in_flight.swap_remove(slot));
            } else {
                slot += 1;
            }
        }
        // callbacks fire in increasing request id order within a cycle
        done.sort_by_key(|f| f.request.id);
        for mut flight in done {
            let latency = flight.finish - flight.request.submit_cycle;
            if self.config.enable_statistics {
                self.stats.record_completion(flight.request.ty, latency);
            }
            if self.tracing {
                debug!(id = flight.request.id, latency, "request complete");
            }
            if let Some(callback) = flight.request.take_callback() {
                callback(latency);
            }
        }
    }

    fn account_cycle(&mut self, issued: usize) {
        if !self.config.enable_statistics {
            return;
        }
        if issued > 0 || !self.in_flight.is_empty() {
            self.stats.busy_cycles += 1;
        } else {
            self.stats.idle_cycles += 1;
        }
        if issued == 0 && self.scheduler.has_any_pending() {
            self.stats.stall_cycles += 1;
        }
        for bank in &self.banks {
            match bank.state {
                BankState::Active | BankState::Reading | BankState::Writing => {
                    self.stats.active_cycles += 1;
                }
                BankState::Precharging => self.stats.precharge_cycles += 1,
                _ => {}
            }
        }
    }
}

impl MemoryController for CycleAccurateController {
    fn submit(&mut self, mut request: Request) -> Result<RequestId, SubmitError> {
        request.loc = self.decoder.decode(request.address)?;
        if !self.scheduler.can_store(request.ty) {
            return Err(SubmitError::QueueFull);
        }
        request.id = self.ids.alloc();
        request.submit_cycle = self.current_cycle;
        if self.tracing {
            trace!(id = request.id, address = request.address, ty = ?request.ty, "submit");
        }
        let id = request.id;
        self.scheduler
            .store(request)
            .unwrap_or_else(|_| unreachable!("can_store checked above"));
        Ok(id)
    }

    fn can_accept(&self) -> bool {
        self.scheduler.has_space(1)
    }

    fn has_pending(&self) -> bool {
        self.scheduler.has_any_pending() || !self.in_flight.is_empty()
    }

    fn pending_count(&self) -> usize {
        self.scheduler.occupancy() + self.in_flight.len()
    }

    fn tick(&mut self) {
        self.current_cycle += 1;
        let now = self.current_cycle;

        // 1. banks whose deadline elapsed transition
        for bank in &mut self.banks {
            bank.step(now);
        }
        // 2. refresh bookkeeping
        self.refresh.tick();
        // 3. arbitration, one command per channel
        let mut issued = 0;
        for channel in 0..self.config.organization.num_channels {
            if self.arbitrate_channel(channel) {
                issued += 1;
            }
        }
        // 4. bursts finishing this cycle
        self.complete_bursts();
        // 5. occupancy accounting
        self.account_cycle(issued);
    }

    fn reset(&mut self) {
        let org = &self.config.organization;
        self.current_cycle = 0;
        for bank in &mut self.banks {
            *bank = Bank::new();
        }
        self.scheduler.clear();
        self.refresh.reset();
        self.channels = (0..org.num_channels)
            .map(|_| ChannelState::new(org.ranks_per_channel, org.bank_groups_per_rank))
            .collect();
        // pending requests are dropped without callbacks
        self.in_flight.clear();
        self.stats.reset();
        self.violations.clear();
    }

    fn cycle(&self) -> Cycle {
        self.current_cycle
    }

    fn set_cycle(&mut self, cycle: Cycle) {
        self.current_cycle = cycle;
        self.refresh.set_now(cycle);
    }

    fn fidelity(&self) -> Fidelity {
        Fidelity::CycleAccurate
    }

    fn technology(&self) -> Technology {
        self.config.technology
    }

    fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn bank_state(&self, channel: usize, bank: usize) -> BankState {
        let flat = channel * self.config.organization.banks_per_channel() + bank;
        self.banks.get(flat).map(|b| b.state).unwrap_or_default()
    }

    fn is_row_open(&self, channel: usize, bank: usize, row: usize) -> bool {
        self.open_row(channel, bank) == Some(row)
    }

    fn open_row(&self, channel: usize, bank: usize) -> Option<usize> {
        let flat = channel * self.config.organization.banks_per_channel() + bank;
        let bank = self.banks.get(flat)?;
        if bank.state.is_active() {
            bank.open_row
        } else {
            None
        }
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

    fn enable_invariants(&mut self, enable: bool) {
        self.check_invariants = enable;
    }

    fn invariants_enabled(&self) -> bool {
        self.check_invariants
    }

    fn violations(&self) -> &[Violation] {
        &self.violations
    }

    fn clear_violations(&mut self) {
        self.violations.clear();
    }
}
