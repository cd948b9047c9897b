//! per-bank protocol state machine
//!
//! a bank tracks its current state, the open row, the cycle the state
//! completes, and the earliest issue cycle for each command class. the
//! controller owns one of these per (channel, rank, bank group, bank) and is
//! responsible for the global gates (bus, tFAW, turnaround); the bank only
//! enforces its own timings.

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::config::TimingParams;
use super::request::RequestType;
use super::Cycle;

#[derive(
    Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, EnumAsInner, Default,
)]
pub enum BankState {
    #[default]
    Idle,
    Activating,
    Active,
    Reading,
    Writing,
    Precharging,
    Refreshing,
}

#[derive(Debug, Clone, Default)]
pub struct Bank {
    pub state: BankState,
    pub open_row: Option<usize>,
    /// cycle at which the current state completes
    pub state_until: Cycle,
    /// earliest issue cycles per command
    pub next_act: Cycle,
    pub next_rd: Cycle,
    pub next_wr: Cycle,
    pub next_pre: Cycle,
}

impl Bank {
    pub fn new() -> Self {
        Default::default()
    }

    /// auto transition when the state deadline has elapsed
    pub fn step(&mut self, now: Cycle) {
        if now < self.state_until {
            return;
        }
        match self.state {
            BankState::Activating => self.state = BankState::Active,
            BankState::Reading | BankState::Writing => self.state = BankState::Active,
            BankState::Precharging => {
                self.state = BankState::Idle;
                self.open_row = None;
            }
            BankState::Refreshing => self.state = BankState::Idle,
            BankState::Idle | BankState::Active => {}
        }
    }

    pub fn is_row_hit(&self, row: usize) -> bool {
        self.state.is_active() && self.open_row == Some(row)
    }

    /// bank-local readiness for a cas of the given type
    pub fn ready_for(&self, ty: RequestType, now: Cycle) -> bool {
        if !self.state.is_active() {
            return false;
        }
        match ty {
            RequestType::Read => now >= self.next_rd,
            RequestType::Write => now >= self.next_wr,
        }
    }

    pub fn activate(&mut self, now: Cycle, row: usize, t: &TimingParams) {
        debug_assert!(self.state.is_idle() && now >= self.next_act);
        self.state = BankState::Activating;
        self.open_row = Some(row);
        self.state_until = now + t.t_rcd;
        self.next_act = now + t.t_rc;
        self.next_rd = now + t.t_rcd;
        self.next_wr = now + t.t_rcd;
        // tRAS floor; read/write may push the precharge point further out
        self.next_pre = now + t.t_ras;
    }

    /// latch a read cas. `same_group` selects the L/S cas-to-cas timing.
    pub fn read(&mut self, now: Cycle, t: &TimingParams, same_group: bool) {
        debug_assert!(self.ready_for(RequestType::Read, now));
        self.state = BankState::Reading;
        self.state_until = now + t.t_burst;
        self.next_rd = now + if same_group { t.t_ccd_l } else { t.t_ccd_s };
        self.next_wr = now + t.t_rtw;
        self.next_pre = self.next_pre.max(now + t.t_rtp);
    }

    /// latch a write cas. the write completes at the data burst boundary but
    /// precharge waits out write recovery.
    pub fn write(&mut self, now: Cycle, t: &TimingParams, same_group: bool) {
        debug_assert!(self.ready_for(RequestType::Write, now));
        self.state = BankState::Writing;
        self.state_until = now + t.t_burst;
        self.next_wr = now + if same_group { t.t_ccd_l } else { t.t_ccd_s };
        self.next_rd = now + if same_group { t.t_wtr_l } else { t.t_wtr_s };
        self.next_pre = self.next_pre.max(now + t.t_wl + t.t_burst + t.t_wr);
    }

    pub fn precharge(&mut self, now: Cycle, t: &TimingParams) {
        debug_assert!(self.state.is_active() && now >= self.next_pre);
        self.state = BankState::Precharging;
        self.state_until = now + t.t_rp;
        self.next_act = self.next_act.max(now + t.t_rp);
    }

    pub fn refresh(&mut self, now: Cycle, latency: Cycle) {
        debug_assert!(self.state.is_idle());
        self.state = BankState::Refreshing;
        self.state_until = now + latency;
        self.next_act = self.next_act.max(now + latency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing() -> TimingParams {
        TimingParams::default()
    }

    #[test]
    fn activate_opens_row_after_trcd() {
        let t = timing();
        let mut bank = Bank::new();
        bank.activate(10, 42, &t);
        assert!(bank.state.is_activating());
        assert_eq!(bank.open_row, Some(42));

        bank.step(10 + t.t_rcd - 1);
        assert!(bank.state.is_activating());
        bank.step(10 + t.t_rcd);
        assert!(bank.state.is_active());
        assert!(bank.ready_for(RequestType::Read, 10 + t.t_rcd));
    }

    #[test]
    fn activate_gates_next_act_by_trc() {
        let t = timing();
        let mut bank = Bank::new();
        bank.activate(0, 1, &t);
        assert_eq!(bank.next_act, t.t_rc);
        assert_eq!(bank.next_pre, t.t_ras);
    }

    #[test]
    fn read_returns_to_active_after_burst() {
        let t = timing();
        let mut bank = Bank::new();
        bank.activate(0, 7, &t);
        bank.step(t.t_rcd);
        bank.read(t.t_rcd, &t, true);
        assert!(bank.state.is_reading());
        assert_eq!(bank.next_rd, t.t_rcd + t.t_ccd_l);
        assert_eq!(bank.next_wr, t.t_rcd + t.t_rtw);

        bank.step(t.t_rcd + t.t_burst);
        assert!(bank.state.is_active());
        assert!(bank.is_row_hit(7));
    }

    #[test]
    fn write_recovery_gates_precharge() {
        let t = timing();
        let mut bank = Bank::new();
        bank.activate(0, 7, &t);
        bank.step(t.t_rcd);
        bank.write(t.t_rcd, &t, false);
        assert_eq!(bank.next_rd, t.t_rcd + t.t_wtr_s);
        assert_eq!(
            bank.next_pre,
            (t.t_rcd + t.t_wl + t.t_burst + t.t_wr).max(t.t_ras)
        );
    }

    #[test]
    fn precharge_clears_row() {
        let t = timing();
        let mut bank = Bank::new();
        bank.activate(0, 7, &t);
        bank.step(t.t_rcd);
        let now = bank.next_pre;
        bank.step(now);
        bank.precharge(now, &t);
        assert!(bank.state.is_precharging());
        bank.step(now + t.t_rp);
        assert!(bank.state.is_idle());
        assert_eq!(bank.open_row, None);
    }

    #[test]
    fn refresh_blocks_activation() {
        let t = timing();
        let mut bank = Bank::new();
        bank.refresh(5, t.t_rfc_pb);
        assert!(bank.state.is_refreshing());
        assert_eq!(bank.next_act, 5 + t.t_rfc_pb);
        bank.step(5 + t.t_rfc_pb);
        assert!(bank.state.is_idle());
    }
}
