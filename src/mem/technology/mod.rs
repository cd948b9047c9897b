//! technology timing and organization presets
//!
//! pure data: per-family functions returning prefilled parameter bundles
//! keyed by speed grade. unknown grades fall back to the family's top bin.

use super::config::{
    ControllerConfig, Fidelity, OrganizationParams, Technology, TimingParams,
};
use super::refresh::{RefreshConfig, RefreshPolicy};

pub mod ddr5;
pub mod gddr;
pub mod hbm;
pub mod lpddr5;

/// timing preset for a technology at a speed grade (MT/s)
pub fn timing_preset(technology: Technology, speed_mt_s: u32) -> TimingParams {
    match technology {
        Technology::Ideal => TimingParams::default(),
        Technology::Ddr5 => ddr5::ddr5(speed_mt_s),
        Technology::Lpddr5 => lpddr5::lpddr5(speed_mt_s),
        Technology::Lpddr5x => lpddr5::lpddr5x(speed_mt_s),
        Technology::Lpddr6 => lpddr5::lpddr6(speed_mt_s),
        Technology::Hbm3 => hbm::hbm3(speed_mt_s),
        Technology::Hbm3e => hbm::hbm3e(speed_mt_s),
        Technology::Hbm4 => hbm::hbm4(speed_mt_s),
        Technology::Gddr6 => gddr::gddr6(speed_mt_s),
        Technology::Gddr7 => gddr::gddr7(speed_mt_s),
    }
}

/// organization preset for a technology
pub fn organization_preset(technology: Technology) -> OrganizationParams {
    match technology {
        Technology::Ideal => OrganizationParams::default(),
        Technology::Ddr5 => OrganizationParams {
            bank_groups_per_rank: 8,
            banks_per_bank_group: 4,
            device_width: 8,
            devices_per_rank: 8,
            burst_length: 16,
            ..Default::default()
        },
        // x16 single rank point to point
        Technology::Lpddr5 | Technology::Lpddr5x | Technology::Lpddr6 => {
            OrganizationParams::default()
        }
        Technology::Hbm3 | Technology::Hbm3e | Technology::Hbm4 => OrganizationParams {
            num_channels: 16,
            rows_per_bank: 16384,
            columns_per_row: 64,
            device_width: 64,
            burst_length: 8,
            ..Default::default()
        },
        Technology::Gddr6 | Technology::Gddr7 => OrganizationParams {
            num_channels: 2,
            rows_per_bank: 16384,
            columns_per_row: 1024,
            device_width: 32,
            burst_length: 16,
            ..Default::default()
        },
    }
}

/// the refresh scheme the technology family normally runs
pub fn default_refresh_policy(technology: Technology) -> RefreshPolicy {
    match technology {
        Technology::Ideal => RefreshPolicy::None,
        Technology::Ddr5 => RefreshPolicy::SameBank,
        Technology::Lpddr5 | Technology::Lpddr5x | Technology::Lpddr6 => RefreshPolicy::PerBank,
        Technology::Hbm3 | Technology::Hbm3e | Technology::Hbm4 => {
            RefreshPolicy::FineGranularity
        }
        Technology::Gddr6 | Technology::Gddr7 => RefreshPolicy::AllBank,
    }
}

/// a ready controller config for (technology, fidelity, speed)
pub fn preset_config(
    technology: Technology,
    fidelity: Fidelity,
    speed_mt_s: u32,
) -> ControllerConfig {
    ControllerConfig {
        technology,
        fidelity,
        speed_mt_s,
        timing: timing_preset(technology, speed_mt_s),
        organization: organization_preset(technology),
        refresh: RefreshConfig {
            policy: default_refresh_policy(technology),
            ..Default::default()
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_validates() {
        for technology in [
            Technology::Ideal,
            Technology::Ddr5,
            Technology::Lpddr5,
            Technology::Lpddr5x,
            Technology::Lpddr6,
            Technology::Hbm3,
            Technology::Hbm3e,
            Technology::Hbm4,
            Technology::Gddr6,
            Technology::Gddr7,
        ] {
            let config = preset_config(technology, Fidelity::CycleAccurate, 6400);
            config
                .validate()
                .unwrap_or_else(|e| panic!("{technology:?}: {e}"));
        }
    }

    #[test]
    fn lpddr5_speed_grades_scale() {
        let slow = timing_preset(Technology::Lpddr5, 6400);
        let fast = timing_preset(Technology::Lpddr5, 8533);
        assert!(fast.t_rcd > slow.t_rcd);
        assert!(fast.t_cl > slow.t_cl);
        assert_eq!(slow.t_rc, slow.t_ras + slow.t_rp);
    }

    #[test]
    fn unknown_grade_falls_back() {
        let fallback = timing_preset(Technology::Lpddr5, 1234);
        let top = timing_preset(Technology::Lpddr5, 8533);
        assert_eq!(fallback.t_rcd, top.t_rcd);
    }

    #[test]
    fn hbm_uses_short_bursts() {
        let hbm = timing_preset(Technology::Hbm3, 5600);
        let lpddr = timing_preset(Technology::Lpddr5, 6400);
        assert!(hbm.t_burst < lpddr.t_burst);
    }
}
