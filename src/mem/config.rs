//! controller configuration
//!
//! all of these are immutable for a controller's lifetime. timing is
//! expressed entirely in memory-clock cycles.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::address::{AddressMapping, FieldSlice};
use super::refresh::RefreshConfig;
use super::scheduler::SchedulerConfig;
use super::Cycle;

/// supported memory technologies
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Technology {
    Ideal,
    Ddr5,
    Lpddr5,
    Lpddr5x,
    Lpddr6,
    Hbm3,
    Hbm3e,
    Hbm4,
    Gddr6,
    Gddr7,
}

/// simulation fidelity levels
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fidelity {
    /// fixed latency per request, completion inside `submit`
    Behavioral,
    /// queue delayed, statistically sampled latency
    Transactional,
    /// per-bank protocol state machines bound by jedec timing
    CycleAccurate,
}

/// configuration errors, detected at controller construction. fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("organization field {field} must not be zero")]
    ZeroField { field: &'static str },
    #[error("organization field {field} = {value} must be a power of two")]
    NotPowerOfTwo { field: &'static str, value: usize },
    #[error("timing nonsense: {what}")]
    BadTiming { what: String },
    #[error("queue depth must not be zero")]
    ZeroQueueDepth,
    #[error("speed must be at least 2 MT/s, got {0}")]
    BadSpeed(u32),
    #[error("custom address mapping: {0}")]
    BadCustomMapping(String),
    #[error("scheduler watermarks: low {low} must not exceed high {high}")]
    BadWatermarks { low: usize, high: usize },
}

/// dram timing parameters, in memory clock cycles
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingParams {
    // core timing
    /// row to column delay (ACT to RD/WR)
    pub t_rcd: Cycle,
    /// row precharge time (PRE to ACT)
    pub t_rp: Cycle,
    /// minimum row active time (ACT to PRE)
    pub t_ras: Cycle,
    /// row cycle time (ACT to ACT, same bank)
    pub t_rc: Cycle,
    /// cas latency (RD to data out)
    pub t_cl: Cycle,
    /// cas write latency (WR to data in)
    pub t_wl: Cycle,
    /// write recovery time (data in to PRE)
    pub t_wr: Cycle,
    /// read to precharge
    pub t_rtp: Cycle,

    // bank group timing
    /// ACT to ACT, same bank group
    pub t_rrd_l: Cycle,
    /// ACT to ACT, different bank group
    pub t_rrd_s: Cycle,
    /// cas to cas, same bank group
    pub t_ccd_l: Cycle,
    /// cas to cas, different bank group
    pub t_ccd_s: Cycle,
    /// four activate window
    pub t_faw: Cycle,

    // turnaround timing
    /// write to read, same bank group
    pub t_wtr_l: Cycle,
    /// write to read, different bank group
    pub t_wtr_s: Cycle,
    /// read to write bus turnaround
    pub t_rtw: Cycle,

    /// data burst length in cycles
    pub t_burst: Cycle,

    // refresh timing
    /// refresh cycle time, all bank
    pub t_rfc: Cycle,
    /// refresh cycle time, per bank
    pub t_rfc_pb: Cycle,
    /// refresh cycle time, same bank (ddr5)
    pub t_rfc_sb: Cycle,
    /// average refresh interval
    pub t_refi: Cycle,

    // power down timing, kept as data for completeness
    pub t_cke: Cycle,
    pub t_xp: Cycle,
    pub t_xs: Cycle,

    // mode register timing
    pub t_mrd: Cycle,
    pub t_mod: Cycle,

    // behavioral model parameters
    pub fixed_read_latency: Cycle,
    pub fixed_write_latency: Cycle,

    // transactional model parameters
    pub mean_read_latency: Cycle,
    pub mean_write_latency: Cycle,
    pub latency_stddev: Cycle,
    pub page_hit_factor: f64,
    pub page_empty_factor: f64,
    pub page_conflict_factor: f64,
}

impl Default for TimingParams {
    fn default() -> Self {
        Self {
            t_rcd: 14,
            t_rp: 14,
            t_ras: 28,
            t_rc: 42,
            t_cl: 14,
            t_wl: 8,
            t_wr: 24,
            t_rtp: 6,
            t_rrd_l: 6,
            t_rrd_s: 4,
            t_ccd_l: 6,
            t_ccd_s: 4,
            t_faw: 24,
            t_wtr_l: 10,
            t_wtr_s: 4,
            t_rtw: 14,
            t_burst: 8,
            t_rfc: 280,
            t_rfc_pb: 90,
            t_rfc_sb: 90,
            t_refi: 3900,
            t_cke: 5,
            t_xp: 6,
            t_xs: 216,
            t_mrd: 8,
            t_mod: 15,
            fixed_read_latency: 100,
            fixed_write_latency: 100,
            mean_read_latency: 80,
            mean_write_latency: 90,
            latency_stddev: 20,
            page_hit_factor: 0.7,
            page_empty_factor: 1.0,
            page_conflict_factor: 1.3,
        }
    }
}

/// device organization parameters
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OrganizationParams {
    pub num_channels: usize,
    pub ranks_per_channel: usize,
    pub bank_groups_per_rank: usize,
    pub banks_per_bank_group: usize,
    pub rows_per_bank: usize,
    pub columns_per_row: usize,
    /// device data width in bits
    pub device_width: usize,
    pub devices_per_rank: usize,
    pub burst_length: usize,
}

impl Default for OrganizationParams {
    fn default() -> Self {
        Self {
            num_channels: 1,
            ranks_per_channel: 1,
            bank_groups_per_rank: 4,
            banks_per_bank_group: 4,
            rows_per_bank: 65536,
            columns_per_row: 1024,
            device_width: 16,
            devices_per_rank: 1,
            burst_length: 16,
        }
    }
}

impl OrganizationParams {
    pub fn banks_per_rank(&self) -> usize {
        self.bank_groups_per_rank * self.banks_per_bank_group
    }

    pub fn banks_per_channel(&self) -> usize {
        self.ranks_per_channel * self.banks_per_rank()
    }

    pub fn total_banks(&self) -> usize {
        self.num_channels * self.banks_per_channel()
    }

    pub fn channel_capacity_bytes(&self) -> u64 {
        self.ranks_per_channel as u64
            * self.banks_per_rank() as u64
            * self.rows_per_bank as u64
            * self.columns_per_row as u64
            * (self.device_width as u64 / 8)
            * self.devices_per_rank as u64
    }

    pub fn total_capacity_bytes(&self) -> u64 {
        self.num_channels as u64 * self.channel_capacity_bytes()
    }
}

/// complete memory controller configuration
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ControllerConfig {
    pub technology: Technology,
    pub fidelity: Fidelity,

    /// data rate in MT/s
    pub speed_mt_s: u32,
    /// request queue depth
    pub queue_depth: usize,

    pub address_mapping: AddressMapping,
    pub enable_tracing: bool,
    pub enable_statistics: bool,
    pub enable_invariants: bool,

    pub timing: TimingParams,
    pub organization: OrganizationParams,
    /// bit slices for [`AddressMapping::Custom`], lsb first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_mapping: Option<Vec<FieldSlice>>,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            technology: Technology::Ideal,
            fidelity: Fidelity::Behavioral,
            speed_mt_s: 6400,
            queue_depth: 32,
            address_mapping: AddressMapping::RowBankColumn,
            enable_tracing: false,
            enable_statistics: true,
            enable_invariants: false,
            timing: Default::default(),
            organization: Default::default(),
            custom_mapping: None,
            scheduler: Default::default(),
            refresh: Default::default(),
        }
    }
}

impl ControllerConfig {
    /// load a config from a toml file
    pub fn from_file(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let config: Self = toml::from_str(std::fs::read_to_string(path)?.as_str())?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> eyre::Result<()> {
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// a ready-to-run config from the technology preset tables
    pub fn preset(technology: Technology, fidelity: Fidelity, speed_mt_s: u32) -> Self {
        super::technology::preset_config(technology, fidelity, speed_mt_s)
    }

    /// memory clock frequency in MHz (data rate / 2)
    pub fn clock_mhz(&self) -> u32 {
        self.speed_mt_s / 2
    }

    /// clock period in picoseconds
    pub fn clock_period_ps(&self) -> u32 {
        1_000_000 / self.clock_mhz()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let org = &self.organization;
        let geometry = [
            ("num_channels", org.num_channels),
            ("ranks_per_channel", org.ranks_per_channel),
            ("bank_groups_per_rank", org.bank_groups_per_rank),
            ("banks_per_bank_group", org.banks_per_bank_group),
            ("rows_per_bank", org.rows_per_bank),
            ("columns_per_row", org.columns_per_row),
        ];
        for (field, value) in geometry {
            if value == 0 {
                return Err(ConfigError::ZeroField { field });
            }
            if !value.is_power_of_two() {
                return Err(ConfigError::NotPowerOfTwo { field, value });
            }
        }
        if org.device_width == 0 || org.devices_per_rank == 0 || org.burst_length == 0 {
            return Err(ConfigError::ZeroField {
                field: "device_width/devices_per_rank/burst_length",
            });
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        if self.speed_mt_s < 2 {
            return Err(ConfigError::BadSpeed(self.speed_mt_s));
        }

        let t = &self.timing;
        if t.t_ras < t.t_rcd {
            return Err(ConfigError::BadTiming {
                what: format!("tRAS {} < tRCD {}", t.t_ras, t.t_rcd),
            });
        }
        if t.t_rc < t.t_ras + t.t_rp {
            return Err(ConfigError::BadTiming {
                what: format!("tRC {} < tRAS {} + tRP {}", t.t_rc, t.t_ras, t.t_rp),
            });
        }
        if t.t_burst == 0 {
            return Err(ConfigError::BadTiming {
                what: "tBurst must not be zero".into(),
            });
        }
        if t.t_refi == 0 {
            return Err(ConfigError::BadTiming {
                what: "tREFI must not be zero".into(),
            });
        }

        let s = &self.scheduler;
        if s.low_watermark > s.high_watermark {
            return Err(ConfigError::BadWatermarks {
                low: s.low_watermark,
                high: s.high_watermark,
            });
        }

        // the decoder re-checks slice coverage; here we only require that a
        // custom scheme actually comes with slices
        if self.address_mapping == AddressMapping::Custom && self.custom_mapping.is_none() {
            return Err(ConfigError::BadCustomMapping(
                "AddressMapping::Custom needs custom_mapping slices".into(),
            ));
        }
        super::address::AddressDecoder::new(
            &self.organization,
            self.address_mapping,
            self.custom_mapping.as_deref(),
        )
        .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        ControllerConfig::default().validate().unwrap();
    }

    #[test]
    fn clock_derivation() {
        let config = ControllerConfig {
            speed_mt_s: 6400,
            ..Default::default()
        };
        assert_eq!(config.clock_mhz(), 3200);
        assert_eq!(config.clock_period_ps(), 312);
    }

    #[test]
    fn rejects_zero_banks() {
        let mut config = ControllerConfig::default();
        config.organization.banks_per_bank_group = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroField { .. })
        ));
    }

    #[test]
    fn rejects_non_power_of_two_rows() {
        let mut config = ControllerConfig::default();
        config.organization.rows_per_bank = 60000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPowerOfTwo { .. })
        ));
    }

    #[test]
    fn rejects_tras_below_trcd() {
        let mut config = ControllerConfig::default();
        config.timing.t_ras = config.timing.t_rcd - 1;
        assert!(matches!(config.validate(), Err(ConfigError::BadTiming { .. })));
    }

    #[test]
    fn capacity_derivation() {
        let org = OrganizationParams::default();
        // 1 rank * 16 banks * 64k rows * 1k columns * 2 bytes
        assert_eq!(org.channel_capacity_bytes(), 1 << 31);
        assert_eq!(org.total_banks(), 16);
    }

    #[test]
    fn toml_round_trip() {
        let config = ControllerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: ControllerConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.speed_mt_s, config.speed_mt_s);
        assert_eq!(back.organization.rows_per_bank, config.organization.rows_per_bank);
    }
}
