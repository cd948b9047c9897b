//! hbm3 family speed bins. short bursts, tight refresh.

use crate::mem::config::TimingParams;

/// hbm3-5600
pub fn hbm3(_speed_mt_s: u32) -> TimingParams {
    TimingParams {
        t_rcd: 14,
        t_rp: 14,
        t_ras: 28,
        t_rc: 42,
        t_cl: 14,
        t_wl: 4,
        t_wr: 16,
        t_rtp: 4,
        t_rrd_l: 4,
        t_rrd_s: 4,
        t_ccd_l: 4,
        t_ccd_s: 2,
        t_faw: 16,
        t_wtr_l: 8,
        t_wtr_s: 4,
        t_rtw: 14,
        t_burst: 4,
        t_rfc: 280,
        t_rfc_pb: 90,
        // higher temperature, more frequent refresh
        t_refi: 1950,
        ..Default::default()
    }
}

/// hbm3e-6400
pub fn hbm3e(_speed_mt_s: u32) -> TimingParams {
    TimingParams {
        t_rcd: 16,
        t_rp: 16,
        t_ras: 32,
        t_rc: 48,
        t_cl: 16,
        t_wl: 5,
        t_wr: 18,
        t_rtp: 5,
        t_rrd_l: 4,
        t_rrd_s: 4,
        t_ccd_l: 4,
        t_ccd_s: 2,
        t_faw: 18,
        t_wtr_l: 9,
        t_wtr_s: 5,
        t_rtw: 16,
        t_burst: 4,
        t_rfc: 280,
        t_rfc_pb: 90,
        t_refi: 1950,
        ..Default::default()
    }
}

/// hbm4 projection, 8000 grade
pub fn hbm4(_speed_mt_s: u32) -> TimingParams {
    TimingParams {
        t_rcd: 20,
        t_rp: 20,
        t_ras: 40,
        t_rc: 60,
        t_cl: 20,
        t_wl: 6,
        t_wr: 22,
        t_rtp: 6,
        t_rrd_l: 5,
        t_rrd_s: 4,
        t_ccd_l: 4,
        t_ccd_s: 2,
        t_faw: 22,
        t_wtr_l: 11,
        t_wtr_s: 6,
        t_rtw: 20,
        t_burst: 4,
        t_rfc: 280,
        t_rfc_pb: 90,
        t_refi: 1950,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_keep_trc_consistent() {
        for t in [hbm3(5600), hbm3e(6400), hbm4(8000)] {
            assert_eq!(t.t_rc, t.t_ras + t.t_rp);
        }
    }
}
