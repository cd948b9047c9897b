//! ddr5 speed bins

use crate::mem::config::TimingParams;

/// ddr5 timing for a speed grade
pub fn ddr5(speed_mt_s: u32) -> TimingParams {
    match speed_mt_s {
        4800 => TimingParams {
            t_rcd: 34,
            t_rp: 34,
            t_ras: 64,
            t_rc: 98,
            t_cl: 34,
            t_wl: 32,
            t_wr: 72,
            t_rtp: 12,
            t_rrd_l: 12,
            t_rrd_s: 8,
            t_ccd_l: 12,
            t_ccd_s: 8,
            t_faw: 32,
            t_wtr_l: 24,
            t_wtr_s: 12,
            t_rtw: 22,
            t_burst: 8,
            t_rfc: 708,
            t_rfc_pb: 230,
            t_rfc_sb: 230,
            t_refi: 9360,
            ..Default::default()
        },
        5600 => TimingParams {
            t_rcd: 39,
            t_rp: 39,
            t_ras: 75,
            t_rc: 114,
            t_cl: 40,
            t_wl: 38,
            t_wr: 84,
            t_rtp: 14,
            t_rrd_l: 14,
            t_rrd_s: 8,
            t_ccd_l: 14,
            t_ccd_s: 8,
            t_faw: 36,
            t_wtr_l: 28,
            t_wtr_s: 14,
            t_rtw: 24,
            t_burst: 8,
            t_rfc: 826,
            t_rfc_pb: 268,
            t_rfc_sb: 268,
            t_refi: 10920,
            ..Default::default()
        },
        _ => TimingParams {
            t_rcd: 46,
            t_rp: 46,
            t_ras: 86,
            t_rc: 132,
            t_cl: 46,
            t_wl: 44,
            t_wr: 96,
            t_rtp: 16,
            t_rrd_l: 16,
            t_rrd_s: 8,
            t_ccd_l: 16,
            t_ccd_s: 8,
            t_faw: 40,
            t_wtr_l: 32,
            t_wtr_s: 16,
            t_rtw: 28,
            t_burst: 8,
            t_rfc: 944,
            t_rfc_pb: 307,
            t_rfc_sb: 307,
            t_refi: 12480,
            ..Default::default()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_keep_trc_consistent() {
        for speed in [4800, 5600, 6400] {
            let t = ddr5(speed);
            assert_eq!(t.t_rc, t.t_ras + t.t_rp, "ddr5-{speed}");
        }
    }
}
