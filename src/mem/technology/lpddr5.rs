//! lpddr5 family speed bins

use crate::mem::config::TimingParams;

/// lpddr5 timing for a speed grade
pub fn lpddr5(speed_mt_s: u32) -> TimingParams {
    match speed_mt_s {
        6400 => TimingParams {
            t_rcd: 18,
            t_rp: 18,
            t_ras: 42,
            t_rc: 60,
            t_cl: 17,
            t_wl: 8,
            t_wr: 34,
            t_rtp: 12,
            t_rrd_l: 8,
            t_rrd_s: 4,
            t_ccd_l: 8,
            t_ccd_s: 4,
            t_faw: 32,
            t_wtr_l: 16,
            t_wtr_s: 8,
            t_rtw: 18,
            t_burst: 8,
            t_rfc: 280,
            t_rfc_pb: 90,
            t_refi: 3900,
            ..Default::default()
        },
        7500 => TimingParams {
            t_rcd: 21,
            t_rp: 21,
            t_ras: 49,
            t_rc: 70,
            t_cl: 20,
            t_wl: 10,
            t_wr: 40,
            t_rtp: 14,
            t_rrd_l: 9,
            t_rrd_s: 5,
            t_ccd_l: 9,
            t_ccd_s: 5,
            t_faw: 37,
            t_wtr_l: 19,
            t_wtr_s: 9,
            t_rtw: 21,
            t_burst: 8,
            t_rfc: 280,
            t_rfc_pb: 90,
            t_refi: 3900,
            ..Default::default()
        },
        _ => TimingParams {
            t_rcd: 24,
            t_rp: 24,
            t_ras: 56,
            t_rc: 80,
            t_cl: 22,
            t_wl: 11,
            t_wr: 45,
            t_rtp: 16,
            t_rrd_l: 11,
            t_rrd_s: 5,
            t_ccd_l: 11,
            t_ccd_s: 5,
            t_faw: 43,
            t_wtr_l: 22,
            t_wtr_s: 11,
            t_rtw: 24,
            t_burst: 8,
            t_rfc: 280,
            t_rfc_pb: 90,
            t_refi: 3900,
            ..Default::default()
        },
    }
}

/// lpddr5x tops out at 8533 with lpddr5 refresh behavior
pub fn lpddr5x(_speed_mt_s: u32) -> TimingParams {
    lpddr5(8533)
}

/// lpddr6 projection, 10667 grade
pub fn lpddr6(_speed_mt_s: u32) -> TimingParams {
    TimingParams {
        t_rcd: 30,
        t_rp: 30,
        t_ras: 70,
        t_rc: 100,
        t_cl: 28,
        t_wl: 14,
        t_wr: 56,
        t_rtp: 20,
        t_rrd_l: 13,
        t_rrd_s: 7,
        t_ccd_l: 13,
        t_ccd_s: 7,
        t_faw: 53,
        t_wtr_l: 27,
        t_wtr_s: 13,
        t_rtw: 30,
        t_burst: 8,
        t_rfc: 280,
        t_rfc_pb: 90,
        t_refi: 3900,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_keep_trc_consistent() {
        for speed in [6400, 7500, 8533] {
            let t = lpddr5(speed);
            assert_eq!(t.t_rc, t.t_ras + t.t_rp, "lpddr5-{speed}");
        }
        let t = lpddr6(10667);
        assert_eq!(t.t_rc, t.t_ras + t.t_rp);
    }
}
