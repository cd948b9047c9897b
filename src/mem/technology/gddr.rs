//! gddr6/gddr7 speed bins

use crate::mem::config::TimingParams;

/// gddr6-16000
pub fn gddr6(_speed_mt_s: u32) -> TimingParams {
    TimingParams {
        t_rcd: 18,
        t_rp: 18,
        t_ras: 40,
        t_rc: 58,
        t_cl: 18,
        t_wl: 8,
        t_wr: 24,
        t_rtp: 8,
        t_rrd_l: 5,
        t_rrd_s: 4,
        t_ccd_l: 3,
        t_ccd_s: 2,
        t_faw: 20,
        t_wtr_l: 10,
        t_wtr_s: 5,
        t_rtw: 14,
        t_burst: 8,
        t_rfc: 320,
        t_refi: 1950,
        ..Default::default()
    }
}

/// gddr7-32000
pub fn gddr7(_speed_mt_s: u32) -> TimingParams {
    TimingParams {
        t_rcd: 20,
        t_rp: 20,
        t_ras: 46,
        t_rc: 66,
        t_cl: 20,
        t_wl: 10,
        t_wr: 28,
        t_rtp: 10,
        t_rrd_l: 6,
        t_rrd_s: 4,
        t_ccd_l: 4,
        t_ccd_s: 2,
        t_faw: 24,
        t_wtr_l: 12,
        t_wtr_s: 6,
        t_rtw: 16,
        t_burst: 8,
        t_rfc: 350,
        t_refi: 1950,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bins_keep_trc_consistent() {
        for t in [gddr6(16000), gddr7(32000)] {
            assert_eq!(t.t_rc, t.t_ras + t.t_rp);
        }
    }
}
