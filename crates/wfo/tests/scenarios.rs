//! Scenario 6: a ~10-year range split into 5 anchored windows at a 0.7 in-sample
//! fraction keeps every window's in-sample start pinned to the overall start, each
//! window's out-of-sample suffix immediately following its in-sample prefix, the
//! in-sample span strictly widening window over window, and the last window's
//! out-of-sample end landing exactly on the requested end.

use chrono::{Duration, Utc};
use core_types::WalkForwardConfig;
use rust_decimal_macros::dec;
use wfo::WalkForwardAnalyser;

#[test]
fn scenario_6_ten_year_range_splits_into_5_anchored_windows() {
    let config = WalkForwardConfig {
        enabled: true,
        windows: 5,
        in_sample_fraction: dec!(0.7),
        anchored: true,
    };
    let analyser = WalkForwardAnalyser::new(config);
    let start = Utc::now();
    let end = start + Duration::days(365 * 10);

    let windows = analyser.generate_windows(start, end).unwrap();

    assert_eq!(windows.len(), 5);
    assert!(windows.iter().all(|w| w.is_start == start));
    assert!(windows.iter().all(|w| w.is_start < w.is_end));
    assert!(windows.iter().all(|w| w.oos_start == w.is_end));
    assert!(windows.iter().all(|w| w.oos_start <= w.oos_end));

    for pair in windows.windows(2) {
        assert!(pair[1].is_end > pair[0].is_end);
    }

    assert_eq!(windows.last().unwrap().oos_end, end);
}
