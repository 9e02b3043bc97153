// Derived metric tests: quality curve, channel frequencies, distance estimate

use scanner_core::metrics::{estimate_distance, frequency_mhz, quality_percent};

#[test]
fn quality_at_breakpoints() {
    assert_eq!(quality_percent(-30), 100);
    assert_eq!(quality_percent(-67), 75);
    assert_eq!(quality_percent(-70), 50);
    assert_eq!(quality_percent(-80), 25);
    assert_eq!(quality_percent(-90), 0);
}

#[test]
fn quality_between_breakpoints_uses_floor_division() {
    // 75 + 2*25/37 = 75 + 1
    assert_eq!(quality_percent(-65), 76);
    // 75 + 20*25/37 = 75 + 13
    assert_eq!(quality_percent(-47), 88);
    // 50 + 1*25/3 = 50 + 8
    assert_eq!(quality_percent(-69), 58);
    // 25 + 5*25/10 = 25 + 12
    assert_eq!(quality_percent(-75), 37);
    // 3*25/10 = 7
    assert_eq!(quality_percent(-87), 7);
}

#[test]
fn quality_saturates_outside_range() {
    assert_eq!(quality_percent(0), 100);
    assert_eq!(quality_percent(10), 100);
    assert_eq!(quality_percent(-95), 0);
    assert_eq!(quality_percent(-120), 0);
}

#[test]
fn quality_is_bounded_and_monotonic() {
    let mut previous = 0u8;
    for signal in -100..=0 {
        let q = quality_percent(signal);
        assert!(q <= 100, "quality {q} out of range at {signal}");
        assert!(q >= previous, "quality dropped from {previous} to {q} at {signal} dBm");
        previous = q;
    }
}

#[test]
fn frequency_for_2_4ghz_channels() {
    for channel in 1..=13 {
        assert_eq!(frequency_mhz(channel), 2412 + (channel - 1) * 5);
    }
    assert_eq!(frequency_mhz(6), 2437);
    assert_eq!(frequency_mhz(14), 2484);
}

#[test]
fn frequency_for_5ghz_and_unknown_channels() {
    assert_eq!(frequency_mhz(36), 5180);
    assert_eq!(frequency_mhz(149), 5745);
    assert_eq!(frequency_mhz(165), 5825);
    assert_eq!(frequency_mhz(0), 0);
    assert_eq!(frequency_mhz(15), 0);
    assert_eq!(frequency_mhz(200), 0);
}

#[test]
fn distance_from_signal() {
    let at_reference = estimate_distance(Some(-30)).unwrap();
    assert!((at_reference - 1.0).abs() < 1e-9);

    let ten_metres = estimate_distance(Some(-60)).unwrap();
    assert!((ten_metres - 10.0).abs() < 1e-9);

    let d = estimate_distance(Some(-65)).unwrap();
    assert!((d - 14.68).abs() < 0.01, "got {d}");

    assert!(estimate_distance(None).is_none());
}
