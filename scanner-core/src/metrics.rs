//! Derived metrics computed from a record's raw signal and channel.

/// Reference RSSI at 1 metre, in dBm.
pub const REFERENCE_DBM: f64 = -30.0;
/// Path-loss exponent (2.0 is free space, 2.7 to 4.3 obstructed).
pub const PATH_LOSS_EXPONENT: f64 = 3.0;

/// Converts an RSSI in dBm to a quality percentage.
///
/// Piecewise linear with breakpoints at -30 (100%), -67 (75%), -70 (50%),
/// -80 (25%) and -90 (0%). Each segment uses integer floor division, so the
/// slope changes abruptly at every breakpoint.
pub fn quality_percent(signal: i32) -> u8 {
    // 每个分支中分子均非负，整数除法即为向下取整
    let quality = if signal >= -30 {
        100
    } else if signal >= -67 {
        75 + (signal + 67) * 25 / 37
    } else if signal >= -70 {
        50 + (signal + 70) * 25 / 3
    } else if signal >= -80 {
        25 + (signal + 80) * 25 / 10
    } else if signal >= -90 {
        (signal + 90) * 25 / 10
    } else {
        0
    };
    quality as u8
}

/// 将信道号转换为中心频率（MHz），未知信道返回 0。
pub fn frequency_mhz(channel: u32) -> u32 {
    match channel {
        1..=13 => 2412 + (channel - 1) * 5,
        14 => 2484,
        36..=165 => 5180 + (channel - 36) * 5,
        _ => 0,
    }
}

/// Estimates distance in metres with the log-distance path-loss model.
/// Returns `None` when no signal level is known.
pub fn estimate_distance(signal: Option<i32>) -> Option<f64> {
    let signal = f64::from(signal?);
    Some(10f64.powf((REFERENCE_DBM - signal) / (10.0 * PATH_LOSS_EXPONENT)))
}

/// Standard 2.4 GHz and 5 GHz channels.
pub fn supported_channels() -> Vec<u32> {
    let mut channels: Vec<u32> = (1..=13).collect();
    channels.extend([
        36, 40, 44, 48, 52, 56, 60, 64, 100, 104, 108, 112, 116, 120, 124, 128, 132, 136, 140,
        144, 149, 153, 157, 161, 165,
    ]);
    channels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_just_below_each_breakpoint() {
        assert_eq!(quality_percent(-31), 99);
        assert_eq!(quality_percent(-68), 66);
        assert_eq!(quality_percent(-71), 47);
        assert_eq!(quality_percent(-81), 22);
        assert_eq!(quality_percent(-91), 0);
    }

    #[test]
    fn supported_channels_have_frequencies() {
        for ch in supported_channels() {
            assert_ne!(frequency_mhz(ch), 0, "channel {ch}");
        }
    }
}
