//! Rounding rules shared by every derived figure.
//!
//! Halves round toward positive infinity (`floor(x * 10^d + 0.5)`), which is
//! how the dashboard has always displayed numbers: `0.005 -> 0.01` but
//! `-0.005 -> 0.0`.

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor + 0.5).floor() / factor;
    // -0.0 would otherwise leak into output and compare oddly in reports
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Two decimal places: currency amounts, percentages, ratios.
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

/// Nearest integer: volumes and durations.
pub fn round0(value: f64) -> f64 {
    round_to(value, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_two_places() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(1.234), 1.23);
        assert_eq!(round2(-40.0), -40.0);
    }

    #[test]
    fn halves_round_up() {
        assert_eq!(round0(2.5), 3.0);
        assert_eq!(round0(-2.5), -2.0);
        assert_eq!(round0(0.5), 1.0);
    }

    #[test]
    fn negative_zero_is_normalised() {
        let r = round2(-0.001);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
    }

    #[test]
    fn integers_are_unchanged() {
        assert_eq!(round0(1000.0), 1000.0);
        assert_eq!(round2(120.0), 120.0);
    }
}
