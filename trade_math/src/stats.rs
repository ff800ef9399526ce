//! Rounding helpers

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Round to cents; every figure reported to a user goes through this
pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(14.0, 14.0)]
    #[case(101.234, 101.23)]
    #[case(101.235_1, 101.24)]
    #[case(-3.456, -3.46)]
    fn test_round2(#[case] input: f64, #[case] expected: f64) {
        assert_eq!(round2(input), expected);
    }

    #[test]
    fn test_round_to_zero_places() {
        assert_eq!(round_to(2.5, 0), 3.0);
    }
}
