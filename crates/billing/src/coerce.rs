//! Integer coercion: the single entry point for every numeric field.
//!
//! Anything typed into a price, discount or paid box passes through here
//! before it reaches the model, so the engine never observes a negative,
//! fractional or out-of-range value.

/// Upper bound for any single money figure.
pub const MAX_AMOUNT: i64 = 9_999_999;

/// Coerce raw text to an integer in `[0, MAX_AMOUNT]`.
pub fn to_int(raw: &str) -> i64 {
    to_int_with_max(raw, MAX_AMOUNT)
}

/// Coerce raw text to an integer in `[0, max]`.
///
/// Every character other than ASCII digits and `-` is dropped, then the
/// remainder is read like `parseInt`: an optional leading minus followed by the
/// leading run of digits. No digits at all yields 0. Overlong digit runs
/// saturate instead of overflowing.
pub fn to_int_with_max(raw: &str, max: i64) -> i64 {
    let max = max.max(0);
    let kept: String = raw
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();

    let (negative, digits) = match kept.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, kept.as_str()),
    };

    let mut value: i64 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        let Some(d) = c.to_digit(10) else { break };
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(i64::from(d));
    }

    if !seen_digit || negative {
        return 0;
    }
    value.min(max)
}

/// Clamp an already-numeric value into `[0, max]`.
pub fn clamp_amount(value: i64, max: i64) -> i64 {
    value.clamp(0, max.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blank_input_is_zero() {
        assert_eq!(to_int(""), 0);
        assert_eq!(to_int("   "), 0);
    }

    #[test]
    fn plain_numbers_pass_through() {
        assert_eq!(to_int("0"), 0);
        assert_eq!(to_int("1500"), 1500);
        assert_eq!(to_int("  42 "), 42);
    }

    #[test]
    fn negative_values_clamp_to_zero() {
        assert_eq!(to_int("-5"), 0);
        assert_eq!(to_int("-"), 0);
    }

    #[test]
    fn non_digit_characters_are_stripped() {
        assert_eq!(to_int("1,250"), 1250);
        assert_eq!(to_int("Rs. 300/-"), 300);
        assert_eq!(to_int("12abc3"), 123);
        // The separator is dropped, not treated as a decimal point.
        assert_eq!(to_int("1.5"), 15);
    }

    #[test]
    fn embedded_minus_stops_the_digit_run() {
        assert_eq!(to_int("10-20"), 10);
    }

    #[test]
    fn garbage_is_zero() {
        assert_eq!(to_int("abc"), 0);
        assert_eq!(to_int("NaN"), 0);
        assert_eq!(to_int("Infinity"), 0);
    }

    #[test]
    fn values_above_max_are_capped() {
        assert_eq!(to_int("10000000"), MAX_AMOUNT);
        assert_eq!(to_int("99999999999999999999999999"), MAX_AMOUNT);
        assert_eq!(to_int_with_max("500", 100), 100);
    }

    #[test]
    fn clamp_amount_bounds_numeric_input() {
        assert_eq!(clamp_amount(-1, MAX_AMOUNT), 0);
        assert_eq!(clamp_amount(250, MAX_AMOUNT), 250);
        assert_eq!(clamp_amount(i64::MAX, MAX_AMOUNT), MAX_AMOUNT);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 512,
            ..ProptestConfig::default()
        })]

        /// Property: any input lands inside `[0, max]`.
        #[test]
        fn coercion_is_always_in_range(raw in ".{0,40}", max in 0i64..20_000_000i64) {
            let v = to_int_with_max(&raw, max);
            prop_assert!(v >= 0);
            prop_assert!(v <= max);
        }

        /// Property: in-range integers survive unchanged.
        #[test]
        fn in_range_integers_round_trip(n in 0i64..=MAX_AMOUNT) {
            prop_assert_eq!(to_int(&n.to_string()), n);
        }
    }
}
