use bigdecimal::{BigDecimal, Zero};
use std::borrow::Cow;
use validator::ValidationError;

/// Whether `value` fits a `NUMERIC(precision, scale)` column without
/// rounding. Trailing zeros do not count as decimal places.
pub fn fits_numeric(value: &BigDecimal, precision: u64, scale: i64) -> bool {
    let normalized = value.normalized();
    let (_, exponent) = normalized.as_bigint_and_exponent();
    let digits = normalized.digits();
    let whole_digits = if exponent >= 0 {
        digits.saturating_sub(exponent as u64)
    } else {
        digits + exponent.unsigned_abs()
    };
    exponent <= scale && whole_digits <= precision - scale as u64
}

/// Money column: `NUMERIC(10, 2)`, never negative.
pub fn amount(value: &BigDecimal) -> Result<(), ValidationError> {
    if value < &BigDecimal::zero() {
        return Err(ValidationError::new("non_negative").with_message(Cow::from("must not be negative")));
    }
    if !fits_numeric(value, 10, 2) {
        return Err(ValidationError::new("digits")
            .with_message(Cow::from("at most 8 digits before and 2 after the decimal point")));
    }
    Ok(())
}

/// GST rate: `NUMERIC(5, 2)` between 0 and 100.
pub fn percentage(value: &BigDecimal) -> Result<(), ValidationError> {
    if value < &BigDecimal::zero() || value > &BigDecimal::from(100) {
        return Err(ValidationError::new("percentage").with_message(Cow::from("must be between 0 and 100")));
    }
    if !fits_numeric(value, 5, 2) {
        return Err(ValidationError::new("digits").with_message(Cow::from("at most 2 decimal places")));
    }
    Ok(())
}

/// `subtotal` plus GST when applied, rounded to paise.
pub fn with_gst(subtotal: &BigDecimal, gst_applied: bool, gst_rate: &BigDecimal) -> BigDecimal {
    let total = if gst_applied {
        subtotal + subtotal * gst_rate / BigDecimal::from(100)
    } else {
        subtotal.clone()
    };
    total.round(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn gst_is_added_only_when_applied() {
        assert_eq!(with_gst(&dec("1000"), true, &dec("18")), dec("1180.00"));
        assert_eq!(with_gst(&dec("1000"), false, &dec("18")), dec("1000.00"));
    }

    #[test]
    fn total_is_rounded_to_two_places() {
        assert_eq!(with_gst(&dec("10.01"), true, &dec("18")), dec("11.81"));
    }

    #[test]
    fn percentage_bounds() {
        assert!(percentage(&dec("0")).is_ok());
        assert!(percentage(&dec("100")).is_ok());
        assert!(percentage(&dec("100.5")).is_err());
        assert!(percentage(&dec("18.005")).is_err());
        assert!(amount(&dec("-0.01")).is_err());
    }

    #[test]
    fn amount_fits_numeric_10_2() {
        assert!(amount(&dec("99999999.99")).is_ok());
        assert!(amount(&dec("1200")).is_ok());
        assert!(amount(&dec("0")).is_ok());
        assert!(amount(&dec("1.500")).is_ok());
        assert!(amount(&dec("100000000")).is_err());
        assert!(amount(&dec("123456789012.345")).is_err());
        assert!(amount(&dec("12.345")).is_err());
    }

    #[test]
    fn json_floats_are_counted_after_normalizing() {
        let price: BigDecimal = serde_json::from_str("15.5").unwrap();
        assert!(amount(&price).is_ok());
        let rate: BigDecimal = serde_json::from_str("18").unwrap();
        assert!(percentage(&rate).is_ok());
    }
}
