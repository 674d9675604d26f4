//! C `printf`-compatible scientific notation.
//!
//! Rust's `{:e}` prints `1.5e7`; the text formats read and written by this
//! crate use the C spelling `1.5000000e+07`, with an explicit exponent sign
//! and at least two exponent digits.

/// Format `value` like C `%.{precision}e`, or `%+.{precision}e` when `plus`
/// is set.
pub fn exp(value: f64, precision: usize, plus: bool) -> String {
    let sign = if value.is_sign_negative() && !value.is_nan() {
        "-"
    } else if plus {
        "+"
    } else {
        ""
    };
    if value.is_nan() {
        return format!("{sign}nan");
    }
    if value.is_infinite() {
        return format!("{sign}inf");
    }

    let text = format!("{:.*e}", precision, value.abs());
    let (mantissa, exponent) = text.split_once('e').unwrap_or((text.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let exp_sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{mantissa}e{exp_sign}{:02}", exponent.unsigned_abs())
}

/// C `%{width}.{precision}e`: [`exp`] right-aligned in `width` columns.
pub fn exp_width(value: f64, width: usize, precision: usize) -> String {
    format!("{:>width$}", exp(value, precision, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_printf_14_7e() {
        assert_eq!(exp_width(68e9, 14, 7), " 6.8000000e+10");
        assert_eq!(exp_width(-9.81, 14, 7), "-9.8100000e+00");
        assert_eq!(exp_width(0.0, 14, 7), " 0.0000000e+00");
        assert_eq!(exp_width(0.32, 14, 7), " 3.2000000e-01");
    }

    #[test]
    fn test_three_digit_exponent() {
        assert_eq!(exp(1.5e-120, 2, false), "1.50e-120");
        assert_eq!(exp(2.0e200, 1, true), "+2.0e+200");
    }

    #[test]
    fn test_plus_flag() {
        assert_eq!(exp(1.0, 1, true), "+1.0e+00");
        assert_eq!(exp(-2.5e-3, 1, true), "-2.5e-03");
    }

    #[test]
    fn test_full_precision_round_trips() {
        let value = 0.1_f64 + 0.2;
        let text = exp(value, 18, false);
        assert_eq!(text, "3.000000000000000444e-01");
        assert_eq!(text.parse::<f64>().unwrap(), value);
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(exp(f64::NAN, 3, false), "nan");
        assert_eq!(exp(f64::NEG_INFINITY, 3, false), "-inf");
    }
}
