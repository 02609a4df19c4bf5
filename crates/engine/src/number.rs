//! Conversion between the display string and the numbers the engine computes
//! with.
//!
//! Results are rendered the way the calculator face has always shown them:
//! shortest round-trip digits, `Infinity`/`-Infinity`/`NaN` for non-finite
//! values, and exponent notation with an explicit sign outside
//! `[1e-6, 1e21)`. Parsing is lenient and prefix-based, so anything the
//! display can end up holding (`"5."`, `"Infinity3"`, `"1e+215"`) still
//! yields a value instead of an error.

/// Lower bound (inclusive) of the magnitudes rendered without an exponent.
const PLAIN_MIN: f64 = 1e-6;
/// Upper bound (exclusive) of the magnitudes rendered without an exponent.
const PLAIN_MAX: f64 = 1e21;

/// Render a value for the display.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let s = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return s.to_string();
    }
    // Also folds -0 into "0".
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (PLAIN_MIN..PLAIN_MAX).contains(&magnitude) {
        return format!("{}", value);
    }

    // `{:e}` writes `1e21` / `1.5e-7`; positive exponents get an explicit `+`.
    let s = format!("{:e}", value);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

/// Parse the longest numeric prefix of `text`, or `NaN` if there is none.
pub fn parse_display(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let len = bytes.len();

    let mut i = 0;
    let negative = match bytes.first() {
        Some(b'-') => {
            i = 1;
            true
        }
        Some(b'+') => {
            i = 1;
            false
        }
        _ => false,
    };

    if s[i..].starts_with("Infinity") {
        return if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = i;
    while i < len && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;

    if i < len && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < len && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }

    if digits == 0 {
        return f64::NAN;
    }

    let mut end = i;
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < len && bytes[j].is_ascii_digit() {
            j += 1;
        }
        // A dangling `e` is not part of the number.
        if j > exp_start {
            end = j;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_integral_values() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-42.0), "-42");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_format_fractions_use_shortest_digits() {
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(0.000001), "0.000001");
    }

    #[test]
    fn test_format_non_finite() {
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_format_exponent_boundaries() {
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e30), "-2.5e+30");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_display("0"), 0.0);
        assert_eq!(parse_display("123"), 123.0);
        assert_eq!(parse_display("-3.25"), -3.25);
        assert_eq!(parse_display("5."), 5.0);
        assert_eq!(parse_display("0."), 0.0);
    }

    #[test]
    fn test_parse_ignores_trailing_garbage() {
        assert_eq!(parse_display("Infinity3"), f64::INFINITY);
        assert_eq!(parse_display("-Infinity."), f64::NEG_INFINITY);
        assert_eq!(parse_display("1e+215"), 1e215);
        assert_eq!(parse_display("1e+21."), 1e21);
        assert_eq!(parse_display("12e"), 12.0);
    }

    #[test]
    fn test_parse_unparsable_is_nan() {
        assert!(parse_display("NaN").is_nan());
        assert!(parse_display("NaN7").is_nan());
        assert!(parse_display("").is_nan());
        assert!(parse_display(".").is_nan());
        assert!(parse_display("-").is_nan());
    }

    #[test]
    fn test_formatted_values_parse_back() {
        for v in [0.5, -7.0, 1e21, 1.5e-7, 123456.789] {
            assert_eq!(parse_display(&format_number(v)), v);
        }
    }
}
