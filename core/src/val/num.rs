//! Lenient numeric parsing and script-style number formatting.
//!
//! The scripting language has no scalar type errors: any text coerces to a
//! number by reading the longest valid numeric prefix, and anything else is
//! `0`. Formatting goes the other way; integral floats print without a
//! fractional part so `2.0` round-trips as `"2"`.

/// Parse a leading integer prefix: optional whitespace, optional sign,
/// decimal digits. Returns 0 when no digits are present.
pub fn parse_int_prefix(text: &str) -> i64 {
    let s = text.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(&b'-') => (-1i64, &s[1..]),
        Some(&b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return 0;
    }
    // Saturate rather than wrap on absurdly long digit runs.
    match digits[..end].parse::<i64>() {
        Ok(v) => sign * v,
        Err(_) => {
            if sign < 0 {
                i64::MIN
            } else {
                i64::MAX
            }
        }
    }
}

/// Parse a leading float prefix: optional whitespace, optional sign, digits
/// with an optional decimal point and an optional exponent. Returns 0.0 when
/// no valid prefix exists.
pub fn parse_float_prefix(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(&(b'+' | b'-'))) {
        i += 1;
    }
    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits > 0 || frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return 0.0;
    }
    // Exponent only counts when at least one digit follows it.
    if matches!(bytes.get(i), Some(&(b'e' | b'E'))) {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(&(b'+' | b'-'))) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    s[..i].parse::<f64>().unwrap_or(0.0)
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Round to the nearest integer, half away from zero. Non-finite input
/// degrades to 0 like every other coercion failure.
pub fn round_to_int(v: f64) -> i64 {
    if v.is_finite() { v.round() as i64 } else { 0 }
}

pub fn format_int(v: i64) -> String {
    itoa::Buffer::new().format(v).to_string()
}

/// Format a float the way script text expects: integral values print as
/// integers, everything else via the shortest round-trip representation.
pub fn format_float(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    if v.fract() == 0.0 && v.abs() < 9e15 {
        return format_int(v as i64);
    }
    ryu::Buffer::new().format_finite(v).to_string()
}
