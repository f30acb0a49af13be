// Utility helpers for lenient field coercion and number formatting.
//
// Capacity exports are hand-maintained spreadsheets, so every numeric cell is
// treated as untrusted text. Everything here returns a usable value instead of
// an error; the loader decides what a missing value means.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Coerce a cell into a bed count.
///
/// Follows leading-integer semantics:
/// - trims whitespace and accepts an optional sign,
/// - reads digits until the first non-digit (`"12 beds"` is 12, `"3.7"` is 3),
/// - anything without leading digits is 0,
/// - negative results are clamped to 0 since a count can't go below zero.
pub fn parse_count(s: Option<&str>) -> u32 {
    let Some(s) = s else { return 0 };
    let s = s.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 || negative {
        return 0;
    }
    // Saturate absurdly long digit runs rather than wrapping.
    digits[..end].parse::<u32>().unwrap_or(u32::MAX)
}

/// Strip every double quote and surrounding whitespace from a text cell.
pub fn clean_text(s: &str) -> String {
    s.replace('"', "").trim().to_string()
}

/// Parse a report date.
///
/// Accepts ISO dates (`2021-03-04`), slash variants (`2021/03/04`,
/// `03/04/2021`) and date-times with a `T` or space separator, in which case
/// only the date part is kept.
pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    // Fall back to the leading date of longer timestamps (`...Z`, offsets, fractions).
    if s.len() > 10 && s.is_char_boundary(10) {
        return NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok();
    }
    None
}

/// `part / whole * 100`, or 0 when there is nothing to divide by.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

/// Round to one decimal place.
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus locale-aware thousands separators (`1,234.5`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_val: i64 = parts.next().unwrap_or("0").parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = parts.next() {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}
