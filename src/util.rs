// Utility helpers for parsing and number formatting.
//
// This module centralizes all the "dirty" CSV/number/date handling so the
// rest of the code can assume clean, typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Cell values treated as missing, on top of the empty string.
const NULL_TOKENS: &[&str] = &[
    "na", "n/a", "nan", "null", "none", "-", "#n/a",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Outcome of reading a numeric CSV cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Missing,
    Value(f64),
    Invalid,
}

pub fn is_null_token(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || NULL_TOKENS.iter().any(|t| s.eq_ignore_ascii_case(t))
}

/// Parse a numeric cell while being forgiving about formatting issues that
/// are common in CSV exports.
///
/// - Empty cells and null tokens (`NA`, `NaN`, `null`, ...) are `Missing`.
/// - Thousands separators like `","` are stripped before parsing.
/// - Anything with letters left over (including `inf`) is `Invalid`.
pub fn parse_number_cell(s: Option<&str>) -> Cell {
    let Some(s) = s else {
        return Cell::Missing;
    };
    if is_null_token(s) {
        return Cell::Missing;
    }
    let s = s.trim();
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return Cell::Invalid;
    }
    match s.replace(',', "").parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Value(v),
        _ => Cell::Invalid,
    }
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let abs_n = n.abs();
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let mut res = match int_part.parse::<u128>() {
        Ok(v) => v.to_formatted_string(&Locale::en),
        Err(_) => group_digits(int_part),
    };
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

// Digits too long for u128 still get `,` separators.
fn group_digits(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

pub fn format_currency(n: f64) -> String {
    format!("${}", format_number(n, 2))
}

/// Shortest decimal form of an already-rounded ratio, keeping at least one
/// fractional digit: `15.0`, `12.35`, `300.5`.
pub fn format_ratio(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e16 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

pub fn format_percent(n: f64) -> String {
    format!("{}%", format_ratio(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_cell() {
        assert_eq!(parse_number_cell(Some("42")), Cell::Value(42.0));
        assert_eq!(parse_number_cell(Some(" 1,234.5 ")), Cell::Value(1234.5));
        assert_eq!(parse_number_cell(Some("")), Cell::Missing);
        assert_eq!(parse_number_cell(Some("NaN")), Cell::Missing);
        assert_eq!(parse_number_cell(Some("null")), Cell::Missing);
        assert_eq!(parse_number_cell(None), Cell::Missing);
        assert_eq!(parse_number_cell(Some("12abc")), Cell::Invalid);
        assert_eq!(parse_number_cell(Some("inf")), Cell::Invalid);
        assert_eq!(parse_number_cell(Some("1.2.3")), Cell::Invalid);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date_safe(Some("2024-03-09")), expected);
        assert_eq!(parse_date_safe(Some("2024/03/09")), expected);
        assert_eq!(parse_date_safe(Some("03/09/2024")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09 13:45:00")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09T13:45:00")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09 13:45")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09T13:45")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09 13:45:00.250")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09T13:45:00Z")), expected);
        assert_eq!(parse_date_safe(Some("2024-03-09T23:30:00-05:00")), expected);
        assert_eq!(parse_date_safe(Some("not a date")), None);
        assert_eq!(parse_date_safe(Some("2024-02-30")), None);
        assert_eq!(parse_date_safe(Some("  ")), None);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1234.567), 1234.57);
        assert_eq!(round2(15.0), 15.0);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_int(1_400u64), "1,400");
        assert_eq!(format_currency(1234.57), "$1,234.57");
        assert_eq!(format_percent(15.0), "15.0%");
        assert_eq!(format_percent(12.35), "12.35%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_huge_amounts_keep_their_digits() {
        assert_eq!(format_currency(2.0e19), "$20,000,000,000,000,000,000.00");
        assert_eq!(format_number(1.0e40, 0).len(), 41 + 13);
        assert!(format_number(1.0e40, 0).starts_with("10,000,000,000"));
        assert_eq!(group_digits("1234567"), "1,234,567");
        assert_eq!(group_digits("123"), "123");
    }
}
