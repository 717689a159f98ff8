// Numeric formatting and small statistics helpers shared by the report
// modules.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Arithmetic mean; returns 0 for an empty slice to avoid NaNs.
pub fn mean(v: &[f64]) -> f64 {
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

/// Number of working days covered by the data period, inclusive of both
/// endpoints. Falls back to 1 when either date is missing or malformed so
/// per-day goal math never divides by zero.
pub fn period_working_days(start: Option<&str>, end: Option<&str>) -> f64 {
    let parse = |s: Option<&str>| {
        s.map(str::trim)
            .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
    };
    match (parse(start), parse(end)) {
        (Some(a), Some(b)) => (b - a).num_days().abs() as f64 + 1.0,
        _ => 1.0,
    }
}

/// Format a floating-point value with a fixed number of decimal places and
/// locale-aware thousands separators (e.g., `1,234,567.89`).
pub fn format_number(n: f64, decimals: usize) -> String {
    let neg = n.is_sign_negative();
    let abs_n = n.abs();
    // Fixed-decimal string first, then commas into the integer portion.
    let s = format!("{:.*}", decimals, abs_n);
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        if decimals > 0 {
            res.push('.');
            res.push_str(frac);
        }
    } else if decimals > 0 {
        res.push('.');
        res.push_str(&"0".repeat(decimals));
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

/// Thin wrapper around `num-format` for counts in console messages.
pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// Percentage string with one decimal, e.g. `87.5%`.
pub fn format_pct(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(mean(&[2.0, 4.0]), 3.0);
    }

    #[test]
    fn working_days_is_inclusive() {
        assert_eq!(
            period_working_days(Some("2025-03-01"), Some("2025-03-07")),
            7.0
        );
        // Single-day period still counts one day.
        assert_eq!(
            period_working_days(Some("2025-03-01"), Some("2025-03-01")),
            1.0
        );
    }

    #[test]
    fn working_days_falls_back_on_bad_input() {
        assert_eq!(period_working_days(None, Some("2025-03-07")), 1.0);
        assert_eq!(period_working_days(Some("03/01/2025"), Some("x")), 1.0);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 0), "-42");
    }

    #[test]
    fn format_pct_scales_fraction() {
        assert_eq!(format_pct(0.875, 1), "87.5%");
    }
}
