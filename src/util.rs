// Parsing and number-formatting helpers.
//
// Loader code goes through these so that a rejected cell always comes back
// as `None` and the caller decides how to report it.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};

/// Placeholder printed for statistics that are undefined (empty subsets,
/// zero denominators).
pub const NOT_APPLICABLE: &str = "n/a";

/// Parse a daily count: trimmed, non-empty, digits only.
///
/// Signs, decimals and thousands separators are rejected; a drink count
/// that needs any of them is not a valid cell.
pub fn parse_count_safe(s: Option<&str>) -> Option<u32> {
    let s = s?.trim();
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    s.parse::<u32>().ok()
}

pub fn parse_date_safe(s: Option<&str>) -> Option<NaiveDate> {
    // CSV dates are expected in `YYYY-MM-DD` format.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus `1,234,567.89`-style thousands separators.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg && res.chars().any(|c| c.is_ascii_digit() && c != '0') {
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

/// Two-decimal rendering of an optional statistic.
pub fn format_opt(v: Option<f64>) -> String {
    v.map(|x| format_number(x, 2)).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

pub fn format_opt_int(v: Option<i64>) -> String {
    v.map(format_int).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

pub fn format_pct(v: Option<f64>) -> String {
    v.map(|x| format!("{}%", format_number(x, 2)))
        .unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Signed rendering used for day-over-day and year-over-year deltas.
pub fn format_signed(n: i64) -> String {
    if n > 0 {
        format!("+{}", format_int(n))
    } else {
        format_int(n)
    }
}
