// Parsing and formatting helpers shared by the loader and the report writers.
//
// Census exports mix thousands separators, blank cells and stray labels into
// numeric columns, so every numeric cell goes through `parse_f64_safe`.
use num_format::{Locale, ToFormattedString};

/// Parse a census cell into `f64`.
///
/// - Accepts `Option<&str>` so callers can pass optional CSV fields through.
/// - Trims whitespace and strips thousands separators (`4,123,354`).
/// - Rejects cells containing letters (`"n/a"`, `"12 km"`).
/// - Returns `None` for blanks and anything that is not a finite number.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let v = s.replace(',', "").parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Trimmed, non-empty text cell.
pub fn parse_text(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals with locale-aware separators, e.g. `19,268.01`.
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

/// Population counts are held as `f64`; print them as whole numbers.
pub fn format_count(n: f64) -> String {
    format_int(n.round() as i64)
}

/// `0.30` -> `30%`
pub fn format_percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_safe() {
        assert_eq!(parse_f64_safe(Some(" 4,123,354 ")), Some(4_123_354.0));
        assert_eq!(parse_f64_safe(Some("2.08")), Some(2.08));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_parse_text() {
        assert_eq!(parse_text(Some("  Model Town ")), Some("Model Town".to_string()));
        assert_eq!(parse_text(Some("   ")), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(19268.014, 2), "19,268.01");
        assert_eq!(format_number(-1234.5, 1), "-1,234.5");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_number(50.0, 0), "50");
    }

    #[test]
    fn test_format_count_and_percent() {
        assert_eq!(format_count(13004135.0), "13,004,135");
        assert_eq!(format_percent(0.25), "25%");
    }
}
