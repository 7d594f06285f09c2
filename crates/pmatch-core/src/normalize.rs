//! Canonical forms for comparing free text and dates.
//!
//! Both functions are total: any input, including the empty string, yields
//! a value. Inputs that do not fit a known date shape are returned trimmed
//! but otherwise untouched.

use chrono::Month;

/// Two-digit years below this expand to the 2000s, otherwise the 1900s.
pub const DEFAULT_YEAR_PIVOT: u32 = 50;

/// Lowercase and keep only ASCII letters and digits.
pub fn normalize_text(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit())
        .collect()
}

/// Canonicalize a date to `YYYY-MM-DD` using the default year pivot.
pub fn normalize_date(raw: &str) -> String {
    normalize_date_with_pivot(raw, DEFAULT_YEAR_PIVOT)
}

/// Canonicalize a date to `YYYY-MM-DD`.
///
/// Recognized shapes:
/// - `D-MMM-YY` through `DD-MMM-YYYY` with an English month abbreviation
///   (`21-Oct-1977`, `3-jan-05`)
/// - `YYYY-M-D` with one- or two-digit month and day (`1977-1-5`)
pub fn normalize_date_with_pivot(raw: &str, year_pivot: u32) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = trimmed.split('-').collect();
    if parts.len() != 3 {
        return trimmed.to_string();
    }
    if let Some(date) = parse_day_month_year(&parts, year_pivot) {
        return date;
    }
    if let Some(date) = parse_year_month_day(&parts) {
        return date;
    }
    trimmed.to_string()
}

fn all_digits(value: &str, min: usize, max: usize) -> bool {
    (min..=max).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

fn month_number(abbrev: &str) -> Option<u32> {
    if abbrev.len() != 3 || !abbrev.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    abbrev.parse::<Month>().ok().map(|month| month.number_from_month())
}

fn parse_day_month_year(parts: &[&str], year_pivot: u32) -> Option<String> {
    let (day, month, year) = (parts[0], parts[1], parts[2]);
    if !all_digits(day, 1, 2) || !all_digits(year, 2, 4) {
        return None;
    }
    let month = month_number(month)?;
    let year = if year.len() == 2 {
        let short: u32 = year.parse().ok()?;
        let century = if short < year_pivot { 2000 } else { 1900 };
        (century + short).to_string()
    } else {
        year.to_string()
    };
    Some(format!("{year}-{month:02}-{day:0>2}"))
}

fn parse_year_month_day(parts: &[&str]) -> Option<String> {
    let (year, month, day) = (parts[0], parts[1], parts[2]);
    if !all_digits(year, 4, 4) || !all_digits(month, 1, 2) || !all_digits(day, 1, 2) {
        return None;
    }
    Some(format!("{year}-{month:0>2}-{day:0>2}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_drops_case_and_punctuation() {
        assert_eq!(normalize_text("O'Brien-Smith"), "obriensmith");
        assert_eq!(normalize_text(" 555-010 0 "), "5550100");
        assert_eq!(normalize_text("José"), "jos");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn day_month_year() {
        assert_eq!(normalize_date("21-Oct-1977"), "1977-10-21");
        assert_eq!(normalize_date("1-JAN-1980"), "1980-01-01");
        assert_eq!(normalize_date("  5-dec-2001 "), "2001-12-05");
    }

    #[test]
    fn two_digit_years_pivot() {
        assert_eq!(normalize_date("3-Mar-49"), "2049-03-03");
        assert_eq!(normalize_date("3-Mar-50"), "1950-03-03");
        assert_eq!(normalize_date("3-Mar-05"), "2005-03-03");
        assert_eq!(normalize_date_with_pivot("3-Mar-30", 25), "1930-03-03");
    }

    #[test]
    fn year_month_day() {
        assert_eq!(normalize_date("1977-10-21"), "1977-10-21");
        assert_eq!(normalize_date("1977-1-5"), "1977-01-05");
    }

    #[test]
    fn unknown_shapes_pass_through_trimmed() {
        assert_eq!(normalize_date(""), "");
        assert_eq!(normalize_date("   "), "");
        assert_eq!(normalize_date(" 10/21/1977 "), "10/21/1977");
        assert_eq!(normalize_date("21-Foo-1977"), "21-Foo-1977");
        assert_eq!(normalize_date("21-October-1977"), "21-October-1977");
        assert_eq!(normalize_date("77-10-21"), "77-10-21");
    }
}
