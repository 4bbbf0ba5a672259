//! Day-first date parsing for statement cells and line-parser tokens.

use chrono::{NaiveDate, NaiveDateTime};

// Two-digit-year formats come first: `%Y` would happily read "25" as year 25.
const DAY_FIRST: &[&str] = &["%d/%m/%y", "%d-%m-%y", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
const MONTH_FIRST: &[&str] = &["%m/%d/%y", "%m-%d-%y", "%m/%d/%Y", "%m-%d-%Y"];
const YEAR_FIRST: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATETIME: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Parse a date cell using the day-first convention.
///
/// Numeric dates are read as DD/MM first and only fall back to MM/DD when the
/// day-first reading is not a real calendar date (`12/25/2025`). Year-first
/// ISO forms, timestamps and month-name forms (`Sep 2, 2025`, `2 Sep 2025`)
/// are also accepted. Returns `None` for anything else.
pub fn parse_day_first(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DAY_FIRST.iter().chain(MONTH_FIRST).chain(YEAR_FIRST) {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    for fmt in DATETIME {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    parse_month_name(s)
}

/// `Sep 2, 2025`, `September 02 2025`, `Sep-2-2025`, `2 Sep 2025`
fn parse_month_name(s: &str) -> Option<NaiveDate> {
    let cleaned = s.replace([',', '-', '.'], " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }

    let (month, day, year) = if let Some(m) = month_number(parts[0]) {
        (m, parts[1], parts[2])
    } else if let Some(m) = month_number(parts[1]) {
        (m, parts[0], parts[2])
    } else {
        return None;
    };

    let day: u32 = day.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if year < 100 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_number(word: &str) -> Option<u32> {
    let prefix: String = word.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    // Reject words that merely start like a month ("Marketing").
    if word.len() > 3 && !full_month_name(month).starts_with(&word.to_ascii_lowercase()) {
        return None;
    }
    Some(month)
}

fn full_month_name(month: u32) -> &'static str {
    match month {
        1 => "january",
        2 => "february",
        3 => "march",
        4 => "april",
        5 => "may",
        6 => "june",
        7 => "july",
        8 => "august",
        9 => "september",
        10 => "october",
        11 => "november",
        _ => "december",
    }
}
