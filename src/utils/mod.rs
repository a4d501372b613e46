use chrono::{Datelike, Utc};

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}

pub fn format_decimal(value: f64) -> String {
    format!("{:.2}", value)
}

/// Strips formatting from a phone number; valid numbers are exactly 10 digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        Some(digits)
    } else {
        None
    }
}

pub fn folio_sequence(folio: &str, year: i32) -> Option<u32> {
    let prefix = format!("COT-{}-", year);
    folio.strip_prefix(&prefix)?.parse().ok()
}

/// Locally computed folio used when the next-folio endpoint is unreachable.
/// Continues the current year's sequence from whatever is mirrored locally.
pub fn fallback_folio<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let year = Utc::now().year();
    let next = existing
        .into_iter()
        .filter_map(|folio| folio_sequence(folio, year))
        .max()
        .unwrap_or(0)
        + 1;
    format!("COT-{}-{:03}", year, next)
}
