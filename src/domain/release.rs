use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// A release surfaced to the user, owned by exactly one artist after the join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// `<artist>-<album>`, not unique if an artist reuses an album title
    pub id: String,
    pub title: String,
    pub artist: String,
    pub release_date: NaiveDate,
}

impl Release {
    pub fn new(artist: &str, title: &str, release_date: NaiveDate) -> Self {
        Self {
            id: format!("{artist}-{title}"),
            title: title.to_string(),
            artist: artist.to_string(),
            release_date,
        }
    }

    pub fn year(&self) -> i32 {
        self.release_date.year()
    }

    /// `MM/DD/YYYY`, the way release lists print dates
    pub fn formatted_date(&self) -> String {
        self.release_date.format("%m/%d/%Y").to_string()
    }
}

/// Parses the release dates found in yearly files.
///
/// MusicBrainz hands out dates with varying precision, so `2024`, `2024-03`
/// and `2024-03-01` are all accepted. Partial dates resolve to the first day
/// of the month or year. A date-time is accepted when it starts with a full date.
pub fn parse_release_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let (date, has_time) = match raw.find(['T', ' ']) {
        Some(at) => (&raw[..at], true),
        None => (raw, false),
    };

    let mut parts = date.split('-');
    let year = fixed_digits(parts.next()?, 4)?;
    let month = match parts.next() {
        Some(m) => Some(fixed_digits(m, 2)?),
        None => None,
    };
    let day = match parts.next() {
        Some(d) => Some(fixed_digits(d, 2)?),
        None => None,
    };
    if parts.next().is_some() {
        return None;
    }

    match (month, day) {
        (Some(month), Some(day)) => NaiveDate::from_ymd_opt(year as i32, month, day),
        _ if has_time => None,
        (Some(month), None) => NaiveDate::from_ymd_opt(year as i32, month, 1),
        (None, _) => NaiveDate::from_ymd_opt(year as i32, 1, 1),
    }
}

/// Exactly `len` ASCII digits
fn fixed_digits(part: &str, len: usize) -> Option<u32> {
    if part.len() != len || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

/// Stable sort, newest first. Releases sharing a date keep their encounter order.
pub fn sort_newest_first(releases: &mut [Release]) {
    releases.sort_by(|a, b| b.release_date.cmp(&a.release_date));
}
