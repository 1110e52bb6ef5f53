//! Shapes of the published JSON files

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Roster older than this many days is considered stale
pub const STALE_ROSTER_DAYS: i64 = 7;

/// `artists.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFile {
    pub artists: Vec<RosterArtist>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterArtist {
    pub name: String,
    /// MusicBrainz id, null when the lookup failed
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub color: u32,
    #[serde(default)]
    pub backdrop: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
}

/// `last_updated` is a naive local ISO-8601 timestamp.
/// A missing or unreadable timestamp counts as stale.
pub fn is_stale(last_updated: Option<&str>, now: NaiveDateTime) -> bool {
    let Some(updated) = last_updated.and_then(parse_timestamp) else {
        return true;
    };
    now - updated > TimeDelta::days(STALE_ROSTER_DAYS)
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// `notified_<year>.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedFile {
    #[serde(default)]
    pub notified_albums: Vec<NotifiedAlbum>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifiedAlbum {
    pub artist: String,
    pub album: String,
    pub release_date: String,
    #[serde(default)]
    pub notified_at: Option<String>,
}

/// `startup.json`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupState {
    #[serde(default)]
    pub initial_startup_complete: bool,
    #[serde(default)]
    pub first_startup_time: Option<String>,
}
