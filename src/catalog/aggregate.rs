//! Joins the roster with the releases of every discovered year

use std::collections::HashMap;

use futures::future::join_all;
use log::{error, info, warn};
use reqwest::Url;
use serde::Serialize;

use crate::{
    catalog::{
        files::{NotifiedAlbum, NotifiedFile, RosterArtist, RosterFile},
        load_json,
    },
    config::Images,
    domain::{
        artist::Artist,
        release::{Release, parse_release_date, sort_newest_first},
    },
    source::{ARTISTS_FILE, DataSource, notified_file},
};

/// How one load step ended. `Missing` and `Failed` both contribute no data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Loaded,
    Missing,
    Failed(String),
}

impl StepStatus {
    pub fn is_degraded(&self) -> bool {
        !matches!(self, StepStatus::Loaded)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct LoadReport {
    pub roster: StepStatus,
    /// in the order the years were requested
    pub years: Vec<(i32, StepStatus)>,
    /// releases dropped because their date could not be read
    pub skipped_releases: usize,
}

impl LoadReport {
    pub fn is_degraded(&self) -> bool {
        self.roster.is_degraded()
            || self
                .years
                .iter()
                .any(|(_, status)| matches!(status, StepStatus::Failed(_)))
    }
}

/// Result of one full load cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Aggregation {
    pub artists: Vec<Artist>,
    /// most recent first
    pub years: Vec<i32>,
    pub roster_updated: Option<String>,
    pub report: LoadReport,
}

/// Fetches the roster and the given yearly files and joins them.
///
/// Never fails: an unusable roster yields no artists (and no yearly fetches),
/// an unusable yearly file contributes nothing. The report tells which steps degraded.
pub async fn aggregate(source: &dyn DataSource, years: &[i32], images: &Images) -> Aggregation {
    let mut report = LoadReport::default();

    let roster = match load_json::<RosterFile>(source, ARTISTS_FILE).await {
        Ok(Some(roster)) => roster,
        Ok(None) => {
            error!("Failed to load {ARTISTS_FILE}: not found");
            report.roster = StepStatus::Missing;
            return Aggregation {
                years: years.to_vec(),
                report,
                ..Default::default()
            };
        }
        Err(e) => {
            error!("Failed to load {ARTISTS_FILE}: {e}");
            report.roster = StepStatus::Failed(e.to_string());
            return Aggregation {
                years: years.to_vec(),
                report,
                ..Default::default()
            };
        }
    };

    let per_year = join_all(years.iter().map(|&year| load_year(source, year))).await;

    let mut albums = Vec::new();
    for (year, (status, mut list)) in years.iter().zip(per_year) {
        report.years.push((*year, status));
        albums.append(&mut list);
    }

    let (artists, skipped) = join_releases(&roster.artists, &albums, images);
    if skipped > 0 {
        warn!("Skipped {skipped} release(s) with unreadable dates");
    }
    report.skipped_releases = skipped;

    info!(
        "Loaded {} artist(s) with {} release(s) from {} year file(s)",
        artists.len(),
        artists.iter().map(|a| a.releases.len()).sum::<usize>(),
        years.len()
    );

    Aggregation {
        artists,
        years: years.to_vec(),
        roster_updated: roster.last_updated,
        report,
    }
}

async fn load_year(source: &dyn DataSource, year: i32) -> (StepStatus, Vec<NotifiedAlbum>) {
    let path = notified_file(year);
    match load_json::<NotifiedFile>(source, &path).await {
        Ok(Some(file)) => (StepStatus::Loaded, file.notified_albums),
        Ok(None) => (StepStatus::Missing, vec![]),
        Err(e) => {
            warn!("No releases loaded for {year}: {e}");
            (StepStatus::Failed(e.to_string()), vec![])
        }
    }
}

/// Attaches to every roster artist the releases carrying exactly its name.
///
/// Releases of artists missing from the roster are dropped. Each artist's
/// releases are sorted newest first, ties keep the order of `albums`.
/// Returns the artists in roster order and the number of releases skipped
/// for an unreadable date.
pub fn join_releases(
    roster: &[RosterArtist],
    albums: &[NotifiedAlbum],
    images: &Images,
) -> (Vec<Artist>, usize) {
    let mut skipped = 0;
    let mut by_artist: HashMap<&str, Vec<Release>> = HashMap::new();

    for album in albums {
        match parse_release_date(&album.release_date) {
            Some(date) => by_artist
                .entry(album.artist.as_str())
                .or_default()
                .push(Release::new(&album.artist, &album.album, date)),
            None => skipped += 1,
        }
    }

    let artists = roster
        .iter()
        .map(|entry| {
            let mut releases = by_artist.get(entry.name.as_str()).cloned().unwrap_or_default();
            sort_newest_first(&mut releases);
            Artist {
                name: entry.name.clone(),
                cover: entry.cover.clone().filter(|c| !c.is_empty()),
                backdrop: entry.backdrop.clone().filter(|b| !b.is_empty()),
                fallback_image: fallback_image(images, &entry.name),
                color: entry.color,
                releases,
            }
        })
        .collect();

    (artists, skipped)
}

/// Static fallback path, or a placeholder URL built from the artist name
fn fallback_image(images: &Images, name: &str) -> String {
    let Some(base) = images.placeholder_url.as_deref() else {
        return images.fallback_image.clone();
    };
    match Url::parse_with_params(base, &[("name", name)]) {
        Ok(url) => url.to_string(),
        Err(e) => {
            warn!("Invalid placeholder URL {base}: {e}");
            images.fallback_image.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::source::memory::MemorySource;

    fn images() -> Images {
        Images::default()
    }

    fn roster_json(names: &[&str]) -> String {
        let artists: Vec<String> = names
            .iter()
            .map(|n| format!(r#"{{"name": "{n}", "id": null, "color": 255}}"#))
            .collect();
        format!(
            r#"{{"artists": [{}], "last_updated": "2024-05-01T00:00:00"}}"#,
            artists.join(",")
        )
    }

    fn album(artist: &str, title: &str, date: &str) -> NotifiedAlbum {
        NotifiedAlbum {
            artist: artist.to_string(),
            album: title.to_string(),
            release_date: date.to_string(),
            notified_at: None,
        }
    }

    fn roster_artist(name: &str) -> RosterArtist {
        RosterArtist {
            name: name.to_string(),
            id: None,
            color: 0,
            backdrop: None,
            cover: None,
        }
    }

    #[tokio::test]
    async fn drops_releases_of_artists_not_in_the_roster() {
        let source = MemorySource::new()
            .with_file(ARTISTS_FILE, r#"{"artists": [{"name": "X"}]}"#)
            .with_file(
                "notified_2024.json",
                r#"{"notified_albums": [
                    {"artist": "X", "album": "A", "release_date": "2024-03-01"},
                    {"artist": "Y", "album": "B", "release_date": "2024-01-01"}
                ]}"#,
            );

        let result = aggregate(&source, &[2024], &images()).await;

        assert_eq!(result.artists.len(), 1);
        let x = &result.artists[0];
        assert_eq!(x.name, "X");
        assert_eq!(x.releases.len(), 1);
        assert_eq!(x.releases[0].title, "A");
        assert_eq!(x.releases[0].id, "X-A");
        assert!(result.artists.iter().all(|a| a.name != "Y"));
        assert!(!result.report.is_degraded());
    }

    #[tokio::test]
    async fn merges_years_and_sorts_newest_first() {
        let source = MemorySource::new()
            .with_file(ARTISTS_FILE, &roster_json(&["Kaytranada", "Little Simz"]))
            .with_file(
                "notified_2023.json",
                r#"{"notified_albums": [
                    {"artist": "Kaytranada", "album": "Old", "release_date": "2023-02-01"},
                    {"artist": "Little Simz", "album": "NWBA", "release_date": "2023-06-09"}
                ]}"#,
            )
            .with_file(
                "notified_2024.json",
                r#"{"notified_albums": [
                    {"artist": "Kaytranada", "album": "Timeless", "release_date": "2024-06-07"},
                    {"artist": "Kaytranada", "album": "EP", "release_date": "2024-01-05"}
                ]}"#,
            );

        let result = aggregate(&source, &[2024, 2023], &images()).await;

        let kay = &result.artists[0];
        let titles: Vec<_> = kay.releases.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Timeless", "EP", "Old"]);
        assert_eq!(result.artists[1].releases.len(), 1);
        assert_eq!(result.roster_updated.as_deref(), Some("2024-05-01T00:00:00"));

        for artist in &result.artists {
            assert!(artist.releases.iter().all(|r| r.artist == artist.name));
            assert!(
                artist
                    .releases
                    .windows(2)
                    .all(|w| w[0].release_date >= w[1].release_date)
            );
        }
    }

    #[tokio::test]
    async fn missing_roster_gives_no_artists_and_skips_years() {
        let source = MemorySource::new().with_file("notified_2024.json", "{}");

        let result = aggregate(&source, &[2024], &images()).await;

        assert!(result.artists.is_empty());
        assert_eq!(result.report.roster, StepStatus::Missing);
        assert_eq!(source.requested(), vec![ARTISTS_FILE.to_string()]);
    }

    #[tokio::test]
    async fn broken_roster_is_reported_as_failed() {
        let source = MemorySource::new().with_file(ARTISTS_FILE, "{not json");

        let result = aggregate(&source, &[], &images()).await;

        assert!(result.artists.is_empty());
        assert!(matches!(result.report.roster, StepStatus::Failed(_)));
        assert!(result.report.is_degraded());
    }

    #[tokio::test]
    async fn yearly_failures_keep_every_roster_artist() {
        let source = MemorySource::new()
            .with_file(ARTISTS_FILE, &roster_json(&["A", "B", "C"]))
            .with_file(
                "notified_2024.json",
                r#"{"notified_albums": [{"artist": "A", "album": "One", "release_date": "2024-01-01"}]}"#,
            )
            .with_file("notified_2023.json", "[[[")
            .with_broken("notified_2022.json");

        let result = aggregate(&source, &[2024, 2023, 2022, 2021], &images()).await;

        assert_eq!(result.artists.len(), 3);
        assert_eq!(result.artists[0].releases.len(), 1);
        assert_eq!(result.report.years[0], (2024, StepStatus::Loaded));
        assert!(matches!(result.report.years[1], (2023, StepStatus::Failed(_))));
        assert!(matches!(result.report.years[2], (2022, StepStatus::Failed(_))));
        assert_eq!(result.report.years[3], (2021, StepStatus::Missing));
        assert!(result.report.is_degraded());
    }

    #[tokio::test]
    async fn missing_years_alone_are_not_degraded() {
        let source = MemorySource::new().with_file(ARTISTS_FILE, &roster_json(&["A"]));

        let result = aggregate(&source, &[2024], &images()).await;

        assert_eq!(result.report.years, vec![(2024, StepStatus::Missing)]);
        assert!(!result.report.is_degraded());
    }

    #[tokio::test]
    async fn repeated_loads_are_equal() {
        let source = MemorySource::new()
            .with_file(ARTISTS_FILE, &roster_json(&["A", "B"]))
            .with_file(
                "notified_2024.json",
                r#"{"notified_albums": [
                    {"artist": "B", "album": "Two", "release_date": "2024-02-02"},
                    {"artist": "A", "album": "One", "release_date": "2024-01-01"}
                ]}"#,
            );

        let first = aggregate(&source, &[2024], &images()).await;
        let second = aggregate(&source, &[2024], &images()).await;

        assert_eq!(first, second);
    }

    #[test]
    fn join_is_exact_name_match() {
        let roster = vec![roster_artist("Bjork"), roster_artist("Björk")];
        let albums = vec![
            album("Björk", "Fossora", "2022-09-30"),
            album("bjork", "Lowercase", "2022-01-01"),
        ];

        let (artists, skipped) = join_releases(&roster, &albums, &images());

        assert_eq!(skipped, 0);
        assert!(artists[0].releases.is_empty());
        assert_eq!(artists[1].releases.len(), 1);
        assert_eq!(
            artists[1].releases[0].release_date,
            NaiveDate::from_ymd_opt(2022, 9, 30).unwrap()
        );
    }

    #[test]
    fn equal_dates_keep_encounter_order() {
        let roster = vec![roster_artist("A")];
        let albums = vec![
            album("A", "first", "2024-05-05"),
            album("A", "newer", "2024-06-01"),
            album("A", "second", "2024-05-05"),
        ];

        let (artists, _) = join_releases(&roster, &albums, &images());

        let titles: Vec<_> = artists[0].releases.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["newer", "first", "second"]);
    }

    #[test]
    fn unreadable_dates_are_counted_not_attached() {
        let roster = vec![roster_artist("A")];
        let albums = vec![
            album("A", "ok", "2024"),
            album("A", "bad", "TBA"),
            album("A", "short year", "24-01-01"),
        ];

        let (artists, skipped) = join_releases(&roster, &albums, &images());

        assert_eq!(skipped, 2);
        assert_eq!(artists[0].releases.len(), 1);
        assert_eq!(artists[0].releases[0].title, "ok");
    }

    #[test]
    fn fallback_image_is_static_or_placeholder() {
        let roster = vec![roster_artist("Daft Punk")];

        let (artists, _) = join_releases(&roster, &[], &images());
        assert_eq!(artists[0].fallback_image, "/icons/trackly.png");
        assert_eq!(artists[0].cover_or_fallback(), "/icons/trackly.png");

        let placeholder = Images {
            placeholder_url: Some("https://placehold.example/avatar".to_string()),
            ..Images::default()
        };
        let (artists, _) = join_releases(&roster, &[], &placeholder);
        assert_eq!(
            artists[0].fallback_image,
            "https://placehold.example/avatar?name=Daft+Punk"
        );
    }

    #[test]
    fn empty_image_refs_count_as_absent() {
        let roster = vec![RosterArtist {
            cover: Some(String::new()),
            backdrop: Some("https://img/b.jpg".to_string()),
            ..roster_artist("A")
        }];

        let (artists, _) = join_releases(&roster, &[], &images());

        assert_eq!(artists[0].cover, None);
        assert_eq!(artists[0].backdrop.as_deref(), Some("https://img/b.jpg"));
    }
}
