use std::collections::HashMap;

use serde::Serialize;

use crate::{
    catalog::aggregate::{Aggregation, LoadReport},
    domain::{artist::Artist, period::FilterPeriod, release::Release},
    settings::{Settings, SettingsPatch},
};

/// Everything the views read, owned by the controller (CLI run or HTTP server)
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub artists: Vec<Artist>,
    pub years: Vec<i32>,
    pub settings: Settings,
    pub report: LoadReport,
}

#[derive(Debug, Serialize)]
pub struct ReleasePage<'a> {
    pub releases: Vec<&'a Release>,
    pub has_more: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Swaps in a completed load, never a partial one
    pub fn replace(&mut self, aggregation: Aggregation) {
        self.artists = aggregation.artists;
        self.years = aggregation.years;
        self.report = aggregation.report;
    }

    pub fn artists_sorted(&self) -> Vec<&Artist> {
        let mut artists: Vec<&Artist> = self.artists.iter().collect();
        artists.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        artists
    }

    pub fn artist(&self, name: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.name == name)
    }

    /// Releases of all artists, newest first
    pub fn releases(&self, period: FilterPeriod) -> Vec<&Release> {
        let mut releases: Vec<&Release> = self
            .artists
            .iter()
            .flat_map(|a| a.releases.iter())
            .filter(|r| period.matches(&r.release_date))
            .collect();
        releases.sort_by(|a, b| b.release_date.cmp(&a.release_date));
        releases
    }

    pub fn page(&self, period: FilterPeriod, offset: usize, limit: usize) -> ReleasePage<'_> {
        let all = self.releases(period);
        let has_more = all.len() > offset.saturating_add(limit);
        ReleasePage {
            releases: all.into_iter().skip(offset).take(limit).collect(),
            has_more,
        }
    }

    pub fn color_of(&self, artist: &str) -> Option<u32> {
        self.artist(artist).map(|a| a.color)
    }

    pub fn colors(&self) -> HashMap<&str, u32> {
        self.artists
            .iter()
            .map(|a| (a.name.as_str(), a.color))
            .collect()
    }

    pub fn clear_data(&mut self) {
        self.artists.clear();
    }

    pub fn apply_settings(&mut self, patch: &SettingsPatch) {
        self.settings = self.settings.merge(patch);
    }
}
