use chrono::{Datelike, Local, NaiveDate};
use log::{debug, info};
use rouille::{Request, Response};
use serde::Serialize;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};
use tokio::runtime::Runtime;

use crate::{
    catalog::{Catalog, aggregate::LoadReport},
    config::HttpConfig,
    domain::{artist::Artist, period::FilterPeriod, release::Release},
    http::error::ApiError,
    settings::{SettingsPatch, SettingsStore},
    source::check_path,
    state::AppState,
};

const DEFAULT_PAGE_SIZE: usize = 50;

pub struct HttpServer {
    state: Arc<Mutex<AppState>>,
    /// held for a whole load cycle so reloads never overlap
    reload_lock: Mutex<()>,
    catalog: Arc<Catalog>,
    settings: SettingsStore,
    runtime: Arc<Runtime>,
    /// fixed year for discovery, the local calendar year when unset
    current_year: Option<i32>,
    pub config: HttpConfig,
    fallback_backdrop: String,
}

impl HttpServer {
    pub fn new(
        catalog: Catalog,
        settings: SettingsStore,
        runtime: Arc<Runtime>,
        config: HttpConfig,
        fallback_backdrop: String,
        current_year: Option<i32>,
    ) -> Self {
        let state = AppState::new(settings.load());
        Self {
            state: Arc::new(Mutex::new(state)),
            reload_lock: Mutex::new(()),
            catalog: Arc::new(catalog),
            settings,
            runtime,
            current_year,
            config,
            fallback_backdrop,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    /// Runs a full load cycle and swaps the result into the shared state
    pub fn reload(&self) -> Result<LoadReport, ApiError> {
        let _reloading = self
            .reload_lock
            .lock()
            .map_err(|e| ApiError::Internal(format!("Reload lock poisoned: {e}")))?;
        let year = self.current_year.unwrap_or_else(|| Local::now().year());
        let aggregation = self.runtime.block_on(self.catalog.load(year));
        let report = aggregation.report.clone();
        self.lock_state()?.replace(aggregation);
        Ok(report)
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/api/artists) => {
                self.handle_list_artists()
            },
            (GET) (/api/artists/{name: String}) => {
                self.handle_get_artist(&name, request)
            },
            (GET) (/api/releases) => {
                self.handle_list_releases(request)
            },
            (GET) (/api/years) => {
                self.lock_state().map(|state| Response::json(&state.years))
            },
            (GET) (/api/settings) => {
                self.lock_state().map(|state| Response::json(&state.settings))
            },
            (POST) (/api/settings) => {
                self.handle_update_settings(request)
            },
            (POST) (/api/reload) => {
                self.reload().map(|report| Response::json(&report))
            },
            (DELETE) (/api/data) => {
                self.lock_state().map(|mut state| {
                    state.clear_data();
                    Response::empty_204()
                })
            },
            (GET) (/data/{file: String}) => {
                self.handle_data_file(&file)
            },
            _ => Ok(Response::empty_404())
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, AppState>, ApiError> {
        self.state
            .lock()
            .map_err(|e| ApiError::Internal(format!("Could not access app state under lock: {e}")))
    }

    fn period_param(request: &Request) -> Result<FilterPeriod, ApiError> {
        match request.get_param("year") {
            Some(raw) => raw.parse().map_err(ApiError::BadRequest),
            None => Ok(FilterPeriod::All),
        }
    }

    fn usize_param(request: &Request, name: &str, default: usize) -> Result<usize, ApiError> {
        match request.get_param(name) {
            Some(raw) => raw
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("invalid {name}: {raw}"))),
            None => Ok(default),
        }
    }

    fn handle_list_artists(&self) -> Result<Response, ApiError> {
        let state = self.lock_state()?;
        let body = ArtistsResponse {
            columns: state.settings.grid_columns(),
            artists: state
                .artists_sorted()
                .into_iter()
                .map(|a| ArtistSummary::from_domain(a, &self.fallback_backdrop))
                .collect(),
        };
        Ok(Response::json(&body))
    }

    fn handle_get_artist(&self, name: &str, request: &Request) -> Result<Response, ApiError> {
        let period = Self::period_param(request)?;
        let state = self.lock_state()?;
        let artist = state
            .artist(name)
            .ok_or_else(|| ApiError::NotFound(format!("artist {name} not found")))?;

        Ok(Response::json(&ArtistDetailResponse {
            artist: ArtistSummary::from_domain(artist, &self.fallback_backdrop),
            available_years: artist.release_years(),
            period: period.to_string(),
            releases: artist
                .releases_in(period)
                .into_iter()
                .map(|r| ReleaseEntry::from_domain(r, Some(artist.color)))
                .collect(),
        }))
    }

    fn handle_list_releases(&self, request: &Request) -> Result<Response, ApiError> {
        let period = Self::period_param(request)?;
        let offset = Self::usize_param(request, "offset", 0)?;
        let limit = Self::usize_param(request, "limit", DEFAULT_PAGE_SIZE)?;

        let state = self.lock_state()?;
        let colors = state.colors();
        let page = state.page(period, offset, limit);

        Ok(Response::json(&ReleasesResponse {
            releases: page
                .releases
                .into_iter()
                .map(|r| ReleaseEntry::from_domain(r, colors.get(r.artist.as_str()).copied()))
                .collect(),
            has_more: page.has_more,
        }))
    }

    fn handle_update_settings(&self, request: &Request) -> Result<Response, ApiError> {
        let patch: SettingsPatch = rouille::input::json_input(request)
            .map_err(|e| ApiError::BadRequest(format!("invalid settings: {e}")))?;

        let mut state = self.lock_state()?;
        state.apply_settings(&patch);
        self.settings.save(&state.settings)?;
        Ok(Response::json(&state.settings))
    }

    fn handle_data_file(&self, file: &str) -> Result<Response, ApiError> {
        let dir = self
            .config
            .data_dir
            .as_deref()
            .ok_or_else(|| ApiError::NotFound("no data directory is served".into()))?;
        let path = Self::data_path(dir, file)?;
        if !path.is_file() {
            return Err(ApiError::NotFound(format!("{file} not found")));
        }

        let handle = std::fs::File::open(&path)
            .map_err(|_| ApiError::NotFound(format!("{file} not found")))?;
        let mime = mime_guess::from_path(&path).first_or_octet_stream().to_string();
        debug!("DATA {} -> {}, MIME type: {}", file, path.to_string_lossy(), mime);

        Ok(Response::from_file(mime, handle))
    }

    fn data_path(dir: &Path, file: &str) -> Result<PathBuf, ApiError> {
        let file = check_path(file).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        Ok(dir.join(file))
    }
}

#[derive(Serialize)]
struct ArtistsResponse {
    columns: u32,
    artists: Vec<ArtistSummary>,
}

#[derive(Serialize)]
struct ArtistSummary {
    name: String,
    cover: String,
    backdrop: String,
    color: String,
    release_count: usize,
    latest_release: Option<NaiveDate>,
}

impl ArtistSummary {
    fn from_domain(artist: &Artist, fallback_backdrop: &str) -> Self {
        Self {
            name: artist.name.clone(),
            cover: artist.cover_or_fallback().to_string(),
            backdrop: artist.backdrop_or(fallback_backdrop).to_string(),
            color: artist.color_hex(),
            release_count: artist.releases.len(),
            latest_release: artist.releases.first().map(|r| r.release_date),
        }
    }
}

#[derive(Serialize)]
struct ArtistDetailResponse {
    #[serde(flatten)]
    artist: ArtistSummary,
    available_years: Vec<i32>,
    period: String,
    releases: Vec<ReleaseEntry>,
}

#[derive(Serialize)]
struct ReleasesResponse {
    releases: Vec<ReleaseEntry>,
    has_more: bool,
}

#[derive(Serialize)]
struct ReleaseEntry {
    id: String,
    title: String,
    artist: String,
    release_date: NaiveDate,
    formatted_date: String,
    /// border color, `None` when the artist is not loaded
    color: Option<String>,
}

impl ReleaseEntry {
    fn from_domain(release: &Release, color: Option<u32>) -> Self {
        Self {
            id: release.id.clone(),
            title: release.title.clone(),
            artist: release.artist.clone(),
            release_date: release.release_date,
            formatted_date: release.formatted_date(),
            color: color.map(crate::domain::artist::color_hex),
        }
    }
}

#[cfg(test)]
pub fn parse_json_response(response: rouille::Response) -> anyhow::Result<serde_json::Value> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
