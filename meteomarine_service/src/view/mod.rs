//! Page-level views and the router between them.
//!
//! The root `Dashboard` loads the full observation batch once, the way the
//! dashboard's shell does, and hands it to the Map view explicitly. A Map
//! view opened before that load settles picks the batch up when it lands. The
//! Live Data, Forecast and Alerts views each own a single fetch through a
//! `ViewLoader`; Home and NotFound fetch nothing.

pub mod loader;
pub mod map;
pub mod render;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use crate::alert::stalenesses::stale_stations_at;
use crate::analysis::groupings::latest_per_station;
use crate::ingest::api::WeatherApi;
use crate::logging::{self, DataSource};
use crate::model::{FetchError, ForecastRecord, WeatherRecord};
use crate::stations::StationFilter;
use loader::{LoadState, ViewLoader};

/// Prefix of every page title.
pub const TITLE_PREFIX: &str = "Meteo PAD";

// ---------------------------------------------------------------------------
// Routes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Home,
    Map,
    LiveData,
    Forecast,
    Alerts,
    NotFound,
}

/// A link card on the Home view.
#[derive(Debug, Clone, Copy)]
pub struct HomeCard {
    pub target: View,
    pub title: &'static str,
    pub description: &'static str,
}

impl View {
    /// Views reachable from the navigation bar, in menu order.
    pub const NAVIGATION: [View; 5] = [
        View::Home,
        View::Map,
        View::LiveData,
        View::Forecast,
        View::Alerts,
    ];

    /// Resolves a location path. Unknown paths route to `NotFound`.
    pub fn route(path: &str) -> View {
        let path = path.trim();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        View::NAVIGATION
            .into_iter()
            .find(|v| v.path() == normalized)
            .unwrap_or(View::NotFound)
    }

    pub fn path(self) -> &'static str {
        match self {
            View::Home => "/",
            View::Map => "/map",
            View::LiveData => "/live-data",
            View::Forecast => "/forecast",
            View::Alerts => "/alerts",
            View::NotFound => "*",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Map => "Map View",
            View::LiveData => "Live Data",
            View::Forecast => "Forecast",
            View::Alerts => "Alerts",
            View::NotFound => "Not Found",
        }
    }

    pub fn document_title(self) -> String {
        format!("{} - {}", TITLE_PREFIX, self.title())
    }

    pub fn home_cards() -> [HomeCard; 3] {
        [
            HomeCard {
                target: View::Forecast,
                title: "Accurate forecasts",
                description: "Forecasts for the coming days, regularly updated.",
            },
            HomeCard {
                target: View::Map,
                title: "Interactive map",
                description: "The port's weather stations (SM1 to SM4) on a map.",
            },
            HomeCard {
                target: View::Alerts,
                title: "Alerts & advice",
                description: "Dangerous conditions with expert recommendations.",
            },
        ]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// User toggles that shape what a view displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewOptions {
    pub station: StationFilter,
    pub only_alerts: bool,
    pub with_risk: bool,
}

/// Root observation batch, shared between the dashboard and mounted Map views.
type SharedBatch = Arc<Mutex<ViewLoader<Vec<WeatherRecord>>>>;

fn lock_batch(batch: &SharedBatch) -> MutexGuard<'_, ViewLoader<Vec<WeatherRecord>>> {
    batch.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Logs a settled observation batch and returns the stations whose newest
/// record is older than `stale_after_minutes` at `now`.
pub fn log_observation_batch(
    records: &[WeatherRecord],
    stale_after_minutes: u64,
    now: DateTime<Utc>,
) -> Vec<String> {
    let stale = stale_stations_at(&latest_per_station(records), stale_after_minutes, now);
    logging::log_batch_summary(DataSource::Observations, records.len(), &stale);
    stale
}

fn load_observations(
    api: &WeatherApi,
    limit: Option<u32>,
) -> Result<Vec<WeatherRecord>, FetchError> {
    api.observations(limit).inspect(|records| {
        log_observation_batch(records, api.config().stale_after_minutes, Utc::now());
    })
}

/// Root of the view tree: owns the API handle and the full observation batch.
#[derive(Debug)]
pub struct Dashboard {
    api: WeatherApi,
    observations: SharedBatch,
}

impl Dashboard {
    /// Starts the root observation load in the background.
    pub fn start(api: WeatherApi) -> Self {
        let worker_api = api.clone();
        let loader = ViewLoader::spawn("observations", move |_| {
            load_observations(&worker_api, None)
        });
        Self::with_loader(api, loader)
    }

    /// Builds a dashboard around an already-settled root batch.
    pub fn with_observations(
        api: WeatherApi,
        observations: Result<Vec<WeatherRecord>, FetchError>,
    ) -> Self {
        Self::with_loader(api, ViewLoader::ready(observations))
    }

    fn with_loader(api: WeatherApi, loader: ViewLoader<Vec<WeatherRecord>>) -> Self {
        Self {
            api,
            observations: Arc::new(Mutex::new(loader)),
        }
    }

    /// Blocks until the root batch has settled.
    pub fn wait(&self) -> LoadState<Vec<WeatherRecord>> {
        lock_batch(&self.observations).wait().clone()
    }

    /// Current root state, after applying a finished fetch if there is one.
    pub fn observations(&self) -> LoadState<Vec<WeatherRecord>> {
        let mut loader = lock_batch(&self.observations);
        loader.poll();
        loader.state().clone()
    }

    /// Mounts `view`. Views with their own data start their fetch here; the
    /// Map view follows the root batch.
    pub fn open(&self, view: View, options: ViewOptions) -> ViewSession {
        let api = self.api.clone();
        let content = match view {
            View::Home | View::NotFound => ViewContent::Static,
            View::Map => ViewContent::Map(Arc::clone(&self.observations)),
            View::LiveData => {
                let limit = api.config().observation_limit;
                ViewContent::Observations(ViewLoader::spawn("live-data", move |_| {
                    load_observations(&api, limit)
                }))
            }
            View::Forecast | View::Alerts => {
                ViewContent::Forecasts(ViewLoader::spawn("forecasts", move |_| api.forecasts()))
            }
        };
        ViewSession {
            view,
            options,
            content,
        }
    }
}

#[derive(Debug)]
enum ViewContent {
    Static,
    /// The root batch, settled or not.
    Map(SharedBatch),
    Observations(ViewLoader<Vec<WeatherRecord>>),
    Forecasts(ViewLoader<Vec<ForecastRecord>>),
}

/// A mounted view. Dropping it cancels any fetch of its own still in flight.
#[derive(Debug)]
pub struct ViewSession {
    view: View,
    options: ViewOptions,
    content: ViewContent,
}

impl ViewSession {
    pub fn view(&self) -> View {
        self.view
    }

    /// Non-blocking: applies a finished fetch, if any. Returns `true` when
    /// the display changed. For the Map view the root batch may already have
    /// been applied through the dashboard, in which case this returns `false`
    /// but the next render shows it.
    pub fn poll(&mut self) -> bool {
        match &mut self.content {
            ViewContent::Observations(loader) => loader.poll(),
            ViewContent::Forecasts(loader) => loader.poll(),
            ViewContent::Map(batch) => lock_batch(batch).poll(),
            ViewContent::Static => false,
        }
    }

    /// Blocks until the view's data (if any) has settled.
    pub fn wait(&mut self) {
        match &mut self.content {
            ViewContent::Observations(loader) => {
                loader.wait();
            }
            ViewContent::Forecasts(loader) => {
                loader.wait();
            }
            ViewContent::Map(batch) => {
                lock_batch(batch).wait();
            }
            ViewContent::Static => {}
        }
    }

    /// `true` when the view shows its error banner.
    pub fn is_failed(&self) -> bool {
        match &self.content {
            ViewContent::Observations(loader) => loader.state().error_message().is_some(),
            ViewContent::Forecasts(loader) => loader.state().error_message().is_some(),
            ViewContent::Map(batch) => lock_batch(batch).state().error_message().is_some(),
            ViewContent::Static => false,
        }
    }

    /// Renders the view for `path` (used by NotFound to echo the request).
    pub fn render(&self, path: &str) -> String {
        let options = &self.options;
        match (&self.content, self.view) {
            (ViewContent::Map(batch), _) => {
                render::render_state(lock_batch(batch).state(), |obs| render::render_map(obs))
            }
            (ViewContent::Observations(loader), _) => render::render_state(loader.state(), |obs| {
                render::render_live_data(obs, &options.station)
            }),
            (ViewContent::Forecasts(loader), View::Alerts) => {
                render::render_state(loader.state(), |days| {
                    render::render_alerts(days, options.only_alerts)
                })
            }
            (ViewContent::Forecasts(loader), _) => render::render_state(loader.state(), |days| {
                render::render_forecast(days, options.with_risk)
            }),
            (ViewContent::Static, View::Home) => render::render_home(),
            (ViewContent::Static, _) => render::render_not_found(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::model::FieldValue;
    use chrono::TimeZone;
    use std::sync::mpsc::sync_channel;

    fn offline_api() -> WeatherApi {
        WeatherApi::new(Config::default()).expect("client builds")
    }

    fn observation(station: &str, datetime: &str) -> WeatherRecord {
        WeatherRecord {
            station: Some(station.to_string()),
            datetime: Some(datetime.to_string()),
            latitude: Some(FieldValue::Number(4.05)),
            longitude: Some(FieldValue::Number(9.7)),
            wind_dir: Some(FieldValue::Number(90.0)),
            ..Default::default()
        }
    }

    #[test]
    fn test_map_opened_before_root_settles_shows_batch() {
        let (release_tx, release_rx) = sync_channel::<()>(0);
        let root = ViewLoader::spawn("root", move |_| {
            let _ = release_rx.recv();
            Ok(vec![observation("SM 1", "2025-06-10T10:00:00Z")])
        });
        let dashboard = Dashboard::with_loader(offline_api(), root);

        let mut session = dashboard.open(View::Map, ViewOptions::default());
        assert!(!session.poll());
        assert_eq!(session.render("/map"), format!("{}\n", render::LOADING_MESSAGE));

        release_tx.send(()).expect("root worker is waiting");
        session.wait();
        assert!(!session.is_failed());
        assert!(session.render("/map").contains("* SM 1 at 4.0500, 9.7000"));
        assert!(matches!(dashboard.observations(), LoadState::Loaded(records) if records.len() == 1));
    }

    #[test]
    fn test_map_follows_root_applied_by_dashboard() {
        let (release_tx, release_rx) = sync_channel::<()>(0);
        let root: ViewLoader<Vec<WeatherRecord>> = ViewLoader::spawn("root", move |_| {
            let _ = release_rx.recv();
            Err(FetchError::HttpStatus(502))
        });
        let dashboard = Dashboard::with_loader(offline_api(), root);
        let session = dashboard.open(View::Map, ViewOptions::default());

        release_tx.send(()).expect("root worker is waiting");
        assert_eq!(dashboard.wait(), LoadState::Failed(FetchError::HttpStatus(502)));
        assert!(session.is_failed());
    }

    #[test]
    fn test_observation_batch_flags_stale_stations() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let records = vec![
            observation("SM 1", "2025-06-10T11:50:00Z"),
            observation("SM 2", "2025-06-10T09:00:00Z"),
            observation("SM 2", "2025-06-10T11:00:00Z"),
            observation("SM 3", "garbage"),
        ];
        assert_eq!(log_observation_batch(&records, 30, now), vec!["SM 2", "SM 3"]);
        assert_eq!(log_observation_batch(&records, 120, now), vec!["SM 3"]);
        assert!(log_observation_batch(&[], 30, now).is_empty());
    }

    #[test]
    fn test_routes() {
        assert_eq!(View::route("/"), View::Home);
        assert_eq!(View::route(""), View::Home);
        assert_eq!(View::route("/map"), View::Map);
        assert_eq!(View::route("/live-data/"), View::LiveData);
        assert_eq!(View::route("/forecast"), View::Forecast);
        assert_eq!(View::route("/alerts"), View::Alerts);
        assert_eq!(View::route("/nowhere"), View::NotFound);
        assert_eq!(View::route("/Map"), View::NotFound, "paths are case-sensitive");
    }

    #[test]
    fn test_every_navigation_path_routes_back() {
        for view in View::NAVIGATION {
            assert_eq!(View::route(view.path()), view);
        }
    }

    #[test]
    fn test_document_titles() {
        assert_eq!(View::Home.document_title(), "Meteo PAD - Home");
        assert_eq!(View::Map.document_title(), "Meteo PAD - Map View");
        assert_eq!(View::LiveData.document_title(), "Meteo PAD - Live Data");
    }

    #[test]
    fn test_home_cards_target_real_views() {
        for card in View::home_cards() {
            assert_ne!(View::route(card.target.path()), View::NotFound);
        }
    }
}
