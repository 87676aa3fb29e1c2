//! Marine weather dashboard for the Port Autonome de Douala station network.
//!
//! Fetches observations and forecasts from the MeteoMarine REST API, and
//! turns them into the dashboard's views: station map, live data table,
//! forecast days and alerts.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod export;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod stations;
pub mod verify;
pub mod view;
pub mod wind;
