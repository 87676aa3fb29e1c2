/// Upstream data ingestion.
///
/// - `api`: the MeteoMarine REST API (observations and forecasts).

pub mod api;
