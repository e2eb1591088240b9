//! Weather data pipeline for Chinook
//!
//! Fetches Open-Meteo forecasts and normalizes the raw parallel-array
//! payloads into the row-oriented view model the presentation layer
//! consumes, including the day-segment summaries, the 72-hour precipitation
//! chart and the ski-conditions rating.

pub mod forecast;
pub mod geocode;
pub mod precip;
pub mod radar;
pub mod resorts;
pub mod segments;
pub mod ski;
pub mod types;
pub mod wmo;

pub use forecast::{normalize, ForecastClient, RawForecast};
pub use geocode::{GeocodeClient, ReverseGeocoder};
pub use precip::{resolve_type, PrecipKind};
pub use radar::{RadarClient, RadarFrame};
pub use resorts::{resort_by_id, resorts_by_province, SkiResort, PROVINCE_ORDER, SKI_RESORTS};
pub use segments::{aggregate, Daypart};
pub use ski::{normalize_ski, score_conditions, SkiConditions, SkiReport, SkiTier};
pub use types::*;
pub use wmo::classify;
