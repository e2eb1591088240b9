//! Environment Canada weather alerts for Chinook
//!
//! Resolves active alerts for any Canadian coordinate pair by snapping to
//! the nearest citypage station, and digs the full alert text out of the
//! server-rendered warning pages.

pub mod client;
pub mod detail;
pub mod stations;
pub mod types;

pub use client::{sort_by_severity, AlertClient};
pub use detail::extract_embedded_state;
pub use stations::{haversine_km, nearest_station, Station, STATIONS};
pub use types::{Severity, WeatherAlert};
