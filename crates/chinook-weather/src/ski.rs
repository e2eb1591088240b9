//! Ski conditions scoring and the resort report.
//!
//! The rating is a 0-100 additive score over four inputs: base depth,
//! fresh snow over the last 24 hours, daily max temperature and average
//! wind. Band edges are inclusive on the high side (a 200 cm base earns
//! the full 35 points).

use serde::{Deserialize, Serialize};

use chinook_core::FetchError;

use crate::forecast::{build_daily, build_precip_chart, check_daily, RawForecast};
use crate::types::{DailySample, PrecipChartPoint};

/// Hours summed for the fresh-snow and average-wind inputs.
const CONDITIONS_WINDOW: usize = 24;
/// Days shown on the resort panel.
const SKI_DAILY_WINDOW: usize = 3;
/// Hours of the resort precipitation chart.
const SKI_CHART_WINDOW: usize = 72;

const EXCELLENT_CUTOFF: u32 = 72;
const GOOD_CUTOFF: u32 = 50;
const FAIR_CUTOFF: u32 = 28;

/// Scoring bands as (threshold, points), scanned in order, first match wins.
/// Base depth and fresh snow match on `value >= threshold`; temperature and
/// wind match on `value <= threshold`.
const BASE_DEPTH_BANDS: [(f64, u32); 5] =
    [(200.0, 35), (150.0, 30), (100.0, 22), (50.0, 14), (20.0, 7)];
const FRESH_SNOW_BANDS: [(f64, u32); 4] = [(30.0, 30), (20.0, 25), (10.0, 18), (5.0, 10)];
/// Any measurable fresh snow below the first band still scores.
const FRESH_SNOW_TRACE_POINTS: u32 = 4;
/// Ideal band is -15 to -5 °C; colder still skis but grooming suffers, so
/// deep cold scores below the ideal band.
const MAX_TEMP_BANDS: [(f64, u32); 4] = [(-15.0, 16), (-5.0, 25), (0.0, 18), (5.0, 8)];
/// Above 60 km/h lifts start closing.
const WIND_BANDS: [(f64, u32); 3] = [(20.0, 10), (40.0, 6), (60.0, 2)];

fn points_at_least(value: f64, bands: &[(f64, u32)]) -> u32 {
    bands
        .iter()
        .find(|(min, _)| value >= *min)
        .map_or(0, |(_, points)| *points)
}

fn points_at_most(value: f64, bands: &[(f64, u32)]) -> u32 {
    bands
        .iter()
        .find(|(max, _)| value <= *max)
        .map_or(0, |(_, points)| *points)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkiTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl SkiTier {
    pub fn label(&self) -> &'static str {
        match self {
            SkiTier::Excellent => "Excellent",
            SkiTier::Good => "Good",
            SkiTier::Fair => "Fair",
            SkiTier::Poor => "Poor",
        }
    }

    /// Estimated fraction of runs open under these conditions.
    pub fn open_fraction(&self) -> f64 {
        match self {
            SkiTier::Excellent => 0.93,
            SkiTier::Good => 0.72,
            SkiTier::Fair => 0.48,
            SkiTier::Poor => 0.20,
        }
    }
}

/// Rated conditions for one resort.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkiConditions {
    pub score: u32,
    pub tier: SkiTier,
    pub open_fraction: f64,
}

/// Rates conditions from snow depth (cm), fresh snow in the last 24h (cm),
/// daily max temperature (°C) and average wind (km/h).
pub fn score_conditions(
    snow_depth_cm: f64,
    fresh_snow_cm: f64,
    max_temp_c: f64,
    avg_wind_kph: f64,
) -> SkiConditions {
    let mut score = points_at_least(snow_depth_cm, &BASE_DEPTH_BANDS);

    score += if fresh_snow_cm >= 5.0 {
        points_at_least(fresh_snow_cm, &FRESH_SNOW_BANDS)
    } else if fresh_snow_cm > 0.0 {
        FRESH_SNOW_TRACE_POINTS
    } else {
        0
    };

    score += points_at_most(max_temp_c, &MAX_TEMP_BANDS);
    score += points_at_most(avg_wind_kph, &WIND_BANDS);

    let tier = if score >= EXCELLENT_CUTOFF {
        SkiTier::Excellent
    } else if score >= GOOD_CUTOFF {
        SkiTier::Good
    } else if score >= FAIR_CUTOFF {
        SkiTier::Fair
    } else {
        SkiTier::Poor
    };

    SkiConditions {
        score,
        tier,
        open_fraction: tier.open_fraction(),
    }
}

/// Normalized ski panel data for one resort fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkiReport {
    pub daily: Vec<DailySample>,
    pub precip_chart: Vec<PrecipChartPoint>,
    /// Base depth in cm, rounded.
    pub snow_depth_cm: i32,
    /// Fresh snow over the last 24 hours in cm, 1 decimal.
    pub fresh_snow_24h_cm: f64,
    pub current_temp: i32,
    pub avg_wind: i32,
    pub conditions: SkiConditions,
}

fn malformed(msg: &str) -> FetchError {
    FetchError::MalformedResponse(msg.to_string())
}

/// Transforms a raw ski payload (hourly with snow depth + daily, no current
/// block) into a [`SkiReport`]. Pure, like the dashboard normalizer.
pub fn normalize_ski(raw: &RawForecast) -> Result<SkiReport, FetchError> {
    let hourly = raw
        .hourly
        .as_ref()
        .ok_or_else(|| malformed("missing hourly block"))?;
    let daily = raw
        .daily
        .as_ref()
        .ok_or_else(|| malformed("missing daily block"))?;

    if hourly.time.is_empty() || daily.time.is_empty() {
        return Err(malformed("empty time axis"));
    }

    let days = SKI_DAILY_WINDOW.min(daily.time.len());
    check_daily(daily, days)?;
    let hours = SKI_CHART_WINDOW.min(hourly.time.len());

    let daily_rows = build_daily(daily, days)?;
    let precip_chart = build_precip_chart(hourly, hours)?;

    // Conditions inputs: snow depth comes back in metres.
    let snow_depth_cm = hourly.snow_depth.first().copied().flatten().unwrap_or(0.0) * 100.0;
    let fresh_snow_24h: f64 = hourly
        .snowfall
        .iter()
        .take(CONDITIONS_WINDOW)
        .map(|v| v.unwrap_or(0.0))
        .sum();
    let avg_wind = hourly
        .windspeed_10m
        .iter()
        .take(CONDITIONS_WINDOW)
        .map(|v| v.unwrap_or(0.0))
        .sum::<f64>()
        / CONDITIONS_WINDOW as f64;
    let max_temp = daily
        .temperature_2m_max
        .first()
        .copied()
        .flatten()
        .unwrap_or(0.0);

    let conditions = score_conditions(snow_depth_cm, fresh_snow_24h, max_temp, avg_wind);

    Ok(SkiReport {
        daily: daily_rows,
        precip_chart,
        snow_depth_cm: snow_depth_cm.round() as i32,
        fresh_snow_24h_cm: (fresh_snow_24h * 10.0).round() / 10.0,
        current_temp: hourly
            .temperature_2m
            .first()
            .copied()
            .flatten()
            .unwrap_or(0.0)
            .round() as i32,
        avg_wind: avg_wind.round() as i32,
        conditions,
    })
}
