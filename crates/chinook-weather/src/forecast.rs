//! Open-Meteo forecast client and payload normalization.
//!
//! The API returns parallel arrays (one array per variable, aligned by
//! index across time steps). [`normalize`] turns that into the row-oriented
//! [`NormalizedForecast`] the UI consumes, failing fast with
//! `MalformedResponse` when a required block is missing or the arrays don't
//! cover the window.

use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use chinook_core::{cancellable, FetchError, NetworkError, ReqwestErrorExt};

use crate::segments::{aggregate, Daypart};
use crate::types::{
    CurrentConditions, DailySample, DaySegments, HourlySample, Location, NormalizedForecast,
    PrecipChartPoint,
};
use crate::wmo::classify;

const OPEN_METEO_URL: &str = "https://api.open-meteo.com";
const FORECAST_PATH: &str = "/v1/forecast";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Hours of hourly forecast kept after normalization (3 days).
pub const HOURLY_WINDOW: usize = 72;
/// Days of daily forecast kept after normalization.
pub const DAILY_WINDOW: usize = 7;
/// Hours bucketed into today's daypart breakdown.
pub const SEGMENT_WINDOW: usize = 24;
/// Days requested for the ski panel.
pub const SKI_FORECAST_DAYS: u32 = 3;

const CURRENT_VARS: &str = "temperature_2m,apparent_temperature,weathercode,\
windspeed_10m,winddirection_10m,relativehumidity_2m,precipitation,cloudcover";

const HOURLY_VARS: &str = "temperature_2m,apparent_temperature,precipitation_probability,\
precipitation,snowfall,weathercode,windspeed_10m,relativehumidity_2m,cloudcover";

const DAILY_VARS: &str = "weathercode,temperature_2m_max,temperature_2m_min,\
precipitation_sum,snowfall_sum,precipitation_probability_max,sunrise,sunset";

const SKI_HOURLY_VARS: &str = "temperature_2m,precipitation_probability,precipitation,\
snowfall,snow_depth,windspeed_10m,weathercode";

const SKI_DAILY_VARS: &str = "weathercode,temperature_2m_max,temperature_2m_min,\
snowfall_sum,precipitation_probability_max,precipitation_sum";

// ── Raw payload shapes ────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawForecast {
    pub current: Option<RawCurrent>,
    pub hourly: Option<RawHourly>,
    pub daily: Option<RawDaily>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCurrent {
    pub temperature_2m: f64,
    pub apparent_temperature: Option<f64>,
    pub weathercode: i32,
    pub windspeed_10m: f64,
    pub winddirection_10m: Option<f64>,
    pub relativehumidity_2m: Option<f64>,
    pub precipitation: Option<f64>,
    pub cloudcover: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawHourly {
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub apparent_temperature: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub snowfall: Vec<Option<f64>>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
    #[serde(default)]
    pub windspeed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub relativehumidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub cloudcover: Vec<Option<f64>>,
    /// Only present on ski requests; metres.
    #[serde(default)]
    pub snow_depth: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawDaily {
    pub time: Vec<String>,
    #[serde(default)]
    pub weathercode: Vec<Option<i32>>,
    #[serde(default)]
    pub temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    pub temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub snowfall_sum: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    pub sunrise: Vec<Option<String>>,
    #[serde(default)]
    pub sunset: Vec<Option<String>>,
}

// ── Client ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl ForecastClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(OPEN_METEO_URL)
    }

    /// Point the client at a different host (tests, mirrors).
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the full dashboard forecast (current + hourly + daily) for a
    /// location. Honours the cancellation token.
    #[instrument(skip(self, token), fields(lat = location.latitude, lon = location.longitude))]
    pub async fn fetch_forecast(
        &self,
        location: &Location,
        forecast_days: u32,
        token: &CancellationToken,
    ) -> Result<RawForecast, FetchError> {
        let timezone = location.timezone.as_deref().unwrap_or("auto");
        let params = [
            ("latitude", location.latitude.to_string()),
            ("longitude", location.longitude.to_string()),
            ("current", CURRENT_VARS.to_string()),
            ("hourly", HOURLY_VARS.to_string()),
            ("daily", DAILY_VARS.to_string()),
            ("timezone", timezone.to_string()),
            ("forecast_days", forecast_days.to_string()),
        ];
        cancellable(token, self.get_raw(&params)).await
    }

    /// Fetch the ski variable set (3 days, with snow depth) for a resort.
    #[instrument(skip(self, token), fields(lat = resort.latitude, lon = resort.longitude))]
    pub async fn fetch_ski(
        &self,
        resort: &Location,
        token: &CancellationToken,
    ) -> Result<RawForecast, FetchError> {
        let params = [
            ("latitude", resort.latitude.to_string()),
            ("longitude", resort.longitude.to_string()),
            ("hourly", SKI_HOURLY_VARS.to_string()),
            ("daily", SKI_DAILY_VARS.to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", SKI_FORECAST_DAYS.to_string()),
        ];
        cancellable(token, self.get_raw(&params)).await
    }

    async fn get_raw(&self, params: &[(&str, String)]) -> Result<RawForecast, FetchError> {
        let url = format!("{}{}", self.base_url, FORECAST_PATH);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("forecast JSON: {}", e)))
    }
}

// ── Normalization ─────────────────────────────────────────────────────────

fn malformed(msg: impl Into<String>) -> FetchError {
    FetchError::MalformedResponse(msg.into())
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn parse_hour(s: &str) -> Result<NaiveDateTime, FetchError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M")
        .map_err(|e| malformed(format!("bad hourly timestamp '{}': {}", s, e)))
}

fn parse_date(s: &str) -> Result<NaiveDate, FetchError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| malformed(format!("bad date '{}': {}", s, e)))
}

/// Parallel arrays must cover the window; a short array means the payload is
/// inconsistent and normalization must not silently truncate around it.
fn ensure_len<T>(name: &str, values: &[T], needed: usize) -> Result<(), FetchError> {
    if values.len() < needed {
        Err(malformed(format!(
            "{} has {} entries, expected at least {}",
            name,
            values.len(),
            needed
        )))
    } else {
        Ok(())
    }
}

fn check_hourly(hourly: &RawHourly, hours: usize) -> Result<(), FetchError> {
    ensure_len("hourly.temperature_2m", &hourly.temperature_2m, hours)?;
    ensure_len(
        "hourly.precipitation_probability",
        &hourly.precipitation_probability,
        hours,
    )?;
    ensure_len("hourly.precipitation", &hourly.precipitation, hours)?;
    ensure_len("hourly.snowfall", &hourly.snowfall, hours)?;
    ensure_len("hourly.weathercode", &hourly.weathercode, hours)?;
    ensure_len("hourly.windspeed_10m", &hourly.windspeed_10m, hours)?;
    Ok(())
}

pub(crate) fn check_daily(daily: &RawDaily, days: usize) -> Result<(), FetchError> {
    ensure_len("daily.weathercode", &daily.weathercode, days)?;
    ensure_len("daily.temperature_2m_max", &daily.temperature_2m_max, days)?;
    ensure_len("daily.temperature_2m_min", &daily.temperature_2m_min, days)?;
    Ok(())
}

/// Build the per-hour chart points for the first `hours` entries.
pub(crate) fn build_precip_chart(
    hourly: &RawHourly,
    hours: usize,
) -> Result<Vec<PrecipChartPoint>, FetchError> {
    ensure_len(
        "hourly.precipitation_probability",
        &hourly.precipitation_probability,
        hours,
    )?;
    ensure_len("hourly.precipitation", &hourly.precipitation, hours)?;
    ensure_len("hourly.snowfall", &hourly.snowfall, hours)?;
    ensure_len("hourly.weathercode", &hourly.weathercode, hours)?;

    let mut chart = Vec::with_capacity(hours);
    for i in 0..hours {
        let time = parse_hour(&hourly.time[i])?;
        chart.push(PrecipChartPoint {
            index: i,
            hour: time.hour(),
            date: time.date(),
            probability: hourly.precipitation_probability[i].unwrap_or(0.0),
            amount_mm: round1(hourly.precipitation[i].unwrap_or(0.0)),
            snowfall_cm: round1(hourly.snowfall[i].unwrap_or(0.0)),
            weather_code: hourly.weathercode[i].unwrap_or(0),
        });
    }
    Ok(chart)
}

/// Build the daily rows for the first `days` entries.
pub(crate) fn build_daily(daily: &RawDaily, days: usize) -> Result<Vec<DailySample>, FetchError> {
    let mut rows = Vec::with_capacity(days);
    for i in 0..days {
        let code = daily.weathercode[i].unwrap_or(0);
        rows.push(DailySample {
            date: parse_date(&daily.time[i])?,
            weather_code: code,
            temp_max: daily.temperature_2m_max[i].unwrap_or(0.0).round() as i32,
            temp_min: daily.temperature_2m_min[i].unwrap_or(0.0).round() as i32,
            precip_sum_mm: round1(daily.precipitation_sum.get(i).copied().flatten().unwrap_or(0.0)),
            snowfall_sum_cm: round1(daily.snowfall_sum.get(i).copied().flatten().unwrap_or(0.0)),
            precip_prob_max: daily
                .precipitation_probability_max
                .get(i)
                .copied()
                .flatten()
                .unwrap_or(0.0),
            sunrise: parse_opt_hour(daily.sunrise.get(i)),
            sunset: parse_opt_hour(daily.sunset.get(i)),
            info: classify(code, false),
        });
    }
    Ok(rows)
}

fn parse_opt_hour(value: Option<&Option<String>>) -> Option<NaiveDateTime> {
    value
        .and_then(|v| v.as_deref())
        .and_then(|s| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").ok())
}

/// Transforms a raw forecast payload into the normalized view model.
///
/// Pure: the same payload always yields a structurally equal result.
pub fn normalize(raw: &RawForecast) -> Result<NormalizedForecast, FetchError> {
    let current = raw
        .current
        .as_ref()
        .ok_or_else(|| malformed("missing current block"))?;
    let hourly = raw
        .hourly
        .as_ref()
        .ok_or_else(|| malformed("missing hourly block"))?;
    let daily = raw
        .daily
        .as_ref()
        .ok_or_else(|| malformed("missing daily block"))?;

    if hourly.time.is_empty() {
        return Err(malformed("hourly time axis is empty"));
    }
    if daily.time.is_empty() {
        return Err(malformed("daily time axis is empty"));
    }

    let hours = HOURLY_WINDOW.min(hourly.time.len());
    let days = DAILY_WINDOW.min(daily.time.len());
    check_hourly(hourly, hours)?;
    check_daily(daily, days)?;

    // Current conditions: ints for display, wind direction and humidity
    // pass through unrounded.
    let current_info = classify(current.weathercode, false);
    let current_conditions = CurrentConditions {
        temp: current.temperature_2m.round() as i32,
        feels_like: current
            .apparent_temperature
            .unwrap_or(current.temperature_2m)
            .round() as i32,
        weather_code: current.weathercode,
        wind_speed: current.windspeed_10m.round() as i32,
        wind_direction: current.winddirection_10m,
        humidity: current.relativehumidity_2m,
        precipitation: current.precipitation,
        cloud_cover: current.cloudcover,
        info: current_info.clone(),
    };

    // Hourly rows for the 72-hour window.
    let mut hourly_rows = Vec::with_capacity(hours);
    for i in 0..hours {
        let code = hourly.weathercode[i].unwrap_or(0);
        hourly_rows.push(HourlySample {
            time: parse_hour(&hourly.time[i])?,
            temp: hourly.temperature_2m[i].unwrap_or(0.0).round() as i32,
            feels_like: hourly
                .apparent_temperature
                .get(i)
                .copied()
                .flatten()
                .map(|v| v.round() as i32),
            precip_prob: hourly.precipitation_probability[i].unwrap_or(0.0),
            precipitation_mm: round1(hourly.precipitation[i].unwrap_or(0.0)),
            snowfall_cm: round1(hourly.snowfall[i].unwrap_or(0.0)),
            weather_code: code,
            wind_speed: hourly.windspeed_10m[i].unwrap_or(0.0).round() as i32,
            humidity: hourly.relativehumidity_2m.get(i).copied().flatten(),
            cloud_cover: hourly.cloudcover.get(i).copied().flatten(),
            info: classify(code, false),
        });
    }

    // Today's daypart breakdown over the first 24 hours.
    let mut buckets: [(Daypart, Vec<usize>); 4] = [
        (Daypart::Morning, Vec::new()),
        (Daypart::Afternoon, Vec::new()),
        (Daypart::Evening, Vec::new()),
        (Daypart::Night, Vec::new()),
    ];
    for (i, row) in hourly_rows.iter().take(SEGMENT_WINDOW).enumerate() {
        let part = Daypart::from_hour(row.time.hour());
        if let Some(bucket) = buckets.iter_mut().find(|(p, _)| *p == part) {
            bucket.1.push(i);
        }
    }
    let mut segments = DaySegments::default();
    for (part, indices) in &buckets {
        let stats = aggregate(hourly, indices);
        match part {
            Daypart::Morning => segments.morning = stats,
            Daypart::Afternoon => segments.afternoon = stats,
            Daypart::Evening => segments.evening = stats,
            Daypart::Night => segments.night = stats,
        }
    }

    let daily_rows = build_daily(daily, days)?;
    let precip_chart = build_precip_chart(hourly, hours)?;

    Ok(NormalizedForecast {
        sunrise: daily_rows.first().and_then(|d| d.sunrise),
        sunset: daily_rows.first().and_then(|d| d.sunset),
        weather_category: current_info.category,
        weather_particle: current_info.particle,
        current: current_conditions,
        hourly: hourly_rows,
        daily: daily_rows,
        segments,
        precip_chart,
    })
}
