use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather condition categories mapped from WMO codes; drives the ambient
/// theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    #[default]
    Clear,
    Cloudy,
    Fog,
    Rain,
    Snow,
    Storm,
}

/// Particle effect hint for the animated background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Particle {
    #[default]
    None,
    Sun,
    Rain,
    Snow,
    Storm,
}

/// Semantic descriptor for a WMO weather code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub label: String,
    pub icon: String,
    pub category: WeatherCategory,
    pub particle: Particle,
}

/// Geographic location selected by the user: a search result, a ski resort,
/// or a reverse-geocoded device position. Immutable once selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub admin1: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            admin1: None,
            latitude,
            longitude,
            timezone: None,
        }
    }
}

/// Current conditions, rounded for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: i32,
    pub feels_like: i32,
    pub weather_code: i32,
    pub wind_speed: i32,
    pub wind_direction: Option<f64>,
    pub humidity: Option<f64>,
    pub precipitation: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub info: WeatherInfo,
}

/// One hour of the 72-hour forecast window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    /// Local time in the forecast timezone.
    pub time: NaiveDateTime,
    pub temp: i32,
    pub feels_like: Option<i32>,
    /// Probability of precipitation, 0-100.
    pub precip_prob: f64,
    /// Liquid-equivalent precipitation in mm, 1 decimal.
    pub precipitation_mm: f64,
    /// Snowfall in cm, 1 decimal.
    pub snowfall_cm: f64,
    pub weather_code: i32,
    pub wind_speed: i32,
    pub humidity: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub info: WeatherInfo,
}

/// One day of the daily forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySample {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub temp_max: i32,
    pub temp_min: i32,
    pub precip_sum_mm: f64,
    pub snowfall_sum_cm: f64,
    pub precip_prob_max: f64,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub info: WeatherInfo,
}

/// Summary statistics for one daypart of today's hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    pub avg_temp: Option<i32>,
    pub min_temp: Option<i32>,
    pub max_temp: Option<i32>,
    /// Most frequent WMO code among the segment's hours.
    pub dominant_code: i32,
    pub avg_precip_prob: i32,
    pub avg_windspeed: i32,
    pub total_precip_mm: f64,
    pub total_snowfall_cm: f64,
}

/// Today's four-daypart breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DaySegments {
    pub morning: Option<SegmentStats>,
    pub afternoon: Option<SegmentStats>,
    pub evening: Option<SegmentStats>,
    pub night: Option<SegmentStats>,
}

/// One bar of the 72-hour precipitation chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipChartPoint {
    /// 0-based hour offset for chart alignment.
    pub index: usize,
    /// Local hour of day, 0-23.
    pub hour: u32,
    pub date: NaiveDate,
    /// Probability of precipitation, 0-100.
    pub probability: f64,
    /// Liquid-equivalent amount in mm, 1 decimal.
    pub amount_mm: f64,
    /// Snowfall in cm, 1 decimal.
    pub snowfall_cm: f64,
    pub weather_code: i32,
}

/// The complete normalized view model for one forecast fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedForecast {
    pub current: CurrentConditions,
    pub hourly: Vec<HourlySample>,
    pub daily: Vec<DailySample>,
    pub segments: DaySegments,
    pub precip_chart: Vec<PrecipChartPoint>,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    /// Ambient theme inputs, derived from the *current* conditions.
    pub weather_category: WeatherCategory,
    pub weather_particle: Particle,
}
