//! WMO weather interpretation codes (WW).
//!
//! Maps code -> label, emoji icon, category and particle hint. A night icon
//! exists only for the sky-condition codes (0-2) whose day icon is
//! sun-dependent; rain/snow/storm icons are the same day or night.

use crate::types::{Particle, WeatherCategory, WeatherInfo};

struct WmoEntry {
    code: i32,
    label: &'static str,
    icon: &'static str,
    night_icon: Option<&'static str>,
    category: WeatherCategory,
    particle: Particle,
}

const fn entry(
    code: i32,
    label: &'static str,
    icon: &'static str,
    night_icon: Option<&'static str>,
    category: WeatherCategory,
    particle: Particle,
) -> WmoEntry {
    WmoEntry {
        code,
        label,
        icon,
        night_icon,
        category,
        particle,
    }
}

#[rustfmt::skip]
const WMO_CODES: [WmoEntry; 28] = [
    entry(0,  "Clear Sky",                  "☀️",  Some("🌙"), WeatherCategory::Clear,  Particle::Sun),
    entry(1,  "Mainly Clear",               "🌤️", Some("🌙"), WeatherCategory::Clear,  Particle::Sun),
    entry(2,  "Partly Cloudy",              "⛅",  Some("🌙"), WeatherCategory::Cloudy, Particle::None),
    entry(3,  "Overcast",                   "☁️",  None,       WeatherCategory::Cloudy, Particle::None),
    entry(45, "Foggy",                      "🌫️", None,       WeatherCategory::Fog,    Particle::None),
    entry(48, "Icy Fog",                    "🌫️", None,       WeatherCategory::Fog,    Particle::None),
    entry(51, "Light Drizzle",              "🌦️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(53, "Moderate Drizzle",           "🌦️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(55, "Dense Drizzle",              "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(56, "Freezing Drizzle",           "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(57, "Heavy Freezing Drizzle",     "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(61, "Slight Rain",                "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(63, "Moderate Rain",              "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(65, "Heavy Rain",                 "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(66, "Freezing Rain",              "🌨️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(67, "Heavy Freezing Rain",        "🌨️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(71, "Slight Snowfall",            "🌨️", None,       WeatherCategory::Snow,   Particle::Snow),
    entry(73, "Moderate Snowfall",          "❄️",  None,       WeatherCategory::Snow,   Particle::Snow),
    entry(75, "Heavy Snowfall",             "❄️",  None,       WeatherCategory::Snow,   Particle::Snow),
    entry(77, "Snow Grains",                "🌨️", None,       WeatherCategory::Snow,   Particle::Snow),
    entry(80, "Slight Rain Showers",        "🌦️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(81, "Moderate Rain Showers",      "🌧️", None,       WeatherCategory::Rain,   Particle::Rain),
    entry(82, "Violent Rain Showers",       "⛈️",  None,       WeatherCategory::Storm,  Particle::Storm),
    entry(85, "Slight Snow Showers",        "🌨️", None,       WeatherCategory::Snow,   Particle::Snow),
    entry(86, "Heavy Snow Showers",         "❄️",  None,       WeatherCategory::Snow,   Particle::Snow),
    entry(95, "Thunderstorm",               "⛈️",  None,       WeatherCategory::Storm,  Particle::Storm),
    entry(96, "Thunderstorm w/ Hail",       "⛈️",  None,       WeatherCategory::Storm,  Particle::Storm),
    entry(99, "Thunderstorm w/ Heavy Hail", "⛈️",  None,       WeatherCategory::Storm,  Particle::Storm),
];

const FALLBACK_LABEL: &str = "Unknown";
const FALLBACK_ICON: &str = "🌡️";

/// Returns the descriptor for a WMO code, with a safe fallback for codes not
/// in the table. Classification never fails.
///
/// When `is_night` is true and the code has a night-specific icon (only the
/// sky-condition codes 0-2), the icon is substituted; all other fields are
/// unchanged.
pub fn classify(code: i32, is_night: bool) -> WeatherInfo {
    match WMO_CODES.iter().find(|e| e.code == code) {
        Some(entry) => {
            let icon = match entry.night_icon {
                Some(night) if is_night => night,
                _ => entry.icon,
            };
            WeatherInfo {
                label: entry.label.to_string(),
                icon: icon.to_string(),
                category: entry.category,
                particle: entry.particle,
            }
        }
        None => WeatherInfo {
            label: FALLBACK_LABEL.to_string(),
            icon: FALLBACK_ICON.to_string(),
            category: WeatherCategory::Clear,
            particle: Particle::None,
        },
    }
}
