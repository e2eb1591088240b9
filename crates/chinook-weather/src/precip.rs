//! Precipitation type classification for the 72-hour chart.
//!
//! Open-Meteo's `precipitation` field is total LIQUID equivalent (includes
//! snow melt), so the weather code is the primary signal; raw amounts are a
//! fallback for codes that are ambiguous (e.g. sky-condition codes, fog, or
//! thunderstorms that may produce hail).

use serde::{Deserialize, Serialize};

/// Freezing rain / sleet / ice pellets.
pub const MIXED_CODES: [i32; 4] = [56, 57, 66, 67];
pub const SNOW_CODES: [i32; 6] = [71, 73, 75, 77, 85, 86];
pub const RAIN_CODES: [i32; 12] = [51, 53, 55, 61, 63, 65, 80, 81, 82, 95, 96, 99];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipKind {
    Snow,
    Rain,
    Mixed,
    None,
}

/// Classifies an hourly sample as snow, rain, mixed or none.
///
/// Code sets take priority over the numeric fallback so pure-snow hours
/// don't get mislabelled as rain by their liquid-equivalent amount.
pub fn resolve_type(weather_code: i32, snowfall_cm: f64, amount_mm: f64) -> PrecipKind {
    if MIXED_CODES.contains(&weather_code) {
        return PrecipKind::Mixed;
    }
    if SNOW_CODES.contains(&weather_code) {
        return PrecipKind::Snow;
    }
    if RAIN_CODES.contains(&weather_code) {
        return PrecipKind::Rain;
    }
    // Fallback for codes not in the sets above.
    if snowfall_cm > 0.0 && amount_mm > 0.0 {
        PrecipKind::Mixed
    } else if snowfall_cm > 0.0 {
        PrecipKind::Snow
    } else if amount_mm > 0.0 {
        PrecipKind::Rain
    } else {
        PrecipKind::None
    }
}
