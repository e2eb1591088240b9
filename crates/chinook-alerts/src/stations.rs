//! Environment Canada citypage station directory.
//!
//! The citypage API is keyed by EC's own city identifiers, not by
//! coordinates, so alert resolution snaps the selected location to the
//! nearest station in this table. Identifiers were confirmed against the
//! citypageweather-realtime collection.

/// One EC citypage station.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Station {
    pub id: &'static str,
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn station(id: &'static str, name: &'static str, latitude: f64, longitude: f64) -> Station {
    Station {
        id,
        name,
        latitude,
        longitude,
    }
}

#[rustfmt::skip]
pub const STATIONS: [Station; 23] = [
    // Ontario
    station("on-118", "Ottawa",         45.42,  -75.70),
    station("on-143", "Toronto",        43.65,  -79.38),
    station("on-69",  "Kingston",       44.23,  -76.48),
    station("on-139", "North Bay",      46.31,  -79.46),
    station("on-121", "Peterborough",   44.30,  -78.32),
    station("on-44",  "Kawartha Lakes", 44.55,  -78.73),
    // Quebec
    station("qc-147", "Montréal",       45.51,  -73.67),
    station("qc-133", "Québec City",    46.81,  -71.21),
    station("qc-126", "Gatineau",       45.48,  -75.70),
    station("qc-59",  "Chelsea",        45.53,  -75.78),
    // British Columbia
    station("bc-74",  "Vancouver",      49.28, -123.12),
    station("bc-85",  "Victoria",       48.43, -123.37),
    station("bc-48",  "Kelowna",        49.88, -119.50),
    // Alberta
    station("ab-52",  "Calgary",        51.05, -114.07),
    station("ab-3",   "Canmore",        51.09, -115.34),
    station("ab-30",  "Lethbridge",     49.70, -112.83),
    // Manitoba
    station("mb-38",  "Winnipeg",       49.90,  -97.14),
    // Saskatchewan
    station("sk-32",  "Regina",         50.45, -104.62),
    station("sk-40",  "Saskatoon",      52.13, -106.67),
    // Nova Scotia
    station("ns-19",  "Halifax",        44.65,  -63.57),
    // New Brunswick
    station("nb-29",  "Fredericton",    45.97,  -66.65),
    // Newfoundland & Labrador
    station("nl-24",  "St. John's",     47.56,  -52.71),
    // Prince Edward Island
    station("pe-5",   "Charlottetown",  46.24,  -63.13),
];

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinate pairs, in km.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// The closest station within `max_km`, or `None` when the location is out
/// of coverage (remote coordinates produce no alerts rather than alerts for
/// some far-away city).
pub fn nearest_station(latitude: f64, longitude: f64, max_km: f64) -> Option<&'static Station> {
    let mut best: Option<(&'static Station, f64)> = None;
    for candidate in &STATIONS {
        let d = haversine_km(latitude, longitude, candidate.latitude, candidate.longitude);
        if d <= max_km && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((candidate, d));
        }
    }
    best.map(|(s, _)| s)
}
