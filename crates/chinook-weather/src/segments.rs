//! Daypart bucketing and per-segment summary statistics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::forecast::RawHourly;
use crate::types::SegmentStats;

/// One of the four fixed local-time buckets used to summarize today's hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Daypart {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl Daypart {
    /// Segment for a local hour (0-23).
    /// morning: 6-11, afternoon: 12-17, evening: 18-21, night: 22-23 & 0-5.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            6..=11 => Daypart::Morning,
            12..=17 => Daypart::Afternoon,
            18..=21 => Daypart::Evening,
            _ => Daypart::Night,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Daypart::Morning => "morning",
            Daypart::Afternoon => "afternoon",
            Daypart::Evening => "evening",
            Daypart::Night => "night",
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Computes summary stats for a set of hourly indices within one segment.
///
/// Returns `None` for an empty index set. Averages are taken over non-null
/// values only; temperatures stay `None` when every value is null, precip
/// probability and wind default to 0. The dominant code is the most frequent
/// code among the hours, ties resolved in favour of the earlier-encountered
/// candidate during a left-to-right fold.
pub fn aggregate(hourly: &RawHourly, indices: &[usize]) -> Option<SegmentStats> {
    if indices.is_empty() {
        return None;
    }

    let pick = |values: &[Option<f64>]| -> Vec<f64> {
        indices
            .iter()
            .filter_map(|&i| values.get(i).copied().flatten())
            .collect()
    };

    let temps = pick(&hourly.temperature_2m);
    let precip_probs = pick(&hourly.precipitation_probability);
    let winds = pick(&hourly.windspeed_10m);
    let codes: Vec<i32> = indices
        .iter()
        .filter_map(|&i| hourly.weathercode.get(i).copied().flatten())
        .collect();

    let mut code_freq: HashMap<i32, usize> = HashMap::new();
    for &code in &codes {
        *code_freq.entry(code).or_insert(0) += 1;
    }
    let dominant_code = codes
        .iter()
        .copied()
        .fold(codes.first().copied().unwrap_or(0), |a, b| {
            if code_freq.get(&a) >= code_freq.get(&b) {
                a
            } else {
                b
            }
        });

    let total_precip_mm = round1(
        indices
            .iter()
            .map(|&i| hourly.precipitation.get(i).copied().flatten().unwrap_or(0.0))
            .sum(),
    );
    let total_snowfall_cm = round1(
        indices
            .iter()
            .map(|&i| hourly.snowfall.get(i).copied().flatten().unwrap_or(0.0))
            .sum(),
    );

    Some(SegmentStats {
        avg_temp: mean(&temps).map(|v| v.round() as i32),
        min_temp: temps
            .iter()
            .copied()
            .fold(None::<f64>, |m, v| Some(m.map_or(v, |m| m.min(v))))
            .map(|v| v.round() as i32),
        max_temp: temps
            .iter()
            .copied()
            .fold(None::<f64>, |m, v| Some(m.map_or(v, |m| m.max(v))))
            .map(|v| v.round() as i32),
        dominant_code,
        avg_precip_prob: mean(&precip_probs).map_or(0, |v| v.round() as i32),
        avg_windspeed: mean(&winds).map_or(0, |v| v.round() as i32),
        total_precip_mm,
        total_snowfall_cm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly(temps: &[f64], codes: &[i32]) -> RawHourly {
        RawHourly {
            time: temps
                .iter()
                .enumerate()
                .map(|(i, _)| format!("2024-01-15T{:02}:00", i))
                .collect(),
            temperature_2m: temps.iter().map(|&t| Some(t)).collect(),
            apparent_temperature: temps.iter().map(|&t| Some(t - 2.0)).collect(),
            precipitation_probability: temps.iter().map(|_| Some(40.0)).collect(),
            precipitation: temps.iter().map(|_| Some(0.2)).collect(),
            snowfall: temps.iter().map(|_| Some(0.5)).collect(),
            weathercode: codes.iter().map(|&c| Some(c)).collect(),
            windspeed_10m: temps.iter().map(|_| Some(12.0)).collect(),
            relativehumidity_2m: Vec::new(),
            cloudcover: Vec::new(),
            snow_depth: Vec::new(),
        }
    }

    #[test]
    fn test_empty_indices_yield_none() {
        let data = hourly(&[1.0], &[0]);
        assert!(aggregate(&data, &[]).is_none());
    }

    #[test]
    fn test_single_index_collapses_stats() {
        let data = hourly(&[-3.4, 5.0], &[71, 0]);
        let stats = aggregate(&data, &[0]).unwrap();
        assert_eq!(stats.avg_temp, Some(-3));
        assert_eq!(stats.min_temp, Some(-3));
        assert_eq!(stats.max_temp, Some(-3));
        assert_eq!(stats.dominant_code, 71);
    }

    #[test]
    fn test_dominant_code_tie_break_is_stable() {
        // Codes [3, 3, 1, 1]: both reach count 2, the fold keeps 3.
        let data = hourly(&[0.0, 0.0, 0.0, 0.0], &[3, 3, 1, 1]);
        let stats = aggregate(&data, &[0, 1, 2, 3]).unwrap();
        assert_eq!(stats.dominant_code, 3);
    }

    #[test]
    fn test_dominant_code_majority_wins() {
        let data = hourly(&[0.0; 5], &[61, 3, 61, 61, 3]);
        let stats = aggregate(&data, &[0, 1, 2, 3, 4]).unwrap();
        assert_eq!(stats.dominant_code, 61);
    }

    #[test]
    fn test_all_null_temps_stay_none() {
        let mut data = hourly(&[1.0, 2.0], &[0, 0]);
        data.temperature_2m = vec![None, None];
        let stats = aggregate(&data, &[0, 1]).unwrap();
        assert_eq!(stats.avg_temp, None);
        assert_eq!(stats.min_temp, None);
        assert_eq!(stats.max_temp, None);
        // Wind/precip still have values.
        assert_eq!(stats.avg_windspeed, 12);
    }

    #[test]
    fn test_totals_are_rounded_to_one_decimal() {
        let data = hourly(&[0.0, 0.0, 0.0], &[71, 71, 71]);
        let stats = aggregate(&data, &[0, 1, 2]).unwrap();
        assert_eq!(stats.total_precip_mm, 0.6);
        assert_eq!(stats.total_snowfall_cm, 1.5);
    }

    #[test]
    fn test_daypart_boundaries() {
        assert_eq!(Daypart::from_hour(6), Daypart::Morning);
        assert_eq!(Daypart::from_hour(11), Daypart::Morning);
        assert_eq!(Daypart::from_hour(12), Daypart::Afternoon);
        assert_eq!(Daypart::from_hour(17), Daypart::Afternoon);
        assert_eq!(Daypart::from_hour(18), Daypart::Evening);
        assert_eq!(Daypart::from_hour(21), Daypart::Evening);
        assert_eq!(Daypart::from_hour(22), Daypart::Night);
        assert_eq!(Daypart::from_hour(0), Daypart::Night);
        assert_eq!(Daypart::from_hour(5), Daypart::Night);
    }
}
