use serde::{Deserialize, Serialize};

/// Alert severity, ranked for display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Extreme,
    Severe,
    Moderate,
    Minor,
}

impl Severity {
    /// Numeric rank for sorting, higher is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Extreme => 4,
            Severity::Severe => 3,
            Severity::Moderate => 2,
            Severity::Minor => 1,
        }
    }

    /// Maps an Environment Canada warning type ("warning", "watch",
    /// "statement", ...) to a severity. Unrecognized types are Minor.
    pub fn from_warning_type(warning_type: &str) -> Self {
        match warning_type.to_lowercase().as_str() {
            "warning" => Severity::Severe,
            "watch" => Severity::Moderate,
            _ => Severity::Minor,
        }
    }
}

/// One active alert for the selected location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    /// Stable within one fetch: event name plus expiry.
    pub id: String,
    pub event: String,
    pub severity: Severity,
    /// ISO expiry timestamp, as reported.
    pub expires: Option<String>,
    /// Environment Canada warning page for the full text.
    pub url: Option<String>,
}
