use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Forecast settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// City search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Weather alert settings
    #[serde(default)]
    pub alerts: AlertsConfig,

    /// Nearby dining lookup settings
    #[serde(default)]
    pub places: PlacesConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Days of daily forecast to request
    pub forecast_days: u32,

    /// Language for localized feeds ("en" or "fr")
    pub language: String,

    /// Country filter for the city search
    pub country_code: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            forecast_days: 7,
            language: "en".to_string(),
            country_code: "CA".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Debounce delay for free-text search, in milliseconds
    pub debounce_ms: u64,

    /// Minimum query length before a search fires
    pub min_query_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_query_len: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    /// Maximum distance to the nearest known alerting station, in km
    pub max_station_km: f64,

    /// CORS proxy prefix used when the alerts feed rejects direct requests
    pub proxy_url: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            max_station_km: 250.0,
            proxy_url: "https://corsproxy.io/?url=".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacesConfig {
    /// Google Places API key (empty disables the dining panel)
    pub api_key: String,

    /// Straight-line search radius in metres
    pub radius_m: u32,

    /// Number of top-rated places to keep and enrich
    pub top_n: usize,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            radius_m: 5000,
            top_n: 5,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chinook");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            search: SearchConfig::default(),
            alerts: AlertsConfig::default(),
            places: PlacesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        if !validation.warnings.is_empty() {
            for warning in &validation.warnings {
                tracing::warn!("Config warning: {}", warning);
            }
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.weather.forecast_days == 0 {
            result.add_error("weather.forecast_days", "Must request at least one day");
        } else if self.weather.forecast_days > 16 {
            result.add_error(
                "weather.forecast_days",
                "The forecast source serves at most 16 days",
            );
        }

        if self.weather.language != "en" && self.weather.language != "fr" {
            result.add_warning(
                "weather.language",
                format!(
                    "Unsupported language '{}'; alert feeds carry only en/fr",
                    self.weather.language
                ),
            );
        }

        if self.search.debounce_ms == 0 {
            result.add_warning(
                "search.debounce_ms",
                "Debounce disabled - a request will fire on every keystroke",
            );
        }

        if self.search.min_query_len == 0 {
            result.add_warning("search.min_query_len", "Empty queries will hit the API");
        }

        if self.alerts.max_station_km <= 0.0 {
            result.add_error(
                "alerts.max_station_km",
                "Station search radius must be positive",
            );
        }

        self.validate_url(&self.alerts.proxy_url, "alerts.proxy_url", &mut result);

        if self.places.api_key.is_empty() {
            result.add_warning(
                "places.api_key",
                "Places API key not configured - the dining panel will be unavailable",
            );
        }

        if self.places.top_n == 0 {
            result.add_warning("places.top_n", "Dining ranking disabled (top_n = 0)");
        }

        result
    }

    /// Validate a URL field. Proxy prefixes end mid-query, so only the part
    /// before the first `?` has to parse.
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        let base = url_str.split('?').next().unwrap_or(url_str);
        match Url::parse(base) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }
                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        // Ensure config directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("chinook");

        Ok(config_dir.join("config.toml"))
    }
}
