pub mod config;
pub mod error;
pub mod request;
pub mod state;

pub use config::{AlertsConfig, Config, PlacesConfig, SearchConfig, WeatherConfig};
pub use error::{AppError, ConfigError, FetchError, NetworkError, ReqwestErrorExt};
pub use request::{cancellable, Debouncer, RequestSlot};
pub use state::{AppEvent, Transition, ViewState, ViewStateMachine};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Chinook core initialized");
    Ok(())
}
