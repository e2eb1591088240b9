//! The dashboard session: one selected location, its data, and the
//! cancellation bookkeeping that keeps superseded fetches off screen.

use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tracing::{info, instrument, warn};

use chinook_alerts::{AlertClient, WeatherAlert};
use chinook_core::{
    AppEvent, Config, Debouncer, FetchError, RequestSlot, ViewState, ViewStateMachine,
};
use chinook_places::{DiningPlace, PlacesClient};
use chinook_weather::{
    normalize, normalize_ski, resort_by_id, ForecastClient, GeocodeClient, Location, RadarClient,
    RadarFrame, ReverseGeocoder, SkiReport,
};

/// Everything currently on screen for the selected location.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub location: Option<Location>,
    pub forecast: Option<chinook_weather::NormalizedForecast>,
    pub alerts: Vec<WeatherAlert>,
}

pub struct Session {
    config: Config,
    forecast_client: ForecastClient,
    geocode_client: GeocodeClient,
    reverse_geocoder: ReverseGeocoder,
    alert_client: AlertClient,
    places_client: Option<PlacesClient>,
    radar_client: RadarClient,

    /// One slot per concern; a new selection cancels the previous one.
    selection: RequestSlot,
    ski: RequestSlot,
    places: RequestSlot,
    radar: RequestSlot,
    search_debouncer: Debouncer,

    machine: Mutex<ViewStateMachine>,
    data: RwLock<SessionData>,
}

impl Session {
    /// Build a session with production endpoints.
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let forecast_client = ForecastClient::new()?;
        let geocode_client = GeocodeClient::new(
            &config.weather.country_code,
            &config.weather.language,
        )?;
        let reverse_geocoder = ReverseGeocoder::new()?;
        let alert_client = AlertClient::new(&config.weather.language)?
            .max_station_km(config.alerts.max_station_km);
        let places_client = if config.places.api_key.is_empty() {
            None
        } else {
            Some(
                PlacesClient::new(&config.places.api_key)?
                    .radius_m(config.places.radius_m)
                    .top_n(config.places.top_n),
            )
        };
        let radar_client = RadarClient::new()?;

        Ok(Self::with_clients(
            config,
            forecast_client,
            geocode_client,
            reverse_geocoder,
            alert_client,
            places_client,
            radar_client,
        ))
    }

    /// Build a session from pre-configured clients.
    pub fn with_clients(
        config: Config,
        forecast_client: ForecastClient,
        geocode_client: GeocodeClient,
        reverse_geocoder: ReverseGeocoder,
        alert_client: AlertClient,
        places_client: Option<PlacesClient>,
        radar_client: RadarClient,
    ) -> Self {
        let search_debouncer = Debouncer::new(Duration::from_millis(config.search.debounce_ms));
        Self {
            config,
            forecast_client,
            geocode_client,
            reverse_geocoder,
            alert_client,
            places_client,
            radar_client,
            selection: RequestSlot::new(),
            ski: RequestSlot::new(),
            places: RequestSlot::new(),
            radar: RequestSlot::new(),
            search_debouncer,
            machine: Mutex::new(ViewStateMachine::new()),
            data: RwLock::new(SessionData::default()),
        }
    }

    pub fn state(&self) -> ViewState {
        self.machine.lock().state()
    }

    pub fn last_error(&self) -> Option<String> {
        self.machine.lock().last_error().map(str::to_string)
    }

    /// Snapshot of the on-screen data.
    pub fn data(&self) -> SessionData {
        self.data.read().clone()
    }

    /// Select a location and load its forecast and alerts concurrently.
    ///
    /// Cancels any in-flight selection first. An alerts failure is not
    /// fatal; a forecast failure is. A cancelled fetch leaves the previous
    /// data and view state untouched so the superseding selection owns the
    /// screen.
    #[instrument(skip(self), fields(name = %location.name))]
    pub async fn select_location(&self, location: Location) -> Result<(), FetchError> {
        self.machine.lock().apply(AppEvent::LocationSelected);
        let token = self.selection.begin();

        let forecast_days = self.config.weather.forecast_days;
        let (forecast_res, alerts_res) = tokio::join!(
            async {
                let raw = self
                    .forecast_client
                    .fetch_forecast(&location, forecast_days, &token)
                    .await?;
                normalize(&raw)
            },
            self.alert_client
                .resolve_alerts(location.latitude, location.longitude, &token),
        );

        let forecast = match forecast_res {
            Ok(forecast) => forecast,
            Err(err) if err.is_cancelled() => return Err(err),
            Err(err) => {
                self.machine
                    .lock()
                    .apply(AppEvent::FetchFailed(err.user_message().to_string()));
                return Err(err);
            }
        };

        // The token can fire between the fetch resolving and this point.
        if token.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let alerts = match alerts_res {
            Ok(alerts) => alerts,
            Err(err) if err.is_cancelled() => return Err(err),
            Err(err) => {
                warn!(error = %err, "Alerts fetch failed, showing forecast without alerts");
                Vec::new()
            }
        };

        info!(alerts = alerts.len(), "Selection loaded");
        *self.data.write() = SessionData {
            location: Some(location),
            forecast: Some(forecast),
            alerts,
        };
        self.machine.lock().apply(AppEvent::DataLoaded);
        Ok(())
    }

    /// Debounced city search. Queries shorter than the configured minimum
    /// clear the search; a query superseded within the debounce window
    /// resolves to an empty list.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> Result<Vec<Location>, FetchError> {
        let trimmed = query.trim();
        if trimmed.len() < self.config.search.min_query_len {
            self.machine.lock().apply(AppEvent::QueryCleared);
            return Ok(Vec::new());
        }

        self.machine.lock().apply(AppEvent::QueryChanged);
        let Some(token) = self.search_debouncer.acquire().await else {
            return Ok(Vec::new());
        };
        self.geocode_client.search(trimmed, &token).await
    }

    /// Resolve device coordinates to a named location and select it.
    #[instrument(skip(self))]
    pub async fn locate(&self, latitude: f64, longitude: f64) -> Result<Location, FetchError> {
        self.machine.lock().apply(AppEvent::LocateRequested);
        let token = self.selection.begin();
        let location = self.reverse_geocoder.locate(latitude, longitude, &token).await?;
        self.select_location(location.clone()).await?;
        Ok(location)
    }

    /// Ski panel data for a built-in resort.
    #[instrument(skip(self))]
    pub async fn ski_report(&self, resort_id: &str) -> Result<SkiReport, FetchError> {
        let resort = resort_by_id(resort_id)
            .ok_or_else(|| FetchError::NotFound(format!("unknown resort '{}'", resort_id)))?;
        let token = self.ski.begin();
        let raw = self
            .forecast_client
            .fetch_ski(&Location::from(resort), &token)
            .await?;
        normalize_ski(&raw)
    }

    /// Top-rated dining near a resort. Empty when no Places API key is
    /// configured.
    #[instrument(skip(self))]
    pub async fn nearby_dining(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<DiningPlace>, FetchError> {
        let Some(client) = &self.places_client else {
            return Ok(Vec::new());
        };
        let token = self.places.begin();
        client.nearby_dining(latitude, longitude, &token).await
    }

    /// Playable radar frames (latest snapshot + nowcast).
    pub async fn radar_frames(&self) -> Result<Vec<RadarFrame>, FetchError> {
        let token = self.radar.begin();
        self.radar_client.frames(&token).await
    }

    /// Drop the selection and return to the welcome screen.
    pub fn reset(&self) {
        self.selection.cancel();
        self.ski.cancel();
        self.places.cancel();
        self.radar.cancel();
        *self.data.write() = SessionData::default();
        self.machine.lock().apply(AppEvent::Reset);
    }
}
