//! Explicit view-state machine for the dashboard.
//!
//! The UI is always in exactly one of six states. Transitions happen only
//! through [`ViewStateMachine::apply`], which rejects (and logs) events that
//! are not valid for the current state instead of silently mutating an
//! ambient store.

use serde::{Deserialize, Serialize};

/// The finite set of view states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing selected yet; welcome screen.
    #[default]
    Idle,
    /// Waiting on device coordinates + reverse geocoding.
    Locating,
    /// Free-text city search in flight.
    Searching,
    /// Forecast fetch in flight for a selected location.
    Loading,
    /// A normalized forecast is on screen.
    Ready,
    /// A user-visible failure; the message lives in `last_error`.
    Error,
}

/// Events that drive the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The user asked to use the device location.
    LocateRequested,
    /// The search query changed (non-empty).
    QueryChanged,
    /// The search query was cleared or dismissed.
    QueryCleared,
    /// A location was selected (search result, resort, or geolocation).
    LocationSelected,
    /// The forecast fetch completed and the view model is ready.
    DataLoaded,
    /// A fetch failed with a user-visible message.
    FetchFailed(String),
    /// Return to the welcome screen.
    Reset,
}

/// Outcome of applying an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The event was valid; the machine moved (possibly to the same state).
    Moved(ViewState),
    /// The event is not valid in the current state; nothing changed.
    Rejected(ViewState),
}

/// Pure transition function: next state for `(state, event)`, or `None` when
/// the event is invalid in that state.
fn next_state(state: ViewState, event: &AppEvent) -> Option<ViewState> {
    use AppEvent::*;
    use ViewState::*;

    match (state, event) {
        // Selecting a location always starts a load, whatever was on screen.
        (_, LocationSelected) => Some(Loading),

        (Idle, LocateRequested) => Some(Locating),
        (Idle, QueryChanged) => Some(Searching),

        // Geolocation denial falls back to the welcome screen, a hard
        // failure surfaces as an error.
        (Locating, QueryCleared) | (Locating, Reset) => Some(Idle),
        (Locating, FetchFailed(_)) => Some(Error),

        (Searching, QueryChanged) => Some(Searching),
        (Searching, QueryCleared) => Some(Idle),
        (Searching, FetchFailed(_)) => Some(Error),

        (Loading, DataLoaded) => Some(Ready),
        (Loading, FetchFailed(_)) => Some(Error),

        (Ready, QueryChanged) => Some(Searching),
        (Ready, LocateRequested) => Some(Locating),
        // A background refetch for the same location can still fail.
        (Ready, FetchFailed(_)) => Some(Error),

        (Error, QueryChanged) => Some(Searching),
        (Error, LocateRequested) => Some(Locating),
        (Error, Reset) => Some(Idle),

        _ => None,
    }
}

/// State machine with the last user-visible error message.
#[derive(Debug, Clone, Default)]
pub struct ViewStateMachine {
    state: ViewState,
    last_error: Option<String>,
}

impl ViewStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    /// The message for the current `Error` state, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply an event. Invalid transitions are logged and leave the state
    /// untouched.
    pub fn apply(&mut self, event: AppEvent) -> Transition {
        match next_state(self.state, &event) {
            Some(next) => {
                tracing::debug!(from = ?self.state, to = ?next, ?event, "view state transition");
                match &event {
                    AppEvent::FetchFailed(message) => {
                        self.last_error = Some(message.clone());
                    }
                    // Leaving the error state clears the stale message.
                    _ if self.state == ViewState::Error => {
                        self.last_error = None;
                    }
                    _ => {}
                }
                self.state = next;
                Transition::Moved(next)
            }
            None => {
                tracing::warn!(state = ?self.state, ?event, "rejected invalid view state transition");
                Transition::Rejected(self.state)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let machine = ViewStateMachine::new();
        assert_eq!(machine.state(), ViewState::Idle);
    }

    #[test]
    fn test_happy_path_search_select_load() {
        let mut machine = ViewStateMachine::new();
        machine.apply(AppEvent::QueryChanged);
        assert_eq!(machine.state(), ViewState::Searching);
        machine.apply(AppEvent::LocationSelected);
        assert_eq!(machine.state(), ViewState::Loading);
        machine.apply(AppEvent::DataLoaded);
        assert_eq!(machine.state(), ViewState::Ready);
    }

    #[test]
    fn test_geolocation_path() {
        let mut machine = ViewStateMachine::new();
        machine.apply(AppEvent::LocateRequested);
        assert_eq!(machine.state(), ViewState::Locating);
        machine.apply(AppEvent::LocationSelected);
        assert_eq!(machine.state(), ViewState::Loading);
    }

    #[test]
    fn test_selection_supersedes_loading() {
        let mut machine = ViewStateMachine::new();
        machine.apply(AppEvent::LocationSelected);
        assert_eq!(machine.state(), ViewState::Loading);
        // Picking a new city while still loading restarts the load.
        let t = machine.apply(AppEvent::LocationSelected);
        assert_eq!(t, Transition::Moved(ViewState::Loading));
    }

    #[test]
    fn test_fetch_failure_carries_message() {
        let mut machine = ViewStateMachine::new();
        machine.apply(AppEvent::LocationSelected);
        machine.apply(AppEvent::FetchFailed("Weather API error: 502".into()));
        assert_eq!(machine.state(), ViewState::Error);
        assert_eq!(machine.last_error(), Some("Weather API error: 502"));
    }

    #[test]
    fn test_leaving_error_clears_message() {
        let mut machine = ViewStateMachine::new();
        machine.apply(AppEvent::LocationSelected);
        machine.apply(AppEvent::FetchFailed("boom".into()));
        machine.apply(AppEvent::QueryChanged);
        assert_eq!(machine.state(), ViewState::Searching);
        assert_eq!(machine.last_error(), None);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut machine = ViewStateMachine::new();
        // Cannot finish a load that never started.
        let t = machine.apply(AppEvent::DataLoaded);
        assert_eq!(t, Transition::Rejected(ViewState::Idle));
        assert_eq!(machine.state(), ViewState::Idle);
    }

    #[test]
    fn test_error_recovers_via_new_selection() {
        let mut machine = ViewStateMachine::new();
        machine.apply(AppEvent::LocationSelected);
        machine.apply(AppEvent::FetchFailed("boom".into()));
        machine.apply(AppEvent::LocationSelected);
        assert_eq!(machine.state(), ViewState::Loading);
    }
}
