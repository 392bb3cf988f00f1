//! The weather session: query text, units, and the current/forecast pair.
//!
//! A submit fans out the current-weather and forecast calls and joins on
//! both. Results land together or not at all, and only the most recent
//! submission may write them.

use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use tracing::{debug, info, warn};

use crate::{
    Config,
    autocomplete::{AutocompleteController, Phase},
    forecast::group_by_day,
    gateway::WeatherGateway,
    model::{City, DaySummary, ForecastSample, Units, WeatherSnapshot},
};

/// Query text the search box starts with.
pub const DEFAULT_CITY: &str = "London";

/// Point-in-time copy of everything the UI renders.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub query_text: String,
    pub units: Units,
    pub suggestions: Vec<City>,
    pub suggestions_visible: bool,
    pub snapshot: Option<WeatherSnapshot>,
    pub forecast: Option<Vec<ForecastSample>>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Both calls succeeded and their results are now displayed.
    Completed,
    /// At least one call failed; carries the message shown to the user.
    Failed(String),
    /// A newer submit started before this one settled; its results were dropped.
    Superseded,
}

#[derive(Debug)]
struct Core {
    query_text: String,
    units: Units,
    snapshot: Option<WeatherSnapshot>,
    forecast: Option<Vec<ForecastSample>>,
    loading: bool,
    error: Option<String>,
}

/// Ends `loading` for a submit whose future is dropped before it settles.
struct LoadingGuard<'a> {
    core: &'a Mutex<Core>,
    submissions: &'a AtomicU64,
    ticket: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut core = self.core.lock();
        if self.submissions.load(Ordering::SeqCst) == self.ticket {
            core.loading = false;
        }
    }
}

#[derive(Debug)]
pub struct WeatherSession<G: WeatherGateway + 'static> {
    gateway: Arc<G>,
    autocomplete: AutocompleteController<G>,
    core: Mutex<Core>,
    submissions: AtomicU64,
}

impl<G: WeatherGateway + 'static> WeatherSession<G> {
    pub fn new(gateway: Arc<G>, config: &Config) -> Self {
        Self {
            autocomplete: AutocompleteController::new(Arc::clone(&gateway), config),
            gateway,
            core: Mutex::new(Core {
                query_text: DEFAULT_CITY.to_string(),
                units: config.default_units,
                snapshot: None,
                forecast: None,
                loading: false,
                error: None,
            }),
            submissions: AtomicU64::new(0),
        }
    }

    /// Keystroke in the search box; drives autocomplete but never fetches weather.
    pub fn input(&self, text: &str) {
        self.core.lock().query_text = text.to_owned();
        self.autocomplete.on_input(text);
    }

    /// Replaces the query text without consulting autocomplete.
    pub fn set_query(&self, text: &str) {
        self.core.lock().query_text = text.to_owned();
    }

    pub fn select_suggestion(&self, city: &City) {
        let text = self.autocomplete.select(city);
        self.core.lock().query_text = text;
    }

    pub fn dismiss_suggestions(&self) {
        self.autocomplete.dismiss();
    }

    /// Waits until any pending suggestion search has finished.
    pub async fn settle_suggestions(&self) {
        self.autocomplete.settle().await;
    }

    pub fn suggestion_phase(&self) -> Phase {
        self.autocomplete.phase()
    }

    /// Flips metric/imperial. Displayed values are not refetched.
    pub fn toggle_units(&self) -> Units {
        let mut core = self.core.lock();
        core.units = core.units.toggled();
        core.units
    }

    pub fn set_units(&self, units: Units) {
        self.core.lock().units = units;
    }

    /// Fetches current weather and forecast for the current query text.
    pub async fn submit(&self) -> SubmitOutcome {
        let ticket = self.submissions.fetch_add(1, Ordering::SeqCst) + 1;
        // Declared before the state lock below so it drops after it.
        let _loading = LoadingGuard {
            core: &self.core,
            submissions: &self.submissions,
            ticket,
        };

        let (city, units) = {
            let mut core = self.core.lock();
            core.loading = true;
            core.error = None;
            core.snapshot = None;
            core.forecast = None;
            (core.query_text.clone(), core.units)
        };
        self.autocomplete.dismiss();

        debug!(%city, %units, ticket, "submitting weather query");

        let (current, forecast) = tokio::join!(
            self.gateway.current_weather(&city, units),
            self.gateway.forecast(&city, units),
        );

        let mut core = self.core.lock();
        if self.submissions.load(Ordering::SeqCst) != ticket {
            debug!(%city, ticket, "discarding superseded weather query");
            return SubmitOutcome::Superseded;
        }

        core.loading = false;
        match (current, forecast) {
            (Ok(snapshot), Ok(samples)) => {
                info!(%city, %units, samples = samples.len(), "weather query completed");
                core.snapshot = Some(snapshot);
                core.forecast = Some(samples);
                SubmitOutcome::Completed
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(%city, %units, error = %err, "weather query failed");
                let message = err.user_message();
                core.error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub fn state(&self) -> SessionState {
        let panel = self.autocomplete.panel();
        let core = self.core.lock();

        SessionState {
            query_text: core.query_text.clone(),
            units: core.units,
            suggestions: panel.cities,
            suggestions_visible: panel.visible,
            snapshot: core.snapshot.clone(),
            forecast: core.forecast.clone(),
            loading: core.loading,
            error: core.error.clone(),
        }
    }

    /// Day summaries for the forecast currently held, empty if there is none.
    pub fn day_summaries(&self) -> Vec<DaySummary> {
        self.core
            .lock()
            .forecast
            .as_deref()
            .map(group_by_day)
            .unwrap_or_default()
    }
}
