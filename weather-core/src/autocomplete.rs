//! Debounced city search feeding the suggestion panel.

use parking_lot::Mutex;
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{Config, gateway::WeatherGateway, model::City};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Debouncing,
    Suggesting,
}

/// The suggestion-related subset of the session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionPanel {
    pub cities: Vec<City>,
    pub visible: bool,
    pub phase: Phase,
}

#[derive(Debug)]
pub struct AutocompleteController<G: WeatherGateway + 'static> {
    gateway: Arc<G>,
    debounce: Duration,
    min_query_len: usize,
    panel: Arc<Mutex<SuggestionPanel>>,
    // At most one pending debounce task per controller.
    pending: Mutex<Option<JoinHandle<()>>>,
    keystrokes: Arc<AtomicU64>,
}

impl<G: WeatherGateway + 'static> AutocompleteController<G> {
    pub fn new(gateway: Arc<G>, config: &Config) -> Self {
        Self {
            gateway,
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            panel: Arc::new(Mutex::new(SuggestionPanel::default())),
            pending: Mutex::new(None),
            keystrokes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Feeds the full current text of the search box.
    ///
    /// Any pending search is cancelled before anything else happens, so only
    /// the last keystroke can ever populate the panel. Must be called from
    /// within a tokio runtime.
    pub fn on_input(&self, text: &str) {
        let ticket = self.keystrokes.fetch_add(1, Ordering::SeqCst) + 1;
        self.cancel_pending();

        if text.chars().count() < self.min_query_len {
            let mut panel = self.panel.lock();
            panel.cities.clear();
            panel.visible = false;
            panel.phase = Phase::Idle;
            return;
        }

        self.panel.lock().phase = Phase::Debouncing;

        let gateway = Arc::clone(&self.gateway);
        let panel = Arc::clone(&self.panel);
        let keystrokes = Arc::clone(&self.keystrokes);
        let debounce = self.debounce;
        let text = text.to_owned();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            debug!(prefix = %text, "searching cities");

            let result = gateway.search_cities(&text).await;

            let mut panel = panel.lock();
            if keystrokes.load(Ordering::SeqCst) != ticket {
                return;
            }
            match result {
                Ok(cities) => {
                    panel.cities = cities;
                    panel.visible = true;
                    panel.phase = Phase::Suggesting;
                }
                Err(err) => {
                    warn!(prefix = %text, error = %err, "failed to fetch city suggestions");
                    panel.phase = Phase::Idle;
                }
            }
        });

        *self.pending.lock() = Some(handle);
    }

    /// Hides the panel and returns the text for the search box.
    pub fn select(&self, city: &City) -> String {
        // A search already being polled cannot be aborted; retire its ticket.
        self.keystrokes.fetch_add(1, Ordering::SeqCst);
        self.cancel_pending();
        let mut panel = self.panel.lock();
        panel.visible = false;
        panel.phase = Phase::Idle;
        city.query_text()
    }

    /// Interaction outside the panel: hide it, keep its contents.
    pub fn dismiss(&self) {
        self.panel.lock().visible = false;
    }

    pub fn panel(&self) -> SuggestionPanel {
        self.panel.lock().clone()
    }

    pub fn phase(&self) -> Phase {
        self.panel.lock().phase
    }

    /// Waits for the pending debounce task, if any, to finish.
    pub async fn settle(&self) {
        let handle = self.pending.lock().take();
        if let Some(handle) = handle {
            // An aborted task is not an error here.
            let _ = handle.await;
        }
    }

    fn cancel_pending(&self) {
        if let Some(handle) = self.pending.lock().take() {
            handle.abort();
        }
    }
}

impl<G: WeatherGateway + 'static> Drop for AutocompleteController<G> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
