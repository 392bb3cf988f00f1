//! Core library for the `weather` app.
//!
//! This crate defines:
//! - Configuration handling
//! - A typed client for the weather proxy (`/search`, `/weather`, `/forecast`)
//! - Debounced city autocomplete
//! - The weather session that joins current conditions and forecast
//! - Reduction of the forecast series into day summaries
//!
//! It is used by `weather-cli`, but can also be reused by other frontends.

pub mod autocomplete;
pub mod config;
pub mod error;
pub mod forecast;
pub mod gateway;
pub mod model;
pub mod session;

#[cfg(test)]
mod testing;

pub use autocomplete::{AutocompleteController, Phase, SuggestionPanel};
pub use config::Config;
pub use error::QueryError;
pub use forecast::{group_by_day, group_by_day_in};
pub use gateway::{HttpGateway, WeatherGateway};
pub use model::{City, Condition, DaySummary, ForecastSample, Units, WeatherSnapshot};
pub use session::{SessionState, SubmitOutcome, WeatherSession};
