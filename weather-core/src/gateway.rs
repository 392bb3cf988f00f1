//! Typed client for the weather proxy.
//!
//! The proxy exposes three read-only routes (`/search`, `/weather`,
//! `/forecast`) that relay the provider's JSON. This is the only place
//! where HTTP status codes are interpreted.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    Config,
    error::QueryError,
    model::{City, ForecastSample, Units, WeatherSnapshot, WireCurrent, WireForecast},
};

pub const CITIES: &str = "cities";
pub const WEATHER_DATA: &str = "weather data";
pub const FORECAST_DATA: &str = "forecast data";

#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// City lookup by name prefix. The prefix is sent verbatim.
    async fn search_cities(&self, prefix: &str) -> Result<Vec<City>, QueryError>;

    async fn current_weather(&self, city: &str, units: Units)
    -> Result<WeatherSnapshot, QueryError>;

    async fn forecast(&self, city: &str, units: Units) -> Result<Vec<ForecastSample>, QueryError>;
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    http: Client,
}

impl HttpGateway {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("weather-core/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, &str)],
        resource: &'static str,
    ) -> Result<T, QueryError> {
        let url = format!("{}/{route}", self.base_url);
        debug!(%url, ?query, "requesting {resource}");

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| QueryError::Transport { resource, source })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| QueryError::Transport { resource, source })?;

        if !status.is_success() {
            let err = QueryError::upstream(status.as_u16(), &body, resource);
            warn!(status = status.as_u16(), body = %truncate_body(&body), "{resource} request failed");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|source| QueryError::Decode { resource, source })
    }
}

#[async_trait]
impl WeatherGateway for HttpGateway {
    async fn search_cities(&self, prefix: &str) -> Result<Vec<City>, QueryError> {
        self.get_json("search", &[("q", prefix)], CITIES).await
    }

    async fn current_weather(
        &self,
        city: &str,
        units: Units,
    ) -> Result<WeatherSnapshot, QueryError> {
        let wire: WireCurrent = self
            .get_json("weather", &[("city", city), ("units", units.as_str())], WEATHER_DATA)
            .await?;

        Ok(wire.into())
    }

    async fn forecast(&self, city: &str, units: Units) -> Result<Vec<ForecastSample>, QueryError> {
        let wire: WireForecast = self
            .get_json("forecast", &[("city", city), ("units", units.as_str())], FORECAST_DATA)
            .await?;

        Ok(wire.into())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
