//! In-memory gateway used by the controller tests.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::{
    error::QueryError,
    gateway::{CITIES, FORECAST_DATA, WEATHER_DATA, WeatherGateway},
    model::{City, Condition, ForecastSample, Units, WeatherSnapshot},
};

pub(crate) fn city(name: &str, country: &str) -> City {
    City {
        name: name.to_string(),
        country: country.to_string(),
        state: None,
        lat: 0.0,
        lon: 0.0,
    }
}

fn temperature(units: Units) -> f64 {
    match units {
        Units::Metric => 20.0,
        Units::Imperial => 68.0,
    }
}

#[derive(Debug, Default)]
pub(crate) struct FakeGateway {
    cities: Mutex<Vec<City>>,
    search_calls: Mutex<Vec<String>>,
    search_delay: Mutex<Duration>,
    search_fails: AtomicBool,
    search_block: Mutex<Duration>,
    fetch_calls: Mutex<Vec<(&'static str, String, Units)>>,
    delays: Mutex<HashMap<(&'static str, String), Duration>>,
    failures: Mutex<HashMap<(&'static str, String), (u16, String)>>,
}

impl FakeGateway {
    pub fn set_cities(&self, cities: Vec<City>) {
        *self.cities.lock() = cities;
    }

    pub fn set_search_delay(&self, delay: Duration) {
        *self.search_delay.lock() = delay;
    }

    /// Blocks the polling thread inside `search_cities`, so the call cannot
    /// be aborted while it runs.
    pub fn block_search(&self, duration: Duration) {
        *self.search_block.lock() = duration;
    }

    pub fn fail_search(&self, fail: bool) {
        self.search_fails.store(fail, Ordering::SeqCst);
    }

    /// Delays both weather and forecast responses for `city`.
    pub fn delay(&self, city: &str, delay: Duration) {
        self.delay_only(WEATHER_DATA, city, delay);
        self.delay_only(FORECAST_DATA, city, delay);
    }

    pub fn delay_only(&self, resource: &'static str, city: &str, delay: Duration) {
        self.delays.lock().insert((resource, city.to_string()), delay);
    }

    /// Makes `resource` (`WEATHER_DATA` or `FORECAST_DATA`) fail for `city`.
    pub fn fail(&self, resource: &'static str, city: &str, status: u16, body: &str) {
        self.failures
            .lock()
            .insert((resource, city.to_string()), (status, body.to_string()));
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().clone()
    }

    pub fn fetch_calls(&self) -> Vec<(&'static str, String, Units)> {
        self.fetch_calls.lock().clone()
    }

    async fn respond(&self, resource: &'static str, city: &str, units: Units) -> Result<(), QueryError> {
        self.fetch_calls.lock().push((resource, city.to_string(), units));

        let delay = self.delays.lock().get(&(resource, city.to_string())).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failures.lock().get(&(resource, city.to_string())).cloned();
        match failure {
            Some((status, body)) => Err(QueryError::upstream(status, &body, resource)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl WeatherGateway for FakeGateway {
    async fn search_cities(&self, prefix: &str) -> Result<Vec<City>, QueryError> {
        self.search_calls.lock().push(prefix.to_string());

        let delay = *self.search_delay.lock();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let block = *self.search_block.lock();
        if !block.is_zero() {
            std::thread::sleep(block);
        }

        if self.search_fails.load(Ordering::SeqCst) {
            return Err(QueryError::upstream(500, "{}", CITIES));
        }
        Ok(self.cities.lock().clone())
    }

    async fn current_weather(
        &self,
        city: &str,
        units: Units,
    ) -> Result<WeatherSnapshot, QueryError> {
        self.respond(WEATHER_DATA, city, units).await?;

        Ok(WeatherSnapshot {
            location_name: city.to_string(),
            observed_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            temperature: temperature(units),
            feels_like: temperature(units) - 1.0,
            humidity: 60,
            pressure_hpa: 1015,
            wind_speed: 3.5,
            wind_direction_deg: 180.0,
            condition: Condition {
                main: "Clear".to_string(),
                description: "clear sky".to_string(),
                icon_id: "01d".to_string(),
            },
        })
    }

    async fn forecast(&self, city: &str, units: Units) -> Result<Vec<ForecastSample>, QueryError> {
        self.respond(FORECAST_DATA, city, units).await?;

        let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        Ok((0..16)
            .map(|i| ForecastSample {
                observed_at: start + ChronoDuration::hours(3 * i),
                temperature: temperature(units),
                feels_like: temperature(units),
                humidity: 70,
                pressure_hpa: 1010,
                wind_speed: 2.0,
                wind_direction_deg: 90.0,
                condition: Condition {
                    main: "Clouds".to_string(),
                    description: format!("clouds over {city}"),
                    icon_id: "03d".to_string(),
                },
            })
            .collect())
    }
}
