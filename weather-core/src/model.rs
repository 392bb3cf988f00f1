use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Unit system forwarded to the gateway.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Units::Metric => Units::Imperial,
            Units::Imperial => Units::Metric,
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// A geocoding match returned by city search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl City {
    /// Text placed in the search box when this city is picked.
    pub fn query_text(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }

    /// Suggestion line including the state when the provider knows it.
    pub fn display_name(&self) -> String {
        match &self.state {
            Some(state) => format!("{}, {}, {}", self.name, self.country, state),
            None => self.query_text(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon_id: String,
}

impl Condition {
    fn unknown() -> Self {
        Self {
            main: "Unknown".to_string(),
            description: "Unknown".to_string(),
            icon_id: String::new(),
        }
    }
}

/// Current conditions for one location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure_hpa: i32,
    pub wind_speed: f64,
    pub wind_direction_deg: f64,
    pub condition: Condition,
}

/// One point of the forecast time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub observed_at: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure_hpa: i32,
    pub wind_speed: f64,
    pub wind_direction_deg: f64,
    pub condition: Condition,
}

/// Per-weekday reduction of the forecast series.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub day_label: String,
    pub average_temperature: f64,
    pub representative_condition: Condition,
}

// Gateway payloads. The proxy relays the provider's JSON untouched.

#[derive(Debug, Deserialize)]
pub(crate) struct WireMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: i32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCondition {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireWind {
    speed: f64,
    #[serde(default)]
    deg: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireCurrent {
    name: String,
    dt: i64,
    main: WireMain,
    #[serde(default)]
    weather: Vec<WireCondition>,
    #[serde(default)]
    wind: WireWind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireForecastEntry {
    dt: i64,
    main: WireMain,
    #[serde(default)]
    weather: Vec<WireCondition>,
    #[serde(default)]
    wind: WireWind,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireForecast {
    #[serde(default)]
    list: Vec<WireForecastEntry>,
}

fn first_condition(weather: Vec<WireCondition>) -> Condition {
    weather
        .into_iter()
        .next()
        .map(|w| Condition {
            main: w.main,
            description: w.description,
            icon_id: w.icon,
        })
        .unwrap_or_else(Condition::unknown)
}

fn unix_to_utc(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

impl From<WireCurrent> for WeatherSnapshot {
    fn from(w: WireCurrent) -> Self {
        Self {
            location_name: w.name,
            observed_at: unix_to_utc(w.dt),
            temperature: w.main.temp,
            feels_like: w.main.feels_like,
            humidity: w.main.humidity,
            pressure_hpa: w.main.pressure,
            wind_speed: w.wind.speed,
            wind_direction_deg: w.wind.deg,
            condition: first_condition(w.weather),
        }
    }
}

impl From<WireForecastEntry> for ForecastSample {
    fn from(w: WireForecastEntry) -> Self {
        Self {
            observed_at: unix_to_utc(w.dt),
            temperature: w.main.temp,
            feels_like: w.main.feels_like,
            humidity: w.main.humidity,
            pressure_hpa: w.main.pressure,
            wind_speed: w.wind.speed,
            wind_direction_deg: w.wind.deg,
            condition: first_condition(w.weather),
        }
    }
}

impl From<WireForecast> for Vec<ForecastSample> {
    fn from(w: WireForecast) -> Self {
        w.list.into_iter().map(ForecastSample::from).collect()
    }
}
