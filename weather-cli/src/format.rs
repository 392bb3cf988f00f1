use chrono::{DateTime, Local, Utc};
use weather_core::{City, DaySummary, SessionState, Units, WeatherSnapshot};

const ICON_BASE_URL: &str = "http://openweathermap.org/img/wn";

const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass direction for a wind bearing in degrees.
pub fn wind_direction(degrees: f64) -> &'static str {
    let index = (degrees.rem_euclid(360.0) / 22.5).round() as usize % COMPASS.len();
    COMPASS[index]
}

/// Accent derived from the current condition and temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    ClearHot,
    ClearWarm,
    ClearCool,
    Clouds,
    Rain,
    Snow,
    Thunderstorm,
    Default,
}

impl Theme {
    pub fn for_snapshot(snapshot: &WeatherSnapshot) -> Self {
        // Thresholds are in whatever units the snapshot was fetched with.
        match snapshot.condition.main.to_lowercase().as_str() {
            "clear" if snapshot.temperature > 25.0 => Theme::ClearHot,
            "clear" if snapshot.temperature > 15.0 => Theme::ClearWarm,
            "clear" => Theme::ClearCool,
            "clouds" => Theme::Clouds,
            "rain" => Theme::Rain,
            "snow" => Theme::Snow,
            "thunderstorm" => Theme::Thunderstorm,
            _ => Theme::Default,
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            Theme::ClearHot => "☀ ☀ ☀",
            Theme::ClearWarm => "☀",
            Theme::ClearCool => "☼",
            Theme::Clouds => "☁",
            Theme::Rain => "☂",
            Theme::Snow => "❄",
            Theme::Thunderstorm => "⚡",
            Theme::Default => "·",
        }
    }
}

fn long_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%A, %B %-d, %Y").to_string()
}

/// Rounds halves toward positive infinity, so -2.5 shows as -2.
fn temperature(value: f64, units: Units) -> String {
    format!("{}{}", (value + 0.5).floor(), units.temperature_symbol())
}

pub fn icon_url(icon_id: &str) -> Option<String> {
    (!icon_id.is_empty()).then(|| format!("{ICON_BASE_URL}/{icon_id}@2x.png"))
}

/// Status line for a session with a fetch outstanding.
pub fn render_status(state: &SessionState) -> Option<&'static str> {
    state.loading.then_some("Loading...")
}

pub fn render_snapshot(snapshot: &WeatherSnapshot, units: Units) -> String {
    let theme = Theme::for_snapshot(snapshot);
    let mut output = format!(
        "{} {}\n{}\n\n  {}  {}\n\n",
        theme.banner(),
        snapshot.location_name,
        long_date(snapshot.observed_at),
        temperature(snapshot.temperature, units),
        snapshot.condition.description,
    );

    output.push_str(&format!(
        "  Feels Like: {}\n  Humidity:   {}%\n  Wind:       {} {} {}\n  Pressure:   {} hPa\n",
        temperature(snapshot.feels_like, units),
        snapshot.humidity,
        snapshot.wind_speed,
        units.wind_speed_unit(),
        wind_direction(snapshot.wind_direction_deg),
        snapshot.pressure_hpa,
    ));
    if let Some(url) = icon_url(&snapshot.condition.icon_id) {
        output.push_str(&format!("  Icon:       {url}\n"));
    }
    output
}

pub fn render_forecast(days: &[DaySummary], units: Units) -> String {
    if days.is_empty() {
        return "No forecast available.\n".to_string();
    }

    let mut output = String::from("3-Day Forecast\n\n");
    for day in days {
        let condition = &day.representative_condition;
        output.push_str(&format!(
            "  {:<10} {:>6}  {}",
            day.day_label,
            temperature(day.average_temperature, units),
            condition.description,
        ));
        if let Some(url) = icon_url(&condition.icon_id) {
            output.push_str(&format!("  {url}"));
        }
        output.push('\n');
    }
    output
}

pub fn render_suggestions(cities: &[City]) -> String {
    if cities.is_empty() {
        return "No matching cities.\n".to_string();
    }

    cities
        .iter()
        .enumerate()
        .map(|(i, city)| format!("{:>2}. {}\n", i + 1, city.display_name()))
        .collect()
}
