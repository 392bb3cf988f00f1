use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select, Text};
use std::{sync::Arc, time::Duration};
use tracing::debug;
use weather_core::{
    Config, HttpGateway, SubmitOutcome, Units, WeatherGateway, WeatherSession,
};

use crate::format::{render_forecast, render_snapshot, render_status, render_suggestions};

/// Fast answers finish before any status line is printed.
const STATUS_DELAY: Duration = Duration::from_millis(150);

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the weather proxy URL and default units.
    Configure,

    /// Show current weather and a 3-day forecast for a city.
    Show {
        /// City name, optionally followed by a country code ("Paris, FR").
        city: String,

        /// Overrides the configured default units.
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },

    /// List cities matching a name prefix.
    Search {
        prefix: String,
    },

    /// Type-ahead search loop.
    Interactive {
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,
    },
}

fn parse_units(s: &str) -> Result<Units, String> {
    Units::try_from(s).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, units } => {
                let cfg = Config::load()?;
                let session = open_session(&cfg, units)?;
                session.set_query(&city);

                match submit_with_status(&session).await {
                    SubmitOutcome::Failed(message) => bail!(message),
                    _ => print_results(&session),
                }
                Ok(())
            }
            Command::Search { prefix } => {
                let cfg = Config::load()?;
                let gateway = HttpGateway::new(&cfg)?;

                let cities = gateway
                    .search_cities(&prefix)
                    .await
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
                print!("{}", render_suggestions(&cities));
                Ok(())
            }
            Command::Interactive { units } => {
                let cfg = Config::load()?;
                let session = open_session(&cfg, units)?;
                interactive(&session).await
            }
        }
    }
}

fn open_session(cfg: &Config, units: Option<Units>) -> anyhow::Result<WeatherSession<HttpGateway>> {
    let gateway = HttpGateway::new(cfg).context("Failed to build HTTP client")?;
    debug!(gateway = gateway.base_url(), "using weather proxy");

    let session = WeatherSession::new(Arc::new(gateway), cfg);
    if let Some(units) = units {
        session.set_units(units);
    }
    Ok(session)
}

fn print_results(session: &WeatherSession<HttpGateway>) {
    let state = session.state();

    if let Some(error) = &state.error {
        eprintln!("Error: {error}");
        return;
    }
    if let Some(snapshot) = &state.snapshot {
        println!("{}", render_snapshot(snapshot, state.units));
    }
    if state.forecast.is_some() {
        print!("{}", render_forecast(&session.day_summaries(), state.units));
    }
}

async fn submit_with_status(session: &WeatherSession<HttpGateway>) -> SubmitOutcome {
    let submit = session.submit();
    tokio::pin!(submit);

    tokio::select! {
        outcome = &mut submit => return outcome,
        () = tokio::time::sleep(STATUS_DELAY) => {}
    }
    if let Some(status) = render_status(&session.state()) {
        eprintln!("{status}");
    }
    submit.await
}

/// Treats Esc / Ctrl-C as "leave the loop" rather than an error.
fn prompt_or_quit<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn interactive(session: &WeatherSession<HttpGateway>) -> anyhow::Result<()> {
    println!("Type a city name. `:units` toggles units, empty input quits.");

    loop {
        let state = session.state();
        let label = format!("City [{}]:", state.units);
        let Some(text) = prompt_or_quit(
            Text::new(&label)
                .with_initial_value(&state.query_text)
                .prompt(),
        )?
        else {
            break;
        };

        let text = text.trim();
        if text.is_empty() {
            break;
        }
        if text == ":units" {
            let units = session.toggle_units();
            println!("Units set to {units}. Search again to refresh the results.");
            continue;
        }

        session.input(text);
        session.settle_suggestions().await;

        let state = session.state();
        if state.suggestions_visible && !state.suggestions.is_empty() {
            let mut options = vec![format!("Search \"{text}\"")];
            options.extend(state.suggestions.iter().map(|c| c.display_name()));

            let Some(choice) = prompt_or_quit(Select::new("Did you mean:", options).raw_prompt())?
            else {
                session.dismiss_suggestions();
                continue;
            };

            match choice.index {
                0 => session.dismiss_suggestions(),
                i => session.select_suggestion(&state.suggestions[i - 1]),
            }
        }

        if submit_with_status(session).await != SubmitOutcome::Superseded {
            print_results(session);
        }
    }

    Ok(())
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load()?;

    let Some(url) = prompt_or_quit(
        Text::new("Weather proxy URL:")
            .with_initial_value(&cfg.gateway_url)
            .prompt(),
    )?
    else {
        return Ok(());
    };

    let start = Units::all()
        .iter()
        .position(|u| *u == cfg.default_units)
        .unwrap_or(0);
    let Some(units) = prompt_or_quit(
        Select::new("Default units:", Units::all().to_vec())
            .with_starting_cursor(start)
            .prompt(),
    )?
    else {
        return Ok(());
    };

    cfg.gateway_url = url.trim().trim_end_matches('/').to_string();
    cfg.default_units = units;
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
