use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clima_core::{
    Config, Coordinates, FixedLocation, InputEvent, IpLocator, LocationSource, WeatherController,
    pipeline_from_config,
};
use inquire::{Confirm, CustomType, InquireError, Password, PasswordDisplayMode, Text};
use tracing::debug;

use crate::display::TerminalDisplay;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "clima", version, about = "Current weather for where you are, or any city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and location defaults.
    Configure,

    /// Show the current weather once.
    Show {
        /// City name; if absent, coordinates, the configured location or an IP lookup is used.
        #[arg(value_parser = non_blank_city, conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the weather here, then keep asking for other cities.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon, json } => {
                let config = Config::load()?;
                let mut controller = controller(&config, json)?;

                let pinned = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                let event = match city_query(city, pinned, &config) {
                    Some(city) => InputEvent::CityNameEntered(city),
                    None => locate(location_source(pinned, &config).as_ref()).await,
                };

                controller.handle(event);
                controller.settle().await;
                Ok(())
            }
            Command::Interactive => interactive().await,
        }
    }
}

fn non_blank_city(city: &str) -> Result<String, String> {
    let city = city.trim();
    if city.is_empty() {
        return Err("city name must not be blank".to_string());
    }
    Ok(city.to_string())
}

/// An explicit city wins, then any coordinates, then the configured default
/// city. `None` means the location source decides.
fn city_query(city: Option<String>, pinned: Option<Coordinates>, config: &Config) -> Option<String> {
    if city.is_some() {
        return city;
    }
    if pinned.is_some() || config.location.is_some() {
        return None;
    }
    config.default_city.clone()
}

fn controller(config: &Config, json: bool) -> anyhow::Result<WeatherController> {
    let pipeline = Arc::new(pipeline_from_config(config)?);
    Ok(WeatherController::new(pipeline, Arc::new(TerminalDisplay::new(json))))
}

fn location_source(pinned: Option<Coordinates>, config: &Config) -> Box<dyn LocationSource> {
    match pinned.or(config.location) {
        Some(coordinates) => Box::new(FixedLocation(coordinates)),
        None => Box::new(IpLocator::default()),
    }
}

async fn locate(source: &dyn LocationSource) -> InputEvent {
    debug!(?source, "Locating");
    match source.locate().await {
        Ok(coordinates) => InputEvent::LocationUpdated(coordinates),
        Err(e) => InputEvent::LocationFailed(e),
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key.trim().to_string());
    }

    let city = Text::new("Default city (optional):")
        .with_default(config.default_city.as_deref().unwrap_or_default())
        .prompt()
        .context("Failed to read default city")?;
    config.set_default_city(&city);

    let pin = Confirm::new("Pin fixed coordinates instead of locating by IP?")
        .with_default(config.location.is_some())
        .prompt()
        .context("Failed to read answer")?;
    config.location = if pin {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please type a number between -90 and 90")
            .prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please type a number between -180 and 180")
            .prompt()?;
        let coordinates = Coordinates::new(latitude, longitude);
        anyhow::ensure!(coordinates.is_valid(), "Coordinates {latitude},{longitude} are out of range");
        Some(coordinates)
    } else {
        None
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn interactive() -> anyhow::Result<()> {
    let config = Config::load()?;
    let mut controller = controller(&config, false)?;

    controller.handle(locate(location_source(None, &config).as_ref()).await);
    controller.settle().await;

    manual_entry(&mut controller, prompt_city).await
}

/// The manual-entry screen. Each confirmed name is rendered before the next
/// prompt appears; `Ok(None)` from `prompt` ends the session.
async fn manual_entry<P>(controller: &mut WeatherController, prompt: P) -> anyhow::Result<()>
where
    P: Fn() -> anyhow::Result<Option<String>> + Send + Sync + 'static,
{
    let prompt = Arc::new(prompt);
    loop {
        let next = Arc::clone(&prompt);
        match tokio::task::spawn_blocking(move || next()).await?? {
            Some(city) => {
                controller.on_city_name_entered(&city);
                controller.settle().await;
            }
            None => return Ok(()),
        }
    }
}

fn prompt_city() -> anyhow::Result<Option<String>> {
    match Text::new("Change city:").with_help_message("Esc to quit").prompt() {
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
