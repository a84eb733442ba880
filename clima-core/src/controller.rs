//! The main weather screen, minus the widgets.
//!
//! Location updates, location failures and manually entered city names all
//! arrive here, either through the `on_*` methods or as [`InputEvent`]s on a
//! channel. Every new query supersedes the one in flight: the old task is
//! aborted and its result, should it still arrive, is dropped rather than
//! painted over a newer one.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

use crate::{
    error::{ErrorChain, LocationError},
    model::{Coordinates, LocationQuery, WeatherRecord},
    pipeline::WeatherPipeline,
};

/// Something that can render weather or a failure message.
pub trait DisplaySink: Send + Sync {
    fn show_record(&self, record: &WeatherRecord);

    /// Shown in place of the city name.
    fn show_message(&self, message: &str);
}

#[derive(Debug)]
pub enum InputEvent {
    LocationUpdated(Coordinates),
    LocationFailed(LocationError),
    CityNameEntered(String),
}

pub struct WeatherController {
    pipeline: Arc<WeatherPipeline>,
    sink: Arc<dyn DisplaySink>,
    /// Generation of the newest query; guards rendering.
    latest: Arc<Mutex<u64>>,
    in_flight: Option<JoinHandle<()>>,
}

impl WeatherController {
    pub fn new(pipeline: Arc<WeatherPipeline>, sink: Arc<dyn DisplaySink>) -> Self {
        Self {
            pipeline,
            sink,
            latest: Arc::default(),
            in_flight: None,
        }
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::LocationUpdated(coordinates) => self.on_location_update(coordinates),
            InputEvent::LocationFailed(error) => self.on_location_error(error),
            InputEvent::CityNameEntered(city) => self.on_city_name_entered(&city),
        }
    }

    pub fn on_location_update(&mut self, coordinates: Coordinates) {
        self.submit(LocationQuery::Coordinates(coordinates));
    }

    pub fn on_location_error(&mut self, error: LocationError) {
        warn!(error = %ErrorChain(&error), "Location unavailable");
        self.supersede();
        self.sink.show_message(error.user_message());
    }

    /// Blank input is not a query and is ignored.
    pub fn on_city_name_entered(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            debug!("Ignoring blank city name");
            return;
        }
        self.submit(LocationQuery::City(city.to_string()));
    }

    /// Wait for the current fetch, if any, to render.
    pub async fn settle(&mut self) {
        if let Some(handle) = self.in_flight.take()
            && let Err(e) = handle.await
            && e.is_panic()
        {
            warn!(error = %e, "Weather fetch task panicked");
        }
    }

    /// Consume events until every sender is dropped, then settle.
    pub async fn run(mut self, mut events: mpsc::Receiver<InputEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        self.settle().await;
    }

    fn supersede(&mut self) -> u64 {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest += 1;
        *latest
    }

    fn submit(&mut self, query: LocationQuery) {
        let generation = self.supersede();
        let pipeline = Arc::clone(&self.pipeline);
        let sink = Arc::clone(&self.sink);
        let latest = Arc::clone(&self.latest);

        debug!(%query, generation, "Fetching weather");

        self.in_flight = Some(tokio::spawn(async move {
            let result = pipeline.fetch_and_normalize(&query).await;

            let latest = latest.lock().unwrap_or_else(PoisonError::into_inner);
            if *latest != generation {
                debug!(%query, generation, "Dropping superseded weather result");
                return;
            }

            match result {
                Ok(record) => sink.show_record(&record),
                Err(e) => {
                    warn!(error = %ErrorChain(&e), "Weather fetch failed");
                    sink.show_message(e.user_message());
                }
            }
        }));
    }
}
