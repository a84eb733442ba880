//! Core library for the `clima` weather app.
//!
//! This crate defines:
//! - The fetch → parse → normalize pipeline producing a [`WeatherRecord`]
//! - The OpenWeatherMap client and condition-code icon mapping
//! - Location sources and the controller tying input events to a display
//! - Configuration & credentials handling
//!
//! It is used by `clima-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod pipeline;

pub use client::{OpenWeatherClient, WeatherClient};
pub use config::Config;
pub use controller::{DisplaySink, InputEvent, WeatherController};
pub use error::{ErrorChain, LocationError, NetworkError, PipelineError};
pub use icon::resolve_icon;
pub use location::{FixedLocation, IpLocator, LocationSource};
pub use model::{Coordinates, LocationQuery, WeatherRecord, kelvin_to_celsius};
pub use pipeline::{WeatherPipeline, parse_record, pipeline_from_config};
