use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::NetworkError, model::LocationQuery};

pub mod openweather;

pub use openweather::{OpenWeatherClient, WEATHER_URL};

/// Fetches the raw current-weather document for a location.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        query: &LocationQuery,
        api_key: &str,
    ) -> Result<serde_json::Value, NetworkError>;
}
