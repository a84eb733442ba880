use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::{error::NetworkError, model::LocationQuery};

use super::WeatherClient;

pub const WEATHER_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    endpoint: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Default for OpenWeatherClient {
    fn default() -> Self {
        Self::new(WEATHER_URL)
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    #[instrument(skip_all, fields(endpoint = %self.endpoint, query = %query))]
    async fn fetch_weather(
        &self,
        query: &LocationQuery,
        api_key: &str,
    ) -> Result<serde_json::Value, NetworkError> {
        debug!("Requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&query.query_params(api_key))
            .send()
            .await
            .map_err(NetworkError::Transport)?;

        let status = res.status();
        let body = res.text().await.map_err(NetworkError::Transport)?;

        if !status.is_success() {
            warn!(%status, "OpenWeather returned an error status");
            return Err(NetworkError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(NetworkError::Decode)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
