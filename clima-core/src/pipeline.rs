//! Fetch, parse and normalize one weather observation.
//!
//! The pipeline holds no state between calls beyond the client and API key it
//! was built with. A [`WeatherRecord`] is only produced when every required
//! field is present; anything less is [`PipelineError::MalformedResponse`].

use serde_json::Value;
use std::fmt;
use tracing::{debug, instrument, warn};

use crate::{
    Config,
    client::{OpenWeatherClient, WeatherClient},
    error::{ErrorChain, PipelineError},
    icon::resolve_icon,
    model::{LocationQuery, WeatherRecord, try_kelvin_to_celsius},
};

pub struct WeatherPipeline {
    client: Box<dyn WeatherClient>,
    api_key: String,
}

impl fmt::Debug for WeatherPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherPipeline")
            .field("client", &self.client)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl WeatherPipeline {
    pub fn new(client: Box<dyn WeatherClient>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
        }
    }

    #[instrument(skip_all, fields(query = %query))]
    pub async fn fetch_and_normalize(
        &self,
        query: &LocationQuery,
    ) -> Result<WeatherRecord, PipelineError> {
        let body = self.client.fetch_weather(query, &self.api_key).await?;

        match parse_record(&body) {
            Ok(record) => {
                debug!(
                    city = %record.city,
                    temperature = record.temperature_celsius,
                    condition = record.condition_code,
                    "Normalized weather record"
                );
                Ok(record)
            }
            Err(e) => {
                warn!(error = %ErrorChain(&e), "Discarding incomplete weather response");
                Err(e)
            }
        }
    }
}

/// Extract `main.temp`, `name` and `weather[0].id`, all or nothing.
pub fn parse_record(body: &Value) -> Result<WeatherRecord, PipelineError> {
    let temperature_celsius = body
        .pointer("/main/temp")
        .and_then(Value::as_f64)
        .and_then(try_kelvin_to_celsius)
        .ok_or(PipelineError::MalformedResponse { field: "main.temp" })?;

    let city = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or(PipelineError::MalformedResponse { field: "name" })?;

    let condition_code = body
        .pointer("/weather/0/id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .ok_or(PipelineError::MalformedResponse { field: "weather[0].id" })?;

    Ok(WeatherRecord {
        city: city.to_string(),
        temperature_celsius,
        condition_code,
        icon_id: resolve_icon(condition_code).to_string(),
    })
}

/// Construct the OpenWeather pipeline described by `config`.
pub fn pipeline_from_config(config: &Config) -> anyhow::Result<WeatherPipeline> {
    let api_key = config.api_key()?;
    let client = OpenWeatherClient::new(config.endpoint());

    Ok(WeatherPipeline::new(Box::new(client), api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::NetworkError, icon::CLEAR_ICON};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct CannedClient {
        body: Value,
        seen_key: Arc<Mutex<Option<String>>>,
    }

    impl CannedClient {
        fn new(body: Value) -> Self {
            Self {
                body,
                seen_key: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl WeatherClient for CannedClient {
        async fn fetch_weather(
            &self,
            _query: &LocationQuery,
            api_key: &str,
        ) -> Result<Value, NetworkError> {
            *self.seen_key.lock().unwrap() = Some(api_key.to_string());
            Ok(self.body.clone())
        }
    }

    #[derive(Debug)]
    struct OfflineClient;

    #[async_trait]
    impl WeatherClient for OfflineClient {
        async fn fetch_weather(
            &self,
            _query: &LocationQuery,
            _api_key: &str,
        ) -> Result<Value, NetworkError> {
            let cause = serde_json::from_str::<Value>("<html>").unwrap_err();
            Err(NetworkError::Decode(cause))
        }
    }

    fn lisbon() -> Value {
        json!({ "main": { "temp": 290.5 }, "name": "Lisbon", "weather": [{ "id": 800 }] })
    }

    #[tokio::test]
    async fn well_formed_response_becomes_a_record() {
        let pipeline = WeatherPipeline::new(Box::new(CannedClient::new(lisbon())), "KEY");

        let record = pipeline
            .fetch_and_normalize(&LocationQuery::City("Lisbon".into()))
            .await
            .unwrap();

        assert_eq!(
            record,
            WeatherRecord {
                city: "Lisbon".into(),
                temperature_celsius: 17,
                condition_code: 800,
                icon_id: CLEAR_ICON.into(),
            }
        );
    }

    #[tokio::test]
    async fn configured_api_key_is_passed_to_the_client() {
        let client = CannedClient::new(lisbon());
        let seen_key = Arc::clone(&client.seen_key);
        let pipeline = WeatherPipeline::new(Box::new(client), "SECRET");

        pipeline
            .fetch_and_normalize(&LocationQuery::City("Lisbon".into()))
            .await
            .unwrap();

        assert_eq!(seen_key.lock().unwrap().as_deref(), Some("SECRET"));
    }

    #[tokio::test]
    async fn missing_temperature_is_malformed_not_zero() {
        let body = json!({ "main": {}, "name": "Lisbon", "weather": [{ "id": 800 }] });
        let pipeline = WeatherPipeline::new(Box::new(CannedClient::new(body)), "KEY");

        let err = pipeline
            .fetch_and_normalize(&LocationQuery::City("Lisbon".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::MalformedResponse { field: "main.temp" }));
    }

    #[tokio::test]
    async fn network_failure_is_reported_as_network_error() {
        let pipeline = WeatherPipeline::new(Box::new(OfflineClient), "KEY");

        let err = pipeline
            .fetch_and_normalize(&LocationQuery::City("Lisbon".into()))
            .await
            .unwrap_err();

        assert!(err.is_network());
    }

    #[tokio::test]
    async fn identical_inputs_give_equal_records() {
        let pipeline = WeatherPipeline::new(Box::new(CannedClient::new(lisbon())), "KEY");
        let query = LocationQuery::City("Lisbon".into());

        let first = pipeline.fetch_and_normalize(&query).await.unwrap();
        let second = pipeline.fetch_and_normalize(&query).await.unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn mistyped_fields_are_malformed() {
        let cases = [
            (json!({ "main": { "temp": "hot" }, "name": "X", "weather": [{ "id": 800 }] }), "main.temp"),
            (json!({ "main": { "temp": 280.0 }, "name": 7, "weather": [{ "id": 800 }] }), "name"),
            (json!({ "main": { "temp": 280.0 }, "name": "X", "weather": [] }), "weather[0].id"),
            (json!({ "main": { "temp": 280.0 }, "name": "X", "weather": [{ "id": "800" }] }), "weather[0].id"),
            (json!({ "main": { "temp": 280.0 }, "name": "X" }), "weather[0].id"),
        ];

        for (body, expected) in cases {
            match parse_record(&body) {
                Err(PipelineError::MalformedResponse { field }) => assert_eq!(field, expected),
                other => panic!("expected malformed {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn absurd_temperature_is_malformed_not_saturated() {
        let body = json!({ "main": { "temp": 1e20 }, "name": "Venus", "weather": [{ "id": 800 }] });

        assert!(matches!(
            parse_record(&body),
            Err(PipelineError::MalformedResponse { field: "main.temp" })
        ));
    }

    #[test]
    fn integer_temperatures_are_accepted() {
        let body = json!({ "main": { "temp": 300 }, "name": "Cairo", "weather": [{ "id": 801 }] });
        let record = parse_record(&body).unwrap();

        assert_eq!(record.temperature_celsius, 26);
        assert_eq!(record.icon_id, "cloudy2");
    }

    #[test]
    fn unknown_condition_code_still_builds_a_record() {
        let body = json!({ "main": { "temp": 273.15 }, "name": "Nowhere", "weather": [{ "id": 950 }] });
        let record = parse_record(&body).unwrap();

        assert_eq!(record.temperature_celsius, 0);
        assert_eq!(record.icon_id, "dunno");
    }

    #[test]
    fn debug_output_hides_the_api_key() {
        let pipeline = WeatherPipeline::new(Box::new(OfflineClient), "SECRET");
        let debug = format!("{pipeline:?}");

        assert!(debug.contains("WeatherPipeline"));
        assert!(!debug.contains("SECRET"));
    }

    #[test]
    fn pipeline_from_config_uses_configured_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        assert!(pipeline_from_config(&cfg).is_ok());
    }
}
