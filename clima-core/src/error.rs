use std::{error::Error as StdError, fmt};
use thiserror::Error;

pub const LOCATION_UNAVAILABLE: &str = "Location unavailable";
pub const CONNECTION_ISSUES: &str = "Connection issues";
pub const WEATHER_UNAVAILABLE: &str = "Weather unavailable";

/// The device (or its stand-in) could not produce a coordinate.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location access was denied")]
    PermissionDenied,

    #[error("Location could not be determined: {0}")]
    Unavailable(String),
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        LOCATION_UNAVAILABLE
    }
}

/// Transport, HTTP status or body-decoding failure talking to the provider.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Failed to send request to OpenWeather")]
    Transport(#[source] reqwest::Error),

    #[error("OpenWeather request failed with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("Failed to parse OpenWeather JSON")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("OpenWeather response is missing or has a mistyped `{field}`")]
    MalformedResponse { field: &'static str },
}

impl PipelineError {
    pub fn user_message(&self) -> &'static str {
        match self {
            PipelineError::Network(_) => CONNECTION_ISSUES,
            PipelineError::MalformedResponse { .. } => WEATHER_UNAVAILABLE,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, PipelineError::Network(_))
    }
}

/// Displays an error followed by each of its sources, `: `-separated.
pub struct ErrorChain<'a>(pub &'a (dyn StdError + 'static));

impl fmt::Display for ErrorChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(cause) = source {
            write!(f, ": {cause}")?;
            source = cause.source();
        }
        Ok(())
    }
}
