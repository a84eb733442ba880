//! Where the device is.
//!
//! The weather app asks a [`LocationSource`] for a coordinate once on start-up.
//! Without a GPS the CLI either uses coordinates fixed in config or asks
//! ipapi.co for an approximate position based on the public IP address.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, instrument, warn};

use crate::{
    error::{ErrorChain, LocationError},
    model::Coordinates,
};

pub const IP_API_URL: &str = "https://ipapi.co/json";

#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

/// Always yields the same coordinate.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl LocationSource for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        checked(self.0)
    }
}

/// Approximate location from the caller's public IP.
#[derive(Debug, Clone)]
pub struct IpLocator {
    endpoint: String,
    http: Client,
}

impl IpLocator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }
}

impl Default for IpLocator {
    fn default() -> Self {
        Self::new(IP_API_URL)
    }
}

#[derive(Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

#[async_trait]
impl LocationSource for IpLocator {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let response: IpApiResponse = self
            .http
            .get(&self.endpoint)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                let chain = ErrorChain(&e);
                warn!(error = %chain, "Location request failed");
                LocationError::Unavailable(format!("Failed during request for current location: {chain}"))
            })?
            .json()
            .await
            .map_err(|e| {
                LocationError::Unavailable(format!(
                    "Failed while parsing location API result: {}",
                    ErrorChain(&e)
                ))
            })?;

        if response.error {
            let reason = response.reason.unwrap_or_else(|| "Unknown Error".to_string());
            return Err(LocationError::Unavailable(format!("ipapi.co error: {reason}")));
        }

        match (response.latitude, response.longitude) {
            (Some(latitude), Some(longitude)) => {
                debug!(latitude, longitude, "Located by IP");
                checked(Coordinates::new(latitude, longitude))
            }
            _ => Err(LocationError::Unavailable(
                "ipapi.co response had no coordinates".to_string(),
            )),
        }
    }
}

fn checked(coordinates: Coordinates) -> Result<Coordinates, LocationError> {
    if coordinates.is_valid() {
        Ok(coordinates)
    } else {
        Err(LocationError::Unavailable(format!(
            "coordinates {},{} are out of range",
            coordinates.latitude, coordinates.longitude
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_location_yields_its_coordinates() {
        let source = FixedLocation(Coordinates::new(38.72, -9.14));
        assert_eq!(source.locate().await.unwrap(), Coordinates::new(38.72, -9.14));
    }

    #[tokio::test]
    async fn fixed_location_out_of_range_is_unavailable() {
        let source = FixedLocation(Coordinates::new(-95.0, 0.0));
        let err = source.locate().await.unwrap_err();

        assert!(matches!(err, LocationError::Unavailable(_)));
        assert_eq!(err.user_message(), "Location unavailable");
    }
}
