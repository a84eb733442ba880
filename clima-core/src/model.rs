use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset between the Kelvin and Celsius scales.
pub const KELVIN_OFFSET: f64 = 273.15;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// What to ask the provider about. Exactly one shape per request.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    Coordinates(Coordinates),
    City(String),
}

impl LocationQuery {
    /// Query string pairs for the current-weather endpoint.
    pub fn query_params(&self, api_key: &str) -> Vec<(&'static str, String)> {
        match self {
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
                ("appid", api_key.to_string()),
            ],
            LocationQuery::City(name) => {
                vec![("q", name.clone()), ("appid", api_key.to_string())]
            }
        }
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Coordinates(c) => write!(f, "{},{}", c.latitude, c.longitude),
            LocationQuery::City(name) => f.write_str(name),
        }
    }
}

/// Normalized result of one successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature_celsius: i32,
    pub condition_code: i32,
    pub icon_id: String,
}

/// Kelvin to whole degrees Celsius, truncating toward zero.
///
/// Values outside the `i32` range saturate and NaN becomes 0; use
/// [`try_kelvin_to_celsius`] where such input must be rejected.
pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
    (kelvin - KELVIN_OFFSET).trunc() as i32
}

/// Like [`kelvin_to_celsius`], but `None` for non-finite or out-of-range input.
pub fn try_kelvin_to_celsius(kelvin: f64) -> Option<i32> {
    let celsius = (kelvin - KELVIN_OFFSET).trunc();
    (celsius.is_finite() && (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&celsius))
        .then_some(celsius as i32)
}
