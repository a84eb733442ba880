//! Condition-code to icon mapping.
//!
//! OpenWeatherMap groups its condition codes into numeric bands; each band
//! gets one icon. Codes outside every band resolve to [`FALLBACK_ICON`].

use std::ops::RangeInclusive;

pub const THUNDERSTORM_ICON: &str = "tstorm1";
pub const DRIZZLE_ICON: &str = "light_rain";
pub const RAIN_ICON: &str = "shower3";
pub const SNOW_ICON: &str = "snow4";
pub const ATMOSPHERE_ICON: &str = "fog";
pub const CLEAR_ICON: &str = "sunny";
pub const CLOUDS_ICON: &str = "cloudy2";
pub const FALLBACK_ICON: &str = "dunno";

/// Inclusive bands, kept sorted and non-overlapping.
const ICON_BANDS: &[(RangeInclusive<i32>, &str)] = &[
    (200..=232, THUNDERSTORM_ICON),
    (300..=321, DRIZZLE_ICON),
    (500..=531, RAIN_ICON),
    (600..=622, SNOW_ICON),
    (701..=781, ATMOSPHERE_ICON),
    (800..=800, CLEAR_ICON),
    (801..=804, CLOUDS_ICON),
];

pub fn resolve_icon(condition_code: i32) -> &'static str {
    ICON_BANDS
        .iter()
        .find(|(band, _)| band.contains(&condition_code))
        .map(|(_, icon)| *icon)
        .unwrap_or(FALLBACK_ICON)
}
