use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::CompassPoint;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lon)
    }
}

/// What the user asked for: a free-text city or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Place {
    City(String),
    Coords(Coordinates),
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::City(name) => f.write_str(name),
            Place::Coords(c) => write!(f, "({c})"),
        }
    }
}

/// A resolved geocoding hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl GeoPlace {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub city: String,
    pub country: String,
}

/// Temperatures in whole degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature {
    pub current: i32,
    pub feels_like: i32,
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    pub main: String,
    pub description: String,
    /// OpenWeather icon id, e.g. `10d`.
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub humidity: u8,
    pub pressure_mmhg: i32,
    pub wind_direction: CompassPoint,
    pub wind_speed_mps: f64,
    /// `None` when the station does not report visibility.
    pub visibility_km: Option<f64>,
    pub clouds: u8,
}

/// Normalized current conditions, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub location: LocationInfo,
    pub temperature: Temperature,
    pub conditions: Conditions,
    pub details: Details,
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
    pub observed_at: DateTime<FixedOffset>,
    /// Set on locally generated placeholder data.
    #[serde(default)]
    pub demo: bool,
}

/// One day of the aggregated forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: DateTime<FixedOffset>,
    pub date_label: String,
    pub weekday_label: String,
    pub temperature: i32,
    pub condition: String,
    pub icon: String,
}

/// URL of the OpenWeather icon image; `large` selects the 4x variant.
pub fn icon_url(icon: &str, large: bool) -> String {
    if large {
        format!("https://openweathermap.org/img/wn/{icon}@4x.png")
    } else {
        format!("https://openweathermap.org/img/wn/{icon}.png")
    }
}
