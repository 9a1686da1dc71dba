//! OpenWeather JSON payloads, as far as we read them.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    #[serde(default)]
    pub pressure: f64,
    #[serde(default)]
    pub humidity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwWeather {
    #[serde(default)]
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWind {
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwClouds {
    #[serde(default)]
    pub all: u8,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwSys {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub sunrise: i64,
    #[serde(default)]
    pub sunset: i64,
}

/// `/data/2.5/weather`
#[derive(Debug, Clone, Deserialize)]
pub struct OwCurrentResponse {
    #[serde(default)]
    pub name: String,
    pub dt: i64,
    /// Shift in seconds from UTC.
    #[serde(default)]
    pub timezone: i32,
    pub main: OwMain,
    pub weather: Vec<OwWeather>,
    #[serde(default)]
    pub wind: OwWind,
    #[serde(default)]
    pub clouds: OwClouds,
    /// Meters; OpenWeather omits it for some stations.
    pub visibility: Option<u32>,
    #[serde(default)]
    pub sys: OwSys,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastEntry {
    pub dt: i64,
    pub main: OwMain,
    pub weather: Vec<OwWeather>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCity {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub timezone: i32,
}

/// `/data/2.5/forecast` (3-hour steps, 5 days).
#[derive(Debug, Clone, Deserialize)]
pub struct OwForecastResponse {
    #[serde(default)]
    pub city: OwCity,
    pub list: Vec<OwForecastEntry>,
}
