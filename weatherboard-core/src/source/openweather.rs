use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

use crate::{
    config::{Config, Endpoints},
    error::{Stage, WeatherError},
    format::{aggregate_daily, format_current, offset_from_seconds},
    model::{Coordinates, CurrentWeather, ForecastDay, GeoPlace, LocationInfo, Place},
    wire::{OwCurrentResponse, OwForecastResponse},
};

use super::WeatherSource;

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Client for OpenWeather's free-tier geocoding, current weather and 5-day forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    lang: String,
    endpoints: Endpoints,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(WeatherError::ClientInit)?;

        Ok(Self {
            api_key: api_key.into(),
            lang: "en".to_string(),
            endpoints: Endpoints::default(),
            http,
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Build a client from config, resolving the API key from the environment first.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let api_key = config.api_key_from_env()?;
        let client = Self::new(api_key)
            .context("Failed to create OpenWeather client")?
            .with_endpoints(config.endpoints.clone())
            .with_lang(config.lang.clone());
        Ok(client)
    }

    /// Resolve a free-text city to its best geocoding hit.
    pub async fn geocode(&self, city: &str) -> Result<GeoPlace, WeatherError> {
        let url = format!("{}/direct", self.endpoints.geo);
        let hits: Vec<GeoPlace> = self
            .get_json(
                Stage::Geocoding,
                &url,
                vec![("q", city.to_string()), ("limit", "1".to_string())],
            )
            .await?;

        let place = hits
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::PlaceNotFound(city.to_string()))?;

        debug!(city, name = %place.name, lat = place.lat, lon = place.lon, "geocoded");
        Ok(place)
    }

    /// Best-effort name for a coordinate pair. Failures are logged and yield `None`.
    pub async fn reverse_geocode(&self, coords: Coordinates) -> Option<GeoPlace> {
        let url = format!("{}/reverse", self.endpoints.geo);
        let mut query = coords_query(coords);
        query.push(("limit", "1".to_string()));

        match self
            .get_json::<Vec<GeoPlace>>(Stage::ReverseGeocoding, &url, query)
            .await
        {
            Ok(hits) => hits.into_iter().next(),
            Err(e) => {
                debug!("Reverse geocode failed: {e}");
                None
            }
        }
    }

    async fn fetch_current(&self, coords: Coordinates) -> Result<OwCurrentResponse, WeatherError> {
        let url = format!("{}/weather", self.endpoints.weather);
        self.get_json(Stage::CurrentWeather, &url, self.weather_query(coords))
            .await
    }

    async fn fetch_forecast(&self, coords: Coordinates) -> Result<OwForecastResponse, WeatherError> {
        let url = format!("{}/forecast", self.endpoints.weather);
        self.get_json(Stage::Forecast, &url, self.weather_query(coords))
            .await
    }

    async fn coordinates_of(&self, place: &Place) -> Result<(Coordinates, Option<GeoPlace>), WeatherError> {
        match place {
            Place::City(city) => {
                let geo = self.geocode(city).await?;
                Ok((geo.coordinates(), Some(geo)))
            }
            Place::Coords(coords) => Ok((*coords, None)),
        }
    }

    fn weather_query(&self, coords: Coordinates) -> Vec<(&'static str, String)> {
        let mut query = coords_query(coords);
        query.push(("units", "metric".to_string()));
        query.push(("lang", self.lang.clone()));
        query
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        stage: Stage,
        url: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<T, WeatherError> {
        query.push(("appid", self.api_key.clone()));

        let res = self
            .http
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(|source| WeatherError::Network {
                stage,
                // the request URL carries the API key
                source: source.without_url(),
            })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| WeatherError::Network {
                stage,
                source: source.without_url(),
            })?;

        if !status.is_success() {
            return Err(WeatherError::Http {
                stage,
                status,
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| WeatherError::Parse { stage, source })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, place: &Place) -> Result<CurrentWeather, WeatherError> {
        let (coords, geo) = self.coordinates_of(place).await?;
        let raw = self.fetch_current(coords).await?;

        // Prefer the geocoder's name; the weather payload names the nearest station.
        let geo = match geo {
            Some(geo) => Some(geo),
            None => self.reverse_geocode(coords).await,
        };
        let location = match geo {
            Some(geo) => LocationInfo {
                city: geo.name,
                country: geo.country,
            },
            None => LocationInfo {
                city: raw.name.clone(),
                country: raw.sys.country.clone(),
            },
        };

        info!(place = %place, city = %location.city, "fetched current weather");
        Ok(format_current(&raw, location))
    }

    async fn forecast(&self, place: &Place) -> Result<Vec<ForecastDay>, WeatherError> {
        let (coords, _) = self.coordinates_of(place).await?;
        let raw = self.fetch_forecast(coords).await?;

        let days = aggregate_daily(&raw.list, offset_from_seconds(raw.city.timezone));
        info!(place = %place, samples = raw.list.len(), days = days.len(), "fetched forecast");
        Ok(days)
    }
}

fn coords_query(coords: Coordinates) -> Vec<(&'static str, String)> {
    vec![("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_body_keeps_short_bodies() {
        assert_eq!(truncate_body("nope"), "nope");
    }

    #[test]
    fn truncate_body_cuts_on_char_boundary() {
        let long = "й".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }

    #[test]
    fn weather_query_carries_units_and_lang() {
        let client = OpenWeatherClient::new("KEY").unwrap().with_lang("ru");
        let query = client.weather_query(Coordinates { lat: 55.75, lon: 37.62 });

        assert!(query.contains(&("lat", "55.75".to_string())));
        assert!(query.contains(&("lon", "37.62".to_string())));
        assert!(query.contains(&("units", "metric".to_string())));
        assert!(query.contains(&("lang", "ru".to_string())));
    }

    #[test]
    fn from_config_requires_api_key() {
        let cfg = Config::default();
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let err = OpenWeatherClient::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }
}
