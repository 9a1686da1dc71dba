use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{CurrentWeather, ForecastDay, Place},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Where the dashboard gets its data from.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn current(&self, place: &Place) -> Result<CurrentWeather, WeatherError>;

    /// Daily summaries, at most [`crate::format::FORECAST_DAYS`].
    async fn forecast(&self, place: &Place) -> Result<Vec<ForecastDay>, WeatherError>;
}
