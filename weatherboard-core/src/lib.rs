//! Core library for the `weatherboard` dashboard.
//!
//! This crate defines:
//! - The OpenWeather client (geocoding, current weather, 5-day forecast)
//! - Pure formatting: unit conversion, compass bearings, daily aggregation
//! - The dashboard controller and the `Renderer` seam it draws through
//! - Configuration handling
//!
//! It is used by `weatherboard-cli`, but the controller works with any renderer.

pub mod config;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod format;
pub mod locate;
pub mod model;
pub mod source;
pub mod wire;

pub use config::{Config, Endpoints};
pub use dashboard::{Dashboard, Event, Renderer};
pub use error::{LocationError, WeatherError};
pub use locate::{FixedLocator, IpLocator, Locator, NoLocator};
pub use model::{Coordinates, CurrentWeather, ForecastDay, Place};
pub use source::{OpenWeatherClient, WeatherSource};
