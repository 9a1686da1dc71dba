//! View controller: owns the selected place, turns user events into
//! requests, and pushes the results (or placeholders) to a [`Renderer`].

use chrono::{DateTime, FixedOffset, Local};
use tracing::{info, warn};

use crate::{
    demo,
    error::{MSG_COORDS_FAILED, MSG_FORECAST_FAILED},
    locate::Locator,
    model::{CurrentWeather, ForecastDay, Place},
    source::WeatherSource,
};

pub const MSG_EMPTY_QUERY: &str = "Please enter a city name";

/// Rendering target for the dashboard.
pub trait Renderer {
    fn show_loading(&mut self);

    fn render_current(&mut self, weather: &CurrentWeather);

    /// Called with a non-empty list.
    fn render_forecast(&mut self, days: &[ForecastDay]);

    fn forecast_unavailable(&mut self);

    fn show_error(&mut self, message: &str);

    fn hide_error(&mut self);

    fn show_updated(&mut self, at: DateTime<FixedOffset>);

    /// Geolocation in progress.
    fn set_locating(&mut self, _busy: bool) {}

    /// Mirror the selected city into the search field.
    fn set_query(&mut self, _city: &str) {}
}

/// User actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Free-text search as typed.
    Search(String),
    /// One of the preset city shortcuts.
    QuickPick(String),
    Geolocate,
    Refresh,
    DismissError,
}

#[derive(Debug)]
pub struct Dashboard<S, R, L> {
    source: S,
    renderer: R,
    locator: L,
    current_city: String,
}

impl<S, R, L> Dashboard<S, R, L>
where
    S: WeatherSource,
    R: Renderer,
    L: Locator,
{
    pub fn new(source: S, renderer: R, locator: L, initial_city: impl Into<String>) -> Self {
        Self {
            source,
            renderer,
            locator,
            current_city: initial_city.into(),
        }
    }

    pub fn current_city(&self) -> &str {
        &self.current_city
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Initial load for the starting city.
    pub async fn start(&mut self) {
        self.load().await;
    }

    pub async fn handle(&mut self, event: Event) {
        info!(?event, city = %self.current_city, "dashboard event");

        match event {
            Event::Search(text) => self.search(&text).await,
            Event::QuickPick(city) => {
                self.renderer.set_query(&city);
                self.search(&city).await;
            }
            Event::Geolocate => self.geolocate().await,
            Event::Refresh => self.load().await,
            Event::DismissError => self.renderer.hide_error(),
        }
    }

    async fn search(&mut self, text: &str) {
        let city = text.trim();
        if city.is_empty() {
            self.renderer.show_error(MSG_EMPTY_QUERY);
            return;
        }

        self.current_city = city.to_string();
        self.load().await;
    }

    async fn load(&mut self) {
        self.update_current().await;
        self.update_forecast().await;
    }

    async fn update_current(&mut self) {
        self.renderer.show_loading();

        let place = Place::City(self.current_city.clone());
        match self.source.current(&place).await {
            Ok(weather) => {
                self.renderer.render_current(&weather);
                self.renderer.show_updated(now());
            }
            Err(e) => {
                warn!("Current weather for {place} failed: {e}");
                self.renderer.show_error(e.user_message());
                self.renderer
                    .render_current(&demo::current(&self.current_city, now()));
            }
        }
    }

    async fn update_forecast(&mut self) {
        let place = Place::City(self.current_city.clone());
        match self.source.forecast(&place).await {
            Ok(days) if days.is_empty() => self.renderer.forecast_unavailable(),
            Ok(days) => self.renderer.render_forecast(&days),
            Err(e) => {
                warn!("Forecast for {place} failed: {e}");
                self.renderer.show_error(MSG_FORECAST_FAILED);
                self.renderer.render_forecast(&demo::forecast(now()));
            }
        }
    }

    async fn geolocate(&mut self) {
        self.renderer.set_locating(true);

        match self.locator.locate().await {
            Err(e) => {
                warn!("Geolocation failed: {e}");
                self.renderer.show_error(e.user_message());
            }
            Ok(coords) => match self.source.current(&Place::Coords(coords)).await {
                Ok(weather) => {
                    self.current_city = weather.location.city.clone();
                    self.renderer.set_query(&self.current_city);
                    self.load().await;
                }
                Err(e) => {
                    warn!("Weather for {coords} failed: {e}");
                    self.renderer.show_error(MSG_COORDS_FAILED);
                }
            },
        }

        self.renderer.set_locating(false);
    }
}

fn now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}
