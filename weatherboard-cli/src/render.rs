use chrono::{DateTime, FixedOffset};
use std::fmt::Write as _;
use std::io::Write;
use tracing::warn;

use weatherboard_core::{
    CurrentWeather, ForecastDay, Renderer,
    model::icon_url,
};

/// Multi-line card for the current conditions.
pub fn current_card(w: &CurrentWeather) -> String {
    let mut out = String::new();
    let d = &w.details;
    let t = &w.temperature;

    let _ = writeln!(
        out,
        "{}, {}  ({})",
        w.location.city, w.location.country, w.conditions.description
    );
    if w.demo {
        let _ = writeln!(out, "  [demo data, live weather unavailable]");
    }
    let _ = writeln!(out, "  Updated: {}", w.observed_at.format("%H:%M"));
    let _ = writeln!(out);
    let _ = writeln!(out, "  {}°C   feels like {}°C", t.current, t.feels_like);
    let _ = writeln!(out, "  Min {}°C   Max {}°C", t.min, t.max);
    let _ = writeln!(
        out,
        "  Humidity {}%   Wind {:.1} m/s {}   Pressure {} mmHg",
        d.humidity, d.wind_speed_mps, d.wind_direction, d.pressure_mmhg
    );
    let visibility = match d.visibility_km {
        Some(km) => format!("{km:.1} km"),
        None => "n/a".to_string(),
    };
    let _ = writeln!(
        out,
        "  Visibility {}   Sunrise {}   Sunset {}",
        visibility,
        w.sunrise.format("%H:%M"),
        w.sunset.format("%H:%M")
    );
    if !w.conditions.icon.is_empty() {
        let _ = writeln!(out, "  {}", icon_url(&w.conditions.icon, true));
    }
    out
}

/// One line per day; the first day is labelled "Today".
pub fn forecast_strip(days: &[ForecastDay]) -> String {
    let mut out = String::from("5-day forecast\n");
    for (i, day) in days.iter().enumerate() {
        let label = if i == 0 {
            format!("Today, {}", day.date_label)
        } else if day.weekday_label == "Tomorrow" {
            day.weekday_label.clone()
        } else {
            format!("{}, {}", day.weekday_label, day.date_label)
        };
        let _ = writeln!(
            out,
            "  {:<18} {:>4}°C  {:<20} {}",
            label, day.temperature, day.condition, day.icon
        );
    }
    out
}

pub fn error_box(message: &str) -> String {
    let width = message.chars().count() + 4;
    let rule = "-".repeat(width);
    format!("+{rule}+\n|  {message}  |\n+{rule}+\n")
}

/// Renders the dashboard as plain text into any writer.
#[derive(Debug)]
pub struct TerminalRenderer<W: Write> {
    out: W,
    error: Option<String>,
    query: String,
    locating: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            error: None,
            query: String::new(),
            locating: false,
        }
    }

    /// Message of the error currently on screen, if any.
    pub fn pending_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Contents of the search field.
    pub fn query(&self) -> &str {
        &self.query
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("Failed to write to terminal: {e}");
        }
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn show_loading(&mut self) {
        self.emit("Loading weather data...\n");
    }

    fn render_current(&mut self, weather: &CurrentWeather) {
        let card = current_card(weather);
        self.emit(&format!("\n{card}"));
    }

    fn render_forecast(&mut self, days: &[ForecastDay]) {
        let strip = forecast_strip(days);
        self.emit(&format!("\n{strip}"));
    }

    fn forecast_unavailable(&mut self) {
        self.emit("\nForecast temporarily unavailable\n");
    }

    fn show_error(&mut self, message: &str) {
        self.error = Some(message.to_string());
        self.emit(&error_box(message));
    }

    fn hide_error(&mut self) {
        self.error = None;
    }

    fn show_updated(&mut self, at: DateTime<FixedOffset>) {
        self.emit(&format!("Last updated: {}\n", at.format("%Y-%m-%d %H:%M:%S")));
    }

    fn set_locating(&mut self, busy: bool) {
        if busy && !self.locating {
            self.emit("Determining your location...\n");
        }
        self.locating = busy;
    }

    fn set_query(&mut self, city: &str) {
        self.query = city.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weatherboard_core::demo;

    fn at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2024-05-01T12:00:00+03:00").unwrap()
    }

    #[test]
    fn card_shows_demo_banner_and_units() {
        let w = demo::current("Moscow", at());
        let card = current_card(&w);

        assert!(card.starts_with("Moscow, --  (demo mode)"));
        assert!(card.contains("[demo data"));
        assert!(card.contains("Pressure 750 mmHg"));
        assert!(card.contains("Sunrise 06:00"));
        assert!(card.contains("Sunset 18:00"));
        assert!(card.contains("01d@4x.png"));
    }

    #[test]
    fn card_without_visibility_says_na() {
        let mut w = demo::current("Oslo", at());
        w.details.visibility_km = None;
        assert!(current_card(&w).contains("Visibility n/a"));
    }

    #[test]
    fn strip_labels_first_day_today() {
        let mut days = demo::forecast(at());
        days[0].weekday_label = "Wed".into();
        days[1].weekday_label = "Thu".into();

        let strip = forecast_strip(&days);
        let lines: Vec<_> = strip.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[1].trim_start().starts_with("Today, 1 May"));
        assert!(lines[2].trim_start().starts_with("Thu, 2 May"));
    }

    #[test]
    fn error_box_frames_message() {
        assert_eq!(error_box("oops"), "+--------+\n|  oops  |\n+--------+\n");
    }

    #[test]
    fn errors_stay_pending_until_hidden() {
        let mut r = TerminalRenderer::new(Vec::new());
        r.show_error("City not found. Check the spelling.");
        assert_eq!(r.pending_error(), Some("City not found. Check the spelling."));

        r.hide_error();
        assert_eq!(r.pending_error(), None);

        let text = String::from_utf8(r.into_inner()).unwrap();
        assert!(text.contains("City not found"));
    }

    #[test]
    fn query_and_locating_state() {
        let mut r = TerminalRenderer::new(Vec::new());
        r.set_locating(true);
        assert!(r.locating);
        r.set_query("Kazan");
        r.set_locating(false);
        assert!(!r.locating);
        assert_eq!(r.query(), "Kazan");
    }

    #[test]
    fn unavailable_forecast_message() {
        let mut r = TerminalRenderer::new(Vec::new());
        r.forecast_unavailable();
        let text = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(text.trim(), "Forecast temporarily unavailable");
    }
}
