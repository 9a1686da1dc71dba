//! Placeholder data shown when a request fails.

use chrono::{DateTime, Duration, FixedOffset};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::format::{CompassPoint, FORECAST_DAYS, date_label};
use crate::model::{
    Conditions, CurrentWeather, Details, ForecastDay, LocationInfo, Temperature,
};

pub const DEMO_DESCRIPTION: &str = "demo mode";

const DEMO_CONDITIONS: [&str; FORECAST_DAYS] =
    ["Sunny", "Cloudy", "Light rain", "Overcast", "Clear"];

/// Demo values vary per city and per minute but stay stable within one.
fn demo_rng(city: &str, now: &DateTime<FixedOffset>) -> StdRng {
    let mut hasher = DefaultHasher::new();
    city.hash(&mut hasher);
    (now.timestamp() / 60).hash(&mut hasher);
    StdRng::seed_from_u64(hasher.finish())
}

/// Made-up current conditions for `city`, flagged with `demo = true`.
pub fn current(city: &str, now: DateTime<FixedOffset>) -> CurrentWeather {
    let mut rng = demo_rng(city, &now);

    CurrentWeather {
        location: LocationInfo {
            city: city.to_string(),
            country: "--".to_string(),
        },
        temperature: Temperature {
            current: rng.gen_range(10..20),
            feels_like: rng.gen_range(8..16),
            min: rng.gen_range(5..10),
            max: rng.gen_range(15..20),
        },
        conditions: Conditions {
            main: "Clear".to_string(),
            description: DEMO_DESCRIPTION.to_string(),
            icon: "01d".to_string(),
        },
        details: Details {
            humidity: rng.gen_range(50..80),
            pressure_mmhg: 750,
            wind_direction: CompassPoint::N,
            wind_speed_mps: f64::from(rng.gen_range(2..7)),
            visibility_km: Some(f64::from(rng.gen_range(50..150)) / 10.0),
            clouds: 0,
        },
        sunrise: now - Duration::hours(6),
        sunset: now + Duration::hours(6),
        observed_at: now,
        demo: true,
    }
}

/// Five made-up days starting at `now`, labelled Today, Tomorrow, then weekdays.
pub fn forecast(now: DateTime<FixedOffset>) -> Vec<ForecastDay> {
    let mut rng = demo_rng("forecast", &now);

    DEMO_CONDITIONS
        .iter()
        .enumerate()
        .map(|(i, condition)| {
            let date = now + Duration::days(i as i64);
            let weekday_label = match i {
                0 => "Today".to_string(),
                1 => "Tomorrow".to_string(),
                _ => date.format("%a").to_string(),
            };
            ForecastDay {
                date,
                date_label: date_label(&date),
                weekday_label,
                temperature: rng.gen_range(10..20),
                condition: condition.to_string(),
                icon: if i % 2 == 0 { "01d" } else { "03d" }.to_string(),
            }
        })
        .collect()
}
