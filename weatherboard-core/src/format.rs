//! Pure conversions from OpenWeather payloads into view models.

use chrono::{DateTime, FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{
    Conditions, CurrentWeather, Details, ForecastDay, LocationInfo, Temperature,
};
use crate::wire::{OwCurrentResponse, OwForecastEntry};

/// Number of daily summaries produced from the 3-hour feed.
pub const FORECAST_DAYS: usize = 5;

const HPA_TO_MMHG: f64 = 0.750062;
const UNKNOWN_CONDITION: &str = "Unknown";

/// 8-point compass bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassPoint {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl CompassPoint {
    const ALL: [CompassPoint; 8] = [
        CompassPoint::N,
        CompassPoint::NE,
        CompassPoint::E,
        CompassPoint::SE,
        CompassPoint::S,
        CompassPoint::SW,
        CompassPoint::W,
        CompassPoint::NW,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompassPoint::N => "N",
            CompassPoint::NE => "NE",
            CompassPoint::E => "E",
            CompassPoint::SE => "SE",
            CompassPoint::S => "S",
            CompassPoint::SW => "SW",
            CompassPoint::W => "W",
            CompassPoint::NW => "NW",
        }
    }
}

impl fmt::Display for CompassPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2`.
pub fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

pub fn hpa_to_mmhg(hpa: f64) -> i32 {
    round_half_up(hpa * HPA_TO_MMHG)
}

/// Maps a meteorological wind bearing to the nearest of 8 compass points.
pub fn wind_direction(degrees: f64) -> CompassPoint {
    let index = i64::from(round_half_up(degrees / 45.0)).rem_euclid(8);
    CompassPoint::ALL[index as usize]
}

/// Meters to kilometers, one decimal place.
pub fn visibility_km(meters: u32) -> f64 {
    (f64::from(meters) / 100.0).round() / 10.0
}

/// Builds a fixed offset from OpenWeather's `timezone` shift; out-of-range values fall back to UTC.
pub fn offset_from_seconds(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

pub fn local_time(unix: i64, offset: FixedOffset) -> DateTime<FixedOffset> {
    DateTime::from_timestamp(unix, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
}

/// "1 May"
pub fn date_label(date: &DateTime<FixedOffset>) -> String {
    date.format("%-d %B").to_string()
}

/// "Wed"
pub fn weekday_label(date: &DateTime<FixedOffset>) -> String {
    date.format("%a").to_string()
}

pub fn format_current(raw: &OwCurrentResponse, location: LocationInfo) -> CurrentWeather {
    let offset = offset_from_seconds(raw.timezone);

    let conditions = raw
        .weather
        .first()
        .map(|w| Conditions {
            main: w.main.clone(),
            description: w.description.clone(),
            icon: w.icon.clone(),
        })
        .unwrap_or_else(|| Conditions {
            main: UNKNOWN_CONDITION.to_string(),
            description: UNKNOWN_CONDITION.to_string(),
            icon: String::new(),
        });

    CurrentWeather {
        location,
        temperature: Temperature {
            current: round_half_up(raw.main.temp),
            feels_like: round_half_up(raw.main.feels_like),
            min: round_half_up(raw.main.temp_min),
            max: round_half_up(raw.main.temp_max),
        },
        conditions,
        details: Details {
            humidity: raw.main.humidity,
            pressure_mmhg: hpa_to_mmhg(raw.main.pressure),
            wind_direction: wind_direction(raw.wind.deg),
            wind_speed_mps: raw.wind.speed,
            visibility_km: raw.visibility.map(visibility_km),
            clouds: raw.clouds.all,
        },
        sunrise: local_time(raw.sys.sunrise, offset),
        sunset: local_time(raw.sys.sunset, offset),
        observed_at: local_time(raw.dt, offset),
        demo: false,
    }
}

/// Most frequent item. On a tie the item that first appeared later wins.
pub fn most_common<'a, I>(items: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(seen, _)| *seen == item) {
            Some((_, n)) => *n += 1,
            None => counts.push((item, 1)),
        }
    }

    counts
        .into_iter()
        .reduce(|best, next| if best.1 > next.1 { best } else { next })
        .map(|(item, _)| item)
}

struct DayGroup<'a> {
    first: DateTime<FixedOffset>,
    samples: Vec<(DateTime<FixedOffset>, &'a OwForecastEntry)>,
}

/// Collapses the 3-hour feed into at most [`FORECAST_DAYS`] daily summaries,
/// grouping samples by calendar date in `offset`.
pub fn aggregate_daily(entries: &[OwForecastEntry], offset: FixedOffset) -> Vec<ForecastDay> {
    let mut groups: Vec<DayGroup<'_>> = Vec::new();

    for entry in entries {
        let at = local_time(entry.dt, offset);
        match groups
            .iter_mut()
            .find(|g| g.first.date_naive() == at.date_naive())
        {
            Some(group) => group.samples.push((at, entry)),
            None => groups.push(DayGroup {
                first: at,
                samples: vec![(at, entry)],
            }),
        }
    }

    groups
        .iter()
        .take(FORECAST_DAYS)
        .map(summarize_day)
        .collect()
}

fn summarize_day(group: &DayGroup<'_>) -> ForecastDay {
    let temps: Vec<f64> = group.samples.iter().map(|(_, e)| e.main.temp).collect();
    let mean = temps.iter().sum::<f64>() / temps.len() as f64;

    let condition = most_common(group.samples.iter().map(|(_, e)| condition_of(e)))
        .unwrap_or(UNKNOWN_CONDITION)
        .to_string();

    let icon = group
        .samples
        .iter()
        .find(|(at, _)| (11..=13).contains(&at.hour()))
        .or_else(|| group.samples.first())
        .map(|(_, e)| icon_of(e).to_string())
        .unwrap_or_default();

    ForecastDay {
        date: group.first,
        date_label: date_label(&group.first),
        weekday_label: weekday_label(&group.first),
        temperature: round_half_up(mean),
        condition,
        icon,
    }
}

fn condition_of(entry: &OwForecastEntry) -> &str {
    entry
        .weather
        .first()
        .map(|w| w.description.as_str())
        .unwrap_or(UNKNOWN_CONDITION)
}

fn icon_of(entry: &OwForecastEntry) -> &str {
    entry.weather.first().map(|w| w.icon.as_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{OwMain, OwWeather};

    // 2024-05-01T00:00:00Z, a Wednesday.
    const MAY_1: i64 = 1_714_521_600;
    const HOUR: i64 = 3600;

    fn entry(dt: i64, temp: f64, description: &str, icon: &str) -> OwForecastEntry {
        OwForecastEntry {
            dt,
            main: OwMain {
                temp,
                feels_like: temp,
                temp_min: temp,
                temp_max: temp,
                pressure: 1013.0,
                humidity: 50,
            },
            weather: vec![OwWeather {
                main: String::new(),
                description: description.to_string(),
                icon: icon.to_string(),
            }],
        }
    }

    fn utc() -> FixedOffset {
        offset_from_seconds(0)
    }

    #[test]
    fn wind_direction_buckets() {
        assert_eq!(wind_direction(0.0), CompassPoint::N);
        assert_eq!(wind_direction(22.4), CompassPoint::N);
        assert_eq!(wind_direction(22.5), CompassPoint::NE);
        assert_eq!(wind_direction(90.0), CompassPoint::E);
        assert_eq!(wind_direction(180.0), CompassPoint::S);
        assert_eq!(wind_direction(225.0), CompassPoint::SW);
        assert_eq!(wind_direction(315.0), CompassPoint::NW);
        assert_eq!(wind_direction(337.5), CompassPoint::N);
        assert_eq!(wind_direction(360.0), CompassPoint::N);
    }

    #[test]
    fn wind_direction_wraps_negative_and_large_bearings() {
        assert_eq!(wind_direction(-90.0), CompassPoint::W);
        assert_eq!(wind_direction(405.0), CompassPoint::NE);
    }

    #[test]
    fn pressure_conversion() {
        assert_eq!(hpa_to_mmhg(1013.0), 760);
        assert_eq!(hpa_to_mmhg(1000.0), 750);
        assert_eq!(hpa_to_mmhg(0.0), 0);
    }

    #[test]
    fn rounding_matches_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(-2.51), -3);
        assert_eq!(round_half_up(12.49), 12);
    }

    #[test]
    fn visibility_in_km() {
        assert_eq!(visibility_km(10_000), 10.0);
        assert_eq!(visibility_km(6_440), 6.4);
        assert_eq!(visibility_km(250), 0.3);
    }

    #[test]
    fn most_common_prefers_later_on_tie() {
        assert_eq!(most_common(["a", "b", "a"]), Some("a"));
        assert_eq!(most_common(["a", "b"]), Some("b"));
        assert_eq!(most_common(["a", "b", "b", "a"]), Some("b"));
        assert_eq!(most_common(Vec::<&str>::new()), None);
    }

    #[test]
    fn three_samples_for_one_day() {
        let entries = vec![
            entry(MAY_1 + 9 * HOUR, 10.0, "light rain", "10d"),
            entry(MAY_1 + 12 * HOUR, 14.0, "clear sky", "01d"),
            entry(MAY_1 + 15 * HOUR, 15.0, "light rain", "10d"),
        ];

        let days = aggregate_daily(&entries, utc());

        assert_eq!(days.len(), 1);
        let day = &days[0];
        assert_eq!(day.temperature, 13);
        assert_eq!(day.condition, "light rain");
        assert_eq!(day.icon, "01d");
        assert_eq!(day.date_label, "1 May");
        assert_eq!(day.weekday_label, "Wed");
    }

    #[test]
    fn icon_falls_back_to_first_sample_without_midday() {
        let entries = vec![
            entry(MAY_1 + 18 * HOUR, 8.0, "few clouds", "02n"),
            entry(MAY_1 + 21 * HOUR, 6.0, "few clouds", "02n"),
        ];

        let days = aggregate_daily(&entries, utc());
        assert_eq!(days[0].icon, "02n");
        assert_eq!(days[0].temperature, 7);
    }

    #[test]
    fn grouping_uses_the_city_offset() {
        // 22:00Z is already the next day at UTC+3.
        let entries = vec![
            entry(MAY_1 + 18 * HOUR, 10.0, "clear sky", "01n"),
            entry(MAY_1 + 22 * HOUR, 12.0, "clear sky", "01n"),
        ];

        assert_eq!(aggregate_daily(&entries, utc()).len(), 1);

        let days = aggregate_daily(&entries, offset_from_seconds(3 * 3600));
        assert_eq!(days.len(), 2);
        assert_eq!(days[1].date_label, "2 May");
        assert_eq!(days[1].weekday_label, "Thu");
    }

    #[test]
    fn feed_is_capped_at_five_days() {
        // 40 samples starting at noon span six calendar days.
        let entries: Vec<_> = (0..40)
            .map(|i| entry(MAY_1 + 12 * HOUR + i * 3 * HOUR, 5.0, "overcast clouds", "04d"))
            .collect();

        let days = aggregate_daily(&entries, utc());
        assert_eq!(days.len(), FORECAST_DAYS);
        assert_eq!(days[0].date_label, "1 May");
        assert_eq!(days[4].date_label, "5 May");
    }

    #[test]
    fn negative_mean_rounds_half_up() {
        let entries = vec![
            entry(MAY_1, -3.0, "snow", "13n"),
            entry(MAY_1 + 3 * HOUR, -2.0, "snow", "13n"),
        ];
        assert_eq!(aggregate_daily(&entries, utc())[0].temperature, -2);
    }

    #[test]
    fn empty_feed_gives_no_days() {
        assert!(aggregate_daily(&[], utc()).is_empty());
    }

    #[test]
    fn format_current_maps_all_fields() {
        let raw: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "name": "Moscow",
            "dt": MAY_1 + 12 * HOUR,
            "timezone": 10800,
            "main": {
                "temp": 12.5, "feels_like": 10.4, "temp_min": 9.6, "temp_max": 14.2,
                "pressure": 1013, "humidity": 81
            },
            "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}],
            "wind": {"speed": 4.1, "deg": 310},
            "clouds": {"all": 75},
            "visibility": 10000,
            "sys": {"country": "RU", "sunrise": MAY_1 + 2 * HOUR, "sunset": MAY_1 + 17 * HOUR}
        }))
        .unwrap();

        let location = LocationInfo {
            city: "Moscow".into(),
            country: "RU".into(),
        };
        let w = format_current(&raw, location);

        assert_eq!(w.temperature.current, 13);
        assert_eq!(w.temperature.feels_like, 10);
        assert_eq!(w.temperature.min, 10);
        assert_eq!(w.temperature.max, 14);
        assert_eq!(w.conditions.description, "light rain");
        assert_eq!(w.conditions.icon, "10d");
        assert_eq!(w.details.pressure_mmhg, 760);
        assert_eq!(w.details.wind_direction, CompassPoint::NW);
        assert_eq!(w.details.visibility_km, Some(10.0));
        assert_eq!(w.details.clouds, 75);
        assert_eq!(w.sunrise.format("%H:%M").to_string(), "05:00");
        assert_eq!(w.sunset.format("%H:%M").to_string(), "20:00");
        assert!(!w.demo);
    }

    #[test]
    fn format_current_without_weather_entries() {
        let raw: OwCurrentResponse = serde_json::from_value(serde_json::json!({
            "dt": MAY_1,
            "main": {"temp": 1.0, "feels_like": 1.0},
            "weather": []
        }))
        .unwrap();

        let w = format_current(
            &raw,
            LocationInfo {
                city: "X".into(),
                country: String::new(),
            },
        );
        assert_eq!(w.conditions.description, "Unknown");
        assert_eq!(w.details.visibility_km, None);
    }
}
