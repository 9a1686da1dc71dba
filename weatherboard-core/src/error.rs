use reqwest::StatusCode;
use std::fmt;

/// Which remote call an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Geocoding,
    ReverseGeocoding,
    CurrentWeather,
    Forecast,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Geocoding => "geocoding",
            Stage::ReverseGeocoding => "reverse geocoding",
            Stage::CurrentWeather => "current weather",
            Stage::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the OpenWeather client.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{stage} request failed with status {status}: {body}")]
    Http {
        stage: Stage,
        status: StatusCode,
        body: String,
    },

    #[error("place not found: {0}")]
    PlaceNotFound(String),

    #[error("network error during {stage}: {source}")]
    Network {
        stage: Stage,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {stage} response: {source}")]
    Parse {
        stage: Stage,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
}

pub const MSG_NOT_FOUND: &str = "City not found. Check the spelling.";
pub const MSG_UNAUTHORIZED: &str = "Invalid API key. Check your settings.";
pub const MSG_RATE_LIMITED: &str = "Request limit exceeded. Try again later.";
pub const MSG_NETWORK: &str = "Connection problem. Check your internet connection.";
pub const MSG_GENERIC: &str = "Something went wrong while loading weather data.";

/// Shown when a lookup by coordinates fails, whatever the cause.
pub const MSG_COORDS_FAILED: &str = "Could not determine the weather for your location";
/// Shown when the forecast request fails, whatever the cause.
pub const MSG_FORECAST_FAILED: &str = "Could not load the weather forecast";

impl WeatherError {
    /// Fixed user-facing message for this error.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::PlaceNotFound(_) => MSG_NOT_FOUND,
            WeatherError::Http { status, .. } => match *status {
                StatusCode::NOT_FOUND => MSG_NOT_FOUND,
                StatusCode::UNAUTHORIZED => MSG_UNAUTHORIZED,
                StatusCode::TOO_MANY_REQUESTS => MSG_RATE_LIMITED,
                _ => MSG_GENERIC,
            },
            WeatherError::Network { .. } => MSG_NETWORK,
            WeatherError::Parse { .. } | WeatherError::ClientInit(_) => MSG_GENERIC,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WeatherError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors acquiring the device location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("geolocation is not supported")]
    Unsupported,
    #[error("geolocation permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
    #[error("location request timed out")]
    Timeout,
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Unsupported => "Geolocation is not supported on this system",
            LocationError::PermissionDenied => {
                "Access to geolocation was denied. Allow it in your settings."
            }
            LocationError::Unavailable(_) => "Location information is unavailable",
            LocationError::Timeout => "Timed out while determining your location",
        }
    }
}
