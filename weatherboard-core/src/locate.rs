//! Device location acquisition.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;

use crate::{error::LocationError, model::Coordinates};

const LOCATE_TIMEOUT_SECS: u64 = 10;

#[async_trait]
pub trait Locator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, LocationError>;
}

#[async_trait]
impl<T: Locator + ?Sized> Locator for Box<T> {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        (**self).locate().await
    }
}

/// No location source on this system.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocator;

#[async_trait]
impl Locator for NoLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unsupported)
    }
}

/// Coordinates given up front, e.g. on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

#[async_trait]
impl Locator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        Ok(self.0)
    }
}

/// Approximate location from the public IP address (ip-api.com).
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLocator {
    pub fn new(url: impl Into<String>) -> Result<Self, LocationError> {
        Self::with_timeout(url, Duration::from_secs(LOCATE_TIMEOUT_SECS))
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http,
        })
    }
}

#[async_trait]
impl Locator for IpLocator {
    async fn locate(&self) -> Result<Coordinates, LocationError> {
        let res = self
            .http
            .get(&self.url)
            .query(&[("fields", "status,message,lat,lon")])
            .send()
            .await
            .map_err(map_reqwest)?;

        if !res.status().is_success() {
            return Err(LocationError::Unavailable(format!("status {}", res.status())));
        }

        let body: IpApiResponse = res.json().await.map_err(map_reqwest)?;
        if body.status != "success" {
            let reason = body.message.unwrap_or_else(|| body.status.clone());
            return Err(LocationError::Unavailable(reason));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::debug!(lat, lon, "located by IP");
                Ok(Coordinates { lat, lon })
            }
            _ => Err(LocationError::Unavailable("response without coordinates".into())),
        }
    }
}

fn map_reqwest(e: reqwest::Error) -> LocationError {
    if e.is_timeout() {
        LocationError::Timeout
    } else {
        LocationError::Unavailable(e.to_string())
    }
}
