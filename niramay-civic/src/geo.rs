use std::time::Duration;

use niramay::config::GeocodingConfig;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::Deserialize;

/// Turns a coordinate into a human readable address. Never fails: callers
/// always get at least the coordinate label.
#[async_trait::async_trait]
pub trait Geocoder: Sync + Send {
    async fn reverse(&self, latitude: f64, longitude: f64) -> String;
}

pub fn coordinates_label(latitude: f64, longitude: f64) -> String {
    format!("{}, {}", latitude, longitude)
}

/// Used when no endpoint is configured.
pub struct CoordinateGeocoder;

#[async_trait::async_trait]
impl Geocoder for CoordinateGeocoder {
    async fn reverse(&self, latitude: f64, longitude: f64) -> String {
        coordinates_label(latitude, longitude)
    }
}

#[derive(Debug, Deserialize)]
struct ReverseGeocodeReply {
    #[serde(default)]
    display_name: Option<String>,
}

/// Client for a `reverse-geocode-client` style endpoint answering
/// `?latitude=..&longitude=..` with a JSON `display_name`.
pub struct HttpGeocoder {
    client: ClientWithMiddleware,
    endpoint: String,
}

impl HttpGeocoder {
    pub fn new(endpoint: &str, timeout: Duration) -> niramay::Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                niramay::Error::Config(
                    anyhow::Error::new(e)
                        .context("failed to build geocoding client"),
                )
            })?;
        let client = ClientBuilder::new(inner)
            .with(
                TracingMiddleware::<reqwest_tracing::DefaultSpanBackend>::default(),
            )
            .build();
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    async fn lookup(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> anyhow::Result<Option<String>> {
        let reply: ReverseGeocodeReply = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("localityLanguage", "en".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(reply.display_name.filter(|name| !name.trim().is_empty()))
    }
}

#[async_trait::async_trait]
impl Geocoder for HttpGeocoder {
    #[tracing::instrument(skip(self))]
    async fn reverse(&self, latitude: f64, longitude: f64) -> String {
        match self.lookup(latitude, longitude).await {
            Ok(Some(name)) => name,
            Ok(None) => coordinates_label(latitude, longitude),
            Err(e) => {
                tracing::warn!("reverse geocoding failed: {:#}", e);
                coordinates_label(latitude, longitude)
            }
        }
    }
}

/// Picks the geocoder matching the configuration.
pub fn from_config(
    config: &GeocodingConfig,
) -> niramay::Result<std::sync::Arc<dyn Geocoder>> {
    match &config.endpoint {
        Some(endpoint) => Ok(std::sync::Arc::new(HttpGeocoder::new(
            endpoint,
            Duration::from_millis(config.timeout_ms),
        )?)),
        None => Ok(std::sync::Arc::new(CoordinateGeocoder)),
    }
}
