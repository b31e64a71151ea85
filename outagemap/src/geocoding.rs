//! Reverse geocoding: coordinates to a human readable place name

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Debug;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{GeocoderKind, GeocodingConfig};
use crate::geo::{Coordinates, format_coordinates};

/// Error type for reverse geocoding
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding service returned HTTP {0}")]
    Status(u16),

    #[error("No place name for {0}")]
    NoResult(String),

    #[error("Geocoding disabled")]
    Disabled,
}

/// Reverse geocoder. Implementations may fail; callers use
/// [`resolve_location_name`] to get the coordinate fallback.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn reverse_geocode(&self, point: &Coordinates) -> Result<String, GeocodeError>;
}

/// Upper bound on a whole lookup, chained providers included
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Place name for `point`, or "lat, lng" with 4 decimals when none can be
/// found within `timeout`
pub async fn resolve_location_name(
    geocoder: &dyn Geocoder,
    point: &Coordinates,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, geocoder.reverse_geocode(point)).await {
        Ok(Ok(name)) => name,
        Ok(Err(GeocodeError::Disabled)) => format_coordinates(point),
        Ok(Err(e)) => {
            warn!(%point, "Reverse geocoding failed, using coordinates: {}", e);
            format_coordinates(point)
        }
        Err(_) => {
            warn!(%point, ?timeout, "Reverse geocoding timed out, using coordinates");
            format_coordinates(point)
        }
    }
}

fn http_client(config: &GeocodingConfig) -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_millis(config.timeout_ms))
        .user_agent(config.user_agent.clone())
        .build()?)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BigDataCloudResponse {
    #[serde(default)]
    locality: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    principal_subdivision: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
}

/// Join locality, city (when different), subdivision and country
fn format_bigdatacloud(data: &BigDataCloudResponse) -> Option<String> {
    let non_empty: fn(&Option<String>) -> Option<&str> = |s| s.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let locality = non_empty(&data.locality);
    let mut parts: Vec<&str> = Vec::new();
    parts.extend(locality);
    if let Some(city) = non_empty(&data.city)
        && Some(city) != locality
    {
        parts.push(city);
    }
    parts.extend(non_empty(&data.principal_subdivision));
    parts.extend(non_empty(&data.country_name));

    (!parts.is_empty()).then(|| parts.join(", "))
}

/// BigDataCloud client-side reverse geocoding (no API key)
#[derive(Debug, Clone)]
pub struct BigDataCloudGeocoder {
    client: reqwest::Client,
    url: String,
    language: String,
}

impl BigDataCloudGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: http_client(config)?,
            url: config.bigdatacloud_url.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for BigDataCloudGeocoder {
    async fn reverse_geocode(&self, point: &Coordinates) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("latitude", point.latitude.to_string()),
                ("longitude", point.longitude.to_string()),
                ("localityLanguage", self.language.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let data: BigDataCloudResponse = response.json().await?;
        format_bigdatacloud(&data).ok_or_else(|| GeocodeError::NoResult(point.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    road: Option<String>,
    neighbourhood: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

/// Road, neighbourhood, settlement and state; else the full display name
fn format_nominatim(data: &NominatimResponse) -> Option<String> {
    let display_name = data.display_name.as_deref().filter(|s| !s.trim().is_empty())?;

    let parts: Vec<&str> = match &data.address {
        Some(address) => [
            address.road.as_deref(),
            address.neighbourhood.as_deref().or(address.suburb.as_deref()),
            address
                .city
                .as_deref()
                .or(address.town.as_deref())
                .or(address.village.as_deref()),
            address.state.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect(),
        None => Vec::new(),
    };

    if parts.is_empty() {
        Some(display_name.to_string())
    } else {
        Some(parts.join(", "))
    }
}

/// OpenStreetMap Nominatim reverse geocoding
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    url: String,
    language: String,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodeError> {
        Ok(Self {
            client: http_client(config)?,
            url: config.nominatim_url.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse_geocode(&self, point: &Coordinates) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("format", "json".to_string()),
                ("lat", point.latitude.to_string()),
                ("lon", point.longitude.to_string()),
                ("zoom", "18".to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", self.language.clone()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let data: NominatimResponse = response.json().await?;
        format_nominatim(&data).ok_or_else(|| GeocodeError::NoResult(point.to_string()))
    }
}

/// Tries each geocoder in order; the first success wins
#[derive(Debug, Default)]
pub struct ChainGeocoder {
    geocoders: Vec<Box<dyn Geocoder>>,
}

impl ChainGeocoder {
    pub fn new(geocoders: Vec<Box<dyn Geocoder>>) -> Self {
        Self { geocoders }
    }

    pub fn push(&mut self, geocoder: Box<dyn Geocoder>) {
        self.geocoders.push(geocoder);
    }

    pub fn len(&self) -> usize {
        self.geocoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geocoders.is_empty()
    }
}

#[async_trait]
impl Geocoder for ChainGeocoder {
    async fn reverse_geocode(&self, point: &Coordinates) -> Result<String, GeocodeError> {
        let mut last_error = GeocodeError::Disabled;
        for geocoder in &self.geocoders {
            match geocoder.reverse_geocode(point).await {
                Ok(name) => return Ok(name),
                Err(e) => {
                    debug!(?geocoder, "Geocoder failed, trying next: {}", e);
                    last_error = e;
                }
            }
        }
        Err(last_error)
    }
}

/// Never resolves anything; names fall back to coordinates
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGeocoder;

#[async_trait]
impl Geocoder for NoopGeocoder {
    async fn reverse_geocode(&self, _point: &Coordinates) -> Result<String, GeocodeError> {
        Err(GeocodeError::Disabled)
    }
}

/// Build the geocoder described by the configuration
pub fn create_geocoder(config: &GeocodingConfig) -> Result<Box<dyn Geocoder>, GeocodeError> {
    if !config.enabled || config.providers.is_empty() {
        return Ok(Box::new(NoopGeocoder));
    }

    let mut chain = ChainGeocoder::default();
    for kind in &config.providers {
        match kind {
            GeocoderKind::BigDataCloud => chain.push(Box::new(BigDataCloudGeocoder::new(config)?)),
            GeocoderKind::Nominatim => chain.push(Box::new(NominatimGeocoder::new(config)?)),
        }
    }
    Ok(Box::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl Geocoder for Fixed {
        async fn reverse_geocode(&self, point: &Coordinates) -> Result<String, GeocodeError> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| GeocodeError::NoResult(point.to_string()))
        }
    }

    #[test]
    fn test_bigdatacloud_format() {
        let data = BigDataCloudResponse {
            locality: Some("Barrio Escalante".into()),
            city: Some("San José".into()),
            principal_subdivision: Some("Provincia de San José".into()),
            country_name: Some("Costa Rica".into()),
        };
        assert_eq!(
            format_bigdatacloud(&data).as_deref(),
            Some("Barrio Escalante, San José, Provincia de San José, Costa Rica")
        );

        let same_city = BigDataCloudResponse {
            locality: Some("Cartago".into()),
            city: Some("Cartago".into()),
            ..Default::default()
        };
        assert_eq!(format_bigdatacloud(&same_city).as_deref(), Some("Cartago"));
        assert!(format_bigdatacloud(&BigDataCloudResponse::default()).is_none());
    }

    #[test]
    fn test_nominatim_format() {
        let data: NominatimResponse = serde_json::from_value(serde_json::json!({
            "display_name": "Avenida 2, Carmen, San José, 10104, Costa Rica",
            "address": {
                "road": "Avenida 2",
                "suburb": "Carmen",
                "city": "San José",
                "state": "Provincia de San José"
            }
        }))
        .unwrap();
        assert_eq!(
            format_nominatim(&data).as_deref(),
            Some("Avenida 2, Carmen, San José, Provincia de San José")
        );

        let bare: NominatimResponse =
            serde_json::from_value(serde_json::json!({ "display_name": "Somewhere" })).unwrap();
        assert_eq!(format_nominatim(&bare).as_deref(), Some("Somewhere"));
    }

    #[tokio::test]
    async fn test_chain_uses_first_success() {
        let chain = ChainGeocoder::new(vec![
            Box::new(Fixed(None)),
            Box::new(Fixed(Some("Heredia"))),
            Box::new(Fixed(Some("Alajuela"))),
        ]);
        let name = chain
            .reverse_geocode(&Coordinates::new(10.0, -84.1))
            .await
            .unwrap();
        assert_eq!(name, "Heredia");
    }

    #[tokio::test]
    async fn test_fallback_to_coordinates() {
        let point = Coordinates::new(9.93456, -84.07891);
        let name = resolve_location_name(&NoopGeocoder, &point, DEFAULT_GEOCODE_TIMEOUT).await;
        assert_eq!(name, "9.9346, -84.0789");

        let chain = ChainGeocoder::new(vec![Box::new(Fixed(None))]);
        let name = resolve_location_name(&chain, &point, DEFAULT_GEOCODE_TIMEOUT).await;
        assert_eq!(name, "9.9346, -84.0789");
    }

    #[derive(Debug)]
    struct Stalled;

    #[async_trait]
    impl Geocoder for Stalled {
        async fn reverse_geocode(&self, _point: &Coordinates) -> Result<String, GeocodeError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_geocoder_times_out() {
        let point = Coordinates::new(9.93456, -84.07891);
        let chain = ChainGeocoder::new(vec![Box::new(Stalled), Box::new(Fixed(Some("Heredia")))]);

        let name = resolve_location_name(&chain, &point, Duration::from_millis(250)).await;
        assert_eq!(name, "9.9346, -84.0789");
    }

    #[test]
    fn test_disabled_config_builds_noop() {
        let config = GeocodingConfig {
            enabled: false,
            ..GeocodingConfig::default()
        };
        assert!(create_geocoder(&config).is_ok());
    }
}
