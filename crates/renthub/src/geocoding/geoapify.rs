use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{AddressSuggestion, Geocoder, GeocodingError};
use crate::config::GeocodingConfig;

/// Geoapify autocomplete client keyed with a static API key.
#[derive(Debug, Clone)]
pub struct GeoapifyGeocoder {
    client: Client,
    base_url: String,
    api_key: String,
    limit: u8,
}

impl GeoapifyGeocoder {
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        if config.api_key.trim().is_empty() {
            return Err(GeocodingError::Disabled);
        }

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            limit: config.limit,
        })
    }
}

#[async_trait]
impl Geocoder for GeoapifyGeocoder {
    async fn autocomplete(&self, text: &str) -> Result<Vec<AddressSuggestion>, GeocodingError> {
        let url = format!("{}/v1/geocode/autocomplete", self.base_url);
        let limit = self.limit.to_string();
        debug!(%text, "requesting address suggestions");

        let collection: FeatureCollection = self
            .client
            .get(url)
            .query(&[
                ("text", text),
                ("apiKey", self.api_key.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(collection.into_suggestions(usize::from(self.limit)))
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    place_id: Option<String>,
    formatted: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl FeatureCollection {
    // Features without an address or coordinates cannot be selected.
    fn into_suggestions(self, limit: usize) -> Vec<AddressSuggestion> {
        self.features
            .into_iter()
            .filter_map(|feature| {
                let FeatureProperties {
                    place_id,
                    formatted,
                    lat,
                    lon,
                } = feature.properties;
                let formatted = formatted?;
                Some(AddressSuggestion {
                    place_id: place_id.unwrap_or_else(|| formatted.clone()),
                    formatted,
                    latitude: lat?,
                    longitude: lon?,
                })
            })
            .take(limit)
            .collect()
    }
}
