//! Address autocomplete against an external geocoding API.

mod autocomplete;
mod geoapify;

pub use autocomplete::{AutocompleteSession, MIN_QUERY_CHARS};
pub use geoapify::GeoapifyGeocoder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::GeoPoint;

/// One candidate address returned for a partial input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSuggestion {
    pub place_id: String,
    pub formatted: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl AddressSuggestion {
    pub fn location(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn autocomplete(&self, text: &str) -> Result<Vec<AddressSuggestion>, GeocodingError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodingError {
    #[error("geocoding is disabled: GEOAPIFY_API_KEY is not set")]
    Disabled,
    #[error("geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),
}
