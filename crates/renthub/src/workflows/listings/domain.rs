use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, Property};
use crate::workflows::access::Viewer;

/// Landlord input for a new listing. Price arrives as typed text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub address: String,
    pub price: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Owner edits; address and coordinates are fixed once published.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyEdit {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingScope {
    #[default]
    Browse,
    Mine,
}

/// Whether `viewer` sees `property` in the given list.
pub fn is_visible(property: &Property, viewer: &Viewer, scope: ListingScope) -> bool {
    let owns = property.is_owned_by(&viewer.uid);
    match scope {
        ListingScope::Mine if viewer.is_landlord() => owns,
        _ => property.listed || (viewer.is_landlord() && owns),
    }
}

/// Keeps digits and dots, then parses the leading decimal; unparsable input is zero.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let mut parts = cleaned.splitn(3, '.');
    let whole = parts.next().unwrap_or_default();
    let candidate = match parts.next() {
        Some(fraction) => format!("{whole}.{fraction}"),
        None => whole.to_string(),
    };
    candidate.parse().unwrap_or(0.0)
}

const LATITUDE_DELTA: f64 = 0.0922;
const LONGITUDE_DELTA: f64 = 0.0421;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

/// Single-marker map view for a property.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub region: MapRegion,
    pub coordinate: GeoPoint,
    pub title: String,
    pub description: String,
}

impl MapMarker {
    pub fn for_property(property: &Property) -> Self {
        let coordinate = property.location;
        let title = if property.title.trim().is_empty() {
            "Property Location".to_string()
        } else {
            property.title.clone()
        };

        Self {
            region: MapRegion {
                latitude: coordinate.latitude,
                longitude: coordinate.longitude,
                latitude_delta: LATITUDE_DELTA,
                longitude_delta: LONGITUDE_DELTA,
            },
            coordinate,
            title,
            description: property.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyDetail {
    pub property: Property,
    pub is_owner: bool,
    pub map: MapMarker,
}
