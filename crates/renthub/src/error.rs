use crate::config::ConfigError;
use crate::geocoding::GeocodingError;
use crate::telemetry::TelemetryError;
use crate::workflows::access::AccessError;
use crate::workflows::listings::ListingError;
use crate::workflows::requests::RequestError;
use crate::workflows::shortlist::ShortlistError;
use std::fmt;

/// Error surfaced by the binaries: startup failures plus any workflow error a
/// command chose to propagate.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Geocoding(GeocodingError),
    Access(AccessError),
    Listing(ListingError),
    Request(RequestError),
    Shortlist(ShortlistError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Geocoding(err) => write!(f, "geocoding error: {}", err),
            AppError::Access(err) => write!(f, "access error: {}", err),
            AppError::Listing(err) => write!(f, "listing error: {}", err),
            AppError::Request(err) => write!(f, "request error: {}", err),
            AppError::Shortlist(err) => write!(f, "shortlist error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Geocoding(err) => Some(err),
            AppError::Access(err) => Some(err),
            AppError::Listing(err) => Some(err),
            AppError::Request(err) => Some(err),
            AppError::Shortlist(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<GeocodingError> for AppError {
    fn from(value: GeocodingError) -> Self {
        Self::Geocoding(value)
    }
}

impl From<AccessError> for AppError {
    fn from(value: AccessError) -> Self {
        Self::Access(value)
    }
}

impl From<ListingError> for AppError {
    fn from(value: ListingError) -> Self {
        Self::Listing(value)
    }
}

impl From<RequestError> for AppError {
    fn from(value: RequestError) -> Self {
        Self::Request(value)
    }
}

impl From<ShortlistError> for AppError {
    fn from(value: ShortlistError) -> Self {
        Self::Shortlist(value)
    }
}
