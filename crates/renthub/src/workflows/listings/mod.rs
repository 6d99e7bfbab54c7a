pub mod domain;
pub mod service;

pub use domain::{
    is_visible, parse_price, ListingScope, MapMarker, MapRegion, PropertyDetail, PropertyDraft,
    PropertyEdit,
};
pub use service::{ListingError, ListingService};
