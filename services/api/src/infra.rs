use metrics_exporter_prometheus::PrometheusHandle;
use renthub::config::GeocodingConfig;
use renthub::geocoding::{GeoapifyGeocoder, Geocoder};
use renthub::store::InMemoryRentalStore;
use renthub::workflows::access::InMemoryAuthProvider;
use renthub::workflows::RentHub;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) type LocalHub = RentHub<InMemoryRentalStore, InMemoryAuthProvider>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Workflows backed by the process-local store and auth provider.
pub(crate) fn local_hub() -> Arc<LocalHub> {
    let store = Arc::new(InMemoryRentalStore::new());
    let auth = Arc::new(InMemoryAuthProvider::new());
    Arc::new(RentHub::new(store, auth))
}

/// Geocoder for the configured key, or `None` when autocomplete is switched off.
pub(crate) fn configured_geocoder(config: &GeocodingConfig) -> Option<Arc<dyn Geocoder>> {
    if !config.enabled() {
        info!("GEOAPIFY_API_KEY not set; address autocomplete disabled");
        return None;
    }

    match GeoapifyGeocoder::new(config) {
        Ok(geocoder) => {
            info!(base_url = %config.base_url, limit = config.limit, "address autocomplete enabled");
            Some(Arc::new(geocoder))
        }
        Err(err) => {
            warn!(error = %err, "geocoder could not be built; address autocomplete disabled");
            None
        }
    }
}
