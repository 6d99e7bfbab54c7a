//! End-to-end scenarios through the public workflow facade and HTTP router.

mod common {
    use std::sync::Arc;

    use async_trait::async_trait;

    use renthub::domain::UserRole;
    use renthub::geocoding::{AddressSuggestion, Geocoder, GeocodingError};
    use renthub::store::InMemoryRentalStore;
    use renthub::workflows::access::{InMemoryAuthProvider, SignUpForm, Viewer};
    use renthub::workflows::listings::PropertyDraft;
    use renthub::workflows::RentHub;

    pub(super) type Hub = RentHub<InMemoryRentalStore, InMemoryAuthProvider>;

    pub(super) fn hub() -> (Arc<Hub>, Arc<InMemoryRentalStore>) {
        let store = Arc::new(InMemoryRentalStore::new());
        let hub = RentHub::new(store.clone(), Arc::new(InMemoryAuthProvider::new()));
        (Arc::new(hub), store)
    }

    pub(super) fn join(hub: &Hub, email: &str, role: UserRole) -> Viewer {
        let signed_in = hub
            .access
            .sign_up(SignUpForm {
                email: email.to_string(),
                password: "correct-horse".to_string(),
                role,
            })
            .expect("sign up succeeds");
        hub.access
            .viewer(Some(&signed_in.session.token))
            .expect("viewer resolves")
    }

    pub(super) fn loft() -> PropertyDraft {
        PropertyDraft {
            title: "Harbourfront loft".to_string(),
            description: "Corner unit".to_string(),
            address: "10 Bay St, Toronto, ON".to_string(),
            price: "2,100".to_string(),
            location: None,
        }
    }

    pub(super) struct FixedGeocoder;

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn autocomplete(
            &self,
            text: &str,
        ) -> Result<Vec<AddressSuggestion>, GeocodingError> {
            Ok(vec![AddressSuggestion {
                place_id: "abc123".to_string(),
                formatted: format!("{text}, Toronto, ON M5J, Canada"),
                latitude: 43.6405,
                longitude: -79.3771,
            }])
        }
    }
}

use std::sync::Arc;
use std::thread;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use renthub::domain::{RequestOutcome, UserRole};
use renthub::router::{rental_router, ApiState};
use renthub::store::{RentalStore, RequestFilter};
use renthub::workflows::listings::ListingScope;
use renthub::workflows::requests::RequestError;
use tower::ServiceExt;

#[test]
fn listing_lifecycle_from_publish_to_acceptance() {
    let (hub, store) = hub();
    let landlord = join(&hub, "owner@example.com", UserRole::Landlord);
    let ana = join(&hub, "ana@example.com", UserRole::Client);
    let ben = join(&hub, "ben@example.com", UserRole::Client);

    let property = hub
        .listings
        .add_property(&landlord, loft())
        .expect("published");
    assert_eq!(property.price, 2100.0);
    assert_eq!(property.location.latitude, 0.0);

    hub.shortlist.shortlist(&ana, &property.id).unwrap();
    let r1 = hub
        .requests
        .create_request(&ana, &property.id, 1000.0)
        .unwrap();
    let r2 = hub
        .requests
        .create_request(&ben, &property.id, 1200.0)
        .unwrap();

    let pending = hub
        .requests
        .pending_requests(&landlord, &property.id)
        .unwrap();
    assert_eq!(
        pending
            .requests
            .iter()
            .map(|request| request.id.clone())
            .collect::<Vec<_>>(),
        vec![r1.id.clone(), r2.id.clone()]
    );

    hub.requests
        .accept_request(&landlord, &r2.id, &property.id)
        .expect("accepted");

    let all = store
        .requests(&RequestFilter::for_property(&property.id))
        .unwrap();
    let accepted = all
        .iter()
        .filter(|request| request.outcome == RequestOutcome::Accepted)
        .count();
    assert_eq!(accepted, 1);
    assert_eq!(all[0].outcome, RequestOutcome::Denied);

    assert!(hub
        .listings
        .list_properties(&ana, ListingScope::Browse)
        .unwrap()
        .is_empty());
    assert_eq!(
        hub.listings
            .list_properties(&landlord, ListingScope::Mine)
            .unwrap()
            .len(),
        1
    );
    let saved = hub.shortlist.shortlisted(&ana).unwrap();
    assert!(!saved[0].property.listed);
}

#[test]
fn racing_accepts_leave_exactly_one_winner() {
    let (hub, store) = hub();
    let landlord = join(&hub, "owner@example.com", UserRole::Landlord);
    let property = hub.listings.add_property(&landlord, loft()).unwrap();

    let mut request_ids = Vec::new();
    for n in 0..4 {
        let client = join(&hub, &format!("client{n}@example.com"), UserRole::Client);
        let request = hub
            .requests
            .create_request(&client, &property.id, 1800.0 + n as f64)
            .unwrap();
        request_ids.push(request.id);
    }

    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = request_ids
            .iter()
            .map(|request_id| {
                let hub = Arc::clone(&hub);
                let landlord = landlord.clone();
                let property_id = property.id.clone();
                scope.spawn(move || {
                    hub.requests
                        .accept_request(&landlord, request_id, &property_id)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("thread completes"))
            .collect()
    });

    let winners = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(winners, 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(
                err,
                RequestError::Transition(_) | RequestError::Store(_)
            ));
        }
    }

    let outcomes: Vec<_> = store
        .requests(&RequestFilter::for_property(&property.id))
        .unwrap()
        .into_iter()
        .map(|request| request.outcome)
        .collect();
    assert_eq!(
        outcomes
            .iter()
            .filter(|outcome| **outcome == RequestOutcome::Accepted)
            .count(),
        1
    );
    assert!(!outcomes.contains(&RequestOutcome::Pending));
}

#[tokio::test]
async fn autocomplete_route_uses_configured_geocoder() {
    let (hub, _) = hub();
    let router = rental_router(ApiState::new(hub, Some(Arc::new(FixedGeocoder))));

    let response = router
        .clone()
        .oneshot(
            Request::get("/api/v1/geocode/autocomplete?text=10%20Bay")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    let suggestions: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        suggestions[0]["formatted"],
        serde_json::json!("10 Bay, Toronto, ON M5J, Canada")
    );

    let response = router
        .oneshot(
            Request::get("/api/v1/geocode/autocomplete?text=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"[]");
}
