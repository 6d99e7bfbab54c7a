use super::common::*;

use crate::domain::{PropertyId, RequestOutcome, UserRole};
use crate::store::{RentalStore, StoreError};
use crate::workflows::listings::{ListingError, ListingScope, PropertyDraft, PropertyEdit};

#[test]
fn add_property_requires_title_address_and_price() {
    let (hub, _) = build_hub();
    let (_, landlord) = sign_up(&hub, "lee@example.com", UserRole::Landlord);

    let missing_price = PropertyDraft {
        price: "  ".to_string(),
        ..draft("Loft", "")
    };
    match hub.listings.add_property(&landlord, missing_price) {
        Err(err @ ListingError::MissingFields) => {
            assert_eq!(err.to_string(), "Please fill in all required fields")
        }
        other => panic!("expected missing fields, got {other:?}"),
    }

    let property = hub
        .listings
        .add_property(&landlord, draft("  Loft  ", "$1,250.50"))
        .expect("property added");
    assert_eq!(property.title, "Loft");
    assert_eq!(property.price, 1250.5);
    assert!(property.listed);
    assert_eq!(property.created_by, landlord.uid);
}

#[test]
fn clients_cannot_publish() {
    let (hub, _) = build_hub();
    let (_, client) = sign_up(&hub, "ana@example.com", UserRole::Client);

    assert!(matches!(
        hub.listings.add_property(&client, draft("Loft", "1500")),
        Err(ListingError::LandlordOnly)
    ));
}

#[test]
fn unlisted_properties_stay_visible_to_their_owner_only() {
    let (hub, _) = build_hub();
    let (_, owner) = sign_up(&hub, "lee@example.com", UserRole::Landlord);
    let (_, other) = sign_up(&hub, "rae@example.com", UserRole::Landlord);
    let (_, client) = sign_up(&hub, "ana@example.com", UserRole::Client);

    let hidden = hub
        .listings
        .add_property(&owner, draft("Loft", "1500"))
        .unwrap();
    let open = hub
        .listings
        .add_property(&other, draft("Studio", "900"))
        .unwrap();
    let toggled = hub.listings.toggle_listed(&owner, &hidden.id).unwrap();
    assert!(!toggled.listed);

    let browse = hub
        .listings
        .list_properties(&client, ListingScope::Browse)
        .unwrap();
    assert_eq!(
        browse.iter().map(|p| p.id.clone()).collect::<Vec<_>>(),
        vec![open.id.clone()]
    );

    let mine = hub
        .listings
        .list_properties(&owner, ListingScope::Mine)
        .unwrap();
    assert_eq!(
        mine.iter().map(|p| p.id.clone()).collect::<Vec<_>>(),
        vec![hidden.id.clone()]
    );

    let owner_browse = hub
        .listings
        .list_properties(&owner, ListingScope::Browse)
        .unwrap();
    assert_eq!(owner_browse.len(), 2);

    let rival_browse = hub
        .listings
        .list_properties(&other, ListingScope::Browse)
        .unwrap();
    assert_eq!(rival_browse.len(), 1);
}

#[test]
fn detail_hides_unlisted_property_from_non_owners() {
    let (hub, _) = build_hub();
    let (_, owner) = sign_up(&hub, "lee@example.com", UserRole::Landlord);
    let (_, client) = sign_up(&hub, "ana@example.com", UserRole::Client);

    let property = hub
        .listings
        .add_property(&owner, draft("Loft", "1500"))
        .unwrap();

    let detail = hub.listings.property_detail(&client, &property.id).unwrap();
    assert!(!detail.is_owner);
    assert_eq!(detail.map.title, "Loft");
    assert_eq!(detail.map.region.latitude_delta, 0.0922);
    assert_eq!(detail.map.region.longitude_delta, 0.0421);
    assert_eq!(detail.map.description, property.address);

    hub.listings.toggle_listed(&owner, &property.id).unwrap();
    assert!(matches!(
        hub.listings.property_detail(&client, &property.id),
        Err(ListingError::NotFound(_))
    ));
    assert!(hub
        .listings
        .property_detail(&owner, &property.id)
        .unwrap()
        .is_owner);
    assert!(matches!(
        hub.listings
            .property_detail(&owner, &PropertyId::from("prop-missing")),
        Err(ListingError::NotFound(_))
    ));
}

#[test]
fn edits_and_toggles_are_owner_only() {
    let (hub, _) = build_hub();
    let (_, owner) = sign_up(&hub, "lee@example.com", UserRole::Landlord);
    let (_, rival) = sign_up(&hub, "rae@example.com", UserRole::Landlord);

    let property = hub
        .listings
        .add_property(&owner, draft("Loft", "1500"))
        .unwrap();

    let edit = PropertyEdit {
        title: "Sunny loft".to_string(),
        description: "Renovated".to_string(),
        price: "1650".to_string(),
    };
    assert!(matches!(
        hub.listings.edit_property(&rival, &property.id, edit.clone()),
        Err(ListingError::NotOwner)
    ));
    assert!(matches!(
        hub.listings.toggle_listed(&rival, &property.id),
        Err(ListingError::NotOwner)
    ));
    assert!(matches!(
        hub.listings.edit_property(
            &owner,
            &property.id,
            PropertyEdit {
                title: String::new(),
                ..edit.clone()
            }
        ),
        Err(ListingError::MissingFields)
    ));

    let updated = hub
        .listings
        .edit_property(&owner, &property.id, edit)
        .expect("owner edits");
    assert_eq!(updated.title, "Sunny loft");
    assert_eq!(updated.price, 1650.0);
    assert_eq!(updated.address, property.address);
    assert!(updated.updated_at >= property.updated_at);
}

#[test]
fn edit_keeps_a_delisting_that_lands_mid_edit() {
    let (hub, store) = scripted_hub(ScriptedStore::default());
    let (_, owner) = sign_up(&hub, "lee@example.com", UserRole::Landlord);
    let (_, client) = sign_up(&hub, "ana@example.com", UserRole::Client);

    let property = hub
        .listings
        .add_property(&owner, draft("Loft", "1500"))
        .unwrap();
    let request = hub
        .requests
        .create_request(&client, &property.id, 1450.0)
        .unwrap();

    let batch = accept_batch(&property.id, &request.id, &[]);
    store.before_next_commit(move |inner| inner.commit(batch).expect("accept lands"));

    let updated = hub
        .listings
        .edit_property(
            &owner,
            &property.id,
            PropertyEdit {
                title: "Sunny loft".to_string(),
                description: "Renovated".to_string(),
                price: "1650".to_string(),
            },
        )
        .expect("owner edits");
    assert_eq!(updated.title, "Sunny loft");
    assert!(!updated.listed);

    let stored = store.property(&property.id).unwrap().expect("present");
    assert!(!stored.listed);
    assert_eq!(stored.price, 1650.0);
    assert_eq!(
        store.request(&request.id).unwrap().unwrap().outcome,
        RequestOutcome::Accepted
    );
}

#[test]
fn toggle_refuses_to_relist_after_a_concurrent_delist() {
    let (hub, store) = scripted_hub(ScriptedStore::default());
    let (_, owner) = sign_up(&hub, "lee@example.com", UserRole::Landlord);
    let (_, client) = sign_up(&hub, "ana@example.com", UserRole::Client);

    let property = hub
        .listings
        .add_property(&owner, draft("Loft", "1500"))
        .unwrap();
    let request = hub
        .requests
        .create_request(&client, &property.id, 1450.0)
        .unwrap();

    let batch = accept_batch(&property.id, &request.id, &[]);
    store.before_next_commit(move |inner| inner.commit(batch).expect("accept lands"));

    // The owner saw it listed and asked to hide it; the accept already did.
    assert!(matches!(
        hub.listings.toggle_listed(&owner, &property.id),
        Err(ListingError::Store(StoreError::PreconditionFailed { .. }))
    ));
    assert!(!store.property(&property.id).unwrap().unwrap().listed);
}
