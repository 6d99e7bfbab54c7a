use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::domain::{
    is_visible, parse_price, ListingScope, MapMarker, PropertyDetail, PropertyDraft, PropertyEdit,
};
use crate::domain::{NewProperty, Property, PropertyId};
use crate::store::{RentalStore, StoreError, WriteBatch};
use crate::workflows::access::Viewer;

pub struct ListingService<S> {
    store: Arc<S>,
}

impl<S> ListingService<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn add_property(
        &self,
        viewer: &Viewer,
        draft: PropertyDraft,
    ) -> Result<Property, ListingError> {
        if !viewer.is_landlord() {
            return Err(ListingError::LandlordOnly);
        }
        if draft.title.trim().is_empty()
            || draft.address.trim().is_empty()
            || draft.price.trim().is_empty()
        {
            return Err(ListingError::MissingFields);
        }

        let property = self.store.insert_property(NewProperty {
            title: draft.title.trim().to_string(),
            description: draft.description,
            address: draft.address.trim().to_string(),
            price: parse_price(&draft.price),
            location: draft.location.unwrap_or_default(),
            created_by: viewer.uid.clone(),
            listed: true,
            created_at: Utc::now(),
        })?;

        info!(property_id = %property.id, owner = %viewer.uid, "property listed");
        Ok(property)
    }

    pub fn edit_property(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
        edit: PropertyEdit,
    ) -> Result<Property, ListingError> {
        if edit.title.trim().is_empty() || edit.price.trim().is_empty() {
            return Err(ListingError::MissingFields);
        }

        self.owned(viewer, property_id)?;
        let mut batch = WriteBatch::new();
        batch.set_details(
            property_id,
            edit.title.trim(),
            edit.description,
            parse_price(&edit.price),
            Utc::now(),
        );
        self.store.commit(batch)?;
        self.fetch(property_id)
    }

    /// Flips the listed flag and returns the updated property. Fails with a
    /// store precondition error if the flag changed since it was read.
    pub fn toggle_listed(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
    ) -> Result<Property, ListingError> {
        let current = self.owned(viewer, property_id)?;
        let mut batch = WriteBatch::new();
        batch
            .require_listed(property_id, current.listed)
            .set_listed(property_id, !current.listed, Utc::now());
        self.store.commit(batch)?;

        let property = self.fetch(property_id)?;
        info!(
            property_id = %property.id,
            listed = property.listed,
            "property listing status changed"
        );
        Ok(property)
    }

    pub fn property_detail(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
    ) -> Result<PropertyDetail, ListingError> {
        let property = self.fetch(property_id)?;
        let is_owner = property.is_owned_by(&viewer.uid);
        if !property.listed && !is_owner {
            return Err(ListingError::NotFound(property_id.clone()));
        }

        Ok(PropertyDetail {
            map: MapMarker::for_property(&property),
            is_owner,
            property,
        })
    }

    pub fn list_properties(
        &self,
        viewer: &Viewer,
        scope: ListingScope,
    ) -> Result<Vec<Property>, ListingError> {
        let properties = self.store.properties()?;
        Ok(properties
            .into_iter()
            .filter(|property| is_visible(property, viewer, scope))
            .collect())
    }

    fn fetch(&self, property_id: &PropertyId) -> Result<Property, ListingError> {
        self.store
            .property(property_id)?
            .ok_or_else(|| ListingError::NotFound(property_id.clone()))
    }

    fn owned(&self, viewer: &Viewer, property_id: &PropertyId) -> Result<Property, ListingError> {
        let property = self.fetch(property_id)?;
        if !property.is_owned_by(&viewer.uid) {
            return Err(ListingError::NotOwner);
        }
        Ok(property)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    #[error("Please fill in all required fields")]
    MissingFields,
    #[error("only landlords can publish properties")]
    LandlordOnly,
    #[error("property {0} not found")]
    NotFound(PropertyId),
    #[error("only the owner can change this property")]
    NotOwner,
    #[error(transparent)]
    Store(#[from] StoreError),
}
