use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use crate::domain::{NewShortlistEntry, Property, PropertyId, ShortlistEntry};
use crate::store::{RentalStore, StoreError};
use crate::workflows::access::Viewer;

#[derive(Debug, Clone, Serialize)]
pub struct ShortlistedProperty {
    pub entry: ShortlistEntry,
    pub property: Property,
}

/// Append-only saved-for-later markers.
pub struct ShortlistService<S> {
    store: Arc<S>,
}

impl<S> ShortlistService<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Adds the property to the viewer's shortlist, returning the existing entry on repeats.
    pub fn shortlist(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
    ) -> Result<ShortlistEntry, ShortlistError> {
        if self.store.property(property_id)?.is_none() {
            return Err(ShortlistError::PropertyNotFound(property_id.clone()));
        }

        if let Some(existing) = self
            .store
            .shortlists(&viewer.uid)?
            .into_iter()
            .find(|entry| &entry.property_id == property_id)
        {
            return Ok(existing);
        }

        Ok(self.store.insert_shortlist(NewShortlistEntry {
            user_id: viewer.uid.clone(),
            property_id: property_id.clone(),
            created_at: Utc::now(),
        })?)
    }

    pub fn shortlisted(&self, viewer: &Viewer) -> Result<Vec<ShortlistedProperty>, ShortlistError> {
        let mut shortlisted = Vec::new();
        for entry in self.store.shortlists(&viewer.uid)? {
            if let Some(property) = self.store.property(&entry.property_id)? {
                shortlisted.push(ShortlistedProperty { entry, property });
            }
        }
        Ok(shortlisted)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShortlistError {
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error(transparent)]
    Store(#[from] StoreError),
}
