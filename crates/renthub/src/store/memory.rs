use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::batch::{Precondition, WriteBatch, WriteOp};
use super::{RentalStore, RequestFilter, StoreError, PROPERTIES, REQUESTS};
use crate::domain::{
    NewProperty, NewRequest, NewShortlistEntry, NewUserRecord, Property, PropertyId,
    PropertyRequest, RequestId, RequestOutcome, ShortlistEntry, ShortlistId, UserId, UserRecord,
    UserRecordId,
};

#[derive(Debug, Default)]
struct Collections {
    properties: BTreeMap<PropertyId, Property>,
    requests: BTreeMap<RequestId, PropertyRequest>,
    shortlists: Vec<ShortlistEntry>,
    users: Vec<UserRecord>,
}

/// Process-local store with the same consistency model as the managed backend:
/// single-document writes plus atomic batches, no cross-batch transactions.
#[derive(Debug, Default)]
pub struct InMemoryRentalStore {
    collections: Mutex<Collections>,
    sequence: AtomicU64,
}

impl InMemoryRentalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self, prefix: &str) -> String {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{id:06}")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

fn request_not_found(id: &RequestId) -> StoreError {
    StoreError::NotFound {
        collection: REQUESTS,
        id: id.to_string(),
    }
}

fn property_not_found(id: &PropertyId) -> StoreError {
    StoreError::NotFound {
        collection: PROPERTIES,
        id: id.to_string(),
    }
}

fn check(collections: &Collections, precondition: &Precondition) -> Result<(), StoreError> {
    match precondition {
        Precondition::RequestOutcome {
            request_id,
            expected,
        } => {
            let request = collections
                .requests
                .get(request_id)
                .ok_or_else(|| request_not_found(request_id))?;
            if request.outcome != *expected {
                return Err(StoreError::PreconditionFailed {
                    collection: REQUESTS,
                    id: request_id.to_string(),
                    detail: format!("expected {expected}, found {}", request.outcome),
                });
            }
        }
        Precondition::Listed {
            property_id,
            expected,
        } => {
            let property = collections
                .properties
                .get(property_id)
                .ok_or_else(|| property_not_found(property_id))?;
            if property.listed != *expected {
                return Err(StoreError::PreconditionFailed {
                    collection: PROPERTIES,
                    id: property_id.to_string(),
                    detail: format!("expected listed={expected}, found listed={}", property.listed),
                });
            }
        }
        Precondition::PendingRequests {
            property_id,
            expected,
        } => {
            let mut pending: Vec<&RequestId> = collections
                .requests
                .values()
                .filter(|request| {
                    &request.property_id == property_id && request.outcome.is_pending()
                })
                .map(|request| &request.id)
                .collect();
            pending.sort();
            let mut wanted: Vec<&RequestId> = expected.iter().collect();
            wanted.sort();
            if pending != wanted {
                return Err(StoreError::PreconditionFailed {
                    collection: PROPERTIES,
                    id: property_id.to_string(),
                    detail: format!(
                        "pending requests changed: expected {}, found {}",
                        wanted.len(),
                        pending.len()
                    ),
                });
            }
        }
    }
    Ok(())
}

impl RentalStore for InMemoryRentalStore {
    fn insert_property(&self, property: NewProperty) -> Result<Property, StoreError> {
        let id = PropertyId(self.next_id("prop"));
        let record = Property {
            id: id.clone(),
            title: property.title,
            description: property.description,
            address: property.address,
            price: property.price,
            location: property.location,
            created_by: property.created_by,
            listed: property.listed,
            created_at: property.created_at,
            updated_at: property.created_at,
        };
        self.lock()?.properties.insert(id, record.clone());
        Ok(record)
    }

    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError> {
        Ok(self.lock()?.properties.get(id).cloned())
    }

    fn properties(&self) -> Result<Vec<Property>, StoreError> {
        Ok(self.lock()?.properties.values().cloned().collect())
    }

    fn insert_request(&self, request: NewRequest) -> Result<PropertyRequest, StoreError> {
        let id = RequestId(self.next_id("req"));
        let record = PropertyRequest {
            id: id.clone(),
            property_id: request.property_id,
            user_id: request.user_id,
            user_email: request.user_email,
            offered_price: request.offered_price,
            outcome: RequestOutcome::Pending,
            created_at: request.created_at,
        };
        self.lock()?.requests.insert(id, record.clone());
        Ok(record)
    }

    fn request(&self, id: &RequestId) -> Result<Option<PropertyRequest>, StoreError> {
        Ok(self.lock()?.requests.get(id).cloned())
    }

    fn requests(&self, filter: &RequestFilter) -> Result<Vec<PropertyRequest>, StoreError> {
        let guard = self.lock()?;
        let mut matching: Vec<PropertyRequest> = guard
            .requests
            .values()
            .filter(|request| filter.matches(request))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    fn insert_shortlist(&self, entry: NewShortlistEntry) -> Result<ShortlistEntry, StoreError> {
        let record = ShortlistEntry {
            id: ShortlistId(self.next_id("short")),
            user_id: entry.user_id,
            property_id: entry.property_id,
            created_at: entry.created_at,
        };
        self.lock()?.shortlists.push(record.clone());
        Ok(record)
    }

    fn shortlists(&self, user: &UserId) -> Result<Vec<ShortlistEntry>, StoreError> {
        Ok(self
            .lock()?
            .shortlists
            .iter()
            .filter(|entry| &entry.user_id == user)
            .cloned()
            .collect())
    }

    fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord, StoreError> {
        let record = UserRecord {
            id: UserRecordId(self.next_id("user")),
            email: user.email,
            role: user.role,
            uid: user.uid,
        };
        self.lock()?.users.push(record.clone());
        Ok(record)
    }

    fn users_by_email(&self, email: &str) -> Result<Vec<UserRecord>, StoreError> {
        Ok(self
            .lock()?
            .users
            .iter()
            .filter(|user| user.email == email)
            .cloned()
            .collect())
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        let mut guard = self.lock()?;

        for precondition in batch.preconditions() {
            check(&guard, precondition)?;
        }

        // Every target must exist before anything is applied.
        for write in batch.writes() {
            match write {
                WriteOp::SetRequestOutcome { request_id, .. } => {
                    if !guard.requests.contains_key(request_id) {
                        return Err(request_not_found(request_id));
                    }
                }
                WriteOp::SetListed { property_id, .. } | WriteOp::SetDetails { property_id, .. } => {
                    if !guard.properties.contains_key(property_id) {
                        return Err(property_not_found(property_id));
                    }
                }
            }
        }

        for write in batch.writes() {
            match write {
                WriteOp::SetRequestOutcome {
                    request_id,
                    outcome,
                } => {
                    if let Some(request) = guard.requests.get_mut(request_id) {
                        request.outcome = *outcome;
                    }
                }
                WriteOp::SetListed {
                    property_id,
                    listed,
                    updated_at,
                } => {
                    if let Some(property) = guard.properties.get_mut(property_id) {
                        property.listed = *listed;
                        property.updated_at = *updated_at;
                    }
                }
                WriteOp::SetDetails {
                    property_id,
                    title,
                    description,
                    price,
                    updated_at,
                } => {
                    if let Some(property) = guard.properties.get_mut(property_id) {
                        property.title = title.clone();
                        property.description = description.clone();
                        property.price = *price;
                        property.updated_at = *updated_at;
                    }
                }
            }
        }

        Ok(())
    }
}
