//! Document store boundary.
//!
//! Every workflow talks to persistence through [`RentalStore`], which mirrors the
//! equality-filtered collection queries the managed backend offers. Multi-document
//! changes go through [`WriteBatch`] and are applied all-or-nothing by
//! [`RentalStore::commit`].

mod batch;
mod memory;

pub use batch::{Precondition, WriteBatch, WriteOp};
pub use memory::InMemoryRentalStore;

use crate::domain::{
    NewProperty, NewRequest, NewShortlistEntry, NewUserRecord, Property, PropertyId,
    PropertyRequest, RequestId, RequestOutcome, ShortlistEntry, UserId, UserRecord,
};

pub const USERS: &str = "Users";
pub const PROPERTIES: &str = "properties";
pub const REQUESTS: &str = "PropertyRequest";
pub const SHORTLISTS: &str = "shortlists";

/// Storage abstraction so workflows can be exercised against any backend.
pub trait RentalStore: Send + Sync {
    fn insert_property(&self, property: NewProperty) -> Result<Property, StoreError>;
    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError>;
    fn properties(&self) -> Result<Vec<Property>, StoreError>;

    fn insert_request(&self, request: NewRequest) -> Result<PropertyRequest, StoreError>;
    fn request(&self, id: &RequestId) -> Result<Option<PropertyRequest>, StoreError>;
    /// Requests matching every populated field of the filter, oldest first.
    fn requests(&self, filter: &RequestFilter) -> Result<Vec<PropertyRequest>, StoreError>;

    fn insert_shortlist(&self, entry: NewShortlistEntry) -> Result<ShortlistEntry, StoreError>;
    fn shortlists(&self, user: &UserId) -> Result<Vec<ShortlistEntry>, StoreError>;

    fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord, StoreError>;
    fn users_by_email(&self, email: &str) -> Result<Vec<UserRecord>, StoreError>;

    /// Applies every write in the batch or none of them. Existing documents are
    /// only ever modified through a batch, so each write touches named fields.
    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Equality filter over the `PropertyRequest` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub property_id: Option<PropertyId>,
    pub user_id: Option<UserId>,
    pub outcome: Option<RequestOutcome>,
}

impl RequestFilter {
    pub fn for_property(property_id: &PropertyId) -> Self {
        Self {
            property_id: Some(property_id.clone()),
            ..Self::default()
        }
    }

    pub fn by_user(user_id: &UserId) -> Self {
        Self {
            user_id: Some(user_id.clone()),
            ..Self::default()
        }
    }

    pub fn with_outcome(mut self, outcome: RequestOutcome) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn matches(&self, request: &PropertyRequest) -> bool {
        self.property_id
            .as_ref()
            .map_or(true, |id| &request.property_id == id)
            && self
                .user_id
                .as_ref()
                .map_or(true, |id| &request.user_id == id)
            && self.outcome.map_or(true, |outcome| request.outcome == outcome)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("document {collection}/{id} not found")]
    NotFound { collection: &'static str, id: String },
    #[error("precondition failed for {collection}/{id}: {detail}")]
    PreconditionFailed {
        collection: &'static str,
        id: String,
        detail: String,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
