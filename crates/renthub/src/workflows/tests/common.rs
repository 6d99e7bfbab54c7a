use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::domain::{
    GeoPoint, NewProperty, NewRequest, NewShortlistEntry, NewUserRecord, Property, PropertyId,
    PropertyRequest, RequestId, RequestOutcome, ShortlistEntry, UserId, UserRecord, UserRole,
};
use crate::router::{rental_router, ApiState};
use crate::store::{InMemoryRentalStore, RentalStore, RequestFilter, StoreError, WriteBatch};
use crate::workflows::access::{InMemoryAuthProvider, SignUpForm, SignedIn, Viewer};
use crate::workflows::listings::PropertyDraft;
use crate::workflows::RentHub;

pub(super) const PASSWORD: &str = "hunter22";

pub(super) fn build_hub() -> (
    RentHub<InMemoryRentalStore, InMemoryAuthProvider>,
    Arc<InMemoryRentalStore>,
) {
    let store = Arc::new(InMemoryRentalStore::new());
    let auth = Arc::new(InMemoryAuthProvider::new());
    (RentHub::new(store.clone(), auth), store)
}

pub(super) fn sign_up<S>(
    hub: &RentHub<S, InMemoryAuthProvider>,
    email: &str,
    role: UserRole,
) -> (SignedIn, Viewer)
where
    S: RentalStore + 'static,
{
    let signed_in = hub
        .access
        .sign_up(SignUpForm {
            email: email.to_string(),
            password: PASSWORD.to_string(),
            role,
        })
        .expect("sign up succeeds");
    let viewer = hub
        .access
        .viewer(Some(&signed_in.session.token))
        .expect("session resolves");
    (signed_in, viewer)
}

pub(super) fn draft(title: &str, price: &str) -> PropertyDraft {
    PropertyDraft {
        title: title.to_string(),
        description: "Two bedrooms, south facing".to_string(),
        address: "100 Queen St W, Toronto, ON".to_string(),
        price: price.to_string(),
        location: Some(GeoPoint {
            latitude: 43.6534,
            longitude: -79.3839,
        }),
    }
}

pub(super) fn router_with_hub(
    hub: RentHub<InMemoryRentalStore, InMemoryAuthProvider>,
) -> axum::Router {
    rental_router(ApiState::new(Arc::new(hub), None))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("valid json body")
}

type CommitHook = Box<dyn FnOnce(&InMemoryRentalStore) + Send>;

/// Wraps the in-memory store so a test can fail writes, or let another writer
/// land just before the next batch is applied.
#[derive(Default)]
pub(super) struct ScriptedStore {
    pub(super) inner: InMemoryRentalStore,
    reject_commits: bool,
    user_insert_failures: AtomicUsize,
    before_commit: Mutex<Option<CommitHook>>,
}

impl ScriptedStore {
    pub(super) fn rejecting_commits() -> Self {
        Self {
            reject_commits: true,
            ..Self::default()
        }
    }

    pub(super) fn failing_user_inserts(times: usize) -> Self {
        Self {
            user_insert_failures: AtomicUsize::new(times),
            ..Self::default()
        }
    }

    pub(super) fn before_next_commit(
        &self,
        hook: impl FnOnce(&InMemoryRentalStore) + Send + 'static,
    ) {
        *self.before_commit.lock().expect("hook lock") = Some(Box::new(hook));
    }
}

pub(super) fn scripted_hub(
    store: ScriptedStore,
) -> (
    RentHub<ScriptedStore, InMemoryAuthProvider>,
    Arc<ScriptedStore>,
) {
    let store = Arc::new(store);
    let hub = RentHub::new(store.clone(), Arc::new(InMemoryAuthProvider::new()));
    (hub, store)
}

/// The writes an accept of `winner` commits, staged the way a second landlord
/// session would.
pub(super) fn accept_batch(
    property_id: &PropertyId,
    winner: &RequestId,
    losers: &[RequestId],
) -> WriteBatch {
    let mut batch = WriteBatch::new();
    batch
        .require_outcome(winner, RequestOutcome::Pending)
        .set_request_outcome(winner, RequestOutcome::Accepted);
    for loser in losers {
        batch.set_request_outcome(loser, RequestOutcome::Denied);
    }
    batch.set_listed(property_id, false, Utc::now());
    batch
}

impl RentalStore for ScriptedStore {
    fn insert_property(&self, property: NewProperty) -> Result<Property, StoreError> {
        self.inner.insert_property(property)
    }

    fn property(&self, id: &PropertyId) -> Result<Option<Property>, StoreError> {
        self.inner.property(id)
    }

    fn properties(&self) -> Result<Vec<Property>, StoreError> {
        self.inner.properties()
    }

    fn insert_request(&self, request: NewRequest) -> Result<PropertyRequest, StoreError> {
        self.inner.insert_request(request)
    }

    fn request(&self, id: &RequestId) -> Result<Option<PropertyRequest>, StoreError> {
        self.inner.request(id)
    }

    fn requests(&self, filter: &RequestFilter) -> Result<Vec<PropertyRequest>, StoreError> {
        self.inner.requests(filter)
    }

    fn insert_shortlist(&self, entry: NewShortlistEntry) -> Result<ShortlistEntry, StoreError> {
        self.inner.insert_shortlist(entry)
    }

    fn shortlists(&self, user: &UserId) -> Result<Vec<ShortlistEntry>, StoreError> {
        self.inner.shortlists(user)
    }

    fn insert_user(&self, user: NewUserRecord) -> Result<UserRecord, StoreError> {
        let failing = self
            .user_insert_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("blip".to_string()));
        }
        self.inner.insert_user(user)
    }

    fn users_by_email(&self, email: &str) -> Result<Vec<UserRecord>, StoreError> {
        self.inner.users_by_email(email)
    }

    fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if self.reject_commits {
            return Err(StoreError::Unavailable("network unreachable".to_string()));
        }
        let hook = self.before_commit.lock().expect("hook lock").take();
        if let Some(hook) = hook {
            hook(&self.inner);
        }
        self.inner.commit(batch)
    }
}
