use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{
    InvalidTransition, NewRequest, Property, PropertyId, PropertyRequest, RequestId,
    RequestOutcome,
};
use crate::store::{RentalStore, RequestFilter, StoreError, WriteBatch};
use crate::workflows::access::Viewer;

/// Pending offers on a property alongside its listed price.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequests {
    pub property_id: PropertyId,
    pub listed_price: f64,
    pub requests: Vec<PropertyRequest>,
}

/// State after an accepted request was committed.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptOutcome {
    pub accepted: PropertyRequest,
    pub denied: Vec<RequestId>,
    pub property: Property,
}

/// Offer intake and the landlord accept/deny decision.
pub struct RequestWorkflow<S> {
    store: Arc<S>,
}

impl<S> RequestWorkflow<S>
where
    S: RentalStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn create_request(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
        offered_price: f64,
    ) -> Result<PropertyRequest, RequestError> {
        if !offered_price.is_finite() || offered_price <= 0.0 {
            return Err(RequestError::InvalidOffer);
        }

        let property = self.property(property_id)?;
        if property.is_owned_by(&viewer.uid) {
            return Err(RequestError::OwnProperty);
        }
        if !property.listed {
            return Err(RequestError::NotListed(property_id.clone()));
        }

        let open = self.store.requests(
            &RequestFilter::by_user(&viewer.uid).with_outcome(RequestOutcome::Pending),
        )?;
        if open.iter().any(|request| &request.property_id == property_id) {
            return Err(RequestError::DuplicatePending(property_id.clone()));
        }

        let request = self.store.insert_request(NewRequest {
            property_id: property_id.clone(),
            user_id: viewer.uid.clone(),
            user_email: viewer.email.clone(),
            offered_price,
            created_at: Utc::now(),
        })?;

        info!(request_id = %request.id, %property_id, "request submitted");
        Ok(request)
    }

    pub fn pending_requests(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
    ) -> Result<PendingRequests, RequestError> {
        let property = self.owned_property(viewer, property_id)?;
        let requests = self.store.requests(
            &RequestFilter::for_property(property_id).with_outcome(RequestOutcome::Pending),
        )?;

        Ok(PendingRequests {
            property_id: property.id,
            listed_price: property.price,
            requests,
        })
    }

    pub fn requests_for_user(&self, viewer: &Viewer) -> Result<Vec<PropertyRequest>, RequestError> {
        Ok(self.store.requests(&RequestFilter::by_user(&viewer.uid))?)
    }

    /// Accepts one request, denies its pending siblings, and delists the property in one batch.
    pub fn accept_request(
        &self,
        viewer: &Viewer,
        request_id: &RequestId,
        property_id: &PropertyId,
    ) -> Result<AcceptOutcome, RequestError> {
        let request = self.request(request_id)?;
        if &request.property_id != property_id {
            return Err(RequestError::PropertyMismatch {
                request_id: request_id.clone(),
                property_id: property_id.clone(),
            });
        }
        let property = self.owned_property(viewer, property_id)?;
        let accepted = request.outcome.accept()?;

        let pending = self.store.requests(
            &RequestFilter::for_property(property_id).with_outcome(RequestOutcome::Pending),
        )?;

        let mut batch = WriteBatch::new();
        batch
            .require_pending(
                property_id,
                pending.iter().map(|other| other.id.clone()).collect(),
            )
            .require_outcome(request_id, RequestOutcome::Pending)
            .set_request_outcome(request_id, accepted);

        let mut denied = Vec::new();
        for sibling in pending.iter().filter(|other| &other.id != request_id) {
            batch
                .require_outcome(&sibling.id, RequestOutcome::Pending)
                .set_request_outcome(&sibling.id, sibling.outcome.deny()?);
            denied.push(sibling.id.clone());
        }
        batch.set_listed(&property.id, false, Utc::now());

        if let Err(err) = self.store.commit(batch) {
            warn!(%request_id, %property_id, error = %err, "accept batch rejected");
            return Err(err.into());
        }

        info!(
            %request_id,
            %property_id,
            denied = denied.len(),
            "request accepted and property delisted"
        );

        Ok(AcceptOutcome {
            accepted: self.request(request_id)?,
            denied,
            property: self.property(property_id)?,
        })
    }

    /// Denies a single request; no other document is touched. The write only
    /// lands if the request is still pending at commit time.
    pub fn deny_request(
        &self,
        viewer: &Viewer,
        request_id: &RequestId,
    ) -> Result<PropertyRequest, RequestError> {
        let request = self.request(request_id)?;
        self.owned_property(viewer, &request.property_id)?;
        let denied = request.outcome.deny()?;

        let mut batch = WriteBatch::new();
        batch
            .require_outcome(request_id, RequestOutcome::Pending)
            .set_request_outcome(request_id, denied);
        if let Err(err) = self.store.commit(batch) {
            warn!(%request_id, error = %err, "deny rejected");
            return Err(err.into());
        }

        info!(%request_id, property_id = %request.property_id, "request denied");
        self.request(request_id)
    }

    fn request(&self, request_id: &RequestId) -> Result<PropertyRequest, RequestError> {
        self.store
            .request(request_id)?
            .ok_or_else(|| RequestError::RequestNotFound(request_id.clone()))
    }

    fn property(&self, property_id: &PropertyId) -> Result<Property, RequestError> {
        self.store
            .property(property_id)?
            .ok_or_else(|| RequestError::PropertyNotFound(property_id.clone()))
    }

    fn owned_property(
        &self,
        viewer: &Viewer,
        property_id: &PropertyId,
    ) -> Result<Property, RequestError> {
        let property = self.property(property_id)?;
        if !property.is_owned_by(&viewer.uid) {
            return Err(RequestError::NotOwner);
        }
        Ok(property)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("offered price must be greater than zero")]
    InvalidOffer,
    #[error("property {0} not found")]
    PropertyNotFound(PropertyId),
    #[error("request {0} not found")]
    RequestNotFound(RequestId),
    #[error("request {request_id} does not belong to property {property_id}")]
    PropertyMismatch {
        request_id: RequestId,
        property_id: PropertyId,
    },
    #[error("property {0} is not accepting requests")]
    NotListed(PropertyId),
    #[error("you cannot request your own property")]
    OwnProperty,
    #[error("a pending request for property {0} already exists")]
    DuplicatePending(PropertyId),
    #[error("only the property owner can review its requests")]
    NotOwner,
    #[error(transparent)]
    Transition(#[from] InvalidTransition),
    #[error(transparent)]
    Store(#[from] StoreError),
}
