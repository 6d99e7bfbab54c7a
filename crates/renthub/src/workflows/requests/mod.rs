//! Client offers on listed properties and the landlord's accept/deny decision.
//!
//! Accepting a request is the one multi-document transition in the system: the
//! accepted request, every pending sibling, and the property's listed flag change
//! together through a single [`crate::store::WriteBatch`].

pub mod service;

pub use service::{AcceptOutcome, PendingRequests, RequestError, RequestWorkflow};
