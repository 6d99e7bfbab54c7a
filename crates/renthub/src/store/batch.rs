use chrono::{DateTime, Utc};

use crate::domain::{PropertyId, RequestId, RequestOutcome};

/// A single document mutation staged in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    SetRequestOutcome {
        request_id: RequestId,
        outcome: RequestOutcome,
    },
    SetListed {
        property_id: PropertyId,
        listed: bool,
        updated_at: DateTime<Utc>,
    },
    /// Field-level update of the landlord-editable details. Leaves `listed` untouched.
    SetDetails {
        property_id: PropertyId,
        title: String,
        description: String,
        price: f64,
        updated_at: DateTime<Utc>,
    },
}

/// A condition the store verifies before applying any write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    RequestOutcome {
        request_id: RequestId,
        expected: RequestOutcome,
    },
    Listed {
        property_id: PropertyId,
        expected: bool,
    },
    /// The property's pending requests are exactly this set.
    PendingRequests {
        property_id: PropertyId,
        expected: Vec<RequestId>,
    },
}

/// Staged multi-document write, committed atomically through the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    preconditions: Vec<Precondition>,
    writes: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_outcome(&mut self, request_id: &RequestId, expected: RequestOutcome) -> &mut Self {
        self.preconditions.push(Precondition::RequestOutcome {
            request_id: request_id.clone(),
            expected,
        });
        self
    }

    pub fn require_listed(&mut self, property_id: &PropertyId, expected: bool) -> &mut Self {
        self.preconditions.push(Precondition::Listed {
            property_id: property_id.clone(),
            expected,
        });
        self
    }

    pub fn require_pending(&mut self, property_id: &PropertyId, expected: Vec<RequestId>) -> &mut Self {
        self.preconditions.push(Precondition::PendingRequests {
            property_id: property_id.clone(),
            expected,
        });
        self
    }

    pub fn set_request_outcome(&mut self, request_id: &RequestId, outcome: RequestOutcome) -> &mut Self {
        self.writes.push(WriteOp::SetRequestOutcome {
            request_id: request_id.clone(),
            outcome,
        });
        self
    }

    pub fn set_listed(
        &mut self,
        property_id: &PropertyId,
        listed: bool,
        updated_at: DateTime<Utc>,
    ) -> &mut Self {
        self.writes.push(WriteOp::SetListed {
            property_id: property_id.clone(),
            listed,
            updated_at,
        });
        self
    }

    pub fn set_details(
        &mut self,
        property_id: &PropertyId,
        title: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        updated_at: DateTime<Utc>,
    ) -> &mut Self {
        self.writes.push(WriteOp::SetDetails {
            property_id: property_id.clone(),
            title: title.into(),
            description: description.into(),
            price,
            updated_at,
        });
        self
    }

    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    pub fn writes(&self) -> &[WriteOp] {
        &self.writes
    }
}
