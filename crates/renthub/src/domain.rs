use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

document_id!(
    /// Identifier of a document in the `properties` collection.
    PropertyId
);
document_id!(
    /// Identifier of a document in the `PropertyRequest` collection.
    RequestId
);
document_id!(ShortlistId);
document_id!(UserRecordId);
document_id!(
    /// Identity issued by the auth provider, independent of the user record.
    UserId
);

/// Coordinates picked from an address suggestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A rental listing published by a landlord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: f64,
    #[serde(flatten)]
    pub location: GeoPoint,
    pub created_by: UserId,
    pub listed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.created_by == user
    }
}

/// Property fields supplied on insert; the store assigns the identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProperty {
    pub title: String,
    pub description: String,
    pub address: String,
    pub price: f64,
    pub location: GeoPoint,
    pub created_by: UserId,
    pub listed: bool,
    pub created_at: DateTime<Utc>,
}

/// Landlord decision on a request. Only pending requests can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestOutcome {
    Pending,
    Accepted,
    Denied,
}

impl RequestOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            RequestOutcome::Pending => "pending",
            RequestOutcome::Accepted => "accepted",
            RequestOutcome::Denied => "denied",
        }
    }

    pub const fn is_pending(self) -> bool {
        matches!(self, RequestOutcome::Pending)
    }

    pub fn transition(self, to: RequestOutcome) -> Result<RequestOutcome, InvalidTransition> {
        match (self, to) {
            (RequestOutcome::Pending, RequestOutcome::Accepted)
            | (RequestOutcome::Pending, RequestOutcome::Denied) => Ok(to),
            (from, to) => Err(InvalidTransition { from, to }),
        }
    }

    pub fn accept(self) -> Result<RequestOutcome, InvalidTransition> {
        self.transition(RequestOutcome::Accepted)
    }

    pub fn deny(self) -> Result<RequestOutcome, InvalidTransition> {
        self.transition(RequestOutcome::Denied)
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request is {from}, cannot move to {to}")]
pub struct InvalidTransition {
    pub from: RequestOutcome,
    pub to: RequestOutcome,
}

/// A client's offer on a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRequest {
    pub id: RequestId,
    pub property_id: PropertyId,
    pub user_id: UserId,
    pub user_email: String,
    pub offered_price: f64,
    pub outcome: RequestOutcome,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRequest {
    pub property_id: PropertyId,
    pub user_id: UserId,
    pub user_email: String,
    pub offered_price: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub id: ShortlistId,
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortlistEntry {
    pub user_id: UserId,
    pub property_id: PropertyId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserRole {
    Landlord,
    Client,
}

impl UserRole {
    pub const fn label(self) -> &'static str {
        match self {
            UserRole::Landlord => "Landlord",
            UserRole::Client => "Client",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Role lookup record in the `Users` collection. Credentials never live here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserRecordId,
    pub email: String,
    pub role: UserRole,
    pub uid: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub email: String,
    pub role: UserRole,
    pub uid: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_requests_can_be_accepted_or_denied() {
        assert_eq!(
            RequestOutcome::Pending.accept(),
            Ok(RequestOutcome::Accepted)
        );
        assert_eq!(RequestOutcome::Pending.deny(), Ok(RequestOutcome::Denied));
    }

    #[test]
    fn resolved_requests_do_not_move() {
        let err = RequestOutcome::Accepted.deny().expect_err("accepted is final");
        assert_eq!(err.from, RequestOutcome::Accepted);
        assert_eq!(err.to, RequestOutcome::Denied);
        assert!(RequestOutcome::Denied.accept().is_err());
        assert!(RequestOutcome::Pending
            .transition(RequestOutcome::Pending)
            .is_err());
        assert_eq!(err.to_string(), "request is accepted, cannot move to denied");
    }

    #[test]
    fn property_serializes_coordinates_inline() {
        let now = Utc::now();
        let property = Property {
            id: PropertyId::from("prop-000001"),
            title: "Loft".to_string(),
            description: String::new(),
            address: "1 Main St".to_string(),
            price: 1500.0,
            location: GeoPoint {
                latitude: 43.65,
                longitude: -79.38,
            },
            created_by: UserId::from("uid-1"),
            listed: true,
            created_at: now,
            updated_at: now,
        };

        let value = serde_json::to_value(&property).expect("serializes");
        assert_eq!(value["latitude"], serde_json::json!(43.65));
        assert_eq!(value["id"], serde_json::json!("prop-000001"));
    }
}
