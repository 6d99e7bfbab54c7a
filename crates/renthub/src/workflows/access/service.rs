use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::auth::{AuthError, AuthProvider, AuthUser, Session, SessionToken};
use super::navigation::{resolve_role, HomeGraph, NavigationGate};
use crate::domain::{NewUserRecord, UserId, UserRole};
use crate::store::{RentalStore, StoreError};

#[derive(Debug, Clone, Deserialize)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Session plus the screen graph it was routed into.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub session: Session,
    pub home: HomeGraph,
}

/// A signed-in user with their resolved role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Viewer {
    pub uid: UserId,
    pub email: String,
    pub role: UserRole,
}

impl Viewer {
    pub fn is_landlord(&self) -> bool {
        self.role == UserRole::Landlord
    }
}

/// Sign-up, sign-in, and session resolution on top of the auth provider and user records.
pub struct AccessService<S, A> {
    store: Arc<S>,
    auth: Arc<A>,
}

impl<S, A> AccessService<S, A>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    pub fn new(store: Arc<S>, auth: Arc<A>) -> Self {
        Self { store, auth }
    }

    pub fn sign_up(&self, form: SignUpForm) -> Result<SignedIn, AccessError> {
        let email = normalize_email(&form.email);
        if email.is_empty() || form.password.is_empty() {
            return Err(AccessError::MissingCredentials);
        }

        let existing = self.store.users_by_email(&email)?;
        if existing.iter().any(|record| record.role == form.role) {
            return Err(AccessError::AlreadyRegistered {
                email,
                role: form.role,
            });
        }

        let session = self.auth.create_account(&email, &form.password)?;
        if let Err(err) = self.store.insert_user(NewUserRecord {
            email: email.clone(),
            role: form.role,
            uid: session.user.uid.clone(),
        }) {
            if let Err(cleanup) = self.auth.delete_account(&email) {
                warn!(%email, error = %cleanup, "auth account left without a user record");
            }
            warn!(%email, error = %err, "sign up rolled back");
            return Err(err.into());
        }

        info!(%email, role = %form.role, "user signed up");
        Ok(SignedIn {
            session,
            home: HomeGraph::for_role(form.role),
        })
    }

    pub fn sign_in(&self, form: SignInForm) -> Result<SignedIn, AccessError> {
        let email = normalize_email(&form.email);
        if email.is_empty() || form.password.is_empty() {
            return Err(AccessError::MissingCredentials);
        }

        let session = self.auth.sign_in(&email, &form.password)?;
        let home = NavigationGate::new().on_auth_state_changed(&*self.store, Some(&session.user));
        Ok(SignedIn { session, home })
    }

    pub fn sign_out(&self, token: &SessionToken) -> Result<(), AccessError> {
        self.auth.sign_out(token)?;
        Ok(())
    }

    pub fn current_user(&self, token: &SessionToken) -> Result<AuthUser, AccessError> {
        self.auth
            .current_user(token)?
            .ok_or(AccessError::Unauthenticated)
    }

    /// Resolves the session to a viewer; users without a record are treated as clients.
    pub fn viewer(&self, token: Option<&SessionToken>) -> Result<Viewer, AccessError> {
        let token = token.ok_or(AccessError::Unauthenticated)?;
        let user = self.current_user(token)?;
        let role = resolve_role(&*self.store, &user.email).unwrap_or(UserRole::Client);
        Ok(Viewer {
            uid: user.uid,
            email: user.email,
            role,
        })
    }

    /// Home graph for an optional session; unknown or expired tokens land on the welcome graph.
    pub fn home(&self, token: Option<&SessionToken>) -> Result<(Option<AuthUser>, HomeGraph), AccessError> {
        let user = match token {
            Some(token) => self.auth.current_user(token)?,
            None => None,
        };
        let home = NavigationGate::new().on_auth_state_changed(&*self.store, user.as_ref());
        Ok((user, home))
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    #[error("Email and Password is mandatory!")]
    MissingCredentials,
    #[error("{email} is already registered as a {role}")]
    AlreadyRegistered { email: String, role: UserRole },
    #[error("sign in required")]
    Unauthenticated,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
