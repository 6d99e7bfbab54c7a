use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ulid::Ulid;

use crate::domain::UserId;

/// Opaque session handle issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

/// Identity as the auth provider sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: SessionToken,
    pub user: AuthUser,
}

/// Email/password authentication service the workflows delegate to.
pub trait AuthProvider: Send + Sync {
    fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
    fn current_user(&self, token: &SessionToken) -> Result<Option<AuthUser>, AuthError>;
    fn sign_out(&self, token: &SessionToken) -> Result<(), AuthError>;
    /// Removes the account and ends every session it holds.
    fn delete_account(&self, email: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("an account already exists for {0}")]
    EmailInUse(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password should be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
struct Account {
    uid: UserId,
    salt: String,
    digest: String,
}

#[derive(Debug, Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    sessions: HashMap<SessionToken, AuthUser>,
}

/// Local stand-in for the managed auth service.
#[derive(Debug, Default)]
pub struct InMemoryAuthProvider {
    state: Mutex<AuthState>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, AuthState>, AuthError> {
        self.state
            .lock()
            .map_err(|_| AuthError::Unavailable("auth lock poisoned".to_string()))
    }

    fn open_session(state: &mut AuthState, user: AuthUser) -> Session {
        let token = SessionToken(Ulid::new().to_string());
        state.sessions.insert(token.clone(), user.clone());
        Session { token, user }
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

impl AuthProvider for InMemoryAuthProvider {
    fn create_account(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LEN,
            });
        }

        let mut state = self.lock()?;
        if state.accounts.contains_key(email) {
            return Err(AuthError::EmailInUse(email.to_string()));
        }

        let salt = Ulid::new().to_string();
        let account = Account {
            uid: UserId(format!("uid-{}", Ulid::new().to_string().to_ascii_lowercase())),
            digest: digest(&salt, password),
            salt,
        };
        let user = AuthUser {
            uid: account.uid.clone(),
            email: email.to_string(),
        };
        state.accounts.insert(email.to_string(), account);
        Ok(Self::open_session(&mut state, user))
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut state = self.lock()?;
        let uid = match state.accounts.get(email) {
            Some(account) if account.digest == digest(&account.salt, password) => {
                account.uid.clone()
            }
            _ => return Err(AuthError::InvalidCredentials),
        };
        let user = AuthUser {
            uid,
            email: email.to_string(),
        };
        Ok(Self::open_session(&mut state, user))
    }

    fn current_user(&self, token: &SessionToken) -> Result<Option<AuthUser>, AuthError> {
        Ok(self.lock()?.sessions.get(token).cloned())
    }

    fn sign_out(&self, token: &SessionToken) -> Result<(), AuthError> {
        self.lock()?.sessions.remove(token);
        Ok(())
    }

    fn delete_account(&self, email: &str) -> Result<(), AuthError> {
        let mut state = self.lock()?;
        if let Some(account) = state.accounts.remove(email) {
            state.sessions.retain(|_, user| user.uid != account.uid);
        }
        Ok(())
    }
}
