//! Accounts, sessions, and the role-based navigation gate.

pub mod auth;
pub mod navigation;
pub mod service;

pub use auth::{AuthError, AuthProvider, AuthUser, InMemoryAuthProvider, Session, SessionToken};
pub use navigation::{resolve_role, GateState, HomeGraph, NavigationGate, Screen};
pub use service::{AccessError, AccessService, SignInForm, SignUpForm, SignedIn, Viewer};
