use serde::Serialize;
use tracing::{debug, warn};

use super::auth::AuthUser;
use crate::domain::UserRole;
use crate::store::RentalStore;

/// Screens the mobile client can mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    SignIn,
    SignUp,
    ClientHome,
    LandlordHome,
    PropertyList,
    PropertyDetails,
    PropertyDetailLandlord,
    AddProperty,
    EditProperty,
    LandlordCheckRequest,
}

/// The screen graph a session is routed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeGraph {
    Welcome,
    Landlord,
    Client,
}

impl HomeGraph {
    pub const fn for_role(role: UserRole) -> Self {
        match role {
            UserRole::Landlord => HomeGraph::Landlord,
            UserRole::Client => HomeGraph::Client,
        }
    }

    pub const fn initial_screen(self) -> Screen {
        match self {
            HomeGraph::Welcome => Screen::SignIn,
            HomeGraph::Landlord => Screen::LandlordHome,
            HomeGraph::Client => Screen::ClientHome,
        }
    }

    pub const fn screens(self) -> &'static [Screen] {
        match self {
            HomeGraph::Welcome => &[Screen::SignIn, Screen::SignUp],
            HomeGraph::Landlord => &[
                Screen::LandlordHome,
                Screen::PropertyList,
                Screen::PropertyDetailLandlord,
                Screen::AddProperty,
                Screen::EditProperty,
                Screen::LandlordCheckRequest,
            ],
            HomeGraph::Client => &[
                Screen::ClientHome,
                Screen::PropertyList,
                Screen::PropertyDetails,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Loading,
    Resolved(HomeGraph),
}

/// Looks up the role stored for `email`. Lookup failures resolve to no role.
pub fn resolve_role<S>(store: &S, email: &str) -> Option<UserRole>
where
    S: RentalStore + ?Sized,
{
    match store.users_by_email(email) {
        Ok(records) => {
            let role = records.first().map(|record| record.role);
            if role.is_none() {
                debug!(%email, "no user record found for email");
            }
            role
        }
        Err(err) => {
            warn!(%email, error = %err, "user role lookup failed");
            None
        }
    }
}

/// Picks the home graph whenever the auth state changes.
#[derive(Debug, Clone)]
pub struct NavigationGate {
    state: GateState,
}

impl Default for NavigationGate {
    fn default() -> Self {
        Self::new()
    }
}

impl NavigationGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Loading,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn on_auth_state_changed<S>(&mut self, store: &S, user: Option<&AuthUser>) -> HomeGraph
    where
        S: RentalStore + ?Sized,
    {
        self.state = GateState::Loading;
        let graph = match user {
            None => HomeGraph::Welcome,
            Some(user) => match resolve_role(store, &user.email) {
                Some(UserRole::Landlord) => HomeGraph::Landlord,
                Some(UserRole::Client) | None => HomeGraph::Client,
            },
        };
        self.state = GateState::Resolved(graph);
        graph
    }
}
