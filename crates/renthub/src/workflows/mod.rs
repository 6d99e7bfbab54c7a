pub mod access;
pub mod listings;
pub mod requests;
pub mod shortlist;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::store::RentalStore;
use access::{AccessService, AuthProvider};
use listings::ListingService;
use requests::RequestWorkflow;
use shortlist::ShortlistService;

/// Every workflow wired to one store and auth provider.
pub struct RentHub<S, A> {
    pub access: AccessService<S, A>,
    pub listings: ListingService<S>,
    pub requests: RequestWorkflow<S>,
    pub shortlist: ShortlistService<S>,
}

impl<S, A> RentHub<S, A>
where
    S: RentalStore + 'static,
    A: AuthProvider + 'static,
{
    pub fn new(store: Arc<S>, auth: Arc<A>) -> Self {
        Self {
            access: AccessService::new(store.clone(), auth),
            listings: ListingService::new(store.clone()),
            requests: RequestWorkflow::new(store.clone()),
            shortlist: ShortlistService::new(store),
        }
    }
}
