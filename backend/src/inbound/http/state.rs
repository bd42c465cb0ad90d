//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the domain services and remain testable without a running
//! server.

use std::sync::Arc;

use crate::domain::{AccountService, RecipeService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<AccountService>,
    pub recipes: Arc<RecipeService>,
}

impl HttpState {
    /// Bundle the two domain services the handlers need.
    pub fn new(accounts: Arc<AccountService>, recipes: Arc<RecipeService>) -> Self {
        Self { accounts, recipes }
    }
}
