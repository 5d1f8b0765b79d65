//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the immutable
//! dispatcher (and through it the catalog) plus the session repository.

use crate::config::Config;
use holiday_chill_core::{
    catalog::Catalog,
    dispatcher::Dispatcher,
    session_store::{InMemorySessionStore, SessionStore},
};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires a dispatcher over `catalog` and an in-memory session store from `config`.
    pub fn new(catalog: Catalog, config: Config) -> anyhow::Result<Self> {
        let ttl = chrono::Duration::from_std(config.session_ttl)?;
        Ok(Self {
            dispatcher: Arc::new(Dispatcher::new(Arc::new(catalog), config.content_policy)),
            sessions: Arc::new(InMemorySessionStore::new(ttl)),
            config: Arc::new(config),
        })
    }
}
