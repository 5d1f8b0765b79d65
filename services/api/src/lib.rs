//! Holiday Chill API Library Crate
//!
//! This library contains the HTTP side of the Holiday Chill webhook: the
//! configuration, the shared application state, the webhook wire models and
//! handlers, and routing. The `api` binary is a thin wrapper around it.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
