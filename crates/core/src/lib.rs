//! Holiday Chill Core
//!
//! Response selection for the Holiday Chill voice action: the static content
//! catalog, per-session state, the intent dispatcher, and the reply values it
//! produces. Nothing here knows about HTTP; the `api` service adapts these
//! types to the webhook wire format.

pub mod catalog;
pub mod dispatcher;
pub mod fallback;
pub mod reply;
pub mod responder;
pub mod session;
pub mod session_store;
