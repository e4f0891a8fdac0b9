//! Session-scoped industry sector selection service.
//!
//! Exposes a fixed hierarchical catalog of industry sectors and lets each
//! anonymous session save exactly one selection: a display name, a subset of
//! sector ids, and a terms acknowledgement. The catalog is read-only at
//! runtime; selections follow a create-once/update-thereafter state machine
//! keyed by an opaque session token.

pub mod api;
pub mod catalog;
pub mod database;
pub mod error;
pub mod models;
pub mod service;

pub use error::{SelectError, SelectResult};
