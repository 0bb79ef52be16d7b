//! Application-foundation layer
//!
//! Brings the member crates together behind one setup surface:
//! - `herald-dispatch`: outbound multi-channel message delivery
//! - `herald-config`: layered, cached configuration lookup
//! - `herald-common`: contact parsing, retry/backoff, logging
//!
//! plus this crate's own database facade and application wiring. Hosts call
//! [`herald_common::logging::init`] once at startup, then [`Foundation::setup`]
//! with their collaborators.

pub mod data;
pub mod foundation;

pub use herald_common as common;
pub use herald_config as config;
pub use herald_dispatch as dispatch;

pub use data::{Capabilities, ConnectionGate, Database, DatabaseProvider, Row};
pub use foundation::{Collaborators, Context, Foundation, FoundationOptions};
