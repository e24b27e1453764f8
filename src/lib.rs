//! powerwatch library entry.
//!
//! The binary (`main.rs`) and the integration tests wire these modules
//! together: announcement listener and poller feed the shared registry and
//! metrics store, the HTTP layer exposes both.

pub mod client;
pub mod config;
pub mod discovery;
pub mod http;
pub mod metrics;
pub mod models;
pub mod poller;
pub mod registry;
pub mod supervisor;
