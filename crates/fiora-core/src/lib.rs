//! Fiora core domain — SAP Fiori automation orchestration.
//!
//! Transport-agnostic building blocks:
//! - workflow models and the execution state machine
//! - the CUA client for driving a rented cloud browser agent
//! - the in-memory execution registry and rented-agent registry
//! - the progress broadcaster feeding live subscribers
//! - the workflow execution engine tying them together
//!
//! The HTTP surface lives in `fiora-server`; this crate can be embedded
//! in other hosts (CLI, tests) directly.

pub mod config;
pub mod cua;
pub mod engine;
pub mod error;
pub mod events;
pub mod models;
pub mod state;
pub mod store;
pub mod template;

pub use config::{AppConfig, CuaConfig};
pub use error::AutomatorError;
pub use state::{AppState, AppStateInner};
