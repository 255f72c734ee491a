//! Wildward REST host.
//!
//! Wraps the `wildward-game` simulation in an Axum HTTP server with a
//! background tick loop.

pub mod context;
pub mod rest;

pub use context::{AppContext, now_epoch_ms};
