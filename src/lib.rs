//! Finn: a client for the Finn AI personal finance backend.
//!
//! The crate holds the pieces a Finn front-end needs that are not presentation: a persisted
//! session with an auth gate, a typed client for every backend endpoint, and the aggregation
//! that turns raw transactions into dashboard series. The `finn` binary drives all of it from the
//! command line.

pub mod aggregate;
pub mod api;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
pub mod model;
pub mod session;
mod utils;

#[cfg(test)]
mod test;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use error::{Error, Result};
