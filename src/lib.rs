//! Epoch server status dashboard.
//!
//! Reads the markdown status log written by the probe, folds it into one card
//! per service, and follows recent commits on the configured GitHub branches.

pub mod app;
pub mod config;
pub mod contexts;
pub mod error;
pub mod localtime;
pub mod notify;
pub mod palette;
pub mod probe;
pub mod schedule;
pub mod snapshot;
pub mod sources;
pub mod status;
pub mod widgets;

pub use error::{DashboardError, Result};
