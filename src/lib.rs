//! Desktopový dashboard pro ESP datalogger teploty a vlhkosti.

pub mod api;
pub mod app;
pub mod chart;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod model;
pub mod payload;
pub mod state;
pub mod worker;

pub use controller::{ActionOutcome, Dashboard};
pub use error::{DashboardError, Result};
