//! Lead protection, contract gating and AI advisory for the Nawafiz broker network.

pub mod advisory;
pub mod affiliate;
pub mod config;
pub mod error;
pub mod telemetry;
