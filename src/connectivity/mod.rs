//! Connectivity module
//!
//! Tracks online/offline transitions of the device.
//!
//! # Features
//!
//! - **Monitor**: collapses repeated network signals into transitions
//! - **Probe**: periodic TCP reachability check that feeds a running feed

mod monitor;
mod probe;

pub use monitor::{ConnectivityMonitor, Transition};
pub use probe::TcpProbe;

#[cfg(test)]
mod tests;
