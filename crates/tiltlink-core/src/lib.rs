#![cfg_attr(not(test), no_std)]

//! Board-independent core of the tiltlink accelerometer telemetry agent.
//!
//! Hardware lives behind three traits: [`session::WifiLink`],
//! [`acquisition::AccelSensor`] and [`delivery::Transport`]. Everything in
//! this crate runs on the host under `cargo test`.

pub mod acquisition;
pub mod agent;
pub mod config;
pub mod delivery;
pub mod http;
pub mod payload;
pub mod reading;
pub mod session;
pub mod url;

#[cfg(test)]
mod fakes;
