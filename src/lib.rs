//! Tactical overview engine for a host and service monitoring system.
//!
//! Reads host topology and status snapshots produced by the monitoring
//! core, tallies fleet health and finds root-cause network outages.

pub mod access;
pub mod config;
pub mod model;
pub mod snapshot;
pub mod tactical;
pub mod web;
