//! # Telemetry Dashboard Library
//!
//! Live sensor dashboard fed by an MQTT broker.
//!
//! The dashboard subscribes to a temperature topic and a rotation topic,
//! keeps bounded in-memory histories of both, derives the temperature trend
//! and the daily rotation total, and pushes chart series, status indicators
//! and an event log into a pluggable sink.

pub mod config;
pub mod controller;
pub mod error;
pub mod session;
pub mod simulator;
pub mod sink;
pub mod transport;
