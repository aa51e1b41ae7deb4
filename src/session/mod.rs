//! # Session Module
//!
//! In-memory dashboard state for one telemetry session.
//!
//! This module handles:
//! - Bounded FIFO histories for temperature and rotation samples
//! - Temperature trend classification with a dead-band
//! - Four-hour rotation buckets for the bar chart
//! - The newest-first event log
//! - Link, device and broker status

pub mod buckets;
pub mod clock;
pub mod event_log;
pub mod history;
pub mod state;
pub mod trend;

pub use buckets::RotationBuckets;
pub use clock::{Clock, SystemClock};
pub use event_log::{EventEntry, EventLevel, EventLog};
pub use history::{BoundedHistory, RotationSample, TemperatureSample};
pub use state::{LinkStatus, SessionState};
pub use trend::Trend;
