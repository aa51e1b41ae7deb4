//! # Dashboard Sink Module
//!
//! Output side of the dashboard. The session controller does not draw
//! anything itself; it pushes chart series and status changes into sinks.
//!
//! This module handles:
//! - Chart series updates ("set data + redraw")
//! - Status indicators (feed, device, broker)
//! - Reading, trend, last-update and event-log notifications
//! - A JSON Lines renderer for headless use

pub mod jsonl;

pub use jsonl::JsonlRenderer;

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::session::{EventEntry, Trend};

/// Charts on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Chart {
    Temperature,
    Rotation,
}

/// Status indicators on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    /// Broker link as seen by the dashboard
    Feed,
    /// Upstream sensor device
    Device,
    /// Broker reachability
    Broker,
}

/// Visual state of an indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorState {
    Connecting,
    Connected,
    Disconnected,
    Online,
    Offline,
}

/// Receives chart data
pub trait ChartSink {
    /// Replace a chart's series and redraw it
    fn set_series(&mut self, chart: Chart, labels: &[String], values: &[f64]);
}

/// Receives status and text updates
///
/// Only `set_status` is required; the remaining hooks default to no-ops.
pub trait StatusSink {
    fn set_status(&mut self, indicator: Indicator, state: IndicatorState, text: &str);

    fn show_temperature(&mut self, _value: f64, _trend: Option<Trend>, _at: DateTime<Local>) {}

    fn show_rotation(&mut self, _count: i64, _today: u64, _at: DateTime<Local>) {}

    fn show_last_update(&mut self, _at: DateTime<Local>) {}

    fn show_event(&mut self, _entry: &EventEntry) {}

    fn show_broker_address(&mut self, _address: &str) {}
}

/// Everything the session controller renders to
pub trait DashboardSink: ChartSink + StatusSink {}

impl<T: ChartSink + StatusSink> DashboardSink for T {}

#[cfg(test)]
pub mod mocks {
    //! Recording sink for controller tests.

    use super::*;

    /// Keeps every update it receives
    #[derive(Debug, Default)]
    pub struct RecordingSink {
        pub series: Vec<(Chart, Vec<String>, Vec<f64>)>,
        pub statuses: Vec<(Indicator, IndicatorState, String)>,
        pub temperatures: Vec<(f64, Option<Trend>)>,
        pub rotations: Vec<(i64, u64)>,
        pub last_updates: Vec<DateTime<Local>>,
        pub events: Vec<EventEntry>,
        pub broker_address: Option<String>,
    }

    impl RecordingSink {
        pub fn new() -> Self {
            Self::default()
        }

        /// Last status reported for an indicator
        pub fn status(&self, indicator: Indicator) -> Option<IndicatorState> {
            self.statuses
                .iter()
                .rev()
                .find(|(i, _, _)| *i == indicator)
                .map(|(_, state, _)| *state)
        }

        pub fn series_for(&self, chart: Chart) -> Vec<&(Chart, Vec<String>, Vec<f64>)> {
            self.series.iter().filter(|(c, _, _)| *c == chart).collect()
        }

        pub fn event_texts(&self) -> Vec<&str> {
            self.events.iter().map(|e| e.text.as_str()).collect()
        }
    }

    impl ChartSink for RecordingSink {
        fn set_series(&mut self, chart: Chart, labels: &[String], values: &[f64]) {
            self.series.push((chart, labels.to_vec(), values.to_vec()));
        }
    }

    impl StatusSink for RecordingSink {
        fn set_status(&mut self, indicator: Indicator, state: IndicatorState, text: &str) {
            self.statuses.push((indicator, state, text.to_string()));
        }

        fn show_temperature(&mut self, value: f64, trend: Option<Trend>, _at: DateTime<Local>) {
            self.temperatures.push((value, trend));
        }

        fn show_rotation(&mut self, count: i64, today: u64, _at: DateTime<Local>) {
            self.rotations.push((count, today));
        }

        fn show_last_update(&mut self, at: DateTime<Local>) {
            self.last_updates.push(at);
        }

        fn show_event(&mut self, entry: &EventEntry) {
            self.events.push(entry.clone());
        }

        fn show_broker_address(&mut self, address: &str) {
            self.broker_address = Some(address.to_string());
        }
    }
}
