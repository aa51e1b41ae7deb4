//! # Session State
//!
//! The single mutable record behind the dashboard. It is owned by the
//! session controller and only changed through the methods below, which keep
//! the histories bounded and the derived values (trend, daily total,
//! buckets) consistent with each other.

use chrono::{DateTime, Local, Timelike};

use super::buckets::RotationBuckets;
use super::event_log::{EventEntry, EventLevel, EventLog};
use super::history::{BoundedHistory, RotationSample, TemperatureSample};
use super::trend::Trend;
use crate::config::HistoryConfig;

/// Broker link state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Dashboard state for one session
#[derive(Debug, Clone)]
pub struct SessionState {
    temperatures: BoundedHistory<TemperatureSample>,
    rotations: BoundedHistory<RotationSample>,
    last_temperature: Option<f64>,
    last_trend: Option<Trend>,
    daily_rotations: u64,
    buckets: RotationBuckets,
    events: EventLog,
    trend_deadband: f64,

    link: LinkStatus,
    broker_online: bool,
    device_online: bool,
    last_update: Option<DateTime<Local>>,
}

impl SessionState {
    #[must_use]
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            temperatures: BoundedHistory::new(config.temperature_capacity),
            rotations: BoundedHistory::new(config.rotation_capacity),
            last_temperature: None,
            last_trend: None,
            daily_rotations: 0,
            buckets: RotationBuckets::new(),
            events: EventLog::new(config.event_log_size),
            trend_deadband: config.trend_deadband,
            link: LinkStatus::Disconnected,
            broker_online: false,
            device_online: false,
            last_update: None,
        }
    }

    /// Records a temperature reading and returns its trend
    /// relative to the previous one.
    pub fn record_temperature(&mut self, value: f64, at: DateTime<Local>) -> Option<Trend> {
        let trend = Trend::classify(self.last_temperature, value, self.trend_deadband);
        if trend.is_some() {
            self.last_trend = trend;
        }
        self.last_temperature = Some(value);
        self.temperatures.push(TemperatureSample {
            timestamp: at,
            value,
        });
        trend
    }

    /// Records one rotation event and returns the new daily total.
    ///
    /// The daily total counts events seen this session; the sensor's own
    /// counter is kept in the sample only.
    pub fn record_rotation(&mut self, count: i64, at: DateTime<Local>) -> u64 {
        self.daily_rotations += 1;
        self.rotations.push(RotationSample::new(at, count));
        self.buckets.record(at.hour(), self.daily_rotations);
        self.daily_rotations
    }

    /// Appends an event log entry (newest first)
    pub fn log_event(&mut self, level: EventLevel, text: impl Into<String>, at: DateTime<Local>) -> &EventEntry {
        self.events.add(level, text, at)
    }

    /// Marks the upstream device as alive and stamps the last update time
    pub fn mark_device_seen(&mut self, at: DateTime<Local>) {
        self.device_online = true;
        self.last_update = Some(at);
    }

    pub fn set_link(&mut self, link: LinkStatus) {
        self.link = link;
    }

    pub fn set_broker_online(&mut self, online: bool) {
        self.broker_online = online;
    }

    #[must_use]
    pub fn link(&self) -> LinkStatus {
        self.link
    }

    #[must_use]
    pub fn broker_online(&self) -> bool {
        self.broker_online
    }

    #[must_use]
    pub fn device_online(&self) -> bool {
        self.device_online
    }

    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Local>> {
        self.last_update
    }

    #[must_use]
    pub fn temperatures(&self) -> &BoundedHistory<TemperatureSample> {
        &self.temperatures
    }

    #[must_use]
    pub fn rotations(&self) -> &BoundedHistory<RotationSample> {
        &self.rotations
    }

    #[must_use]
    pub fn last_temperature(&self) -> Option<f64> {
        self.last_temperature
    }

    /// Most recent classified trend
    #[must_use]
    pub fn trend(&self) -> Option<Trend> {
        self.last_trend
    }

    #[must_use]
    pub fn daily_rotations(&self) -> u64 {
        self.daily_rotations
    }

    #[must_use]
    pub fn buckets(&self) -> &RotationBuckets {
        &self.buckets
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn state() -> SessionState {
        SessionState::new(&HistoryConfig::default())
    }

    fn at_hour(hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 1, hour, 30, 0).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.link(), LinkStatus::Disconnected);
        assert!(!state.broker_online());
        assert!(!state.device_online());
        assert_eq!(state.last_update(), None);
        assert_eq!(state.daily_rotations(), 0);
        assert!(state.temperatures().is_empty());
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_temperature_trend_sequence() {
        let mut state = state();
        let t = at_hour(10);
        assert_eq!(state.record_temperature(20.0, t), None);
        assert_eq!(state.record_temperature(20.05, t), Some(Trend::Stable));
        assert_eq!(state.record_temperature(20.3, t), Some(Trend::Rising));
        assert_eq!(state.record_temperature(19.8, t), Some(Trend::Falling));
        assert_eq!(state.trend(), Some(Trend::Falling));
        assert_eq!(state.last_temperature(), Some(19.8));
    }

    #[test]
    fn test_temperature_history_keeps_last_100() {
        let mut state = state();
        let start = at_hour(8);
        for i in 0..150 {
            state.record_temperature(i as f64, start + Duration::seconds(i));
        }

        assert_eq!(state.temperatures().len(), 100);
        let values: Vec<f64> = state.temperatures().iter().map(|s| s.value).collect();
        let expected: Vec<f64> = (50..150).map(|i| i as f64).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_rotation_counter_survives_eviction() {
        let mut state = state();
        for i in 0..73 {
            state.record_rotation(1000 + i, at_hour(14));
        }
        assert_eq!(state.rotations().len(), 50);
        assert_eq!(state.daily_rotations(), 73);
        assert_eq!(state.rotations().latest().unwrap().count, 1072);
    }

    #[test]
    fn test_rotation_counter_ignores_sensor_value() {
        let mut state = state();
        assert_eq!(state.record_rotation(500, at_hour(1)), 1);
        assert_eq!(state.record_rotation(7, at_hour(1)), 2);
    }

    #[test]
    fn test_rotation_updates_bucket_for_hour() {
        let mut state = state();
        state.record_rotation(1, at_hour(5));
        state.record_rotation(2, at_hour(23));
        assert_eq!(state.buckets().values(), &[0, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn test_mark_device_seen() {
        let mut state = state();
        let t = at_hour(9);
        state.mark_device_seen(t);
        assert!(state.device_online());
        assert_eq!(state.last_update(), Some(t));
    }

    #[test]
    fn test_event_log_bounded() {
        let mut state = state();
        for i in 0..12 {
            state.log_event(EventLevel::Info, format!("e{}", i), at_hour(3));
        }
        assert_eq!(state.events().len(), 10);
        assert_eq!(state.events().newest().unwrap().text, "e11");
    }
}
