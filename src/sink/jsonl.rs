//! # JSON Lines Renderer
//!
//! Writes every dashboard update as one JSON object per line, so the
//! dashboard can be tailed, piped into another UI, or captured to a file.
//!
//! Each record carries a `kind` tag:
//!
//! ```text
//! {"kind":"status","indicator":"feed","state":"connected","text":"Connected"}
//! {"kind":"series","chart":"temperature","labels":["10:15"],"values":[21.4]}
//! {"kind":"temperature","value":21.4,"display":"21.4","trend":"rising","at":"10:15:02"}
//! {"kind":"event","level":"info","text":"Temperature updated: 21.4°C","at":"10:15:02"}
//! ```

use std::io::Write;

use chrono::{DateTime, Local};
use serde::Serialize;
use tracing::warn;

use super::{Chart, ChartSink, Indicator, IndicatorState, StatusSink};
use crate::session::{EventEntry, EventLevel, Trend};

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Record<'a> {
    Series {
        chart: Chart,
        labels: &'a [String],
        values: &'a [f64],
    },
    Status {
        indicator: Indicator,
        state: IndicatorState,
        text: &'a str,
    },
    Temperature {
        value: f64,
        display: String,
        trend: Option<Trend>,
        at: String,
    },
    Rotation {
        count: i64,
        today: u64,
        at: String,
    },
    LastUpdate {
        at: String,
    },
    Event {
        level: EventLevel,
        text: &'a str,
        at: String,
    },
    BrokerAddress {
        address: &'a str,
    },
}

fn time_label(at: DateTime<Local>) -> String {
    at.format("%H:%M:%S").to_string()
}

/// Renders dashboard updates as JSON Lines
pub struct JsonlRenderer<W: Write> {
    writer: W,
    records_written: u64,
}

impl<W: Write> JsonlRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            records_written: 0,
        }
    }

    /// Number of records successfully written
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn emit(&mut self, record: &Record<'_>) {
        let result = serde_json::to_writer(&mut self.writer, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.writer.write_all(b"\n"))
            .and_then(|()| self.writer.flush());

        match result {
            Ok(()) => self.records_written += 1,
            Err(e) => warn!("Failed to write dashboard record: {}", e),
        }
    }
}

impl<W: Write> ChartSink for JsonlRenderer<W> {
    fn set_series(&mut self, chart: Chart, labels: &[String], values: &[f64]) {
        self.emit(&Record::Series {
            chart,
            labels,
            values,
        });
    }
}

impl<W: Write> StatusSink for JsonlRenderer<W> {
    fn set_status(&mut self, indicator: Indicator, state: IndicatorState, text: &str) {
        self.emit(&Record::Status {
            indicator,
            state,
            text,
        });
    }

    fn show_temperature(&mut self, value: f64, trend: Option<Trend>, at: DateTime<Local>) {
        self.emit(&Record::Temperature {
            value,
            display: format!("{:.1}", value),
            trend,
            at: time_label(at),
        });
    }

    fn show_rotation(&mut self, count: i64, today: u64, at: DateTime<Local>) {
        self.emit(&Record::Rotation {
            count,
            today,
            at: time_label(at),
        });
    }

    fn show_last_update(&mut self, at: DateTime<Local>) {
        self.emit(&Record::LastUpdate { at: time_label(at) });
    }

    fn show_event(&mut self, entry: &EventEntry) {
        self.emit(&Record::Event {
            level: entry.level,
            text: &entry.text,
            at: entry.time_label(),
        });
    }

    fn show_broker_address(&mut self, address: &str) {
        self.emit(&Record::BrokerAddress { address });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::Value;

    fn lines(renderer: JsonlRenderer<Vec<u8>>) -> Vec<Value> {
        let bytes = renderer.into_inner();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_series_record() {
        let mut renderer = JsonlRenderer::new(Vec::new());
        renderer.set_series(
            Chart::Temperature,
            &["10:00".to_string(), "10:01".to_string()],
            &[21.0, 21.5],
        );
        assert_eq!(renderer.records_written(), 1);

        let records = lines(renderer);
        assert_eq!(records[0]["kind"], "series");
        assert_eq!(records[0]["chart"], "temperature");
        assert_eq!(records[0]["labels"][1], "10:01");
        assert_eq!(records[0]["values"][1], 21.5);
    }

    #[test]
    fn test_status_record() {
        let mut renderer = JsonlRenderer::new(Vec::new());
        renderer.set_status(Indicator::Broker, IndicatorState::Offline, "Offline");

        let records = lines(renderer);
        assert_eq!(records[0]["kind"], "status");
        assert_eq!(records[0]["indicator"], "broker");
        assert_eq!(records[0]["state"], "offline");
        assert_eq!(records[0]["text"], "Offline");
    }

    #[test]
    fn test_temperature_record_formats_one_decimal() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 10, 15, 2).unwrap();
        let mut renderer = JsonlRenderer::new(Vec::new());
        renderer.show_temperature(21.44, Some(Trend::Rising), at);
        renderer.show_temperature(20.0, None, at);

        let records = lines(renderer);
        assert_eq!(records[0]["display"], "21.4");
        assert_eq!(records[0]["trend"], "rising");
        assert_eq!(records[0]["at"], "10:15:02");
        assert!(records[1]["trend"].is_null());
    }

    #[test]
    fn test_event_record() {
        let entry = EventEntry {
            level: EventLevel::Success,
            text: "Connected to MQTT broker".to_string(),
            at: Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(),
        };
        let mut renderer = JsonlRenderer::new(Vec::new());
        renderer.show_event(&entry);

        let records = lines(renderer);
        assert_eq!(records[0]["kind"], "event");
        assert_eq!(records[0]["level"], "success");
        assert_eq!(records[0]["at"], "08:00:00");
    }

    #[test]
    fn test_one_record_per_line() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut renderer = JsonlRenderer::new(Vec::new());
        renderer.show_rotation(12, 3, at);
        renderer.show_last_update(at);
        renderer.show_broker_address("localhost:1883");

        let records = lines(renderer);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["kind"], "rotation");
        assert_eq!(records[1]["kind"], "last_update");
        assert_eq!(records[2]["kind"], "broker_address");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_not_counted() {
        let mut renderer = JsonlRenderer::new(FailingWriter);
        renderer.set_status(Indicator::Feed, IndicatorState::Connecting, "Connecting...");
        assert_eq!(renderer.records_written(), 0);
    }
}
