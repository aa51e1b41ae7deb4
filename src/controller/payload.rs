//! Parsing of plain-text sensor payloads.
//!
//! Payloads are bare numbers (`"21.7"`, `"1042"`). Surrounding whitespace is
//! tolerated; anything else is rejected so that a bad reading never reaches
//! the session state.

use crate::error::{DashboardError, Result};

/// Parse a temperature payload as a finite `f64`
pub fn parse_temperature(topic: &str, payload: &str) -> Result<f64> {
    payload
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| malformed(topic, payload))
}

/// Parse a rotation payload as the sensor's absolute counter
pub fn parse_rotation(topic: &str, payload: &str) -> Result<i64> {
    payload
        .trim()
        .parse::<i64>()
        .map_err(|_| malformed(topic, payload))
}

fn malformed(topic: &str, payload: &str) -> DashboardError {
    DashboardError::Payload {
        topic: topic.to_string(),
        payload: payload.to_string(),
    }
}
