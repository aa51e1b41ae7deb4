//! # Temperature Trend
//!
//! Classifies the change between two consecutive temperature readings.
//!
//! A dead-band suppresses flicker from sensor noise: a change whose
//! magnitude is at most the threshold is reported as stable. The threshold
//! itself is inclusive, so with the default of 0.1 a change of exactly 0.1
//! is still stable.

use serde::Serialize;

/// Direction of the latest temperature change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// Classifies `current` against `previous`.
    ///
    /// Returns `None` for the first sample of a session (no previous value).
    ///
    /// # Examples
    ///
    /// ```
    /// use telemetry_dashboard::session::Trend;
    ///
    /// assert_eq!(Trend::classify(None, 20.0, 0.1), None);
    /// assert_eq!(Trend::classify(Some(20.0), 20.05, 0.1), Some(Trend::Stable));
    /// assert_eq!(Trend::classify(Some(20.0), 20.2, 0.1), Some(Trend::Rising));
    /// assert_eq!(Trend::classify(Some(20.0), 19.8, 0.1), Some(Trend::Falling));
    /// ```
    #[must_use]
    pub fn classify(previous: Option<f64>, current: f64, deadband: f64) -> Option<Self> {
        let delta = current - previous?;
        Some(if delta.abs() <= deadband {
            Trend::Stable
        } else if delta > 0.0 {
            Trend::Rising
        } else {
            Trend::Falling
        })
    }

    /// Display text for the trend indicator
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Trend::Rising => "Rising",
            Trend::Falling => "Falling",
            Trend::Stable => "Stable",
        }
    }
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
