//! # Simulator Module
//!
//! Offline feed used while no broker session is up.
//!
//! Temperature follows a slow heating/cooling cycle,
//! `base + amplitude * sin(t / period)`, and a rotation event is produced on
//! every third tick. The output is deterministic for a given time so that
//! tests can pin it down.

/// Default centre of the temperature cycle in °C
pub const DEFAULT_BASE_TEMPERATURE: f64 = 25.0;

/// Default swing of the temperature cycle in °C
pub const DEFAULT_AMPLITUDE: f64 = 5.0;

/// Default period divisor of the cycle in seconds
pub const DEFAULT_PERIOD_S: f64 = 100.0;

/// Ticks between simulated rotation events
pub const ROTATION_EVERY_TICKS: u64 = 3;

/// One simulated tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulatedReading {
    pub temperature: f64,
    /// Absolute counter for a rotation event, if this tick produced one
    pub rotation: Option<i64>,
}

/// Deterministic reading generator
#[derive(Debug, Clone)]
pub struct Simulator {
    base: f64,
    amplitude: f64,
    period_s: f64,
    ticks: u64,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_TEMPERATURE, DEFAULT_AMPLITUDE, DEFAULT_PERIOD_S)
    }
}

impl Simulator {
    /// `period_s` must be positive; non-positive values fall back to the default.
    #[must_use]
    pub fn new(base: f64, amplitude: f64, period_s: f64) -> Self {
        let period_s = if period_s > 0.0 { period_s } else { DEFAULT_PERIOD_S };
        Self {
            base,
            amplitude,
            period_s,
            ticks: 0,
        }
    }

    /// Temperature at `t_secs` seconds since the epoch
    #[must_use]
    pub fn temperature_at(&self, t_secs: f64) -> f64 {
        self.base + self.amplitude * (t_secs / self.period_s).sin()
    }

    /// Produce the reading for this tick
    ///
    /// `daily_total` is the dashboard's current rotation total; a simulated
    /// rotation reports the next value as its absolute counter.
    pub fn tick(&mut self, t_secs: f64, daily_total: u64) -> SimulatedReading {
        self.ticks += 1;
        let rotation = (self.ticks % ROTATION_EVERY_TICKS == 0)
            .then(|| i64::try_from(daily_total).unwrap_or(i64::MAX).saturating_add(1));

        SimulatedReading {
            temperature: self.temperature_at(t_secs),
            rotation,
        }
    }

    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
