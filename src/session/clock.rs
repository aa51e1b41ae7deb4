//! Wall-clock source for sample timestamps and bucket hours.

use chrono::{DateTime, Local};

/// Source of local wall-clock time
pub trait Clock: Send {
    fn now(&self) -> DateTime<Local>;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
