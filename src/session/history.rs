//! # Bounded History
//!
//! Fixed-capacity FIFO buffers for measurement samples.
//!
//! Samples are kept in arrival order (most recent last). When a push would
//! exceed the capacity, the oldest sample is evicted first.
//!
//! ```
//! use telemetry_dashboard::session::BoundedHistory;
//!
//! let mut history = BoundedHistory::new(2);
//! history.push(1);
//! history.push(2);
//! assert_eq!(history.push(3), Some(1));
//! assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
//! ```

use chrono::{DateTime, Local};
use std::collections::VecDeque;

/// One temperature reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureSample {
    pub timestamp: DateTime<Local>,
    pub value: f64,
}

/// One rotation event
///
/// `count` is the absolute counter reported by the sensor; `increment` is
/// always 1 since every event adds exactly one to the daily total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSample {
    pub timestamp: DateTime<Local>,
    pub count: i64,
    pub increment: u32,
}

impl RotationSample {
    #[must_use]
    pub fn new(timestamp: DateTime<Local>, count: i64) -> Self {
        Self {
            timestamp,
            count,
            increment: 1,
        }
    }
}

/// FIFO buffer that never holds more than `capacity` items
#[derive(Debug, Clone)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    /// Creates an empty history.
    ///
    /// A zero capacity is raised to 1 so the latest sample is always kept.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an item, returning the evicted oldest item on overflow
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent item
    #[must_use]
    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    /// Iterates oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
}

impl BoundedHistory<TemperatureSample> {
    /// Chart series for the temperature line chart: `HH:MM` labels and values
    #[must_use]
    pub fn chart_series(&self) -> (Vec<String>, Vec<f64>) {
        self.iter()
            .map(|s| (s.timestamp.format("%H:%M").to_string(), s.value))
            .unzip()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    #[test]
    fn test_push_below_capacity_keeps_everything() {
        let mut history = BoundedHistory::new(3);
        assert_eq!(history.push(1), None);
        assert_eq!(history.push(2), None);
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest(), Some(&2));
    }

    #[test]
    fn test_overflow_evicts_oldest() {
        let mut history = BoundedHistory::new(3);
        for i in 0..3 {
            history.push(i);
        }
        assert_eq!(history.push(3), Some(0));
        assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let mut history = BoundedHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.push("a");
        assert_eq!(history.push("b"), Some("a"));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_new_history_is_empty() {
        let history: BoundedHistory<u8> = BoundedHistory::new(5);
        assert!(history.is_empty());
        assert_eq!(history.latest(), None);
    }

    #[test]
    fn test_rotation_sample_increment_is_one() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let sample = RotationSample::new(at, 42);
        assert_eq!(sample.count, 42);
        assert_eq!(sample.increment, 1);
    }

    #[test]
    fn test_temperature_chart_series() {
        let mut history = BoundedHistory::new(100);
        history.push(TemperatureSample {
            timestamp: Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 30).unwrap(),
            value: 21.5,
        });
        history.push(TemperatureSample {
            timestamp: Local.with_ymd_and_hms(2024, 3, 1, 14, 45, 0).unwrap(),
            value: 22.0,
        });

        let (labels, values) = history.chart_series();
        assert_eq!(labels, vec!["09:05", "14:45"]);
        assert_eq!(values, vec![21.5, 22.0]);
    }

    proptest! {
        #[test]
        fn prop_history_holds_last_capacity_items(
            capacity in 1usize..120,
            items in proptest::collection::vec(any::<i32>(), 0..400),
        ) {
            let mut history = BoundedHistory::new(capacity);
            for &item in &items {
                history.push(item);
            }

            let expected: Vec<i32> = items
                .iter()
                .copied()
                .skip(items.len().saturating_sub(capacity))
                .collect();
            prop_assert_eq!(history.len(), expected.len());
            prop_assert!(history.len() <= capacity);
            prop_assert_eq!(history.iter().copied().collect::<Vec<_>>(), expected);
        }
    }
}
