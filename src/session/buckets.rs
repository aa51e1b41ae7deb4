//! # Rotation Buckets
//!
//! The rotation bar chart splits the day into six four-hour windows
//! (00:00, 04:00, ... 20:00). Each update overwrites the bucket for the
//! current hour with the running daily total, so a bucket shows the total as
//! of its most recent update rather than a per-window sum.

/// Number of four-hour windows in a day
pub const BUCKET_COUNT: usize = 6;

/// Hours covered by one bucket
pub const HOURS_PER_BUCKET: u32 = 4;

/// Six-slot series for the rotation bar chart
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationBuckets {
    values: [u64; BUCKET_COUNT],
}

impl RotationBuckets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket index for a wall-clock hour (0-23)
    ///
    /// ```
    /// use telemetry_dashboard::session::buckets::RotationBuckets;
    ///
    /// assert_eq!(RotationBuckets::index_for_hour(5), 1);
    /// assert_eq!(RotationBuckets::index_for_hour(23), 5);
    /// ```
    #[must_use]
    pub fn index_for_hour(hour: u32) -> usize {
        ((hour / HOURS_PER_BUCKET) as usize).min(BUCKET_COUNT - 1)
    }

    /// Overwrites the bucket for `hour` with `total`, returning the index
    pub fn record(&mut self, hour: u32, total: u64) -> usize {
        let index = Self::index_for_hour(hour);
        self.values[index] = total;
        index
    }

    #[must_use]
    pub fn values(&self) -> &[u64; BUCKET_COUNT] {
        &self.values
    }

    /// Axis labels, one per bucket
    #[must_use]
    pub fn labels() -> Vec<String> {
        (0..BUCKET_COUNT as u32)
            .map(|i| format!("{:02}:00", i * HOURS_PER_BUCKET))
            .collect()
    }

    /// Chart series: labels and bucket values
    #[must_use]
    pub fn chart_series(&self) -> (Vec<String>, Vec<f64>) {
        (
            Self::labels(),
            self.values.iter().map(|&v| v as f64).collect(),
        )
    }
}
