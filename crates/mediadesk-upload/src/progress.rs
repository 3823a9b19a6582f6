/// Per-file progress, kept monotonic: duplicate or out-of-order reports never
/// move the displayed percentage backwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTracker {
    percent: u8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Record a percentage report. Returns the value to display when it
    /// changed.
    pub fn record(&mut self, percent: f64) -> Option<u8> {
        if !percent.is_finite() {
            return None;
        }
        let percent = percent.clamp(0.0, 100.0).floor() as u8;
        if percent > self.percent {
            self.percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    /// Record `sent` out of `total` bytes.
    pub fn record_bytes(&mut self, sent: u64, total: u64) -> Option<u8> {
        if total == 0 {
            return self.record(100.0);
        }
        self.record(sent as f64 * 100.0 / total as f64)
    }
}
