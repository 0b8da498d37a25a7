//! X-axis labels for epoch-second timestamps.
//!
//! Seismic data is timed in UTC, so every label is rendered in UTC. The
//! amount of detail follows the visible span: the date is shown only when the
//! span crosses midnight, and sub-second digits appear once the span gets
//! short enough for them to matter.

use chrono::{DateTime, Utc};

use crate::data::window::TimeWindow;

/// Granularity of the sub-second portion of a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TimeResolution {
    Seconds,
    Milliseconds,
    Microseconds,
}

#[derive(Debug, Clone)]
pub struct TimeAxis {
    /// Below this span (seconds) labels get milliseconds.
    pub milliseconds_threshold: f64,
    /// Below this span (seconds) labels get microseconds.
    pub microseconds_threshold: f64,
}

impl Default for TimeAxis {
    fn default() -> Self {
        Self {
            milliseconds_threshold: 60.0,
            microseconds_threshold: 0.1,
        }
    }
}

fn to_utc(t: f64) -> Option<DateTime<Utc>> {
    let secs = t.floor();
    let nanos = ((t - secs) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
}

impl TimeAxis {
    pub fn determine_resolution(&self, span: f64) -> TimeResolution {
        if span < self.microseconds_threshold {
            TimeResolution::Microseconds
        } else if span < self.milliseconds_threshold {
            TimeResolution::Milliseconds
        } else {
            TimeResolution::Seconds
        }
    }

    /// Tick label for `t` while `range` is visible.
    pub fn format(&self, t: f64, range: (f64, f64)) -> String {
        let Some(dt) = to_utc(t) else {
            return format!("{t:.3}");
        };
        let crosses_day = match (to_utc(range.0), to_utc(range.1)) {
            (Some(a), Some(b)) => a.date_naive() != b.date_naive(),
            _ => false,
        };
        let time = match self.determine_resolution((range.1 - range.0).abs()) {
            TimeResolution::Seconds => dt.format("%H:%M:%S"),
            TimeResolution::Milliseconds => dt.format("%H:%M:%S%.3f"),
            TimeResolution::Microseconds => dt.format("%H:%M:%S%.6f"),
        };
        if crosses_day {
            format!("{} {}", dt.format("%Y-%m-%d"), time)
        } else {
            time.to_string()
        }
    }

    /// Full-precision readout of a window, e.g. for the status bar.
    pub fn format_window(&self, window: &TimeWindow) -> String {
        let edge = |t: f64| match to_utc(t) {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S%.4f").to_string(),
            None => format!("{t:.4}"),
        };
        format!(
            "{} – {} ({:.3} s)",
            edge(window.start),
            edge(window.end),
            window.duration()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-01-15 12:00:00 UTC
    const NOON: f64 = 1_705_320_000.0;

    #[test]
    fn plain_time_within_a_day() {
        let ax = TimeAxis::default();
        assert_eq!(ax.format(NOON, (NOON - 300.0, NOON + 300.0)), "12:00:00");
    }

    #[test]
    fn milliseconds_on_short_spans() {
        let ax = TimeAxis::default();
        assert_eq!(ax.format(NOON + 0.25, (NOON, NOON + 10.0)), "12:00:00.250");
    }

    #[test]
    fn date_when_span_crosses_midnight() {
        let ax = TimeAxis::default();
        let out = ax.format(NOON, (NOON - 13.0 * 3600.0, NOON));
        assert!(out.starts_with("2024-01-15 "), "got {out}");
    }
}
