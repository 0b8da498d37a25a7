//! The shared visible time range and the clamp rule applied by pan and zoom.

use serde::{Deserialize, Serialize};

/// A `[start, end]` time range in seconds since the UNIX epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// `true` when `start < end` and both edges are finite.
    pub fn is_valid(&self) -> bool {
        self.start.is_finite() && self.end.is_finite() && self.start < self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Both edges moved by `shift` seconds.
    pub fn shifted(&self, shift: f64) -> Self {
        Self::new(self.start + shift, self.end + shift)
    }

    /// Start moved by `+shift`, end by `-shift`. Positive shifts narrow the window.
    pub fn narrowed(&self, shift: f64) -> Self {
        Self::new(self.start + shift, self.end - shift)
    }

    /// Apply the per-edge clamp against a set of channel extents.
    ///
    /// An edge that would leave any extent reverts to the matching edge of
    /// `current`, not to the extent bound. The two edges are judged
    /// independently, so one channel can freeze the start while another
    /// freezes the end.
    pub fn clamp_edges<I>(self, current: &TimeWindow, extents: I) -> Self
    where
        I: IntoIterator<Item = TimeWindow>,
    {
        let mut out = self;
        for extent in extents {
            if out.start < extent.start {
                out.start = current.start;
            }
            if out.end > extent.end {
                out.end = current.end;
            }
        }
        out
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:.4}, {:.4}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_reverts_to_current_edge_not_extent() {
        let current = TimeWindow::new(12.0, 40.0);
        let candidate = current.shifted(-5.0);
        let clamped = candidate.clamp_edges(&current, [TimeWindow::new(10.0, 100.0)]);
        assert_eq!(clamped.start, 12.0);
        assert_eq!(clamped.end, 35.0);
    }

    #[test]
    fn clamp_edges_are_independent() {
        let current = TimeWindow::new(20.0, 80.0);
        let candidate = TimeWindow::new(5.0, 95.0);
        let clamped = candidate.clamp_edges(
            &current,
            [TimeWindow::new(10.0, 200.0), TimeWindow::new(0.0, 90.0)],
        );
        assert_eq!(clamped, TimeWindow::new(20.0, 80.0));
    }

    #[test]
    fn narrowed_with_negative_shift_widens() {
        let w = TimeWindow::new(400.0, 600.0).narrowed(-20.0);
        assert_eq!(w, TimeWindow::new(380.0, 620.0));
        assert!(w.is_valid());
    }
}
