//! Rendering seam between the viewport and the plotting backend.
//!
//! [`WaveformViewport`](crate::WaveformViewport) only talks to a
//! [`PlotSurface`]. [`SlotSurface`] is the implementation used by the app: it
//! keeps the lines of every slot in memory and the egui layer draws them each
//! frame with `egui_plot`.

use egui::Color32;

use crate::data::trace_look::TraceLook;

/// Identifies one rendered line on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineHandle(pub u64);

/// Index of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotHandle(pub usize);

pub trait PlotSurface {
    /// Number of fixed slots.
    fn slot_count(&self) -> usize;
    fn plot_line(&mut self, slot: SlotHandle, points: Vec<[f64; 2]>, label: &str, color: Color32) -> LineHandle;
    fn remove_line(&mut self, slot: SlotHandle, line: LineHandle);
    /// Refit the slot's value axis to the lines it still holds.
    fn rescale(&mut self, slot: SlotHandle);
    fn redraw(&mut self);
}

#[derive(Debug, Clone)]
pub struct PlottedLine {
    pub handle: LineHandle,
    pub label: String,
    pub look: TraceLook,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Default)]
pub struct SlotContents {
    pub lines: Vec<PlottedLine>,
    /// Value range of the lines, `None` when empty.
    pub y_bounds: Option<(f64, f64)>,
}

impl SlotContents {
    fn refit(&mut self) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for p in self.lines.iter().flat_map(|l| l.points.iter()) {
            if p[1].is_finite() {
                lo = lo.min(p[1]);
                hi = hi.max(p[1]);
            }
        }
        self.y_bounds = if lo <= hi { Some((lo, hi)) } else { None };
    }
}

/// In-memory line store, one entry per slot.
#[derive(Debug, Clone)]
pub struct SlotSurface {
    slots: Vec<SlotContents>,
    next_handle: u64,
    redraws: u64,
    dirty: bool,
}

impl SlotSurface {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![SlotContents::default(); slot_count],
            next_handle: 0,
            redraws: 0,
            dirty: false,
        }
    }

    pub fn slot(&self, slot: SlotHandle) -> Option<&SlotContents> {
        self.slots.get(slot.0)
    }

    pub fn slots(&self) -> &[SlotContents] {
        &self.slots
    }

    /// Number of redraws requested so far.
    pub fn redraw_count(&self) -> u64 {
        self.redraws
    }

    /// Returns whether a redraw was requested since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl PlotSurface for SlotSurface {
    fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn plot_line(&mut self, slot: SlotHandle, points: Vec<[f64; 2]>, label: &str, color: Color32) -> LineHandle {
        self.next_handle += 1;
        let handle = LineHandle(self.next_handle);
        if let Some(contents) = self.slots.get_mut(slot.0) {
            contents.lines.push(PlottedLine {
                handle,
                label: label.to_string(),
                look: TraceLook::with_color(color),
                points,
            });
            contents.refit();
        }
        handle
    }

    fn remove_line(&mut self, slot: SlotHandle, line: LineHandle) {
        if let Some(contents) = self.slots.get_mut(slot.0) {
            contents.lines.retain(|l| l.handle != line);
        }
    }

    fn rescale(&mut self, slot: SlotHandle) {
        if let Some(contents) = self.slots.get_mut(slot.0) {
            contents.refit();
        }
    }

    fn redraw(&mut self) {
        self.redraws += 1;
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescale_follows_remaining_lines() {
        let mut s = SlotSurface::new(2);
        let a = s.plot_line(SlotHandle(0), vec![[0.0, -5.0], [1.0, 5.0]], "A", Color32::RED);
        let _b = s.plot_line(SlotHandle(0), vec![[0.0, 1.0], [1.0, 2.0]], "B", Color32::BLUE);
        assert_eq!(s.slot(SlotHandle(0)).unwrap().y_bounds, Some((-5.0, 5.0)));
        s.remove_line(SlotHandle(0), a);
        s.rescale(SlotHandle(0));
        assert_eq!(s.slot(SlotHandle(0)).unwrap().y_bounds, Some((1.0, 2.0)));
        assert_eq!(s.slot(SlotHandle(1)).unwrap().y_bounds, None);
    }

    #[test]
    fn redraw_marks_dirty_once() {
        let mut s = SlotSurface::new(1);
        s.redraw();
        assert!(s.take_dirty());
        assert!(!s.take_dirty());
        assert_eq!(s.redraw_count(), 1);
    }
}
