//! Pointer input handling.
//!
//! Raw pointer events are turned into viewport actions by [`transition`], a
//! pure function of the current [`PointerState`]. The viewport applies the
//! resulting [`ViewAction`]; nothing here touches data or rendering, so the
//! gesture logic is testable without a GUI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Input consumed by the viewport. Positions are horizontal canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Press(f64),
    Move(f64),
    Release(f64),
    /// Zoom delta in wheel notches; negative zooms in.
    Wheel(f64),
}

/// What the viewport should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewAction {
    /// Shift the window by this fraction of its duration.
    Pan(f64),
    Zoom(f64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    /// Where the current drag was last anchored, `None` when not dragging.
    pub anchor: Option<f64>,
}

/// Advance the pointer state by one event.
///
/// Dragging right moves the window towards earlier times, hence the
/// `anchor - x` sign.
pub fn transition(state: PointerState, event: InputEvent, canvas_width: f64) -> (PointerState, Option<ViewAction>) {
    match event {
        InputEvent::Press(x) => (PointerState { anchor: Some(x) }, None),
        InputEvent::Move(x) => match state.anchor {
            Some(anchor) if canvas_width > 0.0 && x != anchor => (
                PointerState { anchor: Some(x) },
                Some(ViewAction::Pan((anchor - x) / canvas_width)),
            ),
            _ => (state, None),
        },
        InputEvent::Release(_) => (PointerState { anchor: None }, None),
        InputEvent::Wheel(delta) if delta != 0.0 && delta.is_finite() => (state, Some(ViewAction::Zoom(delta))),
        InputEvent::Wheel(_) => (state, None),
    }
}

/// Convert a vertical scroll distance (egui points, up is positive) to notches.
///
/// Scrolling up zooms in, which is a negative delta.
pub fn wheel_delta(scroll_y: f32, points_per_notch: f32) -> f64 {
    if points_per_notch <= 0.0 {
        return 0.0;
    }
    -(scroll_y / points_per_notch) as f64
}

/// Single-issue guard for wheel zooms.
///
/// At most one zoom runs at a time. A wheel event that arrives while a zoom
/// is in flight is parked in a single pending slot; later arrivals overwrite
/// it, so only the most recent one is replayed.
#[derive(Debug, Default)]
pub struct WheelGate {
    busy: Arc<AtomicBool>,
    pending: Option<f64>,
}

/// Held while a zoom is in flight; releases the gate on drop.
#[derive(Debug)]
pub struct WheelToken {
    busy: Arc<AtomicBool>,
}

impl Drop for WheelToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl WheelGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Option<WheelToken> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| WheelToken {
                busy: Arc::clone(&self.busy),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Park `delta`, replacing anything already waiting. Returns the dropped delta.
    pub fn defer(&mut self, delta: f64) -> Option<f64> {
        self.pending.replace(delta)
    }

    pub fn take_pending(&mut self) -> Option<f64> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<f64> {
        self.pending
    }
}
