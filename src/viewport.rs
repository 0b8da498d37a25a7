//! The waveform viewport: slot allocation, the shared time window and the
//! pan/zoom rules that keep it inside the data of every visible channel.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use egui::Color32;

use crate::config::ViewerConfig;
use crate::data::mseed::{Encoding, MseedSource, MseedWriter, SegmentWriter};
use crate::data::source::{DataSource, Segment};
use crate::data::trace_look::TraceLook;
use crate::data::window::TimeWindow;
use crate::error::{Result, ViewerError};
use crate::events::{transition, InputEvent, PointerState, ViewAction, WheelGate};
use crate::surface::{LineHandle, PlotSurface, SlotHandle, SlotSurface};

/// A channel currently rendered in a slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleChannel {
    pub slot: SlotHandle,
    pub line: LineHandle,
    /// Color the channel was first shown with; kept across pan/zoom re-renders.
    pub color: Color32,
    /// Start of the channel's data, not of the visible window.
    pub segment_start: f64,
    /// End of the channel's data.
    pub segment_end: f64,
}

impl VisibleChannel {
    pub fn extent(&self) -> TimeWindow {
        TimeWindow::new(self.segment_start, self.segment_end)
    }
}

pub struct WaveformViewport<S: PlotSurface = SlotSurface> {
    config: ViewerConfig,
    surface: S,
    source: Option<Box<dyn DataSource>>,
    writer: Box<dyn SegmentWriter>,
    /// `true` = slot is free.
    slots: Vec<bool>,
    visible: HashMap<String, VisibleChannel>,
    window: Option<TimeWindow>,
    pointer: PointerState,
    wheel_gate: WheelGate,
    canvas_width: f64,
}

impl WaveformViewport<SlotSurface> {
    /// Viewport drawing into an in-memory [`SlotSurface`] with `config.slot_count` slots.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let surface = SlotSurface::new(config.slot_count);
        Self::with_surface(config, surface)
    }
}

impl<S: PlotSurface> WaveformViewport<S> {
    /// Viewport over an existing surface; the surface decides the slot count.
    pub fn with_surface(config: ViewerConfig, surface: S) -> Result<Self> {
        config.validate()?;
        let slot_count = surface.slot_count();
        if slot_count == 0 {
            return Err(ViewerError::Config("plot surface has no slots".into()));
        }
        let writer = MseedWriter::new(config.export.record_length, Encoding::Int32);
        Ok(Self {
            canvas_width: config.canvas_width,
            config,
            surface,
            source: None,
            writer: Box::new(writer),
            slots: vec![true; slot_count],
            visible: HashMap::new(),
            window: None,
            pointer: PointerState::default(),
            wheel_gate: WheelGate::new(),
        })
    }

    /// Replace the export writer.
    pub fn set_writer(&mut self, writer: Box<dyn SegmentWriter>) {
        self.writer = writer;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Data binding
    // ─────────────────────────────────────────────────────────────────────────

    /// Open a miniSEED file and make it the data source.
    pub fn load_data<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let source = MseedSource::open(path)?;
        self.set_source(Box::new(source));
        Ok(())
    }

    /// Bind `source`, dropping every visible channel and the current window.
    pub fn set_source(&mut self, source: Box<dyn DataSource>) {
        let shown: Vec<String> = self.visible.keys().cloned().collect();
        for channel in shown {
            self.hide_channel(&channel);
        }
        self.window = None;
        self.pointer = PointerState::default();
        self.source = Some(source);
        self.surface.redraw();
    }

    pub fn has_data(&self) -> bool {
        self.source.is_some()
    }

    pub fn list_channels(&self) -> Result<Vec<String>> {
        let source = self.source.as_ref().ok_or(ViewerError::NoDataLoaded)?;
        Ok(source.list_channels())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Show / hide
    // ─────────────────────────────────────────────────────────────────────────

    /// Hide `channel` if it is shown, otherwise fetch and show it.
    ///
    /// Returns `Ok(true)` when the channel ended up visible. A full viewport
    /// makes this a silent no-op returning `Ok(false)`.
    pub fn toggle_channel(&mut self, channel: &str, color: Option<Color32>) -> Result<bool> {
        if self.hide_channel(channel) {
            return Ok(false);
        }
        let source = self.source.as_ref().ok_or(ViewerError::NoDataLoaded)?;
        if self.free_slots() == 0 {
            log::debug!("no free slot for {channel}");
            return Ok(false);
        }
        let segment = source.fetch_segment(channel, self.window)?;
        Ok(self.display_channel(channel, &segment, color).is_some())
    }

    /// Render `segment` in the lowest free slot and register it as visible.
    ///
    /// Returns `None` when every slot is taken; nothing changes in that case.
    /// Otherwise the window is reset to the segment's span and any drag in
    /// progress is abandoned.
    pub fn display_channel(
        &mut self,
        channel: &str,
        segment: &Segment,
        color: Option<Color32>,
    ) -> Option<(SlotHandle, LineHandle)> {
        let placed = self.place_channel(channel, segment, color)?;
        if segment.end > segment.start {
            self.window = Some(segment.window());
        }
        self.pointer.anchor = None;
        self.surface.redraw();
        Some(placed)
    }

    /// Plot `segment` in the lowest free slot and register it. Leaves the
    /// window and any drag alone.
    fn place_channel(
        &mut self,
        channel: &str,
        segment: &Segment,
        color: Option<Color32>,
    ) -> Option<(SlotHandle, LineHandle)> {
        // A channel is never shown twice; showing it again replaces the old line.
        self.hide_channel(channel);
        let index = self.slots.iter().position(|free| *free)?;
        self.slots[index] = false;
        let slot = SlotHandle(index);
        let color = color.unwrap_or_else(|| TraceLook::alloc_color(index));
        let line = self.surface.plot_line(slot, segment.points(), channel, color);
        self.visible.insert(
            channel.to_string(),
            VisibleChannel {
                slot,
                line,
                color,
                segment_start: segment.extent.start,
                segment_end: segment.extent.end,
            },
        );
        Some((slot, line))
    }

    /// Take a line off its slot and refit the slot to what is left.
    pub(crate) fn remove_channel(&mut self, slot: SlotHandle, line: LineHandle) {
        self.surface.remove_line(slot, line);
        self.surface.rescale(slot);
        self.surface.redraw();
    }

    fn hide_channel(&mut self, channel: &str) -> bool {
        match self.visible.remove(channel) {
            Some(vc) => {
                self.remove_channel(vc.slot, vc.line);
                self.slots[vc.slot.0] = true;
                true
            }
            None => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pan / zoom
    // ─────────────────────────────────────────────────────────────────────────

    fn extents(&self) -> Vec<TimeWindow> {
        self.visible.values().map(VisibleChannel::extent).collect()
    }

    /// Shift the window by `fraction` of its duration.
    ///
    /// The move is all or nothing: if the clamp pins either edge, the window
    /// stays where it is. Returns whether the window moved.
    pub fn pan_by(&mut self, fraction: f64) -> Result<bool> {
        let Some(current) = self.window else {
            return Ok(false);
        };
        let shift = current.duration() * fraction;
        let candidate = current
            .shifted(shift)
            .clamp_edges(&current, self.extents());
        if candidate.start == current.start || candidate.end == current.end || !candidate.is_valid() {
            log::debug!("pan by {fraction:.4} rejected at {current}");
            return Ok(false);
        }
        log::debug!("pan {current} -> {candidate}");
        self.rerender(candidate)?;
        Ok(true)
    }

    /// Zoom symmetrically about the window centre; negative `delta` zooms in.
    ///
    /// Rejected when the result is shorter than the configured minimum or the
    /// clamp pins both edges. Only one zoom runs at a time: a call made while
    /// another is in flight is parked (see [`flush_pending_zoom`](Self::flush_pending_zoom)).
    pub fn zoom_by(&mut self, delta: f64) -> Result<bool> {
        let Some(_token) = self.wheel_gate.try_acquire() else {
            if let Some(dropped) = self.wheel_gate.defer(delta) {
                log::warn!("zoom by {dropped} superseded while busy");
            }
            return Ok(false);
        };
        let Some(current) = self.window else {
            return Ok(false);
        };
        let shift = current.duration() * -delta * self.config.interaction.zoom_step;
        let candidate = current
            .narrowed(shift)
            .clamp_edges(&current, self.extents());
        if !candidate.is_valid() || candidate.duration() < self.config.interaction.min_window_secs {
            log::debug!("zoom by {delta} rejected: {candidate} below minimum span");
            return Ok(false);
        }
        if candidate.start == current.start && candidate.end == current.end {
            log::debug!("zoom by {delta} rejected: both edges clamped");
            return Ok(false);
        }
        log::debug!("zoom {current} -> {candidate}");
        self.rerender(candidate)?;
        Ok(true)
    }

    /// Run the zoom parked while another one was in flight, if any.
    pub fn flush_pending_zoom(&mut self) -> Result<bool> {
        if self.wheel_gate.is_busy() {
            return Ok(false);
        }
        match self.wheel_gate.take_pending() {
            Some(delta) => self.zoom_by(delta),
            None => Ok(false),
        }
    }

    /// Fetch every visible channel over `window` and show it again in its own
    /// slot and color. Nothing changes if any fetch fails.
    fn rerender(&mut self, window: TimeWindow) -> Result<()> {
        let mut shown: Vec<(String, VisibleChannel)> = self
            .visible
            .iter()
            .map(|(id, vc)| (id.clone(), *vc))
            .collect();
        shown.sort_by_key(|(_, vc)| vc.slot);

        let segments = if shown.is_empty() {
            Vec::new()
        } else {
            let source = self.source.as_ref().ok_or(ViewerError::NoDataLoaded)?;
            shown
                .iter()
                .map(|(id, _)| source.fetch_segment(id, Some(window)))
                .collect::<Result<Vec<_>>>()?
        };

        // The window is the committed candidate, not any one channel's
        // sample-aligned slice.
        self.window = Some(window);
        for ((id, vc), segment) in shown.into_iter().zip(segments) {
            self.place_channel(&id, &segment, Some(vc.color));
        }
        self.surface.redraw();
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one pointer event. Returns whether the window changed.
    pub fn handle_input(&mut self, event: InputEvent) -> Result<bool> {
        let (next, action) = transition(self.pointer, event, self.canvas_width);
        self.pointer = next;
        match action {
            None => Ok(false),
            Some(ViewAction::Pan(fraction)) => self.pan_by(fraction),
            Some(ViewAction::Zoom(delta)) => {
                // A parked zoom is replayed even when this one fails.
                let zoomed = self.zoom_by(delta);
                let flushed = self.flush_pending_zoom();
                Ok(zoomed? | flushed?)
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// Write the visible part of `channel` to `out_path` as miniSEED.
    ///
    /// The configured extension is added when `out_path` has none. Returns the
    /// written path, or `None` when the channel is not shown.
    pub fn export_channel<P: AsRef<Path>>(&self, channel: &str, out_path: P) -> Result<Option<PathBuf>> {
        if !self.visible.contains_key(channel) {
            log::debug!("export of hidden channel {channel} skipped");
            return Ok(None);
        }
        let source = self.source.as_ref().ok_or(ViewerError::NoDataLoaded)?;
        let segment = source.fetch_segment(channel, self.window)?;
        let mut path = out_path.as_ref().to_path_buf();
        if path.extension().is_none() {
            path.set_extension(&self.config.export.extension);
        }
        self.writer.write(&segment, channel, &path)?;
        Ok(Some(path))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn window(&self) -> Option<TimeWindow> {
        self.window
    }

    pub fn visible(&self, channel: &str) -> Option<&VisibleChannel> {
        self.visible.get(channel)
    }

    /// Visible channels ordered by slot.
    pub fn visible_channels(&self) -> Vec<(&str, &VisibleChannel)> {
        let mut out: Vec<(&str, &VisibleChannel)> =
            self.visible.iter().map(|(id, vc)| (id.as_str(), vc)).collect();
        out.sort_by_key(|(_, vc)| vc.slot);
        out
    }

    pub fn is_visible(&self, channel: &str) -> bool {
        self.visible.contains_key(channel)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn free_slots(&self) -> usize {
        self.slots.iter().filter(|free| **free).count()
    }

    /// Availability per slot, `true` = free.
    pub fn slot_availability(&self) -> &[bool] {
        &self.slots
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn wheel_gate(&self) -> &WheelGate {
        &self.wheel_gate
    }

    pub fn drag_anchor(&self) -> Option<f64> {
        self.pointer.anchor
    }

    pub fn set_canvas_width(&mut self, width: f64) {
        if width > 0.0 {
            self.canvas_width = width;
        }
    }
}
