//! seisview crate root: re-exports and module wiring.
//!
//! An interactive viewer for multi-channel seismic waveforms built on
//! egui/eframe. A fixed number of stacked plots (slots) share one time
//! window; dragging pans it, the wheel zooms it, and the visible part of a
//! channel can be exported as miniSEED.
//!
//! - `viewport`: slot allocation, shared window, pan/zoom rules
//! - `events`: pointer events to viewport actions, wheel gate
//! - `surface`: rendering seam and the in-memory slot store
//! - `data`: sources, miniSEED codec, time window, styling
//! - `config`: viewer configuration
//! - `app`: the eframe application

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod surface;
pub mod viewport;

// Public re-exports for a compact external API
pub use app::{run_viewer, ViewerApp};
pub use config::ViewerConfig;
pub use data::mseed::{MseedSource, MseedWriter, SegmentWriter};
pub use data::source::{DataSource, MemorySource, Segment, Trace};
pub use data::window::TimeWindow;
pub use error::{Result, ViewerError};
pub use events::InputEvent;
pub use surface::{LineHandle, PlotSurface, SlotHandle, SlotSurface};
pub use viewport::{VisibleChannel, WaveformViewport};
