//! Waveform data sources: the trait the viewport fetches through, the
//! fetched [`Segment`] type and an in-memory implementation.

use std::collections::BTreeMap;

use crate::data::window::TimeWindow;
use crate::error::{Result, ViewerError};

/// A fetched, time-bounded slice of one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub samples: Vec<f64>,
    /// Time of the first returned sample.
    pub start: f64,
    /// Time of the last returned sample.
    pub end: f64,
    /// Samples per second.
    pub sample_rate: f64,
    /// Full native extent of the channel the slice was cut from.
    pub extent: TimeWindow,
}

impl Segment {
    /// Absolute timestamp of every sample, paired with its value.
    pub fn points(&self) -> Vec<[f64; 2]> {
        let dt = 1.0 / self.sample_rate;
        self.samples
            .iter()
            .enumerate()
            .map(|(i, v)| [self.start + i as f64 * dt, *v])
            .collect()
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

/// Backing dataset for the viewer.
pub trait DataSource {
    /// Channel ids in a stable, sorted order.
    fn list_channels(&self) -> Vec<String>;

    /// Slice `channel` to `window`, or return its full extent when `window` is `None`.
    fn fetch_segment(&self, channel: &str, window: Option<TimeWindow>) -> Result<Segment>;
}

/// One contiguous, evenly sampled trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub start: f64,
    pub sample_rate: f64,
    pub samples: Vec<f64>,
}

impl Trace {
    pub fn new(start: f64, sample_rate: f64, samples: Vec<f64>) -> Self {
        Self {
            start,
            sample_rate,
            samples,
        }
    }

    /// Time of the last sample.
    pub fn end(&self) -> f64 {
        let n = self.samples.len().saturating_sub(1);
        self.start + n as f64 / self.sample_rate
    }

    pub fn extent(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end())
    }

    /// Cut the trace to the samples nearest to the window edges.
    pub fn slice(&self, channel: &str, window: Option<TimeWindow>) -> Result<Segment> {
        if self.samples.is_empty() {
            return Err(ViewerError::fetch(channel, "channel has no samples"));
        }
        let extent = self.extent();
        let window = match window {
            Some(w) => w,
            None => extent,
        };
        if !window.start.is_finite() || !window.end.is_finite() || window.end < window.start {
            return Err(ViewerError::fetch(channel, format!("invalid time range {window}")));
        }
        if !window.overlaps(&extent) {
            return Err(ViewerError::fetch(
                channel,
                format!("time range {window} outside data extent {extent}"),
            ));
        }
        let last = (self.samples.len() - 1) as f64;
        let first_idx = ((window.start - self.start) * self.sample_rate)
            .round()
            .clamp(0.0, last) as usize;
        let last_idx = ((window.end - self.start) * self.sample_rate)
            .round()
            .clamp(0.0, last) as usize;
        let dt = 1.0 / self.sample_rate;
        Ok(Segment {
            samples: self.samples[first_idx..=last_idx].to_vec(),
            start: self.start + first_idx as f64 * dt,
            end: self.start + last_idx as f64 * dt,
            sample_rate: self.sample_rate,
            extent,
        })
    }
}

/// Channels held entirely in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    channels: BTreeMap<String, Trace>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a channel. A non-positive rate is rejected with `DataLoad`.
    pub fn insert(&mut self, channel: impl Into<String>, trace: Trace) -> Result<()> {
        let channel = channel.into();
        if !(trace.sample_rate.is_finite() && trace.sample_rate > 0.0) {
            return Err(ViewerError::data_load(
                channel.as_str(),
                format!("invalid sample rate {}", trace.sample_rate),
            ));
        }
        self.channels.insert(channel, trace);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_channel(
        mut self,
        channel: impl Into<String>,
        start: f64,
        sample_rate: f64,
        samples: Vec<f64>,
    ) -> Result<Self> {
        self.insert(channel, Trace::new(start, sample_rate, samples))?;
        Ok(self)
    }
}

impl DataSource for MemorySource {
    fn list_channels(&self) -> Vec<String> {
        self.channels.keys().cloned().collect()
    }

    fn fetch_segment(&self, channel: &str, window: Option<TimeWindow>) -> Result<Segment> {
        let trace = self
            .channels
            .get(channel)
            .ok_or_else(|| ViewerError::fetch(channel, "unknown channel"))?;
        trace.slice(channel, window)
    }
}
