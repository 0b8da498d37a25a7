//! Standalone application wrapper around [`WaveformViewport`].

use std::path::{Path, PathBuf};

use eframe::egui;

use crate::config::ViewerConfig;
use crate::data::time_axis::TimeAxis;
use crate::error::Result;
use crate::viewport::WaveformViewport;

/// Message shown in the bottom status line.
#[derive(Debug, Clone)]
pub(crate) struct Status {
    pub text: String,
    pub is_error: bool,
}

pub struct ViewerApp {
    pub(crate) viewport: WaveformViewport,
    /// Channel ids of the loaded source, cached for the side panel.
    pub(crate) channels: Vec<String>,
    pub(crate) status: Option<Status>,
    pub(crate) time_axis: TimeAxis,
    /// Directory of the last opened or exported file, used to seed dialogs.
    pub(crate) last_dir: Option<PathBuf>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Result<Self> {
        Ok(Self {
            viewport: WaveformViewport::new(config)?,
            channels: Vec::new(),
            status: None,
            time_axis: TimeAxis::default(),
            last_dir: None,
        })
    }

    pub fn viewport(&self) -> &WaveformViewport {
        &self.viewport
    }

    /// Load a miniSEED file, reporting the outcome in the status line.
    pub fn open(&mut self, path: &Path) {
        self.last_dir = path.parent().map(Path::to_path_buf);
        let loaded = match self.viewport.load_data(path) {
            Ok(()) => self.viewport.list_channels(),
            Err(e) => Err(e),
        };
        match loaded {
            Ok(channels) => {
                self.info(format!(
                    "Loaded {} channel(s) from {}",
                    channels.len(),
                    path.display()
                ));
                self.channels = channels;
            }
            Err(e) => {
                self.channels.clear();
                self.error(e);
            }
        }
    }

    pub(crate) fn info(&mut self, text: String) {
        log::info!("{text}");
        self.status = Some(Status {
            text,
            is_error: false,
        });
    }

    pub(crate) fn error(&mut self, err: impl std::fmt::Display) {
        let text = err.to_string();
        log::error!("{text}");
        self.status = Some(Status {
            text,
            is_error: true,
        });
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("seisview_top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open…").clicked() {
                    let mut dlg = rfd::FileDialog::new()
                        .add_filter("miniSEED", &["mseed", "miniseed", "msd"])
                        .add_filter("All files", &["*"]);
                    if let Some(dir) = &self.last_dir {
                        dlg = dlg.set_directory(dir);
                    }
                    if let Some(path) = dlg.pick_file() {
                        self.open(&path);
                    }
                }
                ui.separator();
                match self.viewport.window() {
                    Some(w) => ui.label(self.time_axis.format_window(&w)),
                    None => ui.weak("No channel shown"),
                };
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!(
                        "{}/{} slots free",
                        self.viewport.free_slots(),
                        self.viewport.slot_count()
                    ));
                });
            });
        });
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("seisview_status").show(ctx, |ui| match &self.status {
            Some(s) if s.is_error => {
                ui.colored_label(ui.visuals().error_fg_color, &s.text);
            }
            Some(s) => {
                ui.label(&s.text);
            }
            None => {
                ui.weak("Drag to pan, scroll to zoom");
            }
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_top_bar(ctx);
        self.render_status_bar(ctx);
        self.render_channels_panel(ctx);
        self.render_plots(ctx);

        if self.viewport.surface_mut().take_dirty() {
            ctx.request_repaint();
        }
    }
}
