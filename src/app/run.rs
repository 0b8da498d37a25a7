//! Top-level entry point for running the viewer as a native window.

use std::path::PathBuf;

use eframe::egui;

use crate::config::ViewerConfig;

use super::ViewerApp;

/// Launch the viewer in a native window, optionally opening `path` first.
///
/// The call blocks until the window is closed.
pub fn run_viewer(config: ViewerConfig, path: Option<PathBuf>) -> eframe::Result<()> {
    let title = config.title.clone();
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(egui::vec2(1400.0, 900.0))
            .with_title(title.clone()),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        opts,
        Box::new(move |_cc| {
            let mut app = ViewerApp::new(config)?;
            if let Some(path) = path {
                app.open(&path);
            }
            Ok(Box::new(app))
        }),
    )
}
