//! Left side panel: one row per channel with a visibility toggle and, for
//! visible channels, a color swatch and an export button.

use eframe::egui;

use super::ViewerApp;

enum ChannelAction {
    Toggle(String),
    Export(String),
}

impl ViewerApp {
    pub(super) fn render_channels_panel(&mut self, ctx: &egui::Context) {
        let mut action = None;
        egui::SidePanel::left("seisview_channels")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Channels");
                ui.separator();
                if self.channels.is_empty() {
                    ui.weak("Open a miniSEED file to list its channels.");
                    return;
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for channel in &self.channels {
                        let shown = self.viewport.visible(channel).copied();
                        ui.horizontal(|ui| {
                            let mut on = shown.is_some();
                            if ui.checkbox(&mut on, channel.as_str()).changed() {
                                action = Some(ChannelAction::Toggle(channel.clone()));
                            }
                            if let Some(vc) = shown {
                                let (rect, _) =
                                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                                ui.painter().rect_filled(rect, 2.0, vc.color);
                                if ui
                                    .small_button("Export")
                                    .on_hover_text("Save the visible window as miniSEED")
                                    .clicked()
                                {
                                    action = Some(ChannelAction::Export(channel.clone()));
                                }
                            }
                        });
                    }
                });
            });

        match action {
            Some(ChannelAction::Toggle(channel)) => self.toggle(&channel),
            Some(ChannelAction::Export(channel)) => self.export(&channel),
            None => {}
        }
    }

    fn toggle(&mut self, channel: &str) {
        let was_visible = self.viewport.is_visible(channel);
        match self.viewport.toggle_channel(channel, None) {
            Ok(false) if !was_visible => self.info(format!(
                "All {} slots are in use; hide a channel to show {channel}",
                self.viewport.slot_count()
            )),
            Ok(_) => {}
            Err(e) => self.error(e),
        }
    }

    fn export(&mut self, channel: &str) {
        let mut dlg = rfd::FileDialog::new()
            .set_file_name(format!("{channel}.{}", self.viewport.config().export.extension))
            .add_filter("miniSEED", &["mseed"]);
        if let Some(dir) = &self.last_dir {
            dlg = dlg.set_directory(dir);
        }
        let Some(path) = dlg.save_file() else {
            return;
        };
        match self.viewport.export_channel(channel, &path) {
            Ok(Some(written)) => {
                self.last_dir = written.parent().map(|p| p.to_path_buf());
                self.info(format!("Exported {channel} to {}", written.display()));
            }
            Ok(None) => {}
            Err(e) => self.error(e),
        }
    }
}
