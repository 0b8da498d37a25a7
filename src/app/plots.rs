//! Central area: one plot per slot, stacked vertically, all pinned to the
//! viewport window.
//!
//! egui_plot's own drag/zoom handling is switched off. Pointer activity on
//! any slot is turned into [`InputEvent`]s so the viewport stays the single
//! owner of the time window.

use eframe::egui;
use egui_plot::{Legend, Line, Plot};

use crate::events::{wheel_delta, InputEvent};
use crate::surface::SlotHandle;

use super::ViewerApp;

const MIN_SLOT_HEIGHT: f32 = 60.0;

impl ViewerApp {
    pub(super) fn render_plots(&mut self, ctx: &egui::Context) {
        let mut events: Vec<InputEvent> = Vec::new();
        let mut canvas_width = None;

        egui::CentralPanel::default().show(ctx, |ui| {
            let slot_count = self.viewport.slot_count();
            let spacing = ui.spacing().item_spacing.y;
            let height = ((ui.available_height() - spacing * (slot_count as f32 - 1.0))
                / slot_count as f32)
                .max(MIN_SLOT_HEIGHT);
            let window = self.viewport.window();
            let show_legend = self.viewport.config().show_legend;
            let points_per_notch = self.viewport.config().interaction.wheel_points_per_notch;
            let axis = &self.time_axis;

            for index in 0..slot_count {
                let Some(contents) = self.viewport.surface().slot(SlotHandle(index)) else {
                    continue;
                };
                let mut plot = Plot::new(("seisview_slot", index))
                    .height(height)
                    .allow_drag(false)
                    .allow_zoom(false)
                    .allow_scroll(false)
                    .allow_boxed_zoom(false)
                    .allow_double_click_reset(false)
                    .x_axis_formatter(move |mark, range| {
                        axis.format(mark.value, (*range.start(), *range.end()))
                    });
                if show_legend {
                    plot = plot.legend(Legend::default());
                }

                let resp = plot.show(ui, |plot_ui| {
                    if let Some(w) = window {
                        plot_ui.set_plot_bounds_x(w.start..=w.end);
                    }
                    if let Some((lo, hi)) = contents.y_bounds {
                        let space = ((hi - lo) * 0.05).max(1e-9);
                        plot_ui.set_plot_bounds_y(lo - space..=hi + space);
                    }
                    for line in &contents.lines {
                        plot_ui.line(
                            Line::new(line.label.clone(), line.points.clone())
                                .color(line.look.color)
                                .width(line.look.width)
                                .style(line.look.style),
                        );
                    }
                });

                let r = &resp.response;
                let left = r.rect.left();
                canvas_width = Some(r.rect.width() as f64);
                let x = r.interact_pointer_pos().map(|p| (p.x - left) as f64);
                if r.drag_started_by(egui::PointerButton::Primary) {
                    if let Some(x) = x {
                        events.push(InputEvent::Press(x));
                    }
                } else if r.dragged_by(egui::PointerButton::Primary) {
                    if let Some(x) = x {
                        events.push(InputEvent::Move(x));
                    }
                }
                if r.drag_stopped_by(egui::PointerButton::Primary) {
                    events.push(InputEvent::Release(x.unwrap_or_default()));
                }
                if r.hovered() {
                    let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
                    if scroll != 0.0 {
                        events.push(InputEvent::Wheel(wheel_delta(scroll, points_per_notch)));
                    }
                }
            }
        });

        if let Some(w) = canvas_width {
            self.viewport.set_canvas_width(w);
        }
        for event in events {
            if let Err(e) = self.viewport.handle_input(event) {
                self.error(e);
            }
        }
    }
}
