//! TraceLook: visual styling for waveform lines.

use eframe::egui;
use egui_plot::LineStyle;

/// Number of entries in the default palette; slot colors wrap around it.
pub const PALETTE_LEN: usize = 10;

/// The visual presentation of a rendered channel.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceLook {
    pub color: egui::Color32,
    pub width: f32,
    pub style: LineStyle,
}

impl Default for TraceLook {
    fn default() -> Self {
        Self {
            color: egui::Color32::GRAY,
            width: 1.0,
            style: LineStyle::Solid,
        }
    }
}

impl TraceLook {
    pub fn with_color(color: egui::Color32) -> Self {
        Self {
            color,
            ..Default::default()
        }
    }

    /// Palette color `index mod 10`.
    pub fn alloc_color(index: usize) -> egui::Color32 {
        const PALETTE: [egui::Color32; PALETTE_LEN] = [
            egui::Color32::from_rgb(31, 119, 180),
            egui::Color32::from_rgb(255, 127, 14),
            egui::Color32::from_rgb(44, 160, 44),
            egui::Color32::from_rgb(214, 39, 40),
            egui::Color32::from_rgb(148, 103, 189),
            egui::Color32::from_rgb(140, 86, 75),
            egui::Color32::from_rgb(227, 119, 194),
            egui::Color32::from_rgb(127, 127, 127),
            egui::Color32::from_rgb(188, 189, 34),
            egui::Color32::from_rgb(23, 190, 207),
        ];
        PALETTE[index % PALETTE.len()]
    }
}
