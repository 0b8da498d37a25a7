//! eframe application for the waveform viewer.
//!
//! | Sub-module         | Responsibility |
//! | ------------------ | -------------- |
//! | [`viewer_app`]     | [`ViewerApp`] state and the [`eframe::App`] frame loop |
//! | [`channels_panel`] | Channel list with show/hide toggles and export buttons |
//! | [`plots`]          | Stacked slot plots and pointer-to-[`InputEvent`](crate::InputEvent) translation |
//! | [`run`]            | [`run_viewer()`] native window entry point |

mod channels_panel;
mod plots;
mod run;
mod viewer_app;

pub use run::run_viewer;
pub use viewer_app::ViewerApp;
