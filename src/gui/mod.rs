//! egui/eframe windows for the monitor and the toggle editor

mod editor_app;
mod monitor_app;
pub mod utils;

pub use editor_app::run_editor;
pub use monitor_app::run_monitor;
