// UI module - egui panels drawn over the track

mod stats;
mod ui;

pub use ui::{UIState, draw_ui, process_egui};
