use egui_macroquad::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};
use std::collections::VecDeque;

use super::ui::UIState;

fn history_line<'a>(
    name: &str,
    history: &VecDeque<(f64, f64)>,
    color: egui::Color32,
) -> Line<'a> {
    let points: PlotPoints = history.iter().map(|&(x, y)| [x, y]).collect();
    Line::new(points).name(name).color(color)
}

pub(super) fn draw_stats_panel(egui_ctx: &egui::Context, state: &mut UIState) {
    egui::SidePanel::right("stats_panel")
        .default_width(state.stats_panel_width)
        .resizable(false)
        .show(egui_ctx, |ui| {
            ui.heading("Training");
            ui.separator();

            ui.horizontal(|ui| {
                let label = if state.training_done { "Close" } else { "⏹ Stop" };
                if ui.button(label).clicked() {
                    state.stop_requested = true;
                }
                ui.checkbox(&mut state.show_sensors, "Sensors");
            });

            if let Some(ref msg) = state.status_message {
                ui.label(msg);
            }

            ui.separator();

            match &state.last_summary {
                Some(summary) => {
                    ui.label(format!(
                        "Generation: {}/{}",
                        summary.generation + 1,
                        state.total_generations
                    ));
                    ui.label(format!("Best: {}", summary.best));
                    ui.label(format!("Mean: {:.1}", summary.mean));
                    ui.label(format!("Worst: {}", summary.worst));
                    ui.label(format!("Finished: {}", summary.finished));
                }
                None => {
                    ui.label("Evaluating first generation...");
                }
            }

            ui.separator();

            match state.champion_fitness {
                Some(fitness) => {
                    ui.label(format!("Champion fitness: {}", fitness));
                    ui.label(format!(
                        "Replay: fitness {} after {} ticks",
                        state.replay_fitness, state.replay_ticks
                    ));
                }
                None => {
                    ui.label("No champion yet");
                }
            }

            if !state.best_history.is_empty() {
                ui.separator();
                ui.label("Fitness per generation");
                Plot::new("fitness_plot")
                    .height(150.0)
                    .legend(Legend::default())
                    .show(ui, |plot_ui| {
                        plot_ui.line(history_line(
                            "best",
                            &state.best_history,
                            egui::Color32::from_rgb(100, 255, 100),
                        ));
                        plot_ui.line(history_line(
                            "mean",
                            &state.mean_history,
                            egui::Color32::from_rgb(100, 150, 255),
                        ));
                        plot_ui.line(history_line(
                            "worst",
                            &state.worst_history,
                            egui::Color32::from_rgb(255, 100, 100),
                        ));
                    });
            }
        });
}
