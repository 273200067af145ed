use egui_macroquad::egui;
use racer::simulation::training::GenerationSummary;
use std::collections::VecDeque;

const MAX_HISTORY_POINTS: usize = 500;

/// State behind the training panel.
pub struct UIState {
    pub stats_panel_width: f32,
    pub best_history: VecDeque<(f64, f64)>,
    pub mean_history: VecDeque<(f64, f64)>,
    pub worst_history: VecDeque<(f64, f64)>,
    pub last_summary: Option<GenerationSummary>,
    pub total_generations: usize,
    pub champion_fitness: Option<i64>,
    pub replay_fitness: i64,
    pub replay_ticks: u64,
    pub status_message: Option<String>,
    pub stop_requested: bool,
    pub show_sensors: bool,
    pub training_done: bool,
}

impl UIState {
    pub fn new(total_generations: usize) -> Self {
        Self {
            stats_panel_width: 300.0,
            best_history: VecDeque::new(),
            mean_history: VecDeque::new(),
            worst_history: VecDeque::new(),
            last_summary: None,
            total_generations,
            champion_fitness: None,
            replay_fitness: 0,
            replay_ticks: 0,
            status_message: None,
            stop_requested: false,
            show_sensors: true,
            training_done: false,
        }
    }

    pub fn push_summary(&mut self, summary: &GenerationSummary) {
        let x = summary.generation as f64;
        push_bounded(&mut self.best_history, (x, summary.best as f64));
        push_bounded(&mut self.mean_history, (x, summary.mean));
        push_bounded(&mut self.worst_history, (x, summary.worst as f64));
        self.last_summary = Some(*summary);
    }
}

fn push_bounded(history: &mut VecDeque<(f64, f64)>, point: (f64, f64)) {
    history.push_back(point);
    if history.len() > MAX_HISTORY_POINTS {
        history.pop_front();
    }
}

pub fn draw_ui(state: &mut UIState) {
    egui_macroquad::ui(|egui_ctx| {
        let mut visuals = egui::Visuals::dark();
        visuals.override_text_color = Some(egui::Color32::from_rgb(240, 240, 240));
        visuals.widgets.noninteractive.fg_stroke.color = egui::Color32::from_rgb(220, 220, 220);
        visuals.widgets.hovered.fg_stroke.color = egui::Color32::WHITE;
        egui_ctx.set_visuals(visuals);

        super::stats::draw_stats_panel(egui_ctx, state);
    });
}

pub fn process_egui() {
    egui_macroquad::draw();
}

#[cfg(test)]
mod tests {
    use super::*;
    use racer::simulation::training::GenerationSummary;

    fn summary(generation: usize, best: i64) -> GenerationSummary {
        GenerationSummary {
            generation,
            best_id: 0,
            best,
            mean: best as f64 / 2.0,
            worst: 0,
            finished: 0,
        }
    }

    #[test]
    fn history_is_bounded() {
        let mut state = UIState::new(10);
        for generation in 0..MAX_HISTORY_POINTS + 20 {
            state.push_summary(&summary(generation, 10));
        }
        assert_eq!(state.best_history.len(), MAX_HISTORY_POINTS);
        assert_eq!(state.best_history.front().map(|p| p.0), Some(20.0));
        assert_eq!(
            state.last_summary.map(|s| s.generation),
            Some(MAX_HISTORY_POINTS + 19)
        );
    }
}
