use std::ops::ControlFlow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;

use anyhow::{Context, bail};
use macroquad::prelude::*;
use racer::simulation::brain::Brain;
use racer::simulation::controls::Controls;
use racer::simulation::episode::{Episode, Mode, PolicyDriver};
use racer::simulation::params::WorldConfig;
use racer::simulation::training::{self, GenerationSummary, RandomSearch};
use racer::simulation::world::World;

mod assets;
mod graphics;
mod ui;

use graphics::{TrackTextures, View};

/// Upper bound on simulation ticks per rendered frame.
const MAX_SUBSTEPS: u32 = 8;
const PANEL_WIDTH: f32 = 300.0;

const USAGE: &str = "usage: racer [play|train] [--config <path>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunMode {
    Play,
    Train,
}

#[derive(Debug)]
struct Cli {
    mode: RunMode,
    config: Option<String>,
}

impl Cli {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut cli = Cli {
            mode: RunMode::Play,
            config: None,
        };

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "play" => cli.mode = RunMode::Play,
                "train" => cli.mode = RunMode::Train,
                "--config" => {
                    let path = args.next().context("--config needs a path")?;
                    cli.config = Some(path);
                }
                other => bail!("unexpected argument `{}`\n{}", other, USAGE),
            }
        }

        Ok(cli)
    }
}

/// Converts frame time into a whole number of fixed simulation ticks.
struct Clock {
    tick: f32,
    accumulator: f32,
}

impl Clock {
    fn new(tick_rate: u32) -> Self {
        Self {
            tick: 1.0 / tick_rate as f32,
            accumulator: 0.0,
        }
    }

    fn ticks_due(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time;
        let mut ticks = 0;
        while self.accumulator >= self.tick && ticks < MAX_SUBSTEPS {
            self.accumulator -= self.tick;
            ticks += 1;
        }
        if ticks == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling.
            self.accumulator = 0.0;
        }
        ticks
    }
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Racing Game!".to_owned(),
        window_width: 810 + PANEL_WIDTH as i32,
        window_height: 810,
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse(std::env::args().skip(1))?;

    let config = match &cli.config {
        Some(path) => WorldConfig::load_from_file(path)?,
        None => WorldConfig::default(),
    };
    let world = assets::load_world(config).context("failed to build the world")?;
    let textures = TrackTextures::new(&world.track);

    prevent_quit();

    match cli.mode {
        RunMode::Play => {
            play(&world, &textures).await;
            Ok(())
        }
        RunMode::Train => train(world, &textures).await,
    }
}

fn poll_controls() -> Controls {
    Controls {
        left: is_key_down(KeyCode::A) || is_key_down(KeyCode::Left),
        right: is_key_down(KeyCode::D) || is_key_down(KeyCode::Right),
        accelerate: is_key_down(KeyCode::W) || is_key_down(KeyCode::Up),
        brake: is_key_down(KeyCode::S) || is_key_down(KeyCode::Down),
    }
}

fn quit_pressed() -> bool {
    is_quit_requested() || is_key_pressed(KeyCode::Escape)
}

async fn play(world: &World, textures: &TrackTextures) {
    let mut episode = Episode::new(world, world.spawn_vehicle(), Mode::Interactive);
    let mut clock = Clock::new(world.config.episode.tick_rate);
    log::info!("play mode: W/S throttle, A/D steer, Esc quits");

    loop {
        if quit_pressed() {
            episode.abandon();
            break;
        }

        for _ in 0..clock.ticks_due(get_frame_time()) {
            let mut controls = poll_controls();
            episode.step(&mut controls);
        }

        let view = View::fit(&world.track, 0.0);
        graphics::draw_track(textures, &view);
        graphics::draw_sensors(episode.vehicle(), &view);
        graphics::draw_vehicle(episode.vehicle(), &view);
        graphics::draw_hud(&[
            format!("Laps: {}", episode.laps()),
            format!("Crashes: {}", episode.crashes()),
            format!("Speed: {:.1}", episode.vehicle().vel),
        ]);

        next_frame().await;
    }

    log::info!(
        "session over: {} laps, {} crashes in {} ticks",
        episode.laps(),
        episode.crashes(),
        episode.ticks()
    );
}

/// Progress sent from the training thread after every generation.
struct TrainingUpdate {
    summary: GenerationSummary,
    champion: Option<(Brain, i64)>,
}

/// The current champion driving a scored episode on screen, restarted whenever it ends.
struct Replay<'w> {
    world: &'w World,
    brain: Brain,
    episode: Episode<'w>,
}

impl<'w> Replay<'w> {
    fn new(world: &'w World, brain: Brain) -> Self {
        Self {
            world,
            brain,
            episode: Episode::new(world, world.spawn_vehicle(), Mode::Scored),
        }
    }

    fn step(&mut self) {
        let threshold = self.world.config.episode.steer_threshold;
        let mut driver = PolicyDriver::new(&mut self.brain, threshold);
        if self.episode.step(&mut driver).is_terminal() {
            self.episode = Episode::new(self.world, self.world.spawn_vehicle(), Mode::Scored);
        }
    }
}

async fn train(world: World, textures: &TrackTextures) -> anyhow::Result<()> {
    let world = Arc::new(world);
    let stop = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let worker = {
        let world = Arc::clone(&world);
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("training".to_owned())
            .spawn(move || {
                let mut search = RandomSearch::new(&world.config);
                let generations = world.config.training.generations;
                training::train_with(&world, &mut search, generations, &*stop, |search, summary| {
                    let champion = search.champion().map(|c| (c.brain.clone(), c.fitness));
                    let update = TrainingUpdate {
                        summary: *summary,
                        champion,
                    };
                    match tx.send(update) {
                        Ok(()) => ControlFlow::Continue(()),
                        Err(_) => ControlFlow::Break(()),
                    }
                });
                search.champion().map(|c| (c.fitness, c.generation))
            })
            .context("failed to spawn the training thread")?
    };

    let mut ui_state = ui::UIState::new(world.config.training.generations);
    let mut replay: Option<Replay> = None;
    let mut clock = Clock::new(world.config.episode.tick_rate);

    loop {
        if quit_pressed() || ui_state.stop_requested {
            stop.store(true, Ordering::Relaxed);
            break;
        }

        while let Ok(update) = rx.try_recv() {
            ui_state.push_summary(&update.summary);
            if let Some((brain, fitness)) = update.champion {
                if ui_state.champion_fitness != Some(fitness) {
                    ui_state.champion_fitness = Some(fitness);
                    replay = Some(Replay::new(&world, brain));
                }
            }
        }

        if worker.is_finished() && !ui_state.training_done {
            ui_state.training_done = true;
            ui_state.status_message = Some("Training finished".to_owned());
        }

        let view = View::fit(&world.track, PANEL_WIDTH);
        graphics::draw_track(textures, &view);

        let ticks = clock.ticks_due(get_frame_time());
        if let Some(replay) = replay.as_mut() {
            for _ in 0..ticks {
                replay.step();
            }
            ui_state.replay_fitness = replay.episode.fitness();
            ui_state.replay_ticks = replay.episode.ticks();

            if ui_state.show_sensors {
                graphics::draw_sensors(replay.episode.vehicle(), &view);
            }
            graphics::draw_vehicle(replay.episode.vehicle(), &view);
        }

        ui::draw_ui(&mut ui_state);
        ui::process_egui();

        next_frame().await;
    }

    match worker.join() {
        Ok(Some((fitness, generation))) => {
            log::info!(
                "best fitness {} found in generation {}",
                fitness,
                generation
            );
            Ok(())
        }
        Ok(None) => {
            log::info!("training ended without a champion");
            Ok(())
        }
        Err(_) => bail!("training thread panicked"),
    }
}
