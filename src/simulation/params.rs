//! Simulation configuration.
//!
//! Every tunable of the simulation lives in [`WorldConfig`]. It is loaded once at
//! startup and never mutated afterwards.

use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use super::mask::DEFAULT_ALPHA_THRESHOLD;

/// Racing line of the default track, in track pixels.
const DEFAULT_CENTERLINE: [(f32, f32); 22] = [
    (175.0, 119.0),
    (110.0, 70.0),
    (56.0, 133.0),
    (70.0, 481.0),
    (318.0, 731.0),
    (404.0, 680.0),
    (418.0, 521.0),
    (507.0, 475.0),
    (600.0, 551.0),
    (613.0, 715.0),
    (736.0, 713.0),
    (734.0, 399.0),
    (611.0, 357.0),
    (409.0, 343.0),
    (433.0, 257.0),
    (697.0, 258.0),
    (738.0, 123.0),
    (581.0, 71.0),
    (303.0, 78.0),
    (275.0, 377.0),
    (176.0, 388.0),
    (178.0, 260.0),
];

/// Track geometry, either rasterized from a centreline or loaded from images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackParams {
    /// Track width in pixels.
    pub width: usize,
    /// Track height in pixels.
    pub height: usize,
    /// Closed racing line the drivable corridor is built around.
    pub centerline: Vec<(f32, f32)>,
    /// Half of the corridor width.
    pub half_width: f32,
    /// World position of the finish mask's top-left corner.
    pub finish_position: (f32, f32),
    /// Size of the rectangular finish mask.
    pub finish_size: (usize, usize),
    /// Optional border image; replaces the rasterized border when set together
    /// with `finish_image`.
    pub border_image: Option<String>,
    /// Optional finish-line image.
    pub finish_image: Option<String>,
    /// Pixels with alpha above this value are solid.
    pub alpha_threshold: u8,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            width: 810,
            height: 810,
            centerline: DEFAULT_CENTERLINE.to_vec(),
            half_width: 45.0,
            finish_position: (130.0, 250.0),
            finish_size: (94, 19),
            border_image: None,
            finish_image: None,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
        }
    }
}

/// Car kinematics and shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    /// Top-left corner of the car at the start of every episode.
    pub start_position: (f32, f32),
    /// Maximum forward velocity (pixels per tick). Reverse is capped at half of it.
    pub max_velocity: f32,
    /// Heading change per steering tick, in degrees.
    pub rotation_speed: f32,
    /// Velocity change per throttle tick. Friction removes half of it.
    pub acceleration: f32,
    /// Sprite width in pixels.
    pub width: usize,
    /// Sprite height in pixels.
    pub height: usize,
    /// Optional car image whose alpha channel becomes the silhouette.
    pub sprite_image: Option<String>,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            start_position: (180.0, 200.0),
            max_velocity: 8.0,
            rotation_speed: 4.0,
            acceleration: 0.8,
            width: 20,
            height: 38,
            sprite_image: None,
        }
    }
}

/// Ray-cast sensor fan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorParams {
    /// Ray angles relative to the car heading, in degrees. Positive is to the left.
    pub angles: Vec<f32>,
    /// Maximum ray length; also the number of marching steps.
    pub length: f32,
}

impl Default for SensorParams {
    fn default() -> Self {
        Self {
            angles: vec![-45.0, -22.5, 0.0, 22.5, 45.0],
            length: 150.0,
        }
    }
}

/// Episode pacing, termination and reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeParams {
    /// Ticks per second in interactive mode.
    pub tick_rate: u32,
    /// Tick budget for scored episodes; `None` runs until a terminal event.
    pub max_ticks: Option<u64>,
    /// Fitness awarded for crossing the finish line in the forward direction.
    pub finish_bonus: i64,
    /// Policy outputs beyond `±steer_threshold` turn the car.
    pub steer_threshold: f32,
}

impl Default for EpisodeParams {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_ticks: Some(10_000),
            finish_bonus: 1_000,
            steer_threshold: 0.5,
        }
    }
}

/// Settings for the built-in training loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    /// Number of generations to evaluate.
    pub generations: usize,
    /// Candidates per generation.
    pub population_size: usize,
    /// Hidden layer sizes of candidate networks.
    pub hidden_layers: Vec<usize>,
    /// Initial weights are drawn from `[-weight_scale, weight_scale]`.
    pub weight_scale: f32,
    /// Seed for candidate generation; random when unset.
    pub seed: Option<u64>,
}

impl Default for TrainingParams {
    fn default() -> Self {
        Self {
            generations: 50,
            population_size: 50,
            hidden_layers: vec![8],
            weight_scale: 1.0,
            seed: None,
        }
    }
}

/// Complete simulation configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Track geometry.
    pub track: TrackParams,
    /// Car kinematics and shape.
    pub vehicle: VehicleParams,
    /// Sensor fan.
    pub sensors: SensorParams,
    /// Episode rules.
    pub episode: EpisodeParams,
    /// Training loop.
    pub training: TrainingParams,
}

impl WorldConfig {
    /// Loads a configuration from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&json)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as pretty-printed JSON.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Rejects configurations the simulation cannot run.
    pub fn validate(&self) -> anyhow::Result<()> {
        let track = &self.track;
        ensure!(
            track.width > 0 && track.height > 0,
            "track must have a non-zero size"
        );
        ensure!(
            track.border_image.is_some() || track.centerline.len() >= 2,
            "track centreline needs at least two points"
        );
        ensure!(track.half_width > 0.0, "track half_width must be positive");

        let vehicle = &self.vehicle;
        ensure!(
            vehicle.width > 0 && vehicle.height > 0,
            "vehicle must have a non-zero size"
        );
        ensure!(
            vehicle.max_velocity > 0.0,
            "vehicle max_velocity must be positive"
        );
        ensure!(
            vehicle.acceleration > 0.0,
            "vehicle acceleration must be positive"
        );

        ensure!(
            !self.sensors.angles.is_empty(),
            "at least one sensor angle is required"
        );
        ensure!(self.sensors.length >= 1.0, "sensor length must be at least 1");

        ensure!(self.episode.tick_rate > 0, "tick_rate must be positive");
        ensure!(
            self.episode.max_ticks != Some(0),
            "max_ticks must be positive when set"
        );
        ensure!(
            self.training.population_size > 0,
            "population_size must be positive"
        );
        ensure!(
            self.training.hidden_layers.iter().all(|&n| n > 0),
            "hidden layers must not be empty"
        );
        ensure!(
            self.training.weight_scale > 0.0,
            "weight_scale must be positive"
        );

        Ok(())
    }

    /// Layer sizes of a candidate network: one input per sensor, one steering output.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.training.hidden_layers.len() + 2);
        sizes.push(self.sensors.angles.len());
        sizes.extend(&self.training.hidden_layers);
        sizes.push(1);
        sizes
    }
}
