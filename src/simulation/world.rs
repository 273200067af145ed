//! Immutable world shared by every episode.

use anyhow::ensure;
use geo::Point;

use super::mask::Mask;
use super::params::WorldConfig;
use super::track::Track;
use super::vehicle::{SensorArray, Vehicle};

/// Configuration, track and car shape, built once at startup.
///
/// Episodes only ever borrow the world, so a single instance can be shared across
/// threads while generations are evaluated in parallel.
#[derive(Debug, Clone)]
pub struct World {
    /// Simulation configuration.
    pub config: WorldConfig,
    /// Track collision geometry.
    pub track: Track,
    /// Unrotated car silhouette.
    pub sprite: Mask,
}

impl World {
    /// Builds a world with a track rasterized from the configured centreline and a
    /// rectangular car silhouette.
    pub fn new(config: WorldConfig) -> anyhow::Result<Self> {
        config.validate()?;
        ensure!(
            config.track.centerline.len() >= 2,
            "track centreline needs at least two points"
        );
        let track = Track::from_centerline(&config.track);
        Self::with_track(config, track)
    }

    /// Builds a world around a prepared track.
    pub fn with_track(config: WorldConfig, track: Track) -> anyhow::Result<Self> {
        config.validate()?;
        let sprite = Mask::filled(config.vehicle.width, config.vehicle.height);
        let world = Self {
            config,
            track,
            sprite,
        };
        world.check_start_pose();
        Ok(world)
    }

    /// Replaces the car silhouette.
    pub fn with_sprite(mut self, sprite: Mask) -> Self {
        self.sprite = sprite;
        self.check_start_pose();
        self
    }

    fn check_start_pose(&self) {
        let vehicle = Vehicle::new(&self.config.vehicle, self.sprite.clone());
        if vehicle
            .collide(&self.track.border, Point::new(0.0, 0.0))
            .is_some()
        {
            log::warn!(
                "car starts on the track border at ({}, {}); every scored episode will end at once",
                vehicle.pos.x(),
                vehicle.pos.y()
            );
        }
    }

    /// Creates a car at the start pose with sensors attached.
    pub fn spawn_vehicle(&self) -> Vehicle {
        Vehicle::new(&self.config.vehicle, self.sprite.clone())
            .with_sensors(SensorArray::new(&self.config.sensors))
    }
}
