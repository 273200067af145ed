//! # Racer - Top-down racing simulation for evolved drivers
//!
//! A 2D racing game whose physics core doubles as a training environment for
//! neural-network drivers. Cars perceive the track through a fan of ray-cast
//! distance sensors and are scored by how long they survive without touching
//! the track border.
//!
//! ## Features
//!
//! - Pixel-exact mask collision between the car silhouette and the track
//! - Ray-marched distance sensors normalized into a perception vector
//! - Arcade kinematics with acceleration, friction and speed clamping
//! - One episode runner shared by human play and scored evaluation
//! - Parallel generation evaluation behind a narrow search interface
//! - Procedural track rasterized from a racing line
//!
//! ## Core Modules
//!
//! - [`simulation::mask`] - Packed per-pixel opacity masks
//! - [`simulation::collision`] - Silhouette overlap queries and finish-line crossings
//! - [`simulation::vehicle`] - Car kinematics and its sensor fan
//! - [`simulation::episode`] - Fixed-timestep episode runner and fitness accounting
//! - [`simulation::training`] - Generation evaluation and the search interface

/// Core simulation logic and data structures.
pub mod simulation {
    /// Feed-forward network policies.
    pub mod brain;
    /// Silhouette overlap queries.
    pub mod collision;
    /// Human-input adapter mapping key state onto car commands.
    pub mod controls;
    /// Episode runner, drivers and stop signals.
    pub mod episode;
    /// Geometric helpers for rays and polylines.
    pub mod geometric_utils;
    /// Packed bitmasks used for pixel-exact collision.
    pub mod mask;
    /// Simulation configuration.
    pub mod params;
    /// Policy abstraction and built-in controllers.
    pub mod policy;
    /// Track border and finish-line masks.
    pub mod track;
    /// Generation evaluation and the evolutionary search seam.
    ///
    /// The [`training::Search`] trait is implemented by whatever produces
    /// candidate policies; this crate only runs and scores their episodes.
    pub mod training;
    /// Car state, kinematics and sensors.
    pub mod vehicle;
    /// Immutable world shared by every episode.
    pub mod world;
}
