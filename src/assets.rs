use anyhow::{Context, anyhow, bail};
use geo::Point;
use macroquad::prelude::Image;
use racer::simulation::mask::Mask;
use racer::simulation::params::WorldConfig;
use racer::simulation::track::Track;
use racer::simulation::world::World;

/// Builds the world, loading track and car images when the config names them.
pub fn load_world(config: WorldConfig) -> anyhow::Result<World> {
    let threshold = config.track.alpha_threshold;

    let world = match (&config.track.border_image, &config.track.finish_image) {
        (Some(border), Some(finish)) => {
            let border = load_mask(border, threshold)?;
            let finish = load_mask(finish, threshold)?;
            let (x, y) = config.track.finish_position;
            log::info!(
                "loaded {}x{} track with a {}x{} finish line",
                border.width(),
                border.height(),
                finish.width(),
                finish.height()
            );
            World::with_track(config, Track::new(border, finish, Point::new(x, y)))?
        }
        (None, None) => World::new(config)?,
        _ => bail!("border_image and finish_image must be set together"),
    };

    match world.config.vehicle.sprite_image.clone() {
        Some(path) => {
            let sprite = load_mask(&path, threshold)?;
            Ok(world.with_sprite(sprite))
        }
        None => Ok(world),
    }
}

fn load_mask(path: &str, threshold: u8) -> anyhow::Result<Mask> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read image {}", path))?;
    let image = Image::from_file_with_format(&bytes, None)
        .map_err(|err| anyhow!("failed to decode image {}: {:?}", path, err))?;
    Mask::from_rgba(
        image.width as usize,
        image.height as usize,
        &image.bytes,
        threshold,
    )
    .with_context(|| format!("bad image data in {}", path))
}
