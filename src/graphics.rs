use geo::Point;
use macroquad::prelude::*;
use racer::simulation::mask::Mask;
use racer::simulation::track::Track;
use racer::simulation::vehicle::Vehicle;

const ASPHALT: Color = Color::new(0.35, 0.35, 0.38, 1.0);
const GRASS: Color = Color::new(0.18, 0.45, 0.16, 1.0);
const CAR: Color = Color::new(0.85, 0.1, 0.1, 1.0);

/// Placement of the track inside the window.
pub struct View {
    scale: f32,
}

impl View {
    /// Fits the whole track into the window, leaving `panel_width` free on the right.
    pub fn fit(track: &Track, panel_width: f32) -> Self {
        let available_w = (screen_width() - panel_width).max(1.0);
        let scale_x = available_w / track.width().max(1) as f32;
        let scale_y = screen_height() / track.height().max(1) as f32;
        Self {
            scale: scale_x.min(scale_y),
        }
    }
}

trait ToScreen {
    type Output;
    fn to_screen(&self, view: &View) -> Self::Output;
}

impl ToScreen for Point<f32> {
    type Output = Vec2;
    fn to_screen(&self, view: &View) -> Vec2 {
        vec2(self.x() * view.scale, self.y() * view.scale)
    }
}

impl ToScreen for f32 {
    type Output = f32;
    fn to_screen(&self, view: &View) -> f32 {
        self * view.scale
    }
}

/// GPU copies of the track masks.
pub struct TrackTextures {
    border: Texture2D,
    finish: Texture2D,
    finish_position: Point<f32>,
    size: (f32, f32),
    finish_size: (f32, f32),
}

impl TrackTextures {
    pub fn new(track: &Track) -> Self {
        let border = mask_texture(&track.border, |_, _| GRASS);
        let finish = mask_texture(&track.finish, |x, y| {
            if (x / 4 + y / 4) % 2 == 0 { WHITE } else { BLACK }
        });

        Self {
            border,
            finish,
            finish_position: track.finish_position,
            size: (track.width() as f32, track.height() as f32),
            finish_size: (track.finish.width() as f32, track.finish.height() as f32),
        }
    }
}

fn mask_texture(mask: &Mask, color_at: impl Fn(usize, usize) -> Color) -> Texture2D {
    let mut bytes = vec![0u8; mask.width() * mask.height() * 4];
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(x as i32, y as i32) {
                let i = (y * mask.width() + x) * 4;
                let rgba: [u8; 4] = color_at(x, y).into();
                bytes[i..i + 4].copy_from_slice(&rgba);
            }
        }
    }
    let texture = Texture2D::from_rgba8(mask.width() as u16, mask.height() as u16, &bytes);
    texture.set_filter(FilterMode::Nearest);
    texture
}

pub fn draw_track(textures: &TrackTextures, view: &View) {
    clear_background(BLACK);

    let (w, h) = textures.size;
    draw_rectangle(0.0, 0.0, w.to_screen(view), h.to_screen(view), ASPHALT);
    draw_texture_ex(
        &textures.border,
        0.0,
        0.0,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(w.to_screen(view), h.to_screen(view))),
            ..Default::default()
        },
    );

    let finish_pos = textures.finish_position.to_screen(view);
    let (fw, fh) = textures.finish_size;
    draw_texture_ex(
        &textures.finish,
        finish_pos.x,
        finish_pos.y,
        WHITE,
        DrawTextureParams {
            dest_size: Some(vec2(fw.to_screen(view), fh.to_screen(view))),
            ..Default::default()
        },
    );
}

pub fn draw_vehicle(vehicle: &Vehicle, view: &View) {
    let center = vehicle.center().to_screen(view);
    let width = (vehicle.sprite().width() as f32).to_screen(view);
    let height = (vehicle.sprite().height() as f32).to_screen(view);

    // Headings grow counter-clockwise, macroquad rotates clockwise.
    draw_rectangle_ex(
        center.x,
        center.y,
        width,
        height,
        DrawRectangleParams {
            offset: vec2(0.5, 0.5),
            rotation: -vehicle.angle.to_radians(),
            color: CAR,
        },
    );

    let front = vehicle.front().to_screen(view);
    draw_circle(front.x, front.y, 2.0_f32.to_screen(view).max(1.5), YELLOW);
}

pub fn draw_sensors(vehicle: &Vehicle, view: &View) {
    let Some(sensors) = &vehicle.sensors else {
        return;
    };

    for ray in sensors.rays() {
        let start = ray.origin.to_screen(view);
        let end = ray.end.to_screen(view);
        let color = if ray.hit { RED } else { ORANGE };
        draw_line(start.x, start.y, end.x, end.y, 2.0, color);
        if ray.hit {
            draw_circle(end.x, end.y, 3.0, RED);
        }
    }
}

pub fn draw_hud(lines: &[String]) {
    for (i, line) in lines.iter().enumerate() {
        draw_text(line, 10.0, 24.0 + i as f32 * 22.0, 24.0, WHITE);
    }
}
