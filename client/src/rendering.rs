use crate::camera::Camera;
use crate::game::{PlayerBlob, WorldState};
use crate::network::ConnectionStatus;
use macroquad::prelude::*;
use shared::{GRID_SPACING, LABEL_FONT_SIZE, LABEL_OFFSET};

/// What one frame needs to draw.
///
/// `world` is `None` until the first entity-bearing message of the current
/// connection has been applied.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub world: Option<&'a WorldState>,
    pub camera: Camera,
    pub status: &'a ConnectionStatus,
}

const BACKGROUND: Color = Color::new(0.941, 0.941, 0.941, 1.0);
const GRID: Color = Color::new(0.867, 0.867, 0.867, 1.0);

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: u16, height: u16) -> Self {
        Renderer {
            width: f32::from(width),
            height: f32::from(height),
        }
    }

    pub fn render(&self, frame: &FrameView<'_>) {
        clear_background(BACKGROUND);

        self.draw_grid(&frame.camera);

        if let Some(world) = frame.world {
            // Fixed z-order: food, then other players, then ourselves on top
            for food in world.food.values() {
                self.draw_blob(&frame.camera, food.x, food.y, food.radius, BLUE);
            }

            for (name, player) in world.others.iter().filter(|(_, p)| p.alive) {
                self.draw_player(&frame.camera, player, RED);
                self.draw_label(&frame.camera, name, player);
            }

            if let Some(me) = world.live_self() {
                self.draw_player(&frame.camera, me, GREEN);
            }
        }

        self.draw_ui(frame);
    }

    fn draw_grid(&self, camera: &Camera) {
        let (xs, ys) = camera.grid_lines(GRID_SPACING);

        for x in xs {
            let sx = camera.world_to_screen(vec2(x, 0.0)).x;
            draw_line(sx, 0.0, sx, self.height, 1.0, GRID);
        }
        for y in ys {
            let sy = camera.world_to_screen(vec2(0.0, y)).y;
            draw_line(0.0, sy, self.width, sy, 1.0, GRID);
        }
    }

    fn draw_blob(&self, camera: &Camera, x: f32, y: f32, radius: f32, color: Color) {
        let center = camera.world_to_screen(vec2(x, y));
        draw_circle(center.x, center.y, camera.scale(radius), color);
    }

    fn draw_player(&self, camera: &Camera, player: &PlayerBlob, color: Color) {
        self.draw_blob(camera, player.x, player.y, player.r, color);
    }

    fn draw_label(&self, camera: &Camera, name: &str, player: &PlayerBlob) {
        let center = camera.world_to_screen(vec2(player.x, player.y));
        let half_width = measure_text(name, None, LABEL_FONT_SIZE as u16, 1.0).width / 2.0;
        let height = LABEL_OFFSET + camera.scale(player.r);

        draw_text(name, center.x - half_width, center.y - height, LABEL_FONT_SIZE, BLACK);
    }

    fn draw_ui(&self, frame: &FrameView<'_>) {
        let y_start = 10.0;

        let connection_color = if frame.status.is_connected() {
            GREEN
        } else {
            RED
        };
        draw_rectangle(10.0, y_start, 8.0, 8.0, connection_color);
        draw_text(&frame.status.label(), 24.0, y_start + 8.0, 14.0, DARKGRAY);

        let player_count = frame.world.map_or(0, WorldState::player_count);
        let player_y = y_start + 20.0;
        for i in 0..(player_count.min(8)) {
            draw_rectangle(
                10.0 + (i as f32) * 4.0,
                player_y,
                3.0,
                3.0,
                Color::from_rgba(0, 170, 255, 255),
            );
        }
        let player_text = format!("{} players", player_count);
        draw_text(&player_text, 45.0, player_y + 4.0, 14.0, DARKGRAY);
    }
}
