//! The demo pool: a square border of long boxes around the water plane and
//! three boxes breaking the surface inside it.

use std::f32::consts::PI;

use foamline_render::{BoxDesc, Lights, SceneDesc};
use glam::Vec3;

pub const BOX_COLOR: u32 = 0xea4d10;

/// Border wall length; matches the water plane's edge.
const WALL_LENGTH: f32 = 10.0;

fn wall(position: Vec3, rotation: Vec3) -> BoxDesc {
    BoxDesc::new(Vec3::new(WALL_LENGTH, 1.0, 1.0), position)
        .rotated(rotation)
        .colored(BOX_COLOR)
}

fn unit_box(position: Vec3) -> BoxDesc {
    BoxDesc::new(Vec3::ONE, position).colored(BOX_COLOR)
}

pub fn demo_scene() -> SceneDesc {
    let quarter_turn = Vec3::new(0.0, PI * 0.5, 0.0);
    let boxes = vec![
        wall(Vec3::new(0.0, 0.0, 4.5), Vec3::ZERO),
        wall(Vec3::new(0.0, 0.0, -4.5), Vec3::ZERO),
        wall(Vec3::new(-5.0, 0.0, 0.0), quarter_turn),
        wall(Vec3::new(5.0, 0.0, 0.0), quarter_turn),
        unit_box(Vec3::ZERO).rotated(Vec3::new(PI * 0.05, PI * 0.1, 0.0)),
        unit_box(Vec3::new(3.0, 0.0, 3.0)),
        unit_box(Vec3::new(-3.0, 0.0, -2.0)),
    ];
    SceneDesc {
        boxes,
        lights: Lights::default(),
    }
}
