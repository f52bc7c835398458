// ctf_sim/src/simulation/core/transforms.rs

use bevy::prelude::{Transform, Vec3};
use ctf_core::prelude::{Point2, Vec2};

// =========================================================================
// == Arena <-> Bevy Coordinate Conversion ==
// =========================================================================
//
// The arena is a 2D plane with +X east and +Y north. Bevy is Y-up with -Z
// forward, so the arena lies on the ground plane:
//   arena X  -> Bevy X
//   arena Y  -> Bevy -Z
//   (height) -> Bevy Y, always 0

/// Converts an arena point to a Bevy world position on the ground plane.
pub fn arena_point_to_bevy(p: &Point2) -> Vec3 {
    Vec3::new(p.x as f32, 0.0, -p.y as f32)
}

/// Projects a Bevy world position onto the arena plane, dropping the height.
pub fn bevy_to_arena_point(v: &Vec3) -> Point2 {
    Point2::new(v.x as f64, -v.z as f64)
}

/// Converts an arena direction to a Bevy direction on the ground plane.
pub fn arena_vector_to_bevy(v: &Vec2) -> Vec3 {
    Vec3::new(v.x as f32, 0.0, -v.y as f32)
}

pub fn arena_transform(p: &Point2) -> Transform {
    Transform::from_translation(arena_point_to_bevy(p))
}

/// Moves `transform` to `next` and turns it to face the direction of travel.
/// A transform that did not move keeps its rotation.
pub fn follow_arena_point(transform: &mut Transform, next: &Point2) {
    let previous = bevy_to_arena_point(&transform.translation);
    transform.translation = arena_point_to_bevy(next);

    let travel = arena_vector_to_bevy(&(next - previous));
    if travel.length_squared() > f32::EPSILON {
        transform.look_to(travel, Vec3::Y);
    }
}
