use crate::random::UnitRandom;
use crate::spiral::lerp;
use crate::{CameraParams, Star, StarParams};
use std::f32::consts::PI;

/// Builds the full star set from one random stream. Each star consumes exactly
/// eight draws, in field order, so a given seed always yields the same set.
#[must_use]
pub fn create_stars<R: UnitRandom>(
  rng: &mut R,
  star_params: &StarParams,
  camera: &CameraParams,
) -> Vec<Star> {
  let mut stars = Vec::with_capacity(star_params.count as usize);
  for _ in 0..star_params.count {
    stars.push(create_star(rng, star_params, camera));
  }
  stars
}

pub fn create_star<R: UnitRandom>(rng: &mut R, params: &StarParams, camera: &CameraParams) -> Star {
  let angle = rng.next_unit() * PI * 2.0;
  let distance = params.distance_span * rng.next_unit() + params.distance_min;
  let rotation_direction = if rng.next_unit() > 0.5 { 1.0 } else { -1.0 };
  let expansion_rate = params.expansion_min + rng.next_unit() * params.expansion_span;
  let final_scale = params.final_scale_min + rng.next_unit() * params.final_scale_span;
  // cubic bias clusters anchors toward the start of the spiral
  let spiral_location = spiral_location(rng.next_unit());

  let near = 0.5 * camera.start_depth;
  let far = camera.travel_distance + camera.start_depth;
  let z = lerp(near, far, rng.next_unit());
  let z = z * 0.7 + (camera.travel_distance / 2.0) * 0.3 * spiral_location;

  let stroke_weight_factor = rng.next_unit().powi(2);

  Star {
    angle,
    distance,
    rotation_direction,
    expansion_rate,
    final_scale,
    spiral_location,
    z,
    stroke_weight_factor,
    dx: distance * angle.cos(),
    dy: distance * angle.sin(),
  }
}

pub fn spiral_location(u: f32) -> f32 {
  (1.0 - (1.0 - u).powi(3)) / 1.3
}
