//! Dolly camera and the perspective projection shared by every drawn element.

use crate::spiral::{ease, map_range};
use crate::CameraParams;
use cgmath::Vector3;

const DOLLY_GAMMA: f32 = 1.8;
const DOLLY_EXPONENT: f32 = 1.2;
const MIN_RADIUS: f32 = 0.3;

/// A projected circle in screen space, relative to the surface center.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Dot {
  pub x: f32,
  pub y: f32,
  pub radius: f32,
}

#[derive(Copy, Clone, Debug)]
pub struct Camera {
  pub params: CameraParams,
  /// Current camera depth.
  pub depth: f32,
}

impl Camera {
  pub fn new(params: CameraParams) -> Self {
    Self {
      params,
      depth: params.start_depth,
    }
  }

  /// Progress of the dolly in `[0, 1]`; zero until `dolly_start` has passed.
  pub fn dolly_progress(&self, time: f32) -> f32 {
    map_range(time, self.params.dolly_start, 1.0, 0.0, 1.0).clamp(0.0, 1.0)
  }

  /// Moves the camera to where it sits at normalized timeline `time`.
  pub fn update(&mut self, time: f32) {
    let t = self.dolly_progress(time);
    self.depth =
      self.params.start_depth + ease(t.powf(DOLLY_EXPONENT), DOLLY_GAMMA) * self.params.travel_distance;
  }

  pub fn has_started(&self, time: f32) -> bool {
    time > self.params.dolly_start
  }

  /// Perspective-divides `point`. Returns `None` for anything at or behind the
  /// camera plane.
  pub fn project(&self, point: Vector3<f32>, size_factor: f32) -> Option<Dot> {
    if point.z <= self.depth {
      return None;
    }
    let depth = point.z - self.depth;
    let stroke = 400.0 * size_factor / depth;
    Some(Dot {
      x: self.params.zoom * point.x / depth,
      y: self.params.zoom * point.y / depth,
      radius: (stroke * 0.5).max(MIN_RADIUS),
    })
  }

  /// Lifts a screen-plane point onto a depth plane so that, seen from the
  /// start position, it projects back onto itself.
  pub fn lift(&self, x: f32, y: f32, z: f32) -> Vector3<f32> {
    let scale = (z - self.params.start_depth) / self.params.zoom;
    Vector3::new(x * scale, y * scale, z)
  }

  /// World point of the fixed origin dot.
  pub fn start_dot(&self) -> Vector3<f32> {
    let dy = self.params.start_depth * self.params.vertical_offset / self.params.zoom;
    Vector3::new(0.0, dy, self.params.travel_distance)
  }
}
