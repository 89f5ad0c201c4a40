//! The spiral trajectory and the easing helpers shared by every moving part.

use crate::SpiralParams;
use cgmath::Vector2;
use std::f32::consts::PI;

/// Symmetric power easing: `0.5 * (2p)^g` below the midpoint, mirrored above it.
pub fn ease(p: f32, gamma: f32) -> f32 {
  if p < 0.5 {
    0.5 * (2.0 * p).powf(gamma)
  } else {
    1.0 - 0.5 * (2.0 * (1.0 - p)).powf(gamma)
  }
}

pub fn ease_out_elastic(x: f32) -> f32 {
  let c4 = (2.0 * PI) / 4.5;
  if x <= 0.0 {
    0.0
  } else if x >= 1.0 {
    1.0
  } else {
    2f32.powf(-8.0 * x) * ((x * 8.0 - 0.75) * c4).sin() + 1.0
  }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
  a + (b - a) * t
}

/// Maps `v` from `[s1, e1]` onto `[s2, e2]` without clamping.
pub fn map_range(v: f32, s1: f32, e1: f32, s2: f32, e2: f32) -> f32 {
  s2 + (e2 - s2) * ((v - s1) / (e1 - s1))
}

#[derive(Copy, Clone, Debug)]
pub struct Spiral {
  params: SpiralParams,
  vertical_offset: f32,
}

impl Spiral {
  pub fn new(params: SpiralParams, vertical_offset: f32) -> Self {
    Self {
      params,
      vertical_offset,
    }
  }

  /// Point on the spiral for progress `p`. Inputs outside `[0, 1]` are clamped.
  pub fn position(&self, p: f32) -> Vector2<f32> {
    let p = (self.params.stretch * p).clamp(0.0, 1.0);
    let p = ease(p, self.params.gamma).sqrt();
    let theta = 2.0 * PI * self.params.turns * p;
    let r = self.params.radius * p;
    Vector2::new(r * theta.cos(), r * theta.sin() + self.vertical_offset)
  }

  pub fn radius_at(&self, p: f32) -> f32 {
    let pos = self.position(p);
    let y = pos.y - self.vertical_offset;
    (pos.x * pos.x + y * y).sqrt()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ease_is_symmetric_and_pinned() {
    assert_eq!(ease(0.0, 1.8), 0.0);
    assert!((ease(0.5, 1.8) - 0.5).abs() < 1e-6);
    assert!((ease(1.0, 1.8) - 1.0).abs() < 1e-6);
    for i in 0..=20 {
      let p = i as f32 / 20.0;
      assert!((ease(p, 2.7) + ease(1.0 - p, 2.7) - 1.0).abs() < 1e-5);
    }
  }

  #[test]
  fn elastic_is_clamped_at_ends() {
    assert_eq!(ease_out_elastic(-0.5), 0.0);
    assert_eq!(ease_out_elastic(0.0), 0.0);
    assert_eq!(ease_out_elastic(1.0), 1.0);
    assert_eq!(ease_out_elastic(3.0), 1.0);
  }

  #[test]
  fn spiral_starts_at_offset_origin() {
    let spiral = Spiral::new(SpiralParams::default(), 28.0);
    let start = spiral.position(0.0);
    assert!(start.x.abs() < 1e-6);
    assert!((start.y - 28.0).abs() < 1e-6);
  }

  #[test]
  fn spiral_radius_never_shrinks() {
    let spiral = Spiral::new(SpiralParams::default(), 28.0);
    let mut last = 0.0;
    for i in 0..=2000 {
      let r = spiral.radius_at(i as f32 / 2000.0);
      assert!(r + 1e-3 >= last, "radius dropped from {last} to {r} at step {i}");
      last = r;
    }
    assert!((last - 170.0).abs() < 1e-2);
  }

  #[test]
  fn spiral_saturates_after_stretch() {
    let spiral = Spiral::new(SpiralParams::default(), 0.0);
    let a = spiral.position(1.0 / 1.2);
    let b = spiral.position(1.0);
    assert!((a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4);
  }
}
