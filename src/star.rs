//! Per-frame motion law for a single star.
//!
//! A star stays dark until global progress passes its spiral anchor, then runs
//! through three blended phases inside a quarter of the global timeline:
//! approach (ease toward the near offset), break-away (curled sweep to the far
//! offset) and burst (rotating extrapolation outward).

use crate::spiral::{lerp, Spiral};
use crate::{CameraParams, RenderParams, Star};
use cgmath::{Vector2, Vector3};
use std::f32::consts::PI;

/// Where a star sits this frame, ready for projection.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Placement {
  pub world: Vector3<f32>,
  pub size: f32,
}

impl Star {
  /// Local phase progress `dp` in `[0, 1]`, or `None` while the star is inactive.
  pub fn local_progress(&self, p: f32) -> Option<f32> {
    let q = p - self.spiral_location;
    if q <= 0.0 {
      return None;
    }
    Some((4.0 * q).clamp(0.0, 1.0))
  }

  /// Position in the spiral plane for local progress `dp`.
  pub fn plane_position(&self, dp: f32, anchor: Vector2<f32>, phases: &RenderParams) -> Vector2<f32> {
    let (a, b) = (phases.approach_end, phases.breakaway_end);
    let offset = Vector2::new(self.dx, self.dy);

    if dp < a {
      let t = dp / a;
      let easing = lerp(t, t * t, t);
      anchor + offset * (a * easing)
    } else if dp < b {
      let mid = (dp - a) / (b - a);
      let curve = (mid * PI).sin() * self.rotation_direction * 1.5;
      let from = anchor + offset * a;
      let to = anchor + offset * b;
      let curl = Vector2::new(-self.dy, self.dx) * (0.4 * curve * mid);
      from + (to - from) * mid + curl
    } else {
      let fp = (dp - b) / (1.0 - b);
      let from = anchor + offset * b;
      let reach = self.distance * self.expansion_rate * 1.5;
      let swing = self.angle + 1.2 * self.rotation_direction * fp * PI;
      let to = anchor + Vector2::new(swing.cos(), swing.sin()) * reach;
      from + (to - from) * fp
    }
  }

  /// Dot size multiplier: slow growth to 1.2 through break-away, then toward `final_scale`.
  pub fn size_multiplier(&self, dp: f32, phases: &RenderParams) -> f32 {
    let b = phases.breakaway_end;
    if dp < b {
      1.0 + 0.2 * dp / b
    } else {
      lerp(1.2, self.final_scale, (dp - b) / (1.0 - b))
    }
  }

  /// Computes this frame's world point and size factor for global progress `p`.
  ///
  /// Plane coordinates are pre-scaled by the star's distance from the camera's
  /// start plane, so before the dolly moves a star lands where the plane
  /// position says.
  pub fn place(
    &self,
    p: f32,
    spiral: &Spiral,
    camera: &CameraParams,
    phases: &RenderParams,
    base_size: f32,
  ) -> Option<Placement> {
    let dp = self.local_progress(p)?;
    let anchor = spiral.position(self.spiral_location);
    let plane = self.plane_position(dp, anchor, phases);
    let scale = (self.z - camera.start_depth) / camera.zoom;

    Some(Placement {
      world: Vector3::new(plane.x * scale, plane.y * scale, self.z),
      size: base_size * self.stroke_weight_factor * self.size_multiplier(dp, phases),
    })
  }
}
