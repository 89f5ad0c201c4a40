//! Per-frame drawing of the trail, the star burst and the origin dot.

use crate::camera::Camera;
use crate::spiral::{ease, ease_out_elastic, map_range, Spiral};
use crate::surface::Surface;
use crate::theme::Theme;
use crate::{EngineParams, Star};
use cgmath::{Vector2, Vector3};
use std::f32::consts::PI;
use std::rc::Rc;

/// Early window (trail and star activation) ends this far past the dolly start.
const EARLY_WINDOW_OVERLAP: f32 = 0.25;
const SCENE_SPIN_GAMMA: f32 = 2.7;
const START_DOT_SIZE: f32 = 2.5;
const TRAIL_SWIRL: f32 = 5.0;

pub struct Renderer {
  params: EngineParams,
  spiral: Spiral,
  camera: Camera,
  stars: Rc<[Star]>,
}

impl Renderer {
  pub fn new(params: EngineParams, stars: Rc<[Star]>) -> Self {
    Self {
      spiral: Spiral::new(params.spiral, params.camera.vertical_offset),
      camera: Camera::new(params.camera),
      params,
      stars,
    }
  }

  pub fn stars(&self) -> &Rc<[Star]> {
    &self.stars
  }

  pub fn camera(&self) -> &Camera {
    &self.camera
  }

  /// Progress through the early window that drives the trail and star activation.
  pub fn early_progress(&self, time: f32) -> f32 {
    let end = self.params.camera.dolly_start + EARLY_WINDOW_OVERLAP;
    map_range(time, 0.0, end, 0.0, 1.0).clamp(0.0, 1.0)
  }

  /// Draws one complete frame for normalized timeline `time`.
  pub fn render<S: Surface>(&mut self, surface: &mut S, time: f32, theme: Theme) {
    self.render_faded(surface, time, theme, 1.0);
  }

  /// Same frame with the layer opacity scaled by `fade`.
  pub fn render_faded<S: Surface>(&mut self, surface: &mut S, time: f32, theme: Theme, fade: f32) {
    let opacity = self.params.render.opacity * fade;
    let (width, height) = surface.size();
    surface.clear(theme.background);
    surface.save();
    surface.translate(width as f32 / 2.0, height as f32 / 2.0);

    self.camera.update(time);
    let t1 = self.early_progress(time);
    let t2 = self.camera.dolly_progress(time);
    surface.rotate(-PI * ease(t2, SCENE_SPIN_GAMMA));

    self.draw_trail(surface, t1, time, theme, opacity);

    surface.set_fill(theme.foreground, self.params.render.star_alpha * opacity);
    for star in self.stars.iter() {
      if let Some(placement) = star.place(
        t1,
        &self.spiral,
        &self.params.camera,
        &self.params.render,
        self.params.stars.size,
      ) {
        self.show_projected_dot(surface, placement.world, placement.size);
      }
    }

    if self.camera.has_started(time) {
      self.show_projected_dot(surface, self.camera.start_dot(), START_DOT_SIZE);
    }
    surface.restore();
  }

  fn show_projected_dot<S: Surface>(&self, surface: &mut S, point: Vector3<f32>, size: f32) {
    if let Some(dot) = self.camera.project(point, size) {
      surface.fill_circle(dot.x, dot.y, dot.radius);
    }
  }

  /// Trail samples sit on a depth plane one zoom-length ahead of the camera's
  /// start, so they read at screen scale until the dolly carries the camera
  /// past them.
  fn draw_trail<S: Surface>(&self, surface: &mut S, t1: f32, time: f32, theme: Theme, opacity: f32) {
    let render = &self.params.render;
    let length = render.trail_length;
    let plane = self.params.camera.start_depth + self.params.camera.zoom;
    let zoom_ratio = self.params.camera.zoom / 400.0;

    let ep = (time * PI * 2.0).sin() * 0.5 + 0.5;
    let bounce = (ep * PI).sin() * 0.05 * (1.0 - ep);
    let spin = PI * ease_out_elastic(ep);

    for i in 0..length {
      let fade = map_range(i as f32, 0.0, length as f32, 1.1, 0.1);
      let stroke = (1.3 * (1.0 - t1) + 3.0 * (PI * t1).sin()) * fade;
      let pos = self.spiral.position(t1 - render.trail_step * i as f32);

      // swirl each sample around the midpoint between it and a diagonal twin
      let mid = pos + Vector2::new(TRAIL_SWIRL, TRAIL_SWIRL) * 0.5;
      let arm = pos - mid;
      let angle = arm.y.atan2(arm.x);
      let r = (arm.x * arm.x + arm.y * arm.y).sqrt() * (1.0 + bounce);
      let side = if i % 2 == 0 { -1.0 } else { 1.0 };
      let x = mid.x + r * (angle + side * spin).cos();
      let y = mid.y + r * (angle + side * spin).sin();

      surface.set_fill(theme.foreground, render.trail_alpha * fade * opacity);
      // size factor chosen so the projected radius is stroke / 2 at the start
      self.show_projected_dot(surface, self.camera.lift(x, y, plane), stroke * zoom_ratio);
    }
  }
}
