//! Drawing surfaces the renderer can target.

use crate::error::EngineError;
use crate::theme::Color;
use cgmath::{Matrix3, Rad, SquareMatrix, Vector3};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// The small immediate-mode subset of a 2D canvas the engine needs.
pub trait Surface {
  fn size(&self) -> (u32, u32);
  fn resize(&mut self, width: u32, height: u32);
  /// Wipes the whole surface, ignoring the current transform.
  fn clear(&mut self, background: Color);
  fn save(&mut self);
  fn restore(&mut self);
  fn translate(&mut self, dx: f32, dy: f32);
  fn rotate(&mut self, angle: f32);
  fn set_fill(&mut self, color: Color, alpha: f32);
  fn fill_circle(&mut self, x: f32, y: f32, radius: f32);
}

#[rustfmt::skip]
fn translation(dx: f32, dy: f32) -> Matrix3<f32> {
  Matrix3::new(
    1.0, 0.0, 0.0,
    0.0, 1.0, 0.0,
    dx,  dy,  1.0,
  )
}

/// CPU raster backed by an RGBA image.
pub struct Raster {
  image: RgbaImage,
  transform: Matrix3<f32>,
  stack: Vec<Matrix3<f32>>,
  fill: (Color, f32),
}

impl Raster {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      image: RgbaImage::new(width, height),
      transform: Matrix3::identity(),
      stack: Vec::new(),
      fill: (Color::rgb(0, 0, 0), 1.0),
    }
  }

  pub fn image(&self) -> &RgbaImage {
    &self.image
  }

  pub fn save_png(&self, path: &Path) -> Result<(), EngineError> {
    self.image.save(path).map_err(|source| EngineError::FrameExport {
      path: path.to_path_buf(),
      source,
    })
  }

  fn blend(&mut self, x: u32, y: u32, alpha: f32) {
    let (color, _) = self.fill;
    let Rgba([r, g, b, _]) = *self.image.get_pixel(x, y);
    let mix = |dst: u8, src: u8| (dst as f32 + (src as f32 - dst as f32) * alpha).round() as u8;
    self
      .image
      .put_pixel(x, y, Rgba([mix(r, color.r), mix(g, color.g), mix(b, color.b), 255]));
  }
}

impl Surface for Raster {
  fn size(&self) -> (u32, u32) {
    self.image.dimensions()
  }

  fn resize(&mut self, width: u32, height: u32) {
    self.image = RgbaImage::new(width, height);
    self.transform = Matrix3::identity();
    self.stack.clear();
  }

  fn clear(&mut self, background: Color) {
    let pixel = Rgba([background.r, background.g, background.b, 255]);
    for p in self.image.pixels_mut() {
      *p = pixel;
    }
  }

  fn save(&mut self) {
    self.stack.push(self.transform);
  }

  fn restore(&mut self) {
    if let Some(transform) = self.stack.pop() {
      self.transform = transform;
    }
  }

  fn translate(&mut self, dx: f32, dy: f32) {
    self.transform = self.transform * translation(dx, dy);
  }

  fn rotate(&mut self, angle: f32) {
    self.transform = self.transform * Matrix3::from_angle_z(Rad(angle));
  }

  fn set_fill(&mut self, color: Color, alpha: f32) {
    self.fill = (color, alpha.clamp(0.0, 1.0));
  }

  fn fill_circle(&mut self, x: f32, y: f32, radius: f32) {
    let (width, height) = self.image.dimensions();
    let alpha = self.fill.1;
    if width == 0 || height == 0 || alpha <= 0.0 || radius <= 0.0 {
      return;
    }
    let center = self.transform * Vector3::new(x, y, 1.0);
    let (cx, cy) = (center.x, center.y);

    let reach = radius + 1.0;
    let x0 = (cx - reach).floor().max(0.0) as u32;
    let y0 = (cy - reach).floor().max(0.0) as u32;
    let x1 = (cx + reach).ceil().min(width as f32 - 1.0);
    let y1 = (cy + reach).ceil().min(height as f32 - 1.0);
    if x1 < 0.0 || y1 < 0.0 {
      return;
    }

    for py in y0..=y1 as u32 {
      for px in x0..=x1 as u32 {
        let dx = px as f32 + 0.5 - cx;
        let dy = py as f32 + 0.5 - cy;
        // one pixel of edge falloff; sub-pixel dots still leave a faint mark
        let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0) * radius.min(1.0);
        if coverage > 0.0 {
          self.blend(px, py, alpha * coverage);
        }
      }
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
  Clear(Color),
  Save,
  Restore,
  Translate(f32, f32),
  Rotate(f32),
  SetFill(Color, f32),
  FillCircle { x: f32, y: f32, radius: f32 },
}

/// Records draw calls instead of rasterizing them.
#[derive(Clone, Debug, Default)]
pub struct RecordingSurface {
  width: u32,
  height: u32,
  pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
  pub fn new(width: u32, height: u32) -> Self {
    Self {
      width,
      height,
      commands: Vec::new(),
    }
  }

  pub fn circle_count(&self) -> usize {
    self
      .commands
      .iter()
      .filter(|c| matches!(c, DrawCommand::FillCircle { .. }))
      .count()
  }

  pub fn clear_count(&self) -> usize {
    self
      .commands
      .iter()
      .filter(|c| matches!(c, DrawCommand::Clear(_)))
      .count()
  }

  pub fn take(&mut self) -> Vec<DrawCommand> {
    std::mem::take(&mut self.commands)
  }
}

impl Surface for RecordingSurface {
  fn size(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  fn resize(&mut self, width: u32, height: u32) {
    self.width = width;
    self.height = height;
  }

  fn clear(&mut self, background: Color) {
    self.commands.push(DrawCommand::Clear(background));
  }

  fn save(&mut self) {
    self.commands.push(DrawCommand::Save);
  }

  fn restore(&mut self) {
    self.commands.push(DrawCommand::Restore);
  }

  fn translate(&mut self, dx: f32, dy: f32) {
    self.commands.push(DrawCommand::Translate(dx, dy));
  }

  fn rotate(&mut self, angle: f32) {
    self.commands.push(DrawCommand::Rotate(angle));
  }

  fn set_fill(&mut self, color: Color, alpha: f32) {
    self.commands.push(DrawCommand::SetFill(color, alpha));
  }

  fn fill_circle(&mut self, x: f32, y: f32, radius: f32) {
    self.commands.push(DrawCommand::FillCircle { x, y, radius });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::f32::consts::FRAC_PI_2;

  const WHITE: Color = Color::rgb(255, 255, 255);
  const BLACK: Color = Color::rgb(0, 0, 0);

  #[test]
  fn clear_paints_background() {
    let mut raster = Raster::new(4, 3);
    raster.clear(Color::rgb(10, 20, 30));
    assert!(raster.image().pixels().all(|p| *p == Rgba([10, 20, 30, 255])));
  }

  #[test]
  fn circle_lands_under_translation() {
    let mut raster = Raster::new(21, 21);
    raster.clear(BLACK);
    raster.translate(10.5, 10.5);
    raster.set_fill(WHITE, 1.0);
    raster.fill_circle(0.0, 0.0, 3.0);
    assert_eq!(raster.image().get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    assert_eq!(raster.image().get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
  }

  #[test]
  fn rotation_turns_offsets() {
    let mut raster = Raster::new(21, 21);
    raster.clear(BLACK);
    raster.translate(10.5, 10.5);
    raster.rotate(FRAC_PI_2);
    raster.set_fill(WHITE, 1.0);
    // +x rotated a quarter turn lands on +y
    raster.fill_circle(6.0, 0.0, 1.5);
    assert_eq!(raster.image().get_pixel(10, 16)[0], 255);
    assert_eq!(raster.image().get_pixel(16, 10)[0], 0);
  }

  #[test]
  fn save_restore_round_trips_transform() {
    let mut raster = Raster::new(10, 10);
    raster.clear(BLACK);
    raster.save();
    raster.translate(100.0, 100.0);
    raster.restore();
    raster.set_fill(WHITE, 1.0);
    raster.fill_circle(2.5, 2.5, 1.0);
    assert_eq!(raster.image().get_pixel(2, 2)[0], 255);
  }

  #[test]
  fn partial_alpha_blends() {
    let mut raster = Raster::new(5, 5);
    raster.clear(BLACK);
    raster.set_fill(Color::rgb(200, 200, 200), 0.5);
    raster.fill_circle(2.5, 2.5, 2.0);
    assert_eq!(raster.image().get_pixel(2, 2)[0], 100);
  }

  #[test]
  fn offscreen_circles_are_ignored() {
    let mut raster = Raster::new(5, 5);
    raster.clear(BLACK);
    raster.set_fill(WHITE, 1.0);
    raster.fill_circle(-50.0, -50.0, 2.0);
    raster.fill_circle(500.0, 2.0, 2.0);
    assert!(raster.image().pixels().all(|p| p[0] == 0));
  }

  #[test]
  fn recorder_counts_commands() {
    let mut surface = RecordingSurface::new(8, 8);
    surface.clear(BLACK);
    surface.fill_circle(1.0, 1.0, 1.0);
    surface.fill_circle(2.0, 2.0, 1.0);
    assert_eq!(surface.circle_count(), 2);
    assert_eq!(surface.clear_count(), 1);
    assert_eq!(surface.take().len(), 3);
    assert!(surface.commands.is_empty());
  }

  #[test]
  fn png_export_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.png");
    let mut raster = Raster::new(8, 8);
    raster.clear(WHITE);
    raster.save_png(&path).unwrap();
    assert!(path.exists());
  }
}
