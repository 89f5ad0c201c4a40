pub mod camera;
pub mod error;
pub mod initialize;
pub mod paths;
pub mod random;
pub mod render;
pub mod spiral;
pub mod star;
pub mod state;
pub mod surface;
pub mod theme;
pub mod timeline;

pub use error::EngineError;
pub use state::{Background, Callback, Callbacks, Rejected, SpiralEngine};
pub use surface::{Raster, RecordingSurface, Surface};
pub use theme::{Color, Theme, ThemeHandle};

use std::time::Duration;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StarParams {
  pub count: u32,
  pub seed: u64,
  pub distance_min: f32,
  pub distance_span: f32,
  pub expansion_min: f32,
  pub expansion_span: f32,
  pub final_scale_min: f32,
  pub final_scale_span: f32,
  /// Base dot size handed to the projection, before the stroke weight factor.
  pub size: f32,
}

impl Default for StarParams {
  fn default() -> Self {
    Self {
      count: 5000,
      seed: 1234,
      distance_min: 15.0,
      distance_span: 30.0,
      expansion_min: 1.2,
      expansion_span: 0.8,
      final_scale_min: 0.7,
      final_scale_span: 0.6,
      size: 8.5,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpiralParams {
  pub turns: f32,
  pub radius: f32,
  pub gamma: f32,
  /// Progress multiplier applied before clamping, so the spiral finishes early.
  pub stretch: f32,
}

impl Default for SpiralParams {
  fn default() -> Self {
    Self {
      turns: 6.0,
      radius: 170.0,
      gamma: 1.8,
      stretch: 1.2,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CameraParams {
  pub start_depth: f32,
  pub travel_distance: f32,
  pub zoom: f32,
  pub vertical_offset: f32,
  /// Fraction of the timeline after which the dolly starts moving.
  pub dolly_start: f32,
}

impl Default for CameraParams {
  fn default() -> Self {
    Self {
      start_depth: -400.0,
      travel_distance: 3400.0,
      zoom: 100.0,
      vertical_offset: 28.0,
      dolly_start: 0.32,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TimelineParams {
  pub duration: Duration,
  pub near_end: f32,
}

impl Default for TimelineParams {
  fn default() -> Self {
    Self {
      duration: Duration::from_millis(15_000),
      near_end: 14.0 / 15.0,
    }
  }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderParams {
  pub trail_length: u32,
  pub trail_step: f32,
  pub trail_alpha: f32,
  pub star_alpha: f32,
  /// Layer opacity multiplied into every fill.
  pub opacity: f32,
  pub approach_end: f32,
  pub breakaway_end: f32,
}

impl Default for RenderParams {
  fn default() -> Self {
    Self {
      trail_length: 80,
      trail_step: 0.00015,
      trail_alpha: 0.15,
      star_alpha: 0.2,
      opacity: 0.4,
      approach_end: 0.3,
      breakaway_end: 0.7,
    }
  }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct EngineParams {
  pub stars: StarParams,
  pub spiral: SpiralParams,
  pub camera: CameraParams,
  pub timeline: TimelineParams,
  pub render: RenderParams,
}

/// One particle of the burst. Every field is fixed at creation.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Star {
  pub angle: f32,
  pub distance: f32,
  pub rotation_direction: f32,
  pub expansion_rate: f32,
  pub final_scale: f32,
  pub spiral_location: f32,
  pub z: f32,
  pub stroke_weight_factor: f32,
  pub dx: f32,
  pub dy: f32,
}
