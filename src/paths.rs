//! Secondary layer: two mirrored families of flowing Bézier lines that take
//! over once the spiral has played.

use crate::surface::Surface;
use crate::theme::Theme;
use cgmath::{InnerSpace, Vector2};
use std::time::Duration;

const VIEW_WIDTH: f32 = 696.0;
const VIEW_HEIGHT: f32 = 316.0;
const PATHS_PER_FAMILY: usize = 36;
const DRAW_IN_SECS: f32 = 3.0;
const FADE_IN_SECS: f32 = 12.0;
const OPACITY_DELAY_SECS: f32 = 0.5;
const LENGTH_SAMPLES: usize = 64;

type Cubic = [Vector2<f32>; 4];

fn cubic_point(c: &Cubic, t: f32) -> Vector2<f32> {
  let u = 1.0 - t;
  c[0] * (u * u * u) + c[1] * (3.0 * u * u * t) + c[2] * (3.0 * u * t * t) + c[3] * (t * t * t)
}

/// Triangle wave over one loop: 0 at the ends, 1 in the middle.
fn ping_pong(u: f32) -> f32 {
  if u < 0.5 {
    2.0 * u
  } else {
    2.0 - 2.0 * u
  }
}

fn loop_phase(secs: f32, period: f32) -> f32 {
  (secs % period) / period
}

#[derive(Clone, Debug)]
pub struct LinePath {
  segments: [Cubic; 2],
  pub width: f32,
  pub stroke_opacity: f32,
  /// Loop period in seconds.
  pub period: f32,
  length: f32,
}

impl LinePath {
  /// Path `index` of the family shifted by `position` (+1 or -1).
  pub fn new(index: usize, position: f32) -> Self {
    let i = index as f32;
    let shift = i * 5.0 * position;
    let drop = i * 6.0;
    let v = Vector2::new;
    let first = [
      v(-(380.0 - shift), -(189.0 + drop)),
      v(-(380.0 - shift), -(189.0 + drop)),
      v(-(312.0 - shift), 216.0 - drop),
      v(152.0 - shift, 343.0 - drop),
    ];
    let second = [
      first[3],
      v(616.0 - shift, 470.0 - drop),
      v(684.0 - shift, 875.0 - drop),
      v(684.0 - shift, 875.0 - drop),
    ];

    let mut path = Self {
      segments: [first, second],
      width: 0.5 + i * 0.03,
      stroke_opacity: 0.08 + i * 0.005,
      period: 12.0 + ((index * 7 + 3) % PATHS_PER_FAMILY) as f32 * 1.2,
      length: 0.0,
    };
    path.length = (1..=LENGTH_SAMPLES)
      .map(|k| {
        let a = path.point((k - 1) as f32 / LENGTH_SAMPLES as f32);
        let b = path.point(k as f32 / LENGTH_SAMPLES as f32);
        (b - a).magnitude()
      })
      .sum();
    path
  }

  /// Point at `t` in `[0, 1]`; each segment covers half the range.
  pub fn point(&self, t: f32) -> Vector2<f32> {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t < 1.0 {
      cubic_point(&self.segments[0], t)
    } else {
      cubic_point(&self.segments[1], t - 1.0)
    }
  }

  /// Approximate length in view-box units.
  pub fn length(&self) -> f32 {
    self.length
  }

  /// Visible window `(from, to)` along the path `secs` after mount.
  pub fn window(&self, secs: f32) -> (f32, f32) {
    let grown = (secs / DRAW_IN_SECS).clamp(0.0, 1.0);
    let drawn = 1.0 - (1.0 - grown) * (1.0 - grown);
    let offset = ping_pong(loop_phase(secs, self.period));
    (offset, (offset + drawn).min(1.0))
  }

  /// Looping opacity multiplier; zero until the start delay has passed.
  pub fn pulse(&self, secs: f32) -> f32 {
    if secs < OPACITY_DELAY_SECS {
      return 0.0;
    }
    0.3 + 0.2 * ping_pong(loop_phase(secs - OPACITY_DELAY_SECS, self.period))
  }
}

pub struct FlowingLines {
  paths: Vec<LinePath>,
}

impl Default for FlowingLines {
  fn default() -> Self {
    Self::new()
  }
}

impl FlowingLines {
  pub fn new() -> Self {
    let paths = [1.0, -1.0]
      .into_iter()
      .flat_map(|position| (0..PATHS_PER_FAMILY).map(move |i| LinePath::new(i, position)))
      .collect();
    Self { paths }
  }

  pub fn paths(&self) -> &[LinePath] {
    &self.paths
  }

  /// Layer fade-in, eased in over the first twelve seconds.
  pub fn fade(elapsed: Duration) -> f32 {
    let t = (elapsed.as_secs_f32() / FADE_IN_SECS).clamp(0.0, 1.0);
    t * t
  }

  /// Draws every path's visible window as a run of dots, fitted to the
  /// surface with the view box centered.
  pub fn draw<S: Surface>(&self, surface: &mut S, elapsed: Duration, theme: Theme) {
    let fade = Self::fade(elapsed);
    if fade <= 0.0 {
      return;
    }
    let (width, height) = surface.size();
    let scale = (width as f32 / VIEW_WIDTH).min(height as f32 / VIEW_HEIGHT);
    if scale <= 0.0 {
      return;
    }
    let secs = elapsed.as_secs_f32();

    surface.save();
    surface.translate(
      (width as f32 - VIEW_WIDTH * scale) / 2.0,
      (height as f32 - VIEW_HEIGHT * scale) / 2.0,
    );
    for path in &self.paths {
      let alpha = path.stroke_opacity * path.pulse(secs) * fade;
      let (from, to) = path.window(secs);
      if alpha <= 0.0 || to <= from {
        continue;
      }
      surface.set_fill(theme.foreground, alpha);

      let radius = (path.width * scale / 2.0).max(0.3);
      let spacing = (radius * 2.0).max(1.5);
      let steps = ((to - from) * path.length * scale / spacing).ceil().max(1.0) as usize;
      for k in 0..=steps {
        let p = path.point(from + (to - from) * k as f32 / steps as f32) * scale;
        surface.fill_circle(p.x, p.y, radius);
      }
    }
    surface.restore();
  }
}
