//! Engine handle and the host that owns its drawing surface.

use crate::error::EngineError;
use crate::initialize::create_stars;
use crate::paths::FlowingLines;
use crate::random::{SeededRandom, UnitRandom};
use crate::render::Renderer;
use crate::surface::Surface;
use crate::theme::{Theme, ThemeHandle};
use crate::timeline::{Phase, Tick, Timeline};
use crate::{EngineParams, Star};
use log::{debug, info};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// How long the spiral layer takes to fade out once it completes.
const SPIRAL_FADE_OUT: Duration = Duration::from_millis(2000);

pub type Callback = Rc<dyn Fn()>;

/// Optional one-shot notifications. Each fires at most once per engine.
#[derive(Clone, Default)]
pub struct Callbacks {
  pub on_near_end: Option<Callback>,
  pub on_complete: Option<Callback>,
}

impl Callbacks {
  pub fn on_near_end(mut self, f: impl Fn() + 'static) -> Self {
    self.on_near_end = Some(Rc::new(f));
    self
  }

  pub fn on_complete(mut self, f: impl Fn() + 'static) -> Self {
    self.on_complete = Some(Rc::new(f));
    self
  }
}

impl fmt::Debug for Callbacks {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callbacks")
      .field("on_near_end", &self.on_near_end.is_some())
      .field("on_complete", &self.on_complete.is_some())
      .finish()
  }
}

/// Construction failure. Hands the surface back so the caller keeps ownership.
pub struct Rejected<S> {
  pub surface: S,
  pub error: EngineError,
}

impl<S> fmt::Debug for Rejected<S> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Rejected").field("error", &self.error).finish()
  }
}

/// One run of the spiral animation. Owns its surface and timeline exclusively.
pub struct SpiralEngine<S: Surface> {
  surface: S,
  renderer: Renderer,
  timeline: Timeline,
  theme: ThemeHandle,
  callbacks: Callbacks,
}

impl<S: Surface> SpiralEngine<S> {
  /// Builds an engine whose stars come from the seeded stream for `params.stars.seed`.
  pub fn new(
    surface: S,
    params: EngineParams,
    theme: ThemeHandle,
    callbacks: Callbacks,
    start: Instant,
  ) -> Result<Self, Rejected<S>> {
    let mut rng = SeededRandom::new(params.stars.seed);
    Self::with_random(surface, params, theme, callbacks, start, &mut rng)
  }

  /// Like `new`, but draws star attributes from `rng`.
  pub fn with_random<R: UnitRandom>(
    surface: S,
    params: EngineParams,
    theme: ThemeHandle,
    callbacks: Callbacks,
    start: Instant,
    rng: &mut R,
  ) -> Result<Self, Rejected<S>> {
    let (width, height) = surface.size();
    if width == 0 || height == 0 {
      return Err(Rejected {
        surface,
        error: EngineError::EmptySurface { width, height },
      });
    }
    let timeline = match Timeline::new(&params.timeline, start) {
      Ok(timeline) => timeline,
      Err(error) => return Err(Rejected { surface, error }),
    };

    let stars: Rc<[Star]> = create_stars(rng, &params.stars, &params.camera).into();
    debug!(
      "spiral engine: {} stars on {width}x{height}, seed {}",
      stars.len(),
      params.stars.seed
    );

    Ok(Self {
      surface,
      renderer: Renderer::new(params, stars),
      timeline,
      theme,
      callbacks,
    })
  }

  /// Advances to `now` and draws one frame. Does nothing once completed or destroyed.
  pub fn tick(&mut self, now: Instant) -> Option<Tick> {
    let tick = self.timeline.advance(now)?;

    if tick.near_end {
      info!("spiral engine: near end at t={:.3}", tick.time);
      if let Some(callback) = self.callbacks.on_near_end.take() {
        callback();
      }
    }

    self.renderer.render(&mut self.surface, tick.time, self.theme.get());

    if tick.completed {
      info!("spiral engine: complete");
      if let Some(callback) = self.callbacks.on_complete.take() {
        callback();
      }
    }
    Some(tick)
  }

  /// Redraws the final frame of a completed run with its opacity scaled by
  /// `fade`. Does nothing while running or after teardown.
  pub fn redraw_faded(&mut self, fade: f32) {
    if self.timeline.phase() == Phase::Completed {
      let theme = self.theme.get();
      self
        .renderer
        .render_faded(&mut self.surface, self.timeline.time(), theme, fade);
    }
  }

  /// Stops the timeline and drops the callbacks. Safe to call repeatedly.
  pub fn destroy(&mut self) {
    if self.timeline.cancel() {
      debug!("spiral engine: destroyed at t={:.3}", self.timeline.time());
    }
    self.callbacks = Callbacks::default();
  }

  /// Tears the engine down and returns its surface.
  pub fn into_surface(mut self) -> S {
    self.destroy();
    self.surface
  }

  pub fn update_colors(&self, theme: Theme) {
    self.theme.set(theme);
  }

  pub fn theme_handle(&self) -> ThemeHandle {
    self.theme.clone()
  }

  pub fn time(&self) -> f32 {
    self.timeline.time()
  }

  pub fn phase(&self) -> Phase {
    self.timeline.phase()
  }

  pub fn is_running(&self) -> bool {
    self.timeline.is_running()
  }

  pub fn stars(&self) -> &Rc<[Star]> {
    self.renderer.stars()
  }

  pub fn surface(&self) -> &S {
    &self.surface
  }

  pub fn surface_mut(&mut self) -> &mut S {
    &mut self.surface
  }
}

enum Slot<S: Surface> {
  /// Surface too small to animate; waiting for a resize.
  Idle(S),
  Active(SpiralEngine<S>),
  Released,
}

/// Host for the spiral: owns the surface across engine restarts and layers
/// the flowing lines over it.
pub struct Background<S: Surface> {
  slot: Slot<S>,
  params: EngineParams,
  theme: ThemeHandle,
  callbacks: Callbacks,
  completed_at: Option<Instant>,
  lines: FlowingLines,
  mounted_at: Instant,
}

impl<S: Surface> Background<S> {
  pub fn mount(surface: S, params: EngineParams, theme: Theme, callbacks: Callbacks, now: Instant) -> Self {
    let mut background = Self {
      slot: Slot::Released,
      params,
      theme: ThemeHandle::new(theme),
      callbacks,
      completed_at: None,
      lines: FlowingLines::new(),
      mounted_at: now,
    };
    background.slot = background.start(surface, now);
    background
  }

  fn start(&self, surface: S, now: Instant) -> Slot<S> {
    let callbacks = self.callbacks.clone();
    match SpiralEngine::new(surface, self.params, self.theme.clone(), callbacks, now) {
      Ok(engine) => Slot::Active(engine),
      Err(Rejected { surface, error }) => {
        debug!("background: spiral not started: {error}");
        Slot::Idle(surface)
      }
    }
  }

  /// Restarts the spiral from scratch at the new size. The running engine is
  /// destroyed before the surface is handed to its replacement.
  pub fn resize(&mut self, width: u32, height: u32, now: Instant) {
    let mut surface = match std::mem::replace(&mut self.slot, Slot::Released) {
      Slot::Active(engine) => engine.into_surface(),
      Slot::Idle(surface) => surface,
      Slot::Released => return,
    };
    debug!("background: resize to {width}x{height}");
    surface.resize(width, height);
    self.completed_at = None;
    self.slot = self.start(surface, now);
  }

  /// Draws one frame: the spiral while it runs (then fading out), the
  /// flowing lines on top.
  pub fn frame(&mut self, now: Instant) {
    let theme = self.theme.get();
    let elapsed = now.saturating_duration_since(self.mounted_at);
    let surface = match &mut self.slot {
      Slot::Active(engine) => {
        match engine.tick(now) {
          Some(tick) => {
            if tick.completed {
              self.completed_at = Some(now);
            }
          }
          None => {
            let fade = self
              .completed_at
              .map_or(0.0, |at| spiral_fade(now.saturating_duration_since(at)));
            if fade > 0.0 {
              engine.redraw_faded(fade);
            } else {
              engine.surface_mut().clear(theme.background);
            }
          }
        }
        engine.surface_mut()
      }
      Slot::Idle(_) | Slot::Released => return,
    };
    self.lines.draw(surface, elapsed, theme);
  }

  pub fn update_theme(&self, theme: Theme) {
    self.theme.set(theme);
  }

  pub fn theme_handle(&self) -> ThemeHandle {
    self.theme.clone()
  }

  pub fn spiral_done(&self) -> bool {
    self.completed_at.is_some()
  }

  pub fn engine(&self) -> Option<&SpiralEngine<S>> {
    match &self.slot {
      Slot::Active(engine) => Some(engine),
      _ => None,
    }
  }

  pub fn surface(&self) -> Option<&S> {
    match &self.slot {
      Slot::Active(engine) => Some(engine.surface()),
      Slot::Idle(surface) => Some(surface),
      Slot::Released => None,
    }
  }

  /// Releases the engine and returns the surface. Later calls return `None`.
  pub fn unmount(&mut self) -> Option<S> {
    match std::mem::replace(&mut self.slot, Slot::Released) {
      Slot::Active(engine) => Some(engine.into_surface()),
      Slot::Idle(surface) => Some(surface),
      Slot::Released => None,
    }
  }
}

/// Remaining spiral opacity `elapsed` after completion, eased out to zero.
fn spiral_fade(elapsed: Duration) -> f32 {
  let t = (elapsed.as_secs_f32() / SPIRAL_FADE_OUT.as_secs_f32()).clamp(0.0, 1.0);
  (1.0 - t) * (1.0 - t)
}
