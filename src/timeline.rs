//! One-shot animation timeline driven by host-provided ticks.
//!
//! `time` is recomputed from the wall clock on every tick rather than
//! accumulated, so dropped frames never slow the animation down.

use crate::error::EngineError;
use crate::TimelineParams;
use std::time::{Duration, Instant};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
  Running,
  Completed,
  /// Torn down before completion. Terminal.
  Cancelled,
}

/// What a single tick produced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tick {
  pub time: f32,
  /// The near-end threshold was crossed on this tick.
  pub near_end: bool,
  /// The timeline reached `time = 1` on this tick.
  pub completed: bool,
}

#[derive(Clone, Debug)]
pub struct Timeline {
  start: Instant,
  duration: Duration,
  near_end: f32,
  time: f32,
  phase: Phase,
  near_end_fired: bool,
}

impl Timeline {
  pub fn new(params: &TimelineParams, start: Instant) -> Result<Self, EngineError> {
    if params.duration.is_zero() {
      return Err(EngineError::ZeroDuration);
    }
    Ok(Self {
      start,
      duration: params.duration,
      near_end: params.near_end,
      time: 0.0,
      phase: Phase::Running,
      near_end_fired: false,
    })
  }

  pub fn time(&self) -> f32 {
    self.time
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn is_running(&self) -> bool {
    self.phase == Phase::Running
  }

  /// Recomputes `time` for `now`. Returns `None` once the timeline is no longer
  /// running; a completed or cancelled timeline never ticks again.
  pub fn advance(&mut self, now: Instant) -> Option<Tick> {
    if self.phase != Phase::Running {
      return None;
    }
    let elapsed = now.saturating_duration_since(self.start);
    let ratio = elapsed.as_secs_f64() / self.duration.as_secs_f64();
    // never step backwards even if the host clock does
    self.time = self.time.max((ratio.clamp(0.0, 1.0)) as f32);

    let near_end = !self.near_end_fired && self.time >= self.near_end;
    if near_end {
      self.near_end_fired = true;
    }
    let completed = self.time >= 1.0;
    if completed {
      self.phase = Phase::Completed;
    }

    Some(Tick {
      time: self.time,
      near_end,
      completed,
    })
  }

  /// Stops the timeline. Returns `true` only on the call that actually stopped it.
  pub fn cancel(&mut self) -> bool {
    if self.phase == Phase::Running {
      self.phase = Phase::Cancelled;
      true
    } else {
      false
    }
  }
}
