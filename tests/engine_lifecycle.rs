use spiral_bg::initialize::create_stars;
use spiral_bg::random::{SeededRandom, UnitRandom};
use spiral_bg::timeline::Phase;
use spiral_bg::{
  Background, Callbacks, EngineParams, RecordingSurface, SpiralEngine, StarParams, Surface, Theme,
  ThemeHandle,
};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

struct Constant(f32);

impl UnitRandom for Constant {
  fn next_unit(&mut self) -> f32 {
    self.0
  }
}

#[derive(Clone, Default)]
struct Counts {
  near_end: Rc<Cell<u32>>,
  complete: Rc<Cell<u32>>,
}

impl Counts {
  fn callbacks(&self) -> Callbacks {
    let near_end = self.near_end.clone();
    let complete = self.complete.clone();
    Callbacks::default()
      .on_near_end(move || near_end.set(near_end.get() + 1))
      .on_complete(move || complete.set(complete.get() + 1))
  }

  fn get(&self) -> (u32, u32) {
    (self.near_end.get(), self.complete.get())
  }
}

fn params(count: u32) -> EngineParams {
  EngineParams {
    stars: StarParams {
      count,
      ..Default::default()
    },
    ..Default::default()
  }
}

fn engine(counts: &Counts, start: Instant) -> SpiralEngine<RecordingSurface> {
  SpiralEngine::new(
    RecordingSurface::new(320, 240),
    params(200),
    ThemeHandle::new(Theme::DARK),
    counts.callbacks(),
    start,
  )
  .unwrap()
}

#[test]
fn same_seed_builds_identical_star_sets() {
  let p = params(5000);
  let a = create_stars(&mut SeededRandom::new(1234), &p.stars, &p.camera);
  let b = create_stars(&mut SeededRandom::new(1234), &p.stars, &p.camera);
  assert_eq!(a, b);
  assert_eq!(bytemuck::cast_slice::<_, u8>(&a[..]), bytemuck::cast_slice::<_, u8>(&b[..]));

  let c = create_stars(&mut SeededRandom::new(4321), &p.stars, &p.camera);
  assert_ne!(a, c);
}

#[test]
fn constant_draws_give_closed_form_spiral_location() {
  let engine = SpiralEngine::with_random(
    RecordingSurface::new(320, 240),
    params(3),
    ThemeHandle::new(Theme::DARK),
    Callbacks::default(),
    Instant::now(),
    &mut Constant(0.5),
  )
  .unwrap();
  let stars = engine.stars();
  assert_eq!(stars.len(), 3);
  let expected = (1.0 - (1.0f32 - 0.5).powi(3)) / 1.3;
  for star in stars.iter() {
    assert!((star.spiral_location - expected).abs() < 1e-6);
  }
  assert!(stars.iter().all(|star| star == &stars[0]));
}

#[test]
fn seeded_construction_matches_explicit_stream() {
  let p = params(100);
  let engine = SpiralEngine::new(
    RecordingSurface::new(320, 240),
    p,
    ThemeHandle::new(Theme::DARK),
    Callbacks::default(),
    Instant::now(),
  )
  .unwrap();
  let expected = create_stars(&mut SeededRandom::new(p.stars.seed), &p.stars, &p.camera);
  assert_eq!(&engine.stars()[..], &expected[..]);
}

#[test]
fn near_end_then_complete_each_fire_once() {
  let start = Instant::now();
  let counts = Counts::default();
  let mut engine = engine(&counts, start);

  for ms in (0..14_000).step_by(250) {
    engine.tick(start + Duration::from_millis(ms));
  }
  assert_eq!(counts.get(), (0, 0));

  engine.tick(start + Duration::from_millis(14_000));
  assert_eq!(counts.get(), (1, 0));

  for ms in (14_100..15_000).step_by(100) {
    engine.tick(start + Duration::from_millis(ms));
  }
  assert_eq!(counts.get(), (1, 0));

  engine.tick(start + Duration::from_millis(15_000));
  assert_eq!(counts.get(), (1, 1));
  assert_eq!(engine.phase(), Phase::Completed);

  engine.tick(start + Duration::from_millis(16_000));
  engine.tick(start + Duration::from_millis(30_000));
  assert_eq!(counts.get(), (1, 1));
}

#[test]
fn destroy_right_after_start_fires_nothing() {
  let start = Instant::now();
  let counts = Counts::default();
  let mut engine = engine(&counts, start);
  engine.destroy();
  for secs in [1, 14, 15, 60] {
    assert!(engine.tick(start + Duration::from_secs(secs)).is_none());
  }
  assert_eq!(counts.get(), (0, 0));
  assert!(engine.surface().commands.is_empty());
}

#[test]
fn destroy_mid_run_stops_drawing_and_callbacks() {
  let start = Instant::now();
  let counts = Counts::default();
  let mut engine = engine(&counts, start);
  engine.tick(start + Duration::from_secs(5));
  engine.tick(start + Duration::from_secs(10));
  let drawn = engine.surface().commands.len();
  assert!(drawn > 0);

  engine.destroy();
  engine.destroy();
  engine.tick(start + Duration::from_secs(14));
  engine.tick(start + Duration::from_secs(15));
  assert_eq!(engine.surface().commands.len(), drawn);
  assert_eq!(counts.get(), (0, 0));
  assert_eq!(engine.phase(), Phase::Cancelled);
}

#[test]
fn resize_restarts_with_a_fresh_star_set() {
  let start = Instant::now();
  let counts = Counts::default();
  let mut background = Background::mount(
    RecordingSurface::new(320, 240),
    params(300),
    Theme::DARK,
    counts.callbacks(),
    start,
  );
  background.frame(start + Duration::from_secs(6));
  let before = background.engine().unwrap().stars().clone();
  assert!(background.engine().unwrap().time() > 0.0);

  let resized_at = start + Duration::from_secs(7);
  background.resize(640, 480, resized_at);

  let engine = background.engine().unwrap();
  let after = engine.stars();
  assert_eq!(after.len(), 300);
  assert!(!Rc::ptr_eq(&before, after));
  // same seed, so the fresh set replays the same stream
  assert_eq!(&before[..], &after[..]);
  assert_eq!(engine.time(), 0.0);
  assert_eq!(background.surface().unwrap().size(), (640, 480));

  // the new run owns the callbacks and completes on its own schedule
  background.frame(resized_at + Duration::from_secs(14));
  assert_eq!(counts.get(), (1, 0));
  background.frame(resized_at + Duration::from_secs(15));
  assert_eq!(counts.get(), (1, 1));
}

#[test]
fn theme_change_mid_run_keeps_timeline() {
  let start = Instant::now();
  let counts = Counts::default();
  let mut background = Background::mount(
    RecordingSurface::new(320, 240),
    params(50),
    Theme::DARK,
    counts.callbacks(),
    start,
  );
  background.frame(start + Duration::from_secs(3));
  let time = background.engine().unwrap().time();

  background.update_theme(Theme::LIGHT);
  assert_eq!(background.engine().unwrap().time(), time);
  assert_eq!(background.engine().unwrap().phase(), Phase::Running);

  background.frame(start + Duration::from_secs(4));
  assert!(background.engine().unwrap().time() > time);
  assert_eq!(background.theme_handle().get(), Theme::LIGHT);
}

#[test]
fn unmount_mid_run_silences_everything() {
  let start = Instant::now();
  let counts = Counts::default();
  let mut background = Background::mount(
    RecordingSurface::new(320, 240),
    params(50),
    Theme::DARK,
    counts.callbacks(),
    start,
  );
  background.frame(start + Duration::from_secs(2));
  let surface = background.unmount().unwrap();
  let drawn = surface.commands.len();

  background.frame(start + Duration::from_secs(15));
  assert!(background.unmount().is_none());
  assert_eq!(counts.get(), (0, 0));
  assert_eq!(surface.commands.len(), drawn);
}
