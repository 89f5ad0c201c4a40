use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use log::info;
use rand::Rng;
use spiral_bg::initialize::create_stars;
use spiral_bg::random::SeededRandom;
use spiral_bg::{Background, Callbacks, Color, EngineParams, Raster, Star, Theme};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Spiral burst background renderer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
  /// Surface width in pixels
  #[arg(long, default_value_t = 960)]
  width: u32,
  /// Surface height in pixels
  #[arg(long, default_value_t = 540)]
  height: u32,
  /// Number of stars
  #[arg(short, long)]
  stars: Option<u32>,
  /// Seed for the star stream
  #[arg(long, conflicts_with = "random_seed")]
  seed: Option<u64>,
  /// Pick a random seed instead of the default
  #[arg(long, default_value_t = false)]
  random_seed: bool,
  /// Spiral duration in seconds
  #[arg(long, default_value_t = 15.0)]
  duration: f32,
  /// Background color (#rrggbb)
  #[arg(long, default_value = "#0a0a0a")]
  background: String,
  /// Foreground color (#rrggbb)
  #[arg(long, default_value = "#fafafa")]
  foreground: String,
  /// Spiral layer opacity
  #[arg(long, default_value_t = 0.4)]
  opacity: f32,
  /// Frames per second
  #[arg(long, default_value_t = 30)]
  fps: u32,
  /// Directory for PNG frames
  #[arg(short, long)]
  out: Option<PathBuf>,
  /// Write every Nth frame
  #[arg(long, default_value_t = 15)]
  every: u32,
  /// Seconds to keep drawing the lines after the spiral completes
  #[arg(long, default_value_t = 3.0)]
  linger: f32,
  /// Tick against the wall clock instead of a simulated one
  #[arg(long, default_value_t = false)]
  headless: bool,
  /// Write the raw star records to this file and exit
  #[arg(long)]
  dump_stars: Option<PathBuf>,
  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Generate shell completion scripts
  Completions {
    /// The shell to generate the script for
    #[arg(value_enum)]
    shell: Shell,
  },
}

impl Args {
  fn params(&self) -> anyhow::Result<EngineParams> {
    anyhow::ensure!(self.duration > 0.0, "--duration must be positive");
    anyhow::ensure!(self.width > 0 && self.height > 0, "surface must have a non-zero size");
    let mut params = EngineParams::default();
    if let Some(count) = self.stars {
      params.stars.count = count;
    }
    if let Some(seed) = self.seed {
      params.stars.seed = seed;
    } else if self.random_seed {
      params.stars.seed = rand::thread_rng().gen_range(1..233_280);
    }
    params.timeline.duration = Duration::try_from_secs_f32(self.duration).context("--duration")?;
    params.render.opacity = self.opacity.clamp(0.0, 1.0);
    Ok(params)
  }

  fn theme(&self) -> anyhow::Result<Theme> {
    Ok(Theme {
      background: Color::from_hex(&self.background).context("--background")?,
      foreground: Color::from_hex(&self.foreground).context("--foreground")?,
    })
  }

  fn linger(&self) -> anyhow::Result<Duration> {
    Duration::try_from_secs_f32(self.linger.max(0.0)).context("--linger")
  }

  fn frame_interval(&self) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
  }
}

fn main() -> anyhow::Result<()> {
  env_logger::init();
  let args = Args::parse();

  if let Some(Commands::Completions { shell }) = &args.command {
    let mut cmd = Args::command();
    let name = cmd.get_name().to_string();
    generate(*shell, &mut cmd, name, &mut io::stdout());
    return Ok(());
  }

  let params = args.params()?;
  let theme = args.theme()?;
  let until = params.timeline.duration.saturating_add(args.linger()?);
  info!("seed {}, {} stars", params.stars.seed, params.stars.count);

  if let Some(path) = &args.dump_stars {
    return dump_stars(path, &params);
  }
  if let Some(out) = &args.out {
    std::fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
  }

  let callbacks = Callbacks::default()
    .on_near_end(|| info!("spiral nearly done, lines take over"))
    .on_complete(|| info!("spiral complete"));

  if args.headless {
    run_realtime(&args, params, theme, callbacks, until)
  } else {
    run_offline(&args, params, theme, callbacks, until)
  }
}

fn dump_stars(path: &Path, params: &EngineParams) -> anyhow::Result<()> {
  let mut rng = SeededRandom::new(params.stars.seed);
  let stars = create_stars(&mut rng, &params.stars, &params.camera);
  std::fs::write(path, bytemuck::cast_slice::<Star, u8>(&stars))
    .with_context(|| format!("writing {}", path.display()))?;
  info!("wrote {} stars to {}", stars.len(), path.display());
  Ok(())
}

fn save_frame(background: &Background<Raster>, out: &Path, frame: u64) -> anyhow::Result<()> {
  if let Some(raster) = background.surface() {
    raster.save_png(&out.join(format!("frame_{frame:05}.png")))?;
  }
  Ok(())
}

fn finished(background: &Background<Raster>, elapsed: Duration, until: Duration) -> bool {
  background.spiral_done() && elapsed >= until
}

/// Steps a simulated clock at the frame rate, so output does not depend on
/// how fast frames render.
fn run_offline(
  args: &Args,
  params: EngineParams,
  theme: Theme,
  callbacks: Callbacks,
  until: Duration,
) -> anyhow::Result<()> {
  let start = Instant::now();
  let interval = args.frame_interval();
  let surface = Raster::new(args.width, args.height);
  let mut background = Background::mount(surface, params, theme, callbacks, start);

  let mut frame: u64 = 0;
  loop {
    let elapsed = interval * frame as u32;
    background.frame(start + elapsed);
    if let Some(out) = &args.out {
      if frame % u64::from(args.every.max(1)) == 0 {
        save_frame(&background, out, frame)?;
      }
    }
    if finished(&background, elapsed, until) {
      break;
    }
    frame += 1;
  }
  info!("rendered {} frames", frame + 1);
  background.unmount();
  Ok(())
}

fn run_realtime(
  args: &Args,
  params: EngineParams,
  theme: Theme,
  callbacks: Callbacks,
  until: Duration,
) -> anyhow::Result<()> {
  let stop = Arc::new(AtomicBool::new(false));
  {
    let stop = stop.clone();
    ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst)).context("installing Ctrl-C handler")?;
  }

  let start = Instant::now();
  let interval = args.frame_interval();
  let surface = Raster::new(args.width, args.height);
  let mut background = Background::mount(surface, params, theme, callbacks, start);

  let mut frame: u64 = 0;
  loop {
    if stop.load(Ordering::SeqCst) {
      info!("interrupted, tearing down");
      break;
    }
    let now = Instant::now();
    background.frame(now);
    if let Some(out) = &args.out {
      if frame % u64::from(args.every.max(1)) == 0 {
        save_frame(&background, out, frame)?;
      }
    }
    if finished(&background, now - start, until) {
      break;
    }
    frame += 1;
    std::thread::sleep(interval.saturating_sub(now.elapsed()));
  }
  background.unmount();
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn args(extra: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("spiral-bg").chain(extra.iter().copied())).unwrap()
  }

  #[test]
  fn defaults_build_params() {
    let args = args(&[]);
    let params = args.params().unwrap();
    assert_eq!(params.timeline.duration, Duration::from_secs(15));
    assert!((params.render.opacity - 0.4).abs() < 1e-6);
    assert_eq!(args.linger().unwrap(), Duration::from_secs(3));
  }

  #[test]
  fn unbounded_durations_are_errors() {
    assert!(args(&["--duration", "inf"]).params().is_err());
    assert!(args(&["--duration", "NaN"]).params().is_err());
    assert!(args(&["--duration", "0"]).params().is_err());
    assert!(args(&["--linger", "inf"]).linger().is_err());
    assert_eq!(args(&["--linger=-2"]).linger().unwrap(), Duration::ZERO);
  }

  #[test]
  fn huge_seed_is_accepted() {
    let params = args(&["--seed", "18446744073709551615"]).params().unwrap();
    assert_eq!(params.stars.seed, u64::MAX);
  }
}
