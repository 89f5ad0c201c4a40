use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
  #[error("drawing surface has no area ({width}x{height})")]
  EmptySurface { width: u32, height: u32 },

  #[error("timeline duration must be non-zero")]
  ZeroDuration,

  #[error("invalid color {0:?}")]
  InvalidColor(String),

  #[error("failed to write frame {}: {source}", .path.display())]
  FrameExport {
    path: PathBuf,
    #[source]
    source: image::ImageError,
  },
}
