//! Shortsmith Render Engine
//!
//! Drives one Short from source recording to rendered file, and owns the
//! ffmpeg side of the pipeline.
//!
//! # Pipeline Architecture
//!
//! ```text
//! clip.mp4 ── probe + trim ── first frame ── face zone ──┐
//!                                                        ├── LayoutSelector
//! assets/ ── background, fonts ── title + caption ───────┘        │
//!                                                                 ▼
//!                                                         CompositionPlan
//!                                                                 │
//! assets/fin_de_short.mp4 ─────────────── outro ──────────────────┤
//!                                                                 ▼
//!                                                    filter_complex (ffmpeg)
//!                                                                 │
//!                                                                 ▼
//!                                                    output.mp4 (1080x1920, 30 fps)
//! ```

pub mod assembler;
pub mod compositor;
pub mod export;
pub mod media;
pub mod overlays;
pub mod sequence;
pub mod source;

pub use assembler::{plan_report_path, process_clip_async, ClipAssembler};
pub use export::{FfmpegBackend, ProgressCallback, RenderBackend, RenderProgress, RenderStage};
pub use media::{command_exists, FfmpegMedia, FrameReader, MediaInfo, MediaProbe};
pub use sequence::{OutroSegment, RenderSequence};
pub use source::SourceClip;
