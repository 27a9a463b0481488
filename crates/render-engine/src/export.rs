//! Render backends and progress reporting.

use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};

use shortsmith_common::error::{ShortsmithError, ShortsmithResult};
use shortsmith_project_model::config::{AudioCodec, EncoderProfile, VideoCodec};

use crate::compositor::{compile, CompiledGraph, AUDIO_OUT, VIDEO_OUT};
use crate::media::command_exists;
use crate::sequence::RenderSequence;

/// Progress callback for rendering.
pub type ProgressCallback = dyn Fn(RenderProgress) + Send + Sync;

/// Render progress report.
#[derive(Debug, Clone)]
pub struct RenderProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames rendered so far.
    pub frames_rendered: u64,

    /// Total frames to render.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: RenderStage,
}

/// Stages of a render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    Failed,
}

impl RenderProgress {
    fn at_stage(stage: RenderStage, progress: f64, total_frames: u64) -> Self {
        Self {
            progress,
            frames_rendered: (progress * total_frames as f64).round() as u64,
            total_frames,
            eta_secs: 0.0,
            stage,
        }
    }
}

/// Trait for render backends.
pub trait RenderBackend: Send + Sync {
    /// Render `sequence` into `output`.
    fn render(
        &self,
        sequence: &RenderSequence,
        output: &Path,
        progress: Option<&ProgressCallback>,
    ) -> ShortsmithResult<()>;

    /// Check if this backend is available on the system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Renders through a single ffmpeg process.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend;

impl FfmpegBackend {
    pub fn new() -> Self {
        Self
    }

    fn run_ffmpeg(
        &self,
        args: &[String],
        sequence: &RenderSequence,
        progress: Option<&ProgressCallback>,
    ) -> ShortsmithResult<()> {
        let total_frames = sequence.total_frames();
        let expected_duration_secs = sequence.total_duration_secs();

        tracing::debug!(args = ?args, "Running ffmpeg");
        let mut cmd = Command::new("ffmpeg");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let start = std::time::Instant::now();
        let mut child = cmd
            .spawn()
            .map_err(|e| ShortsmithError::render(format!("Failed to start ffmpeg: {e}")))?;

        tracing::info!(pid = child.id(), total_frames, "ffmpeg process started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ShortsmithError::render("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ShortsmithError::render("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently so ffmpeg never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        let mut state = ProgressState::default();
        loop {
            line.clear();
            let bytes = reader.read_line(&mut line).map_err(|e| {
                ShortsmithError::render(format!("Failed reading ffmpeg progress: {e}"))
            })?;
            if bytes == 0 {
                break;
            }

            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            state.update(key, value);
            if key == "progress" {
                if let Some(cb) = progress {
                    cb(progress_report(
                        &state,
                        total_frames,
                        expected_duration_secs,
                        start.elapsed().as_secs_f64(),
                    ));
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| ShortsmithError::render(format!("Failed to wait on ffmpeg: {e}")))?;
        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            if let Some(cb) = progress {
                cb(RenderProgress::at_stage(RenderStage::Failed, 0.0, total_frames));
            }
            return Err(ShortsmithError::render(format!(
                "ffmpeg render failed (status {status}): {}",
                stderr_output.trim()
            )));
        }

        if let Some(cb) = progress {
            cb(RenderProgress::at_stage(RenderStage::Complete, 1.0, total_frames));
        }
        Ok(())
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(
        &self,
        sequence: &RenderSequence,
        output: &Path,
        progress: Option<&ProgressCallback>,
    ) -> ShortsmithResult<()> {
        let started = std::time::Instant::now();
        if let Some(cb) = progress {
            cb(RenderProgress::at_stage(
                RenderStage::Preparing,
                0.0,
                sequence.total_frames(),
            ));
        }

        let workspace = tempfile::Builder::new()
            .prefix("shortsmith-render-")
            .tempdir()?;
        let graph = compile(sequence, workspace.path());
        for file in &graph.text_files {
            std::fs::write(&file.path, &file.contents)?;
        }

        let args = ffmpeg_args(&graph, &sequence.encoder, output);
        tracing::info!(
            output = %output.display(),
            inputs = graph.inputs.len(),
            filter_len = graph.filter_complex.len(),
            duration_secs = sequence.total_duration_secs(),
            "Render plan compiled"
        );

        self.run_ffmpeg(&args, sequence, progress)?;
        tracing::info!(
            elapsed_secs = started.elapsed().as_secs_f64(),
            output = %output.display(),
            "Render finished"
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Full ffmpeg argument list for a compiled graph.
pub fn ffmpeg_args(graph: &CompiledGraph, encoder: &EncoderProfile, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-hide_banner", "-nostats", "-progress", "pipe:1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    args.extend(graph.input_args());
    args.extend([
        "-filter_complex".to_string(),
        graph.filter_complex.clone(),
        "-map".to_string(),
        format!("[{VIDEO_OUT}]"),
        "-map".to_string(),
        format!("[{AUDIO_OUT}]"),
    ]);
    args.extend(codec_args(encoder));
    args.push(output.display().to_string());
    args
}

fn codec_args(encoder: &EncoderProfile) -> Vec<String> {
    let mut args = match encoder.video_codec {
        VideoCodec::H264 => vec![
            "-c:v".to_string(),
            "libx264".to_string(),
            "-profile:v".to_string(),
            "high".to_string(),
        ],
        VideoCodec::H265 => vec![
            "-c:v".to_string(),
            "libx265".to_string(),
            "-tag:v".to_string(),
            "hvc1".to_string(),
        ],
    };
    args.extend([
        "-preset".to_string(),
        encoder.preset.clone(),
        "-crf".to_string(),
        encoder.crf.to_string(),
        "-pix_fmt".to_string(),
        encoder.pixel_format.clone(),
        "-r".to_string(),
        encoder.fps.to_string(),
    ]);

    match encoder.audio_codec {
        AudioCodec::Aac => args.extend(["-c:a".to_string(), "aac".to_string()]),
    }
    args.extend([
        "-b:a".to_string(),
        format!("{}k", encoder.audio_bitrate_kbps.max(64)),
        "-ar".to_string(),
        encoder.audio_sample_rate.to_string(),
        "-movflags".to_string(),
        "+faststart".to_string(),
    ]);
    args
}

#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    complete: bool,
}

impl ProgressState {
    fn update(&mut self, key: &str, value: &str) {
        match key {
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }
}

fn progress_report(
    state: &ProgressState,
    total_frames: u64,
    expected_duration_secs: f64,
    elapsed_secs: f64,
) -> RenderProgress {
    let progress = if expected_duration_secs <= 0.0 {
        0.0
    } else {
        (state.out_time_secs / expected_duration_secs).clamp(0.0, 1.0)
    };

    let frames_rendered = (progress * total_frames as f64).round() as u64;
    let eta_secs = if progress > 0.0 {
        (elapsed_secs / progress) - elapsed_secs
    } else {
        0.0
    }
    .max(0.0);

    RenderProgress {
        progress: if state.complete { 1.0 } else { progress },
        frames_rendered,
        total_frames,
        eta_secs,
        stage: if state.complete {
            RenderStage::Finalizing
        } else {
            RenderStage::Rendering
        },
    }
}
