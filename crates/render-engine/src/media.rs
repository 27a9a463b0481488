//! Media probing and frame extraction.
//!
//! [`MediaProbe`] is the seam between the pipeline and whatever decodes
//! video. The production implementation shells out to `ffprobe`/`ffmpeg`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use shortsmith_common::error::{ShortsmithError, ShortsmithResult};
use shortsmith_project_model::geometry::Size;

/// Stream facts about a media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub duration_secs: f64,
    pub has_audio: bool,
}

impl MediaInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Random access to decoded frames of one opened file.
pub trait FrameReader: Send {
    /// Decode the frame shown at `time_secs`.
    fn frame_at(&mut self, time_secs: f64) -> ShortsmithResult<RgbImage>;

    /// Release decoder resources. Called once by the owner.
    fn close(&mut self);
}

/// Decode capability used by the assembler.
pub trait MediaProbe: Send + Sync {
    /// Read stream information without decoding frames.
    fn probe(&self, path: &Path) -> ShortsmithResult<MediaInfo>;

    /// Open a frame reader for a probed file.
    fn open_frames(&self, info: &MediaInfo) -> ShortsmithResult<Box<dyn FrameReader>>;

    /// Check if this backend is usable on the system.
    fn is_available(&self) -> bool;

    fn name(&self) -> &str;
}

/// `ffprobe`/`ffmpeg` backed media access.
#[derive(Debug, Clone, Default)]
pub struct FfmpegMedia;

impl FfmpegMedia {
    pub fn new() -> Self {
        Self
    }
}

impl MediaProbe for FfmpegMedia {
    fn probe(&self, path: &Path) -> ShortsmithResult<MediaInfo> {
        if !path.exists() {
            return Err(ShortsmithError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        if !command_exists("ffprobe") {
            return Err(ShortsmithError::unsupported("ffprobe not found in PATH"));
        }

        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ShortsmithError::probe(format!("Failed to start ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(ShortsmithError::probe(format!(
                "ffprobe failed on {} ({}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_probe_output(path, &output.stdout)
    }

    fn open_frames(&self, info: &MediaInfo) -> ShortsmithResult<Box<dyn FrameReader>> {
        if !command_exists("ffmpeg") {
            return Err(ShortsmithError::unsupported("ffmpeg not found in PATH"));
        }
        Ok(Box::new(FfmpegFrameReader {
            path: info.path.clone(),
            size: info.size(),
            open: true,
        }))
    }

    fn is_available(&self) -> bool {
        command_exists("ffprobe") && command_exists("ffmpeg")
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

/// Decodes single frames with one `ffmpeg` invocation each.
#[derive(Debug)]
struct FfmpegFrameReader {
    path: PathBuf,
    size: Size,
    open: bool,
}

impl FrameReader for FfmpegFrameReader {
    fn frame_at(&mut self, time_secs: f64) -> ShortsmithResult<RgbImage> {
        if !self.open {
            return Err(ShortsmithError::frame_extraction("frame reader already closed"));
        }
        extract_frame(&self.path, time_secs, self.size)
    }

    fn close(&mut self) {
        self.open = false;
    }
}

/// Decode one frame as packed RGB through ffmpeg's rawvideo muxer.
pub fn extract_frame(path: &Path, time_secs: f64, size: Size) -> ShortsmithResult<RgbImage> {
    let output = Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{time_secs:.3}"), "-i"])
        .arg(path)
        .args([
            "-frames:v",
            "1",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "pipe:1",
        ])
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ShortsmithError::frame_extraction(format!("Failed to start ffmpeg: {e}")))?;

    if !output.status.success() {
        return Err(ShortsmithError::frame_extraction(format!(
            "ffmpeg could not decode {} at {time_secs:.3}s: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    frame_from_raw(size, output.stdout)
}

fn frame_from_raw(size: Size, raw: Vec<u8>) -> ShortsmithResult<RgbImage> {
    let expected = size.width as usize * size.height as usize * 3;
    let got = raw.len();
    RgbImage::from_raw(size.width, size.height, raw).ok_or_else(|| {
        ShortsmithError::frame_extraction(format!(
            "expected {expected} bytes for a {size} rgb24 frame, got {got}"
        ))
    })
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    tags: Option<FfprobeTags>,
    #[serde(default)]
    side_data_list: Vec<FfprobeSideData>,
}

#[derive(Debug, Deserialize)]
struct FfprobeTags {
    rotate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeSideData {
    rotation: Option<f64>,
}

impl FfprobeStream {
    /// Rotation in degrees from the display matrix, or the legacy `rotate` tag.
    fn rotation_degrees(&self) -> i64 {
        self.side_data_list
            .iter()
            .find_map(|sd| sd.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|t| t.rotate.as_deref())
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .map_or(0, |deg| deg.round() as i64)
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
///
/// Width and height are reported as displayed: ffmpeg applies rotation
/// metadata when decoding, so a quarter-turn swaps the stored dimensions.
pub fn parse_probe_output(path: &Path, json: &[u8]) -> ShortsmithResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| {
            ShortsmithError::probe(format!("{} has no video stream", path.display()))
        })?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(ShortsmithError::probe(format!(
                "{} reports no frame size",
                path.display()
            )))
        }
    };
    let rotation = video.rotation_degrees();
    let (width, height) = if rotation.rem_euclid(180) == 90 {
        tracing::debug!(path = %path.display(), rotation, "Rotated source, swapping frame size");
        (height, width)
    } else {
        (width, height)
    };

    let duration_secs = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| {
            ShortsmithError::probe(format!("{} reports no usable duration", path.display()))
        })?;

    Ok(MediaInfo {
        path: path.to_path_buf(),
        width,
        height,
        duration_secs,
        has_audio: probe.streams.iter().any(|s| s.codec_type == "audio"),
    })
}

/// Whether `binary` resolves on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    which::which(binary).is_ok()
}
