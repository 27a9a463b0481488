//! Immutable pipeline configuration.
//!
//! One value is injected into the assembler per run; nothing here is
//! global or mutable.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Resolution, Size};
use crate::text::TextStyle;

/// Where the streamer's camera is expected in the source frame.
pub const DEFAULT_WEBCAM_ZONE: Rect = Rect::new(5, 8, 542, 282);

/// Longest source excerpt kept, in seconds.
pub const DEFAULT_MAX_DURATION_SECS: f64 = 180.0;

/// Everything the layout engine and renderer need to know.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Output resolution.
    pub resolution: Resolution,

    /// Webcam region in source-frame pixels; also the face-detection ROI.
    pub webcam_zone: Rect,

    /// Fixed trim cap. Caller-supplied duration hints do not override it.
    pub max_duration_secs: f64,

    /// Share of the output height given to the webcam strip.
    pub webcam_height_fraction: f64,

    /// Share of the output height given to the gameplay strip.
    pub gameplay_height_fraction: f64,

    /// Face detector tuning.
    pub detection: DetectionParams,

    /// Output encoding.
    pub encoder: EncoderProfile,

    /// Title overlay style.
    pub title: TextStyle,

    /// Broadcaster caption style.
    pub caption: TextStyle,

    /// How many times the render step is attempted (1 = no retry).
    pub render_attempts: u32,
}

/// Parameters forwarded to the frontal-face detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    /// Image pyramid scale step.
    pub scale_factor: f64,

    /// Neighbouring detections required to keep a candidate.
    pub min_neighbors: u32,

    /// Smallest face reported, in pixels.
    pub min_size: Size,
}

/// Video codec of the rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodec {
    H264,
    H265,
}

/// Audio codec of the rendered file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    Aac,
}

/// Fixed encoder settings for the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderProfile {
    pub fps: u32,
    pub video_codec: VideoCodec,
    pub audio_codec: AudioCodec,
    /// x264/x265 speed preset.
    pub preset: String,
    pub pixel_format: String,
    /// Constant rate factor.
    pub crf: u32,
    pub audio_bitrate_kbps: u32,
    /// Audio sample rate used for silence padding and resampling.
    pub audio_sample_rate: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution: Size::VERTICAL_HD,
            webcam_zone: DEFAULT_WEBCAM_ZONE,
            max_duration_secs: DEFAULT_MAX_DURATION_SECS,
            webcam_height_fraction: 0.33,
            gameplay_height_fraction: 0.67,
            detection: DetectionParams::default(),
            encoder: EncoderProfile::default(),
            title: TextStyle::title(),
            caption: TextStyle::caption(),
            render_attempts: 1,
        }
    }
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.3,
            min_neighbors: 5,
            min_size: Size::new(20, 20),
        }
    }
}

impl Default for EncoderProfile {
    fn default() -> Self {
        Self {
            fps: 30,
            video_codec: VideoCodec::H264,
            audio_codec: AudioCodec::Aac,
            preset: "medium".to_string(),
            pixel_format: "yuv420p".to_string(),
            crf: 20,
            audio_bitrate_kbps: 192,
            audio_sample_rate: 44_100,
        }
    }
}

/// Reasons a [`PipelineConfig`] is rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("resolution must be non-zero, got {0}")]
    EmptyResolution(Size),

    #[error("resolution must be even for {pixel_format}, got {resolution}")]
    OddResolution {
        resolution: Size,
        pixel_format: String,
    },

    #[error("max duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("{name} must be in (0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("fps must be non-zero")]
    ZeroFps,

    #[error("detector scale factor must be greater than 1, got {0}")]
    ScaleFactor(f64),

    #[error("render attempts must be at least 1")]
    ZeroAttempts,

    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let read_err = |message: String| ConfigError::Read {
            path: path.display().to_string(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| read_err(e.to_string()))?;
        let config: Self = serde_json::from_str(&content).map_err(|e| read_err(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.is_empty() {
            return Err(ConfigError::EmptyResolution(self.resolution));
        }
        if self.encoder.pixel_format == "yuv420p"
            && (self.resolution.width % 2 != 0 || self.resolution.height % 2 != 0)
        {
            return Err(ConfigError::OddResolution {
                resolution: self.resolution,
                pixel_format: self.encoder.pixel_format.clone(),
            });
        }
        if !(self.max_duration_secs > 0.0) {
            return Err(ConfigError::NonPositiveDuration(self.max_duration_secs));
        }
        for (name, value) in [
            ("webcam_height_fraction", self.webcam_height_fraction),
            ("gameplay_height_fraction", self.gameplay_height_fraction),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::FractionOutOfRange { name, value });
            }
        }
        if self.encoder.fps == 0 {
            return Err(ConfigError::ZeroFps);
        }
        if !(self.detection.scale_factor > 1.0) {
            return Err(ConfigError::ScaleFactor(self.detection.scale_factor));
        }
        if self.render_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        Ok(())
    }

    /// Height of the webcam strip in output pixels.
    pub fn webcam_height(&self) -> u32 {
        self.resolution.height_fraction(self.webcam_height_fraction)
    }

    /// Height of the gameplay strip in output pixels.
    pub fn gameplay_height(&self) -> u32 {
        self.resolution.height_fraction(self.gameplay_height_fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shorts_format() {
        let config = PipelineConfig::default();
        assert_eq!(config.resolution, Size::new(1080, 1920));
        assert_eq!(config.webcam_zone, Rect::new(5, 8, 542, 282));
        assert_eq!(config.max_duration_secs, 180.0);
        assert_eq!(config.encoder.fps, 30);
        assert_eq!(config.detection.min_neighbors, 5);
        assert_eq!(config.detection.min_size, Size::new(20, 20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strip_heights() {
        let config = PipelineConfig::default();
        assert_eq!(config.webcam_height(), 633);
        assert_eq!(config.gameplay_height(), 1286);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = PipelineConfig::default();
        config.resolution = Size::new(0, 1920);
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyResolution(Size::new(0, 1920)))
        );

        let mut config = PipelineConfig::default();
        config.max_duration_secs = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositiveDuration(_))
        ));

        let mut config = PipelineConfig::default();
        config.gameplay_height_fraction = 1.2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::FractionOutOfRange {
                name: "gameplay_height_fraction",
                ..
            })
        ));

        let mut config = PipelineConfig::default();
        config.render_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroAttempts));
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{"resolution": {"width": 720, "height": 1280}, "encoder": {"fps": 60}}"#,
        )
        .unwrap();
        assert_eq!(config.resolution, Size::new(720, 1280));
        assert_eq!(config.encoder.fps, 60);
        assert_eq!(config.encoder.video_codec, VideoCodec::H264);
        assert_eq!(config.webcam_zone, DEFAULT_WEBCAM_ZONE);
        assert!(config.validate().is_ok());
    }
}
