//! Locating and constructing the frontal-face detector.
//!
//! The only production backend is OpenCV's Haar cascade, compiled in with
//! the `opencv` feature. A build without it, or a missing cascade file, is
//! a fatal configuration error: the layout decision must never silently
//! fall back to "no face".

use std::path::PathBuf;

use shortsmith_common::config::DetectorConfig;
use shortsmith_common::error::{ShortsmithError, ShortsmithResult};

use crate::face_zone::FaceDetector;

/// File name of the frontal-face cascade shipped with OpenCV.
pub const FRONTAL_FACE_CASCADE: &str = "haarcascade_frontalface_default.xml";

/// Directories searched when no cascade path is configured.
const CASCADE_DIRS: &[&str] = &[
    "/usr/share/opencv4/haarcascades",
    "/usr/local/share/opencv4/haarcascades",
    "/usr/share/opencv/haarcascades",
    "/usr/local/share/opencv/haarcascades",
    "/opt/homebrew/share/opencv4/haarcascades",
];

/// Find the frontal-face cascade.
///
/// An explicitly configured path must exist. Otherwise
/// `$OPENCV_HAARCASCADES` and the standard data directories are tried.
pub fn find_cascade(config: &DetectorConfig) -> ShortsmithResult<PathBuf> {
    if let Some(path) = &config.cascade_path {
        return if path.is_file() {
            Ok(path.clone())
        } else {
            Err(ShortsmithError::detector_unavailable(format!(
                "Haar cascade not found at {}",
                path.display()
            )))
        };
    }

    let mut searched = Vec::new();
    let env_dir = std::env::var_os("OPENCV_HAARCASCADES").map(PathBuf::from);
    let dirs = env_dir
        .into_iter()
        .chain(CASCADE_DIRS.iter().map(PathBuf::from));

    for dir in dirs {
        let candidate = dir.join(FRONTAL_FACE_CASCADE);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "Found Haar cascade");
            return Ok(candidate);
        }
        searched.push(dir.display().to_string());
    }

    Err(ShortsmithError::detector_unavailable(format!(
        "{FRONTAL_FACE_CASCADE} not found (searched: {})",
        searched.join(", ")
    )))
}

/// Build the default face detector for this build.
pub fn default_face_detector(config: &DetectorConfig) -> ShortsmithResult<Box<dyn FaceDetector>> {
    #[cfg(feature = "opencv")]
    {
        let path = find_cascade(config)?;
        let detector = crate::haar::HaarCascadeDetector::load(&path)?;
        tracing::info!(cascade = %path.display(), "Loaded Haar cascade face detector");
        Ok(Box::new(detector))
    }

    #[cfg(not(feature = "opencv"))]
    {
        let _ = config;
        Err(ShortsmithError::detector_unavailable(
            "built without the `opencv` feature; rebuild with `--features opencv`",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_missing_cascade_is_fatal() {
        let config = DetectorConfig {
            cascade_path: Some(PathBuf::from("/nonexistent/haarcascade.xml")),
        };
        let err = find_cascade(&config).unwrap_err();
        assert!(err.is_fatal_configuration());
        assert!(err.to_string().contains("/nonexistent/haarcascade.xml"));
    }

    #[test]
    fn test_explicit_cascade_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FRONTAL_FACE_CASCADE);
        std::fs::write(&path, "<opencv_storage/>").unwrap();

        let config = DetectorConfig {
            cascade_path: Some(path.clone()),
        };
        assert_eq!(find_cascade(&config).unwrap(), path);
    }

    #[cfg(not(feature = "opencv"))]
    #[test]
    fn test_default_detector_without_opencv_is_fatal() {
        let err = default_face_detector(&DetectorConfig::default())
            .err()
            .expect("detector must be unavailable without opencv");
        assert!(err.is_fatal_configuration());
    }
}
