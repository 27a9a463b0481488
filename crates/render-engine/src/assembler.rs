//! End-to-end Short assembly.
//!
//! ```text
//! open + trim ── classify t=0 ── background + captions ── layout ── outro ── render
//! ```
//!
//! The source clip is held for the whole run and released exactly once on
//! every exit path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use shortsmith_common::config::{AppConfig, AssetConfig};
use shortsmith_common::error::{ShortsmithError, ShortsmithResult};
use shortsmith_processing_core::detector::default_face_detector;
use shortsmith_processing_core::face_zone::{FaceDetector, FaceZoneClassifier};
use shortsmith_processing_core::layout::{LayoutInputs, LayoutSelector};
use shortsmith_project_model::config::PipelineConfig;
use shortsmith_project_model::metadata::ClipMetadata;

use crate::export::{FfmpegBackend, ProgressCallback, RenderBackend};
use crate::media::{FfmpegMedia, MediaProbe};
use crate::overlays::{background_layer, caption_layer, title_layer};
use crate::sequence::{OutroSegment, RenderSequence};
use crate::source::SourceClip;

/// Owns the collaborators of one pipeline configuration.
///
/// Holds no per-run state, so one assembler can serve concurrent runs on
/// independent files.
pub struct ClipAssembler {
    config: PipelineConfig,
    assets: AssetConfig,
    media: Arc<dyn MediaProbe>,
    classifier: FaceZoneClassifier,
    selector: LayoutSelector,
    backend: Box<dyn RenderBackend>,
    write_plan_report: bool,
    progress: Option<Box<ProgressCallback>>,
}

impl ClipAssembler {
    pub fn new(
        config: PipelineConfig,
        assets: AssetConfig,
        media: Arc<dyn MediaProbe>,
        detector: Box<dyn FaceDetector>,
        backend: Box<dyn RenderBackend>,
    ) -> Self {
        let classifier = FaceZoneClassifier::new(detector, config.webcam_zone, config.detection);
        let selector = LayoutSelector::new(&config);
        Self {
            config,
            assets,
            media,
            classifier,
            selector,
            backend,
            write_plan_report: false,
            progress: None,
        }
    }

    /// Production wiring: ffprobe/ffmpeg media, the OpenCV detector, and
    /// the ffmpeg backend.
    ///
    /// Fails with [`ShortsmithError::DetectorUnavailable`] when no face
    /// detector can be loaded.
    pub fn from_app_config(config: PipelineConfig, app: &AppConfig) -> ShortsmithResult<Self> {
        config
            .validate()
            .map_err(|e| ShortsmithError::config(e.to_string()))?;
        let detector = default_face_detector(&app.detector)?;
        Ok(Self::new(
            config,
            app.assets.clone(),
            Arc::new(FfmpegMedia::new()),
            detector,
            Box::new(FfmpegBackend::new()),
        )
        .with_plan_report(app.write_plan_report))
    }

    /// Write `<output>.plan.json` after each successful render.
    pub fn with_plan_report(mut self, enabled: bool) -> Self {
        self.write_plan_report = enabled;
        self
    }

    pub fn with_progress(mut self, callback: Box<ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn assets(&self) -> &AssetConfig {
        &self.assets
    }

    /// Assemble the Short for `input` and render it to `output`.
    ///
    /// `max_duration_hint` is accepted for interface compatibility; the
    /// configured cap always applies.
    pub fn process(
        &self,
        input: &Path,
        output: &Path,
        max_duration_hint: f64,
        metadata: &ClipMetadata,
    ) -> ShortsmithResult<PathBuf> {
        let started = std::time::Instant::now();
        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            title = metadata.title(),
            broadcaster = metadata.broadcaster_name(),
            game = metadata.game_name().unwrap_or(""),
            "Starting Short assembly"
        );

        let mut clip = self.open_source(input, max_duration_hint)?;
        let sequence = self.build_sequence(&mut clip, metadata)?;
        self.render(&sequence, output)?;
        clip.close();

        if self.write_plan_report {
            write_plan_report(&sequence, output);
        }

        tracing::info!(
            output = %output.display(),
            layout = sequence.main.layout.name(),
            duration_secs = sequence.total_duration_secs(),
            elapsed_secs = started.elapsed().as_secs_f64(),
            "Short assembled"
        );
        Ok(output.to_path_buf())
    }

    /// Everything up to rendering: classify, choose the layout, resolve
    /// the outro. Nothing is written.
    pub fn plan(
        &self,
        input: &Path,
        max_duration_hint: f64,
        metadata: &ClipMetadata,
    ) -> ShortsmithResult<RenderSequence> {
        let mut clip = self.open_source(input, max_duration_hint)?;
        let sequence = self.build_sequence(&mut clip, metadata)?;
        clip.close();
        Ok(sequence)
    }

    fn open_source(&self, input: &Path, max_duration_hint: f64) -> ShortsmithResult<SourceClip> {
        tracing::debug!(
            hint_secs = max_duration_hint,
            cap_secs = self.config.max_duration_secs,
            "Caller duration hint superseded by the configured cap"
        );
        SourceClip::open(self.media.as_ref(), input, self.config.max_duration_secs)
    }

    fn build_sequence(
        &self,
        clip: &mut SourceClip,
        metadata: &ClipMetadata,
    ) -> ShortsmithResult<RenderSequence> {
        let frame = clip.first_frame()?;
        let verdict = self.classifier.classify(&frame)?;
        tracing::info!(
            detector = self.classifier.detector_name(),
            verdict = ?verdict,
            "Webcam zone classified"
        );

        let duration_secs = clip.duration_secs();
        let resolution = self.config.resolution;
        let inputs = LayoutInputs {
            source: clip.frame(),
            background: background_layer(&self.assets, resolution, duration_secs),
            title: title_layer(metadata, &self.config.title, &self.assets, duration_secs),
            caption: caption_layer(metadata, &self.config.caption, &self.assets, duration_secs),
            audio: clip.audio(),
        };
        let main = self.selector.select(verdict.has_face(), inputs)?;
        let outro = OutroSegment::from_assets(&self.assets, self.media.as_ref())?;

        Ok(RenderSequence {
            source: clip.path().to_path_buf(),
            main,
            outro,
            encoder: self.config.encoder.clone(),
        })
    }

    fn render(&self, sequence: &RenderSequence, output: &Path) -> ShortsmithResult<()> {
        if !self.backend.is_available() {
            return Err(ShortsmithError::unsupported(format!(
                "render backend '{}' is not available (expected ffmpeg in PATH)",
                self.backend.name()
            )));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let attempts = self.config.render_attempts.max(1);
        let mut attempt = 1;
        loop {
            tracing::info!(
                backend = self.backend.name(),
                attempt,
                attempts,
                "Rendering"
            );
            match self
                .backend
                .render(sequence, output, self.progress.as_deref())
            {
                Ok(()) => return Ok(()),
                Err(err) if attempt < attempts && !err.is_fatal_configuration() => {
                    tracing::warn!(error = %err, attempt, "Render failed, retrying");
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl std::fmt::Debug for ClipAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipAssembler")
            .field("config", &self.config)
            .field("assets", &self.assets)
            .field("media", &self.media.name())
            .field("classifier", &self.classifier)
            .field("backend", &self.backend.name())
            .field("write_plan_report", &self.write_plan_report)
            .finish()
    }
}

/// Path of the plan report written next to `output`.
pub fn plan_report_path(output: &Path) -> PathBuf {
    output.with_extension("plan.json")
}

fn write_plan_report(sequence: &RenderSequence, output: &Path) {
    let path = plan_report_path(output);
    let result = serde_json::to_string_pretty(sequence)
        .map_err(ShortsmithError::from)
        .and_then(|json| std::fs::write(&path, json).map_err(ShortsmithError::from));
    match result {
        Ok(()) => tracing::info!(report = %path.display(), "Wrote plan report"),
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "Failed to write plan report")
        }
    }
}

/// Run [`ClipAssembler::process`] on the blocking thread pool.
pub async fn process_clip_async(
    assembler: Arc<ClipAssembler>,
    input: PathBuf,
    output: PathBuf,
    max_duration_hint: f64,
    metadata: ClipMetadata,
) -> ShortsmithResult<PathBuf> {
    tokio::task::spawn_blocking(move || {
        assembler.process(&input, &output, max_duration_hint, &metadata)
    })
    .await
    .map_err(|e| ShortsmithError::render(format!("assembly task failed: {e}")))?
}
