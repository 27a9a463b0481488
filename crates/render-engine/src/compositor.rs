//! Compiles a [`RenderSequence`] into one ffmpeg `-filter_complex` graph.
//!
//! Layout of the generated graph:
//!
//! ```text
//! color canvas ──┐
//! [0:v] split ───┼── crop/scale per source layer ── overlay (list order)
//! image/solid ───┘                                        │
//!                                              drawtext (title, caption)
//!                                                         │
//! [0:a] / anullsrc ───────────────────────── main ────────┤
//! outro [n:v][n:a] / anullsrc ─────────────── concat ─────┴── [vout][aout]
//! ```
//!
//! Compilation is pure; caption text is returned as files the caller
//! must write before running ffmpeg.

use std::path::{Path, PathBuf};

use shortsmith_project_model::config::EncoderProfile;
use shortsmith_project_model::geometry::{Rect, Size};
use shortsmith_project_model::plan::{
    AudioSource, HorizontalAnchor, LayerContent, Placement, VerticalAnchor, VideoTransform,
};
use shortsmith_project_model::text::TextStyle;

use crate::sequence::RenderSequence;

/// Output pad carrying the final video.
pub const VIDEO_OUT: &str = "vout";
/// Output pad carrying the final audio.
pub const AUDIO_OUT: &str = "aout";

/// One `-i` input and its preceding options.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphInput {
    pub path: PathBuf,
    pub args: Vec<String>,
}

/// Text that must exist on disk before ffmpeg starts.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFile {
    pub path: PathBuf,
    pub contents: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledGraph {
    pub inputs: Vec<GraphInput>,
    pub filter_complex: String,
    pub text_files: Vec<TextFile>,
}

impl CompiledGraph {
    /// Input options in order, ready for the command line.
    pub fn input_args(&self) -> Vec<String> {
        self.inputs
            .iter()
            .flat_map(|input| input.args.iter().cloned())
            .collect()
    }
}

/// Build the filter graph. Text files are placed under `workspace`.
pub fn compile(sequence: &RenderSequence, workspace: &Path) -> CompiledGraph {
    let plan = &sequence.main;
    let encoder = &sequence.encoder;
    let fps = encoder.fps;
    let duration = secs(plan.duration_secs);

    let mut inputs = vec![GraphInput {
        path: sequence.source.clone(),
        args: input_args(&["-t", &duration], &sequence.source),
    }];
    let mut chains = vec![format!(
        "color=c=black:s={}:r={fps}:d={duration}[canvas]",
        plan.resolution
    )];
    let mut text_files = Vec::new();

    let layers = plan.layers();
    let source_layers = layers.iter().filter(|layer| layer.uses_source()).count();
    if source_layers > 0 {
        let pads: String = (0..source_layers).map(|i| format!("[src{i}]")).collect();
        chains.push(format!("[0:v]split={source_layers}{pads}"));
    }

    let mut base = "canvas".to_string();
    let mut next_source = 0;
    for (i, layer) in layers.iter().enumerate() {
        let out = format!("m{i}");
        let pad = format!("l{i}");
        match &layer.content {
            LayerContent::Source(transform) => {
                chains.push(format!(
                    "[src{next_source}]{}[{pad}]",
                    transform_filters(transform)
                ));
                next_source += 1;
                chains.push(overlay(&base, &pad, layer.placement, &out));
            }
            LayerContent::Image { path, size } => {
                let index = inputs.len();
                inputs.push(GraphInput {
                    path: path.clone(),
                    args: input_args(
                        &["-loop", "1", "-framerate", &fps.to_string(), "-t", &duration],
                        path,
                    ),
                });
                chains.push(format!(
                    "[{index}:v]scale={}:{},setsar=1[{pad}]",
                    size.width, size.height
                ));
                chains.push(overlay(&base, &pad, layer.placement, &out));
            }
            LayerContent::Solid { color, size } => {
                chains.push(format!(
                    "color=c=0x{:02x}{:02x}{:02x}:s={size}:r={fps}:d={duration}[{pad}]",
                    color[0], color[1], color[2]
                ));
                chains.push(overlay(&base, &pad, layer.placement, &out));
            }
            LayerContent::Text { text, style } => {
                let path = workspace.join(format!("{}.txt", layer.role.as_str()));
                chains.push(format!(
                    "[{base}]{}[{out}]",
                    drawtext(&path, style, layer.placement)
                ));
                text_files.push(TextFile {
                    path,
                    contents: text.clone(),
                });
            }
        }
        base = out;
    }

    let (main_v, main_a) = if sequence.outro.is_some() {
        ("mainv", "maina")
    } else {
        (VIDEO_OUT, AUDIO_OUT)
    };
    chains.push(format!(
        "[{base}]fps={fps},format={},setsar=1[{main_v}]",
        encoder.pixel_format
    ));
    chains.push(audio_chain(
        (plan.audio == AudioSource::SourceTrack).then_some("[0:a]"),
        plan.duration_secs,
        encoder,
        main_a,
    ));

    if let Some(outro) = &sequence.outro {
        let index = inputs.len();
        inputs.push(GraphInput {
            path: outro.path.clone(),
            args: input_args(&[], &outro.path),
        });
        chains.push(format!(
            "[{index}:v]scale={}:{},setsar=1,fps={fps},format={}[outrov]",
            plan.resolution.width, plan.resolution.height, encoder.pixel_format
        ));
        let outro_audio = format!("[{index}:a]");
        chains.push(audio_chain(
            outro.has_audio.then_some(outro_audio.as_str()),
            outro.duration_secs,
            encoder,
            "outroa",
        ));
        chains.push(format!(
            "[{main_v}][{main_a}][outrov][outroa]concat=n=2:v=1:a=1[{VIDEO_OUT}][{AUDIO_OUT}]"
        ));
    }

    CompiledGraph {
        inputs,
        filter_complex: chains.join(";"),
        text_files,
    }
}

fn input_args(options: &[&str], path: &Path) -> Vec<String> {
    let mut args: Vec<String> = options.iter().map(|s| s.to_string()).collect();
    args.push("-i".to_string());
    args.push(path.display().to_string());
    args
}

fn transform_filters(transform: &VideoTransform) -> String {
    let mut filters = Vec::with_capacity(4);
    if let Some(rect) = transform.crop {
        filters.push(crop(rect));
    }
    filters.push(format!(
        "scale={}:{}",
        transform.scale.width, transform.scale.height
    ));
    if let Some(rect) = transform.post_crop {
        filters.push(crop(rect));
    }
    filters.push("setsar=1".to_string());
    filters.join(",")
}

fn crop(rect: Rect) -> String {
    let Size { width, height } = rect.size();
    format!("crop={width}:{height}:{}:{}", rect.x1, rect.y1)
}

fn overlay(base: &str, layer: &str, placement: Placement, out: &str) -> String {
    let (x, y) = position_exprs(placement, ("W", "w"), ("H", "h"));
    format!("[{base}][{layer}]overlay=x={x}:y={y}:eof_action=pass[{out}]")
}

fn drawtext(textfile: &Path, style: &TextStyle, placement: Placement) -> String {
    let (x, y) = position_exprs(placement, ("w", "text_w"), ("h", "text_h"));
    // Text is literal: `%` and `\` are not expansion sequences.
    let mut options = vec![
        format!("textfile={}", quote(&textfile.display().to_string())),
        "expansion=none".to_string(),
    ];
    if let Some(font) = &style.font {
        options.push(format!("fontfile={}", quote(&font.display().to_string())));
    }
    options.push(format!("fontsize={}", style.font_size));
    options.push(format!("fontcolor={}", style.color));
    options.push(format!("borderw={}", style.stroke_width.max(0.0).ceil() as u32));
    options.push(format!("bordercolor={}", style.stroke_color));
    options.push(format!("x={x}"));
    options.push(format!("y={y}"));
    format!("drawtext={}", options.join(":"))
}

/// Position expressions given the canvas and layer size variable names.
fn position_exprs(
    placement: Placement,
    (outer_w, inner_w): (&str, &str),
    (outer_h, inner_h): (&str, &str),
) -> (String, String) {
    match placement {
        Placement::At(point) => (point.x.to_string(), point.y.to_string()),
        Placement::Anchored {
            horizontal,
            vertical,
        } => {
            let x = match horizontal {
                HorizontalAnchor::Left => "0".to_string(),
                HorizontalAnchor::Center => format!("({outer_w}-{inner_w})/2"),
                HorizontalAnchor::Right => format!("{outer_w}-{inner_w}"),
            };
            let y = match vertical {
                VerticalAnchor::Top => "0".to_string(),
                VerticalAnchor::Center => format!("({outer_h}-{inner_h})/2"),
                VerticalAnchor::Bottom => format!("{outer_h}-{inner_h}"),
            };
            (x, y)
        }
    }
}

/// Audio of exactly `duration_secs`, from `input` or silence.
fn audio_chain(
    input: Option<&str>,
    duration_secs: f64,
    encoder: &EncoderProfile,
    out: &str,
) -> String {
    let rate = encoder.audio_sample_rate;
    let duration = secs(duration_secs);
    match input {
        Some(pad) => format!(
            "{pad}aformat=sample_rates={rate}:channel_layouts=stereo,apad,atrim=0:{duration},asetpts=PTS-STARTPTS[{out}]"
        ),
        None => format!("anullsrc=r={rate}:cl=stereo,atrim=0:{duration}[{out}]"),
    }
}

fn secs(value: f64) -> String {
    format!("{value:.3}")
}

/// Quote a filter option value.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shortsmith_processing_core::geometry::SourceFrame;
    use shortsmith_processing_core::layout::{LayoutInputs, LayoutSelector};
    use shortsmith_project_model::config::PipelineConfig;
    use shortsmith_project_model::geometry::Point;
    use shortsmith_project_model::plan::{Layer, LayerRole, Layout};

    use crate::sequence::OutroSegment;

    fn text(role: LayerRole, label: &str, vertical: VerticalAnchor, font: Option<&str>) -> Layer {
        Layer {
            role,
            content: LayerContent::Text {
                text: label.to_string(),
                style: TextStyle::title().with_font(font.map(PathBuf::from)),
            },
            placement: Placement::Anchored {
                horizontal: HorizontalAnchor::Center,
                vertical,
            },
            duration_secs: 10.0,
        }
    }

    fn sequence(face: bool, background: LayerContent, audio: AudioSource) -> RenderSequence {
        let config = PipelineConfig::default();
        let inputs = LayoutInputs {
            source: SourceFrame::new(1920, 1080, 10.0),
            background: Layer {
                role: LayerRole::Background,
                content: background,
                placement: Placement::At(Point::ORIGIN),
                duration_secs: 10.0,
            },
            title: text(
                LayerRole::Title,
                "Ace",
                VerticalAnchor::Top,
                Some("/assets/Roboto-Bold.ttf"),
            ),
            caption: text(LayerRole::Caption, "@Anyme023", VerticalAnchor::Bottom, None),
            audio,
        };
        RenderSequence {
            source: PathBuf::from("/clips/game.mp4"),
            main: LayoutSelector::new(&config).select(face, inputs).unwrap(),
            outro: None,
            encoder: config.encoder,
        }
    }

    fn black() -> LayerContent {
        LayerContent::Solid {
            color: [0, 0, 0],
            size: Size::VERTICAL_HD,
        }
    }

    #[test]
    fn test_webcam_layout_graph() {
        let seq = sequence(true, black(), AudioSource::SourceTrack);
        let graph = compile(&seq, Path::new("/tmp/ws"));
        let fc = &graph.filter_complex;

        assert_eq!(graph.inputs.len(), 1);
        assert_eq!(
            graph.input_args(),
            vec!["-t", "10.000", "-i", "/clips/game.mp4"]
        );
        assert!(fc.starts_with("color=c=black:s=1080x1920:r=30:d=10.000[canvas]"));
        assert!(fc.contains("[0:v]split=2[src0][src1]"));
        assert!(fc.contains("color=c=0x000000:s=1080x1920:r=30:d=10.000[l0]"));
        assert!(fc.contains("[src0]crop=1920:798:0:282,scale="));
        assert!(fc.contains("[src1]crop=537:274:5:8,scale=1240:633,setsar=1[l2]"));
        assert!(fc.contains("[m1][l2]overlay=x=-80:y=0:eof_action=pass[m2]"));
        assert!(fc.contains("fontfile='/assets/Roboto-Bold.ttf'"));
        assert!(fc.contains("borderw=2"));
        assert!(fc.contains("x=(w-text_w)/2:y=h-text_h[m4]"));
        assert!(fc.contains("[m4]fps=30,format=yuv420p,setsar=1[vout]"));
        assert!(fc.contains("[0:a]aformat=sample_rates=44100"));
        assert!(fc.ends_with("[aout]"));
        assert!(!fc.contains("concat"));

        let files: Vec<_> = graph.text_files.iter().map(|f| f.path.clone()).collect();
        assert_eq!(
            files,
            vec![PathBuf::from("/tmp/ws/title.txt"), PathBuf::from("/tmp/ws/caption.txt")]
        );
        assert_eq!(graph.text_files[1].contents, "@Anyme023");
    }

    #[test]
    fn test_layers_composite_in_plan_order() {
        let seq = sequence(true, black(), AudioSource::SourceTrack);
        let fc = compile(&seq, Path::new("/tmp/ws")).filter_complex;

        let positions: Vec<usize> = ["[canvas][l0]", "[m0][l1]", "[m1][l2]", "[m2]drawtext", "[m3]drawtext"]
            .iter()
            .map(|needle| fc.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_full_bleed_graph_has_no_background() {
        let seq = sequence(false, black(), AudioSource::Silent);
        let graph = compile(&seq, Path::new("/tmp/ws"));
        let fc = &graph.filter_complex;

        assert!(fc.contains("[0:v]split=1[src0]"));
        assert!(fc.contains("[src0]scale=3413:1920,crop=1080:1920:1166:0,setsar=1[l0]"));
        assert!(fc.contains("[canvas][l0]overlay=x=0:y=0"));
        assert!(!fc.contains("[0:a]"));
        assert!(fc.contains("anullsrc=r=44100:cl=stereo,atrim=0:10.000[aout]"));
    }

    #[test]
    fn test_background_image_becomes_looped_input() {
        let image = LayerContent::Image {
            path: PathBuf::from("/assets/fond_short.png"),
            size: Size::VERTICAL_HD,
        };
        let seq = sequence(true, image, AudioSource::SourceTrack);
        let graph = compile(&seq, Path::new("/tmp/ws"));

        assert_eq!(graph.inputs.len(), 2);
        assert_eq!(
            graph.inputs[1].args,
            vec!["-loop", "1", "-framerate", "30", "-t", "10.000", "-i", "/assets/fond_short.png"]
        );
        assert!(graph
            .filter_complex
            .contains("[1:v]scale=1080:1920,setsar=1[l0]"));
    }

    #[test]
    fn test_outro_is_concatenated_after_main() {
        let mut seq = sequence(false, black(), AudioSource::SourceTrack);
        seq.outro = Some(OutroSegment {
            path: PathBuf::from("/assets/fin_de_short.mp4"),
            duration_secs: 3.0,
            has_audio: false,
        });
        let graph = compile(&seq, Path::new("/tmp/ws"));
        let fc = &graph.filter_complex;

        assert_eq!(graph.inputs[1].args, vec!["-i", "/assets/fin_de_short.mp4"]);
        assert!(fc.contains("[1:v]scale=1080:1920,setsar=1,fps=30,format=yuv420p[outrov]"));
        assert!(fc.contains("anullsrc=r=44100:cl=stereo,atrim=0:3.000[outroa]"));
        assert!(fc.ends_with("[mainv][maina][outrov][outroa]concat=n=2:v=1:a=1[vout][aout]"));
    }

    #[test]
    fn test_title_text_is_not_expanded() {
        let mut seq = sequence(false, black(), AudioSource::SourceTrack);
        if let Layout::FullBleed { title, .. } = &mut seq.main.layout {
            if let LayerContent::Text { text, .. } = &mut title.content {
                *text = r"100% clutch \o/".to_string();
            }
        }
        let graph = compile(&seq, Path::new("/tmp/ws"));

        assert_eq!(graph.text_files[0].path, PathBuf::from("/tmp/ws/title.txt"));
        assert_eq!(graph.text_files[0].contents, r"100% clutch \o/");
        assert!(graph
            .filter_complex
            .contains("drawtext=textfile='/tmp/ws/title.txt':expansion=none:"));
        assert_eq!(graph.filter_complex.matches("expansion=none").count(), 2);
    }

    #[test]
    fn test_quote_escapes_single_quotes() {
        assert_eq!(quote("/tmp/it's.txt"), r"'/tmp/it'\''s.txt'");
    }
}
