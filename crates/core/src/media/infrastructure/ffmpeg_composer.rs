use std::path::{Path, PathBuf};
use std::process::Command;

use crate::captions::domain::caption::Caption;
use crate::captions::infrastructure::webvtt::write_webvtt;
use crate::media::domain::video_composer::{CompositionRequest, SubtitleStyle, VideoComposer};
use crate::shared::constants::OUTPUT_FPS;

/// Vertical resolution libass lays subtitles out in when none is given.
const SUBTITLE_LAYOUT_HEIGHT: u32 = 288;
/// Distance of the text baseline from the bottom edge, in layout pixels.
const SUBTITLE_MARGIN_V: u32 = 40;
const OUTLINE_WIDTH: u32 = 2;
/// Lines of ffmpeg stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 20;

/// Renders a lyric video by running the `ffmpeg` binary: the image is
/// looped for the audio length and the cues are burned in through the
/// `subtitles` filter.
#[derive(Clone, Debug)]
pub struct FfmpegComposer {
    binary: PathBuf,
}

impl FfmpegComposer {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfmpegComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoComposer for FfmpegComposer {
    fn compose(&self, request: &CompositionRequest) -> Result<(), Box<dyn std::error::Error>> {
        if !request.duration.is_finite() || request.duration <= 0.0 {
            return Err(format!("invalid video duration: {}", request.duration).into());
        }

        let (width, height) = image::image_dimensions(&request.image_path).map_err(|e| {
            format!(
                "cannot read image {}: {e}",
                request.image_path.display()
            )
        })?;
        let frame = even_dimensions(width, height);

        let captions: Vec<Caption> = request
            .cues
            .iter()
            .map(|cue| Caption::new(cue.start, cue.end, cue.text.clone()))
            .collect();
        let subtitles = tempfile::Builder::new()
            .prefix("lyrics-")
            .suffix(".vtt")
            .tempfile()?;
        write_webvtt(subtitles.path(), &captions)?;

        let args = build_args(request, subtitles.path(), frame);
        log::info!(
            "Composing {}x{} video with {} overlays into {}",
            frame.0,
            frame.1,
            request.cues.len(),
            request.output_path.display()
        );
        log::debug!("{} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| format!("failed to run {}: {e}", self.binary.display()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "ffmpeg exited with {}:\n{}",
                output.status,
                tail(&stderr, STDERR_TAIL_LINES)
            )
            .into());
        }

        Ok(())
    }
}

/// Rounds both sides down to even numbers, as yuv420p requires, keeping at
/// least 2x2.
pub fn even_dimensions(width: u32, height: u32) -> (u32, u32) {
    ((width & !1).max(2), (height & !1).max(2))
}

fn build_args(request: &CompositionRequest, subtitles: &Path, frame: (u32, u32)) -> Vec<String> {
    let filter = format!(
        "scale={}:{},subtitles={}:force_style={}",
        frame.0,
        frame.1,
        escape_filter_value(&subtitles.to_string_lossy()),
        escape_filter_value(&force_style(&request.style, frame.1)),
    );

    vec![
        "-y".into(),
        "-loop".into(),
        "1".into(),
        "-framerate".into(),
        OUTPUT_FPS.to_string(),
        "-i".into(),
        request.image_path.to_string_lossy().into_owned(),
        "-i".into(),
        request.audio_path.to_string_lossy().into_owned(),
        "-vf".into(),
        filter,
        "-t".into(),
        format!("{:.3}", request.duration),
        "-r".into(),
        OUTPUT_FPS.to_string(),
        "-c:v".into(),
        "libx264".into(),
        "-tune".into(),
        "stillimage".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "-c:a".into(),
        "aac".into(),
        "-shortest".into(),
        request.output_path.to_string_lossy().into_owned(),
    ]
}

/// libass style overrides: bottom-centred text with a black outline.
fn force_style(style: &SubtitleStyle, frame_height: u32) -> String {
    let colour = ass_colour(&style.font_color).unwrap_or_else(|| {
        log::warn!("Unknown font colour '{}', using white", style.font_color);
        ass_bgr(0xFF, 0xFF, 0xFF)
    });
    format!(
        "FontSize={},PrimaryColour={colour},OutlineColour={},BorderStyle=1,Outline={OUTLINE_WIDTH},Shadow=0,Alignment=2,MarginV={SUBTITLE_MARGIN_V}",
        layout_font_size(style.font_size, frame_height),
        ass_bgr(0, 0, 0),
    )
}

/// Converts a pixel font size on the output frame to libass layout units.
fn layout_font_size(font_size: u32, frame_height: u32) -> u32 {
    if frame_height == 0 {
        return font_size.max(1);
    }
    let scaled = font_size as f64 * SUBTITLE_LAYOUT_HEIGHT as f64 / frame_height as f64;
    (scaled.round() as u32).max(1)
}

/// `&HAABBGGRR` colour for a CSS-style name or `#rrggbb` hex value.
fn ass_colour(name: &str) -> Option<String> {
    let name = name.trim().to_ascii_lowercase();
    if let Some(hex) = name.strip_prefix('#') {
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        return Some(ass_bgr(channel(0)?, channel(2)?, channel(4)?));
    }
    let (r, g, b) = match name.as_str() {
        "white" => (0xFF, 0xFF, 0xFF),
        "black" => (0x00, 0x00, 0x00),
        "yellow" => (0xFF, 0xFF, 0x00),
        "red" => (0xFF, 0x00, 0x00),
        "green" => (0x00, 0x80, 0x00),
        "lime" => (0x00, 0xFF, 0x00),
        "blue" => (0x00, 0x00, 0xFF),
        "cyan" | "aqua" => (0x00, 0xFF, 0xFF),
        "magenta" | "fuchsia" => (0xFF, 0x00, 0xFF),
        "orange" => (0xFF, 0xA5, 0x00),
        "pink" => (0xFF, 0xC0, 0xCB),
        "purple" => (0x80, 0x00, 0x80),
        "gray" | "grey" => (0x80, 0x80, 0x80),
        _ => return None,
    };
    Some(ass_bgr(r, g, b))
}

fn ass_bgr(r: u8, g: u8, b: u8) -> String {
    format!("&H00{b:02X}{g:02X}{r:02X}")
}

/// Escapes a value for use inside an ffmpeg filter graph: once for the
/// filter option parser, then again for the graph parser.
fn escape_filter_value(value: &str) -> String {
    let option_level = escape_chars(value, &['\\', '\'', ':']);
    escape_chars(&option_level, &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}
