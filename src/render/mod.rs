//! ffmpeg-based video composition
//!
//! Renders the final vertical video: each generated image becomes one
//! slideshow segment, captions are burned in from a generated ASS file,
//! and the narration audio is muxed on top. Also home to the ffprobe
//! duration measurement used for synthesized audio.

pub mod subtitle;

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::artifacts::ArtifactLifecycle;
use crate::captions::CaptionEvent;
use crate::clients::{AudioAsset, ClientError, VideoRenderer};
use crate::config::RenderConfig;

use subtitle::AssGenerator;

/// Measure a media file's duration in seconds with ffprobe.
pub async fn ffprobe_duration(path: &Path) -> Result<f64, ClientError> {
    let ffprobe = which::which("ffprobe")
        .map_or_else(|_| "ffprobe".to_string(), |p| p.to_string_lossy().to_string());

    let output = Command::new(&ffprobe)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ClientError::tool("ffprobe", stderr.trim().to_string()));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let duration: f64 = stdout
        .trim()
        .parse()
        .map_err(|_| ClientError::tool("ffprobe", format!("unparseable duration {stdout:?}")))?;

    if duration <= 0.0 {
        return Err(ClientError::tool("ffprobe", format!("non-positive duration {duration}")));
    }
    Ok(duration)
}

/// Slideshow renderer over the ffmpeg CLI.
pub struct FfmpegRenderer {
    config: RenderConfig,
    subtitles: AssGenerator,
}

impl FfmpegRenderer {
    pub fn new(config: RenderConfig) -> Self {
        let subtitles = AssGenerator::new().with_resolution(config.width, config.height);
        Self { config, subtitles }
    }

    /// Whether the configured ffmpeg binary runs.
    pub async fn check_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Build the complete ffmpeg argument list for one composition.
    fn compose_args(
        &self,
        images: &[PathBuf],
        audio: &AudioAsset,
        ass_path: &Path,
        output: &Path,
    ) -> Vec<String> {
        let per_image_secs = audio.duration_secs / images.len() as f64;

        let mut args: Vec<String> = vec!["-y".into()];
        for image in images {
            args.extend([
                "-loop".into(),
                "1".into(),
                "-t".into(),
                format!("{per_image_secs:.3}"),
                "-i".into(),
                image.to_string_lossy().into_owned(),
            ]);
        }
        args.extend(["-i".into(), audio.path.to_string_lossy().into_owned()]);

        // Scale-and-crop each still to the output frame, concatenate the
        // segments, then burn the captions in.
        let mut filter = String::new();
        for index in 0..images.len() {
            filter.push_str(&format!(
                "[{index}:v]scale={w}:{h}:force_original_aspect_ratio=increase,\
                 crop={w}:{h},setsar=1[v{index}];",
                w = self.config.width,
                h = self.config.height,
            ));
        }
        for index in 0..images.len() {
            filter.push_str(&format!("[v{index}]"));
        }
        filter.push_str(&format!(
            "concat=n={}:v=1:a=0[slides];[slides]ass={}[v]",
            images.len(),
            ass_path.to_string_lossy(),
        ));

        args.extend([
            "-filter_complex".into(),
            filter,
            "-map".into(),
            "[v]".into(),
            "-map".into(),
            format!("{}:a", images.len()),
            "-c:v".into(),
            "libx264".into(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-r".into(),
            self.config.fps.to_string(),
            "-c:a".into(),
            "aac".into(),
            "-shortest".into(),
            output.to_string_lossy().into_owned(),
        ]);
        args
    }
}

#[async_trait]
impl VideoRenderer for FfmpegRenderer {
    async fn compose(
        &self,
        images: &[PathBuf],
        audio: &AudioAsset,
        captions: &[CaptionEvent],
        artifacts: &ArtifactLifecycle,
    ) -> Result<PathBuf, ClientError> {
        let ass_path = artifacts.create("ass");
        self.subtitles
            .write_to_file(captions, &ass_path)
            .await
            .map_err(|e| ClientError::tool("ass", e.to_string()))?;
        debug!(path = %ass_path.display(), events = captions.len(), "wrote caption file");

        let output = artifacts.create("mp4");
        let args = self.compose_args(images, audio, &ass_path, &output);
        debug!(ffmpeg = %self.config.ffmpeg_path, ?args, "compositing video");

        let result = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let tail: String = stderr.lines().rev().take(5).collect::<Vec<_>>().join(" | ");
            return Err(ClientError::tool("ffmpeg", tail));
        }

        info!(output = %output.display(), images = images.len(), "video composed");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> FfmpegRenderer {
        FfmpegRenderer::new(RenderConfig {
            ffmpeg_path: "ffmpeg".to_string(),
            fps: 24,
            width: 1080,
            height: 1920,
        })
    }

    #[test]
    fn compose_args_build_slideshow_and_burn_captions() {
        let images = vec![PathBuf::from("/tmp/a.png"), PathBuf::from("/tmp/b.png")];
        let audio =
            AudioAsset { path: PathBuf::from("/tmp/voice.mp3"), duration_secs: 20.0 };
        let args =
            renderer().compose_args(&images, &audio, Path::new("/tmp/c.ass"), Path::new("/tmp/out.mp4"));

        // Two looped image inputs of 10s each plus the audio input.
        let loops = args.iter().filter(|a| *a == "-loop").count();
        assert_eq!(loops, 2);
        assert!(args.iter().any(|a| a == "10.000"));
        assert!(args.contains(&"/tmp/voice.mp3".to_string()));

        let filter = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];
        assert!(filter.contains("scale=1080:1920"));
        assert!(filter.contains("concat=n=2:v=1:a=0"));
        assert!(filter.contains("ass=/tmp/c.ass"));

        // Audio is mapped from the input after the image inputs.
        let map_index = args.iter().rposition(|a| a == "-map").unwrap();
        assert_eq!(args[map_index + 1], "2:a");
        assert_eq!(args.last().unwrap(), "/tmp/out.mp4");
    }

    #[test]
    fn single_image_spans_whole_audio() {
        let images = vec![PathBuf::from("/tmp/a.png")];
        let audio =
            AudioAsset { path: PathBuf::from("/tmp/voice.mp3"), duration_secs: 7.5 };
        let args =
            renderer().compose_args(&images, &audio, Path::new("/tmp/c.ass"), Path::new("/tmp/out.mp4"));
        assert!(args.iter().any(|a| a == "7.500"));
        let filter = &args[args.iter().position(|a| a == "-filter_complex").unwrap() + 1];
        assert!(filter.contains("concat=n=1:v=1:a=0"));
    }
}
