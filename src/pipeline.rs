//! Generation pipeline orchestration
//!
//! One [`Pipeline::generate`] call is one run: script → narration →
//! imagery → caption timeline → video composition → publication. Stages
//! run strictly in order, every intermediate artifact is owned by the
//! run's [`ArtifactLifecycle`], and any stage failure releases those
//! artifacts before the error reaches the caller.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use crate::artifacts::ArtifactLifecycle;
use crate::captions;
use crate::clients::{
    AsrClient, ClientError, ContentStore, ImageClient, ScriptClient, SpeechClient, VideoRenderer,
};
use crate::error::{PipelineError, Stage};

/// One video generation request. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The topic of the video.
    pub content: String,
    /// The presentation style.
    pub style: String,
    /// Target narration length in seconds.
    pub target_duration_secs: u32,
    /// Optional ticker symbol carried into the metadata document.
    pub ticker: Option<String>,
    /// Optional description override for the metadata document.
    pub description: Option<String>,
    /// Explicit image count; derived from the audio duration when unset.
    pub image_count: Option<usize>,
}

impl GenerationRequest {
    pub fn new(content: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: style.into(),
            target_duration_secs: 60,
            ticker: None,
            description: None,
            image_count: None,
        }
    }

    fn validate(&self) -> Result<(), PipelineError> {
        if self.content.trim().is_empty() {
            return Err(PipelineError::InvalidRequest("content must not be empty".to_string()));
        }
        if self.style.trim().is_empty() {
            return Err(PipelineError::InvalidRequest("style must not be empty".to_string()));
        }
        if self.target_duration_secs == 0 {
            return Err(PipelineError::InvalidRequest(
                "target duration must be positive".to_string(),
            ));
        }
        if self.image_count == Some(0) {
            return Err(PipelineError::InvalidRequest(
                "image count must be positive when given".to_string(),
            ));
        }
        Ok(())
    }
}

/// Terminal output of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub metadata_uri: String,
    pub video_uri: String,
    pub script: String,
    pub thumbnail_uri: Option<String>,
}

/// One image per started 10 seconds of narration, never fewer than one.
pub fn image_count_for(audio_duration_secs: f64) -> usize {
    ((audio_duration_secs / 10.0).floor() as usize + 1).max(1)
}

/// The generation pipeline over its external collaborators.
///
/// Collaborators are process-wide and shared between concurrent runs; all
/// per-run state lives inside `generate`.
pub struct Pipeline {
    script: Arc<dyn ScriptClient>,
    speech: Arc<dyn SpeechClient>,
    images: Arc<dyn ImageClient>,
    asr: Option<Arc<dyn AsrClient>>,
    renderer: Arc<dyn VideoRenderer>,
    store: Arc<dyn ContentStore>,
}

impl Pipeline {
    pub fn new(
        script: Arc<dyn ScriptClient>,
        speech: Arc<dyn SpeechClient>,
        images: Arc<dyn ImageClient>,
        renderer: Arc<dyn VideoRenderer>,
        store: Arc<dyn ContentStore>,
    ) -> Self {
        Self { script, speech, images, asr: None, renderer, store }
    }

    /// Enable transcript-aligned caption timing.
    #[must_use]
    pub fn with_asr(mut self, asr: Arc<dyn AsrClient>) -> Self {
        self.asr = Some(asr);
        self
    }

    /// Run the full pipeline for one request.
    ///
    /// Artifacts are released on every exit path; the release is idempotent
    /// and additionally guaranteed by the lifecycle's `Drop` should this
    /// future be cancelled mid-stage.
    pub async fn generate(&self, request: GenerationRequest) -> Result<PipelineResult, PipelineError> {
        request.validate()?;

        let artifacts = ArtifactLifecycle::new().map_err(|e| {
            PipelineError::InvariantViolation(format!("could not create artifact directory: {e}"))
        })?;

        let result = self.run(&request, &artifacts).await;
        artifacts.release_all();

        match &result {
            Ok(done) => info!(metadata_uri = %done.metadata_uri, "run complete"),
            Err(e) => warn!(error = %e, "run failed"),
        }
        result
    }

    async fn run(
        &self,
        request: &GenerationRequest,
        artifacts: &ArtifactLifecycle,
    ) -> Result<PipelineResult, PipelineError> {
        info!(stage = %Stage::Script, content = %request.content, style = %request.style, "generating script");
        let script = self
            .script
            .generate(&request.content, &request.style, request.target_duration_secs)
            .await
            .map_err(|source| PipelineError::UpstreamGeneration { stage: Stage::Script, source })?;
        if script.trim().is_empty() {
            return Err(PipelineError::UpstreamGeneration {
                stage: Stage::Script,
                source: ClientError::Malformed("empty script".to_string()),
            });
        }

        info!(stage = %Stage::Speech, "synthesizing narration");
        let audio = self
            .speech
            .synthesize(&script, artifacts)
            .await
            .map_err(|source| PipelineError::UpstreamGeneration { stage: Stage::Speech, source })?;

        let requested = request.image_count.unwrap_or_else(|| image_count_for(audio.duration_secs));
        info!(stage = %Stage::Image, count = requested, "generating imagery");

        // Degraded-fallback policy: one bad image is dropped with a
        // warning, only a fully failed set aborts the run.
        let mut images: Vec<PathBuf> = Vec::with_capacity(requested);
        let mut last_failure: Option<ClientError> = None;
        for variant in 0..requested {
            match self.images.generate(&request.content, &request.style, variant, artifacts).await {
                Ok(path) => images.push(path),
                Err(e) => {
                    warn!(variant, error = %e, "image generation failed, continuing without it");
                    last_failure = Some(e);
                }
            }
        }
        if images.is_empty() {
            return match last_failure {
                Some(source) => {
                    Err(PipelineError::UpstreamGeneration { stage: Stage::Image, source })
                }
                None => Err(PipelineError::InvariantViolation(
                    "no images requested for rendering".to_string(),
                )),
            };
        }

        info!(stage = %Stage::Captions, "building caption timeline");
        let transcript = match &self.asr {
            Some(asr) => match asr.transcribe(&audio.path).await {
                Ok(words) if !words.is_empty() => Some(words),
                Ok(_) => {
                    warn!("transcript came back empty, using estimated caption timing");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "transcription failed, using estimated caption timing");
                    None
                }
            },
            None => None,
        };
        let timeline = captions::synchronize(&script, audio.duration_secs, transcript.as_deref());

        info!(stage = %Stage::Render, images = images.len(), events = timeline.len(), "composing video");
        let video = self
            .renderer
            .compose(&images, &audio, &timeline, artifacts)
            .await
            .map_err(PipelineError::Rendering)?;

        info!(stage = %Stage::Publish, "publishing artifacts");
        let thumbnail_uri = match images.first() {
            Some(image) => Some(
                self.store
                    .upload_file(image, "thumbnail.png")
                    .await
                    .map_err(PipelineError::Publication)?,
            ),
            None => None,
        };
        let video_uri = self
            .store
            .upload_file(&video, "video.mp4")
            .await
            .map_err(PipelineError::Publication)?;

        let metadata = build_metadata(request, &video_uri, thumbnail_uri.as_deref());
        let metadata_uri =
            self.store.upload_json(&metadata).await.map_err(PipelineError::Publication)?;

        Ok(PipelineResult { metadata_uri, video_uri, script, thumbnail_uri })
    }
}

/// The metadata document published alongside the video.
fn build_metadata(
    request: &GenerationRequest,
    video_uri: &str,
    thumbnail_uri: Option<&str>,
) -> serde_json::Value {
    let description = request.description.clone().unwrap_or_else(|| {
        format!("A narrated video about {} in the style of {}", request.content, request.style)
    });

    let mut attributes = vec![
        json!({ "trait_type": "Content", "value": request.content }),
        json!({ "trait_type": "Style", "value": request.style }),
        json!({ "trait_type": "Generator", "value": "reelforge" }),
    ];
    if let Some(ticker) = &request.ticker {
        attributes.push(json!({ "trait_type": "Ticker", "value": ticker }));
    }

    json!({
        "name": format!("{} - {}", request.content, request.style),
        "description": description,
        "image": thumbnail_uri.unwrap_or(video_uri),
        "animation_url": video_uri,
        "attributes": attributes,
        "created_at": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_count_follows_audio_duration() {
        assert_eq!(image_count_for(25.4), 3);
        assert_eq!(image_count_for(9.9), 1);
        assert_eq!(image_count_for(10.0), 2);
        assert_eq!(image_count_for(0.0), 1);
        assert_eq!(image_count_for(60.0), 7);
    }

    #[test]
    fn request_validation() {
        assert!(GenerationRequest::new("Turtles", "Nature Documentary").validate().is_ok());
        assert!(GenerationRequest::new("", "x").validate().is_err());
        assert!(GenerationRequest::new("x", "  ").validate().is_err());

        let mut request = GenerationRequest::new("x", "y");
        request.target_duration_secs = 0;
        assert!(request.validate().is_err());

        let mut request = GenerationRequest::new("x", "y");
        request.image_count = Some(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn metadata_references_both_uris_and_ticker() {
        let mut request = GenerationRequest::new("Chernobyl", "Minecraft Parkour");
        request.ticker = Some("CHRN".to_string());

        let doc = build_metadata(&request, "ipfs://video", Some("ipfs://thumb"));
        assert_eq!(doc["image"], "ipfs://thumb");
        assert_eq!(doc["animation_url"], "ipfs://video");
        assert_eq!(doc["name"], "Chernobyl - Minecraft Parkour");
        let attributes = doc["attributes"].as_array().unwrap();
        assert!(attributes.iter().any(|a| a["trait_type"] == "Ticker" && a["value"] == "CHRN"));
    }

    #[test]
    fn metadata_falls_back_to_video_uri_without_thumbnail() {
        let request = GenerationRequest::new("Turtles", "Soap Cutting");
        let doc = build_metadata(&request, "ipfs://video", None);
        assert_eq!(doc["image"], "ipfs://video");
        assert!(doc["description"].as_str().unwrap().contains("Turtles"));
    }
}
