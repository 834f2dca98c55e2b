//! Venice API client: script, speech, and image generation
//!
//! One `reqwest` client shared across all three capabilities and across
//! concurrent runs; per-run state stays in the pipeline.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::artifacts::ArtifactLifecycle;
use crate::config::VeniceConfig;
use crate::render::ffprobe_duration;

use super::{AudioAsset, ClientError, ImageClient, ScriptClient, SpeechClient};

const SCRIPT_SYSTEM_PROMPT: &str = "You are an expert in creating viral social media scripts. \
    There is only one character, the narrator, so the script is exactly what the narrator will \
    say. Return the script text directly, without sound effects or stage directions.";

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    images: Vec<String>,
}

/// Client for the Venice generation API.
pub struct VeniceClient {
    http: reqwest::Client,
    config: VeniceConfig,
}

impl VeniceClient {
    pub fn new(config: VeniceConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(ClientError::from)?;
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ScriptClient for VeniceClient {
    async fn generate(
        &self,
        content: &str,
        style: &str,
        target_duration_secs: u32,
    ) -> Result<String, ClientError> {
        info!(content, style, "generating script");

        let body = json!({
            "model": self.config.script_model,
            "messages": [
                { "role": "system", "content": SCRIPT_SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": format!(
                        "Create a viral social media script about {content} in the style of \
                         {style} videos. The script should be about {target_duration_secs} \
                         seconds when read aloud."
                    ),
                },
            ],
            "max_tokens": 500,
        });

        let response: ChatResponse = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let script = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();
        debug!(chars = script.len(), "script received");
        Ok(script)
    }
}

#[async_trait]
impl SpeechClient for VeniceClient {
    async fn synthesize(
        &self,
        script: &str,
        artifacts: &ArtifactLifecycle,
    ) -> Result<AudioAsset, ClientError> {
        info!(chars = script.len(), "synthesizing narration");

        let body = json!({
            "model": self.config.tts_model,
            "input": script,
            "voice": self.config.voice,
        });

        let bytes = self
            .http
            .post(self.endpoint("audio/speech"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let path = artifacts.create("mp3");
        tokio::fs::write(&path, &bytes).await?;

        // The timeline math downstream depends on the real audio length,
        // so measure it rather than trusting any estimate.
        let duration_secs = ffprobe_duration(&path).await?;
        info!(path = %path.display(), duration_secs, "narration audio saved");

        Ok(AudioAsset { path, duration_secs })
    }
}

#[async_trait]
impl ImageClient for VeniceClient {
    async fn generate(
        &self,
        content: &str,
        style: &str,
        variant: usize,
        artifacts: &ArtifactLifecycle,
    ) -> Result<PathBuf, ClientError> {
        info!(content, style, variant, "generating image");

        let body = json!({
            "model": self.config.image_model,
            "prompt": format!(
                "A captivating vertical illustration about {content} in the style of {style}, \
                 scene {n} of an ongoing visual sequence.",
                n = variant + 1,
            ),
            "height": 512,
            "width": 512,
            "steps": 20,
            "return_binary": false,
            "hide_watermark": true,
            "format": "png",
        });

        let response: ImageResponse = self
            .http
            .post(self.endpoint("image/generate"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let encoded = response
            .images
            .first()
            .ok_or_else(|| ClientError::Malformed("no image data in response".to_string()))?;
        let data = BASE64
            .decode(encoded)
            .map_err(|e| ClientError::Malformed(format!("invalid image payload: {e}")))?;

        let path = artifacts.create("png");
        tokio::fs::write(&path, &data).await?;
        debug!(path = %path.display(), "image saved");
        Ok(path)
    }
}
