//! External collaborator interfaces
//!
//! The orchestrator only sees these traits; the concrete clients
//! ([`venice`], [`whisper`], [`pinata`]) and the ffmpeg renderer implement
//! them. Keeping the seams here lets the pipeline be exercised end to end
//! with in-memory fakes.

pub mod pinata;
pub mod venice;
pub mod whisper;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::artifacts::ArtifactLifecycle;
use crate::captions::{CaptionEvent, TranscribedWord};

/// Failure of one collaborator call.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} failed: {message}")]
    Tool { tool: String, message: String },
}

impl ClientError {
    /// Whether a retry could plausibly succeed. Only connectivity problems
    /// and server-side errors qualify; malformed responses and client
    /// errors never do.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Connect(_) => true,
            Self::Status(code) => (500..=599).contains(code),
            Self::Malformed(_) | Self::Io(_) | Self::Tool { .. } => false,
        }
    }

    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Connect(e.to_string())
        }
    }
}

/// Synthesized narration audio with its measured duration.
#[derive(Debug, Clone)]
pub struct AudioAsset {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Generates the narration script for a topic and style.
#[async_trait]
pub trait ScriptClient: Send + Sync {
    async fn generate(
        &self,
        content: &str,
        style: &str,
        target_duration_secs: u32,
    ) -> Result<String, ClientError>;
}

/// Synthesizes narration speech from a script.
///
/// The produced file is registered with the run's artifact lifecycle and
/// the duration is measured from the audio itself.
#[async_trait]
pub trait SpeechClient: Send + Sync {
    async fn synthesize(
        &self,
        script: &str,
        artifacts: &ArtifactLifecycle,
    ) -> Result<AudioAsset, ClientError>;
}

/// Generates one supporting image; `variant` distinguishes the prompts of
/// the images within a single run.
#[async_trait]
pub trait ImageClient: Send + Sync {
    async fn generate(
        &self,
        content: &str,
        style: &str,
        variant: usize,
        artifacts: &ArtifactLifecycle,
    ) -> Result<PathBuf, ClientError>;
}

/// Word-level speech recognition. Optional: absence or failure degrades
/// caption timing, never the run.
#[async_trait]
pub trait AsrClient: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<TranscribedWord>, ClientError>;
}

/// Composes images, narration audio, and the caption timeline into the
/// final video artifact.
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn compose(
        &self,
        images: &[PathBuf],
        audio: &AudioAsset,
        captions: &[CaptionEvent],
        artifacts: &ArtifactLifecycle,
    ) -> Result<PathBuf, ClientError>;
}

/// Content-addressed publication. Both operations carry the publication
/// retry policy inside the implementation.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn upload_file(&self, path: &Path, name: &str) -> Result<String, ClientError>;
    async fn upload_json(&self, doc: &serde_json::Value) -> Result<String, ClientError>;
}
