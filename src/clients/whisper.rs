//! Word-level speech recognition via the whisper CLI
//!
//! Runs transcription as a separate OS process so the CPU-heavy work never
//! occupies the async runtime; the owning pipeline run still awaits the
//! result before building its caption timeline. Any failure here degrades
//! caption timing upstream instead of failing the run.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info};

use crate::captions::TranscribedWord;
use crate::config::WhisperConfig;

use super::{AsrClient, ClientError};

/// Whisper JSON output.
#[derive(Debug, Deserialize)]
struct WhisperOutput {
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}

/// Local whisper transcription client.
pub struct WhisperAsr {
    config: WhisperConfig,
}

impl WhisperAsr {
    pub fn new(config: WhisperConfig) -> Self {
        Self { config }
    }

    /// Whether the configured whisper executable runs.
    pub async fn check_available(&self) -> bool {
        Command::new(&self.config.path)
            .arg("--help")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn flatten(output: WhisperOutput) -> Vec<TranscribedWord> {
        output
            .segments
            .into_iter()
            .flat_map(|segment| segment.words)
            .map(|word| TranscribedWord {
                text: word.word.trim().to_string(),
                start_secs: word.start,
                end_secs: word.end,
            })
            .filter(|word| !word.text.is_empty())
            .collect()
    }
}

#[async_trait]
impl AsrClient for WhisperAsr {
    async fn transcribe(&self, audio: &Path) -> Result<Vec<TranscribedWord>, ClientError> {
        let output_dir = audio.parent().unwrap_or_else(|| Path::new("."));

        let args = vec![
            audio.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--word_timestamps".to_string(),
            "True".to_string(),
        ];
        debug!(whisper = %self.config.path, ?args, "running transcription");

        let result = Command::new(&self.config.path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ClientError::tool("whisper", stderr.trim().to_string()));
        }

        let stem = audio
            .file_stem()
            .ok_or_else(|| ClientError::tool("whisper", "audio path has no file stem"))?
            .to_string_lossy();
        let json_path = output_dir.join(format!("{stem}.json"));
        let content = fs::read_to_string(&json_path).await?;
        let _ = fs::remove_file(&json_path).await;
        let parsed: WhisperOutput = serde_json::from_str(&content)
            .map_err(|e| ClientError::Malformed(format!("whisper json: {e}")))?;

        let words = Self::flatten(parsed);
        info!(words = words.len(), "transcription complete");
        Ok(words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_segments_and_trims_words() {
        let raw = r#"{
            "text": " Hello world",
            "language": "en",
            "segments": [
                {
                    "id": 0, "start": 0.0, "end": 1.5, "text": " Hello world",
                    "words": [
                        {"word": " Hello", "start": 0.0, "end": 0.7, "probability": 0.99},
                        {"word": " world", "start": 0.7, "end": 1.5, "probability": 0.98}
                    ]
                }
            ]
        }"#;
        let parsed: WhisperOutput = serde_json::from_str(raw).unwrap();
        let words = WhisperAsr::flatten(parsed);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Hello");
        assert!((words[0].start_secs - 0.0).abs() < 1e-9);
        assert!((words[1].end_secs - 1.5).abs() < 1e-9);
    }

    #[test]
    fn segments_without_words_flatten_to_empty() {
        let raw = r#"{"segments": [{"id": 0, "start": 0.0, "end": 2.0, "text": "no words"}]}"#;
        let parsed: WhisperOutput = serde_json::from_str(raw).unwrap();
        assert!(WhisperAsr::flatten(parsed).is_empty());
    }
}
