//! Word-level caption timing
//!
//! Turns a narration script plus the measured audio duration into an ordered
//! caption timeline. Two strategies:
//! - estimated timing from token weights alone ([`heuristic`])
//! - alignment against a word-level speech transcript ([`aligned`])
//!
//! Both are pure functions and deterministic for a given input.

pub mod aligned;
pub mod heuristic;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A transcribed word with timestamps, as produced by speech recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribedWord {
    pub text: String,
    pub start_secs: f64,
    pub end_secs: f64,
}

/// One caption display event.
///
/// Events are emitted with non-decreasing `start_secs` and `start < end`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionEvent {
    pub word: String,
    pub start_secs: f64,
    pub end_secs: f64,
    /// Emphasized rendering (every fourth word).
    pub highlighted: bool,
}

/// A script token: either a word (including inner apostrophes, so
/// contractions stay whole) or a single punctuation mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub punctuation: bool,
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Group 1: word with optional inner apostrophes. Group 2: one punctuation mark.
    Regex::new(r"(\w[\w']*)|([^\w\s])").expect("token regex is valid")
});

/// Split a script into an ordered word/punctuation token sequence.
///
/// Adjacent words and punctuation are never merged: `"Hello world."` yields
/// `["Hello", "world", "."]`.
pub fn tokenize(script: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .captures_iter(script)
        .filter_map(|cap| {
            if let Some(word) = cap.get(1) {
                Some(Token { text: word.as_str(), punctuation: false })
            } else {
                cap.get(2).map(|mark| Token { text: mark.as_str(), punctuation: true })
            }
        })
        .collect()
}

/// Every fourth script token is highlighted, punctuation never.
pub(crate) fn is_highlighted(index: usize, token: &Token<'_>) -> bool {
    index % 4 == 0 && !token.punctuation
}

/// Produce the caption timeline for a script.
///
/// Uses transcript alignment when a non-empty transcript is available and
/// falls back to weight-based estimation otherwise. Alignment never fails
/// hard: a useless transcript degrades to the estimated timing inside
/// [`aligned::align`].
pub fn synchronize(
    script: &str,
    audio_duration_secs: f64,
    transcript: Option<&[TranscribedWord]>,
) -> Vec<CaptionEvent> {
    match transcript {
        Some(words) if !words.is_empty() => aligned::align(script, audio_duration_secs, words),
        _ => heuristic::estimate(script, audio_duration_secs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_words_and_punctuation() {
        let tokens = tokenize("Hello world.");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["Hello", "world", "."]);
        assert!(!tokens[0].punctuation);
        assert!(tokens[2].punctuation);
    }

    #[test]
    fn tokenize_keeps_contractions_whole() {
        let tokens = tokenize("don't stop, won't quit");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["don't", "stop", ",", "won't", "quit"]);
    }

    #[test]
    fn tokenize_never_merges_adjacent_marks() {
        let tokens = tokenize("wait... what?!");
        let texts: Vec<&str> = tokens.iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["wait", ".", ".", ".", "what", "?", "!"]);
    }

    #[test]
    fn tokenize_empty_script() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   \n\t ").is_empty());
    }

    #[test]
    fn synchronize_prefers_alignment_when_transcript_present() {
        let words = vec![TranscribedWord {
            text: "hello".to_string(),
            start_secs: 0.5,
            end_secs: 1.0,
        }];
        let timeline = synchronize("Hello", 2.0, Some(&words));
        assert_eq!(timeline.len(), 1);
        assert!((timeline[0].start_secs - 0.5).abs() < 1e-9);
    }

    #[test]
    fn synchronize_falls_back_on_empty_transcript() {
        let aligned = synchronize("Hello world", 2.0, Some(&[]));
        let estimated = synchronize("Hello world", 2.0, None);
        assert_eq!(aligned.len(), estimated.len());
        for (a, e) in aligned.iter().zip(&estimated) {
            assert!((a.start_secs - e.start_secs).abs() < 1e-9);
            assert!((a.end_secs - e.end_secs).abs() < 1e-9);
        }
    }
}
