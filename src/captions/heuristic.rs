//! Estimated caption timing from token weights
//!
//! When no transcript is available the audio duration is distributed across
//! the script tokens proportionally to a per-token weight: longer words get
//! more time, punctuation models a short pause, sentence-ending marks a
//! longer one.

use super::{is_highlighted, tokenize, CaptionEvent, Token};

/// Fallback per-token duration when the weight sum is zero.
const FALLBACK_TOKEN_SECS: f64 = 0.3;

/// Relative speaking-time weight of one token.
fn token_weight(token: &Token<'_>) -> f64 {
    if token.punctuation {
        // Sentence-ending marks carry a longer pause than commas etc.
        return match token.text {
            "." | "!" | "?" => 0.8,
            _ => 0.5,
        };
    }
    match token.text.chars().count() {
        0..=2 => 0.7,
        3..=4 => 0.9,
        len => 1.0 + (((len - 5) as f64) * 0.1).min(0.5),
    }
}

/// Distribute `audio_duration_secs` over the script tokens by weight.
///
/// The emitted events tile `[0, audio_duration_secs]` in order; the final
/// event is pinned to the audio duration so accumulated floating-point
/// drift cannot leave a gap at the end.
pub fn estimate(script: &str, audio_duration_secs: f64) -> Vec<CaptionEvent> {
    let tokens = tokenize(script);
    if tokens.is_empty() {
        return Vec::new();
    }

    let total_weight: f64 = tokens.iter().map(token_weight).sum();
    let base = if total_weight > 0.0 {
        audio_duration_secs / total_weight
    } else {
        FALLBACK_TOKEN_SECS
    };

    let mut events = Vec::with_capacity(tokens.len());
    let mut cursor = 0.0_f64;
    for (index, token) in tokens.iter().enumerate() {
        let duration = token_weight(token) * base;
        events.push(CaptionEvent {
            word: token.text.to_string(),
            start_secs: cursor,
            end_secs: cursor + duration,
            highlighted: is_highlighted(index, token),
        });
        cursor += duration;
    }

    if let Some(last) = events.last_mut() {
        last.end_secs = audio_duration_secs;
    }

    events
}
