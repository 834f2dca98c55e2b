//! Transcript-aligned caption timing
//!
//! Walks the script tokens and the transcribed words with two cursors,
//! matching each script token against a short forward window of transcript
//! words by text similarity. Matched tokens take the transcript word's
//! timestamps; unmatched tokens get a short synthetic event anchored at the
//! current transcript position so the remaining words stay available for
//! later tokens.

use tracing::debug;

use super::{heuristic, is_highlighted, tokenize, CaptionEvent, TranscribedWord};

/// How many transcript words ahead of the cursor are considered per token.
const MATCH_WINDOW: usize = 10;

/// Minimum similarity for a transcript word to be accepted as a match.
const MATCH_THRESHOLD: f64 = 0.6;

/// Duration assigned to script tokens with no transcript counterpart.
const UNMATCHED_EVENT_SECS: f64 = 0.2;

/// Lowercase a token and drop everything that is not a letter or digit.
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Character-level Levenshtein distance.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Similarity of a script token and a transcript word in `[0, 1]`.
///
/// Exact equality after normalization is 1.0. Very short tokens only match
/// exactly; anything longer falls back to a normalized edit-distance ratio.
fn similarity(script_token: &str, transcript_word: &str) -> f64 {
    let a = normalize(script_token);
    let b = normalize(transcript_word);
    if a == b {
        return 1.0;
    }
    if a.chars().count() <= 2 {
        return 0.0;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    1.0 - (edit_distance(&a, &b) as f64 / longest as f64)
}

/// Align script tokens to transcribed words.
///
/// Falls back to [`heuristic::estimate`] when the transcript is empty or
/// produces no events, using the transcript's observed span when it has one.
pub fn align(script: &str, audio_duration_secs: f64, words: &[TranscribedWord]) -> Vec<CaptionEvent> {
    let tokens = tokenize(script);
    if tokens.is_empty() {
        return Vec::new();
    }
    if words.is_empty() {
        return heuristic::estimate(script, audio_duration_secs);
    }

    let mut events = Vec::with_capacity(tokens.len());
    let mut word_cursor = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        if word_cursor >= words.len() {
            break;
        }

        let window_end = (word_cursor + MATCH_WINDOW).min(words.len());
        let mut best: Option<(usize, f64)> = None;
        for (offset, word) in words[word_cursor..window_end].iter().enumerate() {
            let score = similarity(token.text, &word.text);
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((offset, score));
            }
        }

        let highlighted = is_highlighted(index, token);
        match best {
            Some((offset, score)) if score > MATCH_THRESHOLD => {
                let matched = &words[word_cursor + offset];
                events.push(CaptionEvent {
                    word: token.text.to_string(),
                    start_secs: matched.start_secs,
                    end_secs: matched.end_secs,
                    highlighted,
                });
                word_cursor += offset + 1;
            }
            _ => {
                // Filler token: anchor it at the current word without
                // consuming it, so the same neighborhood can still match
                // the following script tokens.
                let start = words[word_cursor].start_secs;
                events.push(CaptionEvent {
                    word: token.text.to_string(),
                    start_secs: start,
                    end_secs: start + UNMATCHED_EVENT_SECS,
                    highlighted,
                });
            }
        }
    }

    if events.is_empty() {
        debug!("alignment produced no events, falling back to estimated timing");
        let span = words.last().map_or(audio_duration_secs, |w| w.end_secs);
        return heuristic::estimate(script, span);
    }

    // Stable sort keeps the script order on equal starts.
    events.sort_by(|a, b| a.start_secs.total_cmp(&b.start_secs));
    events
}
