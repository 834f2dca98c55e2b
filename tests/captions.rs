//! Caption timing properties over the public API.

use reelforge::captions::{synchronize, TranscribedWord};

fn word(text: &str, start: f64, end: f64) -> TranscribedWord {
    TranscribedWord { text: text.to_string(), start_secs: start, end_secs: end }
}

#[test]
fn estimated_span_matches_audio_duration() {
    let scripts = [
        "turtles swim across oceans guided by magnetic fields",
        "one",
        "a b c d e f g",
    ];
    for script in scripts {
        for duration in [1.0, 12.5, 60.0, 143.7] {
            let timeline = synchronize(script, duration, None);
            let span = timeline.last().unwrap().end_secs;
            assert!(
                (span - duration).abs() <= duration * 1e-6,
                "span {span} vs duration {duration} for {script:?}"
            );
        }
    }
}

#[test]
fn events_are_ordered_and_well_formed() {
    let script = "Wait, really? Yes! The quick brown fox jumps over the lazy dog.";
    for transcript in [
        None,
        Some(vec![
            word("wait", 0.0, 0.4),
            word("really", 0.5, 1.0),
            word("yes", 1.2, 1.5),
            word("the", 1.6, 1.7),
            word("quick", 1.7, 2.1),
            word("brown", 2.1, 2.5),
            word("fox", 2.5, 2.8),
        ]),
    ] {
        let timeline = synchronize(script, 5.0, transcript.as_deref());
        assert!(!timeline.is_empty());
        let mut previous = f64::MIN;
        for event in &timeline {
            assert!(event.start_secs >= previous - 1e-9, "starts must not decrease");
            assert!(event.start_secs < event.end_secs, "event must have positive duration");
            previous = event.start_secs;
        }
    }
}

#[test]
fn highlighting_hits_every_fourth_word() {
    let script = "alpha beta gamma delta epsilon zeta eta theta iota";
    let timeline = synchronize(script, 9.0, None);
    let highlighted: Vec<usize> = timeline
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.highlighted.then_some(i))
        .collect();
    assert_eq!(highlighted, vec![0, 4, 8]);
}

#[test]
fn punctuation_is_never_highlighted() {
    let script = "Go. Go. Go. Go. Go.";
    let timeline = synchronize(script, 5.0, None);
    for event in timeline.iter().filter(|e| e.highlighted) {
        assert!(event.word.chars().any(char::is_alphanumeric));
    }
}

#[test]
fn empty_script_yields_empty_timeline() {
    assert!(synchronize("", 10.0, None).is_empty());
    assert!(synchronize("", 10.0, Some(&[word("stray", 0.0, 1.0)])).is_empty());
}

#[test]
fn empty_transcript_degrades_to_estimation() {
    let estimated = synchronize("Hello brave new world", 8.0, None);
    let degraded = synchronize("Hello brave new world", 8.0, Some(&[]));
    assert_eq!(estimated.len(), degraded.len());
    for (a, b) in estimated.iter().zip(&degraded) {
        assert!((a.start_secs - b.start_secs).abs() < 1e-9);
        assert!((a.end_secs - b.end_secs).abs() < 1e-9);
    }
}

#[test]
fn identical_evenly_spaced_transcript_reproduces_even_timing() {
    let script = "alpha beta gamma delta";
    let total = 8.0;
    let transcript: Vec<TranscribedWord> = ["alpha", "beta", "gamma", "delta"]
        .iter()
        .enumerate()
        .map(|(i, t)| word(t, i as f64 * 2.0, (i + 1) as f64 * 2.0))
        .collect();

    let aligned = synchronize(script, total, Some(&transcript));
    assert_eq!(aligned.len(), 4);
    for (i, event) in aligned.iter().enumerate() {
        assert!((event.start_secs - i as f64 * 2.0).abs() < 1e-9);
        assert!((event.end_secs - (i + 1) as f64 * 2.0).abs() < 1e-9);
    }
}

#[test]
fn unmatched_words_get_short_synthetic_events() {
    // The transcript is missing "the"; it must not consume "fox".
    let transcript = vec![word("fox", 3.0, 3.5)];
    let timeline = synchronize("the fox", 3.5, Some(&transcript));
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[0].word, "the");
    assert!((timeline[0].end_secs - timeline[0].start_secs - 0.2).abs() < 1e-9);
    assert_eq!(timeline[1].word, "fox");
    assert!((timeline[1].start_secs - 3.0).abs() < 1e-9);
}
