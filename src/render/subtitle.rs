//! ASS caption generation from a caption timeline
//!
//! One dialogue event per word, styled for vertical short-form video, with
//! a separate style for highlighted words so they pop while spoken.

use std::fmt::Write as FmtWrite;
use std::path::Path;

use anyhow::Result;
use tokio::fs;

use crate::captions::CaptionEvent;

/// Style configuration for ASS captions.
#[derive(Debug, Clone)]
pub struct CaptionStyle {
    /// Style name referenced by dialogue events.
    pub name: String,
    /// Font name.
    pub font_name: String,
    /// Font size.
    pub font_size: u32,
    /// Primary color (AABBGGRR format for ASS).
    pub primary_color: String,
    /// Outline color.
    pub outline_color: String,
    /// Background/shadow color.
    pub back_color: String,
    pub bold: bool,
    /// Outline width.
    pub outline: f32,
    /// Shadow depth.
    pub shadow: f32,
    /// Alignment (numpad style: 1-9).
    pub alignment: u8,
    /// Margin from the vertical edge.
    pub margin_v: u32,
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self {
            name: "Default".to_string(),
            font_name: "Arial".to_string(),
            font_size: 96,
            primary_color: "&H00FFFFFF".to_string(), // White
            outline_color: "&H00000000".to_string(), // Black
            back_color: "&H80000000".to_string(),    // Semi-transparent black
            bold: true,
            outline: 4.0,
            shadow: 1.0,
            alignment: 5, // Dead center
            margin_v: 40,
        }
    }
}

impl CaptionStyle {
    /// Style for highlighted words.
    pub fn highlight() -> Self {
        Self {
            name: "Highlight".to_string(),
            font_size: 104,
            primary_color: "&H0000FFFF".to_string(), // Yellow
            ..Self::default()
        }
    }

    /// Format as an ASS style line.
    fn to_ass_line(&self) -> String {
        format!(
            "Style: {},{},{},{},{},{},{},{},0,0,0,100,100,0,0,1,{},{},{},20,20,{},0",
            self.name,
            self.font_name,
            self.font_size,
            self.primary_color,
            "&H000000FF", // Secondary color (karaoke)
            self.outline_color,
            self.back_color,
            if self.bold { -1 } else { 0 },
            self.outline,
            self.shadow,
            self.alignment,
            self.margin_v
        )
    }
}

/// Generates an ASS document from a caption timeline.
#[derive(Debug, Clone)]
pub struct AssGenerator {
    /// Video resolution (width).
    pub play_res_x: u32,
    /// Video resolution (height).
    pub play_res_y: u32,
    pub base_style: CaptionStyle,
    pub highlight_style: CaptionStyle,
    pub title: String,
}

impl Default for AssGenerator {
    fn default() -> Self {
        Self {
            play_res_x: 1080,
            play_res_y: 1920,
            base_style: CaptionStyle::default(),
            highlight_style: CaptionStyle::highlight(),
            title: "reelforge captions".to_string(),
        }
    }
}

impl AssGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set video resolution.
    #[must_use]
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.play_res_x = width;
        self.play_res_y = height;
        self
    }

    /// Format seconds as an ASS timestamp (H:MM:SS.cc).
    fn format_time(secs: f64) -> String {
        let total_cs = (secs.max(0.0) * 100.0).round() as u64;
        let hours = total_cs / 360_000;
        let minutes = (total_cs % 360_000) / 6_000;
        let seconds = (total_cs % 6_000) / 100;
        let centis = total_cs % 100;
        format!("{hours}:{minutes:02}:{seconds:02}.{centis:02}")
    }

    fn generate_header(&self) -> String {
        let mut header = String::new();

        // Writing to String never fails, so expect is safe
        writeln!(header, "[Script Info]").expect("Writing to String should not fail");
        writeln!(header, "Title: {}", self.title).expect("Writing to String should not fail");
        writeln!(header, "ScriptType: v4.00+").expect("Writing to String should not fail");
        writeln!(header, "PlayResX: {}", self.play_res_x)
            .expect("Writing to String should not fail");
        writeln!(header, "PlayResY: {}", self.play_res_y)
            .expect("Writing to String should not fail");
        writeln!(header, "ScaledBorderAndShadow: yes").expect("Writing to String should not fail");
        writeln!(header).expect("Writing to String should not fail");

        writeln!(header, "[V4+ Styles]").expect("Writing to String should not fail");
        writeln!(
            header,
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
             OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, \
             ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, \
             MarginL, MarginR, MarginV, Encoding"
        )
        .expect("Writing to String should not fail");
        writeln!(header, "{}", self.base_style.to_ass_line())
            .expect("Writing to String should not fail");
        writeln!(header, "{}", self.highlight_style.to_ass_line())
            .expect("Writing to String should not fail");
        writeln!(header).expect("Writing to String should not fail");

        writeln!(header, "[Events]").expect("Writing to String should not fail");
        writeln!(
            header,
            "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text"
        )
        .expect("Writing to String should not fail");

        header
    }

    /// Generate the full ASS document.
    pub fn generate(&self, events: &[CaptionEvent]) -> Result<String> {
        let mut output = self.generate_header();

        for event in events {
            let style =
                if event.highlighted { &self.highlight_style.name } else { &self.base_style.name };

            // Escape special characters for ASS
            let text = event
                .word
                .replace('\\', "\\\\")
                .replace('{', "\\{")
                .replace('}', "\\}")
                .replace('\n', "\\N");

            writeln!(
                output,
                "Dialogue: 0,{},{},{},,0,0,0,,{}",
                Self::format_time(event.start_secs),
                Self::format_time(event.end_secs),
                style,
                text
            )?;
        }

        Ok(output)
    }

    /// Write the ASS document to a file.
    pub async fn write_to_file(&self, events: &[CaptionEvent], path: &Path) -> Result<()> {
        let content = self.generate(events)?;
        fs::write(path, content).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(word: &str, start: f64, end: f64, highlighted: bool) -> CaptionEvent {
        CaptionEvent { word: word.to_string(), start_secs: start, end_secs: end, highlighted }
    }

    #[test]
    fn time_format() {
        assert_eq!(AssGenerator::format_time(0.0), "0:00:00.00");
        assert_eq!(AssGenerator::format_time(1.0), "0:00:01.00");
        assert_eq!(AssGenerator::format_time(61.5), "0:01:01.50");
        assert_eq!(AssGenerator::format_time(3661.5), "1:01:01.50");
    }

    #[test]
    fn generates_header_and_both_styles() {
        let gen = AssGenerator::new();
        let output = gen.generate(&[]).unwrap();
        assert!(output.contains("[Script Info]"));
        assert!(output.contains("PlayResX: 1080"));
        assert!(output.contains("PlayResY: 1920"));
        assert!(output.contains("Style: Default,"));
        assert!(output.contains("Style: Highlight,"));
        assert!(output.contains("[Events]"));
    }

    #[test]
    fn dialogue_uses_highlight_style_for_highlighted_words() {
        let gen = AssGenerator::new();
        let events =
            vec![event("Hello", 0.0, 0.7, true), event("world", 0.7, 1.4, false)];
        let output = gen.generate(&events).unwrap();
        assert!(output.contains("Dialogue: 0,0:00:00.00,0:00:00.70,Highlight,,0,0,0,,Hello"));
        assert!(output.contains("Dialogue: 0,0:00:00.70,0:00:01.40,Default,,0,0,0,,world"));
    }

    #[test]
    fn escapes_ass_control_characters() {
        let gen = AssGenerator::new();
        let events = vec![event("{weird}", 0.0, 1.0, false)];
        let output = gen.generate(&events).unwrap();
        assert!(output.contains("\\{weird\\}"));
    }
}
