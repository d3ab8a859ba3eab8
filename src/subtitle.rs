use std::path::Path;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::Result;

/// Slot length assigned to cues that arrive without usable timestamps.
pub const FALLBACK_CUE_SECONDS: f64 = 3.0;

/// One source item for timed assembly. Timing fields are optional; an item
/// missing either end of its range gets an index-based synthetic slot.
#[derive(Debug, Clone)]
pub struct CueSource {
    pub text: String,
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Assembler input, selected explicitly by the caller.
///
/// `Timed` carries segment-like records with their own timestamps. `Text` is
/// the legacy fallback for callers with no timing source: a block of prose
/// split on sentence boundaries into uniform slots.
#[derive(Debug, Clone)]
pub enum SubtitleInput {
    Timed(Vec<CueSource>),
    Text(String),
}

/// A display unit of the subtitle document.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleCue {
    /// 1-based, contiguous
    pub index: u32,
    pub start: f64,
    pub end: f64,
    pub content: String,
}

/// Structured representation of a cue for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitleRecord {
    pub time: String,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl From<&SubtitleCue> for SubtitleRecord {
    fn from(cue: &SubtitleCue) -> Self {
        Self {
            time: format!(
                "{} --> {}",
                format_srt_time(cue.start),
                format_srt_time(cue.end)
            ),
            text: cue.content.clone(),
            start: cue.start,
            end: cue.end,
        }
    }
}

/// Assemble cues from either input mode.
pub fn assemble(input: SubtitleInput) -> Vec<SubtitleCue> {
    match input {
        SubtitleInput::Timed(items) => assemble_timed(items),
        SubtitleInput::Text(text) => assemble_text(&text),
    }
}

fn assemble_timed(items: Vec<CueSource>) -> Vec<SubtitleCue> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            // The synthetic slot depends only on the item's index, not on the
            // actual timing of preceding cues.
            let (start, end) = match (item.start, item.end) {
                (Some(start), Some(end)) => (start, end),
                _ => {
                    let start = i as f64 * FALLBACK_CUE_SECONDS;
                    (start, start + FALLBACK_CUE_SECONDS)
                }
            };

            SubtitleCue {
                index: (i + 1) as u32,
                start,
                end,
                content: item.text.trim().to_string(),
            }
        })
        .collect()
}

fn assemble_text(text: &str) -> Vec<SubtitleCue> {
    text.split(". ")
        .map(|fragment| fragment.trim().trim_end_matches('.').trim())
        .filter(|fragment| !fragment.is_empty())
        .enumerate()
        .map(|(i, fragment)| {
            let start = i as f64 * FALLBACK_CUE_SECONDS;
            SubtitleCue {
                index: (i + 1) as u32,
                start,
                end: start + FALLBACK_CUE_SECONDS,
                content: fragment.to_string(),
            }
        })
        .collect()
}

/// Render cues as an SRT document.
pub fn compose(cues: &[SubtitleCue]) -> String {
    let mut srt_content = String::new();

    for cue in cues {
        srt_content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.content
        ));
    }

    srt_content
}

/// Compose and write an SRT file in one shot. Output size is bounded by a
/// single video's subtitle count, so no incremental write is needed.
pub async fn write_srt<P: AsRef<Path>>(cues: &[SubtitleCue], output_path: P) -> Result<()> {
    let output_path = output_path.as_ref();
    info!("Generating SRT file: {}", output_path.display());

    fs::write(output_path, compose(cues)).await?;

    Ok(())
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }

    #[test]
    fn test_timed_assembly_uses_given_timestamps() {
        let cues = assemble(SubtitleInput::Timed(vec![
            CueSource {
                text: " Hello ".to_string(),
                start: Some(1.25),
                end: Some(2.5),
            },
            CueSource {
                text: "World".to_string(),
                start: Some(2.5),
                end: Some(4.0),
            },
        ]));

        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0].index, 1);
        assert_eq!(cues[0].start, 1.25);
        assert_eq!(cues[0].end, 2.5);
        assert_eq!(cues[0].content, "Hello");
        assert_eq!(cues[1].index, 2);
    }

    #[test]
    fn test_timed_assembly_synthesizes_missing_slots_by_index() {
        let cues = assemble(SubtitleInput::Timed(vec![
            CueSource {
                text: "Hi".to_string(),
                start: Some(1.5),
                end: Some(2.0),
            },
            CueSource {
                text: "Bye".to_string(),
                start: None,
                end: None,
            },
        ]));

        assert_eq!(cues[0].start, 1.5);
        assert_eq!(cues[0].end, 2.0);
        // Second item falls back to i * 3 regardless of the first cue's range.
        assert_eq!(cues[1].start, 3.0);
        assert_eq!(cues[1].end, 6.0);
    }

    #[test]
    fn test_timed_assembly_partial_timestamps_fall_back() {
        let cues = assemble(SubtitleInput::Timed(vec![CueSource {
            text: "Only start".to_string(),
            start: Some(9.0),
            end: None,
        }]));

        assert_eq!(cues[0].start, 0.0);
        assert_eq!(cues[0].end, 3.0);
    }

    #[test]
    fn test_text_assembly_splits_into_uniform_slots() {
        let cues = assemble(SubtitleInput::Text(
            "Hello world. This is a test. Bye.".to_string(),
        ));

        assert_eq!(cues.len(), 3);
        assert_eq!(cues[0].content, "Hello world");
        assert_eq!(cues[1].content, "This is a test");
        assert_eq!(cues[2].content, "Bye");
        assert_eq!((cues[0].start, cues[0].end), (0.0, 3.0));
        assert_eq!((cues[1].start, cues[1].end), (3.0, 6.0));
        assert_eq!((cues[2].start, cues[2].end), (6.0, 9.0));
    }

    #[test]
    fn test_compose_renders_srt_blocks() {
        let cues = vec![SubtitleCue {
            index: 1,
            start: 0.0,
            end: 3.0,
            content: "Hello".to_string(),
        }];

        assert_eq!(compose(&cues), "1\n00:00:00,000 --> 00:00:03,000\nHello\n\n");
    }

    #[test]
    fn test_record_carries_time_range_string() {
        let cue = SubtitleCue {
            index: 1,
            start: 1.5,
            end: 2.0,
            content: "Hi".to_string(),
        };
        let record = SubtitleRecord::from(&cue);

        assert_eq!(record.time, "00:00:01,500 --> 00:00:02,000");
        assert_eq!(record.text, "Hi");
        assert_eq!(record.start, 1.5);
        assert_eq!(record.end, 2.0);
    }
}
