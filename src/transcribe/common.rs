use serde::{Deserialize, Serialize};

/// A transcribed span of speech in the original spoken language.
///
/// Segments come out of the engine time-ordered and non-overlapping; the
/// pipeline trusts that invariant and does not re-validate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start offset in seconds
    pub start: f64,
    /// End offset in seconds
    pub end: f64,
    pub text: String,
}

/// Transcription output: ordered segments plus the source language code,
/// either detected by the engine or forced by the caller's hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub language: String,
}

// Structs for parsing whisper-cpp JSON output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOutput {
    pub result: WhisperCppResult,
    pub transcription: Vec<WhisperCppSegment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppResult {
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppSegment {
    pub timestamps: WhisperCppTimestamps,
    pub offsets: WhisperCppOffsets,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppTimestamps {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperCppOffsets {
    pub from: i64,
    pub to: i64,
}

impl From<WhisperCppOutput> for Transcript {
    fn from(whisper_output: WhisperCppOutput) -> Self {
        let language = whisper_output.result.language;

        let segments: Vec<Segment> = whisper_output
            .transcription
            .into_iter()
            .map(|seg| Segment {
                // Offsets are in milliseconds
                start: seg.offsets.from as f64 / 1000.0,
                end: seg.offsets.to as f64 / 1000.0,
                text: seg.text.trim().to_string(),
            })
            .collect();

        Transcript { segments, language }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whisper_output_maps_offsets_to_seconds() {
        let output = WhisperCppOutput {
            result: WhisperCppResult {
                language: "en".to_string(),
            },
            transcription: vec![WhisperCppSegment {
                timestamps: WhisperCppTimestamps {
                    from: "00:00:01,500".to_string(),
                    to: "00:00:04,000".to_string(),
                },
                offsets: WhisperCppOffsets {
                    from: 1500,
                    to: 4000,
                },
                text: " Hello there. ".to_string(),
            }],
        };

        let transcript = Transcript::from(output);
        assert_eq!(transcript.language, "en");
        assert_eq!(transcript.segments.len(), 1);
        assert_eq!(transcript.segments[0].start, 1.5);
        assert_eq!(transcript.segments[0].end, 4.0);
        assert_eq!(transcript.segments[0].text, "Hello there.");
    }
}
