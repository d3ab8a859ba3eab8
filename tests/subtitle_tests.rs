//! Subtitle assembler integration tests: document structure and the
//! assembly invariants callers rely on.

use subvox::subtitle::{
    CueSource, SubtitleInput, SubtitleRecord, assemble, compose, write_srt,
};

fn timed_input(n: usize) -> SubtitleInput {
    SubtitleInput::Timed(
        (0..n)
            .map(|i| CueSource {
                text: format!("Segment {}", i),
                start: Some(i as f64 * 2.0),
                end: Some(i as f64 * 2.0 + 1.5),
            })
            .collect(),
    )
}

#[test]
fn timed_assembly_produces_contiguous_well_formed_cues() {
    let cues = assemble(timed_input(7));

    for (i, cue) in cues.iter().enumerate() {
        assert_eq!(cue.index, (i + 1) as u32);
        assert!(cue.start < cue.end, "cue {} has an empty range", cue.index);
    }

    // Monotonic starts for ordered input.
    for pair in cues.windows(2) {
        assert!(pair[0].start <= pair[1].start);
    }
}

#[test]
fn legacy_text_assembly_matches_expected_slots() {
    let cues = assemble(SubtitleInput::Text(
        "Hello world. This is a test. Bye.".to_string(),
    ));

    let contents: Vec<&str> = cues.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["Hello world", "This is a test", "Bye"]);

    let ranges: Vec<(f64, f64)> = cues.iter().map(|c| (c.start, c.end)).collect();
    assert_eq!(ranges, vec![(0.0, 3.0), (3.0, 6.0), (6.0, 9.0)]);
}

#[test]
fn composed_document_is_blank_line_separated() {
    let cues = assemble(timed_input(2));
    let document = compose(&cues);

    let blocks: Vec<&str> = document.trim_end().split("\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].starts_with("1\n00:00:00,000 --> 00:00:01,500\n"));
    assert!(blocks[1].starts_with("2\n00:00:02,000 --> 00:00:03,500\n"));
}

#[test]
fn records_serialize_for_api_responses() {
    let cues = assemble(timed_input(1));
    let record = SubtitleRecord::from(&cues[0]);

    let json = serde_json::to_value(&record).expect("record should serialize");
    assert_eq!(json["time"], "00:00:00,000 --> 00:00:01,500");
    assert_eq!(json["text"], "Segment 0");
    assert_eq!(json["start"], 0.0);
    assert_eq!(json["end"], 1.5);
}

#[tokio::test]
async fn write_srt_persists_the_document() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("out.srt");

    let cues = assemble(SubtitleInput::Text("One. Two.".to_string()));
    write_srt(&cues, &path).await.expect("write should succeed");

    let written = std::fs::read_to_string(&path).expect("file should exist");
    assert_eq!(written, compose(&cues));
    assert!(written.contains("00:00:03,000 --> 00:00:06,000"));
}
