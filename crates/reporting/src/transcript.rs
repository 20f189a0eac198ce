//! Transcript parsing — splits the call provider's `"Speaker: text"` blob
//! into structured turns for the chat-style summary view.

use serde::{Deserialize, Serialize};

/// One spoken turn of a call transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub speaker: String,
    pub text: String,
}

/// Parse a transcript blob into turns, one per line, splitting each line on
/// its first `": "`. A line without the separator becomes a turn whose
/// speaker is the whole line and whose text is empty — best-effort, never an
/// error. An empty blob yields no turns.
pub fn parse(transcript: &str) -> Vec<TranscriptTurn> {
    transcript
        .lines()
        .map(|line| match line.split_once(": ") {
            Some((speaker, text)) => TranscriptTurn {
                speaker: speaker.to_string(),
                text: text.to_string(),
            },
            None => TranscriptTurn {
                speaker: line.to_string(),
                text: String::new(),
            },
        })
        .collect()
}

/// Absent transcripts (not yet delivered by the provider) parse to an empty
/// sequence rather than an error.
pub fn parse_optional(transcript: Option<&str>) -> Vec<TranscriptTurn> {
    transcript.map(parse).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(speaker: &str, text: &str) -> TranscriptTurn {
        TranscriptTurn {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn splits_speaker_and_text_per_line() {
        let turns = parse("User: hello\nAgent: hi there");
        assert_eq!(turns, vec![turn("User", "hello"), turn("Agent", "hi there")]);
    }

    #[test]
    fn empty_transcript_yields_no_turns() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn line_without_separator_keeps_whole_line_as_speaker() {
        let turns = parse("garbage-no-separator");
        assert_eq!(turns, vec![turn("garbage-no-separator", "")]);
    }

    #[test]
    fn splits_only_on_the_first_separator() {
        let turns = parse("Agent: well: it depends");
        assert_eq!(turns, vec![turn("Agent", "well: it depends")]);
    }

    #[test]
    fn absent_transcript_yields_no_turns() {
        assert!(parse_optional(None).is_empty());
        assert_eq!(parse_optional(Some("User: hi")).len(), 1);
    }

    #[test]
    fn reparsing_is_stateless() {
        let blob = "User: one\nAgent: two";
        assert_eq!(parse(blob), parse(blob));
    }
}
