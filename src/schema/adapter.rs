//! Parsing and batch validation of stream events

use crate::error::MotionError;
use crate::schema::columns::StreamHeader;
use crate::schema::stream_event::{StreamEvent, ValidationError};
use crate::types::SensorVariant;
use serde::Serialize;

/// Adapter for reading stream events from their JSON encodings
pub struct StreamEventAdapter;

impl StreamEventAdapter {
    /// Parse a JSON string containing an array of StreamEvents
    pub fn parse_array(json: &str) -> Result<Vec<StreamEvent>, MotionError> {
        let events: Vec<StreamEvent> = serde_json::from_str(json)?;
        Ok(events)
    }

    /// Parse a single NDJSON line; blank lines yield `None`
    pub fn parse_line(line: &str) -> Result<Option<StreamEvent>, MotionError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let event = serde_json::from_str::<StreamEvent>(trimmed)?;
        Ok(Some(event))
    }

    /// Parse NDJSON (newline-delimited JSON) containing StreamEvents
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<StreamEvent>, MotionError> {
        let mut events = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            match Self::parse_line(line) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => continue,
                Err(e) => {
                    return Err(MotionError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(events)
    }

    /// Validate a batch of events, returning only the failures
    pub fn validate_events(events: &[StreamEvent]) -> Vec<ValidationResult> {
        events
            .iter()
            .enumerate()
            .filter_map(|(index, event)| {
                event.validate().err().map(|error| ValidationResult {
                    index,
                    stream: event.stream().to_string(),
                    error,
                })
            })
            .collect()
    }

    /// Replay a batch per stream, in order of first appearance, and report
    /// what a session would reject: frames before the header, repeated
    /// headers and frames whose arity differs from the header.
    pub fn tally_streams(events: &[StreamEvent]) -> Vec<StreamTally> {
        let mut tallies: Vec<StreamTally> = Vec::new();

        for (index, event) in events.iter().enumerate() {
            let slot = match tallies.iter().position(|t| t.stream == event.stream()) {
                Some(slot) => slot,
                None => {
                    tallies.push(StreamTally::new(event.stream()));
                    tallies.len() - 1
                }
            };
            let tally = &mut tallies[slot];

            let rejected = match event {
                StreamEvent::Header { columns, .. } => {
                    tally.headers += 1;
                    if tally.header.is_some() {
                        Some(MotionError::HeaderAlreadyDeclared)
                    } else {
                        let header = StreamHeader::resolve(columns);
                        tally.variant = Some(header.variant());
                        tally.header = Some(header);
                        None
                    }
                }
                StreamEvent::Frame { values, .. } => {
                    tally.frames += 1;
                    match &tally.header {
                        Some(header) => header.check_arity(values).err(),
                        None => Some(MotionError::HeaderMissing),
                    }
                }
            };

            if let Some(error) = rejected {
                tally.sequence_errors.push(SequenceError {
                    index,
                    error: error.to_string(),
                });
            }
        }

        tallies
    }
}

/// Event counts and ordering problems for one stream of a batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamTally {
    pub stream: String,
    pub headers: usize,
    pub frames: usize,
    /// Variant resolved from the first header
    pub variant: Option<SensorVariant>,
    pub sequence_errors: Vec<SequenceError>,
    #[serde(skip)]
    header: Option<StreamHeader>,
}

impl StreamTally {
    fn new(stream: &str) -> Self {
        Self {
            stream: stream.to_string(),
            headers: 0,
            frames: 0,
            variant: None,
            sequence_errors: Vec::new(),
            header: None,
        }
    }
}

/// An event a session would reject, by position in the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceError {
    pub index: usize,
    pub error: String,
}

/// A failed validation within a batch
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub index: usize,
    pub stream: String,
    pub error: ValidationError,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{"event":"header","stream":"mot","columns":["GYROX","GYROY","GYROZ"]}

{"event":"frame","stream":"mot","values":[0.5, 8192, 8192, 8192]}
{"event":"frame","stream":"eeg","values":[]}"#;

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let events = StreamEventAdapter::parse_ndjson(SAMPLE).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].kind(), "header");
        assert_eq!(events[2].stream(), "eeg");
    }

    #[test]
    fn test_parse_ndjson_reports_line() {
        let bad = "{\"event\":\"header\",\"stream\":\"mot\",\"columns\":[]}\nnot json";
        match StreamEventAdapter::parse_ndjson(bad) {
            Err(MotionError::ParseError(msg)) => assert!(msg.contains("line 2")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_parse_array() {
        let json = r#"[{"event":"header","stream":"mot","columns":["Q0","Q1","Q2","Q3"]}]"#;
        let events = StreamEventAdapter::parse_array(json).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_validate_events() {
        let events = StreamEventAdapter::parse_ndjson(SAMPLE).unwrap();
        let failures = StreamEventAdapter::validate_events(&events);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].index, 2);
        assert_eq!(failures[0].stream, "eeg");
    }

    #[test]
    fn test_tally_streams_flags_ordering_problems() {
        let ndjson = r#"{"event":"frame","stream":"mot","values":[0.1, 1, 2, 3]}
{"event":"header","stream":"mot","columns":["GYROX","GYROY","GYROZ"]}
{"event":"header","stream":"eeg","columns":["AF3"]}
{"event":"frame","stream":"mot","values":[0.2, 8192, 8192, 8192]}
{"event":"frame","stream":"mot","values":[0.3, 8192]}
{"event":"header","stream":"mot","columns":["Q0","Q1","Q2","Q3"]}
{"event":"frame","stream":"eeg","values":[0.4, 5]}"#;
        let events = StreamEventAdapter::parse_ndjson(ndjson).unwrap();
        let tallies = StreamEventAdapter::tally_streams(&events);

        assert_eq!(tallies.len(), 2);
        let mot = &tallies[0];
        assert_eq!(mot.stream, "mot");
        assert_eq!((mot.headers, mot.frames), (2, 3));
        assert_eq!(mot.variant, Some(SensorVariant::AngularRateTriple));
        let indices: Vec<usize> = mot.sequence_errors.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 4, 5]);
        assert!(mot.sequence_errors[0].error.contains("before the stream header"));

        let eeg = &tallies[1];
        assert_eq!(eeg.variant, Some(SensorVariant::Unknown));
        assert!(eeg.sequence_errors.is_empty());
    }
}
