//! Stream event definition
//!
//! Upstream data sources deliver two kinds of events for a named stream:
//! - `header`: the ordered column names, sent once per session
//! - `frame`: one ordered list of values aligned with the header
//!
//! On the wire each event is a JSON object tagged by `event`:
//!
//! ```json
//! {"event":"header","stream":"mot","columns":["GYROX","GYROY","GYROZ"]}
//! {"event":"frame","stream":"mot","values":[1690000000.25, 8200, 7782.4, 8683.52]}
//! ```

use crate::types::FieldValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the motion stream
pub const DEFAULT_STREAM: &str = "mot";

/// A single event delivered by the upstream data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    Header { stream: String, columns: Vec<String> },
    Frame { stream: String, values: Vec<FieldValue> },
}

impl StreamEvent {
    pub fn header<S: Into<String>>(stream: S, columns: Vec<String>) -> Self {
        StreamEvent::Header {
            stream: stream.into(),
            columns,
        }
    }

    pub fn frame<S: Into<String>>(stream: S, values: Vec<FieldValue>) -> Self {
        StreamEvent::Frame {
            stream: stream.into(),
            values,
        }
    }

    pub fn stream(&self) -> &str {
        match self {
            StreamEvent::Header { stream, .. } | StreamEvent::Frame { stream, .. } => stream,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Header { .. } => "header",
            StreamEvent::Frame { .. } => "frame",
        }
    }

    /// Validate the event structure
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stream().trim().is_empty() {
            return Err(ValidationError::EmptyStreamName {
                kind: self.kind().to_string(),
            });
        }

        match self {
            StreamEvent::Header { stream, columns } if columns.is_empty() => {
                Err(ValidationError::EmptyHeader {
                    stream: stream.clone(),
                })
            }
            StreamEvent::Header { stream, columns } => {
                match columns.iter().position(|c| c.trim().is_empty()) {
                    Some(index) => Err(ValidationError::BlankColumn {
                        stream: stream.clone(),
                        index,
                    }),
                    None => Ok(()),
                }
            }
            StreamEvent::Frame { stream, values } if values.is_empty() => {
                Err(ValidationError::EmptyFrame {
                    stream: stream.clone(),
                })
            }
            StreamEvent::Frame { .. } => Ok(()),
        }
    }
}

/// Stream event validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Stream name is empty on {kind} event")]
    EmptyStreamName { kind: String },

    #[error("Header for stream '{stream}' declares no columns")]
    EmptyHeader { stream: String },

    #[error("Header for stream '{stream}' has a blank column name at index {index}")]
    BlankColumn { stream: String, index: usize },

    #[error("Frame for stream '{stream}' carries no values")]
    EmptyFrame { stream: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_header() {
        let json = r#"{"event":"header","stream":"mot","columns":["GYROX","GYROY","GYROZ"]}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            StreamEvent::header(
                "mot",
                vec!["GYROX".to_string(), "GYROY".to_string(), "GYROZ".to_string()]
            )
        );
        assert!(event.validate().is_ok());
    }

    #[test]
    fn test_deserialize_frame_mixed_values() {
        let json = r#"{"event":"frame","stream":"mot","values":[1690000000.25, 8200, "marker"]}"#;
        let event: StreamEvent = serde_json::from_str(json).unwrap();
        match &event {
            StreamEvent::Frame { stream, values } => {
                assert_eq!(stream, "mot");
                assert_eq!(values.len(), 3);
                assert_eq!(values[1], FieldValue::Number(8200.0));
                assert_eq!(values[2], FieldValue::Text("marker".to_string()));
            }
            other => panic!("expected frame, got {:?}", other),
        }
    }

    #[test]
    fn test_serialize_round_trip_tag() {
        let event = StreamEvent::frame("mot", vec![FieldValue::Number(1.5)]);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"frame""#));
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(
            StreamEvent::header("", vec!["GYROX".to_string()]).validate(),
            Err(ValidationError::EmptyStreamName {
                kind: "header".to_string()
            })
        );
        assert_eq!(
            StreamEvent::header("mot", Vec::new()).validate(),
            Err(ValidationError::EmptyHeader {
                stream: "mot".to_string()
            })
        );
        assert_eq!(
            StreamEvent::header("mot", vec!["GYROX".to_string(), " ".to_string()]).validate(),
            Err(ValidationError::BlankColumn {
                stream: "mot".to_string(),
                index: 1
            })
        );
        assert_eq!(
            StreamEvent::frame("mot", Vec::new()).validate(),
            Err(ValidationError::EmptyFrame {
                stream: "mot".to_string()
            })
        );
    }
}
