//! Session orchestration
//!
//! This module provides the public API for headmotion. A `MotionSession` owns
//! all per-session state (resolved header, running integral, counters) and
//! exposes the two upstream entry points, `on_header` and `on_frame`, each
//! producing one output row for the sink.

use crate::classifier::{GestureClassifier, ACTION_COLUMNS};
use crate::error::MotionError;
use crate::integrator::RunningIntegral;
use crate::orientation::quaternion_to_euler;
use crate::schema::{ColumnSchema, StreamEvent, StreamHeader, DEFAULT_STREAM};
use crate::sink::RowSink;
use crate::types::{AxisTriple, FieldValue, GestureState, OutputRow, Quaternion, SensorVariant};
use crate::units::convert_angular_rate;
use crate::{HEADMOTION_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output column names appended to quaternion rows when Euler output is on
pub const EULER_COLUMNS: &[&str] = &["Roll", "Pitch", "Yaw"];

/// Behavioral switches for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Stream name the session consumes
    pub stream: String,
    /// Append roll/pitch/yaw (radians) to quaternion frames
    pub append_euler: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            stream: DEFAULT_STREAM.to_string(),
            append_euler: false,
        }
    }
}

/// Snapshot of a session, suitable for reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub producer: String,
    pub producer_version: String,
    pub session_id: Uuid,
    pub stream: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// `None` until a header has been received
    pub variant: Option<SensorVariant>,
    pub columns: Vec<String>,
    pub frames_processed: u64,
    pub frames_classified: u64,
    pub frames_passed_through: u64,
    /// Running integral of angular rate (deg/s summed per frame)
    pub integral: AxisTriple,
    pub last_gesture: Option<GestureState>,
}

/// Stateful processor for one motion stream session.
pub struct MotionSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    options: SessionOptions,
    header: Option<StreamHeader>,
    integral: RunningIntegral,
    frames_processed: u64,
    frames_classified: u64,
    frames_passed_through: u64,
    last_gesture: Option<GestureState>,
}

impl Default for MotionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionSession {
    /// Create a session with default options
    pub fn new() -> Self {
        Self::with_options(SessionOptions::default())
    }

    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            options,
            header: None,
            integral: RunningIntegral::new(),
            frames_processed: 0,
            frames_classified: 0,
            frames_passed_through: 0,
            last_gesture: None,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn header(&self) -> Option<&StreamHeader> {
        self.header.as_ref()
    }

    /// Resolved variant, or `None` before the header arrives
    pub fn variant(&self) -> Option<SensorVariant> {
        self.header.as_ref().map(StreamHeader::variant)
    }

    pub fn integral(&self) -> &RunningIntegral {
        &self.integral
    }

    /// Resolve the stream header and return the header row.
    ///
    /// The row is the declared columns with `Timestamp` prepended, then the
    /// Euler columns when quaternion frames gain them, then `Action1..Action4`.
    /// The action columns are written for every layout; frames that are not
    /// classified simply end before them.
    pub fn on_header<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<OutputRow, MotionError> {
        if self.header.is_some() {
            return Err(MotionError::HeaderAlreadyDeclared);
        }

        let header = StreamHeader::resolve(columns);
        let variant = header.variant();

        match variant {
            SensorVariant::AngularRateTriple => {
                info!("Detected three-axis angular rate stream (dps), gesture classification enabled")
            }
            SensorVariant::AngularRateDual => {
                warn!("Detected two-axis angular rate stream, gesture classification is not supported yet")
            }
            SensorVariant::Quaternion => {
                warn!("Detected quaternion stream, gesture classification is not supported yet")
            }
            SensorVariant::Unknown => warn!(
                "Unrecognized motion header, frames will be logged without classification: {:?}",
                header.columns
            ),
        }

        let mut fields: Vec<FieldValue> =
            header.columns.iter().map(|c| FieldValue::Text(c.clone())).collect();
        if variant == SensorVariant::Quaternion && self.options.append_euler {
            fields.extend(EULER_COLUMNS.iter().map(|&c| FieldValue::from(c)));
        }
        fields.extend(ACTION_COLUMNS.iter().map(|&c| FieldValue::from(c)));

        self.header = Some(header);
        Ok(OutputRow::new(fields))
    }

    /// Process one frame and return the output row.
    ///
    /// Three-axis angular rate frames get the four gesture flags appended; all
    /// other layouts pass through unchanged (quaternion frames optionally gain
    /// Euler angles).
    pub fn on_frame(&mut self, values: Vec<FieldValue>) -> Result<OutputRow, MotionError> {
        let header = self.header.as_ref().ok_or(MotionError::HeaderMissing)?;
        header.check_arity(&values)?;

        let mut fields = values;

        match header.schema {
            ColumnSchema::AngularRateTriple { x, y, z } => {
                let physical = AxisTriple::new(
                    convert_angular_rate(header.numeric(&fields, x)?),
                    convert_angular_rate(header.numeric(&fields, y)?),
                    convert_angular_rate(header.numeric(&fields, z)?),
                );
                let step = self.integral.update(physical);
                let gesture = GestureClassifier::classify(&step.effective);
                let flags = gesture.as_flags();

                debug!(
                    "Action 1: {}. Action 2: {}. Action 3: {}. Action 4: {}.",
                    flags[0], flags[1], flags[2], flags[3]
                );

                fields.extend(flags.iter().map(|&f| FieldValue::Number(f as f64)));
                self.last_gesture = Some(gesture);
                self.frames_classified += 1;
            }
            ColumnSchema::Quaternion { w, x, y, z } if self.options.append_euler => {
                let q = Quaternion::new(
                    header.numeric(&fields, w)?,
                    header.numeric(&fields, x)?,
                    header.numeric(&fields, y)?,
                    header.numeric(&fields, z)?,
                );
                let angles = quaternion_to_euler(&q);
                fields.extend([
                    FieldValue::Number(angles.roll),
                    FieldValue::Number(angles.pitch),
                    FieldValue::Number(angles.yaw),
                ]);
                self.frames_passed_through += 1;
            }
            schema => {
                debug!(
                    "Processing for {} is not supported yet, passing frame through",
                    schema.variant()
                );
                self.frames_passed_through += 1;
            }
        }

        self.frames_processed += 1;
        Ok(OutputRow::new(fields))
    }

    /// Validate an event of this session's stream and route it to
    /// `on_header`/`on_frame`.
    pub fn handle_event(&mut self, event: StreamEvent) -> Result<OutputRow, MotionError> {
        if !self.accepts(&event) {
            return Err(MotionError::StreamMismatch {
                expected: self.options.stream.clone(),
                actual: event.stream().to_string(),
            });
        }
        event.validate()?;

        match event {
            StreamEvent::Header { columns, .. } => self.on_header(&columns),
            StreamEvent::Frame { values, .. } => self.on_frame(values),
        }
    }

    /// Handle an event and write its row to the sink.
    ///
    /// Events for other streams are skipped without validation; returns
    /// whether a row was written.
    pub fn process_event<K: RowSink + ?Sized>(
        &mut self,
        event: StreamEvent,
        sink: &mut K,
    ) -> Result<bool, MotionError> {
        if !self.accepts(&event) {
            debug!("Ignoring {} event for stream '{}'", event.kind(), event.stream());
            return Ok(false);
        }

        let row = self.handle_event(event)?;
        sink.write_row(&row)?;
        Ok(true)
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            producer: PRODUCER_NAME.to_string(),
            producer_version: HEADMOTION_VERSION.to_string(),
            session_id: self.id,
            stream: self.options.stream.clone(),
            started_at: self.started_at,
            ended_at: Utc::now(),
            variant: self.variant(),
            columns: self
                .header
                .as_ref()
                .map(|h| h.columns.clone())
                .unwrap_or_default(),
            frames_processed: self.frames_processed,
            frames_classified: self.frames_classified,
            frames_passed_through: self.frames_passed_through,
            integral: self.integral.sums(),
            last_gesture: self.last_gesture,
        }
    }

    /// Whether the event belongs to the stream this session consumes
    pub fn accepts(&self, event: &StreamEvent) -> bool {
        event.stream() == self.options.stream
    }
}

/// Run a whole event sequence through a fresh session into a sink.
pub fn process_stream<I, K>(
    events: I,
    options: SessionOptions,
    sink: &mut K,
) -> Result<SessionSummary, MotionError>
where
    I: IntoIterator<Item = StreamEvent>,
    K: RowSink + ?Sized,
{
    let mut session = MotionSession::with_options(options);
    for event in events {
        session.process_event(event, sink)?;
    }
    Ok(session.summary())
}
