//! Row sinks
//!
//! Output rows are rendered as flat delimited text: fields in order, separated
//! by `", "`, the last field terminated by a newline, regardless of field type.

use crate::error::MotionError;
use crate::types::OutputRow;
use std::io::Write;

/// Field separator in rendered rows
pub const FIELD_SEPARATOR: &str = ", ";

/// Downstream consumer of output rows
pub trait RowSink {
    /// Write one row. Fails with `MotionError::SinkUnavailable` once the sink
    /// can no longer accept rows.
    fn write_row(&mut self, row: &OutputRow) -> Result<(), MotionError>;
}

impl RowSink for Vec<OutputRow> {
    fn write_row(&mut self, row: &OutputRow) -> Result<(), MotionError> {
        self.push(row.clone());
        Ok(())
    }
}

/// Render a row as a single delimited line, newline included.
/// An empty row renders as a bare newline.
pub fn render_row(row: &OutputRow) -> String {
    let mut line = row
        .fields
        .iter()
        .map(|field| field.to_string())
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);
    line.push('\n');
    line
}

/// Sink writing delimited rows to any `Write`
pub struct DelimitedWriter<W: Write> {
    inner: Option<W>,
    flush_each_row: bool,
    rows_written: u64,
}

impl<W: Write> DelimitedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Some(writer),
            flush_each_row: false,
            rows_written: 0,
        }
    }

    /// Flush the underlying writer after every row
    pub fn with_flush(mut self, flush_each_row: bool) -> Self {
        self.flush_each_row = flush_each_row;
        self
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Flush and detach the writer. Later writes fail with `SinkUnavailable`.
    pub fn close(&mut self) -> Result<Option<W>, MotionError> {
        match self.inner.take() {
            Some(mut writer) => {
                writer.flush()?;
                Ok(Some(writer))
            }
            None => Ok(None),
        }
    }
}

impl<W: Write> RowSink for DelimitedWriter<W> {
    fn write_row(&mut self, row: &OutputRow) -> Result<(), MotionError> {
        let writer = self.inner.as_mut().ok_or(MotionError::SinkUnavailable)?;
        writer.write_all(render_row(row).as_bytes())?;
        if self.flush_each_row {
            writer.flush()?;
        }
        self.rows_written += 1;
        Ok(())
    }
}
