//! Motion stream schema
//!
//! This module defines the de-vendored input format for motion streams: a named
//! stream declares its columns once in a header event, then delivers frames
//! aligned with that header. It also resolves the declared columns into a
//! sensor variant and the positions of the channels the pipeline reads.

mod adapter;
mod columns;
mod stream_event;

pub use adapter::*;
pub use columns::*;
pub use stream_event::*;
