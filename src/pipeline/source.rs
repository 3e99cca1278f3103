// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Upstream record source interface.

use crate::core::{Result, Time};
use crate::pipeline::RawRecord;

/// A provider of raw records for a time range.
///
/// Implementations fetch from wherever records live (a log reader, a playback
/// buffer, a test fixture) and return them with topic and receive time
/// attached. The translator does not care about ordering here; it re-orders
/// after rewriting.
pub trait RecordSource {
    /// Fetch all records on `topics` received in `[start, end]`.
    fn get_messages(&self, start: Time, end: Time, topics: &[String]) -> Result<Vec<RawRecord>>;
}
