// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Batch record rewriting.
//!
//! Executes compiled read plans over raw encoded records:
//! - [`cursor`] - bounds-checked reads over one staged record
//! - [`staging`] - pooled scratch buffers with release-on-drop
//! - [`engine`] - plan execution and capacity planning
//! - [`batch`] - rewrite output and zero-copy record views

pub mod batch;
pub mod cursor;
pub mod engine;
pub mod staging;

pub use batch::{ArrayRef, PackedRecord, RewriteBatch};
pub use cursor::RecordCursor;
pub use engine::{reserve_capacity, rewrite, SourceRecord};
pub use staging::StagingBuffer;
