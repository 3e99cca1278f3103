// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for robopack.
//!
//! Provides the error taxonomy for the rewrite pipeline:
//! - Schema compilation
//! - Registry finalization
//! - Batch writes
//! - Topic/type resolution

use std::fmt;

/// Errors that can occur while compiling schemas or rewriting records.
#[derive(Debug, Clone)]
pub enum TranslateError {
    /// A single record-type definition could not be compiled
    Schema {
        /// Record-type name being compiled
        type_name: String,
        /// Validation error message
        reason: String,
    },

    /// Registry-wide validation failure; no schemas are usable
    Registry {
        /// Validation error message
        reason: String,
    },

    /// A record's raw bytes do not match its schema
    Write {
        /// Topic the record came from
        topic: String,
        /// Record-type name of the schema in use
        type_name: String,
        /// Underlying error
        reason: String,
    },

    /// Topic has no known record type or compiled schema
    Resolution {
        /// Topic that could not be resolved
        topic: String,
    },

    /// Staged buffer too short for requested read
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        position: usize,
    },

    /// Length prefix claims more data than the staged buffer holds
    LengthExceeded {
        /// Length that was read
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },
}

impl TranslateError {
    /// Create a schema compilation error.
    pub fn schema(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        TranslateError::Schema {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a registry finalization error.
    pub fn registry(reason: impl Into<String>) -> Self {
        TranslateError::Registry {
            reason: reason.into(),
        }
    }

    /// Create a batch write error.
    pub fn write(
        topic: impl Into<String>,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TranslateError::Write {
            topic: topic.into(),
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a topic resolution error.
    pub fn resolution(topic: impl Into<String>) -> Self {
        TranslateError::Resolution {
            topic: topic.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, position: usize) -> Self {
        TranslateError::BufferTooShort {
            requested,
            available,
            position,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        TranslateError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            TranslateError::Schema { type_name, reason } => {
                vec![("type", type_name.clone()), ("reason", reason.clone())]
            }
            TranslateError::Registry { reason } => vec![("reason", reason.clone())],
            TranslateError::Write {
                topic,
                type_name,
                reason,
            } => vec![
                ("topic", topic.clone()),
                ("type", type_name.clone()),
                ("reason", reason.clone()),
            ],
            TranslateError::Resolution { topic } => vec![("topic", topic.clone())],
            TranslateError::BufferTooShort {
                requested,
                available,
                position,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("position", position.to_string()),
            ],
            TranslateError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
        }
    }
}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranslateError::Schema { type_name, reason } => {
                write!(f, "Invalid schema '{type_name}': {reason}")
            }
            TranslateError::Registry { reason } => {
                write!(f, "Registry validation failed: {reason}")
            }
            TranslateError::Write {
                topic,
                type_name,
                reason,
            } => write!(
                f,
                "Could not write record from '{topic}' with type '{type_name}': {reason}"
            ),
            TranslateError::Resolution { topic } => {
                write!(f, "No record type known for topic '{topic}'")
            }
            TranslateError::BufferTooShort {
                requested,
                available,
                position,
            } => write!(
                f,
                "Buffer too short: requested {requested} bytes at position {position}, but only {available} bytes available"
            ),
            TranslateError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => write!(
                f,
                "Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})"
            ),
        }
    }
}

impl std::error::Error for TranslateError {}

/// Result type for robopack operations.
pub type Result<T> = std::result::Result<T, TranslateError>;
