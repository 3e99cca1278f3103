// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout robopack.
//!
//! This module provides the foundational types for the library:
//! - [`TranslateError`] - Error taxonomy for schema, registry, write, and
//!   resolution failures
//! - [`FieldSpec`] / [`PrimitiveType`] - Catalog-facing field descriptions
//! - [`Time`] - Logical receive timestamp

pub mod error;
pub mod field;
pub mod time;

pub use error::{Result, TranslateError};
pub use field::{DatatypeCatalog, FieldSpec, PrimitiveType};
pub use time::Time;
