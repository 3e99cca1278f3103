// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Robopack
//!
//! Binary record rewrite library for schema-typed robotics log data.
//!
//! Robopack turns variable-layout, length-prefixed log records into a compact,
//! randomly-addressable packed representation that downstream consumers can
//! read without copying or re-parsing:
//! - **Schema compilation** in the [`schema`](crate::schema) module - field
//!   lists become validated, ordered read plans
//! - **Batch rewriting** in the [`writer`](crate::writer) module - raw records
//!   become packed slot blocks plus a string heap
//! - **Translation** in the [`pipeline`](crate::pipeline) module - topic
//!   grouping, schema resolution, and global time ordering
//!
//! ## Architecture
//!
//! - `core/` - error taxonomy, field/primitive model, timestamps
//! - `schema/` - read-command plans, compiler, atomic registry
//! - `writer/` - staging pool, bounds-checked cursor, rewrite engine, views
//! - `pipeline/` - translator, record source trait, natural topic ordering
//!
//! ## Example: Registering schemas and translating a batch
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use robopack::core::{FieldSpec, Time};
//! use robopack::pipeline::{RawRecord, Translator};
//! use std::collections::HashMap;
//!
//! let mut catalog = HashMap::new();
//! catalog.insert(
//!     "sensors/Temp".to_string(),
//!     vec![FieldSpec::scalar("celsius", "float64")],
//! );
//! let mut topics = HashMap::new();
//! topics.insert("/temp".to_string(), "sensors/Temp".to_string());
//!
//! let mut translator = Translator::new();
//! translator.initialize(catalog, topics)?;
//!
//! let raw = 21.5f64.to_le_bytes().to_vec();
//! let out = translator.translate(vec![RawRecord::new("/temp", Time::new(1, 0), raw)]);
//! assert_eq!(out[0].record().and_then(|r| r.f64("celsius")), Some(21.5));
//! # Ok(())
//! # }
//! ```
//!
//! ## Example: Compiling one schema directly
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use robopack::core::FieldSpec;
//! use robopack::schema::RegistryBuilder;
//!
//! let mut builder = RegistryBuilder::new();
//! builder.add_type(
//!     "sensors/Scan",
//!     vec![
//!         FieldSpec::scalar("stamp", "uint64"),
//!         FieldSpec::dynamic_array("ranges", "float32"),
//!     ],
//! );
//! let registry = builder.finalize()?;
//! let plan = registry.get("sensors/Scan").ok_or("missing plan")?;
//! assert_eq!(plan.stride(), 16);
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{DatatypeCatalog, FieldSpec, PrimitiveType, Result, Time, TranslateError};

// Schema compilation
pub mod schema;

pub use schema::{ReadCommand, ReadPlan, RegistryBuilder, SchemaRegistry};

// Batch rewriting
pub mod writer;

pub use writer::{ArrayRef, PackedRecord, RewriteBatch, SourceRecord};

// Translation pipeline
pub mod pipeline;

pub use pipeline::{
    RawRecord, RecordSource, RecordView, TranslateMode, TranslatedRecord, Translator,
};
