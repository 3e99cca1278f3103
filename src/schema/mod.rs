// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema compilation for record rewriting.
//!
//! Turns catalog field lists into validated, ordered read plans:
//! - [`plan`] - read-command sequences and slot layout
//! - [`compiler`] - field list to [`ReadPlan`] compilation
//! - [`registry`] - whole-catalog registration with atomic finalization

pub mod compiler;
pub mod plan;
pub mod registry;

pub use compiler::compile;
pub use plan::{ElemKind, FieldSlot, ReadCommand, ReadPlan, SlotKind, REF_SLOT_SIZE};
pub use registry::{RegistryBuilder, SchemaRegistry};
