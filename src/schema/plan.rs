// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Compiled read plans for record rewriting.
//!
//! A read plan is the ordered sequence of read-commands executed to decode
//! one record of a given type. Plans are compiled once per record type,
//! validated at registry finalization, and thereafter immutable, so they are
//! safe for concurrent read-only use by parallel writer invocations.
//!
//! Besides the command sequence, a plan carries the derived slot layout: the
//! byte offset and kind of every named field inside the fixed-stride slot
//! block that the writer emits per record.

use crate::core::PrimitiveType;
use std::collections::HashMap;
use std::fmt;

/// Byte size of a reference slot: a `u32` offset plus a `u32` length/count.
pub const REF_SLOT_SIZE: usize = 8;

/// A single read-command in a compiled plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadCommand {
    /// Copy a known number of bytes verbatim (scalar or fixed array of
    /// fixed-width primitives).
    FixedSizeRead {
        /// Field path for the value (e.g., "pose.x")
        field: String,
        /// Total byte width to copy
        width: usize,
    },

    /// Read a length-prefixed UTF-8 string; payload goes to the string heap,
    /// the slot records (heap offset, byte length).
    StringRead {
        /// Field path for the value
        field: String,
    },

    /// Read a length-prefixed non-string blob; payload is appended to the
    /// packed buffer, the slot records (buffer offset, byte length).
    DynamicSizeRead {
        /// Field path for the value
        field: String,
    },

    /// Execute the element commands a fixed number of times; element slots
    /// are laid out inline in the parent slot block.
    ConstantArrayRead {
        /// Field path for the array
        field: String,
        /// Static element count
        count: usize,
        /// Commands decoding one element
        elem: Vec<ReadCommand>,
    },

    /// Read a `u32` element count, then execute the element commands that
    /// many times; element slots are packed into a block appended to the
    /// packed buffer, the slot records (block offset, count).
    DynamicArrayRead {
        /// Field path for the array
        field: String,
        /// Commands decoding one element
        elem: Vec<ReadCommand>,
    },
}

impl ReadCommand {
    /// Field path this command decodes into.
    pub fn field(&self) -> &str {
        match self {
            ReadCommand::FixedSizeRead { field, .. }
            | ReadCommand::StringRead { field }
            | ReadCommand::DynamicSizeRead { field }
            | ReadCommand::ConstantArrayRead { field, .. }
            | ReadCommand::DynamicArrayRead { field, .. } => field,
        }
    }

    /// Bytes this command occupies in its slot block.
    pub fn slot_size(&self) -> usize {
        match self {
            ReadCommand::FixedSizeRead { width, .. } => *width,
            ReadCommand::StringRead { .. } | ReadCommand::DynamicSizeRead { .. } => REF_SLOT_SIZE,
            ReadCommand::ConstantArrayRead { count, elem, .. } => count * stride(elem),
            ReadCommand::DynamicArrayRead { .. } => REF_SLOT_SIZE,
        }
    }
}

/// Total slot-block stride of a command sequence.
pub fn stride(commands: &[ReadCommand]) -> usize {
    commands.iter().map(ReadCommand::slot_size).sum()
}

/// Element shape of an array slot, for typed element access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemKind {
    /// Fixed-width primitive element
    Prim(PrimitiveType),
    /// String element (8-byte heap reference per element)
    Str,
    /// Compound element (inlined nested record)
    Group {
        /// Slot-block stride of one element
        stride: usize,
    },
}

/// Kind of a named field slot inside the fixed-stride block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
    /// Inline fixed-width scalar
    Prim(PrimitiveType),
    /// Inline fixed array of fixed-width primitives
    PrimArray {
        /// Element type
        prim: PrimitiveType,
        /// Static element count
        count: usize,
    },
    /// (heap offset, byte length) reference into the string heap
    Str,
    /// (buffer offset, byte length) reference into the packed buffer
    Blob,
    /// Inline fixed array of non-collapsible elements
    FixedArray {
        /// Static element count
        count: usize,
        /// Element shape
        elem: ElemKind,
        /// Slot bytes per element
        elem_stride: usize,
    },
    /// (buffer offset, element count) reference to a packed element block
    DynArray {
        /// Element shape
        elem: ElemKind,
        /// Slot bytes per element
        elem_stride: usize,
    },
}

/// A named field slot: where one field lives inside a record's slot block.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSlot {
    /// Dotted field path ("pose.position.x" for inlined nested types)
    pub path: String,
    /// Byte offset from the start of the record's slot block
    pub offset: usize,
    /// Slot kind
    pub kind: SlotKind,
}

/// A compiled, immutable read plan for one record type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadPlan {
    type_name: String,
    commands: Vec<ReadCommand>,
    slots: Vec<FieldSlot>,
    slot_index: HashMap<String, usize>,
    stride: usize,
}

impl ReadPlan {
    /// Assemble a plan from compiled parts. Only the compiler builds plans.
    pub(crate) fn from_parts(
        type_name: String,
        commands: Vec<ReadCommand>,
        slots: Vec<FieldSlot>,
    ) -> Self {
        let stride = stride(&commands);
        let slot_index = slots
            .iter()
            .enumerate()
            .map(|(i, s)| (s.path.clone(), i))
            .collect();
        Self {
            type_name,
            commands,
            slots,
            slot_index,
            stride,
        }
    }

    /// Name of the record type this plan decodes.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Ordered command sequence.
    pub fn commands(&self) -> &[ReadCommand] {
        &self.commands
    }

    /// Named field slots, in field order.
    pub fn slots(&self) -> &[FieldSlot] {
        &self.slots
    }

    /// Look up a field slot by dotted path.
    pub fn slot(&self, path: &str) -> Option<&FieldSlot> {
        self.slot_index.get(path).map(|&i| &self.slots[i])
    }

    /// Look up a field slot by index.
    pub fn slot_at(&self, index: usize) -> Option<&FieldSlot> {
        self.slots.get(index)
    }

    /// Fixed byte stride of one record's slot block.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Number of commands in the plan.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check if the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl fmt::Display for ReadPlan {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "ReadPlan for '{}' (stride {} bytes):",
            self.type_name, self.stride
        )?;
        for (idx, cmd) in self.commands.iter().enumerate() {
            writeln!(f, "  {idx:3}: {cmd:?}")?;
        }
        Ok(())
    }
}
