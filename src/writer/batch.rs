// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Rewrite results and zero-copy record views.
//!
//! A [`RewriteBatch`] is the output of one writer invocation: the packed
//! buffer, the per-record offset table, and the string heap. Decoded records
//! are exposed through [`PackedRecord`], which resolves field access by name
//! or slot index against the packed buffer and string heap without copying.

use crate::core::PrimitiveType;
use crate::schema::{ElemKind, FieldSlot, ReadPlan, SlotKind};
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

/// Output of one writer invocation over a single topic group.
#[derive(Debug, Clone)]
pub struct RewriteBatch {
    type_name: String,
    plan: Arc<ReadPlan>,
    packed: Vec<u8>,
    offsets: Vec<usize>,
    heap: Vec<u8>,
}

impl RewriteBatch {
    pub(crate) fn new(
        plan: Arc<ReadPlan>,
        packed: Vec<u8>,
        offsets: Vec<usize>,
        heap: Vec<u8>,
    ) -> Self {
        Self {
            type_name: plan.type_name().to_string(),
            plan,
            packed,
            offsets,
            heap,
        }
    }

    /// Record-type name of every record in this batch.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The compiled plan the batch was written with.
    pub fn plan(&self) -> &Arc<ReadPlan> {
        &self.plan
    }

    /// The packed buffer of decoded fixed-size data and references.
    pub fn packed(&self) -> &[u8] {
        &self.packed
    }

    /// Byte offset of each record's slot block, one entry per input record,
    /// in input order.
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// The contiguous heap holding every string field's bytes (UTF-8).
    pub fn string_heap(&self) -> &[u8] {
        &self.heap
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Check if the batch holds no records.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Zero-copy view of record `index`.
    pub fn record(&self, index: usize) -> Option<PackedRecord<'_>> {
        let base = *self.offsets.get(index)?;
        Some(PackedRecord { batch: self, base })
    }
}

/// Zero-copy view of one decoded record inside a [`RewriteBatch`].
#[derive(Clone, Copy)]
pub struct PackedRecord<'a> {
    batch: &'a RewriteBatch,
    base: usize,
}

impl<'a> PackedRecord<'a> {
    /// Byte offset of this record's slot block in the packed buffer.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Field slot by dotted path.
    pub fn slot(&self, path: &str) -> Option<&'a FieldSlot> {
        self.batch.plan.slot(path)
    }

    /// Field slot by index, following catalog field order.
    pub fn slot_at(&self, index: usize) -> Option<&'a FieldSlot> {
        self.batch.plan.slot_at(index)
    }

    fn prim_bytes(&self, path: &str, prim: PrimitiveType) -> Option<&'a [u8]> {
        let slot = self.slot(path)?;
        if slot.kind != SlotKind::Prim(prim) {
            return None;
        }
        let width = prim.size()?;
        let start = self.base + slot.offset;
        self.batch.packed.get(start..start + width)
    }

    fn reference(&self, path: &str, expected: SlotKind) -> Option<(usize, usize)> {
        let slot = self.slot(path)?;
        if slot.kind != expected {
            return None;
        }
        let start = self.base + slot.offset;
        let bytes = self.batch.packed.get(start..start + 8)?;
        let offset = LittleEndian::read_u32(&bytes[..4]) as usize;
        let second = LittleEndian::read_u32(&bytes[4..]) as usize;
        Some((offset, second))
    }

    /// Read a `bool` field.
    pub fn bool(&self, path: &str) -> Option<bool> {
        self.prim_bytes(path, PrimitiveType::Bool)
            .map(|b| b[0] != 0)
    }

    /// Read a `u8` field (also accepts `byte`).
    pub fn u8(&self, path: &str) -> Option<u8> {
        self.prim_bytes(path, PrimitiveType::UInt8)
            .or_else(|| self.prim_bytes(path, PrimitiveType::Byte))
            .map(|b| b[0])
    }

    /// Read an `i8` field.
    pub fn i8(&self, path: &str) -> Option<i8> {
        self.prim_bytes(path, PrimitiveType::Int8).map(|b| b[0] as i8)
    }

    /// Read a `u16` field.
    pub fn u16(&self, path: &str) -> Option<u16> {
        self.prim_bytes(path, PrimitiveType::UInt16)
            .map(LittleEndian::read_u16)
    }

    /// Read an `i16` field.
    pub fn i16(&self, path: &str) -> Option<i16> {
        self.prim_bytes(path, PrimitiveType::Int16)
            .map(LittleEndian::read_i16)
    }

    /// Read a `u32` field.
    pub fn u32(&self, path: &str) -> Option<u32> {
        self.prim_bytes(path, PrimitiveType::UInt32)
            .map(LittleEndian::read_u32)
    }

    /// Read an `i32` field.
    pub fn i32(&self, path: &str) -> Option<i32> {
        self.prim_bytes(path, PrimitiveType::Int32)
            .map(LittleEndian::read_i32)
    }

    /// Read a `u64` field.
    pub fn u64(&self, path: &str) -> Option<u64> {
        self.prim_bytes(path, PrimitiveType::UInt64)
            .map(LittleEndian::read_u64)
    }

    /// Read an `i64` field.
    pub fn i64(&self, path: &str) -> Option<i64> {
        self.prim_bytes(path, PrimitiveType::Int64)
            .map(LittleEndian::read_i64)
    }

    /// Read an `f32` field.
    pub fn f32(&self, path: &str) -> Option<f32> {
        self.prim_bytes(path, PrimitiveType::Float32)
            .map(LittleEndian::read_f32)
    }

    /// Read an `f64` field.
    pub fn f64(&self, path: &str) -> Option<f64> {
        self.prim_bytes(path, PrimitiveType::Float64)
            .map(LittleEndian::read_f64)
    }

    /// Read a string field from the string heap.
    pub fn str(&self, path: &str) -> Option<&'a str> {
        let (offset, len) = self.reference(path, SlotKind::Str)?;
        let bytes = self.batch.heap.get(offset..offset + len)?;
        std::str::from_utf8(bytes).ok()
    }

    /// Read a dynamic blob field (e.g. `uint8[]`) from the packed buffer.
    pub fn bytes(&self, path: &str) -> Option<&'a [u8]> {
        let (offset, len) = self.reference(path, SlotKind::Blob)?;
        self.batch.packed.get(offset..offset + len)
    }

    /// Access an array field (fixed or dynamic) element-wise.
    pub fn array(&self, path: &str) -> Option<ArrayRef<'a>> {
        let slot = self.slot(path)?;
        match slot.kind {
            SlotKind::PrimArray { prim, count } => Some(ArrayRef {
                batch: self.batch,
                base: self.base + slot.offset,
                count,
                elem: ElemKind::Prim(prim),
                elem_stride: prim.size()?,
            }),
            SlotKind::FixedArray {
                count,
                elem,
                elem_stride,
            } => Some(ArrayRef {
                batch: self.batch,
                base: self.base + slot.offset,
                count,
                elem,
                elem_stride,
            }),
            SlotKind::DynArray { elem, elem_stride } => {
                let start = self.base + slot.offset;
                let bytes = self.batch.packed.get(start..start + 8)?;
                let offset = LittleEndian::read_u32(&bytes[..4]) as usize;
                let count = LittleEndian::read_u32(&bytes[4..]) as usize;
                Some(ArrayRef {
                    batch: self.batch,
                    base: offset,
                    count,
                    elem,
                    elem_stride,
                })
            }
            _ => None,
        }
    }
}

/// Zero-copy element access into an array field.
#[derive(Clone, Copy)]
pub struct ArrayRef<'a> {
    batch: &'a RewriteBatch,
    base: usize,
    count: usize,
    elem: ElemKind,
    elem_stride: usize,
}

impl<'a> ArrayRef<'a> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Element shape.
    pub fn elem_kind(&self) -> ElemKind {
        self.elem
    }

    fn elem_bytes(&self, index: usize, prim: PrimitiveType) -> Option<&'a [u8]> {
        if index >= self.count || self.elem != ElemKind::Prim(prim) {
            return None;
        }
        let start = self.base + index * self.elem_stride;
        self.batch.packed.get(start..start + self.elem_stride)
    }

    /// Read element `index` as `f64`.
    pub fn f64(&self, index: usize) -> Option<f64> {
        self.elem_bytes(index, PrimitiveType::Float64)
            .map(LittleEndian::read_f64)
    }

    /// Read element `index` as `f32`.
    pub fn f32(&self, index: usize) -> Option<f32> {
        self.elem_bytes(index, PrimitiveType::Float32)
            .map(LittleEndian::read_f32)
    }

    /// Read element `index` as `u32`.
    pub fn u32(&self, index: usize) -> Option<u32> {
        self.elem_bytes(index, PrimitiveType::UInt32)
            .map(LittleEndian::read_u32)
    }

    /// Read element `index` as `i32`.
    pub fn i32(&self, index: usize) -> Option<i32> {
        self.elem_bytes(index, PrimitiveType::Int32)
            .map(LittleEndian::read_i32)
    }

    /// Read element `index` as `u64`.
    pub fn u64(&self, index: usize) -> Option<u64> {
        self.elem_bytes(index, PrimitiveType::UInt64)
            .map(LittleEndian::read_u64)
    }

    /// Read string element `index` from the string heap.
    pub fn str(&self, index: usize) -> Option<&'a str> {
        if index >= self.count || self.elem != ElemKind::Str {
            return None;
        }
        let start = self.base + index * self.elem_stride;
        let bytes = self.batch.packed.get(start..start + 8)?;
        let offset = LittleEndian::read_u32(&bytes[..4]) as usize;
        let len = LittleEndian::read_u32(&bytes[4..]) as usize;
        let payload = self.batch.heap.get(offset..offset + len)?;
        std::str::from_utf8(payload).ok()
    }

    /// Packed-buffer offset of compound element `index`'s slot block.
    pub fn elem_base(&self, index: usize) -> Option<usize> {
        if index >= self.count || !matches!(self.elem, ElemKind::Group { .. }) {
            return None;
        }
        Some(self.base + index * self.elem_stride)
    }
}
