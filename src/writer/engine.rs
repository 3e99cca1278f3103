// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Batch rewrite engine.
//!
//! Executes a compiled read plan over a batch of raw encoded records,
//! producing a [`RewriteBatch`]: packed fixed-stride slot blocks plus a
//! separate string heap.
//!
//! Capacity planning is a two-number reservation derived from the batch:
//! the sum of all raw lengths sizes the output arenas, and the largest
//! single record sizes the reusable staging region. Neither arena grows
//! past its reservation: every payload byte is copied at most once and
//! every 4-byte length prefix expands to at most one 8-byte reference, so
//! `record_count * stride + 2 * total_bytes` bounds the packed buffer.

use crate::core::{Result, TranslateError};
use crate::schema::plan::{stride, ReadCommand, ReadPlan};
use crate::writer::batch::RewriteBatch;
use crate::writer::cursor::RecordCursor;
use crate::writer::staging::StagingBuffer;
use byteorder::{ByteOrder, LittleEndian};
use std::sync::Arc;

/// One raw input record: encoded bytes plus the topic it came from.
///
/// The topic is carried only for error attribution; grouping happens in the
/// pipeline before the writer is invoked.
#[derive(Debug, Clone, Copy)]
pub struct SourceRecord<'a> {
    /// Topic the record was received on
    pub topic: &'a str,
    /// Raw encoded bytes of one record
    pub raw: &'a [u8],
}

/// Packed-buffer capacity reserved for a batch.
///
/// `record_count * stride` covers the fixed slot blocks; `2 * total_bytes`
/// covers payload copies and prefix-to-reference expansion.
pub fn reserve_capacity(plan: &ReadPlan, record_count: usize, total_bytes: usize) -> usize {
    record_count * plan.stride() + 2 * total_bytes
}

/// Execute `plan` over `records`, in input order.
///
/// Preconditions: `plan` comes from a finalized registry and every record's
/// bytes encode a value of the plan's type. An empty batch is a no-op
/// returning empty structures. On any malformed record the whole call fails
/// with a [`TranslateError::Write`] naming the offending topic and type; no
/// partial result is returned. The staging region is released on every exit
/// path.
pub fn rewrite(plan: &Arc<ReadPlan>, records: &[SourceRecord<'_>]) -> Result<RewriteBatch> {
    if records.is_empty() {
        return Ok(RewriteBatch::new(
            plan.clone(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ));
    }

    let total_bytes: usize = records.iter().map(|r| r.raw.len()).sum();
    let max_bytes: usize = records.iter().map(|r| r.raw.len()).max().unwrap_or(0);
    let capacity = reserve_capacity(plan, records.len(), total_bytes);

    let mut writer = BatchWriter {
        packed: Vec::with_capacity(capacity),
        heap: Vec::with_capacity(total_bytes),
        offsets: Vec::with_capacity(records.len()),
    };
    // Returned to the pool by Drop, including on the error paths below.
    let mut staging = StagingBuffer::acquire(max_bytes);

    for record in records {
        let staged = staging.stage(record.raw);
        let base = writer.packed.len();
        writer.packed.resize(base + plan.stride(), 0);

        let mut cursor = RecordCursor::new(staged);
        writer
            .exec(plan.commands(), &mut cursor, base)
            .map_err(|e| TranslateError::write(record.topic, plan.type_name(), e.to_string()))?;
        writer.offsets.push(base);
    }

    tracing::debug!(
        type_name = plan.type_name(),
        records = records.len(),
        packed_bytes = writer.packed.len(),
        heap_bytes = writer.heap.len(),
        "rewrote batch"
    );
    debug_assert!(writer.packed.len() <= capacity);

    Ok(RewriteBatch::new(
        plan.clone(),
        writer.packed,
        writer.offsets,
        writer.heap,
    ))
}

struct BatchWriter {
    packed: Vec<u8>,
    heap: Vec<u8>,
    offsets: Vec<usize>,
}

impl BatchWriter {
    /// Execute a command sequence, filling the slot block at `slot_base` and
    /// appending variable payloads to the packed buffer / string heap.
    fn exec(
        &mut self,
        commands: &[ReadCommand],
        cursor: &mut RecordCursor<'_>,
        slot_base: usize,
    ) -> Result<()> {
        let mut slot = slot_base;
        for command in commands {
            match command {
                ReadCommand::FixedSizeRead { width, .. } => {
                    let bytes = cursor.read_bytes(*width)?;
                    self.packed[slot..slot + width].copy_from_slice(bytes);
                    slot += width;
                }
                ReadCommand::StringRead { .. } => {
                    let payload = cursor.read_prefixed_bytes()?;
                    let offset = self.heap.len();
                    self.heap.extend_from_slice(payload);
                    self.write_reference(slot, offset, payload.len())?;
                    slot += 8;
                }
                ReadCommand::DynamicSizeRead { .. } => {
                    let payload = cursor.read_prefixed_bytes()?;
                    let offset = self.packed.len();
                    self.packed.extend_from_slice(payload);
                    self.write_reference(slot, offset, payload.len())?;
                    slot += 8;
                }
                ReadCommand::ConstantArrayRead { count, elem, .. } => {
                    let elem_stride = stride(elem);
                    for i in 0..*count {
                        self.exec(elem, cursor, slot + i * elem_stride)?;
                    }
                    slot += count * elem_stride;
                }
                ReadCommand::DynamicArrayRead { elem, .. } => {
                    let position = cursor.position();
                    let count = cursor.read_u32()? as usize;
                    // Reject counts that cannot possibly fit the remaining
                    // input before reserving element slots.
                    let min_elem = min_wire_size(elem).max(1);
                    if count.saturating_mul(min_elem) > cursor.remaining() {
                        return Err(TranslateError::length_exceeded(
                            count,
                            position,
                            cursor.position() + cursor.remaining(),
                        ));
                    }
                    let elem_stride = stride(elem);
                    let block = self.packed.len();
                    self.packed.resize(block + count * elem_stride, 0);
                    for i in 0..count {
                        self.exec(elem, cursor, block + i * elem_stride)?;
                    }
                    self.write_reference(slot, block, count)?;
                    slot += 8;
                }
            }
        }
        Ok(())
    }

    /// Write a (u32, u32) reference pair into a slot.
    fn write_reference(&mut self, slot: usize, offset: usize, second: usize) -> Result<()> {
        let offset = u32::try_from(offset).map_err(|_| {
            TranslateError::length_exceeded(offset, slot, self.packed.len())
        })?;
        let second = u32::try_from(second).map_err(|_| {
            TranslateError::length_exceeded(second, slot, self.packed.len())
        })?;
        LittleEndian::write_u32(&mut self.packed[slot..slot + 4], offset);
        LittleEndian::write_u32(&mut self.packed[slot + 4..slot + 8], second);
        Ok(())
    }
}

/// Minimum on-wire bytes one execution of `commands` can consume.
fn min_wire_size(commands: &[ReadCommand]) -> usize {
    commands
        .iter()
        .map(|c| match c {
            ReadCommand::FixedSizeRead { width, .. } => *width,
            ReadCommand::StringRead { .. }
            | ReadCommand::DynamicSizeRead { .. }
            | ReadCommand::DynamicArrayRead { .. } => 4,
            ReadCommand::ConstantArrayRead { count, elem, .. } => count * min_wire_size(elem),
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FieldSpec;
    use crate::schema::compile;
    use std::collections::HashMap;

    fn plan_for(name: &str, fields: Vec<FieldSpec>) -> Arc<ReadPlan> {
        Arc::new(compile(name, &fields, &HashMap::new()).unwrap())
    }

    fn le32(v: u32) -> [u8; 4] {
        v.to_le_bytes()
    }

    #[test]
    fn test_rewrite_empty_batch_is_noop() {
        let plan = plan_for("t/Scalar", vec![FieldSpec::scalar("v", "uint32")]);
        let batch = rewrite(&plan, &[]).unwrap();
        assert!(batch.is_empty());
        assert!(batch.packed().is_empty());
        assert!(batch.string_heap().is_empty());
    }

    #[test]
    fn test_rewrite_scalars() {
        let plan = plan_for(
            "t/Pair",
            vec![
                FieldSpec::scalar("a", "uint32"),
                FieldSpec::scalar("b", "float64"),
            ],
        );
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(7)); // a = 7
        raw.extend_from_slice(&3.5f64.to_le_bytes()); // b = 3.5

        let batch = rewrite(&plan, &[SourceRecord { topic: "/p", raw: &raw }]).unwrap();
        assert_eq!(batch.offsets(), &[0]);
        let rec = batch.record(0).unwrap();
        assert_eq!(rec.u32("a"), Some(7));
        assert_eq!(rec.f64("b"), Some(3.5));
    }

    #[test]
    fn test_rewrite_string_goes_to_heap() {
        let plan = plan_for("t/Named", vec![FieldSpec::scalar("name", "string")]);
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(5));
        raw.extend_from_slice(b"hello");

        let batch = rewrite(&plan, &[SourceRecord { topic: "/n", raw: &raw }]).unwrap();
        assert_eq!(batch.string_heap(), b"hello");
        assert_eq!(batch.record(0).unwrap().str("name"), Some("hello"));
    }

    #[test]
    fn test_rewrite_multiple_records_share_heap() {
        let plan = plan_for("t/Named", vec![FieldSpec::scalar("name", "string")]);
        let mut r1 = Vec::new();
        r1.extend_from_slice(&le32(3));
        r1.extend_from_slice(b"foo");
        let mut r2 = Vec::new();
        r2.extend_from_slice(&le32(3));
        r2.extend_from_slice(b"bar");

        let batch = rewrite(
            &plan,
            &[
                SourceRecord { topic: "/n", raw: &r1 },
                SourceRecord { topic: "/n", raw: &r2 },
            ],
        )
        .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.string_heap(), b"foobar");
        assert_eq!(batch.record(0).unwrap().str("name"), Some("foo"));
        assert_eq!(batch.record(1).unwrap().str("name"), Some("bar"));
    }

    #[test]
    fn test_rewrite_dynamic_byte_blob() {
        let plan = plan_for("t/Image", vec![FieldSpec::dynamic_array("data", "uint8")]);
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(4));
        raw.extend_from_slice(&[9, 8, 7, 6]);

        let batch = rewrite(&plan, &[SourceRecord { topic: "/img", raw: &raw }]).unwrap();
        assert_eq!(batch.record(0).unwrap().bytes("data"), Some(&[9, 8, 7, 6][..]));
        // Blob payload lives in the packed buffer, not the heap.
        assert!(batch.string_heap().is_empty());
    }

    #[test]
    fn test_rewrite_dynamic_float_array() {
        let plan = plan_for("t/Scan", vec![FieldSpec::dynamic_array("ranges", "float32")]);
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(3));
        for v in [1.0f32, 2.0, 4.0] {
            raw.extend_from_slice(&v.to_le_bytes());
        }

        let batch = rewrite(&plan, &[SourceRecord { topic: "/scan", raw: &raw }]).unwrap();
        let arr = batch.record(0).unwrap().array("ranges").unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.f32(0), Some(1.0));
        assert_eq!(arr.f32(2), Some(4.0));
        assert_eq!(arr.f32(3), None);
    }

    #[test]
    fn test_rewrite_fixed_primitive_array() {
        let plan = plan_for("t/Cov", vec![FieldSpec::fixed_array("m", "float64", 3)]);
        let mut raw = Vec::new();
        for v in [1.0f64, 2.0, 3.0] {
            raw.extend_from_slice(&v.to_le_bytes());
        }

        let batch = rewrite(&plan, &[SourceRecord { topic: "/c", raw: &raw }]).unwrap();
        let arr = batch.record(0).unwrap().array("m").unwrap();
        assert_eq!(arr.len(), 3);
        assert_eq!(arr.f64(1), Some(2.0));
    }

    #[test]
    fn test_rewrite_dynamic_string_array() {
        let plan = plan_for("t/Names", vec![FieldSpec::dynamic_array("names", "string")]);
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(2)); // count = 2
        raw.extend_from_slice(&le32(2));
        raw.extend_from_slice(b"ab");
        raw.extend_from_slice(&le32(1));
        raw.extend_from_slice(b"c");

        let batch = rewrite(&plan, &[SourceRecord { topic: "/n", raw: &raw }]).unwrap();
        let arr = batch.record(0).unwrap().array("names").unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr.str(0), Some("ab"));
        assert_eq!(arr.str(1), Some("c"));
        assert_eq!(batch.string_heap(), b"abc");
    }

    #[test]
    fn test_rewrite_truncated_record_fails_with_topic() {
        let plan = plan_for("t/Pair", vec![FieldSpec::scalar("a", "uint64")]);
        let raw = [1u8, 2, 3]; // needs 8 bytes

        let err = rewrite(&plan, &[SourceRecord { topic: "/bad", raw: &raw }]).unwrap_err();
        match err {
            TranslateError::Write {
                topic, type_name, ..
            } => {
                assert_eq!(topic, "/bad");
                assert_eq!(type_name, "t/Pair");
            }
            other => panic!("expected Write error, got {other:?}"),
        }
    }

    #[test]
    fn test_rewrite_bogus_array_count_fails() {
        let plan = plan_for("t/Scan", vec![FieldSpec::dynamic_array("ranges", "float32")]);
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(u32::MAX)); // absurd count, no payload

        let err = rewrite(&plan, &[SourceRecord { topic: "/scan", raw: &raw }]).unwrap_err();
        assert!(matches!(err, TranslateError::Write { .. }));
    }

    #[test]
    fn test_rewrite_string_length_past_end_fails() {
        let plan = plan_for("t/Named", vec![FieldSpec::scalar("name", "string")]);
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(50)); // claims 50 bytes
        raw.extend_from_slice(b"short");

        let err = rewrite(&plan, &[SourceRecord { topic: "/n", raw: &raw }]).unwrap_err();
        assert!(err.to_string().contains("/n"));
    }

    #[test]
    fn test_offsets_are_per_record_in_input_order() {
        let plan = plan_for("t/Named", vec![FieldSpec::scalar("name", "string")]);
        let mut records = Vec::new();
        for name in ["a", "bb", "ccc"] {
            let mut raw = Vec::new();
            raw.extend_from_slice(&le32(name.len() as u32));
            raw.extend_from_slice(name.as_bytes());
            records.push(raw);
        }
        let inputs: Vec<SourceRecord> = records
            .iter()
            .map(|raw| SourceRecord { topic: "/n", raw })
            .collect();

        let batch = rewrite(&plan, &inputs).unwrap();
        assert_eq!(batch.offsets().len(), 3);
        for (i, name) in ["a", "bb", "ccc"].iter().enumerate() {
            assert_eq!(batch.record(i).unwrap().str("name"), Some(*name));
        }
    }

    #[test]
    fn test_capacity_bound_holds() {
        let plan = plan_for(
            "t/Mixed",
            vec![
                FieldSpec::scalar("id", "uint32"),
                FieldSpec::scalar("name", "string"),
                FieldSpec::dynamic_array("samples", "float64"),
            ],
        );
        let mut raw = Vec::new();
        raw.extend_from_slice(&le32(1));
        raw.extend_from_slice(&le32(6));
        raw.extend_from_slice(b"sensor");
        raw.extend_from_slice(&le32(2));
        raw.extend_from_slice(&1.5f64.to_le_bytes());
        raw.extend_from_slice(&2.5f64.to_le_bytes());

        let inputs = [
            SourceRecord { topic: "/m", raw: &raw },
            SourceRecord { topic: "/m", raw: &raw },
        ];
        let total: usize = inputs.iter().map(|r| r.raw.len()).sum();
        let batch = rewrite(&plan, &inputs).unwrap();
        assert!(batch.packed().len() <= reserve_capacity(&plan, inputs.len(), total));
    }
}
