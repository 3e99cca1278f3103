// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema compiler: ordered field lists to read plans.
//!
//! Each non-constant field contributes one read-command chosen by its shape:
//! fixed-width scalars and fixed arrays of fixed-width primitives become
//! [`ReadCommand::FixedSizeRead`], strings become [`ReadCommand::StringRead`],
//! dynamic single-byte arrays become [`ReadCommand::DynamicSizeRead`], and
//! remaining arrays become constant/dynamic array reads wrapping their
//! element commands.
//!
//! Fields whose type names another record type in the catalog are inlined:
//! the referenced type's commands are appended under dotted field paths
//! ("pose.position.x"). Cycles between type definitions are detected here and
//! reported during registry finalization.

use crate::core::{DatatypeCatalog, FieldSpec, PrimitiveType, Result, TranslateError};
use crate::schema::plan::{stride, ElemKind, FieldSlot, ReadCommand, ReadPlan, SlotKind};
use std::collections::HashMap;

/// Compile one record type against a catalog of definitions.
///
/// `fields` must be the entry for `type_name` in `definitions`; the catalog
/// is consulted to resolve nested type references.
pub fn compile(
    type_name: &str,
    fields: &[FieldSpec],
    definitions: &DatatypeCatalog,
) -> Result<ReadPlan> {
    let mut ctx = Context {
        definitions,
        cache: HashMap::new(),
        visiting: Vec::new(),
    };
    let compiled = ctx.compile_type(type_name, fields)?;
    Ok(ReadPlan::from_parts(
        type_name.to_string(),
        compiled.commands,
        compiled.slots,
    ))
}

/// Commands and named slots for one compiled type, paths relative to the type.
#[derive(Clone)]
struct CompiledType {
    commands: Vec<ReadCommand>,
    slots: Vec<FieldSlot>,
}

struct Context<'a> {
    definitions: &'a DatatypeCatalog,
    cache: HashMap<String, CompiledType>,
    visiting: Vec<String>,
}

impl Context<'_> {
    fn compile_type(&mut self, type_name: &str, fields: &[FieldSpec]) -> Result<CompiledType> {
        if let Some(cached) = self.cache.get(type_name) {
            return Ok(cached.clone());
        }
        if self.visiting.iter().any(|n| n == type_name) {
            return Err(TranslateError::schema(
                type_name,
                format!("self-referential type reference via '{type_name}'"),
            ));
        }
        self.visiting.push(type_name.to_string());

        let mut commands = Vec::with_capacity(fields.len());
        let mut slots = Vec::with_capacity(fields.len());
        let mut offset = 0usize;
        let result = (|| {
            for field in fields {
                if field.is_constant {
                    // Constant fields carry no on-wire data.
                    continue;
                }
                self.compile_field(type_name, field, &mut commands, &mut slots, &mut offset)?;
            }
            Ok(())
        })();
        self.visiting.pop();
        result?;

        let compiled = CompiledType { commands, slots };
        self.cache.insert(type_name.to_string(), compiled.clone());
        Ok(compiled)
    }

    fn compile_field(
        &mut self,
        type_name: &str,
        field: &FieldSpec,
        commands: &mut Vec<ReadCommand>,
        slots: &mut Vec<FieldSlot>,
        offset: &mut usize,
    ) -> Result<()> {
        let path = field.name.clone();

        if let Some(prim) = PrimitiveType::try_from_str(&field.type_name) {
            let (cmd, kind) = Self::primitive_command(&path, prim, field)?;
            let size = cmd.slot_size();
            commands.push(cmd);
            slots.push(FieldSlot {
                path,
                offset: *offset,
                kind,
            });
            *offset += size;
            return Ok(());
        }

        // Not a primitive: resolve as a nested record-type reference.
        let Some(nested_fields) = self.definitions.get(&field.type_name) else {
            return Err(TranslateError::schema(
                type_name,
                format!(
                    "unknown field type \"{}\" for field \"{}\"",
                    field.type_name, field.name
                ),
            ));
        };
        let nested_fields = nested_fields.clone();
        let nested = self.compile_type(&field.type_name, &nested_fields)?;
        let nested_stride = stride(&nested.commands);

        match (field.is_array, field.array_length) {
            (false, _) => {
                // Inline the nested type's commands and slots under this field.
                for cmd in &nested.commands {
                    commands.push(with_prefix(cmd, &path));
                }
                for slot in &nested.slots {
                    slots.push(FieldSlot {
                        path: format!("{path}.{}", slot.path),
                        offset: *offset + slot.offset,
                        kind: slot.kind,
                    });
                }
                *offset += nested_stride;
            }
            (true, Some(count)) => {
                let elem: Vec<ReadCommand> = nested
                    .commands
                    .iter()
                    .map(|c| with_prefix(c, &path))
                    .collect();
                commands.push(ReadCommand::ConstantArrayRead {
                    field: path.clone(),
                    count,
                    elem,
                });
                slots.push(FieldSlot {
                    path,
                    offset: *offset,
                    kind: SlotKind::FixedArray {
                        count,
                        elem: ElemKind::Group {
                            stride: nested_stride,
                        },
                        elem_stride: nested_stride,
                    },
                });
                *offset += count * nested_stride;
            }
            (true, None) => {
                let elem: Vec<ReadCommand> = nested
                    .commands
                    .iter()
                    .map(|c| with_prefix(c, &path))
                    .collect();
                commands.push(ReadCommand::DynamicArrayRead {
                    field: path.clone(),
                    elem,
                });
                slots.push(FieldSlot {
                    path,
                    offset: *offset,
                    kind: SlotKind::DynArray {
                        elem: ElemKind::Group {
                            stride: nested_stride,
                        },
                        elem_stride: nested_stride,
                    },
                });
                *offset += crate::schema::plan::REF_SLOT_SIZE;
            }
        }
        Ok(())
    }

    /// Command and slot kind for a primitive-typed field.
    fn primitive_command(
        path: &str,
        prim: PrimitiveType,
        field: &FieldSpec,
    ) -> Result<(ReadCommand, SlotKind)> {
        let cmd = match (field.is_array, field.array_length, prim) {
            (false, _, PrimitiveType::String) => (
                ReadCommand::StringRead {
                    field: path.to_string(),
                },
                SlotKind::Str,
            ),
            (false, _, p) => {
                // Scalar of known width; size() is Some for every non-string.
                let width = p.size().unwrap_or(0);
                (
                    ReadCommand::FixedSizeRead {
                        field: path.to_string(),
                        width,
                    },
                    SlotKind::Prim(p),
                )
            }
            (true, Some(count), PrimitiveType::String) => (
                ReadCommand::ConstantArrayRead {
                    field: path.to_string(),
                    count,
                    elem: vec![ReadCommand::StringRead {
                        field: path.to_string(),
                    }],
                },
                SlotKind::FixedArray {
                    count,
                    elem: ElemKind::Str,
                    elem_stride: crate::schema::plan::REF_SLOT_SIZE,
                },
            ),
            (true, Some(count), p) => {
                // Fixed arrays of fixed-width primitives collapse into a
                // single verbatim copy.
                let width = p.size().unwrap_or(0);
                (
                    ReadCommand::FixedSizeRead {
                        field: path.to_string(),
                        width: count * width,
                    },
                    SlotKind::PrimArray { prim: p, count },
                )
            }
            (true, None, PrimitiveType::String) => (
                ReadCommand::DynamicArrayRead {
                    field: path.to_string(),
                    elem: vec![ReadCommand::StringRead {
                        field: path.to_string(),
                    }],
                },
                SlotKind::DynArray {
                    elem: ElemKind::Str,
                    elem_stride: crate::schema::plan::REF_SLOT_SIZE,
                },
            ),
            (true, None, p) if p.is_single_byte() => (
                // Dynamic byte arrays stay a single length-prefixed blob.
                ReadCommand::DynamicSizeRead {
                    field: path.to_string(),
                },
                SlotKind::Blob,
            ),
            (true, None, p) => {
                let width = p.size().unwrap_or(0);
                (
                    ReadCommand::DynamicArrayRead {
                        field: path.to_string(),
                        elem: vec![ReadCommand::FixedSizeRead {
                            field: path.to_string(),
                            width,
                        }],
                    },
                    SlotKind::DynArray {
                        elem: ElemKind::Prim(p),
                        elem_stride: width,
                    },
                )
            }
        };
        Ok(cmd)
    }
}

/// Clone a command with its field paths prefixed by `prefix.`.
fn with_prefix(cmd: &ReadCommand, prefix: &str) -> ReadCommand {
    match cmd {
        ReadCommand::FixedSizeRead { field, width } => ReadCommand::FixedSizeRead {
            field: format!("{prefix}.{field}"),
            width: *width,
        },
        ReadCommand::StringRead { field } => ReadCommand::StringRead {
            field: format!("{prefix}.{field}"),
        },
        ReadCommand::DynamicSizeRead { field } => ReadCommand::DynamicSizeRead {
            field: format!("{prefix}.{field}"),
        },
        ReadCommand::ConstantArrayRead { field, count, elem } => ReadCommand::ConstantArrayRead {
            field: format!("{prefix}.{field}"),
            count: *count,
            elem: elem.iter().map(|c| with_prefix(c, prefix)).collect(),
        },
        ReadCommand::DynamicArrayRead { field, elem } => ReadCommand::DynamicArrayRead {
            field: format!("{prefix}.{field}"),
            elem: elem.iter().map(|c| with_prefix(c, prefix)).collect(),
        },
    }
}
