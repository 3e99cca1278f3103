// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Schema registry: record-type name to compiled read plan.
//!
//! The registry is built once per session from a full datatype catalog and
//! finalized before any write. Adding a definition performs no validation
//! (mirroring how catalogs arrive wholesale from the upstream source);
//! [`RegistryBuilder::finalize`] compiles and validates every definition
//! atomically. If any member schema is invalid the whole registry is
//! rejected and holds no usable schemas.
//!
//! A finalized [`SchemaRegistry`] is immutable. Shared behind an `Arc`, it
//! requires no locking: construction happens-before every rewrite call and
//! no schema mutation occurs afterward.

use crate::core::{DatatypeCatalog, FieldSpec, Result, TranslateError};
use crate::schema::compiler::compile;
use crate::schema::plan::ReadPlan;
use std::collections::HashMap;
use std::sync::Arc;

/// Accumulates raw type definitions before finalization.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    definitions: DatatypeCatalog,
}

impl RegistryBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder seeded with a full datatype catalog.
    pub fn from_catalog(catalog: DatatypeCatalog) -> Self {
        Self {
            definitions: catalog,
        }
    }

    /// Add one record-type definition. Does not validate; validation happens
    /// at [`finalize`](Self::finalize). A repeated name replaces the earlier
    /// definition.
    pub fn add_type(
        &mut self,
        name: impl Into<String>,
        fields: Vec<FieldSpec>,
    ) -> &mut Self {
        self.definitions.insert(name.into(), fields);
        self
    }

    /// Number of definitions added so far.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if no definitions were added.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Compile and validate every definition.
    ///
    /// Atomicity: if any schema fails to compile (unknown primitive type,
    /// unresolved or self-referential type reference), the whole registry is
    /// rejected with a [`TranslateError::Registry`] listing every offending
    /// schema, and no plans are produced.
    pub fn finalize(self) -> Result<SchemaRegistry> {
        let mut plans = HashMap::with_capacity(self.definitions.len());
        let mut failures: Vec<String> = Vec::new();

        let mut names: Vec<&String> = self.definitions.keys().collect();
        names.sort();

        for name in names {
            let fields = &self.definitions[name];
            match compile(name, fields, &self.definitions) {
                Ok(plan) => {
                    plans.insert(name.clone(), Arc::new(plan));
                }
                Err(err) => failures.push(err.to_string()),
            }
        }

        if !failures.is_empty() {
            return Err(TranslateError::registry(failures.join("; ")));
        }

        Ok(SchemaRegistry { plans })
    }
}

/// Finalized, immutable mapping from record-type name to compiled plan.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    plans: HashMap<String, Arc<ReadPlan>>,
}

impl SchemaRegistry {
    /// Look up a compiled plan by record-type name.
    pub fn get(&self, type_name: &str) -> Option<&Arc<ReadPlan>> {
        self.plans.get(type_name)
    }

    /// Check if a record type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.plans.contains_key(type_name)
    }

    /// All registered type names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.plans.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered record types.
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }
}
