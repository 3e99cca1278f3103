// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Translation pipeline: heterogeneous raw batches in, ordered packed views out.
//!
//! The [`Translator`] groups an incoming batch by topic, resolves each topic's
//! record type against the schema registry, invokes the rewrite engine once per
//! topic group, and reassembles per-record views carrying the original topic
//! and receive time. Output is globally ordered by receive time with natural
//! topic ordering as the tie-break.
//!
//! A translator that was never initialized, or whose registry failed to
//! finalize, runs in passthrough mode: records flow through unchanged as raw
//! views with no schema resolution and no writer invocation.

pub mod order;
pub mod source;

pub use order::natural_cmp;
pub use source::RecordSource;

use crate::core::{DatatypeCatalog, Result, Time, TranslateError};
use crate::schema::{RegistryBuilder, SchemaRegistry};
use crate::writer::{rewrite, PackedRecord, RewriteBatch, SourceRecord};
use std::collections::HashMap;
use std::sync::Arc;

/// Operating mode of a [`Translator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslateMode {
    /// Forward records unchanged; no schema resolution, no rewriting.
    Passthrough,
    /// Rewrite records into packed batches per topic group.
    Rewrite,
}

/// One raw record as delivered by a [`RecordSource`].
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// Topic the record was received on
    pub topic: String,
    /// Logical receive timestamp
    pub receive_time: Time,
    /// Raw encoded bytes
    pub bytes: Vec<u8>,
}

impl RawRecord {
    pub fn new(topic: impl Into<String>, receive_time: Time, bytes: Vec<u8>) -> Self {
        Self {
            topic: topic.into(),
            receive_time,
            bytes,
        }
    }
}

/// The payload of one translated record.
///
/// Packed views share their batch through `Arc`, so the packed buffer and
/// string heap stay alive as long as any view into them is held.
#[derive(Debug, Clone)]
pub enum RecordView {
    /// Unmodified raw bytes (passthrough mode).
    Raw(Vec<u8>),
    /// Index into a shared rewrite batch.
    Packed {
        batch: Arc<RewriteBatch>,
        index: usize,
    },
}

/// One record after translation, with its source identity preserved.
#[derive(Debug, Clone)]
pub struct TranslatedRecord {
    /// Topic the record was received on
    pub topic: String,
    /// Logical receive timestamp from the source
    pub receive_time: Time,
    /// Packed view or forwarded raw bytes
    pub view: RecordView,
}

impl TranslatedRecord {
    /// Zero-copy decoded view, if this record was rewritten.
    pub fn record(&self) -> Option<PackedRecord<'_>> {
        match &self.view {
            RecordView::Packed { batch, index } => batch.record(*index),
            RecordView::Raw(_) => None,
        }
    }

    /// Raw bytes, if this record passed through unmodified.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match &self.view {
            RecordView::Raw(bytes) => Some(bytes),
            RecordView::Packed { .. } => None,
        }
    }
}

/// Groups, rewrites, and orders batches of raw records.
pub struct Translator {
    registry: Option<Arc<SchemaRegistry>>,
    topic_types: HashMap<String, String>,
    mode: TranslateMode,
}

impl Translator {
    /// A translator with no registered schemas, running in passthrough mode.
    pub fn new() -> Self {
        Self {
            registry: None,
            topic_types: HashMap::new(),
            mode: TranslateMode::Passthrough,
        }
    }

    /// Register the schema catalog and topic-to-type map, then switch to
    /// rewrite mode.
    ///
    /// Registration is atomic: if any schema in the catalog fails to compile,
    /// no schema is usable, the translator stays in passthrough mode, and the
    /// registry error is returned so the caller can surface it.
    pub fn initialize(
        &mut self,
        catalog: DatatypeCatalog,
        topic_types: HashMap<String, String>,
    ) -> Result<()> {
        match RegistryBuilder::from_catalog(catalog).finalize() {
            Ok(registry) => {
                self.registry = Some(Arc::new(registry));
                self.topic_types = topic_types;
                self.mode = TranslateMode::Rewrite;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    "schema registration failed; falling back to passthrough"
                );
                self.registry = None;
                self.mode = TranslateMode::Passthrough;
                Err(error)
            }
        }
    }

    /// Current operating mode.
    pub fn mode(&self) -> TranslateMode {
        self.mode
    }

    /// The finalized registry, if initialization succeeded.
    pub fn registry(&self) -> Option<&Arc<SchemaRegistry>> {
        self.registry.as_ref()
    }

    /// Translate a batch, aborting the whole call on any failure.
    ///
    /// Rewrite mode groups records by topic in first-seen order, resolves each
    /// topic's plan, and invokes the writer once per group. Output is sorted by
    /// receive time, ties broken by natural topic order. Within one topic at
    /// one timestamp, input order is preserved.
    pub fn try_translate(&self, records: Vec<RawRecord>) -> Result<Vec<TranslatedRecord>> {
        let mut translated = match self.mode {
            TranslateMode::Passthrough => records
                .into_iter()
                .map(|r| TranslatedRecord {
                    topic: r.topic,
                    receive_time: r.receive_time,
                    view: RecordView::Raw(r.bytes),
                })
                .collect(),
            TranslateMode::Rewrite => self.rewrite_groups(&records)?,
        };

        translated.sort_by(|a, b| {
            a.receive_time
                .cmp(&b.receive_time)
                .then_with(|| natural_cmp(&a.topic, &b.topic))
        });
        Ok(translated)
    }

    /// Translate a batch; on failure emit one diagnostic and return no records.
    pub fn translate(&self, records: Vec<RawRecord>) -> Vec<TranslatedRecord> {
        match self.try_translate(records) {
            Ok(translated) => translated,
            Err(error) => {
                tracing::warn!(error = %error, "translate call aborted");
                Vec::new()
            }
        }
    }

    /// Fetch a time range from `source` and translate it.
    pub fn translate_range(
        &self,
        source: &dyn RecordSource,
        start: Time,
        end: Time,
        topics: &[String],
    ) -> Result<Vec<TranslatedRecord>> {
        let records = source.get_messages(start, end, topics)?;
        self.try_translate(records)
    }

    fn rewrite_groups(&self, records: &[RawRecord]) -> Result<Vec<TranslatedRecord>> {
        let registry = self
            .registry
            .as_ref()
            .ok_or_else(|| TranslateError::registry("translator not initialized"))?;

        // Group indices by topic, preserving first-seen topic order.
        let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
        let mut by_topic: HashMap<&str, usize> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            match by_topic.get(record.topic.as_str()) {
                Some(&g) => groups[g].1.push(i),
                None => {
                    by_topic.insert(record.topic.as_str(), groups.len());
                    groups.push((record.topic.as_str(), vec![i]));
                }
            }
        }

        let mut translated = Vec::with_capacity(records.len());
        for (topic, indices) in &groups {
            let type_name = self
                .topic_types
                .get(*topic)
                .ok_or_else(|| TranslateError::resolution(*topic))?;
            let plan = registry
                .get(type_name)
                .ok_or_else(|| TranslateError::resolution(*topic))?;

            let inputs: Vec<SourceRecord<'_>> = indices
                .iter()
                .map(|&i| SourceRecord {
                    topic: *topic,
                    raw: &records[i].bytes,
                })
                .collect();
            let batch = Arc::new(rewrite(plan, &inputs)?);

            for (slot, &i) in indices.iter().enumerate() {
                translated.push(TranslatedRecord {
                    topic: records[i].topic.clone(),
                    receive_time: records[i].receive_time,
                    view: RecordView::Packed {
                        batch: batch.clone(),
                        index: slot,
                    },
                });
            }
        }
        Ok(translated)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}
