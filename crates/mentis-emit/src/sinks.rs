use std::io::Write;

use mentis_core::models::batch::DocumentBatch;
use mentis_core::models::record::CanonicalRecord;
use tracing::info;

use crate::error::EmitError;

/// Downstream storage for finished batches. Implementations receive a
/// shared, immutable batch and must not assume exclusive ownership.
pub trait PersistenceSink: Send {
    fn accept_batch(&mut self, batch: &DocumentBatch) -> Result<(), EmitError>;
}

/// Quality-control consumer: the same batch plus the subset of records
/// whose validity is flagged.
pub trait ReportingSink: Send {
    fn accept_summary(
        &mut self,
        batch: &DocumentBatch,
        flagged: &[CanonicalRecord],
    ) -> Result<(), EmitError>;
}

/// Hand a finished batch to both collaborators: the full record batch
/// to persistence, then findings and the flagged subset to reporting.
pub fn dispatch(
    batch: &DocumentBatch,
    persistence: &mut dyn PersistenceSink,
    reporting: &mut dyn ReportingSink,
) -> Result<(), EmitError> {
    persistence.accept_batch(batch)?;

    let flagged: Vec<CanonicalRecord> = batch
        .flagged_records()
        .into_iter()
        .cloned()
        .collect();
    reporting.accept_summary(batch, &flagged)?;

    info!(
        batch_id = %batch.batch_id,
        subject_id = %batch.subject.subject_id,
        records = batch.records.len(),
        flagged = flagged.len(),
        findings = batch.findings.len(),
        "batch dispatched"
    );
    Ok(())
}

/// In-memory sink for tests and dry runs. Implements both collaborator
/// roles.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub batches: Vec<DocumentBatch>,
    pub flagged: Vec<CanonicalRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceSink for MemorySink {
    fn accept_batch(&mut self, batch: &DocumentBatch) -> Result<(), EmitError> {
        self.batches.push(batch.clone());
        Ok(())
    }
}

impl ReportingSink for MemorySink {
    fn accept_summary(
        &mut self,
        _batch: &DocumentBatch,
        flagged: &[CanonicalRecord],
    ) -> Result<(), EmitError> {
        self.flagged.extend_from_slice(flagged);
        Ok(())
    }
}

/// Writes each canonical record as one JSON line, for file or pipe
/// ingestion downstream.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> PersistenceSink for JsonLinesSink<W> {
    fn accept_batch(&mut self, batch: &DocumentBatch) -> Result<(), EmitError> {
        for record in &batch.records {
            serde_json::to_writer(&mut self.writer, record)?;
            self.writer.write_all(b"\n")?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
