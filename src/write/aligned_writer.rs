//! `AlignedChunkWriter`: writes one shared time column plus N value columns
//! whose pages stay in lockstep — every value chunk seals a page at exactly
//! the row where the time chunk does, so a reader can pair page `i` of the
//! time chunk with page `i` of every value chunk without an index.

use crate::chunk::{ChunkKind, ChunkMetadata};
use crate::config::WriterOptions;
use crate::error::{type_mismatch_err, Result};
use crate::schema::MeasurementSchema;
use crate::tablet::Tablet;
use crate::types::Value;
use crate::write::time_writer::TimeChunkWriter;
use crate::write::value_writer::ValueChunkWriter;

#[derive(Debug)]
pub struct AlignedChunkWriter {
    time: TimeChunkWriter,
    values: Vec<ValueChunkWriter>,
}

impl AlignedChunkWriter {
    pub fn new(schemas: Vec<MeasurementSchema>, options: &WriterOptions) -> Self {
        let time = TimeChunkWriter::new(options.default_time_encoding, options.default_time_compression);
        let values = schemas
            .into_iter()
            .map(|schema| ValueChunkWriter::new(schema, ChunkKind::Value))
            .collect();
        Self { time, values }
    }

    pub fn measurement_ids(&self) -> Vec<&str> {
        self.values.iter().map(|v| v.schema().measurement_id.as_str()).collect()
    }

    fn any_column_over_threshold(&self, options: &WriterOptions) -> bool {
        self.time.current_page_over_threshold(options)
            || self.values.iter().any(|v| v.current_page_over_threshold(options))
    }

    fn seal_all(&mut self, options: &WriterOptions) -> Result<()> {
        self.time.seal_current_page(options)?;
        for value in &mut self.values {
            value.seal_current_page(options)?;
        }
        Ok(())
    }

    /// Writes one row, then seals all columns together if any of them is now
    /// over threshold — keeping every value chunk's page boundaries aligned
    /// with the time chunk's.
    pub fn write_point(&mut self, timestamp: i64, row: &[Value], options: &WriterOptions) -> Result<()> {
        if row.len() != self.values.len() {
            return Err(type_mismatch_err!(
                "aligned chunk writer expects {} values per row, got {}",
                self.values.len(),
                row.len()
            ));
        }
        self.time.push(timestamp)?;
        for (writer, value) in self.values.iter_mut().zip(row) {
            writer.push(value)?;
        }
        if self.any_column_over_threshold(options) {
            self.seal_all(options)?;
        }
        Ok(())
    }

    /// Writes an entire tablet, splitting it at whatever row boundary the
    /// time column's remaining page capacity dictates, so every column
    /// seals its page at the same row instead of drifting out of lockstep.
    pub fn write_tablet(&mut self, tablet: &Tablet, options: &WriterOptions) -> Result<()> {
        if tablet.columns.len() != self.values.len() {
            return Err(type_mismatch_err!(
                "aligned chunk writer expects {} columns, tablet has {}",
                self.values.len(),
                tablet.columns.len()
            ));
        }
        let mut remaining = tablet.clone();
        while !remaining.is_empty() {
            let remaining_capacity = self.time.remaining_point_number_for_current_page(options) as usize;
            let r = remaining_capacity.min(remaining.row_count()).max(1);
            let (head, tail) = remaining.split_at(r);
            self.write_rows(&head, options)?;
            if self.any_column_over_threshold(options) {
                self.seal_all(options)?;
            }
            remaining = tail;
        }
        Ok(())
    }

    fn write_rows(&mut self, tablet: &Tablet, options: &WriterOptions) -> Result<()> {
        for row_index in 0..tablet.row_count() {
            let timestamp = tablet.timestamps[row_index];
            self.time.push(timestamp)?;
            for (writer, column) in self.values.iter_mut().zip(&tablet.columns) {
                writer.push(&column.values[row_index])?;
            }
        }
        let _ = options;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn point_count(&self) -> u32 {
        self.time.point_count()
    }

    pub fn estimated_chunk_size(&self) -> usize {
        self.time.estimated_chunk_size()
            + self.values.iter().map(|v| v.estimated_chunk_size()).sum::<usize>()
    }

    /// Whether the aligned group as a whole has crossed the writer's
    /// chunk-size policy, consulted directly rather than through a
    /// group-wide max/sum heuristic.
    pub fn chunk_size_over_threshold(&self, options: &WriterOptions) -> bool {
        options.chunk_size_over_threshold(self.point_count(), self.estimated_chunk_size(), false)
    }

    /// Seals any remaining pages and flushes the time chunk followed by
    /// every value chunk into `buffer`, returning their metadata in the same
    /// order.
    pub fn flush(
        mut self,
        buffer: &mut Vec<u8>,
        options: &WriterOptions,
    ) -> Result<(ChunkMetadata, Vec<ChunkMetadata>)> {
        self.seal_all(options)?;
        let time_metadata = self.time.flush(buffer, options)?;
        let mut value_metadata = Vec::with_capacity(self.values.len());
        for value in self.values {
            value_metadata.push(value.flush(buffer, options)?);
        }
        Ok((time_metadata, value_metadata))
    }
}
