//! `ChunkGroupWriter`: owns every series writer for one device, routes
//! incoming points and tablets to the right one, and flushes the whole
//! group through a `FileWriter` at once.

use std::io::Write;

use crate::config::WriterOptions;
use crate::error::{schema_conflict_err, type_mismatch_err, Result};
use crate::schema::MeasurementSchema;
use crate::tablet::Tablet;
use crate::types::Value;
use crate::varint;
use crate::write::aligned_writer::AlignedChunkWriter;
use crate::write::chunk_writer::ChunkWriter;
use crate::write::file_writer::FileWriter;

/// A device's chunk group: zero or more independent non-aligned series
/// writers, plus (once the first tablet write establishes its column set)
/// at most one aligned group sharing a single time column.
#[derive(Debug)]
pub struct ChunkGroupWriter {
    device_id: String,
    /// Kept in registration order, not a `HashMap`: spec'd flush order is
    /// installation order, so lookups pay a linear scan rather than sorting
    /// at flush time.
    non_aligned: Vec<(String, ChunkWriter)>,
    aligned: Option<AlignedChunkWriter>,
}

impl ChunkGroupWriter {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            non_aligned: Vec::new(),
            aligned: None,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Registers a non-aligned series under `schema`, creating its writer on
    /// first call. A later call with the *same* schema is a no-op; a call
    /// with a different type, encoding, or compression for an
    /// already-registered measurement is a `SchemaConflict`.
    pub fn try_to_add_series_writer(&mut self, schema: MeasurementSchema, options: &WriterOptions) -> Result<()> {
        if let Some((_, existing)) = self
            .non_aligned
            .iter()
            .find(|(id, _)| id == &schema.measurement_id)
        {
            if *existing.schema() != schema {
                return Err(schema_conflict_err!(
                    "measurement '{}' already registered with a different schema",
                    schema.measurement_id
                ));
            }
            return Ok(());
        }
        self.non_aligned
            .push((schema.measurement_id.clone(), ChunkWriter::new(schema, options)));
        Ok(())
    }

    /// Writes one point to an already-registered non-aligned series.
    pub fn write_point(
        &mut self,
        measurement_id: &str,
        timestamp: i64,
        value: &Value,
        options: &WriterOptions,
    ) -> Result<()> {
        let writer = self
            .non_aligned
            .iter_mut()
            .find(|(id, _)| id == measurement_id)
            .map(|(_, w)| w)
            .ok_or_else(|| {
                type_mismatch_err!(
                    "no series writer registered for measurement '{}'",
                    measurement_id
                )
            })?;
        writer.write(timestamp, value, options)
    }

    /// Writes a tablet. When `aligned` is `true` the tablet's rows are
    /// routed into the device's single `AlignedChunkWriter` (created on
    /// first use from the tablet's own column schemas); when `false` each
    /// column is routed, row by row, into its own non-aligned
    /// `ChunkWriter` (registering it first if needed) — the tablet
    /// row/column slice is simply iterated per column rather than shared
    /// across a time chunk.
    pub fn write_tablet(&mut self, tablet: &Tablet, aligned: bool, options: &WriterOptions) -> Result<()> {
        if aligned {
            let writer = self.aligned.get_or_insert_with(|| {
                let schemas = tablet.columns.iter().map(|c| c.schema.clone()).collect();
                AlignedChunkWriter::new(schemas, options)
            });
            writer.write_tablet(tablet, options)
        } else {
            for column in &tablet.columns {
                self.try_to_add_series_writer(column.schema.clone(), options)?;
            }
            for row_index in 0..tablet.row_count() {
                let timestamp = tablet.timestamps[row_index];
                for column in &tablet.columns {
                    self.write_point(
                        &column.schema.measurement_id,
                        timestamp,
                        &column.values[row_index],
                        options,
                    )?;
                }
            }
            Ok(())
        }
    }

    /// Writes only the window `rows`/`cols` of `tablet`: series outside
    /// `cols` are left untouched rather than receiving an empty write.
    pub fn write_tablet_range(
        &mut self,
        tablet: &Tablet,
        row_start: usize,
        row_end: usize,
        col_start: usize,
        col_end: usize,
        aligned: bool,
        options: &WriterOptions,
    ) -> Result<()> {
        let window = tablet.slice(row_start, row_end, col_start, col_end);
        self.write_tablet(&window, aligned, options)
    }

    /// Writes only the row window `[row_start, row_end)` of `tablet`, across
    /// every one of its columns. A thin wrapper over `write_tablet_range`
    /// with the column window left at its full span.
    pub fn write_tablet_rows(
        &mut self,
        tablet: &Tablet,
        row_start: usize,
        row_end: usize,
        aligned: bool,
        options: &WriterOptions,
    ) -> Result<()> {
        self.write_tablet_range(tablet, row_start, row_end, 0, tablet.columns.len(), aligned, options)
    }

    /// An estimate of the group's total in-memory size across every series
    /// writer, consulted by callers deciding when to flush.
    pub fn current_chunk_group_size(&self) -> usize {
        let aligned_size = self.aligned.as_ref().map_or(0, |w| w.estimated_chunk_size());
        let non_aligned_size: usize = self.non_aligned.iter().map(|(_, w)| w.estimated_chunk_size()).sum();
        aligned_size + non_aligned_size
    }

    /// Whether a caller following the chunk-size policy should flush now:
    /// each series writer consults the policy independently
    /// (`ChunkWriter`/`AlignedChunkWriter::chunk_size_over_threshold`)
    /// rather than folding every writer's size into one group-wide max/sum
    /// before a single threshold check, so one oversized series can trigger
    /// a flush on its own.
    pub fn should_flush(&self, options: &WriterOptions) -> bool {
        let aligned_over = self
            .aligned
            .as_ref()
            .is_some_and(|w| w.chunk_size_over_threshold(options));
        let non_aligned_over = self
            .non_aligned
            .iter()
            .any(|(_, w)| w.chunk_size_over_threshold(options));
        aligned_over || non_aligned_over
    }

    pub fn is_empty(&self) -> bool {
        self.aligned.as_ref().map_or(true, |w| w.is_empty())
            && self.non_aligned.iter().all(|(_, w)| w.is_empty())
    }

    /// Flushes every series writer belonging to this group through
    /// `file_writer`, in between a `start_chunk_group`/`end_chunk_group`
    /// pair, and returns the group's own metadata.
    pub fn flush_to_file_writer<W: Write>(
        self,
        file_writer: &mut FileWriter<W>,
        options: &WriterOptions,
    ) -> Result<ChunkGroupMetadata> {
        file_writer.start_chunk_group(&self.device_id)?;
        let mut chunks = Vec::new();
        let mut buffer = Vec::new();

        if let Some(aligned) = self.aligned {
            if !aligned.is_empty() {
                let (time_metadata, value_metadata) = aligned.flush(&mut buffer, options)?;
                chunks.push(time_metadata);
                chunks.extend(value_metadata);
            }
        }
        for (_, writer) in self.non_aligned {
            if writer.is_empty() {
                continue;
            }
            chunks.push(writer.flush(&mut buffer, options)?);
        }

        file_writer.write_bytes_to_stream(&buffer)?;
        let metadata = ChunkGroupMetadata {
            device_id: self.device_id,
            chunks,
        };
        file_writer.end_chunk_group(metadata.clone())?;
        Ok(metadata)
    }
}

/// Metadata retained for one flushed chunk group, folded into the file
/// footer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGroupMetadata {
    pub device_id: String,
    pub chunks: Vec<crate::chunk::ChunkMetadata>,
}

/// Serializes the file footer: the number of chunk groups, then for each
/// one its device id and the measurement id / point count / data type of
/// every chunk it holds.
pub fn serialize_footer(groups: &[ChunkGroupMetadata]) -> Vec<u8> {
    let mut buffer = Vec::new();
    varint::encode_u64(groups.len() as u64, &mut buffer);
    for group in groups {
        let device_bytes = group.device_id.as_bytes();
        varint::encode_u64(device_bytes.len() as u64, &mut buffer);
        buffer.extend_from_slice(device_bytes);
        varint::encode_u64(group.chunks.len() as u64, &mut buffer);
        for chunk in &group.chunks {
            let id_bytes = chunk.measurement_id.as_bytes();
            varint::encode_u64(id_bytes.len() as u64, &mut buffer);
            buffer.extend_from_slice(id_bytes);
            varint::encode_u64(chunk.point_count as u64, &mut buffer);
            varint::encode_u64(chunk.offset as u64, &mut buffer);
        }
    }
    buffer
}
