//! `ValueChunkWriter`: accumulates one value column's points into pages and
//! seals them into a `ChunkBuffer` once the page-size policy fires. Used
//! standalone as the value half of a non-aligned series and, repeated once
//! per measurement, as the value columns of an `AlignedChunkWriter`.

use crate::chunk::{ChunkBuffer, ChunkKind, ChunkMetadata};
use crate::config::WriterOptions;
use crate::error::{page_failure_err, Result};
use crate::page::{CompressedPage, PageBuffer};
use crate::schema::MeasurementSchema;
use crate::types::Value;

#[derive(Debug)]
pub struct ValueChunkWriter {
    schema: MeasurementSchema,
    kind: ChunkKind,
    current_page: PageBuffer,
    chunk: ChunkBuffer,
}

impl ValueChunkWriter {
    pub fn new(schema: MeasurementSchema, kind: ChunkKind) -> Self {
        let current_page = PageBuffer::new(schema.data_type, schema.encoding);
        let chunk = ChunkBuffer::new(
            schema.measurement_id.clone(),
            schema.data_type,
            schema.encoding,
            schema.compression,
            kind,
        );
        Self {
            schema,
            kind,
            current_page,
            chunk,
        }
    }

    pub fn schema(&self) -> &MeasurementSchema {
        &self.schema
    }

    /// Writes one value, then seals the current page if it is now over
    /// threshold — so writing exactly `max_points_per_page` values leaves
    /// one sealed page and a fresh empty one, rather than deferring the
    /// seal to the next write. Mirrors `TimeChunkWriter::write`'s own
    /// page-sealing check so aligned writers can drive both in lockstep.
    pub fn write(&mut self, value: &Value, options: &WriterOptions) -> Result<()> {
        self.current_page.write(value)?;
        if self.current_page.over_threshold(options) {
            self.seal_current_page(options)?;
        }
        Ok(())
    }

    /// Whether the current unsealed page is already over the size policy.
    /// Used by `AlignedChunkWriter` to decide lockstep seals without relying
    /// on each value writer's own (potentially differently-timed) check.
    pub(crate) fn current_page_over_threshold(&self, options: &WriterOptions) -> bool {
        self.current_page.over_threshold(options)
    }

    /// Writes a value into the current page without checking the seal
    /// policy; the caller (an `AlignedChunkWriter` orchestrating lockstep
    /// page boundaries across columns) is responsible for sealing first.
    pub(crate) fn push(&mut self, value: &Value) -> Result<()> {
        self.current_page.write(value)
    }

    /// Splices a pre-encoded page directly into the chunk's page stream
    /// without re-encoding, advancing the chunk's statistics from the
    /// page's own header. Used when rewriting an existing file rather than
    /// encoding fresh data. The current in-progress page is untouched.
    pub fn write_page_header_and_data_into_buff(&mut self, page: CompressedPage) -> Result<()> {
        if page.data.len() != page.header.compressed_size {
            return Err(page_failure_err!(
                "spliced page declares compressed_size {} but payload is {} bytes",
                page.header.compressed_size,
                page.data.len()
            ));
        }
        self.chunk.push_page(page);
        Ok(())
    }

    /// Seals the current page into the chunk buffer unconditionally,
    /// starting a fresh page. A no-op if the current page is empty.
    pub fn seal_current_page(&mut self, options: &WriterOptions) -> Result<()> {
        if self.current_page.is_empty() {
            return Ok(());
        }
        let finished = std::mem::replace(
            &mut self.current_page,
            PageBuffer::new(self.schema.data_type, self.schema.encoding),
        );
        let sealed = finished.seal(self.schema.compression, options.write_page_crc)?;
        self.chunk.push_page(sealed);
        Ok(())
    }

    pub fn estimated_chunk_size(&self) -> usize {
        self.chunk.estimated_size() + self.current_page.estimated_uncompressed_size()
    }

    pub fn point_count(&self) -> u32 {
        self.chunk.point_count() + self.current_page.point_count()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk.is_empty() && self.current_page.is_empty()
    }

    /// Seals any remaining page, then serializes the chunk's header and
    /// page stream into `buffer`.
    pub fn flush(mut self, buffer: &mut Vec<u8>, options: &WriterOptions) -> Result<ChunkMetadata> {
        self.seal_current_page(options)?;
        Ok(self.chunk.flush(buffer))
    }
}
