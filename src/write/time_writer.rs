//! `TimeChunkWriter`: the time-column counterpart of `ValueChunkWriter`. In
//! an aligned chunk group the time writer's page boundaries govern when
//! every value writer must also seal, so it exposes
//! `remaining_point_number_for_current_page` for the aligned splitting
//! algorithm to consult before handing it a batch.

use crate::chunk::{ChunkBuffer, ChunkKind, ChunkMetadata};
use crate::compression::Compression;
use crate::config::WriterOptions;
use crate::encoding::EncodingKind;
use crate::error::{page_failure_err, Result};
use crate::page::{CompressedPage, PageBuffer};
use crate::types::{DataType, Value};

#[derive(Debug)]
pub struct TimeChunkWriter {
    encoding: EncodingKind,
    compression: Compression,
    current_page: PageBuffer,
    chunk: ChunkBuffer,
}

impl TimeChunkWriter {
    pub fn new(encoding: EncodingKind, compression: Compression) -> Self {
        let current_page = PageBuffer::new(DataType::Int64, encoding);
        let chunk = ChunkBuffer::new("", DataType::Int64, encoding, compression, ChunkKind::Time);
        Self {
            encoding,
            compression,
            current_page,
            chunk,
        }
    }

    /// The number of additional points the current (unsealed) page can
    /// accept before the page-size policy would force a seal, counting by
    /// point budget only. Byte-size overflow can still force an earlier
    /// seal; callers that rely on this bound should re-check after each
    /// write.
    pub fn remaining_point_number_for_current_page(&self, options: &WriterOptions) -> u32 {
        options
            .max_points_per_page
            .saturating_sub(self.current_page.point_count())
    }

    pub fn write(&mut self, timestamp: i64, options: &WriterOptions) -> Result<()> {
        self.current_page.write(&Value::I64(timestamp))?;
        if self.current_page.over_threshold(options) {
            self.seal_current_page(options)?;
        }
        Ok(())
    }

    pub(crate) fn current_page_over_threshold(&self, options: &WriterOptions) -> bool {
        self.current_page.over_threshold(options)
    }

    pub(crate) fn push(&mut self, timestamp: i64) -> Result<()> {
        self.current_page.write(&Value::I64(timestamp))
    }

    pub fn seal_current_page(&mut self, options: &WriterOptions) -> Result<()> {
        if self.current_page.is_empty() {
            return Ok(());
        }
        let finished = std::mem::replace(
            &mut self.current_page,
            PageBuffer::new(DataType::Int64, self.encoding),
        );
        let sealed = finished.seal(self.compression, options.write_page_crc)?;
        self.chunk.push_page(sealed);
        Ok(())
    }

    /// Splices a pre-encoded page directly into the chunk's page stream
    /// without re-encoding, advancing the chunk's statistics from the
    /// page's own header.
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

    pub fn estimated_chunk_size(&self) -> usize {
        self.chunk.estimated_size() + self.current_page.estimated_uncompressed_size()
    }

    pub fn point_count(&self) -> u32 {
        self.chunk.point_count() + self.current_page.point_count()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk.is_empty() && self.current_page.is_empty()
    }

    pub fn flush(mut self, buffer: &mut Vec<u8>, options: &WriterOptions) -> Result<ChunkMetadata> {
        self.seal_current_page(options)?;
        Ok(self.chunk.flush(buffer))
    }
}
