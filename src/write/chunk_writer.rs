//! `ChunkWriter`: the writer for one non-aligned series, where time and
//! value travel together inside the same page. Unlike an aligned chunk
//! group's separate time/value chunks, a non-aligned chunk's page holds
//! both streams so the series remains fully self-contained.
//!
//! A `ChunkGroupWriter` holds a set of these alongside, at most, one shared
//! [`super::aligned_writer::AlignedChunkWriter`] instead of subclassing a
//! common `IChunkWriter` per series.

use crate::chunk::{ChunkHeader, ChunkMetadata};
use crate::compression::{create_codec, Compression};
use crate::config::WriterOptions;
use crate::encoding::{create_encoder, Encoder};
use crate::error::{page_failure_err, Result};
use crate::page::PageHeader;
use crate::schema::MeasurementSchema;
use crate::statistics::Statistics;
use crate::types::{DataType, Value};
use crate::varint;

/// Writer for a single, non-aligned series: each page carries its own
/// timestamp stream immediately followed by its value stream.
#[derive(Debug)]
pub struct ChunkWriter {
    schema: MeasurementSchema,
    options_time_encoding: crate::encoding::EncodingKind,
    options_time_compression: Compression,
    current_time_encoder: Box<dyn Encoder>,
    current_value_encoder: Box<dyn Encoder>,
    current_statistics: Statistics,
    current_point_count: u32,
    sealed_pages: Vec<(PageHeader, Vec<u8>)>,
}

impl ChunkWriter {
    pub fn new(schema: MeasurementSchema, options: &WriterOptions) -> Self {
        let current_time_encoder = create_encoder(options.default_time_encoding, DataType::Int64);
        let current_value_encoder = create_encoder(schema.encoding, schema.data_type);
        let data_type = schema.data_type;
        Self {
            schema,
            options_time_encoding: options.default_time_encoding,
            options_time_compression: options.default_time_compression,
            current_time_encoder,
            current_value_encoder,
            current_statistics: Statistics::empty(data_type),
            current_point_count: 0,
            sealed_pages: Vec::new(),
        }
    }

    pub fn schema(&self) -> &MeasurementSchema {
        &self.schema
    }

    fn current_estimated_size(&self) -> usize {
        self.current_time_encoder.estimated_size() + self.current_value_encoder.estimated_size()
    }

    fn current_page_over_threshold(&self, options: &WriterOptions) -> bool {
        options.unsealed_page_over_threshold(self.current_estimated_size(), self.current_point_count)
    }

    /// Writes one (timestamp, value) point, then seals the current page if
    /// it is now over threshold — writing exactly `max_points_per_page`
    /// points leaves one sealed page and a fresh empty one.
    pub fn write(&mut self, timestamp: i64, value: &Value, options: &WriterOptions) -> Result<()> {
        self.current_time_encoder.encode(&Value::I64(timestamp))?;
        if !value.is_null() {
            self.current_statistics.update(value);
            self.current_value_encoder.encode(value)?;
        }
        self.current_point_count += 1;
        if self.current_page_over_threshold(options) {
            self.seal_current_page(options)?;
        }
        Ok(())
    }

    pub fn seal_current_page(&mut self, options: &WriterOptions) -> Result<()> {
        if self.current_point_count == 0 {
            return Ok(());
        }
        let time_raw = self.current_time_encoder.flush()?;
        let value_raw = self.current_value_encoder.flush()?;
        self.current_time_encoder = create_encoder(self.options_time_encoding, DataType::Int64);
        self.current_value_encoder = create_encoder(self.schema.encoding, self.schema.data_type);

        let mut time_codec = create_codec(&self.options_time_compression)?;
        let time_compressed = match &mut time_codec {
            Some(codec) => {
                let mut out = Vec::new();
                codec.compress(&time_raw, &mut out)?;
                out
            }
            None => time_raw,
        };
        let mut value_codec = create_codec(&self.schema.compression)?;
        let value_compressed = match &mut value_codec {
            Some(codec) => {
                let mut out = Vec::new();
                codec.compress(&value_raw, &mut out)?;
                out
            }
            None => value_raw,
        };

        // Packs both sub-streams behind their own uncompressed-length prefix
        // so a reader can size a decompression buffer for each independently
        // (the shared page header only records the packed blob's overall
        // size). The value sub-stream's own length is implicit: it runs to
        // the end of the page's payload.
        let mut data = Vec::new();
        varint::encode_u64(time_raw.len() as u64, &mut data);
        varint::encode_u64(time_compressed.len() as u64, &mut data);
        data.extend_from_slice(&time_compressed);
        varint::encode_u64(value_raw.len() as u64, &mut data);
        data.extend_from_slice(&value_compressed);

        let statistics = std::mem::replace(
            &mut self.current_statistics,
            Statistics::empty(self.schema.data_type),
        );
        let point_count = std::mem::take(&mut self.current_point_count);
        let crc = if options.write_page_crc {
            Some(crc32fast::hash(&data))
        } else {
            None
        };
        let header = PageHeader {
            uncompressed_size: data.len(),
            compressed_size: data.len(),
            point_count,
            statistics,
            crc,
        };
        self.sealed_pages.push((header, data));
        Ok(())
    }

    /// Splices a pre-encoded page directly into the chunk's page stream
    /// without re-encoding, advancing the chunk's statistics from the
    /// page's own header. The current in-progress page is untouched.
    pub fn write_page_header_and_data_into_buff(&mut self, header: PageHeader, data: Vec<u8>) -> Result<()> {
        if data.len() != header.compressed_size {
            return Err(page_failure_err!(
                "spliced page declares compressed_size {} but payload is {} bytes",
                header.compressed_size,
                data.len()
            ));
        }
        self.sealed_pages.push((header, data));
        Ok(())
    }

    pub fn point_count(&self) -> u32 {
        self.sealed_pages
            .iter()
            .map(|(h, _)| h.point_count)
            .sum::<u32>()
            + self.current_point_count
    }

    pub fn is_empty(&self) -> bool {
        self.sealed_pages.is_empty() && self.current_point_count == 0
    }

    /// Conservatively assumes more than one page will ultimately be sealed
    /// (statistics present in every page header), since that can only
    /// overestimate.
    pub fn estimated_chunk_size(&self) -> usize {
        self.sealed_pages
            .iter()
            .map(|(h, d)| h.to_bytes(false).len() + d.len())
            .sum::<usize>()
            + self.current_estimated_size()
    }

    /// Whether this series, on its own, has crossed the writer's chunk-size
    /// policy — lets a caller flush one over-threshold series independently
    /// of its siblings instead of waiting on a group-wide heuristic.
    pub fn chunk_size_over_threshold(&self, options: &WriterOptions) -> bool {
        options.chunk_size_over_threshold(self.point_count(), self.estimated_chunk_size(), false)
    }

    /// Seals any remaining page, then serializes the chunk's header and
    /// page stream into `buffer`.
    pub fn flush(mut self, buffer: &mut Vec<u8>, options: &WriterOptions) -> Result<ChunkMetadata> {
        self.seal_current_page(options)?;
        let single_page = self.sealed_pages.len() == 1;
        let mut chunk_statistics = Statistics::empty(self.schema.data_type);
        for (header, _) in &self.sealed_pages {
            chunk_statistics.merge(&header.statistics);
        }
        let point_count = self.sealed_pages.iter().map(|(h, _)| h.point_count).sum();
        let marker = if single_page {
            crate::schema::ONLY_ONE_PAGE_CHUNK_HEADER
        } else {
            crate::schema::CHUNK_HEADER
        };
        let data_size: u64 = self
            .sealed_pages
            .iter()
            .map(|(h, d)| h.to_bytes(single_page).len() as u64 + d.len() as u64)
            .sum();
        let header = ChunkHeader {
            marker,
            measurement_id: self.schema.measurement_id.clone(),
            data_size,
            data_type: self.schema.data_type,
            compression: self.schema.compression,
            encoding: self.schema.encoding,
            number_of_pages: self.sealed_pages.len() as u32,
            inline_statistics: if single_page {
                Some(chunk_statistics.clone())
            } else {
                None
            },
        };
        let offset = buffer.len();
        header.write_to(buffer);
        for (page_header, data) in &self.sealed_pages {
            buffer.extend_from_slice(&page_header.to_bytes(single_page));
            buffer.extend_from_slice(data);
        }
        Ok(ChunkMetadata {
            measurement_id: self.schema.measurement_id,
            data_type: self.schema.data_type,
            offset,
            point_count,
            statistics: chunk_statistics,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::Compression;
    use crate::encoding::EncodingKind;
    use crate::types::DataType;

    fn schema() -> MeasurementSchema {
        MeasurementSchema::new("v1", DataType::Int32, EncodingKind::Plain, Compression::Uncompressed)
    }

    #[test]
    fn splicing_a_page_with_mismatched_size_fails() {
        let options = WriterOptions::default();
        let mut writer = ChunkWriter::new(schema(), &options);
        let header = PageHeader {
            uncompressed_size: 4,
            compressed_size: 4,
            point_count: 1,
            statistics: Statistics::empty(DataType::Int32),
            crc: None,
        };
        let data = vec![0u8; 3];
        let result = writer.write_page_header_and_data_into_buff(header, data);
        assert!(result.is_err());
    }

    #[test]
    fn splicing_a_well_formed_page_advances_point_count_without_reencoding() {
        let options = WriterOptions::default();
        let mut writer = ChunkWriter::new(schema(), &options);
        let data = vec![1u8, 2, 3, 4];
        let header = PageHeader {
            uncompressed_size: data.len(),
            compressed_size: data.len(),
            point_count: 3,
            statistics: Statistics::empty(DataType::Int32),
            crc: None,
        };
        writer.write_page_header_and_data_into_buff(header, data).unwrap();

        let mut buffer = Vec::new();
        let metadata = writer.flush(&mut buffer, &options).unwrap();
        assert_eq!(metadata.point_count, 3);
    }
}
