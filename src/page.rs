//! The page layer: an in-progress `PageBuffer` that accepts values until a
//! size/point-count threshold is crossed, and the `CompressedPage` it seals
//! into.

use crate::compression::{create_codec, Compression};
use crate::config::WriterOptions;
use crate::encoding::{create_encoder, EncodingKind, Encoder};
use crate::error::Result;
use crate::statistics::Statistics;
use crate::types::{DataType, Value};
use crate::varint;

/// An unsealed page: an encoder accumulating values plus the running
/// statistics over everything written to it so far.
#[derive(Debug)]
pub struct PageBuffer {
    data_type: DataType,
    encoder: Box<dyn Encoder>,
    statistics: Statistics,
    point_count: u32,
}

impl PageBuffer {
    pub fn new(data_type: DataType, encoding: EncodingKind) -> Self {
        Self {
            data_type,
            encoder: create_encoder(encoding, data_type),
            statistics: Statistics::empty(data_type),
            point_count: 0,
        }
    }

    pub fn point_count(&self) -> u32 {
        self.point_count
    }

    pub fn is_empty(&self) -> bool {
        self.point_count == 0
    }

    /// An upper bound on the page's uncompressed byte size if flushed right
    /// now; used by the page-size policy without forcing a flush.
    pub fn estimated_uncompressed_size(&self) -> usize {
        self.encoder.estimated_size()
    }

    /// Writes one value (possibly null) into the page, updating statistics
    /// and point count. Nulls update the point count only: nullability is
    /// tracked only in the page's own bookkeeping, never passed through the
    /// encoder.
    pub fn write(&mut self, value: &Value) -> Result<()> {
        if !value.is_null() {
            self.statistics.update(value);
            self.encoder.encode(value)?;
        }
        self.point_count += 1;
        Ok(())
    }

    /// Whether this page should be sealed given the writer's size policy.
    pub fn over_threshold(&self, options: &WriterOptions) -> bool {
        options.unsealed_page_over_threshold(self.estimated_uncompressed_size(), self.point_count)
    }

    /// Flushes the encoder and compresses the result, producing a
    /// self-contained sealed page. Consumes `self`: a sealed page cannot
    /// accept further writes.
    pub fn seal(mut self, compression: Compression, write_crc: bool) -> Result<CompressedPage> {
        let uncompressed = self.encoder.flush()?;
        let mut codec = create_codec(&compression)?;
        let compressed = match &mut codec {
            Some(codec) => {
                let mut output = Vec::new();
                codec.compress(&uncompressed, &mut output)?;
                output
            }
            None => uncompressed.clone(),
        };
        let crc = if write_crc {
            Some(crc32fast::hash(&compressed))
        } else {
            None
        };
        Ok(CompressedPage {
            header: PageHeader {
                uncompressed_size: uncompressed.len(),
                compressed_size: compressed.len(),
                point_count: self.point_count,
                statistics: self.statistics,
                crc,
            },
            data: compressed,
        })
    }
}

/// The page header written immediately before each page's compressed bytes:
/// sizes and point count as varints, the page's own statistics block, and
/// an optional CRC32 of the compressed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub uncompressed_size: usize,
    pub compressed_size: usize,
    pub point_count: u32,
    pub statistics: Statistics,
    pub crc: Option<u32>,
}

impl PageHeader {
    /// Serializes this header. `single_page` must be `true` iff this page is
    /// the only page of its chunk — in that case the statistics block is
    /// omitted here because the chunk header already carries it inline
    /// (spec's binary layout: per-page statistics are "omitted iff
    /// single-page chunk").
    pub fn to_bytes(&self, single_page: bool) -> Vec<u8> {
        let mut buffer = Vec::new();
        varint::encode_u64(self.uncompressed_size as u64, &mut buffer);
        varint::encode_u64(self.compressed_size as u64, &mut buffer);
        varint::encode_u64(self.point_count as u64, &mut buffer);
        if !single_page {
            self.statistics.to_bytes(&mut buffer);
        }
        if let Some(crc) = self.crc {
            buffer.extend_from_slice(&crc.to_le_bytes());
        }
        buffer
    }

    /// Parses a page header, returning it and the number of bytes consumed.
    /// `data_type` must be the data type of the chunk this page belongs to,
    /// `has_crc` must match the writer options the chunk was written under,
    /// and `single_page` must be `true` iff this page is the chunk's only
    /// page (the caller gets this page's statistics from the chunk header's
    /// own inline statistics instead; `statistics` here is left empty).
    pub fn from_bytes(data_type: DataType, has_crc: bool, single_page: bool, bytes: &[u8]) -> (PageHeader, usize) {
        let (uncompressed_size, n1) = varint::decode_u64(bytes);
        let mut offset = n1;
        let (compressed_size, n2) = varint::decode_u64(&bytes[offset..]);
        offset += n2;
        let (point_count, n3) = varint::decode_u64(&bytes[offset..]);
        offset += n3;
        let statistics = if single_page {
            Statistics::empty(data_type)
        } else {
            let (statistics, n4) = Statistics::from_bytes(data_type, &bytes[offset..]);
            offset += n4;
            statistics
        };
        let crc = if has_crc {
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[offset..offset + 4]);
            offset += 4;
            Some(u32::from_le_bytes(raw))
        } else {
            None
        };
        (
            PageHeader {
                uncompressed_size: uncompressed_size as usize,
                compressed_size: compressed_size as usize,
                point_count: point_count as u32,
                statistics,
                crc,
            },
            offset,
        )
    }
}

/// A sealed page ready to be appended to a chunk's byte stream: a header
/// plus its compressed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedPage {
    pub header: PageHeader,
    pub data: Vec<u8>,
}

impl CompressedPage {
    pub fn statistics(&self) -> &Statistics {
        &self.header.statistics
    }

    pub fn point_count(&self) -> u32 {
        self.header.point_count
    }

    /// Appends this page's wire representation (header then payload) to
    /// `buffer`. `single_page` must be `true` iff this page is the only page
    /// of its chunk (see `PageHeader::to_bytes`).
    pub fn write_to(&self, buffer: &mut Vec<u8>, single_page: bool) {
        buffer.extend_from_slice(&self.header.to_bytes(single_page));
        buffer.extend_from_slice(&self.data);
    }

    pub fn serialized_size(&self, single_page: bool) -> usize {
        self.header.to_bytes(single_page).len() + self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingKind;

    #[test]
    fn seal_roundtrips_header_fields() {
        let mut page = PageBuffer::new(DataType::Int64, EncodingKind::Ts2Diff);
        for v in [1i64, 2, 3, 5, 8] {
            page.write(&Value::I64(v)).unwrap();
        }
        assert_eq!(page.point_count(), 5);
        let sealed = page.seal(Compression::Uncompressed, true).unwrap();
        assert_eq!(sealed.point_count(), 5);
        assert!(sealed.header.crc.is_some());

        let mut buffer = Vec::new();
        sealed.write_to(&mut buffer, false);
        let (header, consumed) = PageHeader::from_bytes(DataType::Int64, true, false, &buffer);
        assert_eq!(header, sealed.header);
        assert_eq!(consumed, sealed.header.to_bytes(false).len());
    }

    #[test]
    fn nulls_advance_point_count_without_touching_encoder() {
        let mut page = PageBuffer::new(DataType::Double, EncodingKind::Plain);
        page.write(&Value::F64(1.0)).unwrap();
        page.write(&Value::Null).unwrap();
        page.write(&Value::F64(2.0)).unwrap();
        assert_eq!(page.point_count(), 3);
        assert_eq!(page.statistics.count(), 2);
    }

    #[test]
    fn single_page_header_omits_statistics_bytes() {
        let mut page = PageBuffer::new(DataType::Int32, EncodingKind::Plain);
        page.write(&Value::I32(7)).unwrap();
        page.write(&Value::I32(9)).unwrap();
        let sealed = page.seal(Compression::Uncompressed, false).unwrap();

        let multi_page_bytes = sealed.header.to_bytes(false);
        let single_page_bytes = sealed.header.to_bytes(true);
        assert!(single_page_bytes.len() < multi_page_bytes.len());

        let (header, consumed) = PageHeader::from_bytes(DataType::Int32, false, true, &single_page_bytes);
        assert_eq!(consumed, single_page_bytes.len());
        assert_eq!(header.point_count, 2);
        assert_eq!(header.statistics, Statistics::empty(DataType::Int32));
    }
}
