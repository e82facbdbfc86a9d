//! The chunk layer: a `ChunkBuffer` accumulating sealed pages for one
//! series, and the on-disk `ChunkHeader` that precedes them.

use crate::compression::Compression;
use crate::encoding::EncodingKind;
use crate::error::{out_of_spec_err, Result};
use crate::page::CompressedPage;
use crate::schema::{
    CHUNK_HEADER, ONLY_ONE_PAGE_CHUNK_HEADER, ONLY_ONE_PAGE_TIME_CHUNK_HEADER,
    ONLY_ONE_PAGE_VALUE_CHUNK_HEADER, TIME_CHUNK_HEADER, VALUE_CHUNK_HEADER,
};
use crate::statistics::Statistics;
use crate::types::DataType;
use crate::varint;

/// Which role a chunk plays, and therefore which marker byte its header
/// uses once sealed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkKind {
    /// A complete, self-contained non-aligned series chunk.
    NonAligned,
    /// The time column of an aligned chunk group.
    Time,
    /// A value column of an aligned chunk group.
    Value,
}

impl ChunkKind {
    fn marker(self, single_page: bool) -> u8 {
        match (self, single_page) {
            (ChunkKind::NonAligned, false) => CHUNK_HEADER,
            (ChunkKind::NonAligned, true) => ONLY_ONE_PAGE_CHUNK_HEADER,
            (ChunkKind::Time, false) => TIME_CHUNK_HEADER,
            (ChunkKind::Time, true) => ONLY_ONE_PAGE_TIME_CHUNK_HEADER,
            (ChunkKind::Value, false) => VALUE_CHUNK_HEADER,
            (ChunkKind::Value, true) => ONLY_ONE_PAGE_VALUE_CHUNK_HEADER,
        }
    }
}

/// Accumulates sealed pages for one series until the caller decides to flush
/// the chunk to a `ChunkGroupWriter`.
#[derive(Debug)]
pub struct ChunkBuffer {
    measurement_id: String,
    data_type: DataType,
    encoding: EncodingKind,
    compression: Compression,
    kind: ChunkKind,
    pages: Vec<CompressedPage>,
    statistics: Statistics,
}

impl ChunkBuffer {
    pub fn new(
        measurement_id: impl Into<String>,
        data_type: DataType,
        encoding: EncodingKind,
        compression: Compression,
        kind: ChunkKind,
    ) -> Self {
        Self {
            measurement_id: measurement_id.into(),
            data_type,
            encoding,
            compression,
            kind,
            pages: Vec::new(),
            statistics: Statistics::empty(data_type),
        }
    }

    pub fn measurement_id(&self) -> &str {
        &self.measurement_id
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn point_count(&self) -> u32 {
        self.pages.iter().map(|p| p.point_count()).sum()
    }

    /// Appends a sealed page, merging its statistics into the chunk's
    /// running totals: a chunk's statistics are the reduction over all of
    /// its pages.
    pub fn push_page(&mut self, page: CompressedPage) {
        self.statistics.merge(page.statistics());
        self.pages.push(page);
    }

    /// An upper bound on the chunk's serialized size if flushed right now,
    /// used by the chunk-size policy. Conservatively assumes the chunk will
    /// end up with more than one page (statistics included in every page
    /// header), since that can only overestimate.
    pub fn estimated_size(&self) -> usize {
        self.pages.iter().map(|p| p.serialized_size(false)).sum()
    }

    /// Serializes this chunk's header and page stream into `buffer`,
    /// consuming the buffered pages.
    pub fn flush(self, buffer: &mut Vec<u8>) -> ChunkMetadata {
        let single_page = self.pages.len() == 1;
        let data_size: u64 = self.pages.iter().map(|p| p.serialized_size(single_page) as u64).sum();
        let header = ChunkHeader {
            marker: self.kind.marker(single_page),
            measurement_id: self.measurement_id.clone(),
            data_size,
            data_type: self.data_type,
            compression: self.compression,
            encoding: self.encoding,
            number_of_pages: self.pages.len() as u32,
            inline_statistics: if single_page {
                Some(self.statistics.clone())
            } else {
                None
            },
        };
        let offset = buffer.len();
        header.write_to(buffer);
        for page in &self.pages {
            page.write_to(buffer, single_page);
        }
        ChunkMetadata {
            measurement_id: self.measurement_id,
            data_type: self.data_type,
            offset,
            point_count: self.pages.iter().map(|p| p.point_count()).sum(),
            statistics: self.statistics,
        }
    }
}

/// The fixed-layout header written before a chunk's page stream: a marker
/// byte identifying the chunk's role and page count, the series name, the
/// total size in bytes of the page stream that follows, its data
/// type/compression/encoding, and — for single-page chunks only — the
/// chunk's statistics inlined rather than left in the page header.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkHeader {
    pub marker: u8,
    pub measurement_id: String,
    /// Sum of every page's header-bytes-plus-compressed-payload size; lets a
    /// reader skip the whole chunk without decoding its pages.
    pub data_size: u64,
    pub data_type: DataType,
    pub compression: Compression,
    pub encoding: EncodingKind,
    pub number_of_pages: u32,
    pub inline_statistics: Option<Statistics>,
}

impl ChunkHeader {
    pub fn write_to(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.marker);
        let id_bytes = self.measurement_id.as_bytes();
        varint::encode_u64(id_bytes.len() as u64, buffer);
        buffer.extend_from_slice(id_bytes);
        varint::encode_u64(self.data_size, buffer);
        buffer.push(data_type_tag(self.data_type));
        buffer.push(compression_tag(self.compression));
        buffer.push(encoding_tag(self.encoding));
        varint::encode_u64(self.number_of_pages as u64, buffer);
        if let Some(statistics) = &self.inline_statistics {
            statistics.to_bytes(buffer);
        }
    }

    /// Parses a chunk header, returning it and the number of bytes consumed.
    /// The chunk's own marker byte determines whether it carries inline
    /// statistics (single-page chunks) or leaves them in each page header.
    pub fn from_bytes(bytes: &[u8]) -> Result<(ChunkHeader, usize)> {
        let marker = bytes[0];
        let mut offset = 1;
        let (id_len, n) = varint::decode_u64(&bytes[offset..]);
        offset += n;
        let measurement_id =
            String::from_utf8(bytes[offset..offset + id_len as usize].to_vec())
                .map_err(|e| out_of_spec_err!("chunk header measurement id is not valid UTF-8: {}", e))?;
        offset += id_len as usize;
        let (data_size, n) = varint::decode_u64(&bytes[offset..]);
        offset += n;
        let data_type = data_type_from_tag(bytes[offset])?;
        offset += 1;
        let compression = compression_from_tag(bytes[offset])?;
        offset += 1;
        let encoding = encoding_from_tag(bytes[offset])?;
        offset += 1;
        let (number_of_pages, n) = varint::decode_u64(&bytes[offset..]);
        offset += n;
        let single_page = marker_is_single_page(marker)?;
        let inline_statistics = if single_page {
            let (statistics, n) = Statistics::from_bytes(data_type, &bytes[offset..]);
            offset += n;
            Some(statistics)
        } else {
            None
        };
        Ok((
            ChunkHeader {
                marker,
                measurement_id,
                data_size,
                data_type,
                compression,
                encoding,
                number_of_pages: number_of_pages as u32,
                inline_statistics,
            },
            offset,
        ))
    }
}

/// Whether `marker` identifies a chunk holding exactly one page (and
/// therefore carrying its statistics inline rather than in the page
/// header).
fn marker_is_single_page(marker: u8) -> Result<bool> {
    match marker {
        ONLY_ONE_PAGE_CHUNK_HEADER | ONLY_ONE_PAGE_TIME_CHUNK_HEADER | ONLY_ONE_PAGE_VALUE_CHUNK_HEADER => Ok(true),
        CHUNK_HEADER | TIME_CHUNK_HEADER | VALUE_CHUNK_HEADER => Ok(false),
        other => Err(out_of_spec_err!("unrecognized chunk marker byte {:#04x}", other)),
    }
}

/// Metadata retained after a chunk is flushed, for assembly into the
/// chunk group's footer.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMetadata {
    pub measurement_id: String,
    pub data_type: DataType,
    pub offset: usize,
    pub point_count: u32,
    pub statistics: Statistics,
}

fn data_type_tag(data_type: DataType) -> u8 {
    match data_type {
        DataType::Boolean => 0,
        DataType::Int32 => 1,
        DataType::Int64 => 2,
        DataType::Float => 3,
        DataType::Double => 4,
        DataType::Text => 5,
        DataType::Blob => 6,
        DataType::String => 7,
    }
}

fn compression_tag(compression: Compression) -> u8 {
    match compression {
        Compression::Uncompressed => 0,
        Compression::Snappy => 1,
        Compression::Gzip => 2,
        Compression::Lz4 => 3,
        Compression::Zstd => 4,
    }
}

fn encoding_tag(encoding: EncodingKind) -> u8 {
    match encoding {
        EncodingKind::Plain => 0,
        EncodingKind::Ts2Diff => 1,
        EncodingKind::Gorilla => 2,
        EncodingKind::Rle => 3,
        EncodingKind::Dictionary => 4,
        EncodingKind::ZigZag => 5,
    }
}

fn data_type_from_tag(tag: u8) -> Result<DataType> {
    match tag {
        0 => Ok(DataType::Boolean),
        1 => Ok(DataType::Int32),
        2 => Ok(DataType::Int64),
        3 => Ok(DataType::Float),
        4 => Ok(DataType::Double),
        5 => Ok(DataType::Text),
        6 => Ok(DataType::Blob),
        7 => Ok(DataType::String),
        other => Err(out_of_spec_err!("unrecognized data type tag {}", other)),
    }
}

fn compression_from_tag(tag: u8) -> Result<Compression> {
    match tag {
        0 => Ok(Compression::Uncompressed),
        1 => Ok(Compression::Snappy),
        2 => Ok(Compression::Gzip),
        3 => Ok(Compression::Lz4),
        4 => Ok(Compression::Zstd),
        other => Err(out_of_spec_err!("unrecognized compression tag {}", other)),
    }
}

fn encoding_from_tag(tag: u8) -> Result<EncodingKind> {
    match tag {
        0 => Ok(EncodingKind::Plain),
        1 => Ok(EncodingKind::Ts2Diff),
        2 => Ok(EncodingKind::Gorilla),
        3 => Ok(EncodingKind::Rle),
        4 => Ok(EncodingKind::Dictionary),
        5 => Ok(EncodingKind::ZigZag),
        other => Err(out_of_spec_err!("unrecognized encoding tag {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingKind;
    use crate::page::PageBuffer;
    use crate::types::Value;

    #[test]
    fn single_page_chunk_inlines_statistics_and_uses_only_one_page_marker() {
        let mut page = PageBuffer::new(DataType::Int32, EncodingKind::Plain);
        page.write(&Value::I32(1)).unwrap();
        page.write(&Value::I32(2)).unwrap();
        let sealed = page.seal(Compression::Uncompressed, false).unwrap();

        let mut chunk = ChunkBuffer::new(
            "temperature",
            DataType::Int32,
            EncodingKind::Plain,
            Compression::Uncompressed,
            ChunkKind::NonAligned,
        );
        chunk.push_page(sealed);

        let mut buffer = Vec::new();
        let metadata = chunk.flush(&mut buffer);
        assert_eq!(buffer[0], ONLY_ONE_PAGE_CHUNK_HEADER);
        assert_eq!(metadata.point_count, 2);
        assert_eq!(metadata.measurement_id, "temperature");

        let (header, consumed) = ChunkHeader::from_bytes(&buffer).unwrap();
        assert_eq!(header.marker, ONLY_ONE_PAGE_CHUNK_HEADER);
        assert_eq!(header.measurement_id, "temperature");
        assert_eq!(header.number_of_pages, 1);
        assert_eq!(header.data_size, buffer.len() as u64 - consumed as u64);
        assert_eq!(header.inline_statistics, Some(metadata.statistics));
    }

    #[test]
    fn multi_page_chunk_uses_general_marker() {
        let mut chunk = ChunkBuffer::new(
            "humidity",
            DataType::Double,
            EncodingKind::Plain,
            Compression::Uncompressed,
            ChunkKind::NonAligned,
        );
        for _ in 0..2 {
            let mut page = PageBuffer::new(DataType::Double, EncodingKind::Plain);
            page.write(&Value::F64(1.0)).unwrap();
            chunk.push_page(page.seal(Compression::Uncompressed, false).unwrap());
        }
        let mut buffer = Vec::new();
        chunk.flush(&mut buffer);
        assert_eq!(buffer[0], CHUNK_HEADER);

        let (header, consumed) = ChunkHeader::from_bytes(&buffer).unwrap();
        assert_eq!(header.marker, CHUNK_HEADER);
        assert_eq!(header.number_of_pages, 2);
        assert_eq!(header.inline_statistics, None);
        assert_eq!(header.data_size, buffer.len() as u64 - consumed as u64);
    }
}
