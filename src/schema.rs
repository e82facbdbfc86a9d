//! Series schema and the binary marker bytes that tag chunk and page
//! headers on disk.

use crate::compression::Compression;
use crate::encoding::EncodingKind;
use crate::types::DataType;

/// Marks a chunk header belonging to a non-aligned (single, self-contained)
/// series chunk with more than one page.
pub const CHUNK_HEADER: u8 = 0x05;
/// Marks a non-aligned chunk header that holds exactly one page; its
/// statistics are folded into the header rather than the page.
pub const ONLY_ONE_PAGE_CHUNK_HEADER: u8 = 0x01;
/// Marks the time column's chunk header within an aligned chunk group.
pub const TIME_CHUNK_HEADER: u8 = 0x06;
/// Marks a value column's chunk header within an aligned chunk group.
pub const VALUE_CHUNK_HEADER: u8 = 0x07;
/// Single-page variant of [`TIME_CHUNK_HEADER`].
pub const ONLY_ONE_PAGE_TIME_CHUNK_HEADER: u8 = 0x02;
/// Single-page variant of [`VALUE_CHUNK_HEADER`].
pub const ONLY_ONE_PAGE_VALUE_CHUNK_HEADER: u8 = 0x03;

/// The schema of one measurement (series) within a device's chunk group:
/// its name, physical type, and the encoding/compression pair its chunk
/// writer uses.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSchema {
    pub measurement_id: String,
    pub data_type: DataType,
    pub encoding: EncodingKind,
    pub compression: Compression,
}

impl MeasurementSchema {
    pub fn new(
        measurement_id: impl Into<String>,
        data_type: DataType,
        encoding: EncodingKind,
        compression: Compression,
    ) -> Self {
        Self {
            measurement_id: measurement_id.into(),
            data_type,
            encoding,
            compression,
        }
    }
}
