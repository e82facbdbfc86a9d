//! A minimal decode path mirroring the write path's own framing: composes
//! [`crate::chunk::ChunkHeader::from_bytes`], [`crate::page::PageHeader::from_bytes`],
//! `Codec::decompress`, and `Decoder::decode` to recover the values a chunk
//! writer produced. This exists as test infrastructure for the round-trip
//! properties exercised under `tests/`, not as a general query path: callers
//! of [`read_non_aligned_chunk`] must already know the time column's
//! encoding/compression, since a non-aligned chunk's header only describes
//! its value column (see DESIGN.md's "Non-aligned chunk physical layout"
//! note).
//!
//! Values are recovered assuming no nulls were written: a null advances a
//! page's point count without leaving any in-band marker, so a page that
//! mixed nulls with real values cannot have its null positions recovered
//! here.

use crate::chunk::ChunkHeader;
use crate::compression::{create_codec, Compression};
use crate::encoding::{create_decoder, EncodingKind};
use crate::error::Result;
use crate::page::PageHeader;
use crate::types::{DataType, Value};
use crate::varint;

/// One decoded page: its header (statistics, point count, sizes) and the
/// values recovered from its compressed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPage {
    pub header: PageHeader,
    pub values: Vec<Value>,
}

/// A chunk's header plus every one of its pages, decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedChunk {
    pub header: ChunkHeader,
    pub pages: Vec<DecodedPage>,
}

fn decompress(compression: Compression, payload: &[u8], uncompressed_size: usize) -> Result<Vec<u8>> {
    match create_codec(&compression)? {
        Some(mut codec) => {
            let mut out = vec![0u8; uncompressed_size];
            codec.decompress(payload, &mut out)?;
            Ok(out)
        }
        None => Ok(payload.to_vec()),
    }
}

fn decode_stream(
    data_type: DataType,
    encoding: EncodingKind,
    compression: Compression,
    payload: &[u8],
    uncompressed_size: usize,
    point_count: u32,
) -> Result<Vec<Value>> {
    let raw = decompress(compression, payload, uncompressed_size)?;
    create_decoder(encoding, data_type).decode(&raw, point_count)
}

/// Decodes a self-describing (`Time`- or `Value`-kind, or single-stream
/// non-aligned) chunk starting at `bytes[0]`, returning the decoded chunk and
/// the number of bytes consumed.
///
/// Not valid for multi-page-packed non-aligned chunks, whose page payload
/// interleaves a separate time sub-stream ahead of the value bytes — use
/// [`read_non_aligned_chunk`] for those instead.
pub fn read_chunk(bytes: &[u8], has_crc: bool) -> Result<(DecodedChunk, usize)> {
    let (header, mut offset) = ChunkHeader::from_bytes(bytes)?;
    let single_page = header.number_of_pages == 1;
    let mut pages = Vec::with_capacity(header.number_of_pages as usize);
    for _ in 0..header.number_of_pages {
        let (page_header, consumed) =
            PageHeader::from_bytes(header.data_type, has_crc, single_page, &bytes[offset..]);
        offset += consumed;
        let payload = &bytes[offset..offset + page_header.compressed_size];
        offset += page_header.compressed_size;
        let values = decode_stream(
            header.data_type,
            header.encoding,
            header.compression,
            payload,
            page_header.uncompressed_size,
            page_header.point_count,
        )?;
        pages.push(DecodedPage {
            header: page_header,
            values,
        });
    }
    Ok((DecodedChunk { header, pages }, offset))
}

/// One decoded page of a non-aligned chunk: the timestamps and values
/// recovered from its packed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedNonAlignedPage {
    pub point_count: u32,
    pub timestamps: Vec<Value>,
    pub values: Vec<Value>,
}

/// Decodes a non-aligned chunk, whose page payload is laid out as
/// `varint(time_uncompressed_len) ++ varint(time_compressed_len) ++
/// time_compressed ++ varint(value_uncompressed_len) ++ value_compressed`
/// (see `ChunkWriter::seal_current_page`). The caller supplies the time
/// column's encoding/compression since the chunk header only describes the
/// value column.
pub fn read_non_aligned_chunk(
    bytes: &[u8],
    has_crc: bool,
    time_encoding: EncodingKind,
    time_compression: Compression,
) -> Result<(ChunkHeader, Vec<DecodedNonAlignedPage>, usize)> {
    let (header, mut offset) = ChunkHeader::from_bytes(bytes)?;
    let single_page = header.number_of_pages == 1;
    let mut pages = Vec::with_capacity(header.number_of_pages as usize);
    for _ in 0..header.number_of_pages {
        let (page_header, consumed) =
            PageHeader::from_bytes(header.data_type, has_crc, single_page, &bytes[offset..]);
        offset += consumed;
        let packed = &bytes[offset..offset + page_header.compressed_size];
        offset += page_header.compressed_size;

        let (time_raw_len, n1) = varint::decode_u64(packed);
        let (time_compressed_len, n2) = varint::decode_u64(&packed[n1..]);
        let time_start = n1 + n2;
        let time_compressed = &packed[time_start..time_start + time_compressed_len as usize];
        let mut cursor = time_start + time_compressed_len as usize;
        let (value_raw_len, n3) = varint::decode_u64(&packed[cursor..]);
        cursor += n3;
        let value_compressed = &packed[cursor..];

        let timestamps = decode_stream(
            DataType::Int64,
            time_encoding,
            time_compression,
            time_compressed,
            time_raw_len as usize,
            page_header.point_count,
        )?;
        let values = decode_stream(
            header.data_type,
            header.encoding,
            header.compression,
            value_compressed,
            value_raw_len as usize,
            page_header.point_count,
        )?;
        pages.push(DecodedNonAlignedPage {
            point_count: page_header.point_count,
            timestamps,
            values,
        });
    }
    Ok((header, pages, offset))
}
