//! Writes through the public chunk-group write path, then reads the bytes
//! back through the symmetric reader and checks the decoded values match
//! what was written.

use tsfile_chunkgroup::compression::Compression;
use tsfile_chunkgroup::encoding::EncodingKind;
use tsfile_chunkgroup::read::{read_chunk, read_non_aligned_chunk};
use tsfile_chunkgroup::schema::{CHUNK_HEADER, ONLY_ONE_PAGE_CHUNK_HEADER};
use tsfile_chunkgroup::tablet::TabletColumn;
use tsfile_chunkgroup::write::file_writer::MAGIC;
use tsfile_chunkgroup::{ChunkGroupWriter, DataType, FileWriter, MeasurementSchema, Tablet, Value, WriterOptions};

fn schema(name: &str, data_type: DataType, encoding: EncodingKind) -> MeasurementSchema {
    MeasurementSchema::new(name, data_type, encoding, Compression::Lz4)
}

/// A non-aligned series written across two pages round-trips through
/// `read_non_aligned_chunk` with both timestamps and values intact.
#[test]
fn non_aligned_chunk_round_trips_through_the_reader() {
    let mut options = WriterOptions::default();
    options.max_points_per_page = 3;

    let mut group = ChunkGroupWriter::new("device-1");
    group
        .try_to_add_series_writer(schema("s1", DataType::Int64, EncodingKind::Ts2Diff), &options)
        .unwrap();
    let points: Vec<i64> = (0..5).map(|i| i * 10).collect();
    for (t, v) in points.iter().enumerate() {
        group
            .write_point("s1", t as i64, &Value::I64(*v), &options)
            .unwrap();
    }

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    let bytes = file_writer.end().unwrap();

    assert_eq!(metadata.chunks.len(), 1);
    let chunk_offset = MAGIC.len() + metadata.chunks[0].offset;
    assert_eq!(bytes[chunk_offset], CHUNK_HEADER);

    let (header, pages, consumed) = read_non_aligned_chunk(
        &bytes[chunk_offset..],
        options.write_page_crc,
        options.default_time_encoding,
        options.default_time_compression,
    )
    .unwrap();
    assert_eq!(header.measurement_id, "s1");
    assert_eq!(header.number_of_pages, 2);
    assert_eq!(consumed, header.data_size as usize + (chunk_header_prefix_len(&bytes[chunk_offset..])));

    let decoded_timestamps: Vec<i64> = pages
        .iter()
        .flat_map(|p| p.timestamps.iter().map(|v| v.as_i64().unwrap()))
        .collect();
    let decoded_values: Vec<i64> = pages
        .iter()
        .flat_map(|p| p.values.iter().map(|v| v.as_i64().unwrap()))
        .collect();
    assert_eq!(decoded_timestamps, (0..5).collect::<Vec<i64>>());
    assert_eq!(decoded_values, points);
}

/// Helper mirroring the header-prefix length `ChunkHeader::from_bytes`
/// consumes, so the test can cross-check `consumed` against `data_size`
/// without re-deriving the whole header parse.
fn chunk_header_prefix_len(bytes: &[u8]) -> usize {
    let (_, prefix_len) = tsfile_chunkgroup::chunk::ChunkHeader::from_bytes(bytes).unwrap();
    prefix_len
}

/// A single-page non-aligned chunk (the common case for a short series)
/// round-trips too, exercising the inline-statistics/no-page-statistics
/// path end to end.
#[test]
fn single_page_non_aligned_chunk_round_trips() {
    let options = WriterOptions::default();
    let mut group = ChunkGroupWriter::new("device-2");
    group
        .try_to_add_series_writer(schema("solo", DataType::Double, EncodingKind::Plain), &options)
        .unwrap();
    group.write_point("solo", 1, &Value::F64(42.5), &options).unwrap();
    group.write_point("solo", 2, &Value::F64(43.5), &options).unwrap();

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    let bytes = file_writer.end().unwrap();

    let chunk_offset = MAGIC.len() + metadata.chunks[0].offset;
    assert_eq!(bytes[chunk_offset], ONLY_ONE_PAGE_CHUNK_HEADER);

    let (_, pages, _) = read_non_aligned_chunk(
        &bytes[chunk_offset..],
        options.write_page_crc,
        options.default_time_encoding,
        options.default_time_compression,
    )
    .unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(
        pages[0].values,
        vec![Value::F64(42.5), Value::F64(43.5)]
    );
}

/// An aligned group's time and value chunks are each fully self-describing
/// and round-trip through the generic `read_chunk`.
#[test]
fn aligned_group_chunks_round_trip_through_read_chunk() {
    let options = WriterOptions::default();
    let mut group = ChunkGroupWriter::new("device-3");

    let v1 = schema("v1", DataType::Int32, EncodingKind::Plain);
    let tablet = Tablet::new(
        vec![1, 2, 3],
        vec![TabletColumn {
            schema: v1,
            values: vec![Value::I32(7), Value::I32(8), Value::I32(9)],
        }],
    )
    .unwrap();
    group.write_tablet(&tablet, true, &options).unwrap();

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    let bytes = file_writer.end().unwrap();

    assert_eq!(metadata.chunks.len(), 2);
    for chunk in &metadata.chunks {
        let chunk_offset = MAGIC.len() + chunk.offset;
        let (decoded, consumed) = read_chunk(&bytes[chunk_offset..], options.write_page_crc).unwrap();
        assert!(consumed > 0);
        assert_eq!(decoded.header.measurement_id, chunk.measurement_id);
        let total_values: usize = decoded.pages.iter().map(|p| p.values.len()).sum();
        assert_eq!(total_values, 3);
        if chunk.measurement_id == "v1" {
            let values: Vec<i32> = decoded
                .pages
                .iter()
                .flat_map(|p| p.values.iter().map(|v| v.as_i32().unwrap()))
                .collect();
            assert_eq!(values, vec![7, 8, 9]);
        }
    }
}
