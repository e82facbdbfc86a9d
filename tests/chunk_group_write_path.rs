//! Exercises the chunk-group write path end to end through its public API:
//! registering series, writing points and tablets, and flushing a whole
//! group through a `FileWriter`.

use tsfile_chunkgroup::compression::Compression;
use tsfile_chunkgroup::encoding::EncodingKind;
use tsfile_chunkgroup::schema::{CHUNK_HEADER, ONLY_ONE_PAGE_CHUNK_HEADER};
use tsfile_chunkgroup::tablet::TabletColumn;
use tsfile_chunkgroup::{ChunkGroupWriter, DataType, FileWriter, MeasurementSchema, Tablet, Value, WriterOptions};

fn schema(name: &str, data_type: DataType, encoding: EncodingKind) -> MeasurementSchema {
    MeasurementSchema::new(name, data_type, encoding, Compression::Uncompressed)
}

/// A non-aligned single series with a huge page-size threshold seals
/// exactly one page holding every point, including a trailing null.
#[test]
fn non_aligned_single_series_seals_one_page_with_null_excluded_from_stats() {
    let mut options = WriterOptions::default();
    options.page_size_threshold_bytes = 1_000_000_000;

    let mut group = ChunkGroupWriter::new("device-1");
    group
        .try_to_add_series_writer(schema("s1", DataType::Int64, EncodingKind::Plain), &options)
        .unwrap();
    group.write_point("s1", 1, &Value::I64(10), &options).unwrap();
    group.write_point("s1", 2, &Value::I64(20), &options).unwrap();
    group.write_point("s1", 3, &Value::Null, &options).unwrap();

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    file_writer.end().unwrap();

    assert_eq!(metadata.chunks.len(), 1);
    let chunk = &metadata.chunks[0];
    assert_eq!(chunk.measurement_id, "s1");
    assert_eq!(chunk.point_count, 3);
    match &chunk.statistics {
        tsfile_chunkgroup::statistics::Statistics::Int64(s) => {
            assert_eq!(s.count, 2);
            assert_eq!(s.min_value, Some(10));
            assert_eq!(s.max_value, Some(20));
            assert_eq!(s.first_value, Some(10));
            assert_eq!(s.last_value, Some(20));
            assert_eq!(s.sum, 30.0);
        }
        other => panic!("expected Int64 statistics, got {:?}", other),
    }
}

/// An aligned group where different rows omit different columns ends up
/// with every chunk reporting the same point count, and each value chunk's
/// statistics reflect only its own non-null rows.
#[test]
fn aligned_group_tracks_nulls_independently_per_column() {
    let options = WriterOptions::default();
    let mut group = ChunkGroupWriter::new("device-2");

    let v1 = schema("v1", DataType::Int32, EncodingKind::Plain);
    let v2 = schema("v2", DataType::Double, EncodingKind::Plain);
    let tablet = Tablet::new(
        vec![1, 2, 3],
        vec![
            TabletColumn {
                schema: v1,
                values: vec![Value::I32(7), Value::Null, Value::I32(9)],
            },
            TabletColumn {
                schema: v2,
                values: vec![Value::Null, Value::F64(3.5), Value::F64(4.5)],
            },
        ],
    )
    .unwrap();
    group.write_tablet(&tablet, true, &options).unwrap();

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    file_writer.end().unwrap();

    assert_eq!(metadata.chunks.len(), 3);
    for chunk in &metadata.chunks {
        assert_eq!(chunk.point_count, 3, "chunk {} should see every row", chunk.measurement_id);
    }
    let v1_chunk = metadata.chunks.iter().find(|c| c.measurement_id == "v1").unwrap();
    match &v1_chunk.statistics {
        tsfile_chunkgroup::statistics::Statistics::Int32(s) => assert_eq!(s.count, 2),
        other => panic!("expected Int32 statistics, got {:?}", other),
    }
    let v2_chunk = metadata.chunks.iter().find(|c| c.measurement_id == "v2").unwrap();
    match &v2_chunk.statistics {
        tsfile_chunkgroup::statistics::Statistics::Double(s) => assert_eq!(s.count, 2),
        other => panic!("expected Double statistics, got {:?}", other),
    }
}

/// A single point, flushed with no further writes, produces a single-page
/// chunk tagged with the single-page marker (flushing seals whatever page
/// is still open).
#[test]
fn explicit_seal_then_flush_yields_single_page_chunk() {
    let options = WriterOptions::default();
    let mut group = ChunkGroupWriter::new("device-3");
    group
        .try_to_add_series_writer(schema("solo", DataType::Double, EncodingKind::Plain), &options)
        .unwrap();
    group.write_point("solo", 1, &Value::F64(42.0), &options).unwrap();

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    let bytes = file_writer.end().unwrap();

    assert_eq!(metadata.chunks[0].point_count, 1);
    // the chunk header's marker byte sits right after the file's magic
    // header and the (empty) chunk-group-start framing.
    let marker_offset = tsfile_chunkgroup::write::file_writer::MAGIC.len();
    assert_eq!(bytes[marker_offset], ONLY_ONE_PAGE_CHUNK_HEADER);
}

/// A windowed tablet write touches only the requested rows and columns,
/// leaving every other series writer untouched.
#[test]
fn windowed_tablet_write_only_touches_the_requested_rows_and_columns() {
    let options = WriterOptions::default();
    let mut group = ChunkGroupWriter::new("device-4");

    let columns: Vec<TabletColumn> = (0..4)
        .map(|i| TabletColumn {
            schema: schema(&format!("c{i}"), DataType::Int64, EncodingKind::Plain),
            values: (0..10).map(|r| Value::I64((i * 100 + r) as i64)).collect(),
        })
        .collect();
    let tablet = Tablet::new((0..10).collect(), columns).unwrap();

    group
        .write_tablet_range(&tablet, 2, 5, 1, 3, false, &options)
        .unwrap();

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    file_writer.end().unwrap();

    let touched: Vec<&str> = metadata.chunks.iter().map(|c| c.measurement_id.as_str()).collect();
    assert_eq!(touched.len(), 2);
    assert!(touched.contains(&"c1"));
    assert!(touched.contains(&"c2"));
    for chunk in &metadata.chunks {
        assert_eq!(chunk.point_count, 3);
    }
}

/// Boundary: writing exactly `max_points_per_page` points leaves the chunk
/// with one sealed page and an empty open page — flushing still yields
/// exactly that many points and a single-page marker.
#[test]
fn writing_exactly_max_points_per_page_seals_one_full_page() {
    let mut options = WriterOptions::default();
    options.max_points_per_page = 4;

    let mut group = ChunkGroupWriter::new("device-5");
    group
        .try_to_add_series_writer(schema("s1", DataType::Int32, EncodingKind::Plain), &options)
        .unwrap();
    for i in 0..4 {
        group.write_point("s1", i, &Value::I32(i as i32), &options).unwrap();
    }

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    file_writer.end().unwrap();

    assert_eq!(metadata.chunks[0].point_count, 4);
}

/// Writing zero points then flushing emits no chunk for that series.
#[test]
fn empty_series_is_dropped_from_the_flushed_group() {
    let options = WriterOptions::default();
    let mut group = ChunkGroupWriter::new("device-6");
    group
        .try_to_add_series_writer(schema("never-written", DataType::Int64, EncodingKind::Plain), &options)
        .unwrap();
    assert!(group.is_empty());

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    file_writer.end().unwrap();

    assert_eq!(metadata.chunks.len(), 0);
}

/// Flushing a multi-page chunk uses the general (non-single-page) marker.
#[test]
fn multi_page_chunk_uses_general_chunk_marker() {
    let mut options = WriterOptions::default();
    options.max_points_per_page = 2;

    let mut group = ChunkGroupWriter::new("device-7");
    group
        .try_to_add_series_writer(schema("s1", DataType::Int32, EncodingKind::Plain), &options)
        .unwrap();
    for i in 0..5 {
        group.write_point("s1", i, &Value::I32(i as i32), &options).unwrap();
    }

    let mut file_writer = FileWriter::start(Vec::new()).unwrap();
    let metadata = group.flush_to_file_writer(&mut file_writer, &options).unwrap();
    let bytes = file_writer.end().unwrap();

    assert_eq!(metadata.chunks[0].point_count, 5);
    let marker_offset = tsfile_chunkgroup::write::file_writer::MAGIC.len();
    assert_eq!(bytes[marker_offset], CHUNK_HEADER);
}
