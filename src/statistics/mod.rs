//! Per-page and per-chunk running statistics: count, min, max, first, last,
//! and — where the type supports it — sum.
//!
//! `DataType` is a closed, compile-time-known set, so the per-type split
//! (`primitive`, `boolean`, `binary`) is unified behind a tagged `Statistics`
//! enum rather than a trait object over `dyn Statistics` — the same
//! tagged-variant shape used for `Value`, and it avoids a downcast on every
//! merge.

pub mod binary;
pub mod boolean;
pub mod primitive;

use binary::BinaryStatistics;
use boolean::BooleanStatistics;
use primitive::PrimitiveStatistics;

use crate::types::{DataType, NativeType, Value};
use crate::varint;

#[derive(Debug, Clone, PartialEq)]
pub enum Statistics {
    Boolean(BooleanStatistics),
    Int32(PrimitiveStatistics<i32>),
    Int64(PrimitiveStatistics<i64>),
    Float(PrimitiveStatistics<f32>),
    Double(PrimitiveStatistics<f64>),
    Binary(BinaryStatistics),
}

impl Statistics {
    pub fn empty(data_type: DataType) -> Self {
        match data_type {
            DataType::Boolean => Statistics::Boolean(BooleanStatistics::default()),
            DataType::Int32 => Statistics::Int32(PrimitiveStatistics::default()),
            DataType::Int64 => Statistics::Int64(PrimitiveStatistics::default()),
            DataType::Float => Statistics::Float(PrimitiveStatistics::default()),
            DataType::Double => Statistics::Double(PrimitiveStatistics::default()),
            DataType::Text | DataType::Blob | DataType::String => {
                Statistics::Binary(BinaryStatistics::default())
            }
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            Statistics::Boolean(s) => s.count,
            Statistics::Int32(s) => s.count,
            Statistics::Int64(s) => s.count,
            Statistics::Float(s) => s.count,
            Statistics::Double(s) => s.count,
            Statistics::Binary(s) => s.count,
        }
    }

    /// Updates running statistics with one present (non-null) value. Does
    /// nothing for `Value::Null`.
    pub fn update(&mut self, value: &Value) {
        match (self, value) {
            (Statistics::Boolean(s), Value::Bool(v)) => s.update(*v),
            (Statistics::Int32(s), Value::I32(v)) => s.update(*v),
            (Statistics::Int64(s), Value::I64(v)) => s.update(*v),
            (Statistics::Float(s), Value::F32(v)) => s.update(*v),
            (Statistics::Double(s), Value::F64(v)) => s.update(*v),
            (Statistics::Binary(s), Value::Bytes(v)) => s.update(v),
            (_, Value::Null) => {}
            (stats, value) => panic!(
                "statistics/value type mismatch: {:?} vs {:?}",
                stats, value
            ),
        }
    }

    /// Merges statistics for a chronologically later page/chunk of the same
    /// series into `self` in place.
    pub fn merge(&mut self, other: &Statistics) {
        match (self, other) {
            (Statistics::Boolean(a), Statistics::Boolean(b)) => a.merge(b),
            (Statistics::Int32(a), Statistics::Int32(b)) => a.merge(b),
            (Statistics::Int64(a), Statistics::Int64(b)) => a.merge(b),
            (Statistics::Float(a), Statistics::Float(b)) => a.merge(b),
            (Statistics::Double(a), Statistics::Double(b)) => a.merge(b),
            (Statistics::Binary(a), Statistics::Binary(b)) => a.merge(b),
            (a, b) => panic!("cannot merge statistics of different types: {:?}/{:?}", a, b),
        }
    }

    /// Serializes this block into the page/chunk header layout: a varint
    /// count, followed by min/max/first/last (and, for numeric types, a sum)
    /// only when `count > 0`.
    pub fn to_bytes(&self, buffer: &mut Vec<u8>) {
        match self {
            Statistics::Boolean(s) => {
                varint::encode_u64(s.count, buffer);
                if s.count > 0 {
                    for v in [s.min_value, s.max_value, s.first_value, s.last_value] {
                        buffer.push(v.unwrap() as u8);
                    }
                }
            }
            Statistics::Int32(s) => write_primitive(buffer, s),
            Statistics::Int64(s) => write_primitive(buffer, s),
            Statistics::Float(s) => write_primitive(buffer, s),
            Statistics::Double(s) => write_primitive(buffer, s),
            Statistics::Binary(s) => {
                varint::encode_u64(s.count, buffer);
                if s.count > 0 {
                    for v in [&s.min_value, &s.max_value, &s.first_value, &s.last_value] {
                        let v = v.as_ref().unwrap();
                        varint::encode_u64(v.len() as u64, buffer);
                        buffer.extend_from_slice(v);
                    }
                }
            }
        }
    }

    /// Parses a block written by [`Statistics::to_bytes`], returning it and
    /// the number of bytes consumed.
    pub fn from_bytes(data_type: DataType, bytes: &[u8]) -> (Statistics, usize) {
        let (count, mut offset) = varint::decode_u64(bytes);
        match data_type {
            DataType::Boolean => {
                let mut s = BooleanStatistics {
                    count,
                    ..Default::default()
                };
                if count > 0 {
                    let flags = [
                        bytes[offset] != 0,
                        bytes[offset + 1] != 0,
                        bytes[offset + 2] != 0,
                        bytes[offset + 3] != 0,
                    ];
                    s.min_value = Some(flags[0]);
                    s.max_value = Some(flags[1]);
                    s.first_value = Some(flags[2]);
                    s.last_value = Some(flags[3]);
                    offset += 4;
                }
                (Statistics::Boolean(s), offset)
            }
            DataType::Int32 => {
                let (s, consumed) = read_primitive::<i32>(count, &bytes[offset..]);
                (Statistics::Int32(s), offset + consumed)
            }
            DataType::Int64 => {
                let (s, consumed) = read_primitive::<i64>(count, &bytes[offset..]);
                (Statistics::Int64(s), offset + consumed)
            }
            DataType::Float => {
                let (s, consumed) = read_primitive::<f32>(count, &bytes[offset..]);
                (Statistics::Float(s), offset + consumed)
            }
            DataType::Double => {
                let (s, consumed) = read_primitive::<f64>(count, &bytes[offset..]);
                (Statistics::Double(s), offset + consumed)
            }
            DataType::Text | DataType::Blob | DataType::String => {
                let mut s = BinaryStatistics {
                    count,
                    ..Default::default()
                };
                if count > 0 {
                    let mut fields = Vec::with_capacity(4);
                    for _ in 0..4 {
                        let (len, n) = varint::decode_u64(&bytes[offset..]);
                        offset += n;
                        let value = bytes[offset..offset + len as usize].to_vec();
                        offset += len as usize;
                        fields.push(value);
                    }
                    s.min_value = Some(fields[0].clone());
                    s.max_value = Some(fields[1].clone());
                    s.first_value = Some(fields[2].clone());
                    s.last_value = Some(fields[3].clone());
                }
                (Statistics::Binary(s), offset)
            }
        }
    }
}

fn write_primitive<T: NativeType>(buffer: &mut Vec<u8>, s: &PrimitiveStatistics<T>) {
    varint::encode_u64(s.count, buffer);
    if s.count > 0 {
        for v in [s.min_value, s.max_value, s.first_value, s.last_value] {
            buffer.extend_from_slice(v.unwrap().to_le_bytes().as_ref());
        }
        buffer.extend_from_slice(&s.sum.to_le_bytes());
    }
}

fn read_primitive<T: NativeType>(count: u64, bytes: &[u8]) -> (PrimitiveStatistics<T>, usize) {
    let mut s = PrimitiveStatistics {
        count,
        ..Default::default()
    };
    let mut offset = 0;
    if count > 0 {
        let width = std::mem::size_of::<T>();
        let mut read = || {
            let value = T::from_le_slice(&bytes[offset..offset + width]);
            offset += width;
            value
        };
        s.min_value = Some(read());
        s.max_value = Some(read());
        s.first_value = Some(read());
        s.last_value = Some(read());
        let mut sum_bytes = [0u8; 8];
        sum_bytes.copy_from_slice(&bytes[offset..offset + 8]);
        s.sum = f64::from_le_bytes(sum_bytes);
        offset += 8;
    }
    (s, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int64_statistics_track_count_min_max_first_last_sum() {
        let mut stats = Statistics::empty(DataType::Int64);
        stats.update(&Value::I64(10));
        stats.update(&Value::I64(20));
        stats.update(&Value::Null);
        match stats {
            Statistics::Int64(s) => {
                assert_eq!(s.count, 2);
                assert_eq!(s.min_value, Some(10));
                assert_eq!(s.max_value, Some(20));
                assert_eq!(s.first_value, Some(10));
                assert_eq!(s.last_value, Some(20));
                assert_eq!(s.sum, 30.0);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn merge_preserves_first_and_last() {
        let mut a = Statistics::empty(DataType::Int32);
        a.update(&Value::I32(5));
        a.update(&Value::I32(1));
        let mut b = Statistics::empty(DataType::Int32);
        b.update(&Value::I32(9));
        b.update(&Value::I32(-3));
        a.merge(&b);
        match a {
            Statistics::Int32(s) => {
                assert_eq!(s.count, 4);
                assert_eq!(s.first_value, Some(5));
                assert_eq!(s.last_value, Some(-3));
                assert_eq!(s.min_value, Some(-3));
                assert_eq!(s.max_value, Some(9));
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn binary_stats_roundtrip_through_bytes() {
        let mut stats = Statistics::empty(DataType::Text);
        stats.update(&Value::Bytes(b"beta".to_vec()));
        stats.update(&Value::Bytes(b"alpha".to_vec()));
        let mut buffer = Vec::new();
        stats.to_bytes(&mut buffer);
        let (decoded, consumed) = Statistics::from_bytes(DataType::Text, &buffer);
        assert_eq!(consumed, buffer.len());
        assert_eq!(decoded, stats);
    }

    #[test]
    fn double_stats_roundtrip_through_bytes() {
        let mut stats = Statistics::empty(DataType::Double);
        stats.update(&Value::F64(1.5));
        stats.update(&Value::F64(-2.25));
        let mut buffer = Vec::new();
        stats.to_bytes(&mut buffer);
        let (decoded, consumed) = Statistics::from_bytes(DataType::Double, &buffer);
        assert_eq!(consumed, buffer.len());
        assert_eq!(decoded, stats);
    }
}
