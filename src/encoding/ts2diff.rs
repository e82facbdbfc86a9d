//! `TS_2DIFF` (second-order delta) encoding for `INT32`/`INT64`: the first
//! value is stored raw, the second as its delta from the first, and every
//! value after that as the delta of the delta — both steps zigzag+varint
//! encoded so that runs of constant or linear series compress to a couple of
//! bytes per point. This is the default time-column encoding.
//!
//! Values are varint-framed one at a time rather than grouped into
//! fixed-width bit-packed mini-blocks; DESIGN.md records this as a
//! deliberate simplification.

use super::{Decoder, Encoder};
use crate::error::{type_mismatch_err, Result};
use crate::types::{DataType, Value};
use crate::varint;

#[derive(Debug)]
pub struct Ts2DiffEncoder {
    data_type: DataType,
    buffer: Vec<u8>,
    count: u64,
    prev_value: i64,
    prev_delta: i64,
}

impl Ts2DiffEncoder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            buffer: Vec::new(),
            count: 0,
            prev_value: 0,
            prev_delta: 0,
        }
    }

    fn as_i64(&self, value: &Value) -> Result<i64> {
        match (self.data_type, value) {
            (DataType::Int64, Value::I64(v)) => Ok(*v),
            (DataType::Int32, Value::I32(v)) => Ok(*v as i64),
            _ => Err(type_mismatch_err!(
                "TS_2DIFF encoder for {:?} received {:?}",
                self.data_type,
                value
            )),
        }
    }
}

impl Encoder for Ts2DiffEncoder {
    fn encode(&mut self, value: &Value) -> Result<()> {
        let v = self.as_i64(value)?;
        if self.count == 0 {
            varint::encode_i64(v, &mut self.buffer);
        } else if self.count == 1 {
            let delta = v - self.prev_value;
            varint::encode_i64(delta, &mut self.buffer);
            self.prev_delta = delta;
        } else {
            let delta = v - self.prev_value;
            varint::encode_i64(delta - self.prev_delta, &mut self.buffer);
            self.prev_delta = delta;
        }
        self.prev_value = v;
        self.count += 1;
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.buffer.len()
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        self.count = 0;
        self.prev_value = 0;
        self.prev_delta = 0;
        Ok(std::mem::take(&mut self.buffer))
    }
}

#[derive(Debug)]
pub struct Ts2DiffDecoder {
    data_type: DataType,
}

impl Ts2DiffDecoder {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }

    fn from_i64(&self, v: i64) -> Value {
        match self.data_type {
            DataType::Int32 => Value::I32(v as i32),
            _ => Value::I64(v),
        }
    }
}

impl Decoder for Ts2DiffDecoder {
    fn decode(&self, bytes: &[u8], count: u32) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(count as usize);
        let mut offset = 0usize;
        let mut prev_value = 0i64;
        let mut prev_delta = 0i64;
        for i in 0..count {
            let (raw, consumed) = varint::decode_i64(&bytes[offset..]);
            offset += consumed;
            let v = if i == 0 {
                raw
            } else if i == 1 {
                prev_delta = raw;
                prev_value + raw
            } else {
                let delta = raw + prev_delta;
                prev_delta = delta;
                prev_value + delta
            };
            prev_value = v;
            out.push(self.from_i64(v));
        }
        Ok(out)
    }
}
