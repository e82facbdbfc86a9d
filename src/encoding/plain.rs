//! `PLAIN` encoding: fixed-width values written as raw little-endian bytes;
//! variable-length values (`TEXT`/`BLOB`/`STRING`) written as a ULEB128
//! length prefix followed by the raw bytes.

use super::{Decoder, Encoder};
use crate::error::{type_mismatch_err, Result};
use crate::types::{DataType, Value};
use crate::varint;

#[derive(Debug)]
pub struct PlainEncoder {
    data_type: DataType,
    buffer: Vec<u8>,
}

impl PlainEncoder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            buffer: Vec::new(),
        }
    }
}

impl Encoder for PlainEncoder {
    fn encode(&mut self, value: &Value) -> Result<()> {
        match (self.data_type, value) {
            (DataType::Boolean, Value::Bool(v)) => self.buffer.push(*v as u8),
            (DataType::Int32, Value::I32(v)) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (DataType::Int64, Value::I64(v)) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (DataType::Float, Value::F32(v)) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (DataType::Double, Value::F64(v)) => self.buffer.extend_from_slice(&v.to_le_bytes()),
            (DataType::Text | DataType::Blob | DataType::String, Value::Bytes(v)) => {
                varint::encode_u64(v.len() as u64, &mut self.buffer);
                self.buffer.extend_from_slice(v);
            }
            _ => {
                return Err(type_mismatch_err!(
                    "PLAIN encoder for {:?} received {:?}",
                    self.data_type,
                    value
                ))
            }
        }
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.buffer.len()
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        Ok(std::mem::take(&mut self.buffer))
    }
}

#[derive(Debug)]
pub struct PlainDecoder {
    data_type: DataType,
}

impl PlainDecoder {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }
}

impl Decoder for PlainDecoder {
    fn decode(&self, bytes: &[u8], count: u32) -> Result<Vec<Value>> {
        let mut out = Vec::with_capacity(count as usize);
        let mut offset = 0usize;
        for _ in 0..count {
            let value = match self.data_type {
                DataType::Boolean => {
                    let v = bytes[offset] != 0;
                    offset += 1;
                    Value::Bool(v)
                }
                DataType::Int32 => {
                    let v = i32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
                    offset += 4;
                    Value::I32(v)
                }
                DataType::Int64 => {
                    let v = i64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
                    offset += 8;
                    Value::I64(v)
                }
                DataType::Float => {
                    let v = f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap());
                    offset += 4;
                    Value::F32(v)
                }
                DataType::Double => {
                    let v = f64::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap());
                    offset += 8;
                    Value::F64(v)
                }
                DataType::Text | DataType::Blob | DataType::String => {
                    let (len, consumed) = varint::decode_u64(&bytes[offset..]);
                    offset += consumed;
                    let len = len as usize;
                    let v = bytes[offset..offset + len].to_vec();
                    offset += len;
                    Value::Bytes(v)
                }
            };
            out.push(value);
        }
        Ok(out)
    }
}
