//! `RLE` (run-length) encoding: runs of identical values are stored as
//! `(run_length varint, value bytes)` pairs. Effective for `BOOLEAN` columns
//! and low-cardinality fixed-width columns. Pure run-length, with no
//! literal-run fallback for high-cardinality stretches.

use super::{Decoder, Encoder};
use crate::error::{type_mismatch_err, Result};
use crate::types::{DataType, Value};
use crate::varint;

fn value_bytes(data_type: DataType, value: &Value) -> Result<Vec<u8>> {
    match (data_type, value) {
        (DataType::Boolean, Value::Bool(v)) => Ok(vec![*v as u8]),
        (DataType::Int32, Value::I32(v)) => Ok(v.to_le_bytes().to_vec()),
        (DataType::Int64, Value::I64(v)) => Ok(v.to_le_bytes().to_vec()),
        (DataType::Float, Value::F32(v)) => Ok(v.to_le_bytes().to_vec()),
        (DataType::Double, Value::F64(v)) => Ok(v.to_le_bytes().to_vec()),
        _ => Err(type_mismatch_err!(
            "RLE encoder for {:?} received {:?}",
            data_type,
            value
        )),
    }
}

fn width(data_type: DataType) -> usize {
    match data_type {
        DataType::Boolean => 1,
        DataType::Int32 | DataType::Float => 4,
        DataType::Int64 | DataType::Double => 8,
        DataType::Text | DataType::Blob | DataType::String => {
            unreachable!("RLE does not support variable-length types")
        }
    }
}

fn decode_value(data_type: DataType, bytes: &[u8]) -> Value {
    match data_type {
        DataType::Boolean => Value::Bool(bytes[0] != 0),
        DataType::Int32 => Value::I32(i32::from_le_bytes(bytes.try_into().unwrap())),
        DataType::Int64 => Value::I64(i64::from_le_bytes(bytes.try_into().unwrap())),
        DataType::Float => Value::F32(f32::from_le_bytes(bytes.try_into().unwrap())),
        DataType::Double => Value::F64(f64::from_le_bytes(bytes.try_into().unwrap())),
        DataType::Text | DataType::Blob | DataType::String => {
            unreachable!("RLE does not support variable-length types")
        }
    }
}

#[derive(Debug)]
pub struct RleEncoder {
    data_type: DataType,
    buffer: Vec<u8>,
    run_value: Option<Vec<u8>>,
    run_length: u64,
}

impl RleEncoder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            buffer: Vec::new(),
            run_value: None,
            run_length: 0,
        }
    }

    fn flush_run(&mut self) {
        if let Some(run_value) = self.run_value.take() {
            varint::encode_u64(self.run_length, &mut self.buffer);
            self.buffer.extend_from_slice(&run_value);
            self.run_length = 0;
        }
    }
}

impl Encoder for RleEncoder {
    fn encode(&mut self, value: &Value) -> Result<()> {
        let bytes = value_bytes(self.data_type, value)?;
        match &self.run_value {
            Some(current) if current == &bytes => {
                self.run_length += 1;
            }
            _ => {
                self.flush_run();
                self.run_value = Some(bytes);
                self.run_length = 1;
            }
        }
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.buffer.len() + if self.run_value.is_some() { 10 + width(self.data_type) } else { 0 }
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        self.flush_run();
        Ok(std::mem::take(&mut self.buffer))
    }
}

#[derive(Debug)]
pub struct RleDecoder {
    data_type: DataType,
}

impl RleDecoder {
    pub fn new(data_type: DataType) -> Self {
        Self { data_type }
    }
}

impl Decoder for RleDecoder {
    fn decode(&self, bytes: &[u8], count: u32) -> Result<Vec<Value>> {
        let width = width(self.data_type);
        let mut out = Vec::with_capacity(count as usize);
        let mut offset = 0usize;
        while out.len() < count as usize {
            let (run_length, consumed) = varint::decode_u64(&bytes[offset..]);
            offset += consumed;
            let value = decode_value(self.data_type, &bytes[offset..offset + width]);
            offset += width;
            for _ in 0..run_length {
                out.push(value.clone());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_runs() {
        let mut enc = RleEncoder::new(DataType::Boolean);
        let values = [true, true, true, false, false, true];
        for v in values {
            enc.encode(&Value::Bool(v)).unwrap();
        }
        let bytes = enc.flush().unwrap();
        let dec = RleDecoder::new(DataType::Boolean);
        let decoded = dec.decode(&bytes, values.len() as u32).unwrap();
        let decoded: Vec<bool> = decoded.into_iter().map(|v| v.as_bool().unwrap()).collect();
        assert_eq!(decoded, values);
    }

    #[test]
    fn roundtrip_single_run() {
        let mut enc = RleEncoder::new(DataType::Int32);
        for _ in 0..5 {
            enc.encode(&Value::I32(7)).unwrap();
        }
        let bytes = enc.flush().unwrap();
        assert!(bytes.len() < 5 * 4);
        let dec = RleDecoder::new(DataType::Int32);
        let decoded = dec.decode(&bytes, 5).unwrap();
        assert_eq!(decoded, vec![Value::I32(7); 5]);
    }
}
