//! `DICTIONARY` encoding for `TEXT`/`BLOB`/`STRING` columns: distinct byte
//! strings are assigned dense indices in first-seen order, and the page
//! stores the dictionary once followed by one varint index per value, all
//! folded into a single page payload rather than a side dictionary page.

use std::collections::HashMap;

use super::{Decoder, Encoder};
use crate::error::{type_mismatch_err, Result};
use crate::types::Value;
use crate::varint;

#[derive(Debug, Default)]
pub struct DictionaryEncoder {
    dictionary: Vec<Vec<u8>>,
    index_of: HashMap<Vec<u8>, u32>,
    indices: Vec<u32>,
}

impl DictionaryEncoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder for DictionaryEncoder {
    fn encode(&mut self, value: &Value) -> Result<()> {
        let bytes = match value {
            Value::Bytes(v) => v.clone(),
            _ => return Err(type_mismatch_err!("DICTIONARY encoder received {:?}", value)),
        };
        let index = match self.index_of.get(&bytes) {
            Some(index) => *index,
            None => {
                let index = self.dictionary.len() as u32;
                self.index_of.insert(bytes.clone(), index);
                self.dictionary.push(bytes);
                index
            }
        };
        self.indices.push(index);
        Ok(())
    }

    fn estimated_size(&self) -> usize {
        self.dictionary.iter().map(|v| v.len() + 10).sum::<usize>() + self.indices.len() * 5
    }

    fn flush(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        varint::encode_u64(self.dictionary.len() as u64, &mut buffer);
        for entry in &self.dictionary {
            varint::encode_u64(entry.len() as u64, &mut buffer);
            buffer.extend_from_slice(entry);
        }
        for index in &self.indices {
            varint::encode_u64(*index as u64, &mut buffer);
        }
        self.dictionary.clear();
        self.index_of.clear();
        self.indices.clear();
        Ok(buffer)
    }
}

#[derive(Debug, Default)]
pub struct DictionaryDecoder {}

impl DictionaryDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for DictionaryDecoder {
    fn decode(&self, bytes: &[u8], count: u32) -> Result<Vec<Value>> {
        let mut offset = 0usize;
        let (dict_len, consumed) = varint::decode_u64(&bytes[offset..]);
        offset += consumed;
        let mut dictionary = Vec::with_capacity(dict_len as usize);
        for _ in 0..dict_len {
            let (len, consumed) = varint::decode_u64(&bytes[offset..]);
            offset += consumed;
            let len = len as usize;
            dictionary.push(bytes[offset..offset + len].to_vec());
            offset += len;
        }
        let mut out = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let (index, consumed) = varint::decode_u64(&bytes[offset..]);
            offset += consumed;
            out.push(Value::Bytes(dictionary[index as usize].clone()));
        }
        Ok(out)
    }
}
