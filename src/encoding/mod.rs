//! Per-type numeric encoding state machines, one module per algorithm under
//! `encoding/`.
//!
//! Encoders are exposed behind a narrow capability trait
//! (`encode`/`flush`/`estimated_size`) instead of a per-type overload set.

pub mod dictionary;
pub mod gorilla;
pub mod plain;
pub mod rle;
pub mod ts2diff;
pub mod zigzag;

use crate::error::Result;
use crate::types::{DataType, Value};

/// The closed set of encodings this writer knows how to produce.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum EncodingKind {
    Plain,
    Ts2Diff,
    Gorilla,
    Rle,
    Dictionary,
    ZigZag,
}

/// Encodes a stream of non-null values of one fixed data type into bytes.
///
/// Nulls are never passed to an encoder: nullability lives only in the
/// page's point-count bookkeeping, never in the encoded stream itself.
pub trait Encoder: std::fmt::Debug {
    /// Encodes one value. `value` is never `Value::Null`.
    fn encode(&mut self, value: &Value) -> Result<()>;

    /// An upper bound on the bytes `flush` would currently produce; used by
    /// the page-size policy without forcing a flush.
    fn estimated_size(&self) -> usize;

    /// Flushes any residual encoder state into a self-contained byte buffer
    /// and resets the encoder to accept a fresh run of values.
    fn flush(&mut self) -> Result<Vec<u8>>;
}

/// The decoder counterpart to `Encoder`, used by round-trip tests to check
/// that every encoder recovers the values it was given.
pub trait Decoder: std::fmt::Debug {
    /// Decodes exactly `count` values from `bytes`, which must be the full
    /// output of one `Encoder::flush` call.
    fn decode(&self, bytes: &[u8], count: u32) -> Result<Vec<Value>>;
}

/// Builds an encoder for `kind` over values of `data_type`.
pub fn create_encoder(kind: EncodingKind, data_type: DataType) -> Box<dyn Encoder> {
    match kind {
        EncodingKind::Plain => Box::new(plain::PlainEncoder::new(data_type)),
        EncodingKind::Ts2Diff => Box::new(ts2diff::Ts2DiffEncoder::new(data_type)),
        EncodingKind::Gorilla => Box::new(gorilla::GorillaEncoder::new(data_type)),
        EncodingKind::Rle => Box::new(rle::RleEncoder::new(data_type)),
        EncodingKind::Dictionary => Box::new(dictionary::DictionaryEncoder::new()),
        EncodingKind::ZigZag => Box::new(zigzag::ZigZagEncoder::new(data_type)),
    }
}

/// Builds a decoder for `kind` over values of `data_type`.
pub fn create_decoder(kind: EncodingKind, data_type: DataType) -> Box<dyn Decoder> {
    match kind {
        EncodingKind::Plain => Box::new(plain::PlainDecoder::new(data_type)),
        EncodingKind::Ts2Diff => Box::new(ts2diff::Ts2DiffDecoder::new(data_type)),
        EncodingKind::Gorilla => Box::new(gorilla::GorillaDecoder::new(data_type)),
        EncodingKind::Rle => Box::new(rle::RleDecoder::new(data_type)),
        EncodingKind::Dictionary => Box::new(dictionary::DictionaryDecoder::new()),
        EncodingKind::ZigZag => Box::new(zigzag::ZigZagDecoder::new(data_type)),
    }
}
