//! Compression codecs for sealed pages, behind a `Codec` trait and a
//! `create_codec` factory so the writer is testable end to end.

use crate::error::{out_of_spec_err, Result};

/// The closed set of compression codecs this writer knows how to produce.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum Compression {
    Uncompressed,
    Snappy,
    Gzip,
    Lz4,
    Zstd,
}

/// A page/chunk compression codec.
///
/// Implementations hold any internal state needed across calls (e.g. a
/// reusable encoder); callers must not assume `compress`/`decompress` are
/// free of side effects on `self`.
pub trait Codec: std::fmt::Debug {
    /// Compresses `input_buf`, appending the result to `output_buf`.
    fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()>;

    /// Decompresses `input_buf` into `output_buf`, which must already be
    /// sized to the known uncompressed length.
    fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()>;
}

/// Returns a codec for `compression`, or `None` for `Uncompressed` (a no-op
/// copy is the caller's responsibility, since there is nothing to own).
pub fn create_codec(compression: &Compression) -> Result<Option<Box<dyn Codec>>> {
    match *compression {
        #[cfg(feature = "snappy")]
        Compression::Snappy => Ok(Some(Box::new(SnappyCodec::new()))),
        #[cfg(feature = "gzip")]
        Compression::Gzip => Ok(Some(Box::new(GzipCodec::new()))),
        #[cfg(feature = "lz4")]
        Compression::Lz4 => Ok(Some(Box::new(Lz4Codec::new()))),
        #[cfg(feature = "zstd")]
        Compression::Zstd => Ok(Some(Box::new(ZstdCodec::new()))),
        Compression::Uncompressed => Ok(None),
        #[allow(unreachable_patterns)]
        _ => Err(out_of_spec_err!(
            "compression {:?} is not enabled in this build",
            compression
        )),
    }
}

#[cfg(feature = "snappy")]
mod snappy_codec {
    use snap::raw::{Decoder, Encoder};

    use super::Codec;
    use crate::error::{encoding_err, Result};

    /// Codec for the Snappy compression format.
    #[derive(Debug)]
    pub struct SnappyCodec {
        decoder: Decoder,
        encoder: Encoder,
    }

    impl SnappyCodec {
        pub(crate) fn new() -> Self {
            Self {
                decoder: Decoder::new(),
                encoder: Encoder::new(),
            }
        }
    }

    impl Codec for SnappyCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            self.decoder
                .decompress(input_buf, output_buf)
                .map_err(|e| encoding_err!("snappy decompress failed: {}", e))
                .map(|_| ())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let output_buf_len = output_buf.len();
            let required_len = snap::raw::max_compress_len(input_buf.len());
            output_buf.resize(output_buf_len + required_len, 0);
            let n = self
                .encoder
                .compress(input_buf, &mut output_buf[output_buf_len..])
                .map_err(|e| encoding_err!("snappy compress failed: {}", e))?;
            output_buf.truncate(output_buf_len + n);
            Ok(())
        }
    }
}
#[cfg(feature = "snappy")]
pub use snappy_codec::SnappyCodec;

#[cfg(feature = "gzip")]
mod gzip_codec {
    use std::io::{Read, Write};

    use flate2::{read, write, Compression as GzLevel};

    use super::Codec;
    use crate::error::Result;

    /// Codec for the GZIP compression algorithm.
    #[derive(Debug)]
    pub struct GzipCodec {}

    impl GzipCodec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for GzipCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let mut decoder = read::GzDecoder::new(input_buf);
            decoder.read_exact(output_buf)?;
            Ok(())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = write::GzEncoder::new(output_buf, GzLevel::default());
            encoder.write_all(input_buf)?;
            encoder.try_finish()?;
            Ok(())
        }
    }
}
#[cfg(feature = "gzip")]
pub use gzip_codec::GzipCodec;

#[cfg(feature = "lz4")]
mod lz4_codec {
    use super::Codec;
    use crate::error::{encoding_err, Result};

    /// Codec for the LZ4 (block format) compression algorithm.
    #[derive(Debug)]
    pub struct Lz4Codec {}

    impl Lz4Codec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for Lz4Codec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let n = lz4_flex::block::decompress_into(input_buf, output_buf)
                .map_err(|e| encoding_err!("lz4 decompress failed: {}", e))?;
            if n != output_buf.len() {
                return Err(encoding_err!(
                    "lz4 decompressed {} bytes, expected {}",
                    n,
                    output_buf.len()
                ));
            }
            Ok(())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let output_buf_len = output_buf.len();
            let required_len = lz4_flex::block::get_maximum_output_size(input_buf.len());
            output_buf.resize(output_buf_len + required_len, 0);
            let n = lz4_flex::block::compress_into(input_buf, &mut output_buf[output_buf_len..])
                .map_err(|e| encoding_err!("lz4 compress failed: {}", e))?;
            output_buf.truncate(output_buf_len + n);
            Ok(())
        }
    }
}
#[cfg(feature = "lz4")]
pub use lz4_codec::Lz4Codec;

#[cfg(feature = "zstd")]
mod zstd_codec {
    use std::io::{Read, Write};

    use super::Codec;
    use crate::error::Result;

    const ZSTD_COMPRESSION_LEVEL: i32 = 1;

    /// Codec for the Zstandard compression algorithm.
    #[derive(Debug)]
    pub struct ZstdCodec {}

    impl ZstdCodec {
        pub(crate) fn new() -> Self {
            Self {}
        }
    }

    impl Codec for ZstdCodec {
        fn decompress(&mut self, input_buf: &[u8], output_buf: &mut [u8]) -> Result<()> {
            let mut decoder = zstd::Decoder::new(input_buf)?;
            decoder.read_exact(output_buf)?;
            Ok(())
        }

        fn compress(&mut self, input_buf: &[u8], output_buf: &mut Vec<u8>) -> Result<()> {
            let mut encoder = zstd::Encoder::new(output_buf, ZSTD_COMPRESSION_LEVEL)?;
            encoder.write_all(input_buf)?;
            encoder.finish()?;
            Ok(())
        }
    }
}
#[cfg(feature = "zstd")]
pub use zstd_codec::ZstdCodec;
