//! Explicit, immutable configuration threaded into every writer at
//! construction time. There is no process-wide configuration singleton: tests
//! (and callers) can run multiple writers with distinct configurations
//! without interference.

use crate::compression::Compression;
use crate::encoding::EncodingKind;

/// Tuning knobs recognized by the chunk-group write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    /// A page is sealed once its uncompressed byte count reaches this
    /// threshold.
    pub page_size_threshold_bytes: usize,
    /// A page is sealed once its point count reaches this threshold,
    /// regardless of byte size.
    pub max_points_per_page: u32,
    /// Advisory threshold consulted by callers deciding when to flush a
    /// chunk; not enforced by the writer itself.
    pub chunk_size_threshold_bytes: usize,
    /// Encoding used by `TimeChunkWriter` for the time column.
    pub default_time_encoding: EncodingKind,
    /// Compression used by `TimeChunkWriter` for the time column.
    pub default_time_compression: Compression,
    /// Whether page headers carry a CRC32 of the compressed payload.
    pub write_page_crc: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            page_size_threshold_bytes: 64 * 1024,
            max_points_per_page: 1_048_576,
            chunk_size_threshold_bytes: 1024 * 1024,
            default_time_encoding: EncodingKind::Ts2Diff,
            default_time_compression: Compression::Lz4,
            write_page_crc: false,
        }
    }
}

impl WriterOptions {
    /// Returns `true` iff (`return_true_if_empty` and the chunk is empty) OR
    /// the point count is at or above `max_points_per_page` OR the estimated
    /// byte size is at or above `chunk_size_threshold_bytes`.
    ///
    /// Stated as a flat OR of three independent conditions rather than a
    /// short-circuiting `&&`/`||` chain, which can silently skip the
    /// size check once the point-count check has already failed.
    pub fn chunk_size_over_threshold(
        &self,
        point_num: u32,
        estimated_size: usize,
        return_true_if_empty: bool,
    ) -> bool {
        if point_num == 0 {
            return return_true_if_empty;
        }
        point_num as usize >= self.max_points_per_page as usize
            || estimated_size >= self.chunk_size_threshold_bytes
    }

    /// Returns `true` if the current unsealed page should be sealed, given
    /// its estimated uncompressed byte size and point count so far.
    pub fn unsealed_page_over_threshold(&self, uncompressed_bytes: usize, point_count: u32) -> bool {
        uncompressed_bytes >= self.page_size_threshold_bytes
            || point_count >= self.max_points_per_page
    }
}
