//! The write path proper: per-series chunk writers and the chunk-group
//! writer that owns them all and flushes a device's data to a `FileWriter`.

pub mod aligned_writer;
pub mod chunk_group;
pub mod chunk_writer;
pub mod file_writer;
pub mod time_writer;
pub mod value_writer;

pub use aligned_writer::AlignedChunkWriter;
pub use chunk_group::{ChunkGroupMetadata, ChunkGroupWriter};
pub use chunk_writer::ChunkWriter;
pub use file_writer::FileWriter;
