//! `FileWriter<W>`: the external interface a `ChunkGroupWriter` flushes
//! through — a `start`/`write`/`end` builder lifecycle over a generic
//! `W: Write`, with a length-prefixed footer in place of a Thrift-encoded
//! one.

use std::io::Write;

use crate::error::Result;
use crate::write::chunk_group::ChunkGroupMetadata;

/// Magic bytes written at the start and end of a file, bracketing the
/// chunk-group stream the way TsFile's `MAGIC_STRING` does.
pub const MAGIC: &[u8] = b"TSFILECG1";

/// The write states a `FileWriter` can be in; writing outside the expected
/// state is a programming error in the caller, not a recoverable I/O
/// failure, so these are asserted rather than surfaced as `TsFileError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Started,
    InChunkGroup,
    Ended,
}

/// Drives the on-disk chunk-group stream: a magic header, one or more
/// chunk groups, a footer listing every chunk group's metadata, and a
/// trailing magic footer.
#[derive(Debug)]
pub struct FileWriter<W: Write> {
    writer: W,
    pos: u64,
    state: State,
    chunk_groups: Vec<ChunkGroupMetadata>,
}

impl<W: Write> FileWriter<W> {
    /// Writes the file's magic header and returns a writer ready to accept
    /// chunk groups.
    pub fn start(mut writer: W) -> Result<Self> {
        writer.write_all(MAGIC)?;
        Ok(Self {
            writer,
            pos: MAGIC.len() as u64,
            state: State::Started,
            chunk_groups: Vec::new(),
        })
    }

    /// The number of bytes written to the underlying stream so far.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    /// Marks the start of a new chunk group for `device_id`. Must be paired
    /// with exactly one `end_chunk_group`.
    pub fn start_chunk_group(&mut self, device_id: &str) -> Result<()> {
        debug_assert_eq!(self.state, State::Started);
        self.state = State::InChunkGroup;
        let _ = device_id;
        Ok(())
    }

    /// Appends a chunk's (or several chunks') already-serialized bytes to
    /// the stream — the `ChunkGroupWriter` has already flushed each
    /// `ChunkWriter`/`AlignedChunkWriter` into an in-memory buffer; this is
    /// the single point where that buffer reaches the underlying `W`.
    pub fn write_bytes_to_stream(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.pos += bytes.len() as u64;
        Ok(())
    }

    /// Closes the current chunk group and records its metadata for the
    /// file footer.
    pub fn end_chunk_group(&mut self, metadata: ChunkGroupMetadata) -> Result<()> {
        debug_assert_eq!(self.state, State::InChunkGroup);
        self.state = State::Started;
        self.chunk_groups.push(metadata);
        Ok(())
    }

    /// Writes the footer (every chunk group's metadata) and the trailing
    /// magic bytes, then returns the underlying writer.
    pub fn end(mut self) -> Result<W> {
        debug_assert_eq!(self.state, State::Started);
        self.state = State::Ended;
        let footer = crate::write::chunk_group::serialize_footer(&self.chunk_groups);
        self.writer.write_all(&footer)?;
        self.pos += footer.len() as u64;
        let footer_len = footer.len() as u64;
        self.writer.write_all(&footer_len.to_le_bytes())?;
        self.writer.write_all(MAGIC)?;
        self.pos += 8 + MAGIC.len() as u64;
        Ok(self.writer)
    }
}
