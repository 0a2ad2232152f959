// Hash computation module
// Streams files through a digest algorithm in block-aligned chunks

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use super::algorithm::{AlgorithmFactory, DigestAlgorithm};
use super::error::{ChecksumError, Result};

/// Default number of algorithm blocks read per chunk
pub const DEFAULT_CHUNK_BLOCKS: usize = 128;

/// Upper bound on one read chunk, in bytes
pub const MAX_CHUNK_BYTES: usize = 64 * 1024 * 1024;

/// Hash computer with streaming I/O
///
/// Each read is `chunk_blocks * block_size` bytes, so the buffer always
/// holds a whole number of the algorithm's internal blocks.
#[derive(Debug, Clone, Copy)]
pub struct HashComputer {
    chunk_blocks: usize,
}

impl HashComputer {
    /// Create a new HashComputer reading 128 blocks per chunk
    pub fn new() -> Self {
        Self {
            chunk_blocks: DEFAULT_CHUNK_BLOCKS,
        }
    }

    /// Create a new HashComputer with a custom chunk size in blocks (minimum 1)
    pub fn with_chunk_blocks(chunk_blocks: usize) -> Self {
        Self {
            chunk_blocks: chunk_blocks.max(1),
        }
    }

    pub fn chunk_blocks(&self) -> usize {
        self.chunk_blocks
    }

    /// Chunk length in bytes for the given algorithm
    ///
    /// Capped at the largest whole number of blocks within `MAX_CHUNK_BYTES`.
    pub fn chunk_len(&self, algorithm: &dyn DigestAlgorithm) -> usize {
        let block_size = algorithm.block_size().max(1);
        let max_blocks = (MAX_CHUNK_BYTES / block_size).max(1);
        self.chunk_blocks.min(max_blocks) * block_size
    }

    /// Hash a file and return its lowercase hex digest
    ///
    /// The file handle is dropped on every return path, including a read
    /// error in the middle of the stream.
    pub fn digest(&self, path: &Path, algorithm: Box<dyn DigestAlgorithm>) -> Result<String> {
        self.digest_counted(path, algorithm).map(|(hex, _)| hex)
    }

    /// Hash a file with a fresh instance from `factory`
    pub fn digest_with(&self, path: &Path, factory: &dyn AlgorithmFactory) -> Result<String> {
        self.digest(path, factory.create()?)
    }

    /// Hash a file, also returning the number of bytes read
    pub fn digest_counted(
        &self,
        path: &Path,
        algorithm: Box<dyn DigestAlgorithm>,
    ) -> Result<(String, u64)> {
        let file = File::open(path)
            .map_err(|e| ChecksumError::from_io_error(e, "opening", Some(path.to_path_buf())))?;

        self.stream(file, algorithm)
            .map_err(|e| ChecksumError::from_io_error(e, "reading", Some(path.to_path_buf())))
    }

    /// Hash any reader; used for files and in-memory input alike
    pub fn digest_reader<R: Read>(
        &self,
        reader: R,
        algorithm: Box<dyn DigestAlgorithm>,
    ) -> io::Result<String> {
        self.stream(reader, algorithm).map(|(hex, _)| hex)
    }

    fn stream<R: Read>(
        &self,
        mut reader: R,
        mut algorithm: Box<dyn DigestAlgorithm>,
    ) -> io::Result<(String, u64)> {
        let mut buffer = vec![0u8; self.chunk_len(algorithm.as_ref())];
        let mut total = 0u64;

        loop {
            let filled = fill_chunk(&mut reader, &mut buffer)?;
            if filled == 0 {
                break;
            }
            algorithm.update(&buffer[..filled]);
            total += filled as u64;
            if filled < buffer.len() {
                break;
            }
        }

        Ok((bytes_to_hex(&algorithm.finalize()), total))
    }
}

impl Default for HashComputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Read until the buffer is full or the reader is exhausted
/// Short reads from the OS are not treated as end of input
fn fill_chunk<R: Read>(reader: &mut R, buffer: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Lowercase hex encoding
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
