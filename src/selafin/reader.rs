use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use log::{debug, info, warn};

use super::codec::record::Framing;
use super::decoder::{Loaded, SelafinDecoder};
use super::iter::TimestepIter;
use super::types::error::{Result, SelafinError};
use super::types::models::{Header, Layout, Mesh, Timestep};

/// Default upper bound on `NBV(1) + NBV(2)`.
pub const DEFAULT_MAX_VARIABLES: u32 = 4096;

/// Knobs that control how strictly a file is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Tolerate mismatched record markers in the header and mesh, and bytes
    /// after the last whole timestep. Timestep records are always checked.
    pub force: bool,
    /// Largest total variable count accepted before anything is allocated.
    pub max_variables: u32,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            force: false,
            max_variables: DEFAULT_MAX_VARIABLES,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn max_variables(mut self, max_variables: u32) -> Self {
        self.max_variables = max_variables;
        self
    }

    pub(crate) fn framing(&self) -> Framing {
        if self.force {
            Framing::Lenient
        } else {
            Framing::Strict
        }
    }
}

/// A fully decoded SELAFIN file, ready for random access to its timesteps.
///
/// Header and mesh live in memory; timestep values are read from the file on
/// demand. Reading requires `&mut self` because every read seeks the stream.
#[derive(Debug)]
pub struct SelafinReader<R = BufReader<File>> {
    stream: R,
    loaded: Loaded,
    buf: Vec<u8>,
}

impl SelafinReader<BufReader<File>> {
    /// Opens and decodes a SELAFIN file with default options.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::default())
    }

    /// Opens and decodes a SELAFIN file.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be opened
    /// - The format tag is not `SERAFIN`
    /// - A header or mesh record is truncated or badly framed (framing is only
    ///   checked when `options.force` is off)
    /// - Bytes remain after the last whole timestep (unless `options.force`)
    pub fn open_with(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening SELAFIN file: {}", path.display());
        let file = File::open(path)?;
        Self::from_stream(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> SelafinReader<R> {
    /// Decodes the header and mesh of any seekable stream.
    pub fn from_stream(stream: R, options: OpenOptions) -> Result<Self> {
        let mut decoder = SelafinDecoder::new(stream, options);
        decoder.decode_header()?;
        decoder.decode_mesh()?;

        match decoder.verify_end() {
            Ok(()) => {}
            Err(e @ SelafinError::TrailingData { .. }) if options.force => {
                let count = decoder.layout().map_or(0, |layout| layout.timestep_count);
                warn!("{}. Continuing with {} whole timesteps.", e, count);
            }
            Err(e) => return Err(e),
        }

        decoder.finish()
    }

    pub(crate) fn from_parts(stream: R, loaded: Loaded, buf: Vec<u8>) -> Self {
        Self {
            stream,
            loaded,
            buf,
        }
    }

    pub fn header(&self) -> &Header {
        &self.loaded.header
    }

    pub fn mesh(&self) -> &Mesh {
        &self.loaded.mesh
    }

    pub fn layout(&self) -> Layout {
        self.loaded.layout
    }

    /// Number of whole timesteps in the file. O(1), fixed at open time.
    pub fn timestep_count(&self) -> u32 {
        self.loaded.layout.timestep_count
    }

    /// Timestamps seen so far, one slot per timestep.
    ///
    /// Slots stay `None` until the timestep (or its time) has been read. Use
    /// [`load_timestamps`](Self::load_timestamps) to fill them all.
    pub fn timestamps(&self) -> &[Option<f32>] {
        &self.loaded.timestamps
    }

    /// The time of timestep `index`, if it has been read already.
    pub fn timestamp(&self, index: u32) -> Option<f32> {
        self.loaded.timestamps.get(index as usize).copied().flatten()
    }

    /// Reads the time and every variable array of timestep `index`.
    ///
    /// Any index in `0..timestep_count()` can be read in any order.
    pub fn read_timestep(&mut self, index: u32) -> Result<Timestep> {
        self.loaded.read_timestep(&mut self.stream, index, &mut self.buf)
    }

    /// Reads only the time of timestep `index`.
    pub fn read_timestamp(&mut self, index: u32) -> Result<f32> {
        self.loaded.read_time(&mut self.stream, index, &mut self.buf)
    }

    /// Reads the time of every timestep, skipping the variable arrays.
    pub fn load_timestamps(&mut self) -> Result<Vec<f32>> {
        let count = self.timestep_count();
        debug!("Loading {} timestamps", count);
        (0..count).map(|t| self.read_timestamp(t)).collect()
    }

    /// Iterates over every timestep in file order.
    pub fn iter_timesteps(&mut self) -> TimestepIter<'_, R> {
        TimestepIter::new(self)
    }

    /// Releases the underlying stream.
    pub fn close(self) {
        debug!("Closing SELAFIN reader");
        drop(self.stream);
    }

    /// Consumes the reader and returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.stream
    }
}
