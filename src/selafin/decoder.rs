//! Staged decoding of a SELAFIN stream.
//!
//! [`SelafinDecoder`] walks a stream through its three states:
//!
//! ```text
//! Uninitialized ──decode_header()──▶ HeaderLoaded ──decode_mesh()──▶ MeshLoaded
//! ```
//!
//! Each operation checks the state it needs and fails with
//! [`SelafinError::InvalidState`] otherwise. Transitions only move forward; a
//! failed stage leaves the decoder where it was. Most callers want
//! [`SelafinReader::open`](crate::SelafinReader::open), which runs every stage.

use std::io::{Read, Seek, SeekFrom};

use log::debug;

use super::format::header::{self, HeaderSection};
use super::format::mesh::{self, MeshSection};
use super::format::timestep;
use super::reader::{OpenOptions, SelafinReader};
use super::types::error::{Result, SelafinError};
use super::types::models::{Header, Layout, LoadState, Mesh, Timestep};
use super::utils;

/// Fully decoded metadata of a file, plus the timestamps seen so far.
#[derive(Debug, Clone)]
pub(crate) struct Loaded {
    pub header: Header,
    pub mesh: Mesh,
    pub layout: Layout,
    /// One slot per timestep, filled as timesteps are read.
    pub timestamps: Vec<Option<f32>>,
}

impl Loaded {
    pub fn read_timestep<R: Read + Seek>(
        &mut self,
        stream: &mut R,
        index: u32,
        buf: &mut Vec<u8>,
    ) -> Result<Timestep> {
        let step = timestep::read(
            stream,
            &self.layout,
            self.mesh.npoin,
            self.header.variable_count(),
            index,
            buf,
        )?;
        self.record_time(index, step.time);
        Ok(step)
    }

    pub fn read_time<R: Read + Seek>(
        &mut self,
        stream: &mut R,
        index: u32,
        buf: &mut Vec<u8>,
    ) -> Result<f32> {
        let time = timestep::read_time(stream, &self.layout, index, buf)?;
        self.record_time(index, time);
        Ok(time)
    }

    fn record_time(&mut self, index: u32, time: f32) {
        if let Some(slot) = self.timestamps.get_mut(index as usize) {
            *slot = Some(time);
        }
    }
}

#[derive(Debug)]
enum Stage {
    Uninitialized,
    HeaderLoaded {
        section: HeaderSection,
        mesh_start: u64,
    },
    MeshLoaded(Loaded),
}

impl Stage {
    fn state(&self) -> LoadState {
        match self {
            Stage::Uninitialized => LoadState::Uninitialized,
            Stage::HeaderLoaded { .. } => LoadState::HeaderLoaded,
            Stage::MeshLoaded(_) => LoadState::MeshLoaded,
        }
    }

    fn require(&self, operation: &'static str, expected: LoadState) -> Result<()> {
        let found = self.state();
        if found == expected {
            Ok(())
        } else {
            Err(SelafinError::InvalidState {
                operation,
                expected,
                found,
            })
        }
    }
}

/// Step-by-step decoder over a seekable stream.
#[derive(Debug)]
pub struct SelafinDecoder<R> {
    stream: R,
    options: OpenOptions,
    stage: Stage,
    buf: Vec<u8>,
}

impl<R: Read + Seek> SelafinDecoder<R> {
    /// Wraps a stream. Nothing is read until [`decode_header`](Self::decode_header).
    pub fn new(stream: R, options: OpenOptions) -> Self {
        Self {
            stream,
            options,
            stage: Stage::Uninitialized,
            buf: Vec::new(),
        }
    }

    pub fn state(&self) -> LoadState {
        self.stage.state()
    }

    pub fn header(&self) -> Option<&Header> {
        match &self.stage {
            Stage::Uninitialized => None,
            Stage::HeaderLoaded { section, .. } => Some(&section.header),
            Stage::MeshLoaded(loaded) => Some(&loaded.header),
        }
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.stage {
            Stage::MeshLoaded(loaded) => Some(&loaded.mesh),
            _ => None,
        }
    }

    pub fn layout(&self) -> Option<Layout> {
        match &self.stage {
            Stage::MeshLoaded(loaded) => Some(loaded.layout),
            _ => None,
        }
    }

    /// Decodes the header records from the start of the stream.
    ///
    /// Requires [`LoadState::Uninitialized`].
    pub fn decode_header(&mut self) -> Result<()> {
        self.stage.require("decode_header", LoadState::Uninitialized)?;

        self.stream.seek(SeekFrom::Start(0))?;
        let file_len = utils::stream_len(&mut self.stream)?;
        let section = header::parse(
            &mut self.stream,
            self.options.framing(),
            self.options.max_variables,
            file_len,
        )?;
        let mesh_start = self.stream.stream_position()?;
        debug!("Mesh section starts at {:#x}", mesh_start);

        self.stage = Stage::HeaderLoaded {
            section,
            mesh_start,
        };
        Ok(())
    }

    /// Decodes the mesh records and fixes the timestep layout.
    ///
    /// Requires [`LoadState::HeaderLoaded`].
    pub fn decode_mesh(&mut self) -> Result<()> {
        let (section, mesh_start) = match std::mem::replace(&mut self.stage, Stage::Uninitialized) {
            Stage::HeaderLoaded {
                section,
                mesh_start,
            } => (section, mesh_start),
            other => {
                let found = other.state();
                self.stage = other;
                return Err(SelafinError::InvalidState {
                    operation: "decode_mesh",
                    expected: LoadState::HeaderLoaded,
                    found,
                });
            }
        };

        let parsed = self
            .stream
            .seek(SeekFrom::Start(mesh_start))
            .map_err(SelafinError::from)
            .and_then(|_| {
                mesh::parse(
                    &mut self.stream,
                    section.dims,
                    section.header.variable_count(),
                    self.options.framing(),
                )
            });

        let MeshSection { mesh, layout } = match parsed {
            Ok(parsed) => parsed,
            Err(e) => {
                self.stage = Stage::HeaderLoaded {
                    section,
                    mesh_start,
                };
                return Err(e);
            }
        };

        self.stage = Stage::MeshLoaded(Loaded {
            header: section.header,
            mesh,
            timestamps: vec![None; layout.timestep_count as usize],
            layout,
        });
        Ok(())
    }

    /// Checks that the last whole timestep ends exactly at end-of-file.
    ///
    /// Requires [`LoadState::MeshLoaded`]. Fails with
    /// [`SelafinError::TrailingData`] when bytes remain.
    pub fn verify_end(&mut self) -> Result<()> {
        let expected_end = match &self.stage {
            Stage::MeshLoaded(loaded) => loaded.layout.data_end(),
            stage => {
                return Err(SelafinError::InvalidState {
                    operation: "verify_end",
                    expected: LoadState::MeshLoaded,
                    found: stage.state(),
                });
            }
        };
        self.stream.seek(SeekFrom::Start(expected_end))?;
        let mut byte = [0u8; 1];
        if self.stream.read(&mut byte)? > 0 {
            let file_len = utils::stream_len(&mut self.stream)?;
            return Err(SelafinError::TrailingData {
                expected_end,
                file_len,
            });
        }
        Ok(())
    }

    /// Reads timestep `index`.
    ///
    /// Requires [`LoadState::MeshLoaded`].
    pub fn read_timestep(&mut self, index: u32) -> Result<Timestep> {
        match &mut self.stage {
            Stage::MeshLoaded(loaded) => loaded.read_timestep(&mut self.stream, index, &mut self.buf),
            stage => Err(SelafinError::InvalidState {
                operation: "read_timestep",
                expected: LoadState::MeshLoaded,
                found: stage.state(),
            }),
        }
    }

    /// Turns a fully decoded stream into a [`SelafinReader`].
    ///
    /// Requires [`LoadState::MeshLoaded`].
    pub fn finish(self) -> Result<SelafinReader<R>> {
        match self.stage {
            Stage::MeshLoaded(loaded) => Ok(SelafinReader::from_parts(self.stream, loaded, self.buf)),
            stage => Err(SelafinError::InvalidState {
                operation: "finish",
                expected: LoadState::MeshLoaded,
                found: stage.state(),
            }),
        }
    }
}
