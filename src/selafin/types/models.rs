//! Core data structures for SELAFIN file components.
//!
//! This module defines the fundamental types used throughout the library:
//! - Header metadata and the start date
//! - Mesh geometry and connectivity
//! - The on-disk layout used for random access to timesteps
//! - Decoded timestep values

use std::fmt;

/// The only format tag this crate decodes.
pub const SERAFIN_TAG: &str = "SERAFIN";

/// Simulation start date and time, present when `IPARAM(10) == 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Decoded header records of a SELAFIN file.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    /// Simulation title, trimmed of NUL and space padding.
    pub title: String,
    /// Format tag. Always `SERAFIN` for a successfully decoded file.
    pub format: String,
    /// Number of primary (linear) variables.
    pub nbv_1: u32,
    /// Number of secondary (quadratic) variables.
    pub nbv_2: u32,
    /// Names of the primary variables, in file order.
    pub var_names: Vec<String>,
    /// The IPARAM block.
    pub iparam: [u32; 10],
    /// Simulation start, if the file records one.
    pub date: Option<DateTime>,
}

impl Header {
    /// Total number of variable arrays stored per timestep.
    pub fn variable_count(&self) -> usize {
        self.nbv_1 as usize + self.nbv_2 as usize
    }

    /// Position of the primary variable with the given name.
    ///
    /// Comparison ignores ASCII case and surrounding whitespace, since names
    /// are stored space-padded and case varies between TELEMAC versions.
    pub fn variable_index(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.var_names
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(name))
    }
}

/// Mesh sizes declared in the last header record (R6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDims {
    pub nelem: u32,
    pub npoin: u32,
    pub ndp: u32,
}

/// Minimum and maximum of the mesh coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Computes the extent of the given coordinates.
    ///
    /// An empty mesh yields an inverted box (`+inf`/`-inf`). NaN values are ignored.
    pub fn from_coords(x: &[f32], y: &[f32]) -> Self {
        let (min_x, max_x) = extent(x);
        let (min_y, max_y) = extent(y);
        Self { min_x, max_x, min_y, max_y }
    }

    /// The box as `[min_x, max_x, min_y, max_y]`.
    pub fn to_array(&self) -> [f32; 4] {
        [self.min_x, self.max_x, self.min_y, self.max_y]
    }
}

fn extent(values: &[f32]) -> (f32, f32) {
    values
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Mesh geometry and connectivity.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub nelem: u32,
    pub npoin: u32,
    /// Nodes per element: 3 (triangles), 4 (quadrilaterals) or 6 (prisms).
    pub ndp: u32,
    /// Connectivity table, `ndp` consecutive 1-based node numbers per element.
    pub ikle: Vec<u32>,
    /// Boundary node table, one entry per node.
    pub ipobo: Vec<u32>,
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub bounds: BoundingBox,
}

impl Mesh {
    pub fn dims(&self) -> MeshDims {
        MeshDims {
            nelem: self.nelem,
            npoin: self.npoin,
            ndp: self.ndp,
        }
    }

    /// Node numbers of element `e`, 1-based as stored in the file.
    pub fn element(&self, e: usize) -> Option<&[u32]> {
        let ndp = self.ndp as usize;
        let start = e.checked_mul(ndp)?;
        let end = start.checked_add(ndp)?;
        self.ikle.get(start..end)
    }

    /// Node indices of element `e`, converted to 0-based indices into `x`/`y`.
    pub fn element_zero_based(&self, e: usize) -> Option<Vec<u32>> {
        self.element(e)
            .map(|nodes| nodes.iter().map(|n| n.saturating_sub(1)).collect())
    }

    /// Iterates over the 1-based node numbers of every element.
    pub fn elements(&self) -> impl Iterator<Item = &[u32]> {
        // ikle is empty when ndp is 0, the max only keeps chunks_exact from panicking
        self.ikle.chunks_exact(self.ndp.max(1) as usize)
    }
}

/// Byte offsets that make every timestep addressable in O(1).
///
/// The layout depends only on the header and mesh, so it can be copied to
/// other handles opened on the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Offset of the IKLE record.
    pub mesh_start: u64,
    /// Offset of the first timestep.
    pub data_start: u64,
    /// Size in bytes of one timestep (timestamp record plus one record per variable).
    pub stride: u64,
    /// Number of whole timesteps between `data_start` and the end of the file.
    pub timestep_count: u32,
}

impl Layout {
    /// Size of one timestep for the given variable and node counts.
    ///
    /// One framed 4-byte timestamp, then one framed `npoin` float array per variable.
    pub fn stride_for(variables: u64, npoin: u64) -> u64 {
        8 + 4 + variables * (4 * npoin + 8)
    }

    /// Absolute offset of timestep `index`.
    pub fn timestep_offset(&self, index: u32) -> u64 {
        self.data_start + u64::from(index) * self.stride
    }

    /// Offset just past the last whole timestep.
    pub fn data_end(&self) -> u64 {
        self.timestep_offset(self.timestep_count)
    }
}

/// One decoded timestep.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestep {
    pub index: u32,
    /// Simulation time of this step.
    pub time: f32,
    /// One array of `npoin` values per variable, primary variables first.
    pub values: Vec<Vec<f32>>,
}

impl Timestep {
    pub fn variable(&self, index: usize) -> Option<&[f32]> {
        self.values.get(index).map(Vec::as_slice)
    }

    pub fn into_parts(self) -> (f32, Vec<Vec<f32>>) {
        (self.time, self.values)
    }
}

/// Decode progress of a [`SelafinDecoder`](crate::SelafinDecoder).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    HeaderLoaded,
    MeshLoaded,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LoadState::Uninitialized => write!(f, "uninitialized"),
            LoadState::HeaderLoaded => write!(f, "header-loaded"),
            LoadState::MeshLoaded => write!(f, "mesh-loaded"),
        }
    }
}
