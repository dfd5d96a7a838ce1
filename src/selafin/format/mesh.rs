//! Mesh section parsing and data layout derivation.
//!
//! # Mesh Structure
//! ```text
//! [NELEM * NDP * 4 bytes]  IKLE, 1-based node numbers (u32)
//! [NPOIN * 4 bytes]        IPOBO, boundary node table (u32)
//! [NPOIN * 4 bytes]        X coordinates (f32)
//! [NPOIN * 4 bytes]        Y coordinates (f32)
//! ```
//!
//! Each array is a single framed record. Once the mesh is read, the number of
//! timesteps follows from the file size and the fixed size of one timestep.

use std::io::{Read, Seek};

use log::{debug, info};

use crate::selafin::codec::endian;
use crate::selafin::codec::record::{self, Framing};
use crate::selafin::types::error::{Result, SelafinError};
use crate::selafin::types::models::{BoundingBox, Layout, Mesh, MeshDims};
use crate::selafin::utils;

/// The decoded mesh together with the layout of the timesteps that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSection {
    pub mesh: Mesh,
    pub layout: Layout,
}

/// Parses the mesh records. The reader must be positioned at the IKLE record.
///
/// # Parameters
/// * `reader` - Reader positioned just past the header
/// * `dims` - Mesh sizes from the header's R6 record
/// * `variables` - `NBV(1) + NBV(2)`, needed for the timestep stride
/// * `framing` - Policy for mismatched record markers
pub fn parse<R: Read + Seek>(
    reader: &mut R,
    dims: MeshDims,
    variables: usize,
    framing: Framing,
) -> Result<MeshSection> {
    let MeshDims { nelem, npoin, ndp } = dims;
    info!(
        "Parsing mesh: {} elements, {} nodes, {} nodes per element",
        nelem, npoin, ndp
    );

    let mesh_start = reader.stream_position()?;
    let file_len = utils::stream_len(reader)?;
    let available = file_len.saturating_sub(mesh_start);

    // Step 1: Connectivity
    let ikle_count = u64::from(nelem) * u64::from(ndp);
    let ikle_len = utils::checked_len(ikle_count, 4, available, "IKLE")?;
    let ikle = endian::decode_u32s(&record::read_record(reader, ikle_len, "IKLE", framing)?);
    debug!("Read {} entries into IKLE", ikle.len());

    // Step 2: Boundary nodes
    let node_len = utils::checked_len(u64::from(npoin), 4, available, "IPOBO")?;
    let ipobo = endian::decode_u32s(&record::read_record(reader, node_len, "IPOBO", framing)?);
    debug!("Read {} entries into IPOBO", ipobo.len());

    // Step 3: Coordinates
    let x = endian::decode_f32s(&record::read_record(reader, node_len, "X coordinates", framing)?);
    let y = endian::decode_f32s(&record::read_record(reader, node_len, "Y coordinates", framing)?);
    let bounds = BoundingBox::from_coords(&x, &y);
    debug!(
        "Coordinate range: X [{}, {}], Y [{}, {}]",
        bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
    );

    // Step 4: Data layout
    let data_start = reader.stream_position()?;
    let stride = Layout::stride_for(variables as u64, u64::from(npoin));
    // A partial trailing timestep is dropped by the truncating division
    let count = file_len.saturating_sub(data_start) / stride;
    let timestep_count = u32::try_from(count).map_err(|_| SelafinError::AllocationOrCount {
        record: "timesteps",
        count,
    })?;
    debug!(
        "Mesh data ends at {:#x}, file size is {} bytes, timestep stride is {} bytes",
        data_start, file_len, stride
    );

    info!("Mesh parsed: {} timesteps", timestep_count);

    Ok(MeshSection {
        mesh: Mesh {
            nelem,
            npoin,
            ndp,
            ikle,
            ipobo,
            x,
            y,
            bounds,
        },
        layout: Layout {
            mesh_start,
            data_start,
            stride,
            timestep_count,
        },
    })
}
