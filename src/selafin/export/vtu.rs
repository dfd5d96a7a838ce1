//! VTK export for ParaView.
//!
//! Each exported timestep becomes one ASCII `UnstructuredGrid` file
//! (`<base>.t<t>.vtu`). Points carry X, Y and a height taken from one variable;
//! point data holds every primary variable and a velocity vector built from
//! three more. When several timesteps are exported a `<base>.pvd` collection
//! indexes them by simulation time.

use std::fmt::Write as _;
use std::io::{Read, Seek, Write};
use std::path::PathBuf;

use log::{debug, info, warn};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::{create, output_path};
use crate::selafin::reader::SelafinReader;
use crate::selafin::types::error::{Result, SelafinError};
use crate::selafin::types::models::{Header, Mesh, Timestep};

const VTK_TRIANGLE: u8 = 5;
const VTK_POLYGON: u8 = 7;
const VTK_QUAD: u8 = 9;
const VTK_WEDGE: u8 = 13;

/// Which timesteps to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestepSelection {
    /// Only this timestep, without a collection file.
    Single(u32),
    /// Every n-th timestep starting at 0, plus a collection file.
    Every(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VtuOptions {
    /// Variable used as the Z coordinate.
    pub z: usize,
    /// Variables used as velocity components. `w` is only read for prisms (NDP 6).
    pub u: usize,
    pub v: usize,
    pub w: usize,
    pub selection: TimestepSelection,
    pub output_dir: PathBuf,
}

impl Default for VtuOptions {
    fn default() -> Self {
        Self {
            z: 0,
            u: 1,
            v: 2,
            w: 3,
            selection: TimestepSelection::Every(1),
            output_dir: PathBuf::from("."),
        }
    }
}

impl VtuOptions {
    fn check_variables(&self, variables: usize, ndp: u32) -> Result<()> {
        let mut used = vec![self.z, self.u, self.v];
        if ndp == 6 {
            used.push(self.w);
        }
        match used.into_iter().find(|&index| index >= variables) {
            Some(index) => Err(SelafinError::VariableOutOfRange {
                index,
                count: variables,
            }),
            None => Ok(()),
        }
    }
}

/// VTK cell type for elements with `ndp` nodes.
pub fn cell_type(ndp: u32) -> u8 {
    match ndp {
        3 => VTK_TRIANGLE,
        4 => VTK_QUAD,
        6 => VTK_WEDGE,
        _ => VTK_POLYGON,
    }
}

/// Exports the selected timesteps and, for [`TimestepSelection::Every`], the
/// collection file. Returns the paths written.
pub fn export<R: Read + Seek>(
    reader: &mut SelafinReader<R>,
    base_name: &str,
    opts: &VtuOptions,
) -> Result<Vec<PathBuf>> {
    let mesh = reader.mesh();
    opts.check_variables(reader.header().variable_count(), mesh.ndp)?;
    if cell_type(mesh.ndp) == VTK_POLYGON {
        warn!("No VTK cell type for {} nodes per element, writing polygons", mesh.ndp);
    }

    let dir = opts.output_dir.as_path();
    let indices: Vec<u32> = match opts.selection {
        TimestepSelection::Single(t) => vec![t],
        TimestepSelection::Every(n) => (0..reader.timestep_count())
            .step_by(n.max(1) as usize)
            .collect(),
    };
    info!("Exporting {} timesteps to {}", indices.len(), dir.display());

    let mut written = Vec::with_capacity(indices.len() + 1);
    let mut entries = Vec::with_capacity(indices.len());
    for t in indices {
        let step = reader.read_timestep(t)?;
        let file_name = format!("{}.t{}.vtu", base_name, t);
        let path = dir.join(&file_name);
        debug!("Writing {} (t = {})", path.display(), step.time);

        let mut out = create(&path)?;
        write_timestep(&mut out, reader.header(), reader.mesh(), &step, opts)?;
        out.flush()?;

        written.push(path);
        entries.push((step.time, file_name));
    }

    if let TimestepSelection::Every(_) = opts.selection {
        let path = output_path(dir, base_name, "pvd");
        let mut out = create(&path)?;
        write_collection(&mut out, &entries)?;
        out.flush()?;
        written.push(path);
    }

    Ok(written)
}

/// Writes one timestep as a VTK `UnstructuredGrid` document.
pub fn write_timestep<W: Write>(
    out: W,
    header: &Header,
    mesh: &Mesh,
    step: &Timestep,
    opts: &VtuOptions,
) -> Result<()> {
    opts.check_variables(step.values.len(), mesh.ndp)?;
    let z = &step.values[opts.z];
    let u = &step.values[opts.u];
    let v = &step.values[opts.v];
    let w = (mesh.ndp == 6).then(|| &step.values[opts.w]);

    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    start(&mut writer, "VTKFile", &[("type", "UnstructuredGrid")])?;
    start(&mut writer, "UnstructuredGrid", &[])?;
    let points = mesh.npoin.to_string();
    let cells = mesh.nelem.to_string();
    start(
        &mut writer,
        "Piece",
        &[("NumberOfPoints", points.as_str()), ("NumberOfCells", cells.as_str())],
    )?;

    // Points
    let mut text = String::new();
    for ((x, y), z) in mesh.x.iter().zip(&mesh.y).zip(z) {
        let _ = writeln!(text, "{:+.10} {:+.10} {:+.10}", x, y, z);
    }
    start(&mut writer, "Points", &[])?;
    data_array(
        &mut writer,
        &[
            ("Name", "Coordinates"),
            ("type", "Float32"),
            ("NumberOfComponents", "3"),
            ("format", "ascii"),
        ],
        &text,
    )?;
    end(&mut writer, "Points")?;

    // Cells
    start(&mut writer, "Cells", &[])?;
    text.clear();
    for nodes in mesh.elements() {
        for node in nodes {
            let _ = write!(text, "{} ", i64::from(*node) - 1);
        }
        text.push('\n');
    }
    data_array(&mut writer, &int_array("connectivity"), &text)?;

    text.clear();
    let cell = cell_type(mesh.ndp);
    for _ in 0..mesh.nelem {
        let _ = write!(text, "{} ", cell);
    }
    data_array(&mut writer, &int_array("types"), &text)?;

    text.clear();
    for e in 1..=u64::from(mesh.nelem) {
        let _ = write!(text, "{} ", e * u64::from(mesh.ndp));
    }
    data_array(&mut writer, &int_array("offsets"), &text)?;
    end(&mut writer, "Cells")?;

    // Point data
    start(&mut writer, "PointData", &[])?;
    for (name, values) in header.var_names.iter().zip(&step.values) {
        text.clear();
        for value in values {
            let _ = write!(text, "{:+.10} ", value);
        }
        data_array(
            &mut writer,
            &[("Name", name.as_str()), ("type", "Float32"), ("format", "ascii")],
            &text,
        )?;
    }

    text.clear();
    for (p, (u, v)) in u.iter().zip(v).enumerate() {
        let w = w.and_then(|w| w.get(p)).copied().unwrap_or(0.0);
        let _ = writeln!(text, "{:+.10} {:+.10} {:+.10}", u, v, w);
    }
    data_array(
        &mut writer,
        &[
            ("Name", "Vector Velocity"),
            ("type", "Float32"),
            ("format", "ascii"),
            ("NumberOfComponents", "3"),
        ],
        &text,
    )?;
    end(&mut writer, "PointData")?;

    end(&mut writer, "Piece")?;
    end(&mut writer, "UnstructuredGrid")?;
    end(&mut writer, "VTKFile")?;
    Ok(())
}

/// Writes a ParaView collection referencing `(time, file)` pairs.
pub fn write_collection<W: Write>(out: W, entries: &[(f32, String)]) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    start(&mut writer, "VTKFile", &[("type", "Collection")])?;
    start(&mut writer, "Collection", &[])?;
    for (time, file) in entries {
        let time = format!("{:.10}", time);
        let mut dataset = BytesStart::new("DataSet");
        dataset.push_attribute(("timestep", time.as_str()));
        dataset.push_attribute(("part", "0"));
        dataset.push_attribute(("file", file.as_str()));
        writer.write_event(Event::Empty(dataset))?;
    }
    end(&mut writer, "Collection")?;
    end(&mut writer, "VTKFile")?;
    Ok(())
}

fn int_array(name: &str) -> [(&str, &str); 3] {
    [("Name", name), ("type", "Int32"), ("format", "ascii")]
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
    let mut elem = BytesStart::new(name);
    for &attr in attrs {
        elem.push_attribute(attr);
    }
    writer.write_event(Event::Start(elem))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn data_array<W: Write>(writer: &mut Writer<W>, attrs: &[(&str, &str)], text: &str) -> Result<()> {
    start(writer, "DataArray", attrs)?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, "DataArray")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_failure_is_io_error() {
        let entries = vec![(0.0, "case.t0.vtu".to_string())];
        let err = write_collection(FullDisk, &entries).unwrap_err();
        assert!(matches!(err, SelafinError::Io(e) if e.kind() == io::ErrorKind::StorageFull));
    }

    #[test]
    fn test_collection_lists_every_entry() {
        let entries = vec![(0.0, "a.t0.vtu".to_string()), (1.5, "a.t1.vtu".to_string())];
        let mut out = Vec::new();
        write_collection(&mut out, &entries).unwrap();
        let xml = String::from_utf8(out).unwrap();
        assert!(xml.contains("timestep=\"1.5000000000\" part=\"0\" file=\"a.t1.vtu\""));
    }
}
