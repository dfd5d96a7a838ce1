//! Synthetic SELAFIN files for the integration tests.
#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub fn frame(out: &mut Vec<u8>, payload: &[u8]) {
    let len = (payload.len() as u32).to_be_bytes();
    out.extend_from_slice(&len);
    out.extend_from_slice(payload);
    out.extend_from_slice(&len);
}

fn padded(text: &str, width: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(width, b' ');
    bytes
}

fn u32s(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

fn f32s(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}

/// Builds the bytes of a SELAFIN file.
#[derive(Debug, Clone)]
pub struct SlfBuilder {
    pub title: String,
    pub tag: String,
    pub names: Vec<String>,
    pub nbv_2: u32,
    pub date: Option<[u32; 6]>,
    pub ndp: u32,
    pub ikle: Vec<u32>,
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    /// `(time, one array per variable)`
    pub steps: Vec<(f32, Vec<Vec<f32>>)>,
    pub trailing: Vec<u8>,
}

impl SlfBuilder {
    /// One triangle, three nodes, one variable, two timesteps.
    pub fn triangle() -> Self {
        Self {
            title: "TRIANGLE TEST".into(),
            tag: "SERAFIN".into(),
            names: vec!["WATER DEPTH     M".into()],
            nbv_2: 0,
            date: None,
            ndp: 3,
            ikle: vec![1, 2, 3],
            x: vec![0.0, 1.0, 0.0],
            y: vec![0.0, 0.0, 1.0],
            steps: vec![
                (0.0, vec![vec![1.0, 2.0, 3.0]]),
                (0.5, vec![vec![4.0, 5.0, 6.0]]),
            ],
            trailing: Vec::new(),
        }
    }

    /// Two triangles on four nodes with depth and two velocity components,
    /// three timesteps.
    pub fn channel() -> Self {
        let steps = (0..3)
            .map(|t| {
                let t = t as f32;
                (
                    t * 10.0,
                    vec![
                        vec![1.0 + t, 1.5 + t, 2.0 + t, 2.5 + t],
                        vec![0.25 * t, 0.5, -0.5, 0.0],
                        vec![0.0, -0.25 * t, 0.75, 1.0],
                    ],
                )
            })
            .collect();
        Self {
            title: "CHANNEL".into(),
            tag: "SERAFIN".into(),
            names: vec![
                "WATER DEPTH     M".into(),
                "VELOCITY U      M/S".into(),
                "VELOCITY V      M/S".into(),
            ],
            nbv_2: 0,
            date: Some([2016, 3, 7, 12, 30, 15]),
            ndp: 3,
            ikle: vec![1, 2, 3, 2, 4, 3],
            x: vec![0.0, 4.0, 0.0, 4.0],
            y: vec![-1.0, -1.0, 2.0, 2.0],
            steps,
            trailing: Vec::new(),
        }
    }

    /// One six-node prism with depth and three velocity components, one
    /// timestep. The top layer moves down.
    pub fn prism() -> Self {
        Self {
            title: "PRISM".into(),
            tag: "SERAFIN".into(),
            names: vec![
                "ELEVATION Z     M".into(),
                "VELOCITY U      M/S".into(),
                "VELOCITY V      M/S".into(),
                "VELOCITY W      M/S".into(),
            ],
            nbv_2: 0,
            date: None,
            ndp: 6,
            ikle: vec![1, 2, 3, 4, 5, 6],
            x: vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0],
            y: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            steps: vec![(
                0.0,
                vec![
                    vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
                    vec![1.0; 6],
                    vec![0.5; 6],
                    vec![0.0, 0.0, 0.0, -0.25, -0.25, -0.25],
                ],
            )],
            trailing: Vec::new(),
        }
    }

    pub fn npoin(&self) -> usize {
        self.x.len()
    }

    pub fn nelem(&self) -> usize {
        self.ikle.len() / self.ndp as usize
    }

    pub fn variables(&self) -> usize {
        self.names.len() + self.nbv_2 as usize
    }

    fn header_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut r1 = padded(&self.title, 72);
        r1.extend(padded(&self.tag, 8));
        frame(&mut out, &r1);
        frame(&mut out, &u32s(&[self.names.len() as u32, self.nbv_2]));
        for name in &self.names {
            frame(&mut out, &padded(name, 32));
        }
        let mut iparam = [0u32; 10];
        iparam[0] = 1;
        if self.date.is_some() {
            iparam[9] = 1;
        }
        frame(&mut out, &u32s(&iparam));
        if let Some(date) = self.date {
            frame(&mut out, &u32s(&date));
        }
        frame(
            &mut out,
            &u32s(&[self.nelem() as u32, self.npoin() as u32, self.ndp, 1]),
        );
        out
    }

    /// Offset of the first timestep.
    pub fn data_start(&self) -> usize {
        self.header_bytes().len() + self.ikle.len() * 4 + 3 * self.npoin() * 4 + 4 * 8
    }

    /// Size of one timestep.
    pub fn stride(&self) -> usize {
        12 + self.variables() * (4 * self.npoin() + 8)
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut out = self.header_bytes();
        frame(&mut out, &u32s(&self.ikle));
        let ipobo: Vec<u32> = (1..=self.npoin() as u32).collect();
        frame(&mut out, &u32s(&ipobo));
        frame(&mut out, &f32s(&self.x));
        frame(&mut out, &f32s(&self.y));
        for (time, values) in &self.steps {
            frame(&mut out, &f32s(&[*time]));
            for array in values {
                frame(&mut out, &f32s(array));
            }
        }
        out.extend_from_slice(&self.trailing);
        out
    }

    pub fn write(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
