use crate::error::{FormatError, Result};
use gfx_maths::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

/// Triangles sharing one material
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submesh {
    pub material: String,
    pub faces: Vec<Face>,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Face {
    pub indices: [u32; 3],
}

impl Face {
    pub fn new(a: u32, b: u32, c: u32) -> Self {
        Self { indices: [a, b, c] }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub submeshes: Vec<Submesh>,
}

impl MeshData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.submeshes.iter().map(|sm| sm.faces.len()).sum()
    }

    /// All faces of all submeshes, in submesh order
    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.submeshes.iter().flat_map(|sm| sm.faces.iter())
    }

    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (submesh, sm) in self.submeshes.iter().enumerate() {
            for (face, f) in sm.faces.iter().enumerate() {
                if let Some(&index) = f.indices.iter().find(|&&i| i as usize >= vertex_count) {
                    return Err(FormatError::IndexOutOfBounds {
                        submesh,
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mesh = bincode::deserialize::<MeshData>(bytes)?;
        mesh.validate()?;
        Ok(mesh)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        MeshData::from_bytes(&data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self)?)
    }
}
