use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use gfx_maths::Mat4;
use hm_format::mesh::MeshData;
use log::{debug, info};

use super::error::{ObjError, ObjResult};
use crate::scene::transform::transform_point;
use crate::scene::Entity;

/// A mesh to be written, optionally baked into the space of `transform`
#[derive(Clone, Copy)]
pub struct MeshSource<'a> {
    pub mesh: &'a MeshData,
    pub transform: Option<Mat4>,
}

impl<'a> MeshSource<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self {
            mesh,
            transform: None,
        }
    }

    pub fn with_transform(mesh: &'a MeshData, transform: Mat4) -> Self {
        Self {
            mesh,
            transform: Some(transform),
        }
    }

    /// Every mesh below `root` (inclusive), each with its local-to-world matrix
    pub fn collect(root: &'a Entity) -> Vec<MeshSource<'a>> {
        let mut sources = Vec::new();
        root.visit_meshes(&mut |_, renderer, local_to_world| {
            sources.push(MeshSource::with_transform(&renderer.mesh, local_to_world));
        });
        sources
    }
}

/// Writes meshes as consecutive OBJ objects into one stream.
///
/// The encoder owns the running vertex offset, so faces of every object
/// written through the same encoder index into one contiguous vertex list.
pub struct ObjEncoder<W: Write> {
    writer: BufWriter<W>,
    vertex_offset: usize,
    object_count: usize,
}

impl<W: Write> ObjEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            vertex_offset: 0,
            object_count: 0,
        }
    }

    /// Number of vertices written so far
    pub fn vertex_offset(&self) -> usize {
        self.vertex_offset
    }

    pub fn object_count(&self) -> usize {
        self.object_count
    }

    pub fn write_mesh(&mut self, source: &MeshSource) -> ObjResult<()> {
        let mesh = source.mesh;
        let number = self.object_count + 1;

        debug!(
            "Writing \"{}\" as Object.{} ({} vertices, {} triangles)",
            mesh.name,
            number,
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        writeln!(self.writer, "o Object.{}", number)?;

        for vertex in &mesh.vertices {
            let v = match &source.transform {
                Some(matrix) => transform_point(matrix, vertex.position),
                None => vertex.position,
            };
            writeln!(self.writer, "v {} {} {}", -v.x, v.y, v.z)?;
        }

        // mirroring x flips the handedness, so the winding is reversed as well
        let base = self.vertex_offset + 1;
        for face in mesh.faces() {
            let [a, b, c] = face.indices.map(|i| i as usize + base);
            writeln!(self.writer, "f {} {} {}", c, b, a)?;
        }

        writeln!(self.writer)?;

        // only a completely written object advances the counters
        self.object_count = number;
        self.vertex_offset += mesh.vertex_count();

        Ok(())
    }

    /// Flushes the buffered output and hands back the stream
    pub fn finish(self) -> ObjResult<W> {
        self.writer
            .into_inner()
            .map_err(|err| ObjError::Io(err.into_error()))
    }
}

/// Encodes `meshes` into `writer`; the stream is flushed even if writing fails.
pub fn encode<'a, I, W>(meshes: I, writer: W) -> ObjResult<()>
where
    I: IntoIterator<Item = MeshSource<'a>>,
    W: Write,
{
    let mut meshes = meshes.into_iter().peekable();
    if meshes.peek().is_none() {
        return Err(ObjError::InvalidArgument("no meshes to encode".to_owned()));
    }

    let mut encoder = ObjEncoder::new(writer);
    let written = meshes.try_for_each(|source| encoder.write_mesh(&source));
    let finished = encoder.finish();

    written?;
    finished?;
    Ok(())
}

/// Encodes `meshes` into `<folder>/<file_name>.obj` and returns the path
pub fn save<'a, I>(meshes: I, folder: &Path, file_name: &str) -> ObjResult<PathBuf>
where
    I: IntoIterator<Item = MeshSource<'a>>,
{
    if file_name.is_empty() {
        return Err(ObjError::InvalidArgument("file name is empty".to_owned()));
    }

    let mut meshes = meshes.into_iter().peekable();
    if meshes.peek().is_none() {
        return Err(ObjError::InvalidArgument("no meshes to encode".to_owned()));
    }

    let path = folder.join(format!("{}.obj", file_name));
    encode(meshes, File::create(&path)?)?;

    info!("Mesh file saved: {}", path.display());
    Ok(path)
}
