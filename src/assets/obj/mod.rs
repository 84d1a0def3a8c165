//! Wavefront `.obj` decoding into scene entities and encoding back to text.
//!
//! Decoded objects are attached to their container mirrored on x
//! (`scale = (-1, 1, 1)`), while the encoder negates x of every written
//! position. Decoding a file written by the encoder therefore restores the
//! original positions.

mod builder;
mod error;
mod parser;
mod writer;

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use gfx_maths::Vec3;
use hm_format::mesh::MeshData;
use log::info;

use crate::scene::{Entity, Material, MaterialLookup, MeshRenderer, Transform};

use self::builder::ObjMeshBuilder;

pub use self::builder::FaceOutcome;
pub use self::error::{ObjError, ObjResult, ParserError};
pub use self::writer::{encode, save, MeshSource, ObjEncoder};

/// How faces are grouped into mesh objects
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// One object per `g`/`o` name
    #[default]
    ByObject,
    /// One object per `usemtl` name, `g`/`o` are ignored
    BySplitMaterial,
}

/// Decodes OBJ streams into entity trees
pub struct ObjDecoder<'a> {
    name: String,
    default_material: Arc<Material>,
    split_mode: SplitMode,
    materials: Option<&'a dyn MaterialLookup>,
    calculate_normals: bool,
}

impl<'a> ObjDecoder<'a> {
    pub fn new(default_material: Arc<Material>) -> Self {
        Self {
            name: String::from("Mesh"),
            default_material,
            split_mode: SplitMode::default(),
            materials: None,
            calculate_normals: false,
        }
    }

    /// Name of the container created when none is passed to [`ObjDecoder::decode`]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_split_mode(mut self, split_mode: SplitMode) -> Self {
        self.split_mode = split_mode;
        self
    }

    pub fn with_materials(mut self, materials: &'a dyn MaterialLookup) -> Self {
        self.materials = Some(materials);
        self
    }

    /// Recalculate normals even if the file provides them
    pub fn with_calculated_normals(mut self, calculate_normals: bool) -> Self {
        self.calculate_normals = calculate_normals;
        self
    }

    /// Parses `reader` into bare meshes, one per object, without building entities.
    pub fn decode_meshes<R: Read>(&self, reader: R) -> ObjResult<Vec<MeshData>> {
        let builder = parser::parse(reader, ObjMeshBuilder::new(self.split_mode))?;
        Ok(builder.build_meshes(self.calculate_normals))
    }

    /// Parses `reader` and attaches one child entity per object to `container`,
    /// or to a new root entity if none is given.
    pub fn decode<R: Read>(&self, reader: R, container: Option<Entity>) -> ObjResult<Entity> {
        let meshes = self.decode_meshes(reader)?;
        let mut container = container.unwrap_or_else(|| Entity::new(self.name.as_str()));

        let (mut vertices, mut triangles) = (0, 0);
        for mesh in meshes {
            vertices += mesh.vertex_count();
            triangles += mesh.triangle_count();

            let materials = mesh
                .submeshes
                .iter()
                .map(|sm| self.resolve_material(&sm.material))
                .collect();

            let child = Entity::new_with_transform(
                mesh.name.as_str(),
                Transform::from_scale(Vec3::new(-1.0, 1.0, 1.0)),
            )
            .with_mesh_renderer(MeshRenderer { mesh, materials });
            container.add_child(child);
        }

        info!(
            "Decoded \"{}\": {} objects, {} vertices, {} triangles",
            container.name,
            container.children().len(),
            vertices,
            triangles
        );

        Ok(container)
    }

    /// Decodes the file at `path`; a new container is named after the file
    pub fn load_file(&self, path: &Path, container: Option<Entity>) -> ObjResult<Entity> {
        info!("Loading mesh: {}", path.display());
        let file = File::open(path)?;

        match container {
            Some(container) => self.decode(file, Some(container)),
            None => {
                let name = path
                    .file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
                    .unwrap_or_else(|| self.name.clone());
                self.decode(file, Some(Entity::new(name)))
            }
        }
    }

    fn resolve_material(&self, name: &str) -> Arc<Material> {
        self.materials
            .and_then(|lookup| lookup.find_material(name))
            .unwrap_or_else(|| Arc::clone(&self.default_material))
    }
}

/// Decodes `reader` with `default_material` for every submesh
pub fn decode<R: Read>(
    reader: R,
    default_material: Arc<Material>,
    split_mode: SplitMode,
    container: Option<Entity>,
) -> ObjResult<Entity> {
    ObjDecoder::new(default_material)
        .with_split_mode(split_mode)
        .decode(reader, container)
}
