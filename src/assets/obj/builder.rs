use std::collections::HashMap;

use gfx_maths::*;
use hm_format::mesh::{Face, MeshData, Submesh, Vertex};
use log::debug;

use super::error::ParserError;
use super::SplitMode;

pub(crate) const DEFAULT_OBJECT: &str = "default";

/// One corner of an `f` directive, 0-based, as written in the file
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct ObjFaceIndex {
    pub(crate) vert_i: i64,
    pub(crate) uv_i: Option<i64>,
    pub(crate) normal_i: Option<i64>,
}

/// (position, normal, uv) with -1 for absent
type AttributeKey = (i64, i64, i64);

impl ObjFaceIndex {
    fn key(&self) -> AttributeKey {
        (
            self.vert_i,
            self.normal_i.unwrap_or(-1),
            self.uv_i.unwrap_or(-1),
        )
    }
}

/// What happened to an `f` directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOutcome {
    /// Stored as this many triangles
    Triangles(u8),
    /// Skipped because of its corner count
    Dropped(usize),
}

#[derive(Debug)]
struct ObjFace {
    indexes: [u32; 3],
    material: usize,
    object: usize,
}

pub(crate) struct ObjMeshBuilder {
    split_mode: SplitMode,
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    vertices: Vec<Vertex>,
    vertex_map: HashMap<AttributeKey, u32>,
    faces: Vec<ObjFace>,
    object_names: Vec<String>,
    material_names: Vec<String>,
    curr_object: Option<usize>,
    curr_material: usize,
    has_normals: bool,
}

impl ObjMeshBuilder {
    pub(crate) fn new(split_mode: SplitMode) -> Self {
        Self {
            split_mode,
            positions: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            vertices: Vec::new(),
            vertex_map: HashMap::new(),
            faces: Vec::new(),
            object_names: Vec::new(),
            // faces before the first `usemtl` use the unnamed material
            material_names: vec![String::new()],
            curr_object: None,
            curr_material: 0,
            has_normals: false,
        }
    }

    pub(crate) fn object_names(&self) -> &[String] {
        &self.object_names
    }

    pub(crate) fn material_names(&self) -> &[String] {
        &self.material_names
    }

    pub(crate) fn unique_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub(crate) fn has_normals(&self) -> bool {
        self.has_normals
    }

    pub(crate) fn set_object(&mut self, name: &str) {
        if self.split_mode == SplitMode::ByObject {
            let name = if name.is_empty() { DEFAULT_OBJECT } else { name };
            self.curr_object = Some(register(&mut self.object_names, name));
        }
    }

    pub(crate) fn set_material(&mut self, name: &str) {
        self.curr_material = register(&mut self.material_names, name);

        if self.split_mode == SplitMode::BySplitMaterial {
            self.curr_object = Some(register(&mut self.object_names, name));
        }
    }

    pub(crate) fn push_position(&mut self, position: [f32; 3]) {
        self.positions.push(position);
    }

    pub(crate) fn push_uv(&mut self, uv: [f32; 2]) {
        self.uvs.push(uv);
    }

    pub(crate) fn push_normal(&mut self, normal: [f32; 3]) {
        self.normals.push(normal);
    }

    pub(crate) fn push_face(&mut self, corners: &[ObjFaceIndex]) -> Result<FaceOutcome, ParserError> {
        if !(3..=4).contains(&corners.len()) {
            return Ok(FaceOutcome::Dropped(corners.len()));
        }

        let indexes = corners
            .iter()
            .map(|corner| self.find_vertex(corner))
            .collect::<Result<Vec<u32>, _>>()?;

        let material = self.curr_material;
        let object = self.current_object();

        self.faces.push(ObjFace {
            indexes: [indexes[0], indexes[1], indexes[2]],
            material,
            object,
        });

        if indexes.len() == 4 {
            self.faces.push(ObjFace {
                indexes: [indexes[2], indexes[3], indexes[0]],
                material,
                object,
            });
            return Ok(FaceOutcome::Triangles(2));
        }

        Ok(FaceOutcome::Triangles(1))
    }

    // faces outside of any named object land in the default object
    fn current_object(&mut self) -> usize {
        match self.curr_object {
            Some(object) => object,
            None => {
                let object = register(&mut self.object_names, DEFAULT_OBJECT);
                self.curr_object = Some(object);
                object
            }
        }
    }

    // returns the unique vertex for this corner, creating it on first use
    fn find_vertex(&mut self, corner: &ObjFaceIndex) -> Result<u32, ParserError> {
        let key = corner.key();
        if let Some(&idx) = self.vertex_map.get(&key) {
            return Ok(idx);
        }

        let position = lookup(&self.positions, Some(corner.vert_i)).ok_or(
            ParserError::VertexOutOfRange {
                index: corner.vert_i + 1,
                count: self.positions.len(),
            },
        )?;

        // out of range normals and uvs are zero filled
        let normal = match lookup(&self.normals, corner.normal_i) {
            Some(normal) => {
                self.has_normals = true;
                normal
            }
            None => [0.0, 0.0, 0.0],
        };
        let uv = lookup(&self.uvs, corner.uv_i).unwrap_or([0.0, 0.0]);

        let idx = self.vertices.len() as u32;
        self.vertices.push(Vertex {
            position: Vec3::new(position[0], position[1], position[2]),
            normal: Vec3::new(normal[0], normal[1], normal[2]),
            uv: Vec2::new(uv[0], uv[1]),
        });
        self.vertex_map.insert(key, idx);

        Ok(idx)
    }

    /// Builds one mesh per object name, with one submesh per material used by that object.
    pub(crate) fn build_meshes(self, calculate_normals: bool) -> Vec<MeshData> {
        let mut object_names = self.object_names;
        if object_names.is_empty() {
            object_names.push(DEFAULT_OBJECT.to_owned());
        }

        let recalculate = calculate_normals || !self.has_normals;

        let mut meshes = Vec::with_capacity(object_names.len());
        for (object, name) in object_names.into_iter().enumerate() {
            let mut mesh = MeshData::new(name);
            let mut remap: HashMap<u32, u32> = HashMap::new();

            let object_faces: Vec<&ObjFace> =
                self.faces.iter().filter(|f| f.object == object).collect();

            for (material, material_name) in self.material_names.iter().enumerate() {
                let mut faces = Vec::new();
                for face in object_faces.iter().filter(|f| f.material == material) {
                    let mut indices = [0u32; 3];
                    for (local, &global) in indices.iter_mut().zip(face.indexes.iter()) {
                        *local = *remap.entry(global).or_insert_with(|| {
                            mesh.vertices.push(self.vertices[global as usize]);
                            (mesh.vertices.len() - 1) as u32
                        });
                    }
                    faces.push(Face { indices });
                }

                if faces.is_empty() {
                    continue;
                }

                debug!(
                    "Object \"{}\": submesh \"{}\" with {} triangles",
                    mesh.name,
                    material_name,
                    faces.len()
                );
                mesh.submeshes.push(Submesh {
                    material: material_name.clone(),
                    faces,
                });
            }

            if recalculate {
                calculate_normals_for(&mut mesh);
            }

            meshes.push(mesh);
        }

        meshes
    }
}

// adds `name` if it is not known yet and returns its position
fn register(names: &mut Vec<String>, name: &str) -> usize {
    match names.iter().position(|n| n == name) {
        Some(idx) => idx,
        None => {
            names.push(name.to_owned());
            names.len() - 1
        }
    }
}

fn lookup<T: Copy>(values: &[T], index: Option<i64>) -> Option<T> {
    let index = usize::try_from(index?).ok()?;
    values.get(index).copied()
}

/// calculates smooth vertex normals of the mesh
// - go through each face
// - - face_normal = cross(v1 - v0, v2 - v0), its length is twice the face area
// - - add it to all three vertices, so bigger faces weigh more
// - normalize every vertex normal; vertices of degenerate faces keep a zero normal
pub(crate) fn calculate_normals_for(mesh: &mut MeshData) {
    let mut accumulated = vec![Vec3::zero(); mesh.vertices.len()];

    for face in mesh.faces() {
        let [i0, i1, i2] = face.indices.map(|i| i as usize);
        let (v0, v1, v2) = (mesh.vertices[i0], mesh.vertices[i1], mesh.vertices[i2]);
        let u: Vec3 = &v1.position - &v0.position;
        let v: Vec3 = &v2.position - &v0.position;
        let normal = u.cross(v);

        for idx in [i0, i1, i2] {
            accumulated[idx] += normal;
        }
    }

    for (vertex, normal) in mesh.vertices.iter_mut().zip(accumulated) {
        vertex.normal = if normal.magnitude() > f32::EPSILON {
            normal.normalized()
        } else {
            Vec3::zero()
        };
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn corner(v: i64) -> ObjFaceIndex {
        ObjFaceIndex {
            vert_i: v,
            ..ObjFaceIndex::default()
        }
    }

    fn builder_with_positions(count: usize) -> ObjMeshBuilder {
        let mut builder = ObjMeshBuilder::new(SplitMode::ByObject);
        for i in 0..count {
            builder.push_position([i as f32, 0.0, 0.0]);
        }
        builder
    }

    #[test]
    fn test_face_outcomes() -> Result<(), ParserError> {
        let mut builder = builder_with_positions(5);

        let tri = [corner(0), corner(1), corner(2)];
        let quad = [corner(0), corner(1), corner(2), corner(3)];
        let line = [corner(0), corner(1)];
        let pentagon = [corner(0), corner(1), corner(2), corner(3), corner(4)];

        assert_eq!(builder.push_face(&tri)?, FaceOutcome::Triangles(1));
        assert_eq!(builder.push_face(&quad)?, FaceOutcome::Triangles(2));
        assert_eq!(builder.unique_vertex_count(), 4);

        assert_eq!(builder.push_face(&line)?, FaceOutcome::Dropped(2));
        assert_eq!(builder.push_face(&pentagon)?, FaceOutcome::Dropped(5));
        assert_eq!(builder.unique_vertex_count(), 4);
        assert_eq!(builder.face_count(), 3);

        Ok(())
    }

    #[test]
    fn test_quad_split() -> Result<(), ParserError> {
        let mut builder = builder_with_positions(4);
        builder.push_face(&[corner(0), corner(1), corner(2), corner(3)])?;

        let mesh = &builder.build_meshes(false)[0];
        assert_eq!(
            mesh.submeshes[0].faces,
            vec![Face::new(0, 1, 2), Face::new(2, 3, 0)]
        );
        Ok(())
    }

    #[test]
    fn test_vertex_out_of_range() {
        let mut builder = builder_with_positions(2);
        let result = builder.push_face(&[corner(0), corner(1), corner(2)]);
        assert!(matches!(
            result,
            Err(ParserError::VertexOutOfRange { index: 3, count: 2 })
        ));
    }

    #[test]
    fn test_missing_attributes_are_zero_filled() -> Result<(), ParserError> {
        let mut builder = builder_with_positions(3);
        builder.push_normal([0.0, 1.0, 0.0]);
        builder.push_uv([0.5, 0.5]);

        let corners = [
            ObjFaceIndex {
                vert_i: 0,
                uv_i: Some(0),
                normal_i: Some(0),
            },
            ObjFaceIndex {
                vert_i: 1,
                uv_i: Some(7),
                normal_i: Some(-3),
            },
            corner(2),
        ];
        builder.push_face(&corners)?;
        assert!(builder.has_normals());

        let mesh = &builder.build_meshes(false)[0];
        assert_eq!(mesh.vertices[0].normal, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(mesh.vertices[0].uv, Vec2::new(0.5, 0.5));
        assert_eq!(mesh.vertices[1].normal, Vec3::zero());
        assert_eq!(mesh.vertices[1].uv, Vec2::new(0.0, 0.0));
        assert_eq!(mesh.vertices[2].normal, Vec3::zero());
        Ok(())
    }

    #[test]
    fn test_calculate_normals() {
        let vertex = |x: f32, y: f32| Vertex {
            position: Vec3::new(x, y, 0.0),
            ..Vertex::default()
        };
        let mut mesh = MeshData {
            name: "tri".into(),
            vertices: vec![vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0)],
            submeshes: vec![Submesh {
                material: String::new(),
                faces: vec![Face::new(0, 1, 2)],
            }],
        };

        calculate_normals_for(&mut mesh);
        for v in &mesh.vertices {
            assert_eq!(v.normal, Vec3::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_calculate_normals_area_weighted() {
        let vertex = |x: f32, y: f32, z: f32| Vertex {
            position: Vec3::new(x, y, z),
            ..Vertex::default()
        };
        // a large face in the xy plane and a small one in the xz plane share vertex 0
        let mut mesh = MeshData {
            name: "corner".into(),
            vertices: vec![
                vertex(0.0, 0.0, 0.0),
                vertex(2.0, 0.0, 0.0),
                vertex(0.0, 2.0, 0.0),
                vertex(0.0, 0.0, 1.0),
                vertex(1.0, 0.0, 0.0),
            ],
            submeshes: vec![Submesh {
                material: String::new(),
                faces: vec![Face::new(0, 1, 2), Face::new(0, 3, 4)],
            }],
        };

        calculate_normals_for(&mut mesh);

        let shared = mesh.vertices[0].normal;
        let expected = Vec3::new(0.0, 1.0, 4.0).normalized();
        assert!((shared - expected).magnitude() < 1e-6, "{:?}", shared);
        assert_eq!(mesh.vertices[1].normal, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.vertices[3].normal, Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_split_by_material_ignores_groups() -> Result<(), ParserError> {
        let mut builder = ObjMeshBuilder::new(SplitMode::BySplitMaterial);
        for i in 0..3 {
            builder.push_position([i as f32, 0.0, 0.0]);
        }
        builder.set_object("ignored");
        builder.set_material("red");
        builder.push_face(&[corner(0), corner(1), corner(2)])?;

        assert_eq!(builder.object_names(), &["red".to_owned()]);
        assert_eq!(builder.material_names(), &[String::new(), "red".to_owned()]);
        Ok(())
    }
}
