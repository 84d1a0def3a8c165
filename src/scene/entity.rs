use std::sync::Arc;

use gfx_maths::Mat4;
use hm_format::mesh::MeshData;

use super::material::Material;
use super::transform::Transform;

/// Mesh data together with one material per submesh
#[derive(Debug, Clone)]
pub struct MeshRenderer {
    pub mesh: MeshData,
    pub materials: Vec<Arc<Material>>,
}

impl MeshRenderer {
    /// Material of the submesh at `index`, if there is one
    pub fn material(&self, index: usize) -> Option<&Arc<Material>> {
        self.materials.get(index)
    }
}

/// A node of an owned scene tree.
///
/// Children are owned by value, so detaching one with [`Entity::remove_child`]
/// hands it over to the caller without touching the rest of the tree.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub transform: Transform,
    mesh_renderer: Option<MeshRenderer>,
    children: Vec<Entity>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Entity {
        Self::new_with_transform(name, Transform::identity())
    }

    pub fn new_with_transform(name: impl Into<String>, transform: Transform) -> Entity {
        Entity {
            name: name.into(),
            transform,
            mesh_renderer: None,
            children: Vec::new(),
        }
    }

    pub fn with_mesh_renderer(mut self, renderer: MeshRenderer) -> Entity {
        self.mesh_renderer = Some(renderer);
        self
    }

    pub fn mesh_renderer(&self) -> Option<&MeshRenderer> {
        self.mesh_renderer.as_ref()
    }

    pub fn mesh_renderer_mut(&mut self) -> Option<&mut MeshRenderer> {
        self.mesh_renderer.as_mut()
    }

    pub fn set_mesh_renderer(&mut self, renderer: Option<MeshRenderer>) -> Option<MeshRenderer> {
        std::mem::replace(&mut self.mesh_renderer, renderer)
    }

    pub fn children(&self) -> &[Entity] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Entity] {
        &mut self.children
    }

    pub fn add_child(&mut self, child: Entity) {
        self.children.push(child);
    }

    /// Detaches the first child called `name` and returns it
    pub fn remove_child(&mut self, name: &str) -> Option<Entity> {
        let idx = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(idx))
    }

    pub fn find_child(&self, name: &str) -> Option<&Entity> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn get_model_matrix(&self) -> Mat4 {
        self.transform.get_model_matrix()
    }

    pub fn get_inverse_model_matrix(&self) -> Mat4 {
        self.transform.get_inverse_model_matrix()
    }

    /// Calls `f` for every entity carrying a mesh, depth first, with the
    /// entity's local-to-world matrix (this entity being the world root).
    pub fn visit_meshes<'a, F>(&'a self, f: &mut F)
    where
        F: FnMut(&'a Entity, &'a MeshRenderer, Mat4),
    {
        self.visit_meshes_with_parent(Mat4::identity(), f);
    }

    fn visit_meshes_with_parent<'a, F>(&'a self, parent_to_world: Mat4, f: &mut F)
    where
        F: FnMut(&'a Entity, &'a MeshRenderer, Mat4),
    {
        let local_to_world = parent_to_world * self.get_model_matrix();
        if let Some(renderer) = &self.mesh_renderer {
            f(self, renderer, local_to_world);
        }
        for child in &self.children {
            child.visit_meshes_with_parent(local_to_world, f);
        }
    }
}
