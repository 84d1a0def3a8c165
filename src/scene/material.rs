use std::collections::HashMap;
use std::sync::Arc;

use gfx_maths::Vec4;

/// Render material handle shared between submeshes
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub albedo: Vec4,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            albedo: Vec4::new(0.5, 0.5, 0.5, 1.0),
        }
    }

    pub fn with_albedo(mut self, albedo: Vec4) -> Self {
        self.albedo = albedo;
        self
    }
}

/// Resolves materials by the name given in `usemtl` directives.
pub trait MaterialLookup {
    fn find_material(&self, name: &str) -> Option<Arc<Material>>;
}

impl MaterialLookup for HashMap<String, Arc<Material>> {
    fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        self.get(name).cloned()
    }
}

impl MaterialLookup for [Arc<Material>] {
    fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        self.iter().find(|m| m.name == name).cloned()
    }
}

impl MaterialLookup for Vec<Arc<Material>> {
    fn find_material(&self, name: &str) -> Option<Arc<Material>> {
        self.as_slice().find_material(name)
    }
}
