pub mod entity;
pub mod material;
pub mod transform;

pub use entity::{Entity, MeshRenderer};
pub use material::{Material, MaterialLookup};
pub use transform::Transform;
