use gfx_maths::*;

#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quaternion,
    pub scale: Vec3,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::zero(),
            rotation: Quaternion::identity(),
            scale: Vec3::one(),
        }
    }

    pub fn from_scale(scale: Vec3) -> Self {
        Self {
            scale,
            ..Self::identity()
        }
    }

    pub fn get_model_matrix(&self) -> Mat4 {
        Mat4::local_to_world(self.position, self.rotation, self.scale)
    }

    pub fn get_inverse_model_matrix(&self) -> Mat4 {
        Mat4::world_to_local(self.position, self.rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Maps a point through `matrix` (w = 1).
pub fn transform_point(matrix: &Mat4, point: Vec3) -> Vec3 {
    let p = *matrix * Vec4::new(point.x, point.y, point.z, 1.0);
    Vec3::new(p.x, p.y, p.z)
}
