use glam::Vec3;
use physbridge_common::{PrimShape, ProfileShape};
use physbridge_native::{GeometryHandle, HandleCell, MaterialHandle, PhysicsBackend, PhysicsHandle};
use std::sync::Arc;

/// Geometry the sphere/box policy settled on for a prim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeometryApprox {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
}

/// Map a prim descriptor and bounding size onto the native approximation.
///
/// A circular profile whose bounding box is uniform on all three axes
/// becomes a sphere of half the uniform extent; everything else becomes an
/// axis-aligned box of half-extents. A deliberate approximation, not a
/// convex-hull mapping.
pub fn approximate(shape: &PrimShape, size: Vec3) -> GeometryApprox {
    if shape.profile == ProfileShape::Circle && size.x == size.y && size.y == size.z {
        GeometryApprox::Sphere {
            radius: size.x * 0.5,
        }
    } else {
        GeometryApprox::Box {
            half_extents: size * 0.5,
        }
    }
}

/// Maps shape descriptors to native geometry and owns the shared default
/// material every prim and the terrain reuse.
pub struct ShapeManager {
    backend: Arc<dyn PhysicsBackend>,
    default_material: HandleCell<MaterialHandle>,
}

impl ShapeManager {
    /// Creates the process-wide default material: friction 0.5/0.5,
    /// restitution 0.5. A null material is tolerated here; dependent
    /// features fail individually later.
    pub fn new(backend: Arc<dyn PhysicsBackend>, physics: PhysicsHandle) -> Self {
        let default_material = backend.create_material(physics, 0.5, 0.5, 0.5);
        if default_material.is_none() {
            tracing::warn!("default material creation failed; shapes will be unavailable");
        }
        Self {
            backend,
            default_material: HandleCell::new(default_material),
        }
    }

    pub fn create_geometry(&self, shape: &PrimShape, size: Vec3) -> Option<GeometryHandle> {
        match approximate(shape, size) {
            GeometryApprox::Sphere { radius } => self.backend.create_sphere_geometry(radius),
            GeometryApprox::Box { half_extents } => self.backend.create_box_geometry(half_extents),
        }
    }

    pub fn default_material(&self) -> Option<MaterialHandle> {
        self.default_material.get()
    }

    /// Release the shared material. Idempotent.
    pub fn dispose(&self) {
        if let Some(material) = self.default_material.take() {
            self.backend.release_material(material);
        }
    }
}
