use physbridge_common::Pose;
use physbridge_native::{
    ActorHandle, HandleCell, HeightFieldDesc, HeightFieldHandle, HeightFieldSample, MaterialHandle,
    PhysicsBackend, PhysicsHandle, SceneHandle,
};
use std::sync::Arc;

/// World units per quantized height step.
pub const HEIGHT_SCALE: f32 = 0.1;

/// Quantize one height to the engine's signed 16-bit sample range.
///
/// At the 0.1 scale the representable span is ±3276.7 world units; heights
/// beyond it clamp to the extremes, never wrap.
pub fn quantize_height(height: f32) -> i16 {
    let scaled = (height / HEIGHT_SCALE).round();
    scaled.clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

fn build_samples(heightmap: &[f32]) -> Vec<HeightFieldSample> {
    heightmap
        .iter()
        .map(|&height| HeightFieldSample::new(quantize_height(height)))
        .collect()
}

/// Encodes the region heightmap into a native height-field and owns the
/// static actor carrying it.
///
/// At most one terrain surface is live per scene; installing a new one
/// always retires the old pair first.
pub struct TerrainEncoder {
    backend: Arc<dyn PhysicsBackend>,
    physics: PhysicsHandle,
    scene: SceneHandle,
    default_material: Option<MaterialHandle>,
    height_field: HandleCell<HeightFieldHandle>,
    actor: HandleCell<ActorHandle>,
}

impl TerrainEncoder {
    pub fn new(
        backend: Arc<dyn PhysicsBackend>,
        physics: PhysicsHandle,
        scene: SceneHandle,
        default_material: Option<MaterialHandle>,
    ) -> Self {
        Self {
            backend,
            physics,
            scene,
            default_material,
            height_field: HandleCell::empty(),
            actor: HandleCell::empty(),
        }
    }

    /// Install a terrain surface from a row-major heightmap.
    ///
    /// Any native null along the way abandons the swap and unwinds what was
    /// created; the scene is then left with no terrain rather than a stale
    /// one, since the old surface is retired before cooking starts.
    pub fn set_terrain(&self, heightmap: &[f32], width: u32, height: u32) {
        if heightmap.len() != (width as usize) * (height as usize) {
            tracing::warn!(
                samples = heightmap.len(),
                width,
                height,
                "heightmap size mismatch; terrain unchanged"
            );
            return;
        }
        let Some(material) = self.default_material else {
            tracing::warn!("no default material; terrain unavailable");
            return;
        };

        self.dispose();

        let desc = HeightFieldDesc {
            rows: height,
            columns: width,
            samples: build_samples(heightmap),
            convex_edge_threshold: 0.0,
        };
        let Some(height_field) = self.backend.create_height_field(self.physics, &desc) else {
            tracing::warn!("height-field cooking failed; terrain unavailable");
            return;
        };
        let Some(geometry) =
            self.backend
                .create_height_field_geometry(height_field, HEIGHT_SCALE, 1.0, 1.0)
        else {
            self.backend.release_height_field(height_field);
            tracing::warn!("height-field geometry creation failed; terrain unavailable");
            return;
        };
        let Some(actor) = self.backend.create_rigid_static(self.physics, Pose::IDENTITY) else {
            self.backend.release_geometry(geometry);
            self.backend.release_height_field(height_field);
            tracing::warn!("terrain actor creation failed; terrain unavailable");
            return;
        };
        if self
            .backend
            .create_shape(actor, geometry, material, Pose::IDENTITY)
            .is_none()
        {
            self.backend.release_geometry(geometry);
            self.backend.release_actor(actor);
            self.backend.release_height_field(height_field);
            tracing::warn!("terrain shape attach failed; terrain unavailable");
            return;
        }
        self.backend.scene_add_actor(self.scene, actor);
        self.height_field.set(height_field);
        self.actor.set(actor);
        tracing::debug!(width, height, "terrain surface installed");
    }

    pub fn has_terrain(&self) -> bool {
        self.actor.is_live()
    }

    /// Retire the terrain actor and height-field. Safe with none present.
    pub fn dispose(&self) {
        if let Some(actor) = self.actor.take() {
            self.backend.scene_remove_actor(self.scene, actor, false);
            self.backend.release_actor(actor);
        }
        if let Some(height_field) = self.height_field.take() {
            self.backend.release_height_field(height_field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantizes_at_decimeter_precision() {
        assert_eq!(quantize_height(150.0), 1500);
        assert_eq!(quantize_height(0.0), 0);
        assert_eq!(quantize_height(-2.5), -25);
    }

    #[test]
    fn clamps_instead_of_wrapping() {
        assert_eq!(quantize_height(4000.0), i16::MAX);
        assert_eq!(quantize_height(-4000.0), i16::MIN);
    }

    #[test]
    fn samples_preserve_layout() {
        let samples = build_samples(&[1.0, 2.0, 3.0, 4.0]);
        let heights: Vec<i16> = samples.iter().map(|s| s.height).collect();
        assert_eq!(heights, vec![10, 20, 30, 40]);
    }
}
