use crate::POSE_EPSILON_SQ;
use glam::Vec3;
use physbridge_common::sync::lock;
use physbridge_common::{ObjectId, TerseUpdate};
use physbridge_native::{
    CapsuleControllerDesc, ControllerHandle, ControllerManagerHandle, HandleCell, PhysicsBackend,
};
use std::sync::{Arc, Mutex};

/// Gravitational acceleration applied to walking avatars, world units/s².
const GRAVITY: f32 = 9.81;

/// Minimum travel distance below which the native move is consumed as zero.
const MIN_MOVE_DISTANCE: f32 = 0.001;

/// Displacement for one controller step.
///
/// Velocity integrates over the step; walking avatars additionally sink by a
/// constant `g·dt²` offset. The offset is a per-step displacement rather
/// than an integrated velocity term, so fall speed depends on frame time —
/// preserved as documented behavior.
pub fn step_displacement(velocity: Vec3, dt: f32, flying: bool) -> Vec3 {
    let mut displacement = velocity * dt;
    if !flying {
        displacement.z -= GRAVITY * dt * dt;
    }
    displacement
}

struct MotionState {
    position: Vec3,
    velocity: Vec3,
    flying: bool,
}

/// An agent body wrapping a native capsule controller.
///
/// Controller creation can fail; the avatar then exists but every native
/// interaction is a no-op, matching the engine-unavailable degradation the
/// rest of the adapter follows.
pub struct AvatarBody {
    id: ObjectId,
    name: String,
    size: Vec3,
    backend: Arc<dyn PhysicsBackend>,
    controller: HandleCell<ControllerHandle>,
    state: Mutex<MotionState>,
}

impl AvatarBody {
    pub(crate) fn new(
        backend: Arc<dyn PhysicsBackend>,
        manager: ControllerManagerHandle,
        id: ObjectId,
        name: &str,
        position: Vec3,
        size: Vec3,
    ) -> Self {
        let desc = CapsuleControllerDesc {
            position,
            height: size.z,
            radius: size.x * 0.5,
            ..CapsuleControllerDesc::default()
        };
        let controller = backend.create_controller(manager, &desc);
        if controller.is_none() {
            tracing::warn!(id = %id, name, "character controller creation failed; avatar will be inert");
        }
        Self {
            id,
            name: name.to_owned(),
            size,
            backend,
            controller: HandleCell::new(controller),
            state: Mutex::new(MotionState {
                position,
                velocity: Vec3::ZERO,
                flying: false,
            }),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Whether a live native controller backs this avatar.
    pub fn is_active(&self) -> bool {
        self.controller.is_live()
    }

    pub fn position(&self) -> Vec3 {
        lock(&self.state).position
    }

    /// Teleport; writes through to the native controller.
    pub fn set_position(&self, position: Vec3) {
        lock(&self.state).position = position;
        if let Some(controller) = self.controller.get() {
            self.backend.set_controller_position(controller, position);
        }
    }

    pub fn velocity(&self) -> Vec3 {
        lock(&self.state).velocity
    }

    pub fn set_velocity(&self, velocity: Vec3) {
        lock(&self.state).velocity = velocity;
    }

    pub fn flying(&self) -> bool {
        lock(&self.state).flying
    }

    pub fn set_flying(&self, flying: bool) {
        lock(&self.state).flying = flying;
    }

    /// Apply this frame's movement intent. Skipped entirely at zero
    /// velocity; a standing avatar issues no native move at all.
    pub(crate) fn move_step(&self, dt: f32) {
        let Some(controller) = self.controller.get() else {
            return;
        };
        let (velocity, flying) = {
            let state = lock(&self.state);
            (state.velocity, state.flying)
        };
        if velocity == Vec3::ZERO {
            return;
        }
        let displacement = step_displacement(velocity, dt, flying);
        self.backend
            .controller_move(controller, displacement, MIN_MOVE_DISTANCE, dt);
    }

    /// Read back the controller position, gated by the same displacement
    /// epsilon the registry uses.
    pub(crate) fn sync_from_engine(&self) -> Option<TerseUpdate> {
        let controller = self.controller.get()?;
        let fresh = self.backend.controller_position(controller);
        let mut state = lock(&self.state);
        if (fresh - state.position).length_squared() >= POSE_EPSILON_SQ {
            state.position = fresh;
            Some(TerseUpdate::Avatar {
                id: self.id,
                position: fresh,
            })
        } else {
            None
        }
    }

    /// Release the native controller. Idempotent.
    pub(crate) fn release(&self) {
        if let Some(controller) = self.controller.take() {
            self.backend.release_controller(controller);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walking_adds_gravity_offset() {
        let d = step_displacement(Vec3::new(1.0, 0.0, 0.0), 0.5, false);
        assert_eq!(d.x, 0.5);
        assert_eq!(d.y, 0.0);
        assert!((d.z - (-GRAVITY * 0.25)).abs() < 1.0e-6);
    }

    #[test]
    fn flying_has_no_gravity() {
        let d = step_displacement(Vec3::new(1.0, 2.0, 3.0), 0.5, true);
        assert_eq!(d, Vec3::new(0.5, 1.0, 1.5));
    }

    #[test]
    fn gravity_scales_with_square_of_step() {
        let short = step_displacement(Vec3::X, 0.1, false).z;
        let long = step_displacement(Vec3::X, 0.2, false).z;
        assert!((long / short - 4.0).abs() < 1.0e-4);
    }
}
