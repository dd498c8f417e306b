use crate::backend::PhysicsBackend;
use crate::desc::{CapsuleControllerDesc, HeightFieldDesc, SceneDesc, TolerancesScale};
use crate::handle::{
    ActorHandle, ControllerHandle, ControllerManagerHandle, FoundationHandle, GeometryHandle,
    HeightFieldHandle, MaterialHandle, PhysicsHandle, SceneHandle, ShapeHandle,
};
use glam::Vec3;
use physbridge_common::Pose;

/// Backend for hosts without the native engine library.
///
/// Every creation fails, which drives the adapter into its disabled state;
/// the remaining operations are unreachable in practice because no handle is
/// ever produced, and are inert if called anyway.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl NullBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PhysicsBackend for NullBackend {
    fn create_foundation(&self) -> Option<FoundationHandle> {
        None
    }

    fn create_physics(
        &self,
        _foundation: FoundationHandle,
        _scale: TolerancesScale,
    ) -> Option<PhysicsHandle> {
        None
    }

    fn release_physics(&self, _physics: PhysicsHandle) {}

    fn release_foundation(&self, _foundation: FoundationHandle) {}

    fn create_scene(&self, _physics: PhysicsHandle, _desc: &SceneDesc) -> Option<SceneHandle> {
        None
    }

    fn release_scene(&self, _scene: SceneHandle) {}

    fn simulate(&self, _scene: SceneHandle, _dt: f32) {}

    fn fetch_results(&self, _scene: SceneHandle, _block: bool) -> bool {
        false
    }

    fn create_material(
        &self,
        _physics: PhysicsHandle,
        _static_friction: f32,
        _dynamic_friction: f32,
        _restitution: f32,
    ) -> Option<MaterialHandle> {
        None
    }

    fn release_material(&self, _material: MaterialHandle) {}

    fn create_box_geometry(&self, _half_extents: Vec3) -> Option<GeometryHandle> {
        None
    }

    fn create_sphere_geometry(&self, _radius: f32) -> Option<GeometryHandle> {
        None
    }

    fn release_geometry(&self, _geometry: GeometryHandle) {}

    fn create_rigid_dynamic(&self, _physics: PhysicsHandle, _pose: Pose) -> Option<ActorHandle> {
        None
    }

    fn create_rigid_static(&self, _physics: PhysicsHandle, _pose: Pose) -> Option<ActorHandle> {
        None
    }

    fn release_actor(&self, _actor: ActorHandle) {}

    fn create_shape(
        &self,
        _actor: ActorHandle,
        _geometry: GeometryHandle,
        _material: MaterialHandle,
        _relative_pose: Pose,
    ) -> Option<ShapeHandle> {
        None
    }

    fn scene_add_actor(&self, _scene: SceneHandle, _actor: ActorHandle) {}

    fn scene_remove_actor(
        &self,
        _scene: SceneHandle,
        _actor: ActorHandle,
        _wake_on_lost_touch: bool,
    ) {
    }

    fn set_global_pose(&self, _actor: ActorHandle, _pose: Pose) {}

    fn global_pose(&self, _actor: ActorHandle) -> Pose {
        Pose::IDENTITY
    }

    fn create_height_field(
        &self,
        _physics: PhysicsHandle,
        _desc: &HeightFieldDesc,
    ) -> Option<HeightFieldHandle> {
        None
    }

    fn create_height_field_geometry(
        &self,
        _height_field: HeightFieldHandle,
        _height_scale: f32,
        _row_scale: f32,
        _column_scale: f32,
    ) -> Option<GeometryHandle> {
        None
    }

    fn release_height_field(&self, _height_field: HeightFieldHandle) {}

    fn create_controller_manager(
        &self,
        _scene: SceneHandle,
        _locking_enabled: bool,
    ) -> Option<ControllerManagerHandle> {
        None
    }

    fn release_controller_manager(&self, _manager: ControllerManagerHandle) {}

    fn create_controller(
        &self,
        _manager: ControllerManagerHandle,
        _desc: &CapsuleControllerDesc,
    ) -> Option<ControllerHandle> {
        None
    }

    fn controller_move(
        &self,
        _controller: ControllerHandle,
        _displacement: Vec3,
        _min_distance: f32,
        _dt: f32,
    ) {
    }

    fn controller_position(&self, _controller: ControllerHandle) -> Vec3 {
        Vec3::ZERO
    }

    fn set_controller_position(&self, _controller: ControllerHandle, _position: Vec3) {}

    fn release_controller(&self, _controller: ControllerHandle) {}
}
