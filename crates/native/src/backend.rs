use crate::desc::{CapsuleControllerDesc, HeightFieldDesc, SceneDesc, TolerancesScale};
use crate::handle::{
    ActorHandle, ControllerHandle, ControllerManagerHandle, FoundationHandle, GeometryHandle,
    HeightFieldHandle, MaterialHandle, PhysicsHandle, SceneHandle, ShapeHandle,
};
use glam::Vec3;
use physbridge_common::Pose;

/// The complete foreign surface of the native rigid-body engine.
///
/// Every creation call may fail and reports failure as `None`; the engine
/// exposes no richer error channel. Release calls accept a handle the caller
/// owns and must be issued exactly once per created handle — callers track
/// ownership (see [`crate::handle::HandleCell`]); the trait itself cannot
/// detect a double release.
///
/// Implementations must be callable from multiple threads; the adapter's own
/// locking never spans a call through this trait.
pub trait PhysicsBackend: Send + Sync {
    // Engine-level singletons.
    fn create_foundation(&self) -> Option<FoundationHandle>;
    fn create_physics(
        &self,
        foundation: FoundationHandle,
        scale: TolerancesScale,
    ) -> Option<PhysicsHandle>;
    fn release_physics(&self, physics: PhysicsHandle);
    fn release_foundation(&self, foundation: FoundationHandle);

    // Scene lifecycle and stepping.
    fn create_scene(&self, physics: PhysicsHandle, desc: &SceneDesc) -> Option<SceneHandle>;
    fn release_scene(&self, scene: SceneHandle);
    /// Kick one simulation step. Synchronous from the adapter's perspective.
    fn simulate(&self, scene: SceneHandle, dt: f32);
    /// Collect step results; with `block` the call waits for completion.
    /// Returns false when the step failed inside the engine.
    fn fetch_results(&self, scene: SceneHandle, block: bool) -> bool;

    // Materials.
    fn create_material(
        &self,
        physics: PhysicsHandle,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> Option<MaterialHandle>;
    fn release_material(&self, material: MaterialHandle);

    // Geometry primitives.
    fn create_box_geometry(&self, half_extents: Vec3) -> Option<GeometryHandle>;
    fn create_sphere_geometry(&self, radius: f32) -> Option<GeometryHandle>;
    fn release_geometry(&self, geometry: GeometryHandle);

    // Rigid actors.
    fn create_rigid_dynamic(&self, physics: PhysicsHandle, pose: Pose) -> Option<ActorHandle>;
    fn create_rigid_static(&self, physics: PhysicsHandle, pose: Pose) -> Option<ActorHandle>;
    fn release_actor(&self, actor: ActorHandle);

    /// Attach a shape built from `geometry` and `material` to `actor`.
    ///
    /// On success the actor takes ownership of the geometry and the returned
    /// shape; both are released with the actor. On failure the caller still
    /// owns the geometry. The material stays caller-owned either way.
    fn create_shape(
        &self,
        actor: ActorHandle,
        geometry: GeometryHandle,
        material: MaterialHandle,
        relative_pose: Pose,
    ) -> Option<ShapeHandle>;

    fn scene_add_actor(&self, scene: SceneHandle, actor: ActorHandle);
    fn scene_remove_actor(&self, scene: SceneHandle, actor: ActorHandle, wake_on_lost_touch: bool);
    fn set_global_pose(&self, actor: ActorHandle, pose: Pose);
    fn global_pose(&self, actor: ActorHandle) -> Pose;

    // Height-fields.
    fn create_height_field(
        &self,
        physics: PhysicsHandle,
        desc: &HeightFieldDesc,
    ) -> Option<HeightFieldHandle>;
    fn create_height_field_geometry(
        &self,
        height_field: HeightFieldHandle,
        height_scale: f32,
        row_scale: f32,
        column_scale: f32,
    ) -> Option<GeometryHandle>;
    fn release_height_field(&self, height_field: HeightFieldHandle);

    // Character controllers.
    fn create_controller_manager(
        &self,
        scene: SceneHandle,
        locking_enabled: bool,
    ) -> Option<ControllerManagerHandle>;
    fn release_controller_manager(&self, manager: ControllerManagerHandle);
    fn create_controller(
        &self,
        manager: ControllerManagerHandle,
        desc: &CapsuleControllerDesc,
    ) -> Option<ControllerHandle>;
    fn controller_move(
        &self,
        controller: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        dt: f32,
    );
    fn controller_position(&self, controller: ControllerHandle) -> Vec3;
    fn set_controller_position(&self, controller: ControllerHandle, position: Vec3);
    fn release_controller(&self, controller: ControllerHandle);
}
