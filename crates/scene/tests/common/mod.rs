//! Scripted stand-in for the native engine used by the integration suites.
//!
//! Hands out sequential handles, records every foreign call, tracks live and
//! released handles per kind, and can be told to fail any creation op.

#![allow(dead_code)]

use glam::Vec3;
use physbridge_common::Pose;
use physbridge_native::{
    ActorHandle, CapsuleControllerDesc, ControllerHandle, ControllerManagerHandle,
    FoundationHandle, GeometryHandle, HeightFieldDesc, HeightFieldHandle, MaterialHandle,
    PhysicsBackend, PhysicsHandle, SceneDesc, SceneHandle, ShapeHandle, TolerancesScale,
};
use physbridge_scene::{PhysicsConfig, RegionInfo, SceneWorld};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::{Arc, Mutex};

/// Operations the backend can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailOp {
    Foundation,
    Physics,
    Scene,
    Material,
    Geometry,
    Actor,
    Shape,
    HeightField,
    HeightFieldGeometry,
    ControllerManager,
    Controller,
    FetchResults,
}

/// Height-field descriptor as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedHeightField {
    pub rows: u32,
    pub columns: u32,
    pub heights: Vec<i16>,
}

#[derive(Default)]
struct State {
    next_raw: u64,
    fail: HashSet<FailOp>,
    calls: Vec<&'static str>,
    live: BTreeMap<&'static str, BTreeSet<u64>>,
    released: Vec<(&'static str, u64)>,
    stray_releases: Vec<(&'static str, u64)>,
    actor_poses: BTreeMap<u64, Pose>,
    actor_shapes: BTreeMap<u64, Vec<u64>>,
    controller_positions: BTreeMap<u64, Vec3>,
    scene_actors: BTreeSet<u64>,
    moves: Vec<(u64, Vec3)>,
    last_height_field: Option<RecordedHeightField>,
}

pub struct ScriptedBackend {
    state: Mutex<State>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    pub fn fail_on(&self, op: FailOp) {
        self.state.lock().unwrap().fail.insert(op);
    }

    pub fn clear_fail(&self, op: FailOp) {
        self.state.lock().unwrap().fail.remove(&op);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == name)
            .count()
    }

    pub fn live_count(&self, kind: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .live
            .get(kind)
            .map_or(0, BTreeSet::len)
    }

    pub fn total_live(&self) -> usize {
        self.state.lock().unwrap().live.values().map(BTreeSet::len).sum()
    }

    /// True when every handle ever created has been released again.
    pub fn all_released(&self) -> bool {
        self.total_live() == 0
    }

    pub fn released_count(&self, kind: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .released
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Releases of handles that were not live: double frees or fabrications.
    pub fn stray_release_count(&self) -> usize {
        self.state.lock().unwrap().stray_releases.len()
    }

    pub fn scene_actor_count(&self) -> usize {
        self.state.lock().unwrap().scene_actors.len()
    }

    /// Shift every live actor's pose, as a simulation step would.
    pub fn displace_actors(&self, delta: Vec3) {
        let mut s = self.state.lock().unwrap();
        for pose in s.actor_poses.values_mut() {
            pose.position += delta;
        }
    }

    pub fn moves(&self) -> Vec<(u64, Vec3)> {
        self.state.lock().unwrap().moves.clone()
    }

    pub fn last_move(&self) -> Option<(u64, Vec3)> {
        self.state.lock().unwrap().moves.last().copied()
    }

    pub fn last_height_field(&self) -> Option<RecordedHeightField> {
        self.state.lock().unwrap().last_height_field.clone()
    }

    fn create(&self, kind: &'static str, op: FailOp, call: &'static str) -> Option<u64> {
        let mut s = self.state.lock().unwrap();
        s.calls.push(call);
        if s.fail.contains(&op) {
            return None;
        }
        s.next_raw += 1;
        let raw = s.next_raw;
        s.live.entry(kind).or_default().insert(raw);
        Some(raw)
    }

    fn release(&self, kind: &'static str, raw: u64, call: &'static str) {
        let mut s = self.state.lock().unwrap();
        s.calls.push(call);
        let was_live = s.live.entry(kind).or_default().remove(&raw);
        if was_live {
            s.released.push((kind, raw));
        } else {
            s.stray_releases.push((kind, raw));
        }
    }
}

impl PhysicsBackend for ScriptedBackend {
    fn create_foundation(&self) -> Option<FoundationHandle> {
        FoundationHandle::from_raw(self.create("foundation", FailOp::Foundation, "create_foundation")?)
    }

    fn create_physics(
        &self,
        _foundation: FoundationHandle,
        _scale: TolerancesScale,
    ) -> Option<PhysicsHandle> {
        PhysicsHandle::from_raw(self.create("physics", FailOp::Physics, "create_physics")?)
    }

    fn release_physics(&self, physics: PhysicsHandle) {
        self.release("physics", physics.raw(), "release_physics");
    }

    fn release_foundation(&self, foundation: FoundationHandle) {
        self.release("foundation", foundation.raw(), "release_foundation");
    }

    fn create_scene(&self, _physics: PhysicsHandle, _desc: &SceneDesc) -> Option<SceneHandle> {
        SceneHandle::from_raw(self.create("scene", FailOp::Scene, "create_scene")?)
    }

    fn release_scene(&self, scene: SceneHandle) {
        self.release("scene", scene.raw(), "release_scene");
    }

    fn simulate(&self, _scene: SceneHandle, _dt: f32) {
        self.state.lock().unwrap().calls.push("simulate");
    }

    fn fetch_results(&self, _scene: SceneHandle, _block: bool) -> bool {
        let mut s = self.state.lock().unwrap();
        s.calls.push("fetch_results");
        !s.fail.contains(&FailOp::FetchResults)
    }

    fn create_material(
        &self,
        _physics: PhysicsHandle,
        _static_friction: f32,
        _dynamic_friction: f32,
        _restitution: f32,
    ) -> Option<MaterialHandle> {
        MaterialHandle::from_raw(self.create("material", FailOp::Material, "create_material")?)
    }

    fn release_material(&self, material: MaterialHandle) {
        self.release("material", material.raw(), "release_material");
    }

    fn create_box_geometry(&self, _half_extents: Vec3) -> Option<GeometryHandle> {
        GeometryHandle::from_raw(self.create("geometry", FailOp::Geometry, "create_box_geometry")?)
    }

    fn create_sphere_geometry(&self, _radius: f32) -> Option<GeometryHandle> {
        GeometryHandle::from_raw(self.create("geometry", FailOp::Geometry, "create_sphere_geometry")?)
    }

    fn release_geometry(&self, geometry: GeometryHandle) {
        self.release("geometry", geometry.raw(), "release_geometry");
    }

    fn create_rigid_dynamic(&self, _physics: PhysicsHandle, pose: Pose) -> Option<ActorHandle> {
        let raw = self.create("actor", FailOp::Actor, "create_rigid_dynamic")?;
        self.state.lock().unwrap().actor_poses.insert(raw, pose);
        ActorHandle::from_raw(raw)
    }

    fn create_rigid_static(&self, _physics: PhysicsHandle, pose: Pose) -> Option<ActorHandle> {
        let raw = self.create("actor", FailOp::Actor, "create_rigid_static")?;
        self.state.lock().unwrap().actor_poses.insert(raw, pose);
        ActorHandle::from_raw(raw)
    }

    fn release_actor(&self, actor: ActorHandle) {
        let attached = {
            let mut s = self.state.lock().unwrap();
            s.actor_poses.remove(&actor.raw());
            s.scene_actors.remove(&actor.raw());
            s.actor_shapes.remove(&actor.raw()).unwrap_or_default()
        };
        // The engine tears down attached shapes with their actor.
        for shape in attached {
            self.release("shape", shape, "release_shape_with_actor");
        }
        self.release("actor", actor.raw(), "release_actor");
    }

    fn create_shape(
        &self,
        actor: ActorHandle,
        geometry: GeometryHandle,
        _material: MaterialHandle,
        _relative_pose: Pose,
    ) -> Option<ShapeHandle> {
        let raw = self.create("shape", FailOp::Shape, "create_shape")?;
        let mut s = self.state.lock().unwrap();
        // The actor takes ownership of the geometry on success.
        let was_live = s.live.entry("geometry").or_default().remove(&geometry.raw());
        if was_live {
            s.released.push(("geometry", geometry.raw()));
        } else {
            s.stray_releases.push(("geometry", geometry.raw()));
        }
        s.actor_shapes.entry(actor.raw()).or_default().push(raw);
        ShapeHandle::from_raw(raw)
    }

    fn scene_add_actor(&self, _scene: SceneHandle, actor: ActorHandle) {
        let mut s = self.state.lock().unwrap();
        s.calls.push("scene_add_actor");
        s.scene_actors.insert(actor.raw());
    }

    fn scene_remove_actor(
        &self,
        _scene: SceneHandle,
        actor: ActorHandle,
        _wake_on_lost_touch: bool,
    ) {
        let mut s = self.state.lock().unwrap();
        s.calls.push("scene_remove_actor");
        s.scene_actors.remove(&actor.raw());
    }

    fn set_global_pose(&self, actor: ActorHandle, pose: Pose) {
        let mut s = self.state.lock().unwrap();
        s.calls.push("set_global_pose");
        s.actor_poses.insert(actor.raw(), pose);
    }

    fn global_pose(&self, actor: ActorHandle) -> Pose {
        let mut s = self.state.lock().unwrap();
        s.calls.push("global_pose");
        s.actor_poses
            .get(&actor.raw())
            .copied()
            .unwrap_or(Pose::IDENTITY)
    }

    fn create_height_field(
        &self,
        _physics: PhysicsHandle,
        desc: &HeightFieldDesc,
    ) -> Option<HeightFieldHandle> {
        {
            let mut s = self.state.lock().unwrap();
            s.last_height_field = Some(RecordedHeightField {
                rows: desc.rows,
                columns: desc.columns,
                heights: desc.samples.iter().map(|s| s.height).collect(),
            });
        }
        HeightFieldHandle::from_raw(self.create(
            "height_field",
            FailOp::HeightField,
            "create_height_field",
        )?)
    }

    fn create_height_field_geometry(
        &self,
        _height_field: HeightFieldHandle,
        _height_scale: f32,
        _row_scale: f32,
        _column_scale: f32,
    ) -> Option<GeometryHandle> {
        GeometryHandle::from_raw(self.create(
            "geometry",
            FailOp::HeightFieldGeometry,
            "create_height_field_geometry",
        )?)
    }

    fn release_height_field(&self, height_field: HeightFieldHandle) {
        self.release("height_field", height_field.raw(), "release_height_field");
    }

    fn create_controller_manager(
        &self,
        _scene: SceneHandle,
        _locking_enabled: bool,
    ) -> Option<ControllerManagerHandle> {
        ControllerManagerHandle::from_raw(self.create(
            "controller_manager",
            FailOp::ControllerManager,
            "create_controller_manager",
        )?)
    }

    fn release_controller_manager(&self, manager: ControllerManagerHandle) {
        self.release("controller_manager", manager.raw(), "release_controller_manager");
    }

    fn create_controller(
        &self,
        _manager: ControllerManagerHandle,
        desc: &CapsuleControllerDesc,
    ) -> Option<ControllerHandle> {
        let raw = self.create("controller", FailOp::Controller, "create_controller")?;
        self.state
            .lock()
            .unwrap()
            .controller_positions
            .insert(raw, desc.position);
        ControllerHandle::from_raw(raw)
    }

    fn controller_move(
        &self,
        controller: ControllerHandle,
        displacement: Vec3,
        _min_distance: f32,
        _dt: f32,
    ) {
        let mut s = self.state.lock().unwrap();
        s.calls.push("controller_move");
        s.moves.push((controller.raw(), displacement));
        if let Some(position) = s.controller_positions.get_mut(&controller.raw()) {
            *position += displacement;
        }
    }

    fn controller_position(&self, controller: ControllerHandle) -> Vec3 {
        let mut s = self.state.lock().unwrap();
        s.calls.push("controller_position");
        s.controller_positions
            .get(&controller.raw())
            .copied()
            .unwrap_or(Vec3::ZERO)
    }

    fn set_controller_position(&self, controller: ControllerHandle, position: Vec3) {
        let mut s = self.state.lock().unwrap();
        s.calls.push("set_controller_position");
        s.controller_positions.insert(controller.raw(), position);
    }

    fn release_controller(&self, controller: ControllerHandle) {
        self.state
            .lock()
            .unwrap()
            .controller_positions
            .remove(&controller.raw());
        self.release("controller", controller.raw(), "release_controller");
    }
}

pub fn world_with(backend: &Arc<ScriptedBackend>) -> SceneWorld {
    SceneWorld::new(Arc::clone(backend) as Arc<dyn PhysicsBackend>)
}

/// A scripted backend plus a world that already selected the adapter.
pub fn scripted() -> (Arc<ScriptedBackend>, SceneWorld) {
    let backend = Arc::new(ScriptedBackend::new());
    let world = world_with(&backend);
    world.initialise(&PhysicsConfig::selecting_bridge());
    (backend, world)
}

/// A square region with no initial terrain.
pub fn bare_region(size: u32) -> RegionInfo {
    RegionInfo {
        name: "test-region".to_owned(),
        size_x: size,
        size_y: size,
        water_height: 20.0,
        heightmap: Vec::new(),
    }
}
