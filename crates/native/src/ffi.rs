//! Raw `extern "C"` binding against the native engine library.
//!
//! Compiled only with the `physx` feature; linking then requires the engine
//! library on the library path. Struct layouts mirror the engine's C ABI.

use crate::backend::PhysicsBackend;
use crate::desc::{CapsuleControllerDesc, HeightFieldDesc, SceneDesc, TolerancesScale};
use crate::handle::{
    ActorHandle, ControllerHandle, ControllerManagerHandle, FoundationHandle, GeometryHandle,
    HeightFieldHandle, MaterialHandle, PhysicsHandle, SceneHandle, ShapeHandle,
};
use glam::{Quat, Vec3};
use physbridge_common::Pose;
use std::ffi::c_void;

/// Engine ABI version constant handed to foundation/physics creation.
const ENGINE_VERSION: u32 = 0x4040_0000;

const FLAG_ENABLE_CCD: u32 = 1 << 2;
const FLAG_ENABLE_STABILIZATION: u32 = 1 << 4;

/// 16-bit signed height-field sample format tag.
const HEIGHT_FIELD_FORMAT_S16: i32 = 1;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct PxVec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl From<Vec3> for PxVec3 {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<PxVec3> for Vec3 {
    fn from(v: PxVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct PxQuat {
    x: f32,
    y: f32,
    z: f32,
    w: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct PxTransform {
    p: PxVec3,
    q: PxQuat,
}

impl From<Pose> for PxTransform {
    fn from(pose: Pose) -> Self {
        Self {
            p: pose.position.into(),
            q: PxQuat {
                x: pose.rotation.x,
                y: pose.rotation.y,
                z: pose.rotation.z,
                w: pose.rotation.w,
            },
        }
    }
}

impl From<PxTransform> for Pose {
    fn from(t: PxTransform) -> Self {
        Pose::new(
            t.p.into(),
            Quat::from_xyzw(t.q.x, t.q.y, t.q.z, t.q.w),
        )
    }
}

#[repr(C)]
struct PxTolerancesScale {
    length: f32,
    speed: f32,
}

#[repr(C)]
struct PxSceneDesc {
    gravity: PxVec3,
    bounds_min: PxVec3,
    bounds_max: PxVec3,
    cpu_dispatcher: *mut c_void,
    filter_shader: *mut c_void,
    flags: u32,
}

#[repr(C)]
struct PxHeightFieldSample {
    height: i16,
    material_index0: u8,
    tess_flag: u8,
}

#[repr(C)]
struct PxHeightFieldDesc {
    nb_rows: u32,
    nb_columns: u32,
    format: i32,
    samples: *const PxHeightFieldSample,
    convex_edge_threshold: f32,
    flags: u32,
}

#[repr(C)]
struct PxCapsuleControllerDesc {
    position: PxVec3,
    up_direction: PxVec3,
    slope_limit: f32,
    invisible_wall_height: f32,
    max_jump_height: f32,
    contact_offset: f32,
    step_offset: f32,
    density: f32,
    scale_coeff: f32,
    volume_growth: f32,
    report_callback: *mut c_void,
    behavior_callback: *mut c_void,
    radius: f32,
    height: f32,
    climbing_mode: *mut c_void,
    material: *mut c_void,
}

#[link(name = "PhysX_64")]
unsafe extern "C" {
    fn PxCreateFoundation(
        version: u32,
        allocator: *mut c_void,
        error_callback: *mut c_void,
    ) -> *mut c_void;
    fn PxCreatePhysics(
        version: u32,
        foundation: *mut c_void,
        scale: *const PxTolerancesScale,
        track_outstanding_allocations: bool,
    ) -> *mut c_void;
    fn PxPhysicsRelease(physics: *mut c_void);
    fn PxFoundationRelease(foundation: *mut c_void);

    fn PxPhysicsCreateScene(physics: *mut c_void, desc: *const PxSceneDesc) -> *mut c_void;
    fn PxSceneRelease(scene: *mut c_void);
    fn PxSceneSimulate(
        scene: *mut c_void,
        time_step: f32,
        scratch_mem_block: *mut c_void,
        scratch_mem_block_size: u32,
        control_simulation: bool,
    );
    fn PxSceneFetchResults(scene: *mut c_void, block: bool, error_state: *mut c_void) -> bool;

    fn PxPhysicsCreateMaterial(
        physics: *mut c_void,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> *mut c_void;
    fn PxMaterialRelease(material: *mut c_void);

    fn PxCreateBoxGeometry(hx: f32, hy: f32, hz: f32) -> *mut c_void;
    fn PxCreateSphereGeometry(radius: f32) -> *mut c_void;
    fn PxGeometryRelease(geometry: *mut c_void);

    fn PxPhysicsCreateRigidDynamic(
        physics: *mut c_void,
        transform: *const PxTransform,
    ) -> *mut c_void;
    fn PxPhysicsCreateRigidStatic(
        physics: *mut c_void,
        transform: *const PxTransform,
    ) -> *mut c_void;
    fn PxActorRelease(actor: *mut c_void);

    fn PxRigidActorCreateShape(
        actor: *mut c_void,
        geometry: *mut c_void,
        material: *mut c_void,
        relative_pose: *const PxTransform,
    ) -> *mut c_void;

    fn PxSceneAddActor(scene: *mut c_void, actor: *mut c_void);
    fn PxSceneRemoveActor(scene: *mut c_void, actor: *mut c_void, wake_on_lost_touch: bool);
    fn PxRigidActorSetGlobalPose(actor: *mut c_void, transform: *const PxTransform);
    fn PxRigidActorGetGlobalPose(actor: *mut c_void) -> PxTransform;

    fn PxPhysicsCreateHeightField(
        physics: *mut c_void,
        desc: *const PxHeightFieldDesc,
    ) -> *mut c_void;
    fn PxCreateHeightFieldGeometry(
        height_field: *mut c_void,
        mesh_flags: *mut c_void,
        height_scale: f32,
        row_scale: f32,
        column_scale: f32,
    ) -> *mut c_void;
    fn PxHeightFieldRelease(height_field: *mut c_void);

    fn PxCreateControllerManager(scene: *mut c_void, locking_enabled: bool) -> *mut c_void;
    fn PxControllerManagerRelease(manager: *mut c_void);
    fn PxControllerManagerCreateController(
        manager: *mut c_void,
        desc: *const PxCapsuleControllerDesc,
    ) -> *mut c_void;
    fn PxControllerMove(
        controller: *mut c_void,
        displacement: *const PxVec3,
        min_distance: f32,
        elapsed_time: f32,
        filters: *mut c_void,
        obstacles: *mut c_void,
    );
    fn PxControllerGetPosition(controller: *mut c_void) -> PxVec3;
    fn PxControllerSetPosition(controller: *mut c_void, position: *const PxVec3);
    fn PxControllerRelease(controller: *mut c_void);
}

fn as_ptr(raw: u64) -> *mut c_void {
    raw as usize as *mut c_void
}

fn as_raw(ptr: *mut c_void) -> u64 {
    ptr as usize as u64
}

/// Backend bound directly to the native engine library.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfiBackend;

impl FfiBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PhysicsBackend for FfiBackend {
    fn create_foundation(&self) -> Option<FoundationHandle> {
        let raw = unsafe {
            as_raw(PxCreateFoundation(
                ENGINE_VERSION,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            ))
        };
        FoundationHandle::from_raw(raw)
    }

    fn create_physics(
        &self,
        foundation: FoundationHandle,
        scale: TolerancesScale,
    ) -> Option<PhysicsHandle> {
        let scale = PxTolerancesScale {
            length: scale.length,
            speed: scale.speed,
        };
        let raw = unsafe {
            as_raw(PxCreatePhysics(
                ENGINE_VERSION,
                as_ptr(foundation.raw()),
                &scale,
                false,
            ))
        };
        PhysicsHandle::from_raw(raw)
    }

    fn release_physics(&self, physics: PhysicsHandle) {
        unsafe { PxPhysicsRelease(as_ptr(physics.raw())) }
    }

    fn release_foundation(&self, foundation: FoundationHandle) {
        unsafe { PxFoundationRelease(as_ptr(foundation.raw())) }
    }

    fn create_scene(&self, physics: PhysicsHandle, desc: &SceneDesc) -> Option<SceneHandle> {
        let mut flags = 0;
        if desc.enable_ccd {
            flags |= FLAG_ENABLE_CCD;
        }
        if desc.enable_stabilization {
            flags |= FLAG_ENABLE_STABILIZATION;
        }
        let desc = PxSceneDesc {
            gravity: desc.gravity.into(),
            bounds_min: desc.bounds_min.into(),
            bounds_max: desc.bounds_max.into(),
            cpu_dispatcher: std::ptr::null_mut(),
            filter_shader: std::ptr::null_mut(),
            flags,
        };
        let raw = unsafe { as_raw(PxPhysicsCreateScene(as_ptr(physics.raw()), &desc)) };
        SceneHandle::from_raw(raw)
    }

    fn release_scene(&self, scene: SceneHandle) {
        unsafe { PxSceneRelease(as_ptr(scene.raw())) }
    }

    fn simulate(&self, scene: SceneHandle, dt: f32) {
        unsafe { PxSceneSimulate(as_ptr(scene.raw()), dt, std::ptr::null_mut(), 0, true) }
    }

    fn fetch_results(&self, scene: SceneHandle, block: bool) -> bool {
        unsafe { PxSceneFetchResults(as_ptr(scene.raw()), block, std::ptr::null_mut()) }
    }

    fn create_material(
        &self,
        physics: PhysicsHandle,
        static_friction: f32,
        dynamic_friction: f32,
        restitution: f32,
    ) -> Option<MaterialHandle> {
        let raw = unsafe {
            as_raw(PxPhysicsCreateMaterial(
                as_ptr(physics.raw()),
                static_friction,
                dynamic_friction,
                restitution,
            ))
        };
        MaterialHandle::from_raw(raw)
    }

    fn release_material(&self, material: MaterialHandle) {
        unsafe { PxMaterialRelease(as_ptr(material.raw())) }
    }

    fn create_box_geometry(&self, half_extents: Vec3) -> Option<GeometryHandle> {
        let raw = unsafe {
            as_raw(PxCreateBoxGeometry(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            ))
        };
        GeometryHandle::from_raw(raw)
    }

    fn create_sphere_geometry(&self, radius: f32) -> Option<GeometryHandle> {
        let raw = unsafe { as_raw(PxCreateSphereGeometry(radius)) };
        GeometryHandle::from_raw(raw)
    }

    fn release_geometry(&self, geometry: GeometryHandle) {
        unsafe { PxGeometryRelease(as_ptr(geometry.raw())) }
    }

    fn create_rigid_dynamic(&self, physics: PhysicsHandle, pose: Pose) -> Option<ActorHandle> {
        let transform = PxTransform::from(pose);
        let raw = unsafe { as_raw(PxPhysicsCreateRigidDynamic(as_ptr(physics.raw()), &transform)) };
        ActorHandle::from_raw(raw)
    }

    fn create_rigid_static(&self, physics: PhysicsHandle, pose: Pose) -> Option<ActorHandle> {
        let transform = PxTransform::from(pose);
        let raw = unsafe { as_raw(PxPhysicsCreateRigidStatic(as_ptr(physics.raw()), &transform)) };
        ActorHandle::from_raw(raw)
    }

    fn release_actor(&self, actor: ActorHandle) {
        unsafe { PxActorRelease(as_ptr(actor.raw())) }
    }

    fn create_shape(
        &self,
        actor: ActorHandle,
        geometry: GeometryHandle,
        material: MaterialHandle,
        relative_pose: Pose,
    ) -> Option<ShapeHandle> {
        let transform = PxTransform::from(relative_pose);
        let raw = unsafe {
            as_raw(PxRigidActorCreateShape(
                as_ptr(actor.raw()),
                as_ptr(geometry.raw()),
                as_ptr(material.raw()),
                &transform,
            ))
        };
        ShapeHandle::from_raw(raw)
    }

    fn scene_add_actor(&self, scene: SceneHandle, actor: ActorHandle) {
        unsafe { PxSceneAddActor(as_ptr(scene.raw()), as_ptr(actor.raw())) }
    }

    fn scene_remove_actor(&self, scene: SceneHandle, actor: ActorHandle, wake_on_lost_touch: bool) {
        unsafe {
            PxSceneRemoveActor(
                as_ptr(scene.raw()),
                as_ptr(actor.raw()),
                wake_on_lost_touch,
            )
        }
    }

    fn set_global_pose(&self, actor: ActorHandle, pose: Pose) {
        let transform = PxTransform::from(pose);
        unsafe { PxRigidActorSetGlobalPose(as_ptr(actor.raw()), &transform) }
    }

    fn global_pose(&self, actor: ActorHandle) -> Pose {
        unsafe { PxRigidActorGetGlobalPose(as_ptr(actor.raw())) }.into()
    }

    fn create_height_field(
        &self,
        physics: PhysicsHandle,
        desc: &HeightFieldDesc,
    ) -> Option<HeightFieldHandle> {
        let samples: Vec<PxHeightFieldSample> = desc
            .samples
            .iter()
            .map(|s| PxHeightFieldSample {
                height: s.height,
                material_index0: s.material_index,
                tess_flag: s.tess_flag,
            })
            .collect();
        let desc = PxHeightFieldDesc {
            nb_rows: desc.rows,
            nb_columns: desc.columns,
            format: HEIGHT_FIELD_FORMAT_S16,
            samples: samples.as_ptr(),
            convex_edge_threshold: desc.convex_edge_threshold,
            flags: 0,
        };
        // `samples` must outlive the call; the engine copies during cooking.
        let raw = unsafe { as_raw(PxPhysicsCreateHeightField(as_ptr(physics.raw()), &desc)) };
        HeightFieldHandle::from_raw(raw)
    }

    fn create_height_field_geometry(
        &self,
        height_field: HeightFieldHandle,
        height_scale: f32,
        row_scale: f32,
        column_scale: f32,
    ) -> Option<GeometryHandle> {
        let raw = unsafe {
            as_raw(PxCreateHeightFieldGeometry(
                as_ptr(height_field.raw()),
                std::ptr::null_mut(),
                height_scale,
                row_scale,
                column_scale,
            ))
        };
        GeometryHandle::from_raw(raw)
    }

    fn release_height_field(&self, height_field: HeightFieldHandle) {
        unsafe { PxHeightFieldRelease(as_ptr(height_field.raw())) }
    }

    fn create_controller_manager(
        &self,
        scene: SceneHandle,
        locking_enabled: bool,
    ) -> Option<ControllerManagerHandle> {
        let raw = unsafe { as_raw(PxCreateControllerManager(as_ptr(scene.raw()), locking_enabled)) };
        ControllerManagerHandle::from_raw(raw)
    }

    fn release_controller_manager(&self, manager: ControllerManagerHandle) {
        unsafe { PxControllerManagerRelease(as_ptr(manager.raw())) }
    }

    fn create_controller(
        &self,
        manager: ControllerManagerHandle,
        desc: &CapsuleControllerDesc,
    ) -> Option<ControllerHandle> {
        let desc = PxCapsuleControllerDesc {
            position: desc.position.into(),
            up_direction: desc.up_direction.into(),
            slope_limit: desc.slope_limit,
            invisible_wall_height: 0.0,
            max_jump_height: 0.0,
            contact_offset: desc.contact_offset,
            step_offset: desc.step_offset,
            density: desc.density,
            scale_coeff: desc.scale_coeff,
            volume_growth: desc.volume_growth,
            report_callback: std::ptr::null_mut(),
            behavior_callback: std::ptr::null_mut(),
            radius: desc.radius,
            height: desc.height,
            climbing_mode: std::ptr::null_mut(),
            material: std::ptr::null_mut(),
        };
        let raw = unsafe { as_raw(PxControllerManagerCreateController(as_ptr(manager.raw()), &desc)) };
        ControllerHandle::from_raw(raw)
    }

    fn controller_move(
        &self,
        controller: ControllerHandle,
        displacement: Vec3,
        min_distance: f32,
        dt: f32,
    ) {
        let displacement = PxVec3::from(displacement);
        unsafe {
            PxControllerMove(
                as_ptr(controller.raw()),
                &displacement,
                min_distance,
                dt,
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        }
    }

    fn controller_position(&self, controller: ControllerHandle) -> Vec3 {
        unsafe { PxControllerGetPosition(as_ptr(controller.raw())) }.into()
    }

    fn set_controller_position(&self, controller: ControllerHandle, position: Vec3) {
        let position = PxVec3::from(position);
        unsafe { PxControllerSetPosition(as_ptr(controller.raw()), &position) }
    }

    fn release_controller(&self, controller: ControllerHandle) {
        unsafe { PxControllerRelease(as_ptr(controller.raw())) }
    }
}
