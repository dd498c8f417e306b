use crate::character::AvatarBody;
use crate::config::PhysicsConfig;
use crate::foundation::{Foundation, InitError};
use crate::registry::{ActorRegistry, RigidBody};
use crate::shape::ShapeManager;
use crate::terrain::TerrainEncoder;
use glam::{Quat, Vec3};
use physbridge_common::sync::lock;
use physbridge_common::{ObjectId, Pose, PrimShape, TerseUpdate};
use physbridge_native::{ControllerManagerHandle, HandleCell, PhysicsBackend, SceneDesc, SceneHandle};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Name the host's `physics = <name>` option must match to select this
/// adapter.
pub const ENGINE_NAME: &str = "physbridge";

/// Vertical extent of the simulated region volume.
const REGION_CEILING: f32 = 4096.0;

/// Region parameters the world scene supplies on attach.
#[derive(Debug, Clone)]
pub struct RegionInfo {
    pub name: String,
    pub size_x: u32,
    pub size_y: u32,
    pub water_height: f32,
    /// Row-major initial heightmap; empty when the region starts without
    /// terrain.
    pub heightmap: Vec<f32>,
}

/// Region state retained after attach.
#[derive(Debug, Clone)]
struct RegionState {
    name: String,
    size_x: u32,
    size_y: u32,
    water_height: f32,
}

/// Everything built on a successful engine init. Lives behind an `Arc` so
/// data-plane calls can operate on it without holding the outer slot lock
/// across the foreign boundary.
struct Engine {
    backend: Arc<dyn PhysicsBackend>,
    foundation: Foundation,
    scene: HandleCell<SceneHandle>,
    shapes: ShapeManager,
    registry: ActorRegistry,
    terrain: TerrainEncoder,
    controller_manager: HandleCell<ControllerManagerHandle>,
    avatars: Mutex<BTreeMap<ObjectId, Arc<AvatarBody>>>,
}

impl Engine {
    fn build(
        backend: Arc<dyn PhysicsBackend>,
        config: &PhysicsConfig,
        region: &RegionInfo,
    ) -> Result<Self, InitError> {
        let foundation = Foundation::new(Arc::clone(&backend))?;
        let physics = foundation.physics().ok_or(InitError::Physics)?;

        let desc = SceneDesc {
            gravity: config.gravity,
            bounds_min: Vec3::ZERO,
            bounds_max: Vec3::new(region.size_x as f32, region.size_y as f32, REGION_CEILING),
            enable_ccd: config.enable_ccd,
            enable_stabilization: config.enable_stabilization,
        };
        // Foundation's Drop unwinds the singletons if scene creation fails.
        let scene = backend
            .create_scene(physics, &desc)
            .ok_or(InitError::Scene)?;

        let shapes = ShapeManager::new(Arc::clone(&backend), physics);
        let registry = ActorRegistry::new(Arc::clone(&backend), scene);
        let terrain = TerrainEncoder::new(
            Arc::clone(&backend),
            physics,
            scene,
            shapes.default_material(),
        );
        let controller_manager = backend.create_controller_manager(scene, true);
        if controller_manager.is_none() {
            tracing::warn!("controller manager creation failed; avatars unavailable");
        }

        Ok(Self {
            backend,
            foundation,
            scene: HandleCell::new(Some(scene)),
            shapes,
            registry,
            terrain,
            controller_manager: HandleCell::new(controller_manager),
            avatars: Mutex::new(BTreeMap::new()),
        })
    }

    fn snapshot_avatars(&self) -> Vec<Arc<AvatarBody>> {
        lock(&self.avatars).values().cloned().collect()
    }

    /// Tear everything down: avatars, terrain, registered actors, the shared
    /// material, then controller-manager, scene, and foundation. Idempotent.
    fn dispose(&self) {
        let avatars: Vec<Arc<AvatarBody>> = {
            let mut avatars = lock(&self.avatars);
            std::mem::take(&mut *avatars).into_values().collect()
        };
        for avatar in avatars {
            avatar.release();
        }
        self.terrain.dispose();
        self.registry.dispose();
        self.shapes.dispose();
        if let Some(manager) = self.controller_manager.take() {
            self.backend.release_controller_manager(manager);
        }
        if let Some(scene) = self.scene.take() {
            self.backend.release_scene(scene);
        }
        self.foundation.dispose();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Top-level owner of the adapter: engine lifecycle, managers, and the
/// per-frame simulation step.
///
/// Data-plane methods take `&self` and may be called from any thread;
/// lifecycle transitions (initialise, add_region, close, terrain swaps) are
/// the driving thread's responsibility and must not race `simulate`.
pub struct SceneWorld {
    backend: Arc<dyn PhysicsBackend>,
    enabled: AtomicBool,
    config: Mutex<PhysicsConfig>,
    region: Mutex<Option<RegionState>>,
    engine: Mutex<Option<Arc<Engine>>>,
    updates: Mutex<Vec<TerseUpdate>>,
}

impl SceneWorld {
    pub fn new(backend: Arc<dyn PhysicsBackend>) -> Self {
        Self {
            backend,
            enabled: AtomicBool::new(false),
            config: Mutex::new(PhysicsConfig::default()),
            region: Mutex::new(None),
            engine: Mutex::new(None),
            updates: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        ENGINE_NAME
    }

    /// Whether the host selected this adapter and no fatal init failure has
    /// occurred since.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Whether a native scene is currently live.
    pub fn is_active(&self) -> bool {
        lock(&self.engine).is_some()
    }

    /// Module hook: activates the adapter when the config names it.
    pub fn initialise(&self, config: &PhysicsConfig) {
        if config.physics == ENGINE_NAME {
            self.enabled.store(true, Ordering::SeqCst);
            *lock(&self.config) = config.clone();
            tracing::info!("physics adapter selected");
        }
    }

    /// Module hook: region attach. Builds the native engine stack and, when
    /// the region carries an initial heightmap, installs the first terrain
    /// surface. Failure disables the adapter for the region's lifetime.
    pub fn add_region(&self, region: RegionInfo) {
        if !self.is_enabled() {
            return;
        }
        let config = lock(&self.config).clone();
        match Engine::build(Arc::clone(&self.backend), &config, &region) {
            Ok(engine) => {
                let engine = Arc::new(engine);
                if !region.heightmap.is_empty() {
                    engine
                        .terrain
                        .set_terrain(&region.heightmap, region.size_x, region.size_y);
                }
                *lock(&self.engine) = Some(engine);
                *lock(&self.region) = Some(RegionState {
                    name: region.name.clone(),
                    size_x: region.size_x,
                    size_y: region.size_y,
                    water_height: region.water_height,
                });
                tracing::info!(region = %region.name, "native scene ready");
            }
            Err(err) => {
                tracing::error!(region = %region.name, %err, "physics init failed; adapter disabled");
                self.enabled.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Module hook: nothing to do beyond what `close` covers.
    pub fn remove_region(&self) {}

    /// Module hook: the region finished loading; no deferred work here.
    pub fn region_loaded(&self) {}

    /// Release every native resource. Idempotent; also run on drop.
    pub fn close(&self) {
        let engine = lock(&self.engine).take();
        if let Some(engine) = engine {
            engine.dispose();
            tracing::info!("physics adapter closed");
        }
    }

    fn engine(&self) -> Option<Arc<Engine>> {
        lock(&self.engine).clone()
    }

    /// Create a rigid body for a prim. Returns `None` when the adapter is
    /// disabled or any native creation fails; partial handles are unwound.
    #[allow(clippy::too_many_arguments)]
    pub fn add_prim_shape(
        &self,
        name: &str,
        shape: &PrimShape,
        position: Vec3,
        size: Vec3,
        rotation: Quat,
        is_physical: bool,
        id: ObjectId,
    ) -> Option<Arc<RigidBody>> {
        let engine = self.engine()?;
        let physics = engine.foundation.physics()?;

        let Some(geometry) = engine.shapes.create_geometry(shape, size) else {
            tracing::warn!(%id, name, "prim geometry creation failed");
            return None;
        };
        let Some(material) = engine.shapes.default_material() else {
            self.backend.release_geometry(geometry);
            tracing::warn!(%id, name, "no default material; prim dropped");
            return None;
        };

        let pose = Pose::new(position, rotation);
        let actor = if is_physical {
            self.backend.create_rigid_dynamic(physics, pose)
        } else {
            self.backend.create_rigid_static(physics, pose)
        };
        let Some(actor) = actor else {
            self.backend.release_geometry(geometry);
            tracing::warn!(%id, name, "prim actor creation failed");
            return None;
        };
        if self
            .backend
            .create_shape(actor, geometry, material, Pose::IDENTITY)
            .is_none()
        {
            self.backend.release_geometry(geometry);
            self.backend.release_actor(actor);
            tracing::warn!(%id, name, "prim shape attach failed");
            return None;
        }

        let body = Arc::new(RigidBody::new(
            Arc::clone(&self.backend),
            actor,
            id,
            name,
            pose,
            size,
            is_physical,
        ));
        engine.registry.add(Arc::clone(&body));
        Some(body)
    }

    /// Retire a prim's actor and forget it.
    pub fn remove_prim(&self, body: &Arc<RigidBody>) {
        if let Some(engine) = self.engine() {
            engine.registry.remove(body);
        }
    }

    /// Create an avatar body. Returns `None` when the adapter is disabled or
    /// the controller manager is missing; a failed controller creation still
    /// yields an (inert) avatar.
    pub fn add_avatar(
        &self,
        id: ObjectId,
        name: &str,
        position: Vec3,
        velocity: Vec3,
        size: Vec3,
        flying: bool,
    ) -> Option<Arc<AvatarBody>> {
        let engine = self.engine()?;
        let manager = engine.controller_manager.get()?;

        let avatar = Arc::new(AvatarBody::new(
            Arc::clone(&self.backend),
            manager,
            id,
            name,
            position,
            size,
        ));
        avatar.set_velocity(velocity);
        avatar.set_flying(flying);

        let displaced = lock(&engine.avatars).insert(id, Arc::clone(&avatar));
        if let Some(old) = displaced {
            if !Arc::ptr_eq(&old, &avatar) {
                tracing::warn!(%id, "re-registered avatar id; releasing previous controller");
                old.release();
            }
        }
        Some(avatar)
    }

    /// Release an avatar's controller and forget it.
    pub fn remove_avatar(&self, avatar: &Arc<AvatarBody>) {
        if let Some(engine) = self.engine() {
            let mut avatars = lock(&engine.avatars);
            if avatars
                .get(&avatar.id())
                .is_some_and(|current| Arc::ptr_eq(current, avatar))
            {
                avatars.remove(&avatar.id());
            }
        }
        avatar.release();
    }

    /// Replace the region terrain with a new heightmap, sized to the region
    /// dimensions given at attach.
    pub fn set_terrain(&self, heightmap: &[f32]) {
        let Some(engine) = self.engine() else { return };
        let Some((size_x, size_y)) =
            lock(&self.region).as_ref().map(|r| (r.size_x, r.size_y))
        else {
            return;
        };
        engine.terrain.set_terrain(heightmap, size_x, size_y);
    }

    /// Retire the current terrain surface, if any.
    pub fn delete_terrain(&self) {
        if let Some(engine) = self.engine() {
            engine.terrain.dispose();
        }
    }

    /// Accepted and physically inert for rigid-body-only configurations.
    pub fn set_water_level(&self, height: f32) {
        if let Some(region) = lock(&self.region).as_mut() {
            region.water_height = height;
        }
    }

    /// Current region water height, if a region is attached.
    pub fn water_level(&self) -> Option<f32> {
        lock(&self.region).as_ref().map(|r| r.water_height)
    }

    /// Name of the attached region, if any.
    pub fn region_name(&self) -> Option<String> {
        lock(&self.region).as_ref().map(|r| r.name.clone())
    }

    /// Drive one frame: apply avatar movement intents, step the native
    /// engine, then synchronize rigid-body and avatar poses back out.
    ///
    /// Returns the coarse frame count: 1 for a completed step, 0 when the
    /// adapter is disabled or the step failed.
    pub fn simulate(&self, dt: f32) -> u32 {
        let Some(engine) = self.engine() else { return 0 };
        let Some(scene) = engine.scene.get() else { return 0 };

        let avatars = engine.snapshot_avatars();
        for avatar in &avatars {
            avatar.move_step(dt);
        }

        self.backend.simulate(scene, dt);
        if !self.backend.fetch_results(scene, true) {
            tracing::warn!("fetch-results reported a failed step");
            return 0;
        }

        let mut fresh = Vec::new();
        engine.registry.update_to_world(&mut fresh);
        for avatar in &avatars {
            if let Some(update) = avatar.sync_from_engine() {
                fresh.push(update);
            }
        }
        if !fresh.is_empty() {
            lock(&self.updates).extend(fresh);
        }
        1
    }

    /// Drain the terse pose updates accumulated by `simulate`.
    pub fn drain_updates(&self) -> Vec<TerseUpdate> {
        std::mem::take(&mut *lock(&self.updates))
    }
}

impl Drop for SceneWorld {
    fn drop(&mut self) {
        self.close();
    }
}
