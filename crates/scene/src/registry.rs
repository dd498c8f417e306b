use crate::POSE_EPSILON_SQ;
use glam::Vec3;
use physbridge_common::sync::lock;
use physbridge_common::{ObjectId, Pose, TerseUpdate};
use physbridge_native::{ActorHandle, HandleCell, PhysicsBackend, SceneHandle};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// A simulated rigid object, 1:1 with a native actor for its lifetime.
///
/// Shared between the host (which reads and writes poses) and the registry
/// (which syncs poses back after each step). The actor handle lives in a
/// release-once cell, so a body outliving its removal degrades to no-ops.
pub struct RigidBody {
    id: ObjectId,
    name: String,
    is_physical: bool,
    size: Vec3,
    backend: Arc<dyn PhysicsBackend>,
    actor: HandleCell<ActorHandle>,
    pose: Mutex<Pose>,
}

impl RigidBody {
    pub(crate) fn new(
        backend: Arc<dyn PhysicsBackend>,
        actor: ActorHandle,
        id: ObjectId,
        name: &str,
        pose: Pose,
        size: Vec3,
        is_physical: bool,
    ) -> Self {
        Self {
            id,
            name: name.to_owned(),
            is_physical,
            size,
            backend,
            actor: HandleCell::new(Some(actor)),
            pose: Mutex::new(pose),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_physical(&self) -> bool {
        self.is_physical
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Last synchronized pose.
    pub fn pose(&self) -> Pose {
        *lock(&self.pose)
    }

    /// Write a new pose through to the native actor.
    pub fn set_pose(&self, pose: Pose) {
        *lock(&self.pose) = pose;
        if let Some(actor) = self.actor.get() {
            self.backend.set_global_pose(actor, pose);
        }
    }

    pub(crate) fn actor(&self) -> Option<ActorHandle> {
        self.actor.get()
    }

    pub(crate) fn take_actor(&self) -> Option<ActorHandle> {
        self.actor.take()
    }

    /// Pull the fresh engine pose, updating the cache and emitting an update
    /// only when squared displacement crosses the sync epsilon.
    pub(crate) fn sync_from_engine(&self) -> Option<TerseUpdate> {
        let actor = self.actor.get()?;
        let fresh = self.backend.global_pose(actor);
        let mut pose = lock(&self.pose);
        if (fresh.position - pose.position).length_squared() >= POSE_EPSILON_SQ {
            *pose = fresh;
            Some(TerseUpdate::Body {
                id: self.id,
                position: fresh.position,
                rotation: fresh.rotation,
            })
        } else {
            None
        }
    }
}

/// Tracks object id → rigid body and synchronizes poses each tick.
///
/// The map lock guards only map mutation; every call across the foreign
/// interface happens outside it. Iteration works on a snapshot so adds and
/// removes from other threads never race the sync loop.
pub struct ActorRegistry {
    backend: Arc<dyn PhysicsBackend>,
    scene: SceneHandle,
    actors: Mutex<BTreeMap<ObjectId, Arc<RigidBody>>>,
}

impl ActorRegistry {
    pub fn new(backend: Arc<dyn PhysicsBackend>, scene: SceneHandle) -> Self {
        Self {
            backend,
            scene,
            actors: Mutex::new(BTreeMap::new()),
        }
    }

    /// Register the body's actor with the native scene, then insert it.
    ///
    /// Re-adding an id is last-write-wins: the displaced body is retired so
    /// exactly one native actor stays live for the id.
    pub fn add(&self, body: Arc<RigidBody>) {
        let Some(actor) = body.actor() else { return };
        self.backend.scene_add_actor(self.scene, actor);
        let displaced = lock(&self.actors).insert(body.id(), Arc::clone(&body));
        if let Some(old) = displaced {
            if !Arc::ptr_eq(&old, &body) {
                tracing::warn!(id = %body.id(), "re-registered body id; retiring previous actor");
                self.retire(&old, true);
            }
        }
    }

    /// Remove the actor from the native scene and release it, then drop the
    /// map entry (only if it still refers to this body).
    pub fn remove(&self, body: &Arc<RigidBody>) {
        self.retire(body, true);
        let mut actors = lock(&self.actors);
        if actors
            .get(&body.id())
            .is_some_and(|current| Arc::ptr_eq(current, body))
        {
            actors.remove(&body.id());
        }
    }

    fn retire(&self, body: &RigidBody, wake_on_lost_touch: bool) {
        if let Some(actor) = body.take_actor() {
            self.backend
                .scene_remove_actor(self.scene, actor, wake_on_lost_touch);
            self.backend.release_actor(actor);
        }
    }

    /// Post-step pose sync. Only physical bodies move; each emits at most
    /// one terse update per step.
    pub fn update_to_world(&self, updates: &mut Vec<TerseUpdate>) {
        let snapshot: Vec<Arc<RigidBody>> = lock(&self.actors).values().cloned().collect();
        for body in snapshot {
            if !body.is_physical() {
                continue;
            }
            if let Some(update) = body.sync_from_engine() {
                updates.push(update);
            }
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.actors).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.actors).is_empty()
    }

    /// Retire every remaining body. Idempotent.
    pub fn dispose(&self) {
        let drained: Vec<Arc<RigidBody>> = {
            let mut actors = lock(&self.actors);
            std::mem::take(&mut *actors).into_values().collect()
        };
        for body in drained {
            self.retire(&body, false);
        }
    }
}
