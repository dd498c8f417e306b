use physbridge_common::sync::lock;
use std::sync::Mutex;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw engine value; zero is the engine's null and maps
            /// to `None`.
            pub fn from_raw(raw: u64) -> Option<Self> {
                (raw != 0).then_some(Self(raw))
            }

            /// Raw value for the foreign call sites.
            pub fn raw(self) -> u64 {
                self.0
            }
        }
    };
}

define_handle!(
    /// The engine-level foundation singleton.
    FoundationHandle
);
define_handle!(
    /// The physics-instance singleton created on top of the foundation.
    PhysicsHandle
);
define_handle!(
    /// One native simulation scene.
    SceneHandle
);
define_handle!(
    /// A rigid actor (static or dynamic) living in a scene.
    ActorHandle
);
define_handle!(
    /// A collision shape attached to an actor.
    ShapeHandle
);
define_handle!(
    /// A surface material (friction/restitution).
    MaterialHandle
);
define_handle!(
    /// A geometry primitive (box, sphere, height-field wrapper).
    GeometryHandle
);
define_handle!(
    /// A cooked height-field resource.
    HeightFieldHandle
);
define_handle!(
    /// A capsule character controller.
    ControllerHandle
);
define_handle!(
    /// The per-scene controller manager.
    ControllerManagerHandle
);

/// Single-owner slot for a native handle.
///
/// Owners keep their handle in a cell and `take()` it at release time; the
/// slot empties, so every later release attempt (double dispose, dispose
/// after remove, drop after explicit close) observes `None` and becomes a
/// checked no-op instead of a double free across the foreign boundary.
#[derive(Debug, Default)]
pub struct HandleCell<T: Copy> {
    slot: Mutex<Option<T>>,
}

impl<T: Copy> HandleCell<T> {
    pub fn new(value: Option<T>) -> Self {
        Self {
            slot: Mutex::new(value),
        }
    }

    pub fn empty() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Current handle, if still owned.
    pub fn get(&self) -> Option<T> {
        *lock(&self.slot)
    }

    /// Take ownership out of the cell; at most one caller ever gets `Some`.
    pub fn take(&self) -> Option<T> {
        lock(&self.slot).take()
    }

    /// Install a handle, returning any displaced one.
    pub fn set(&self, value: T) -> Option<T> {
        lock(&self.slot).replace(value)
    }

    pub fn is_live(&self) -> bool {
        lock(&self.slot).is_some()
    }
}
