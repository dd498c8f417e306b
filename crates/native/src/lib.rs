//! Foreign interface to the native rigid-body engine.
//!
//! The engine is reachable only through fixed-width opaque handles. This
//! crate gives each handle kind its own type, defines the descriptor structs
//! the engine consumes, and exposes the whole surface as the
//! [`PhysicsBackend`] trait so the adapter never touches a raw pointer.
//!
//! # Invariants
//! - A handle value of zero never escapes as a live handle; creation
//!   failures surface as `None`.
//! - Handles of different kinds are not interchangeable.
//! - [`HandleCell`] release tracking makes a second release a checked no-op.

pub mod backend;
pub mod desc;
#[cfg(feature = "physx")]
pub mod ffi;
pub mod handle;
pub mod null;

pub use backend::PhysicsBackend;
#[cfg(feature = "physx")]
pub use ffi::FfiBackend;
pub use desc::{CapsuleControllerDesc, HeightFieldDesc, HeightFieldSample, SceneDesc, TolerancesScale};
pub use handle::{
    ActorHandle, ControllerHandle, ControllerManagerHandle, FoundationHandle, GeometryHandle,
    HandleCell, HeightFieldHandle, MaterialHandle, PhysicsHandle, SceneHandle, ShapeHandle,
};
pub use null::NullBackend;
