use physbridge_native::{
    FoundationHandle, HandleCell, PhysicsBackend, PhysicsHandle, TolerancesScale,
};
use std::sync::Arc;

/// Errors from native engine initialization.
///
/// These never cross the host boundary; they are logged and collapse into
/// the adapter's disabled state.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("native foundation creation returned null")]
    Foundation,
    #[error("native physics instance creation returned null")]
    Physics,
    #[error("native scene creation returned null")]
    Scene,
}

/// Owner of the two engine-level singleton handles.
///
/// Construction either yields both handles or nothing: a null physics
/// instance releases the already-created foundation before failing, so no
/// partial state survives.
pub struct Foundation {
    backend: Arc<dyn PhysicsBackend>,
    foundation: HandleCell<FoundationHandle>,
    physics: HandleCell<PhysicsHandle>,
}

impl Foundation {
    pub fn new(backend: Arc<dyn PhysicsBackend>) -> Result<Self, InitError> {
        let foundation = backend.create_foundation().ok_or(InitError::Foundation)?;
        let physics = match backend.create_physics(foundation, TolerancesScale::default()) {
            Some(physics) => physics,
            None => {
                backend.release_foundation(foundation);
                return Err(InitError::Physics);
            }
        };
        Ok(Self {
            backend,
            foundation: HandleCell::new(Some(foundation)),
            physics: HandleCell::new(Some(physics)),
        })
    }

    /// The physics-instance handle, while not yet disposed.
    pub fn physics(&self) -> Option<PhysicsHandle> {
        self.physics.get()
    }

    /// Release the physics instance, then the foundation (reverse creation
    /// order). Idempotent.
    pub fn dispose(&self) {
        if let Some(physics) = self.physics.take() {
            self.backend.release_physics(physics);
        }
        if let Some(foundation) = self.foundation.take() {
            self.backend.release_foundation(foundation);
        }
    }
}

impl Drop for Foundation {
    fn drop(&mut self) {
        self.dispose();
    }
}
