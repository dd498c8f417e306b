use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Engine selection and scene knobs.
///
/// The host parses its own configuration sources and hands the result here;
/// the adapter only inspects the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Engine selector; the adapter activates only when this names it.
    pub physics: String,
    /// Scene gravity vector, Z-up.
    pub gravity: Vec3,
    /// Continuous collision detection flag for scene creation.
    pub enable_ccd: bool,
    /// Solver stabilization flag for scene creation.
    pub enable_stabilization: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            physics: String::new(),
            gravity: Vec3::new(0.0, 0.0, -9.81),
            enable_ccd: true,
            enable_stabilization: true,
        }
    }
}

impl PhysicsConfig {
    /// A config with this adapter preselected.
    pub fn selecting_bridge() -> Self {
        Self {
            physics: crate::ENGINE_NAME.to_owned(),
            ..Self::default()
        }
    }
}
