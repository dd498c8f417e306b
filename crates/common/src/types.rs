use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Stable identifier the world scene assigns to an object or agent.
///
/// The simulator owns the numbering; the bridge only keys on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position + orientation pair, Z-up world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Cross-section profile of a prim shape descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileShape {
    Circle,
    Square,
    Triangle,
    HalfCircle,
}

/// Extrusion path of a prim shape descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathCurve {
    Line,
    Circle,
    Flexible,
}

/// Abstract prim shape description supplied by the world scene.
///
/// The bridge deliberately maps this onto a sphere/box approximation; the
/// descriptor carries more detail than the approximation consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimShape {
    pub profile: ProfileShape,
    pub path: PathCurve,
}

impl Default for PrimShape {
    fn default() -> Self {
        Self {
            profile: ProfileShape::Square,
            path: PathCurve::Line,
        }
    }
}

/// Minimal pose-change notification raised to the owning world scene.
///
/// Updates are emitted only when a body's displacement crosses the sync
/// epsilon, so the stream stays sparse regardless of tick rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TerseUpdate {
    /// A rigid body moved; carries the full fresh pose.
    Body {
        id: ObjectId,
        position: Vec3,
        rotation: Quat,
    },
    /// An avatar's controller moved; controllers have no orientation.
    Avatar { id: ObjectId, position: Vec3 },
}

impl TerseUpdate {
    /// Object the update refers to.
    pub fn id(&self) -> ObjectId {
        match self {
            TerseUpdate::Body { id, .. } | TerseUpdate::Avatar { id, .. } => *id,
        }
    }
}
