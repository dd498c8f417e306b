use glam::Vec3;

/// Tolerance scales handed to physics-instance creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TolerancesScale {
    pub length: f32,
    pub speed: f32,
}

impl Default for TolerancesScale {
    fn default() -> Self {
        Self {
            length: 1.0,
            speed: 10.0,
        }
    }
}

/// Descriptor for native scene creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneDesc {
    pub gravity: Vec3,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
    pub enable_ccd: bool,
    pub enable_stabilization: bool,
}

/// One quantized height-field sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightFieldSample {
    pub height: i16,
    pub material_index: u8,
    pub tess_flag: u8,
}

impl HeightFieldSample {
    pub fn new(height: i16) -> Self {
        Self {
            height,
            material_index: 0,
            tess_flag: 0,
        }
    }
}

/// Descriptor for height-field cooking.
///
/// Samples are laid out row-major: index `row * columns + column`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightFieldDesc {
    pub rows: u32,
    pub columns: u32,
    pub samples: Vec<HeightFieldSample>,
    pub convex_edge_threshold: f32,
}

/// Descriptor for capsule character-controller creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleControllerDesc {
    pub position: Vec3,
    pub up_direction: Vec3,
    pub height: f32,
    pub radius: f32,
    pub step_offset: f32,
    pub slope_limit: f32,
    pub contact_offset: f32,
    pub density: f32,
    pub scale_coeff: f32,
    pub volume_growth: f32,
}

impl Default for CapsuleControllerDesc {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            up_direction: Vec3::Z,
            height: 1.8,
            radius: 0.25,
            step_offset: 0.5,
            slope_limit: 0.707,
            contact_offset: 0.1,
            density: 10.0,
            scale_coeff: 0.8,
            volume_growth: 1.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controller_defaults_match_engine_expectations() {
        let d = CapsuleControllerDesc::default();
        assert_eq!(d.step_offset, 0.5);
        assert_eq!(d.up_direction, Vec3::Z);
        assert_eq!(d.slope_limit, 0.707);
        assert_eq!(d.contact_offset, 0.1);
    }

    #[test]
    fn height_field_sample_defaults() {
        let s = HeightFieldSample::new(-12);
        assert_eq!(s.height, -12);
        assert_eq!(s.material_index, 0);
        assert_eq!(s.tess_flag, 0);
    }
}
