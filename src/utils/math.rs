use glam::{Mat4, Vec3, Vec4};

/// A point in 3D space. Homogeneous coordinates stay inside [`AffineTransform`].
pub type Point3 = Vec3;

/// Translate × scale transform of a scene object.
///
/// Backed by a 4×4 matrix; callers only ever see 3-component points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    matrix: Mat4,
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    pub fn identity() -> Self {
        Self { matrix: Mat4::IDENTITY }
    }

    /// Builds `translate(translation) * scale(scale)`, the order the scene layer uses.
    pub fn from_translation_scale(translation: Vec3, scale: Vec3) -> Self {
        Self {
            matrix: Mat4::from_translation(translation) * Mat4::from_scale(scale),
        }
    }

    /// Transforms a point (w = 1), so translation applies.
    pub fn transform_point(&self, point: Point3) -> Point3 {
        let p: Vec4 = self.matrix * point.extend(1.0);
        p.truncate()
    }
}

/// Parse a vector from "[1.0, 2.0, 3.0]" or "1,2,3".
pub fn parse_vec3(value: &str) -> Result<Vec3, String> {
    let cleaned = value.trim().trim_start_matches('[').trim_end_matches(']');

    let coords: Result<Vec<f32>, _> = cleaned
        .split(',')
        .map(|s| s.trim().parse::<f32>())
        .collect();

    match coords {
        Ok(coords) if coords.len() == 3 => Ok(Vec3::new(coords[0], coords[1], coords[2])),
        _ => Err(format!("Invalid vector format: {}", value)),
    }
}
