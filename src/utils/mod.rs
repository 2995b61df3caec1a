pub mod logging;
pub mod math;

pub use math::{parse_vec3, AffineTransform, Point3};
