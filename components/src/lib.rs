mod atomic_radii;

pub use atomic_radii::{diameter, radius, DEFAULT_RADIUS};
