use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type Rgba = [f64; 4];

/// (1 + √5) / 2
pub const GOLDEN_RATIO: f64 = 1.618_033_988_749_895;

/// Angle between the hues of two successive color indices: 2π(1 − 1/φ).
pub const GOLDEN_ANGLE: f64 = 2.0 * PI * (1.0 - 1.0 / GOLDEN_RATIO);

/// What the color of a particle is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// Author residue sequence number.
    #[default]
    Sequence,
    /// Element type, in the order the elements are first met.
    Element,
    /// Chain, counted with TER records. Only the legacy format has them.
    Unit,
}

impl ColorMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Element => "element",
            Self::Unit => "unit",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorMode {
    type Err = ColorModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "sequence" => Ok(Self::Sequence),
            "element" => Ok(Self::Element),
            "unit" => Ok(Self::Unit),
            other => Err(ColorModeError::Unsupported(other.to_owned())),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorModeError {
    #[error("Unsupported color mode '{0}'; expected one of sequence, element, or unit.")]
    Unsupported(String),
    #[error("Unsupported color mode '{0}' for {1} files.")]
    UnsupportedForFormat(ColorMode, &'static str),
}

/// Maps a hue angle to an RGB color with components in [0, 1].
pub trait ColorRamp {
    fn rgb(&self, theta: f64) -> [f64; 3];
}

/// Ellipse through the cubehelix color space at a fixed lightness.
///
/// Because the lightness is fixed, all the colors of the ellipse have the
/// same perceived intensity and only the hue changes with the angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeEllipse {
    /// Amplitude of the hue variation.
    pub h: f64,
    /// Phase of the ellipse, in radians.
    pub s: f64,
    /// Lightness, between 0 and 1.
    pub lam: f64,
    pub gamma: f64,
    /// Number of turns along the ellipse per turn of the input angle.
    pub r: f64,
}

impl Default for CubeEllipse {
    fn default() -> Self {
        Self {
            h: 1.7,
            s: -0.5 * PI / 3.0,
            lam: 0.55,
            gamma: 1.0,
            r: 1.0,
        }
    }
}

impl ColorRamp for CubeEllipse {
    fn rgb(&self, theta: f64) -> [f64; 3] {
        let lightness = self.lam.powf(self.gamma);
        let amplitude = self.h * lightness * (1.0 - lightness) / 2.0;
        let phi = self.s + self.r * theta;
        let (sin, cos) = phi.sin_cos();
        [
            lightness + amplitude * (-0.14861 * cos + 1.78277 * sin),
            lightness + amplitude * (-0.29227 * cos - 0.90649 * sin),
            lightness + amplitude * (1.97294 * cos),
        ]
        .map(|component| component.clamp(0.0, 1.0))
    }
}

/// Hue angle for a color index.
pub fn theta(index: isize) -> f64 {
    index as f64 * GOLDEN_ANGLE
}

/// Turns color indices into opaque colors spread around a color ramp.
#[derive(Debug, Clone, Default)]
pub struct ColorAssigner<R: ColorRamp = CubeEllipse> {
    ramp: R,
}

impl<R: ColorRamp> ColorAssigner<R> {
    pub fn new(ramp: R) -> Self {
        Self { ramp }
    }

    pub fn color(&self, index: isize) -> Rgba {
        let [red, green, blue] = self.ramp.rgb(theta(index));
        [red, green, blue, 1.0]
    }

    pub fn colors(&self, indices: &[isize]) -> Vec<Rgba> {
        indices.iter().map(|&index| self.color(index)).collect()
    }
}
