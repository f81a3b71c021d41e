use thiserror::Error;

use crate::parsers::Position;

/// Box lengths along x, y, and z followed by the three tilt factors.
pub type SimulationBox = [f64; 6];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GeometryError {
    #[error("No atom was read; there is nothing to center or to put in a box.")]
    EmptyStructure,
}

/// Component-wise mean of the positions, or None if there are none.
pub fn centroid(positions: &[Position]) -> Option<Position> {
    if positions.is_empty() {
        return None;
    }
    let sum = positions.iter().fold([0.0; 3], |sum, position| {
        [sum[0] + position[0], sum[1] + position[1], sum[2] + position[2]]
    });
    let count = positions.len() as f64;
    Some(sum.map(|component| component / count))
}

/// Translate the positions so their centroid is at the origin and return the
/// box that contains them.
///
/// Each box length is twice the extent of the centered positions along that
/// axis. The tilt factors are always 0.
pub fn normalize(positions: &mut [Position]) -> Result<SimulationBox, GeometryError> {
    let center = centroid(positions).ok_or(GeometryError::EmptyStructure)?;
    let mut lowest = [f64::INFINITY; 3];
    let mut highest = [f64::NEG_INFINITY; 3];
    for position in positions.iter_mut() {
        for dimension in 0..3 {
            position[dimension] -= center[dimension];
            lowest[dimension] = lowest[dimension].min(position[dimension]);
            highest[dimension] = highest[dimension].max(position[dimension]);
        }
    }
    Ok([
        2.0 * (highest[0] - lowest[0]),
        2.0 * (highest[1] - lowest[1]),
        2.0 * (highest[2] - lowest[2]),
        0.0,
        0.0,
        0.0,
    ])
}
