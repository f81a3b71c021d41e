/// Radius, in angstroms, used for any element missing from the table.
pub const DEFAULT_RADIUS: f64 = 1.0;

const ATOMIC_RADII: [(&str, f64); 4] = [("C", 1.7), ("N", 1.55), ("O", 1.52), ("S", 1.8)];

/// Van der Waals-like radius of an element, in angstroms.
///
/// The symbol is matched case-sensitively and is expected to be trimmed
/// already. Unknown symbols get [`DEFAULT_RADIUS`].
///
/// ```
/// assert_eq!(components::radius("C"), 1.7);
/// assert_eq!(components::radius("Fe"), 1.0);
/// ```
pub fn radius(symbol: &str) -> f64 {
    ATOMIC_RADII
        .iter()
        .find(|(element, _)| *element == symbol)
        .map(|(_, radius)| *radius)
        .unwrap_or(DEFAULT_RADIUS)
}

/// Diameter of the particle drawn for an element; twice its radius.
pub fn diameter(symbol: &str) -> f64 {
    2.0 * radius(symbol)
}
