use crate::parsers::Position;

/// The fields kept from one atom of a structure file.
#[derive(Debug, PartialEq, Clone)]
pub struct AtomRecord {
    /// Cartesian coordinates, in angstroms, as written in the file.
    pub position: Position,
    pub element_symbol: String,
    /// Index of the element in the order the elements were first met.
    pub type_index: usize,
    /// What the color is computed from; depends on the color mode.
    pub color_index: isize,
}
