use log::info;

use crate::color::{ColorAssigner, CubeEllipse, Rgba};
use crate::frame::Frame;
use crate::geometry::{normalize, GeometryError};
use crate::parsers::elements::ElementTypes;
use crate::parsers::record::AtomRecord;
use crate::parsers::Position;

/// Per-particle arrays read from a structure file, before normalization.
///
/// All the vectors are index-aligned: item `i` of each of them describes the
/// same particle.
#[derive(Debug, Default)]
pub struct ParsedStructure {
    pub positions: Vec<Position>,
    pub colors: Vec<Rgba>,
    pub diameters: Vec<f64>,
    pub type_indices: Vec<usize>,
    pub element_types: ElementTypes,
}

impl ParsedStructure {
    pub fn from_records(atoms: Vec<AtomRecord>, element_types: ElementTypes) -> Self {
        let assigner = ColorAssigner::<CubeEllipse>::default();
        let mut structure = ParsedStructure {
            element_types,
            ..Default::default()
        };
        for atom in atoms {
            // One color per particle, computed through the batch path.
            structure
                .colors
                .extend(assigner.colors(&[atom.color_index]));
            structure
                .diameters
                .push(components::diameter(&atom.element_symbol));
            structure.positions.push(atom.position);
            structure.type_indices.push(atom.type_index);
        }
        structure
    }

    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    /// Center the particles on their centroid and compute the box around them.
    pub fn normalize(self) -> Result<Frame, GeometryError> {
        let mut positions = self.positions;
        let simulation_box = normalize(&mut positions)?;
        info!("Found {} particles", positions.len());
        info!("Found types: {:?}", self.element_types.sorted_symbols());
        Ok(Frame {
            positions,
            colors: self.colors,
            diameters: self.diameters,
            type_indices: self.type_indices,
            simulation_box,
        })
    }
}
