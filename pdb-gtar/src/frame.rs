use pack_gtar::{ArchiveError, GtarWriter};
use std::io::{Seek, Write};

use crate::color::Rgba;
use crate::geometry::SimulationBox;
use crate::parsers::Position;

pub const POSITION_PATH: &str = "position.f32.ind";
pub const DIAMETER_PATH: &str = "diameter.f32.ind";
pub const COLOR_PATH: &str = "color.f32.ind";
pub const TYPE_PATH: &str = "type.u32.ind";
pub const BOX_PATH: &str = "box.f32.uni";

/// A centered structure, ready to be written as a trajectory frame.
#[derive(Debug)]
pub struct Frame {
    pub positions: Vec<Position>,
    pub colors: Vec<Rgba>,
    pub diameters: Vec<f64>,
    pub type_indices: Vec<usize>,
    pub simulation_box: SimulationBox,
}

impl Frame {
    pub fn particle_count(&self) -> usize {
        self.positions.len()
    }

    /// Write the frame records. Values are stored as single precision.
    ///
    /// The type record is all zeros: the element type indices are not
    /// exported.
    pub fn write_gtar<W>(&self, writer: &mut GtarWriter<W>) -> Result<(), ArchiveError>
    where
        W: Write + Seek,
    {
        let positions: Vec<[f32; 3]> = self
            .positions
            .iter()
            .map(|position| position.map(|component| component as f32))
            .collect();
        let diameters: Vec<f32> = self.diameters.iter().map(|&d| d as f32).collect();
        let colors: Vec<[f32; 4]> = self
            .colors
            .iter()
            .map(|color| color.map(|component| component as f32))
            .collect();
        let types = vec![0_u32; self.particle_count()];
        let simulation_box = self.simulation_box.map(|value| value as f32);

        writer.write_path(POSITION_PATH, &positions)?;
        writer.write_path(DIAMETER_PATH, &diameters)?;
        writer.write_path(COLOR_PATH, &colors)?;
        writer.write_path(TYPE_PATH, &types)?;
        writer.write_path(BOX_PATH, &simulation_box)?;
        Ok(())
    }
}
