pub type Position = [f64; 3];

pub mod elements;
pub mod errors;
pub mod pdb;
pub mod pdbml;
pub mod record;
pub mod structure;

pub use pdb::read_pdb;
pub use pdbml::read_pdbml;
pub use structure::ParsedStructure;
