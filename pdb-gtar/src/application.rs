extern crate clap;

use clap::Parser;
use log::info;
use std::path::PathBuf;
use thiserror::Error;

use crate::color::ColorMode;
use crate::fetch::{Fetcher, SourceKind};
use crate::trajectory::{Conversion, ConversionError, Emitted};

/// Download a structure from the Protein Data Bank and write it as a
/// single frame GTAR trajectory.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Name of the structure in the PDB (i.e. 4hhb).
    #[clap(value_parser)]
    pub name: String,
    /// Download the structure even if a copy is already in the cache.
    #[clap(long, value_parser, default_value_t = false)]
    pub disable_cache: bool,
    /// What to color the particles by: sequence, element, or unit.
    #[clap(long, value_parser, default_value_t = ColorMode::Sequence)]
    pub color_mode: ColorMode,
    /// Use the first biological assembly instead of the deposited structure.
    #[clap(long, value_parser, default_value_t = false)]
    pub take_assembly: bool,
    /// Keep the heteroatoms of the residues with this name. Can be repeated.
    #[clap(long = "hetatm-keys", value_parser)]
    pub hetatm_keys: Vec<String>,
    /// Where to store the downloaded files. Defaults to the temporary directory.
    #[clap(long, value_parser)]
    pub cache_dir: Option<PathBuf>,
    /// Path of the archive to write. Defaults to NAME.zip.
    #[clap(short, long, value_parser)]
    pub output: Option<PathBuf>,
    /// Display more information about what the software does.
    #[clap(short, long, value_parser, default_value_t = false)]
    pub verbose: bool,
    /// Be very verbose about what the software does.
    #[clap(short, long, value_parser, default_value_t = false)]
    pub trace: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Cli {
            name: String::new(),
            disable_cache: false,
            color_mode: ColorMode::Sequence,
            take_assembly: false,
            hetatm_keys: Vec::new(),
            cache_dir: None,
            output: None,
            verbose: false,
            trace: false,
        }
    }
}

impl Cli {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.zip", self.name)))
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Cannot convert the structure: {0}")]
    Conversion(#[from] ConversionError),
}

pub fn main_to_wrap<F>(cli: Cli, fetcher: &F) -> Result<Emitted, AppError>
where
    F: Fetcher + ?Sized,
{
    let source_kind = SourceKind::from_take_assembly(cli.take_assembly);
    let output = cli.output_path();
    let cache_directory = cli.cache_dir.clone().unwrap_or_else(std::env::temp_dir);
    info!("Converting {} ({:?}, colored by {})", cli.name, source_kind, cli.color_mode);

    let emitted = Conversion::new(&cli.name, source_kind, cli.color_mode)?
        .with_hetatm_keys(cli.hetatm_keys)
        .with_cache(cache_directory, !cli.disable_cache)
        .run(fetcher, &output)?;
    Ok(emitted)
}
