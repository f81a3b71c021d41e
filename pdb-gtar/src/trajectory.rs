use log::{debug, info, warn};
use pack_gtar::{ArchiveError, GtarWriter};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::color::{ColorMode, ColorModeError};
use crate::fetch::{decompress_gzip, fetch_cached, FetchError, Fetcher, SourceKind};
use crate::frame::Frame;
use crate::geometry::GeometryError;
use crate::parsers::errors::ReadError;
use crate::parsers::{read_pdb, read_pdbml, ParsedStructure};

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("'{0}' is not a valid structure name.")]
    InvalidName(String),
    #[error("{0}")]
    ColorMode(#[from] ColorModeError),
    #[error("Cannot fetch the structure: {0}")]
    Fetch(#[from] FetchError),
    #[error("Cannot decompress {0}: {1}")]
    Decompress(PathBuf, io::Error),
    #[error("Cannot open {0}: {1}")]
    CannotOpen(PathBuf, io::Error),
    #[error("Cannot read {0}: {1}")]
    Read(PathBuf, ReadError),
    #[error("{0}")]
    Geometry(#[from] GeometryError),
    #[error("Cannot write the archive {0}: {1}")]
    Archive(PathBuf, ArchiveError),
}

/// Everything needed to turn one PDB entry into a trajectory archive.
///
/// The conversion goes through [`Conversion::fetch`], [`Fetched::parse`],
/// [`Parsed::normalize`], and [`Normalized::emit`], in that order. Each step
/// consumes the previous state, so a failure at any step leaves nothing to
/// emit.
#[derive(Debug, Clone)]
pub struct Conversion {
    name: String,
    source_kind: SourceKind,
    color_mode: ColorMode,
    hetatm_keys: HashSet<String>,
    cache_directory: PathBuf,
    use_cache: bool,
}

impl Conversion {
    pub fn new(
        name: &str,
        source_kind: SourceKind,
        color_mode: ColorMode,
    ) -> Result<Self, ConversionError> {
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(ConversionError::InvalidName(name.to_owned()));
        }
        if source_kind == SourceKind::Pdbml && color_mode == ColorMode::Unit {
            return Err(ColorModeError::UnsupportedForFormat(color_mode, "PDBML").into());
        }
        Ok(Self {
            name: name.to_owned(),
            source_kind,
            color_mode,
            hetatm_keys: HashSet::new(),
            cache_directory: std::env::temp_dir(),
            use_cache: true,
        })
    }

    /// Residue names of the HETATM records to keep from legacy files.
    pub fn with_hetatm_keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.hetatm_keys = keys.into_iter().map(|key| key.trim().to_owned()).collect();
        if self.source_kind == SourceKind::Pdbml && !self.hetatm_keys.is_empty() {
            warn!("HETATM keys are only used with the assembly; they are ignored.");
        }
        self
    }

    pub fn with_cache(mut self, directory: PathBuf, use_cache: bool) -> Self {
        self.cache_directory = directory;
        self.use_cache = use_cache;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    /// Where the downloaded file is stored.
    pub fn local_path(&self) -> PathBuf {
        self.cache_directory
            .join(self.source_kind.file_name(&self.name))
    }

    pub fn fetch<F>(self, fetcher: &F) -> Result<Fetched, ConversionError>
    where
        F: Fetcher + ?Sized,
    {
        let url = self.source_kind.url(&self.name);
        let path = self.local_path();
        fetch_cached(fetcher, &url, &path, self.use_cache)?;
        Ok(Fetched {
            conversion: self,
            path,
        })
    }

    /// Run all the steps and write the archive at `output`.
    pub fn run<F>(self, fetcher: &F, output: &Path) -> Result<Emitted, ConversionError>
    where
        F: Fetcher + ?Sized,
    {
        self.fetch(fetcher)?.parse()?.normalize()?.emit(output)
    }
}

/// The structure file is available locally.
#[derive(Debug)]
pub struct Fetched {
    conversion: Conversion,
    path: PathBuf,
}

impl Fetched {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse(self) -> Result<Parsed, ConversionError> {
        let conversion = self.conversion;
        let structure = match conversion.source_kind {
            SourceKind::Pdbml => {
                let input = open(&self.path)?;
                read_pdbml(input, conversion.color_mode)
                    .map_err(|e| ConversionError::Read(self.path.clone(), e))?
            }
            SourceKind::Assembly => {
                let path = decompress_gzip(&self.path)
                    .map_err(|e| ConversionError::Decompress(self.path.clone(), e))?;
                let input = open(&path)?;
                read_pdb(input, conversion.color_mode, &conversion.hetatm_keys)
                    .map_err(|e| ConversionError::Read(path.clone(), e))?
            }
        };
        debug!("Read {} atoms from {}", structure.atom_count(), self.path.display());
        Ok(Parsed { structure })
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ConversionError> {
    let file = File::open(path).map_err(|e| ConversionError::CannotOpen(path.to_owned(), e))?;
    Ok(BufReader::new(file))
}

/// The atoms are read, but not centered yet.
#[derive(Debug)]
pub struct Parsed {
    structure: ParsedStructure,
}

impl Parsed {
    pub fn structure(&self) -> &ParsedStructure {
        &self.structure
    }

    pub fn normalize(self) -> Result<Normalized, ConversionError> {
        let frame = self.structure.normalize()?;
        Ok(Normalized { frame })
    }
}

/// The frame is centered and boxed, ready to be written.
#[derive(Debug)]
pub struct Normalized {
    frame: Frame,
}

impl Normalized {
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Write the archive.
    ///
    /// The archive is first written next to `output` and only moved in place
    /// once complete, so a failure never leaves a truncated archive at
    /// `output`.
    pub fn emit(self, output: &Path) -> Result<Emitted, ConversionError> {
        let mut partial = output.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);
        let archive_error = |e: ArchiveError| ConversionError::Archive(output.to_owned(), e);

        let written = write_archive(&self.frame, &partial)
            .and_then(|_| std::fs::rename(&partial, output).map_err(ArchiveError::from));
        if let Err(error) = written {
            std::fs::remove_file(&partial).ok();
            return Err(archive_error(error));
        }

        info!("Wrote {}", output.display());
        Ok(Emitted {
            path: output.to_owned(),
            particle_count: self.frame.particle_count(),
        })
    }
}

fn write_archive(frame: &Frame, path: &Path) -> Result<(), ArchiveError> {
    let mut writer = GtarWriter::create(path)?;
    frame.write_gtar(&mut writer)?;
    writer.finish()?;
    Ok(())
}

/// The archive is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub path: PathBuf,
    pub particle_count: usize,
}
