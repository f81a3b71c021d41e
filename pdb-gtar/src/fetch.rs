use flate2::read::MultiGzDecoder;
use log::{debug, info};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use thiserror::Error;

pub const RCSB_DOWNLOAD_URL: &str = "https://files.rcsb.org/download";

/// The file we get from the PDB for a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The deposited structure as a PDBML document.
    Pdbml,
    /// The first biological assembly as a gzipped legacy PDB file.
    Assembly,
}

impl SourceKind {
    pub fn from_take_assembly(take_assembly: bool) -> Self {
        if take_assembly {
            Self::Assembly
        } else {
            Self::Pdbml
        }
    }

    pub fn file_name(&self, name: &str) -> String {
        match self {
            Self::Pdbml => format!("{name}.xml"),
            Self::Assembly => format!("{name}.pdb1.gz"),
        }
    }

    pub fn url(&self, name: &str) -> String {
        format!("{RCSB_DOWNLOAD_URL}/{}", self.file_name(name))
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Cannot run the download command: {0}")]
    CannotRun(io::Error),
    #[error("Download of {0} failed ({1}).")]
    Failed(String, ExitStatus),
    #[error("Cannot prepare the download: {0}")]
    IOError(#[from] io::Error),
}

/// Something that can copy a remote file to a local path.
pub trait Fetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError>;
}

/// Download files by running `wget`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WgetFetcher;

impl Fetcher for WgetFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        info!("Downloading {url}");
        let status = Command::new("wget")
            .arg(url)
            .arg("-O")
            .arg(destination)
            .status()
            .map_err(FetchError::CannotRun)?;
        if !status.success() {
            return Err(FetchError::Failed(url.to_owned(), status));
        }
        Ok(())
    }
}

/// Fetch `url` to `destination` unless a cached copy can be used.
///
/// The cached copy is used when `use_cache` is true and `destination`
/// already exists. The download goes to a `.part` sibling that is renamed
/// once the fetcher succeeds, so a failed download never ends up in the
/// cache.
pub fn fetch_cached<F>(
    fetcher: &F,
    url: &str,
    destination: &Path,
    use_cache: bool,
) -> Result<(), FetchError>
where
    F: Fetcher + ?Sized,
{
    if use_cache && destination.exists() {
        debug!("Using cached file {}", destination.display());
        return Ok(());
    }
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let partial = partial_path(destination);
    if let Err(error) = fetcher.fetch(url, &partial) {
        std::fs::remove_file(&partial).ok();
        return Err(error);
    }
    std::fs::rename(&partial, destination)?;
    Ok(())
}

fn partial_path(destination: &Path) -> PathBuf {
    let mut partial = destination.as_os_str().to_owned();
    partial.push(".part");
    PathBuf::from(partial)
}

/// Decompress a gzipped file next to itself, without the `.gz` suffix.
///
/// All the gzip members of the file are decompressed, one after the other.
/// The compressed file is kept and an existing decompressed file is
/// overwritten. Returns the path of the decompressed file.
pub fn decompress_gzip(path: &Path) -> io::Result<PathBuf> {
    if path.extension().map_or(true, |extension| extension != "gz") {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not have a .gz extension", path.display()),
        ));
    }
    let target = path.with_extension("");
    debug!("Decompressing {} to {}", path.display(), target.display());
    let mut decoder = MultiGzDecoder::new(BufReader::new(File::open(path)?));
    let mut output = BufWriter::new(File::create(&target)?);
    io::copy(&mut decoder, &mut output)?;
    output.flush()?;
    Ok(target)
}
