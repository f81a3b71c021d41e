#[macro_use]
extern crate assert_float_eq;

use std::cell::Cell;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use pack_gtar::{GtarReader, UnPack};
use tempfile::TempDir;

use pdb_gtar::application::{main_to_wrap, AppError, Cli};
use pdb_gtar::color::{ColorMode, ColorModeError};
use pdb_gtar::fetch::{FetchError, Fetcher};
use pdb_gtar::frame::{BOX_PATH, COLOR_PATH, DIAMETER_PATH, POSITION_PATH, TYPE_PATH};
use pdb_gtar::geometry::GeometryError;
use pdb_gtar::test_ressource;
use pdb_gtar::trajectory::ConversionError;

use test_log::test;

/// Serves a local file instead of downloading one.
///
/// The file is gzipped on the fly when a gzipped file is requested.
struct LocalFetcher {
    source: PathBuf,
    calls: Cell<usize>,
}

impl LocalFetcher {
    fn new(source: &str) -> Self {
        Self {
            source: PathBuf::from(source),
            calls: Cell::new(0),
        }
    }
}

impl Fetcher for LocalFetcher {
    fn fetch(&self, url: &str, destination: &Path) -> Result<(), FetchError> {
        info!("Serving {} for {url}", self.source.display());
        self.calls.set(self.calls.get() + 1);
        if url.ends_with(".gz") {
            let mut input = File::open(&self.source)?;
            let mut encoder = GzEncoder::new(File::create(destination)?, Compression::default());
            io::copy(&mut input, &mut encoder)?;
            encoder.finish()?;
        } else {
            std::fs::copy(&self.source, destination)?;
        }
        Ok(())
    }
}

struct Workspace {
    directory: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            directory: tempfile::tempdir().unwrap(),
        }
    }

    fn cli(&self, name: &str) -> Cli {
        Cli {
            name: name.to_owned(),
            cache_dir: Some(self.directory.path().join("cache")),
            output: Some(self.output()),
            ..Default::default()
        }
    }

    fn output(&self) -> PathBuf {
        self.directory.path().join("output.zip")
    }

    fn reader(&self) -> GtarReader<File> {
        GtarReader::open(self.output()).unwrap()
    }
}

#[test]
fn test_two_atoms_from_pdbml() {
    let workspace = Workspace::new();
    let fetcher = LocalFetcher::new(test_ressource!("two_atoms.xml"));
    let emitted = main_to_wrap(workspace.cli("twoa"), &fetcher).unwrap();
    assert_eq!(emitted.particle_count, 2);
    assert_eq!(emitted.path, workspace.output());

    let mut reader = workspace.reader();
    assert_eq!(
        reader.paths(),
        vec![BOX_PATH, COLOR_PATH, DIAMETER_PATH, POSITION_PATH, TYPE_PATH]
    );

    let positions: Vec<[f32; 3]> = (&reader.read_path(POSITION_PATH).unwrap())
        .unpack()
        .unwrap();
    assert_eq!(positions, vec![[-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);

    let diameters: Vec<f32> = (&reader.read_path(DIAMETER_PATH).unwrap())
        .unpack()
        .unwrap();
    assert_f32_near!(diameters[0], 3.4);
    assert_f32_near!(diameters[1], 3.1);

    let colors: Vec<[f32; 4]> = (&reader.read_path(COLOR_PATH).unwrap())
        .unpack()
        .unwrap();
    assert_eq!(colors.len(), 2);
    assert_ne!(colors[0], colors[1]);
    assert!(colors.iter().all(|color| color[3] == 1.0));

    let types: Vec<u32> = (&reader.read_path(TYPE_PATH).unwrap()).unpack().unwrap();
    assert_eq!(types, vec![0, 0]);

    let simulation_box: Vec<f32> = (&reader.read_path(BOX_PATH).unwrap()).unpack().unwrap();
    assert_eq!(simulation_box, vec![4.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn test_assembly_colored_by_unit() {
    let workspace = Workspace::new();
    let fetcher = LocalFetcher::new(test_ressource!("two_chains.pdb"));
    let cli = Cli {
        take_assembly: true,
        color_mode: ColorMode::Unit,
        ..workspace.cli("tchn")
    };
    let emitted = main_to_wrap(cli, &fetcher).unwrap();
    assert_eq!(emitted.particle_count, 8);

    let mut reader = workspace.reader();
    let colors: Vec<[f32; 4]> = (&reader.read_path(COLOR_PATH).unwrap())
        .unpack()
        .unwrap();
    assert_eq!(colors.len(), 8);
    // The first chain has five atoms, the second has three.
    assert!(colors[..5].iter().all(|color| *color == colors[0]));
    assert!(colors[5..].iter().all(|color| *color == colors[5]));
    assert_ne!(colors[0], colors[5]);

    let positions: Vec<[f32; 3]> = (&reader.read_path(POSITION_PATH).unwrap())
        .unpack()
        .unwrap();
    for axis in 0..3 {
        let sum: f32 = positions.iter().map(|position| position[axis]).sum();
        assert!(sum.abs() < 1e-4);
    }
}

#[test]
fn test_assembly_keeps_requested_heteroatoms() {
    let workspace = Workspace::new();
    let fetcher = LocalFetcher::new(test_ressource!("two_chains.pdb"));
    let cli = Cli {
        take_assembly: true,
        hetatm_keys: vec!["HOH".to_owned()],
        ..workspace.cli("tchn")
    };
    let emitted = main_to_wrap(cli, &fetcher).unwrap();
    assert_eq!(emitted.particle_count, 9);
}

#[test]
fn test_cached_download_is_reused() {
    let workspace = Workspace::new();
    let fetcher = LocalFetcher::new(test_ressource!("two_atoms.xml"));
    main_to_wrap(workspace.cli("twoa"), &fetcher).unwrap();
    main_to_wrap(workspace.cli("twoa"), &fetcher).unwrap();
    assert_eq!(fetcher.calls.get(), 1);

    let cli = Cli {
        disable_cache: true,
        ..workspace.cli("twoa")
    };
    main_to_wrap(cli, &fetcher).unwrap();
    assert_eq!(fetcher.calls.get(), 2);
}

#[test]
fn test_empty_structure_writes_nothing() {
    let workspace = Workspace::new();
    let fetcher = LocalFetcher::new(test_ressource!("empty.xml"));
    let error = main_to_wrap(workspace.cli("empt"), &fetcher).unwrap_err();
    assert!(matches!(
        error,
        AppError::Conversion(ConversionError::Geometry(GeometryError::EmptyStructure))
    ));
    assert!(!workspace.output().exists());
}

#[test]
fn test_unit_colors_refused_before_download() {
    let workspace = Workspace::new();
    let fetcher = LocalFetcher::new(test_ressource!("two_atoms.xml"));
    let cli = Cli {
        color_mode: ColorMode::Unit,
        ..workspace.cli("twoa")
    };
    let error = main_to_wrap(cli, &fetcher).unwrap_err();
    assert!(matches!(
        error,
        AppError::Conversion(ConversionError::ColorMode(
            ColorModeError::UnsupportedForFormat(ColorMode::Unit, _)
        ))
    ));
    assert_eq!(fetcher.calls.get(), 0);
    assert!(!workspace.output().exists());
}

#[test]
fn test_failed_download_is_fetched_again() {
    struct BrokenFetcher;
    impl Fetcher for BrokenFetcher {
        fn fetch(&self, _url: &str, destination: &Path) -> Result<(), FetchError> {
            // Like wget, leave an empty file behind.
            File::create(destination)?;
            Err(FetchError::IOError(io::Error::new(
                io::ErrorKind::NotFound,
                "no such structure",
            )))
        }
    }

    let workspace = Workspace::new();
    let error = main_to_wrap(workspace.cli("twoa"), &BrokenFetcher).unwrap_err();
    assert!(matches!(
        error,
        AppError::Conversion(ConversionError::Fetch(_))
    ));
    assert!(!workspace.output().exists());

    let fetcher = LocalFetcher::new(test_ressource!("two_atoms.xml"));
    let emitted = main_to_wrap(workspace.cli("twoa"), &fetcher).unwrap();
    assert_eq!(fetcher.calls.get(), 1);
    assert_eq!(emitted.particle_count, 2);
}
