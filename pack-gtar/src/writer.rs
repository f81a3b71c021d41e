use log::trace;
use std::fs::File;
use std::io::{self, Read, Seek, Write};
use std::path::Path;
use thiserror::Error;
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::{Kind, Pack, Record, RecordPath};

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Error while accessing the archive: {0}")]
    IOError(#[from] io::Error),
    #[error("Error in the zip container: {0}")]
    ZipError(#[from] ZipError),
    #[error("'{0}' is not a valid record path.")]
    InvalidPath(String),
    #[error("Record '{path}' holds {expected} values but {found} values were given.")]
    KindMismatch {
        path: String,
        expected: Kind,
        found: Kind,
    },
    #[error("No record '{0}' in the archive.")]
    MissingRecord(String),
}

/// Write named records into a zip container following the GTAR layout.
pub struct GtarWriter<W: Write + Seek> {
    archive: ZipWriter<W>,
}

impl GtarWriter<File> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write + Seek> GtarWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            archive: ZipWriter::new(inner),
        }
    }

    /// Pack `data` and store it under `path`.
    ///
    /// The scalar type written in the path has to match the type of the data.
    pub fn write_path<T>(&mut self, path: &str, data: &T) -> Result<(), ArchiveError>
    where
        T: Pack + ?Sized,
    {
        let record_path: RecordPath = path.parse()?;
        if record_path.kind() != T::KIND {
            return Err(ArchiveError::KindMismatch {
                path: path.to_owned(),
                expected: record_path.kind(),
                found: T::KIND,
            });
        }
        let record = data.pack();
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.archive.start_file(record_path.to_string(), options)?;
        self.archive.write_all(record.bytes())?;
        trace!("Wrote {} values to {record_path}", record.len());
        Ok(())
    }

    /// Write the zip central directory and give back the underlying writer.
    pub fn finish(mut self) -> Result<W, ArchiveError> {
        Ok(self.archive.finish()?)
    }
}

/// Read back the records of a GTAR zip archive.
pub struct GtarReader<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl GtarReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        Self::new(file)
    }
}

impl<R: Read + Seek> GtarReader<R> {
    pub fn new(inner: R) -> Result<Self, ArchiveError> {
        Ok(Self {
            archive: ZipArchive::new(inner)?,
        })
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.archive.file_names().map(String::from).collect();
        paths.sort();
        paths
    }

    pub fn read_path(&mut self, path: &str) -> Result<Record, ArchiveError> {
        let record_path: RecordPath = path.parse()?;
        let mut entry = match self.archive.by_name(path) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => {
                return Err(ArchiveError::MissingRecord(path.to_owned()))
            }
            Err(error) => return Err(error.into()),
        };
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes)?;
        Ok(Record::new(record_path.kind(), bytes))
    }
}
