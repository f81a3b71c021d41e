use std::fmt;
use std::str::FromStr;

mod writer;

pub use writer::{ArchiveError, GtarReader, GtarWriter};

/// Scalar type stored in a GTAR record, as written in the record path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    F32,
    U32,
}

impl Kind {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::F32 => "f32",
            Self::U32 => "u32",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "f32" => Some(Self::F32),
            "u32" => Some(Self::U32),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// How a record relates to the particles of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// One value (or vector) per particle.
    Individual,
    /// A single value shared by the whole archive.
    Uniform,
}

impl Behavior {
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Individual => "ind",
            Self::Uniform => "uni",
        }
    }
}

/// The name of a record in a GTAR archive: `{name}.{kind}.{behavior}`.
///
/// ```
/// use pack_gtar::{Behavior, Kind, RecordPath};
/// let path: RecordPath = "position.f32.ind".parse().unwrap();
/// assert_eq!(path.name(), "position");
/// assert_eq!(path.kind(), Kind::F32);
/// assert_eq!(path.behavior(), Behavior::Individual);
/// assert_eq!(path.to_string(), "position.f32.ind");
/// ```
///
/// Paths without a known type or behavior are rejected.
///
/// ```
/// use pack_gtar::RecordPath;
/// assert!("position.f64.ind".parse::<RecordPath>().is_err());
/// assert!("position.f32".parse::<RecordPath>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPath {
    name: String,
    kind: Kind,
    behavior: Behavior,
}

impl RecordPath {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn behavior(&self) -> Behavior {
        self.behavior
    }
}

impl FromStr for RecordPath {
    type Err = ArchiveError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = || ArchiveError::InvalidPath(path.to_owned());
        let mut parts = path.rsplitn(3, '.');
        let behavior = match parts.next() {
            Some("ind") => Behavior::Individual,
            Some("uni") => Behavior::Uniform,
            _ => return Err(invalid()),
        };
        let kind = parts.next().and_then(Kind::from_tag).ok_or_else(invalid)?;
        let name = parts.next().filter(|name| !name.is_empty()).ok_or_else(invalid)?;
        Ok(Self {
            name: name.to_owned(),
            kind,
            behavior,
        })
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.name, self.kind, self.behavior.tag())
    }
}

/// Packed content of a record: little-endian scalars of a single kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: Kind,
    bytes: Vec<u8>,
}

impl Record {
    pub fn new(kind: Kind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of scalars in the record.
    pub fn len(&self) -> usize {
        self.bytes.len() / SCALAR_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

const SCALAR_SIZE: usize = 4;

/// Build a record from the object
///
/// ```
/// use pack_gtar::{Kind, Pack};
/// let record = 1.5_f32.pack();
/// assert_eq!(record.kind(), Kind::F32);
/// assert_eq!(record.bytes(), &1.5_f32.to_le_bytes());
/// ```
///
/// Fixed size arrays and vectors are flattened, so a vector of positions
/// becomes a record with three scalars per particle.
///
/// ```
/// use pack_gtar::{Kind, Pack};
/// let positions: Vec<[f32; 3]> = vec![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]];
/// let record = positions.pack();
/// assert_eq!(record.kind(), Kind::F32);
/// assert_eq!(record.len(), 6);
/// ```
///
/// ```
/// use pack_gtar::{Kind, Pack};
/// let types: Vec<u32> = vec![0; 4];
/// let record = types.pack();
/// assert_eq!(record.kind(), Kind::U32);
/// assert_eq!(record.bytes(), &[0u8; 16]);
/// ```
pub trait Pack {
    const KIND: Kind;

    fn pack_into(&self, buffer: &mut Vec<u8>);

    fn pack(&self) -> Record {
        let mut bytes = Vec::new();
        self.pack_into(&mut bytes);
        Record::new(Self::KIND, bytes)
    }
}

impl Pack for f32 {
    const KIND: Kind = Kind::F32;

    fn pack_into(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.to_le_bytes());
    }
}

impl Pack for u32 {
    const KIND: Kind = Kind::U32;

    fn pack_into(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.to_le_bytes());
    }
}

impl<T, const N: usize> Pack for [T; N]
where
    T: Pack,
{
    const KIND: Kind = T::KIND;

    fn pack_into(&self, buffer: &mut Vec<u8>) {
        self.as_slice().pack_into(buffer);
    }
}

impl<T> Pack for [T]
where
    T: Pack,
{
    const KIND: Kind = T::KIND;

    fn pack_into(&self, buffer: &mut Vec<u8>) {
        self.iter().for_each(|item| item.pack_into(buffer));
    }
}

impl<T> Pack for Vec<T>
where
    T: Pack,
{
    const KIND: Kind = T::KIND;

    fn pack_into(&self, buffer: &mut Vec<u8>) {
        self.as_slice().pack_into(buffer);
    }
}

pub trait UnPack<T> {
    fn unpack(self) -> Option<T>;
}

fn unpack_scalars<T>(record: &Record, kind: Kind, from_le: fn([u8; 4]) -> T) -> Option<Vec<T>> {
    if record.kind != kind || record.bytes.len() % SCALAR_SIZE != 0 {
        return None;
    }
    record
        .bytes
        .chunks_exact(SCALAR_SIZE)
        .map(|chunk| chunk.try_into().ok().map(from_le))
        .collect()
}

impl UnPack<Vec<f32>> for &Record {
    /// Get the floats out of a record
    ///
    /// ```
    /// use pack_gtar::{Pack, UnPack};
    /// let record = vec![1.0_f32, 2.0, 3.0].pack();
    /// let unpacked: Vec<f32> = (&record).unpack().unwrap();
    /// assert_eq!(unpacked, vec![1.0, 2.0, 3.0]);
    /// ```
    ///
    /// ```
    /// use pack_gtar::{Pack, UnPack};
    /// let record = vec![1_u32, 2, 3].pack();
    /// let unpacked: Option<Vec<f32>> = (&record).unpack();
    /// assert_eq!(unpacked, None);
    /// ```
    fn unpack(self) -> Option<Vec<f32>> {
        unpack_scalars(self, Kind::F32, f32::from_le_bytes)
    }
}

impl UnPack<Vec<u32>> for &Record {
    fn unpack(self) -> Option<Vec<u32>> {
        unpack_scalars(self, Kind::U32, u32::from_le_bytes)
    }
}

impl<const N: usize> UnPack<Vec<[f32; N]>> for &Record {
    /// Get fixed size float vectors out of a record
    ///
    /// ```
    /// use pack_gtar::{Pack, UnPack};
    /// let record = vec![[1.0_f32, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]].pack();
    /// let unpacked: Vec<[f32; 4]> = (&record).unpack().unwrap();
    /// assert_eq!(unpacked, vec![[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0]]);
    /// let mismatched: Option<Vec<[f32; 3]>> = (&record).unpack();
    /// assert_eq!(mismatched, None);
    /// ```
    fn unpack(self) -> Option<Vec<[f32; N]>> {
        let scalars: Vec<f32> = self.unpack()?;
        if N == 0 || scalars.len() % N != 0 {
            return None;
        }
        scalars
            .chunks_exact(N)
            .map(|chunk| chunk.try_into().ok())
            .collect()
    }
}
