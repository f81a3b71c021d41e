use crate::color::{ColorMode, ColorModeError};
use crate::parsers::elements::ElementTypes;
use crate::parsers::errors::*;
use crate::parsers::record::AtomRecord;
use crate::parsers::structure::ParsedStructure;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;
use std::io::BufRead;
use std::str::FromStr;

pub const PDBX_NAMESPACE: &[u8] = b"http://pdbml.pdb.org/schema/pdbx-v50.xsd";

/// Where the color index of an atom comes from in a PDBML document.
///
/// There is no chain terminator in the PDBML atom sites, so atoms cannot be
/// colored by unit.
#[derive(Debug, Clone, Copy)]
enum ColorSource {
    Sequence,
    Element,
}

impl TryFrom<ColorMode> for ColorSource {
    type Error = ColorModeError;

    fn try_from(value: ColorMode) -> Result<Self, Self::Error> {
        match value {
            ColorMode::Sequence => Ok(Self::Sequence),
            ColorMode::Element => Ok(Self::Element),
            ColorMode::Unit => Err(ColorModeError::UnsupportedForFormat(value, "PDBML")),
        }
    }
}

/// The children of an `atom_site` element we need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AtomSiteField {
    CartnX,
    CartnY,
    CartnZ,
    TypeSymbol,
    AuthSeqId,
}

impl AtomSiteField {
    fn from_local_name(name: &[u8]) -> Option<Self> {
        match name {
            b"Cartn_x" => Some(Self::CartnX),
            b"Cartn_y" => Some(Self::CartnY),
            b"Cartn_z" => Some(Self::CartnZ),
            b"type_symbol" => Some(Self::TypeSymbol),
            b"auth_seq_id" => Some(Self::AuthSeqId),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum ReadState {
    /// We are out of any atom site.
    Idle,
    /// We are in an atom site, between two fields.
    AtomSite,
    /// We are reading the content of a field of an atom site. The field is
    /// None when we do not keep its value.
    Field(Option<AtomSiteField>),
}

/// Collects the text of the fields of one atom site.
#[derive(Debug, Default)]
struct AtomSiteBuilder {
    cartn_x: Option<String>,
    cartn_y: Option<String>,
    cartn_z: Option<String>,
    type_symbol: Option<String>,
    auth_seq_id: Option<String>,
}

impl AtomSiteBuilder {
    fn push_text(&mut self, field: AtomSiteField, text: &str) {
        let slot = match field {
            AtomSiteField::CartnX => &mut self.cartn_x,
            AtomSiteField::CartnY => &mut self.cartn_y,
            AtomSiteField::CartnZ => &mut self.cartn_z,
            AtomSiteField::TypeSymbol => &mut self.type_symbol,
            AtomSiteField::AuthSeqId => &mut self.auth_seq_id,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn finish(
        self,
        color_source: ColorSource,
        element_types: &mut ElementTypes,
    ) -> Result<AtomRecord, FormatError> {
        let x = extract_number(self.cartn_x, "Cartn_x", FieldError::Position)?;
        let y = extract_number(self.cartn_y, "Cartn_y", FieldError::Position)?;
        let z = extract_number(self.cartn_z, "Cartn_z", FieldError::Position)?;
        let element_symbol = self
            .type_symbol
            .map(|symbol| symbol.trim().to_owned())
            .ok_or_else(|| FormatError::MissingField(String::from("type_symbol")))?;
        let type_index = element_types.index_of(&element_symbol);
        let color_index = match color_source {
            ColorSource::Sequence => extract_number(
                self.auth_seq_id,
                "auth_seq_id",
                FieldError::ResidueIdentifier,
            )?,
            ColorSource::Element => type_index as isize,
        };
        Ok(AtomRecord {
            position: [x, y, z],
            element_symbol,
            type_index,
            color_index,
        })
    }
}

/// Read the atoms of a PDBML document.
///
/// Every `atom_site` element of the PDBx namespace becomes an atom. Elements
/// from other namespaces are ignored.
pub fn read_pdbml<F>(input: F, color_mode: ColorMode) -> Result<ParsedStructure, ReadError>
where
    F: BufRead,
{
    let color_source = ColorSource::try_from(color_mode)?;
    let mut reader = NsReader::from_reader(input);
    let mut buf = Vec::new();

    let mut read_state = ReadState::Idle;
    let mut element_types = ElementTypes::default();
    let mut site = AtomSiteBuilder::default();
    let mut atoms = Vec::new();

    loop {
        let (namespace, event) = match reader.read_resolved_event_into(&mut buf) {
            Ok(resolved) => resolved,
            Err(e) => return Err(ReadError::XMLError(e, reader.buffer_position())),
        };
        let in_pdbx = is_pdbx(&namespace);

        read_state = match (read_state, event) {
            (ReadState::Idle, Event::Start(ref e))
                if in_pdbx && e.local_name().as_ref() == b"atom_site" =>
            {
                site = AtomSiteBuilder::default();
                ReadState::AtomSite
            }
            (ReadState::Idle, Event::Eof) => break,
            (ReadState::Idle, _) => ReadState::Idle,

            (ReadState::AtomSite, Event::Start(ref e)) => {
                let field = in_pdbx
                    .then(|| AtomSiteField::from_local_name(e.local_name().as_ref()))
                    .flatten();
                ReadState::Field(field)
            }
            (ReadState::AtomSite, Event::End(_)) => {
                let atom = std::mem::take(&mut site)
                    .finish(color_source, &mut element_types)
                    .map_err(|e| ReadError::FormatError(e, reader.buffer_position()))?;
                atoms.push(atom);
                ReadState::Idle
            }

            (ReadState::Field(Some(field)), Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| ReadError::XMLError(e, reader.buffer_position()))?;
                site.push_text(field, &text);
                ReadState::Field(Some(field))
            }
            (ReadState::Field(Some(field)), Event::CData(ref e)) => {
                site.push_text(field, &String::from_utf8_lossy(e));
                ReadState::Field(Some(field))
            }
            (ReadState::Field(_), Event::End(_)) => ReadState::AtomSite,
            (ReadState::Field(_), Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                return Err(ReadError::FormatError(
                    FormatError::Unexpected(name),
                    reader.buffer_position(),
                ));
            }

            (ReadState::AtomSite | ReadState::Field(_), Event::Eof) => {
                return Err(ReadError::FormatError(
                    FormatError::Unexpected(String::from("end of document")),
                    reader.buffer_position(),
                ));
            }
            // Empty elements (e.g. nil fields), whitespaces, and comments.
            (state, _) => state,
        };
        buf.clear();
    }

    Ok(ParsedStructure::from_records(atoms, element_types))
}

fn is_pdbx(namespace: &ResolveResult) -> bool {
    match namespace {
        ResolveResult::Bound(Namespace(namespace)) => *namespace == PDBX_NAMESPACE,
        _ => false,
    }
}

fn extract_number<N>(
    text: Option<String>,
    key: &str,
    error: FieldError,
) -> Result<N, FormatError>
where
    N: FromStr,
{
    text.ok_or_else(|| FormatError::MissingField(String::from(key)))?
        .trim()
        .parse::<N>()
        .or(Err(FormatError::FieldFormat(error)))
}
