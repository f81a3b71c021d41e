use crate::color::ColorMode;
use crate::parsers::elements::ElementTypes;
use crate::parsers::errors::*;
use crate::parsers::record::AtomRecord;
use crate::parsers::structure::ParsedStructure;
use std::collections::HashSet;
use std::io::BufRead;
use std::ops::Range;

// Column ranges of the fields we read, as 0-indexed half-open ranges. The PDB
// format documentation counts columns from 1 with inclusive bounds, so
// RESIDUE_NAME (columns 18-20 in the documentation) is 17..20 here.
const RESIDUE_NAME: Range<usize> = 17..20;
const RESIDUE_SEQUENCE_NUMBER: Range<usize> = 22..26;
const POSITION_X: Range<usize> = 26..38;
const POSITION_Y: Range<usize> = 38..46;
const POSITION_Z: Range<usize> = 46..54;
const ELEMENT_SYMBOL: Range<usize> = 76..78;

/// The kind of record a line holds, read from its first columns.
#[derive(Debug, PartialEq, Eq)]
enum RecordTag {
    Atom,
    HetAtom,
    Terminator,
    Other,
}

impl From<&str> for RecordTag {
    fn from(line: &str) -> Self {
        if line.starts_with("TER") {
            Self::Terminator
        } else if line.starts_with("ATOM") {
            Self::Atom
        } else if line.starts_with("HETATM") {
            Self::HetAtom
        } else {
            Self::Other
        }
    }
}

/// Read the atoms of a legacy PDB file.
///
/// ATOM records are always kept. HETATM records are kept only when their
/// residue name is in `hetatm_keys`. Each TER record starts a new unit, that
/// only the atoms read after it belong to. The input must already be
/// decompressed.
pub fn read_pdb<F>(
    input: F,
    color_mode: ColorMode,
    hetatm_keys: &HashSet<String>,
) -> Result<ParsedStructure, ReadError>
where
    F: BufRead,
{
    let mut element_types = ElementTypes::default();
    let mut atoms = Vec::new();
    let mut unit_count: isize = 0;
    for (lineno, line) in input.lines().enumerate() {
        let line = line?;
        match RecordTag::from(line.as_str()) {
            RecordTag::Terminator => {
                unit_count += 1;
                continue;
            }
            RecordTag::Other => continue,
            RecordTag::HetAtom if !hetatm_key_accepted(&line, hetatm_keys) => continue,
            RecordTag::Atom | RecordTag::HetAtom => (),
        }
        let atom = parse_pdb_atom_line(&line, color_mode, unit_count, &mut element_types)
            .map_err(|e| ReadError::FormatError(e, lineno))?;
        atoms.push(atom);
    }

    Ok(ParsedStructure::from_records(atoms, element_types))
}

fn hetatm_key_accepted(line: &str, hetatm_keys: &HashSet<String>) -> bool {
    line.get(RESIDUE_NAME)
        .map(|key| hetatm_keys.contains(key.trim()))
        .unwrap_or(false)
}

fn parse_pdb_atom_line(
    line: &str,
    color_mode: ColorMode,
    unit_count: isize,
    element_types: &mut ElementTypes,
) -> Result<AtomRecord, FormatError> {
    if line.len() < POSITION_Z.end {
        return Err(FormatError::LineTooShort);
    }
    // From this point, we know the line is long enough to contain the
    // positions. The element symbol is optional.

    let x = parse_field(line, POSITION_X, FieldError::Position)?;
    let y = parse_field(line, POSITION_Y, FieldError::Position)?;
    let z = parse_field(line, POSITION_Z, FieldError::Position)?;

    let element_symbol = line
        .get(ELEMENT_SYMBOL)
        .or_else(|| line.get(ELEMENT_SYMBOL.start..))
        .unwrap_or("")
        .trim()
        .to_owned();
    let type_index = element_types.index_of(&element_symbol);

    let color_index = match color_mode {
        ColorMode::Sequence => parse_field(
            line,
            RESIDUE_SEQUENCE_NUMBER,
            FieldError::ResidueIdentifier,
        )?,
        ColorMode::Element => type_index as isize,
        ColorMode::Unit => unit_count,
    };

    Ok(AtomRecord {
        position: [x, y, z],
        element_symbol,
        type_index,
        color_index,
    })
}

fn parse_field<N>(line: &str, columns: Range<usize>, error: FieldError) -> Result<N, FormatError>
where
    N: std::str::FromStr,
{
    line.get(columns)
        .ok_or(FormatError::LineTooShort)?
        .trim()
        .parse()
        .map_err(|_| FormatError::FieldFormat(error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_ressource;
    use rstest::rstest;
    use std::fs::File;
    use std::io::{BufReader, Cursor};

    const ATOM_N: &str =
        "ATOM      1  N   GLY A   3      17.119   0.186  36.320  1.00 64.10           N  ";
    const ATOM_CA: &str =
        "ATOM      2  CA  GLY A   3      16.004   1.047  36.828  1.00 63.36           C  ";
    const ATOM_O: &str =
        "ATOM      4  O   GLY A   4      14.090   0.040  37.418  1.00 60.50           O  ";
    const ATOM_C: &str =
        "ATOM      5  C   GLY A   4      13.905   2.232  35.913  1.00 59.96           C  ";
    const ATOM_N2: &str =
        "ATOM      6  N   GLY B   5      12.505   2.732  35.013  1.00 59.96           N  ";
    const TER: &str = "TER       7      GLY A   4";
    const HOH: &str =
        "HETATM 1288  O   HOH A 201      11.011  18.218  20.100  1.00 30.00           O  ";
    const ZINC: &str =
        "HETATM 1289 ZN    ZN A 202       3.000   4.000   5.000  1.00 20.00          ZN  ";

    fn read_lines(
        lines: &[&str],
        color_mode: ColorMode,
        hetatm_keys: &[&str],
    ) -> Result<ParsedStructure, ReadError> {
        let input = Cursor::new(lines.join("\n"));
        let keys = hetatm_keys.iter().map(|key| key.to_string()).collect();
        read_pdb(input, color_mode, &keys)
    }

    #[rstest]
    // Full line
    #[case(ATOM_N)]
    // Truncated after the element symbol
    #[case("ATOM      1  N   GLY A   3      17.119   0.186  36.320  1.00 64.10           N")]
    fn test_parse_pdb_atom_line(#[case] line: &str) {
        let expected = AtomRecord {
            position: [17.119, 0.186, 36.320],
            element_symbol: String::from("N"),
            type_index: 0,
            color_index: 3,
        };
        let mut element_types = ElementTypes::default();
        let atom =
            parse_pdb_atom_line(line, ColorMode::Sequence, 0, &mut element_types).unwrap();
        assert_eq!(atom, expected);
    }

    #[test]
    fn test_line_without_element_symbol() {
        let line = "ATOM      1  N   GLY A   3      17.119   0.186  36.320";
        let mut element_types = ElementTypes::default();
        let atom = parse_pdb_atom_line(line, ColorMode::Element, 0, &mut element_types).unwrap();
        assert_eq!(atom.element_symbol, "");
        assert_eq!(atom.color_index, 0);
    }

    #[rstest]
    #[case("ATOM      1  N   GLY A   3      17.119   0.186", FormatError::LineTooShort)]
    #[case(
        "ATOM      1  N   GLY A   3      17.1x9   0.186  36.320  1.00 64.10           N  ",
        FormatError::FieldFormat(FieldError::Position)
    )]
    #[case(
        "ATOM      1  N   GLY A   ?      17.119   0.186  36.320  1.00 64.10           N  ",
        FormatError::FieldFormat(FieldError::ResidueIdentifier)
    )]
    fn test_ill_formatted_line(#[case] line: &str, #[case] expected: FormatError) {
        let mut element_types = ElementTypes::default();
        let error =
            parse_pdb_atom_line(line, ColorMode::Sequence, 0, &mut element_types).unwrap_err();
        assert_eq!(error, expected);
    }

    #[test]
    fn test_error_reports_line_number() {
        let bad = "ATOM      9  N   GLY A   3      bad.19   0.186  36.320  1.00 64.10           N  ";
        let error = read_lines(&[ATOM_N, TER, bad], ColorMode::Sequence, &[]).unwrap_err();
        assert!(matches!(
            error,
            ReadError::FormatError(FormatError::FieldFormat(FieldError::Position), 2)
        ));
    }

    #[test]
    fn test_type_indices_follow_encounter_order() {
        let structure =
            read_lines(&[ATOM_CA, ATOM_O, ATOM_C, ATOM_N], ColorMode::Element, &[]).unwrap();
        assert_eq!(structure.type_indices, vec![0, 1, 0, 2]);
        assert_eq!(structure.element_types.sorted_symbols(), vec!["C", "N", "O"]);
    }

    #[test]
    fn test_element_color_index_is_type_index() {
        let records = {
            let mut element_types = ElementTypes::default();
            [ATOM_CA, ATOM_O, ATOM_C, ATOM_N]
                .iter()
                .map(|line| {
                    parse_pdb_atom_line(line, ColorMode::Element, 0, &mut element_types).unwrap()
                })
                .collect::<Vec<_>>()
        };
        let color_indices: Vec<isize> = records.iter().map(|r| r.color_index).collect();
        assert_eq!(color_indices, vec![0, 1, 0, 2]);
    }

    #[test]
    fn test_terminator_starts_a_new_unit() {
        let mut element_types = ElementTypes::default();
        let mut unit_count = 0;
        let mut color_indices = Vec::new();
        for line in [ATOM_N, TER, ATOM_N2] {
            match RecordTag::from(line) {
                RecordTag::Terminator => unit_count += 1,
                _ => color_indices.push(
                    parse_pdb_atom_line(line, ColorMode::Unit, unit_count, &mut element_types)
                        .unwrap()
                        .color_index,
                ),
            }
        }
        assert_eq!(color_indices, vec![0, 1]);

        let structure = read_lines(&[ATOM_N, TER, ATOM_N2], ColorMode::Unit, &[]).unwrap();
        assert_eq!(structure.atom_count(), 2);
        let colors = crate::color::ColorAssigner::<crate::color::CubeEllipse>::default();
        assert_eq!(structure.colors, colors.colors(&[0, 1]));
    }

    #[test]
    fn test_terminator_is_not_retroactive() {
        let structure = read_lines(&[ATOM_N, ATOM_CA, TER], ColorMode::Unit, &[]).unwrap();
        let colors = crate::color::ColorAssigner::<crate::color::CubeEllipse>::default();
        assert_eq!(structure.colors, colors.colors(&[0, 0]));
    }

    #[rstest]
    #[case(&[], 1)]
    #[case(&["HOH"], 2)]
    #[case(&["ZN"], 2)]
    #[case(&["HOH", "ZN"], 3)]
    fn test_hetatm_allow_list(#[case] keys: &[&str], #[case] expected: usize) {
        let structure = read_lines(&[ATOM_N, HOH, ZINC], ColorMode::Sequence, keys).unwrap();
        assert_eq!(structure.atom_count(), expected);
    }

    #[test]
    fn test_hetatm_filter_keeps_water_and_drops_zinc() {
        let structure = read_lines(&[HOH, ZINC], ColorMode::Element, &["HOH"]).unwrap();
        assert_eq!(structure.atom_count(), 1);
        assert_eq!(structure.positions, vec![[11.011, 18.218, 20.100]]);
        assert_eq!(structure.element_types.sorted_symbols(), vec!["O"]);
    }

    #[test]
    fn test_other_records_are_ignored() {
        let lines = [
            "HEADER    OXYGEN TRANSPORT                        07-MAR-84   4HHB",
            "REMARK 350 BIOMOLECULE: 1",
            ATOM_N,
            "ANISOU    1  N   GLY A   3     7000   8000   9000    100    200    300       N",
            "CONECT    1    2",
            "END",
        ];
        let structure = read_lines(&lines, ColorMode::Sequence, &[]).unwrap();
        assert_eq!(structure.atom_count(), 1);
    }

    #[test]
    fn test_diameters() {
        let structure =
            read_lines(&[ATOM_N, ATOM_CA, ATOM_O, ZINC], ColorMode::Sequence, &["ZN"]).unwrap();
        assert_eq!(structure.diameters, vec![3.1, 3.4, 3.04, 2.0]);
    }

    #[test]
    fn test_read_file() {
        let filepath = test_ressource!("two_chains.pdb");
        let file = File::open(filepath).expect("Could not open test file.");
        let buffer = BufReader::new(file);
        let keys = HashSet::from([String::from("HOH")]);
        let structure =
            read_pdb(buffer, ColorMode::Unit, &keys).expect("Error when parsing the file.");
        assert_eq!(structure.atom_count(), 9);
        assert_eq!(
            structure.element_types.symbols().collect::<Vec<_>>(),
            vec!["N", "C", "O", "S"]
        );
    }
}
