use indexmap::IndexSet;

/// Dense enumeration of element symbols in the order they are first met.
///
/// ```
/// use pdb_gtar::parsers::elements::ElementTypes;
/// let mut types = ElementTypes::default();
/// let indices: Vec<usize> = ["C", "O", "C", "N"]
///     .iter()
///     .map(|symbol| types.index_of(symbol))
///     .collect();
/// assert_eq!(indices, vec![0, 1, 0, 2]);
/// assert_eq!(types.sorted_symbols(), vec!["C", "N", "O"]);
/// ```
#[derive(Debug, Default, Clone)]
pub struct ElementTypes {
    symbols: IndexSet<String>,
}

impl ElementTypes {
    pub fn index_of(&mut self, symbol: &str) -> usize {
        match self.symbols.get_index_of(symbol) {
            Some(index) => index,
            None => self.symbols.insert_full(symbol.to_owned()).0,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// The symbols in encounter order; the position is the type index.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn sorted_symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.symbols().collect();
        symbols.sort_unstable();
        symbols
    }
}
