//! Note sequence model - the columns being sorted and their grid geometry
use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use crate::error::{Error, Result};

pub mod note;

pub use note::{note_to_frequency, Note};

/// Reference side length of one cell.
pub const DEFAULT_CELL_SIZE: u32 = 50;

/// Arrangement used when nothing else is configured.
pub const DEFAULT_ARRANGEMENT: [Note; 7] = [
    Note::E,
    Note::G,
    Note::D,
    Note::B,
    Note::A,
    Note::C,
    Note::F,
];

/// An ordered list of notes, one per grid column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sequence {
    notes: Vec<Note>,
}

impl Sequence {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Builds `length` columns by cycling through `order`. An empty order
    /// falls back to the alphabet itself.
    pub fn create(length: usize, order: &[Note]) -> Self {
        let order = if order.is_empty() { &Note::ALL[..] } else { order };
        Self {
            notes: order.iter().copied().cycle().take(length).collect(),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        self.notes.swap(a, b);
    }

    pub fn is_sorted(&self) -> bool {
        self.notes.windows(2).all(|pair| pair[0] <= pair[1])
    }

    /// Grid row for every column. Alphabet index 0 lands on the bottom row.
    pub fn display_rows(&self) -> Vec<usize> {
        self.notes.iter().map(|note| display_row(*note)).collect()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new(DEFAULT_ARRANGEMENT.to_vec())
    }
}

impl Deref for Sequence {
    type Target = [Note];

    fn deref(&self) -> &[Note] {
        &self.notes
    }
}

impl From<Vec<Note>> for Sequence {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}

/// Parses symbols such as `"gfedcba"` or `"g, f, e"`.
impl FromStr for Sequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.chars()
            .filter(|c| !c.is_whitespace() && *c != ',')
            .map(Note::from_symbol)
            .collect::<Result<Vec<_>>>()
            .map(Sequence::new)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for note in &self.notes {
            write!(f, "{}", note.symbol())?;
        }
        Ok(())
    }
}

pub fn display_row(note: Note) -> usize {
    (Note::COUNT - 1) - note.index()
}

/// The sequence laid out on a columns x notes grid.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Sequence,
    cell_size: u32,
}

impl Grid {
    pub fn new(cells: Sequence, cell_size: u32) -> Self {
        Self { cells, cell_size }
    }

    pub fn cells(&self) -> &Sequence {
        &self.cells
    }

    pub fn set_cells(&mut self, cells: Sequence) {
        self.cells = cells;
    }

    pub fn columns(&self) -> usize {
        self.cells.len()
    }

    pub fn rows(&self) -> usize {
        Note::COUNT
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn width(&self) -> u32 {
        self.columns() as u32 * self.cell_size
    }

    pub fn height(&self) -> u32 {
        self.rows() as u32 * self.cell_size
    }

    /// Top-left corner of the cell holding column `col`.
    pub fn cell_origin(&self, col: usize) -> Option<(u32, u32)> {
        let note = self.cells.get(col)?;
        Some((
            col as u32 * self.cell_size,
            display_row(*note) as u32 * self.cell_size,
        ))
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(Sequence::default(), DEFAULT_CELL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = Grid::default();
        assert_eq!(grid.columns(), 7);
        assert_eq!(grid.rows(), 7);
        assert_eq!(grid.width(), 350);
        assert_eq!(grid.height(), 350);
    }

    #[test]
    fn test_geometry_follows_cells() {
        let mut grid = Grid::new(Sequence::create(3, &[Note::C]), 20);
        assert_eq!(grid.width(), 60);
        assert_eq!(grid.height(), 140);
        grid.set_cells(Sequence::create(5, &[]));
        assert_eq!(grid.width(), 100);
        assert_eq!(grid.height(), 140);
    }

    #[test]
    fn test_create_cycles_order() {
        let seq = Sequence::create(5, &[Note::B, Note::A]);
        assert_eq!(seq.notes(), &[Note::B, Note::A, Note::B, Note::A, Note::B]);
        let seq = Sequence::create(8, &[]);
        assert_eq!(seq[7], Note::C);
    }

    #[test]
    fn test_display_rows_invert_alphabet() {
        let seq: Sequence = "cbg".parse().unwrap();
        assert_eq!(seq.display_rows(), vec![6, 0, 2]);
        let grid = Grid::new(seq, 50);
        assert_eq!(grid.cell_origin(0), Some((0, 300)));
        assert_eq!(grid.cell_origin(1), Some((50, 0)));
        assert_eq!(grid.cell_origin(3), None);
    }

    #[test]
    fn test_parse_sequence() {
        let seq: Sequence = "g, f, e".parse().unwrap();
        assert_eq!(seq.notes(), &[Note::G, Note::F, Note::E]);
        assert_eq!(seq.to_string(), "gfe");
        assert_eq!(
            "gxz".parse::<Sequence>(),
            Err(Error::InvalidNoteSymbol("x".to_string()))
        );
    }

    #[test]
    fn test_is_sorted() {
        assert!("ccdeb".parse::<Sequence>().unwrap().is_sorted());
        assert!(!"egdbacf".parse::<Sequence>().unwrap().is_sorted());
        assert!(Sequence::new(vec![]).is_sorted());
    }
}
