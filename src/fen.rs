//! FEN module.
//! Structural validation of position strings and decoding of the placement field
//! into an 8x8 grid of cells.
//! The validator is deliberately lenient: it checks field/rank counts and the
//! character class of each rank, never column sums or legality.
//! `Validation::Strict` adds a full shakmaty parse on top.

use shakmaty::Piece;
use std::fmt;

/// Placement field of the standard starting position.
pub const STARTING_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

const PIECE_LETTERS: &str = "rnbqkpRNBQKP";
const FIELD_COUNT: usize = 6;
const RANK_COUNT: usize = 8;
const FILE_COUNT: usize = 8;

// *************** Board Types ***************

/// A single square of a decoded board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cell {
    #[default]
    Empty,
    Piece(Piece),
    /// A character that is neither a run-length digit nor a piece letter.
    /// Only reachable when decoding input that skipped validation.
    Unrecognized(char),
}

impl Cell {
    /// Symbol used by renderers: the FEN letter, or `.` for an empty square.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::Piece(piece) => piece.char(),
            Cell::Unrecognized(c) => c,
        }
    }

    pub fn piece(self) -> Option<Piece> {
        match self {
            Cell::Piece(piece) => Some(piece),
            _ => None,
        }
    }
}

/// Decoded 8x8 board. Row 0 is rank 8 (Black's back rank), column 0 is the a-file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; FILE_COUNT]; RANK_COUNT],
}

impl Board {
    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    pub fn rows(&self) -> &[[Cell; FILE_COUNT]; RANK_COUNT] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|c| *c == Cell::Empty)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

// *************** Validation ***************

/// How strictly incoming position strings are checked before decoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Validation {
    /// Field count, rank count and character class only.
    #[default]
    Lenient,
    /// Lenient checks plus a full FEN parse (column sums, side to move, castling, ...).
    Strict,
}

impl Validation {
    pub fn accepts(self, fen: &str) -> bool {
        match self {
            Validation::Lenient => is_valid(fen),
            Validation::Strict => is_valid(fen) && is_strictly_valid(fen),
        }
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validation::Lenient => write!(f, "lenient"),
            Validation::Strict => write!(f, "strict"),
        }
    }
}

/// Structural check of a six-field FEN string.
///
/// Does not verify that each rank covers exactly 8 files, king counts, or legality.
pub fn is_valid(fen: &str) -> bool {
    let fields: Vec<&str> = fen.split(' ').collect();
    if fields.len() != FIELD_COUNT {
        return false;
    }

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != RANK_COUNT {
        return false;
    }

    ranks
        .iter()
        .flat_map(|rank| rank.chars())
        .all(|c| is_run_digit(c) || PIECE_LETTERS.contains(c))
}

fn is_strictly_valid(fen: &str) -> bool {
    shakmaty::fen::Fen::from_ascii(fen.as_bytes()).is_ok()
}

fn is_run_digit(c: char) -> bool {
    ('1'..='8').contains(&c)
}

// *************** Decoding ***************

/// Decodes the placement field of `fen` into a board.
///
/// Only the text before the first space is read, so a bare placement string works too.
/// Never fails: squares past the 8th rank or file are dropped, and anything left
/// uncovered stays empty.
pub fn decode(fen: &str) -> Board {
    let mut board = Board::default();
    if fen.is_empty() {
        return board;
    }

    let placement = fen.split(' ').next().unwrap_or_default();
    for (row, rank) in placement.split('/').enumerate().take(RANK_COUNT) {
        let mut col = 0usize;
        for c in rank.chars() {
            if is_run_digit(c) {
                // Digits are ASCII 1-8 here, so the offset fits.
                col += (c as u8 - b'0') as usize;
                continue;
            }
            if col < FILE_COUNT {
                board.cells[row][col] = match Piece::from_char(c) {
                    Some(piece) => Cell::Piece(piece),
                    None => Cell::Unrecognized(c),
                };
            }
            col += 1;
        }
    }
    board
}

// *************** Tests ***************
