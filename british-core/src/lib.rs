//! British Square game logic with bit-based board representation.
//!
//! Two sides take turns placing stones on a 4x4 grid. A stone may not be
//! placed orthogonally next to an opponent stone. A side with no legal
//! placement forfeits the turn (see [`search::score_after_pass`]).
//!
//! # Board Encoding (64-bit)
//!
//! ```text
//! Bits 0-15:  Side A stones (one bit per cell)
//! Bits 16-31: Side B stones
//! Bit 32:     Side to move (0 = A, 1 = B)
//! Bits 33-63: Unused (zero)
//!
//! Cell indices (row-major order):
//!    0  1  2  3
//!    4  5  6  7
//!    8  9 10 11
//!   12 13 14 15
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod search;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use search::{analyse, evaluate, score_after_pass, Analysis, MoveGuard, Negamax, Score};

/// Board width and height.
pub const SIDE_LEN: u8 = 4;
/// Number of cells on the board.
pub const NUM_CELLS: u8 = SIDE_LEN * SIDE_LEN;

/// Mask with every cell bit set.
const FULL: u16 = u16::MAX;
const TOP_ROW: u16 = 0x000F;
const BOTTOM_ROW: u16 = 0xF000;
const LEFT_COL: u16 = 0x1111;
const RIGHT_COL: u16 = 0x8888;

/// Orthogonal neighbours of every cell. Edge and corner cells have fewer.
const NEIGHBOURS: [u16; NUM_CELLS as usize] = neighbour_masks();

const fn neighbour_masks() -> [u16; NUM_CELLS as usize] {
    let mut masks = [0u16; NUM_CELLS as usize];
    let mut i = 0usize;
    while i < NUM_CELLS as usize {
        let row = i / SIDE_LEN as usize;
        let col = i % SIDE_LEN as usize;
        let mut mask = 0u16;
        if row > 0 {
            mask |= 1 << (i - 4);
        }
        if row < 3 {
            mask |= 1 << (i + 4);
        }
        if col > 0 {
            mask |= 1 << (i - 1);
        }
        if col < 3 {
            mask |= 1 << (i + 1);
        }
        masks[i] = mask;
        i += 1;
    }
    masks
}

/// Side identifier. Side A moves first.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    A = 0,
    B = 1,
}

impl Side {
    /// Get the opponent side.
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Stone mark used by the analysis table.
    pub fn mark(self) -> char {
        match self {
            Side::A => 'O',
            Side::B => 'X',
        }
    }
}

/// Free-function form of [`Side::opponent`].
#[inline]
pub fn opponent_of(side: Side) -> Side {
    side.opponent()
}

/// Position on the 4x4 board (0-15).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell(pub u8);

impl Cell {
    /// Create a cell from row and column (0-3 each).
    #[inline]
    pub fn from_row_col(row: u8, col: u8) -> Cell {
        debug_assert!(row < SIDE_LEN && col < SIDE_LEN);
        Cell(row * SIDE_LEN + col)
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.0 / SIDE_LEN
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.0 % SIDE_LEN
    }

    /// Check if this is a cell of the board (0-15).
    #[inline]
    pub fn is_valid(self) -> bool {
        self.0 < NUM_CELLS
    }

    /// Cell mask; empty for cells outside the board.
    #[inline]
    fn bit(self) -> u16 {
        1u16.checked_shl(u32::from(self.0)).unwrap_or(0)
    }

    /// Orthogonal neighbours, ascending. Empty for cells outside the board.
    pub fn neighbours(self) -> Moves {
        Moves(NEIGHBOURS.get(self.0 as usize).copied().unwrap_or(0))
    }

    /// Iterate over all 16 cells.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..NUM_CELLS).map(Cell)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Occupancy of a cell relative to the side to move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Occupant {
    Empty,
    Mover,
    Opponent,
}

/// Errors for board input that comes from outside the search.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("cell {0} is outside the 4x4 board")]
    OutOfBounds(u8),
    #[error("cell {0} is already occupied")]
    Occupied(Cell),
    #[error("cell {0} is next to an opponent stone")]
    AdjacentToOpponent(Cell),
    #[error("cannot parse move {0:?}")]
    Parse(String),
    #[error("invalid board encoding {0:#x}")]
    InvalidEncoding(u64),
}

/// Set of cells, iterated in ascending order.
///
/// A snapshot: it does not borrow the board, so the board can be mutated
/// while the moves are walked.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Moves(u16);

impl Moves {
    /// Raw cell mask (bit i = cell i).
    #[inline]
    pub fn mask(self) -> u16 {
        self.0
    }

    #[inline]
    pub fn contains(self, cell: Cell) -> bool {
        cell.is_valid() && self.0 & cell.bit() != 0
    }
}

impl Iterator for Moves {
    type Item = Cell;

    #[inline]
    fn next(&mut self) -> Option<Cell> {
        if self.0 == 0 {
            return None;
        }
        let cell = Cell(self.0.trailing_zeros() as u8);
        self.0 &= self.0 - 1;
        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Moves {}

/// Board state: one bitboard per side plus the side to move.
///
/// See module documentation for the packed encoding. Serde uses the same
/// packed form, so deserializing goes through [`Board::from_u64`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Board {
    stones: [u16; 2],
    to_move: Side,
}

impl Board {
    const SIDE_B_SHIFT: u32 = 16;
    /// Bit position for the side-to-move bit.
    const TO_MOVE_BIT: u32 = 32;

    /// Create an empty board with Side A to move.
    #[inline]
    pub const fn new() -> Board {
        Board {
            stones: [0, 0],
            to_move: Side::A,
        }
    }

    /// Build a position by playing `cells` from the empty board.
    pub fn play(cells: &[u8]) -> Result<Board, MoveError> {
        let mut board = Board::new();
        for &cell in cells {
            board.try_apply(cell)?;
        }
        Ok(board)
    }

    /// Decode a board from its packed u64 form.
    pub fn from_u64(bits: u64) -> Result<Board, MoveError> {
        let a = bits as u16;
        let b = (bits >> Self::SIDE_B_SHIFT) as u16;
        if a & b != 0 || bits >> (Self::TO_MOVE_BIT + 1) != 0 {
            return Err(MoveError::InvalidEncoding(bits));
        }
        let to_move = if (bits >> Self::TO_MOVE_BIT) & 1 == 0 {
            Side::A
        } else {
            Side::B
        };
        Ok(Board {
            stones: [a, b],
            to_move,
        })
    }

    /// Get the packed u64 encoding.
    #[inline]
    pub fn to_u64(self) -> u64 {
        self.stones[0] as u64
            | (self.stones[1] as u64) << Self::SIDE_B_SHIFT
            | (self.to_move as u64) << Self::TO_MOVE_BIT
    }

    #[inline]
    pub fn side_to_move(&self) -> Side {
        self.to_move
    }

    /// Stones of `side` as a cell mask.
    #[inline]
    pub fn stones(&self, side: Side) -> u16 {
        self.stones[side.index()]
    }

    #[inline]
    fn occupied(&self) -> u16 {
        self.stones[0] | self.stones[1]
    }

    /// Number of stones on the board.
    #[inline]
    pub fn stone_count(&self) -> u32 {
        self.occupied().count_ones()
    }

    /// Which side owns `cell`, if any.
    pub fn owner(&self, cell: Cell) -> Option<Side> {
        if self.stones[0] & cell.bit() != 0 {
            Some(Side::A)
        } else if self.stones[1] & cell.bit() != 0 {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Occupancy of `cell` relative to the side to move.
    pub fn occupant(&self, cell: Cell) -> Occupant {
        match self.owner(cell) {
            None => Occupant::Empty,
            Some(side) if side == self.to_move => Occupant::Mover,
            Some(_) => Occupant::Opponent,
        }
    }

    /// Check whether the side to move may place a stone on `cell`.
    ///
    /// False for occupied cells and for cells outside the board.
    #[inline]
    pub fn is_valid_move(&self, cell: Cell) -> bool {
        if !cell.is_valid() || self.occupied() & cell.bit() != 0 {
            return false;
        }
        let opp = self.stones(self.to_move.opponent());
        NEIGHBOURS[cell.0 as usize] & opp == 0
    }

    /// Legal moves of the side to move, ascending.
    #[inline]
    pub fn legal_moves(&self) -> Moves {
        self.legal_moves_for(self.to_move)
    }

    /// Legal moves `side` would have if it were to move.
    pub fn legal_moves_for(&self, side: Side) -> Moves {
        let opp = self.stones(side.opponent());
        let blocked = (opp & !BOTTOM_ROW) << 4
            | (opp & !TOP_ROW) >> 4
            | (opp & !RIGHT_COL) << 1
            | (opp & !LEFT_COL) >> 1;
        Moves(FULL & !(self.occupied() | blocked))
    }

    /// Place a stone for the side to move and pass the turn.
    ///
    /// The caller guarantees `is_valid_move(cell)`.
    #[inline]
    pub fn apply_move(&mut self, cell: Cell) {
        debug_assert!(self.is_valid_move(cell), "illegal move {cell}");
        self.stones[self.to_move.index()] |= cell.bit();
        self.to_move = self.to_move.opponent();
    }

    /// Undo the most recent `apply_move(cell)`.
    #[inline]
    pub fn undo_move(&mut self, cell: Cell) {
        self.to_move = self.to_move.opponent();
        debug_assert!(
            self.stones[self.to_move.index()] & cell.bit() != 0,
            "undo of unplayed move {cell}"
        );
        self.stones[self.to_move.index()] &= !cell.bit();
    }

    /// Checked `apply_move` for moves that come from outside the engine.
    pub fn try_apply(&mut self, cell: u8) -> Result<(), MoveError> {
        let cell = Cell(cell);
        if !cell.is_valid() {
            return Err(MoveError::OutOfBounds(cell.0));
        }
        if self.owner(cell).is_some() {
            return Err(MoveError::Occupied(cell));
        }
        if !self.is_valid_move(cell) {
            return Err(MoveError::AdjacentToOpponent(cell));
        }
        self.apply_move(cell);
        Ok(())
    }

    /// Hand the turn to the opponent without placing a stone.
    #[inline]
    pub fn pass(&mut self) {
        self.to_move = self.to_move.opponent();
    }

    /// Symmetry transformations of the 4x4 board (D4 group).
    ///
    /// Each entry maps new cell -> old cell.
    const TRANSFORMS: [[u8; 16]; 8] = [
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15], // Identity
        [12, 8, 4, 0, 13, 9, 5, 1, 14, 10, 6, 2, 15, 11, 7, 3], // Rotate 90° clockwise
        [15, 14, 13, 12, 11, 10, 9, 8, 7, 6, 5, 4, 3, 2, 1, 0], // Rotate 180°
        [3, 7, 11, 15, 2, 6, 10, 14, 1, 5, 9, 13, 0, 4, 8, 12], // Rotate 270° clockwise
        [3, 2, 1, 0, 7, 6, 5, 4, 11, 10, 9, 8, 15, 14, 13, 12], // Reflect left-right
        [12, 13, 14, 15, 8, 9, 10, 11, 4, 5, 6, 7, 0, 1, 2, 3], // Reflect top-bottom
        [0, 4, 8, 12, 1, 5, 9, 13, 2, 6, 10, 14, 3, 7, 11, 15], // Reflect main diagonal
        [15, 11, 7, 3, 14, 10, 6, 2, 13, 9, 5, 1, 12, 8, 4, 0], // Reflect anti-diagonal
    ];

    /// Number of symmetry transformations.
    pub const NUM_TRANSFORMS: usize = 8;

    /// Apply a transformation to the board, returning the new encoding.
    ///
    /// The side to move is preserved.
    pub fn transform(&self, t: usize) -> u64 {
        let mapping = &Self::TRANSFORMS[t];
        let mut stones = [0u16; 2];
        for (new_cell, &old_cell) in mapping.iter().enumerate() {
            for side in 0..2 {
                if self.stones[side] & (1 << old_cell) != 0 {
                    stones[side] |= 1 << new_cell;
                }
            }
        }
        Board {
            stones,
            to_move: self.to_move,
        }
        .to_u64()
    }

    /// Get the canonical form of this board.
    ///
    /// The minimum encoding across all 8 symmetries, so symmetric
    /// positions share one key.
    pub fn canonical(&self) -> u64 {
        (1..Self::NUM_TRANSFORMS).fold(self.to_u64(), |min, t| min.min(self.transform(t)))
    }
}

impl TryFrom<u64> for Board {
    type Error = MoveError;

    fn try_from(bits: u64) -> Result<Board, MoveError> {
        Board::from_u64(bits)
    }
}

impl From<Board> for u64 {
    fn from(board: Board) -> u64 {
        board.to_u64()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..SIDE_LEN {
            for col in 0..SIDE_LEN {
                let mark = match self.owner(Cell::from_row_col(row, col)) {
                    Some(side) => side.mark(),
                    None => '.',
                };
                write!(f, "{mark}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Parse a move list such as `"5 10 0"` or `"5,10,0"`.
pub fn parse_moves(input: &str) -> Result<Vec<u8>, MoveError> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .map(|tok| tok.parse::<u8>().map_err(|_| MoveError::Parse(tok.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(moves: Moves) -> Vec<u8> {
        moves.map(|c| c.0).collect()
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::A.opponent(), Side::B);
        assert_eq!(Side::B.opponent(), Side::A);
        assert_eq!(opponent_of(Side::A), Side::B);
    }

    #[test]
    fn test_cell_row_col() {
        assert_eq!(Cell::from_row_col(0, 0), Cell(0));
        assert_eq!(Cell::from_row_col(1, 1), Cell(5));
        assert_eq!(Cell::from_row_col(3, 3), Cell(15));
        for cell in Cell::all() {
            assert_eq!(Cell::from_row_col(cell.row(), cell.col()), cell);
        }
        assert!(!Cell(16).is_valid());
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(cells(Cell(0).neighbours()), vec![1, 4]);
        assert_eq!(cells(Cell(3).neighbours()), vec![2, 7]);
        assert_eq!(cells(Cell(5).neighbours()), vec![1, 4, 6, 9]);
        assert_eq!(cells(Cell(7).neighbours()), vec![3, 6, 11]);
        assert_eq!(cells(Cell(12).neighbours()), vec![8, 13]);
        assert_eq!(cells(Cell(15).neighbours()), vec![11, 14]);
    }

    #[test]
    fn test_board_new() {
        let board = Board::new();
        assert_eq!(board.to_u64(), 0);
        assert_eq!(board.side_to_move(), Side::A);
        assert_eq!(board.legal_moves().len(), 16);
        assert_eq!(board, Board::default());
    }

    #[test]
    fn test_first_moves_and_adjacency() {
        let mut board = Board::new();
        assert!(board.is_valid_move(Cell(0)));
        assert!(board.is_valid_move(Cell(5)));

        board.apply_move(Cell(5));
        assert_eq!(board.side_to_move(), Side::B);
        for blocked in [1, 4, 6, 9] {
            assert!(!board.is_valid_move(Cell(blocked)), "cell {blocked}");
        }
        assert!(!board.is_valid_move(Cell(5)));
        assert!(board.is_valid_move(Cell(0)));
    }

    #[test]
    fn test_legality_fixture() {
        // A: 0, 5   B: 10, 15   A to move
        let board = Board::play(&[5, 10, 0, 15]).unwrap();
        assert_eq!(board.side_to_move(), Side::A);

        let legal_a = [1, 2, 3, 4, 7, 8, 12, 13];
        for cell in Cell::all() {
            assert_eq!(
                board.is_valid_move(cell),
                legal_a.contains(&cell.0),
                "cell {cell}"
            );
        }
        assert_eq!(cells(board.legal_moves()), legal_a);

        let mut passed = board;
        passed.pass();
        let legal_b = [2, 3, 7, 8, 11, 12, 13, 14];
        for cell in Cell::all() {
            assert_eq!(passed.is_valid_move(cell), legal_b.contains(&cell.0));
        }
        assert_eq!(cells(board.legal_moves_for(Side::B)), legal_b);
    }

    #[test]
    fn test_out_of_range_cell_is_never_valid() {
        let board = Board::new();
        assert!(!board.is_valid_move(Cell(16)));
        assert!(!board.is_valid_move(Cell(255)));
    }

    #[test]
    fn test_out_of_range_cell_has_no_owner() {
        let board = Board::play(&[0, 15]).unwrap();
        for cell in [Cell(16), Cell(31), Cell(255)] {
            assert_eq!(board.owner(cell), None, "cell {cell}");
            assert_eq!(board.occupant(cell), Occupant::Empty);
            assert_eq!(cell.neighbours().len(), 0);
            assert!(!board.legal_moves().contains(cell));
        }
        assert_eq!(board.owner(Cell(0)), Some(Side::A));
    }

    #[test]
    fn test_apply_undo_restores() {
        let board = Board::play(&[5, 10, 0]).unwrap();
        for cell in board.legal_moves() {
            let mut copy = board;
            copy.apply_move(cell);
            assert_eq!(copy.owner(cell), Some(Side::B));
            copy.undo_move(cell);
            assert_eq!(copy, board);
        }
    }

    #[test]
    fn test_occupant_is_relative() {
        let board = Board::play(&[5, 10]).unwrap();
        assert_eq!(board.occupant(Cell(5)), Occupant::Mover);
        assert_eq!(board.occupant(Cell(10)), Occupant::Opponent);
        assert_eq!(board.occupant(Cell(0)), Occupant::Empty);

        let mut passed = board;
        passed.pass();
        assert_eq!(passed.occupant(Cell(5)), Occupant::Opponent);
        assert_eq!(passed.occupant(Cell(10)), Occupant::Mover);
    }

    #[test]
    fn test_play_rejects_bad_input() {
        assert_eq!(Board::play(&[16]), Err(MoveError::OutOfBounds(16)));
        assert_eq!(Board::play(&[5, 5]), Err(MoveError::Occupied(Cell(5))));
        assert_eq!(
            Board::play(&[5, 6]),
            Err(MoveError::AdjacentToOpponent(Cell(6)))
        );
    }

    #[test]
    fn test_parse_moves() {
        assert_eq!(parse_moves("5 10 0").unwrap(), vec![5, 10, 0]);
        assert_eq!(parse_moves(" 5,10 ,0 ").unwrap(), vec![5, 10, 0]);
        assert!(parse_moves("").unwrap().is_empty());
        assert_eq!(parse_moves("5 x"), Err(MoveError::Parse("x".to_string())));
    }

    #[test]
    fn test_encoding() {
        let board = Board::play(&[5]).unwrap();
        assert_eq!(board.to_u64(), (1 << 5) | (1 << 32));
        assert_eq!(Board::from_u64(board.to_u64()), Ok(board));

        let overlapping = 1 | (1 << 16);
        assert_eq!(
            Board::from_u64(overlapping),
            Err(MoveError::InvalidEncoding(overlapping))
        );
        assert!(Board::from_u64(1 << 40).is_err());
    }

    #[test]
    fn test_canonical_corners() {
        let corner = Board::play(&[0]).unwrap().canonical();
        for other in [3, 12, 15] {
            assert_eq!(Board::play(&[other]).unwrap().canonical(), corner);
        }
        assert_ne!(Board::play(&[5]).unwrap().canonical(), corner);
        assert_eq!(Board::new().canonical(), 0);
    }

    #[test]
    fn test_transform_keeps_side_to_move() {
        let board = Board::play(&[1, 14, 4]).unwrap();
        for t in 0..Board::NUM_TRANSFORMS {
            let image = Board::from_u64(board.transform(t)).unwrap();
            assert_eq!(image.side_to_move(), board.side_to_move());
            assert_eq!(image.stone_count(), board.stone_count());
        }
        assert_eq!(board.transform(0), board.to_u64());
    }

    #[test]
    fn test_display() {
        let board = Board::play(&[5, 10]).unwrap();
        assert_eq!(board.to_string(), "....\n.O..\n..X.\n....\n");
    }

    #[test]
    fn test_serde_json() {
        let board = Board::play(&[0, 15, 5]).unwrap();
        let json = serde_json::to_string(&board).unwrap();
        assert_eq!(json, board.to_u64().to_string());
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(back, board);
    }

    #[test]
    fn test_serde_rejects_overlapping_stones() {
        let overlapping = (1u64 | 1 << 16).to_string();
        assert!(serde_json::from_str::<Board>(&overlapping).is_err());
        assert!(serde_json::from_str::<Board>(r#"{"stones":[1,1],"to_move":"A"}"#).is_err());
        assert!(serde_json::from_str::<Board>(&(1u64 << 40).to_string()).is_err());
    }
}
