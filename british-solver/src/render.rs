//! Text rendering of a position and its analysis.
//!
//! ```text
//! Board   Curr    Opp     Analysis
//! ....    oooo    xxxx      0  0  0  0
//! ```
//!
//! `Board` shows stones (`O` for Side A, `X` for Side B), `Curr` the cells
//! the side to move may play, `Opp` the cells the opponent could play, and
//! `Analysis` the score of each legal move.

use std::fmt;

use british_core::{Analysis, Board, Cell, Side, SIDE_LEN};

/// Lowercase mark for a potential move of `side`.
fn potential_mark(side: Side) -> char {
    side.mark().to_ascii_lowercase()
}

fn row_cells(row: u8) -> impl Iterator<Item = Cell> {
    (0..SIDE_LEN).map(move |col| Cell::from_row_col(row, col))
}

/// A position and its analysis, displayed as the four-column table
/// followed by the position score.
pub struct AnalysisTable<'a> {
    pub board: &'a Board,
    pub analysis: &'a Analysis,
}

impl fmt::Display for AnalysisTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.board;
        let mover = board.side_to_move();
        let curr = board.legal_moves();
        let opp = board.legal_moves_for(mover.opponent());

        writeln!(f, "Board\tCurr\tOpp\tAnalysis")?;
        for row in 0..SIDE_LEN {
            for cell in row_cells(row) {
                write!(f, "{}", board.owner(cell).map_or('.', Side::mark))?;
            }
            f.write_str("\t")?;
            for cell in row_cells(row) {
                let mark = if curr.contains(cell) { potential_mark(mover) } else { '.' };
                write!(f, "{}", mark)?;
            }
            f.write_str("\t")?;
            for cell in row_cells(row) {
                let mark = if opp.contains(cell) {
                    potential_mark(mover.opponent())
                } else {
                    '.'
                };
                write!(f, "{}", mark)?;
            }
            f.write_str("\t")?;
            for cell in row_cells(row) {
                match self.analysis.scores[cell.0 as usize] {
                    Some(score) => write!(f, "{:3}", score)?,
                    None => f.write_str("  .")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "\nScore: {:3}\n", self.analysis.best)
    }
}

/// Render the four-column analysis table followed by the position score.
pub fn analysis_table(board: &Board, analysis: &Analysis) -> String {
    AnalysisTable { board, analysis }.to_string()
}

/// Framed board for interactive play: stones as `O`/`X`, `.` on every cell
/// the side to move may take.
///
/// ```text
/// -----------------
/// | . | . | . | . |
/// | . | O |   | . |
/// | . |   | X |   |
/// | . | . |   | . |
/// -----------------
/// ```
pub struct PlayGrid<'a>(pub &'a Board);

impl fmt::Display for PlayGrid<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.0;
        let legal = board.legal_moves();
        let rule = "-".repeat(4 * SIDE_LEN as usize + 1);

        writeln!(f, "{}", rule)?;
        for row in 0..SIDE_LEN {
            f.write_str("|")?;
            for cell in row_cells(row) {
                let mark = match board.owner(cell) {
                    Some(side) => side.mark(),
                    None if legal.contains(cell) => '.',
                    None => ' ',
                };
                write!(f, " {} |", mark)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "{}", rule)
    }
}
