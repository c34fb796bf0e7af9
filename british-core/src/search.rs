//! Exhaustive negamax search with the pass rule.
//!
//! Scores are move-count differentials from the point of view of the side
//! to move. There is no pruning and no caching: every line is played out
//! until the side to move is stuck.

use std::ops::{Deref, DerefMut};

use serde::Serialize;

use crate::{Board, Cell, Side, NUM_CELLS};

/// Position score from the mover's perspective.
pub type Score = i32;

/// A move applied for the lifetime of the guard.
///
/// Dropping the guard undoes the move, so the board is restored on every
/// exit path of the scope that made it.
pub struct MoveGuard<'a> {
    board: &'a mut Board,
    cell: Cell,
}

impl<'a> MoveGuard<'a> {
    #[inline]
    pub fn new(board: &'a mut Board, cell: Cell) -> Self {
        board.apply_move(cell);
        Self { board, cell }
    }
}

impl Deref for MoveGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for MoveGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for MoveGuard<'_> {
    fn drop(&mut self) {
        self.board.undo_move(self.cell);
    }
}

/// Score of a position whose side to move has no legal placement.
///
/// The stuck side forfeits the turn. If Side B is the one stuck, Side A has
/// already played one stone more, which costs one point. Every move the
/// opponent then has costs one more.
///
/// This looks exactly one tempo ahead and does not search the opponent's
/// continuation, so it only approximates the full game value. Every score
/// in the golden tests depends on this rule.
pub fn score_after_pass(board: &Board) -> Score {
    let base = match board.side_to_move() {
        Side::A => 0,
        Side::B => -1,
    };
    let mut passed = *board;
    passed.pass();
    base - passed.legal_moves().len() as Score
}

/// Plain negamax searcher with node counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Negamax {
    /// Positions visited, root included.
    pub nodes: u64,
    /// Positions scored by the pass rule.
    pub passes: u64,
    /// Deepest ply reached below the root.
    pub max_ply: u8,
}

impl Negamax {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `board` for the side to move. The board is unchanged on return.
    pub fn evaluate(&mut self, board: &mut Board) -> Score {
        self.search(board, 0)
    }

    /// Score each legal move of `board`; counters accumulate across moves.
    pub fn analyse(&mut self, board: &mut Board) -> Analysis {
        let mut scores = [None; NUM_CELLS as usize];
        for cell in board.legal_moves() {
            let mut child = MoveGuard::new(board, cell);
            scores[cell.0 as usize] = Some(-self.search(&mut child, 1));
        }
        Analysis::from_scores(board, scores)
    }

    fn search(&mut self, board: &mut Board, ply: u8) -> Score {
        debug_assert!(ply <= NUM_CELLS);
        self.nodes += 1;
        self.max_ply = self.max_ply.max(ply);

        let mut best: Option<Score> = None;
        for cell in board.legal_moves() {
            let mut child = MoveGuard::new(board, cell);
            let score = -self.search(&mut child, ply + 1);
            best = Some(best.map_or(score, |b| b.max(score)));
        }

        match best {
            Some(score) => score,
            None => {
                self.passes += 1;
                score_after_pass(board)
            }
        }
    }
}

/// Score `board` for the side to move with a fresh [`Negamax`].
pub fn evaluate(board: &mut Board) -> Score {
    Negamax::new().evaluate(board)
}

/// Per-cell scores of a position, as shown by the analysis table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// Score of playing each cell, `None` where the move is illegal.
    pub scores: [Option<Score>; NUM_CELLS as usize],
    /// Score of the position: the best move, or the pass score.
    pub best: Score,
}

impl Analysis {
    /// Assemble an analysis from per-cell move scores.
    pub fn from_scores(board: &Board, scores: [Option<Score>; NUM_CELLS as usize]) -> Analysis {
        let best = scores
            .iter()
            .flatten()
            .copied()
            .max()
            .unwrap_or_else(|| score_after_pass(board));
        Analysis { scores, best }
    }

    /// Cells whose score equals the position score.
    pub fn best_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..NUM_CELLS)
            .filter(move |&i| self.scores[i as usize] == Some(self.best))
            .map(Cell)
    }
}

/// Score every legal move of `board` with the plain search.
pub fn analyse(board: &mut Board) -> Analysis {
    Negamax::new().analyse(board)
}
