//! Memoized negamax solver.
//!
//! Same recursion and pass rule as `british_core::Negamax`, with a table of
//! solved positions keyed by their canonical encoding. Symmetric positions
//! share an entry, so the 88M-node game tree from the empty board collapses
//! to 8,659 stored positions. Scores are identical to the plain search.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use british_core::{score_after_pass, Analysis, Board, MoveGuard, Score, NUM_CELLS};
use log::debug;

use crate::stats::SolverStats;

/// Default seconds between progress lines.
pub const DEFAULT_LOG_INTERVAL_SECS: u64 = 5;

/// Negamax solver with transposition table.
pub struct Solver {
    /// Transposition table: canonical position -> score for the side to move
    pub table: HashMap<u64, i8>,
    /// Solver statistics
    pub stats: SolverStats,
    log_interval_secs: u64,
}

impl Solver {
    pub fn new() -> Self {
        Self::with_log_interval(DEFAULT_LOG_INTERVAL_SECS)
    }

    pub fn with_log_interval(log_interval_secs: u64) -> Self {
        Self {
            table: HashMap::new(),
            stats: SolverStats::new(),
            log_interval_secs,
        }
    }

    /// Seed the table, e.g. from a checkpoint.
    pub fn load_entries(&mut self, entries: impl IntoIterator<Item = (u64, i8)>) {
        self.table.extend(entries);
    }

    /// Score `board` for the side to move.
    ///
    /// Returns None if `running` was cleared before the search finished.
    /// The board is restored either way.
    pub fn solve(&mut self, board: &mut Board, running: &AtomicBool) -> Option<Score> {
        self.search(board, 0, running)
    }

    /// Score each legal move of `board`, as `british_core::analyse` does.
    pub fn analyse(&mut self, board: &mut Board, running: &AtomicBool) -> Option<Analysis> {
        let mut scores = [None; NUM_CELLS as usize];
        for cell in board.legal_moves() {
            let mut child = MoveGuard::new(board, cell);
            scores[cell.0 as usize] = Some(-self.search(&mut child, 1, running)?);
        }
        Some(Analysis::from_scores(board, scores))
    }

    fn search(&mut self, board: &mut Board, ply: u64, running: &AtomicBool) -> Option<Score> {
        if !running.load(Ordering::Relaxed) {
            return None;
        }

        let canonical = board.canonical();
        if let Some(&score) = self.table.get(&canonical) {
            self.stats.cache_hits += 1;
            return Some(Score::from(score));
        }

        if self.stats.should_log(self.log_interval_secs) {
            self.stats.log_progress(self.table.len());
        }

        let mut best: Option<Score> = None;
        for cell in board.legal_moves() {
            let mut child = MoveGuard::new(board, cell);
            let score = -self.search(&mut child, ply + 1, running)?;
            best = Some(best.map_or(score, |b| b.max(score)));
        }

        let score = match best {
            Some(score) => score,
            None => {
                self.stats.record_pass();
                score_after_pass(board)
            }
        };

        // |score| <= 17 on a 4x4 board
        debug_assert!(i8::try_from(score).is_ok());
        self.table.insert(canonical, score as i8);
        self.stats.record_position(ply);
        if ply == 0 {
            debug!("solved {:#x} = {}", canonical, score);
        }
        Some(score)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
