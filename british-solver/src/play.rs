//! Interactive play on a line-based reader.
//!
//! Each line holds one or more cells (`"5"`, `"5 10"`, `"5,10"`). Bad input is
//! reported and the prompt repeats. A side with no legal placement passes
//! automatically, and the game ends when neither side can place a stone.

use std::io::{self, BufRead, Write};

use british_core::{parse_moves, Board, Side};
use log::debug;

use crate::render::PlayGrid;

/// How an interactive session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Neither side can place a stone.
    Finished,
    /// Input ran out or the player typed `q`.
    Abandoned,
}

/// Pass for a stuck side to move. Returns true when neither side can move.
fn settle<W: Write>(board: &mut Board, out: &mut W) -> io::Result<bool> {
    if board.legal_moves().mask() != 0 {
        return Ok(false);
    }
    let stuck = board.side_to_move();
    if board.legal_moves_for(stuck.opponent()).mask() == 0 {
        return Ok(true);
    }
    writeln!(out, "{} cannot move and passes", stuck.mark())?;
    board.pass();
    Ok(false)
}

/// Play from `board` with moves read from `input`, writing the board and
/// prompts to `out`.
pub fn play_game<R: BufRead, W: Write>(
    board: &mut Board,
    input: R,
    mut out: W,
) -> io::Result<Outcome> {
    let mut lines = input.lines();
    loop {
        if settle(board, &mut out)? {
            write!(out, "{}", PlayGrid(board))?;
            writeln!(
                out,
                "Game over: O {} stones, X {} stones",
                board.stones(Side::A).count_ones(),
                board.stones(Side::B).count_ones()
            )?;
            return Ok(Outcome::Finished);
        }

        write!(out, "{}", PlayGrid(board))?;
        write!(out, "{} to move: ", board.side_to_move().mark())?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            return Ok(Outcome::Abandoned);
        };
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
            return Ok(Outcome::Abandoned);
        }

        let cells = match parse_moves(line) {
            Ok(cells) => cells,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };
        for cell in cells {
            if settle(board, &mut out)? {
                break;
            }
            if let Err(e) = board.try_apply(cell) {
                writeln!(out, "{}", e)?;
                break;
            }
            debug!("played {} -> {:#x}", cell, board.to_u64());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(board: &mut Board, input: &str) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = play_game(board, input.as_bytes(), &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_moves_are_applied_in_turn() {
        let mut board = Board::new();
        let (outcome, out) = run(&mut board, "5\n10 0\n");
        assert_eq!(outcome, Outcome::Abandoned);
        assert_eq!(board, Board::play(&[5, 10, 0]).unwrap());
        assert!(out.contains("X to move: "));
        assert!(out.ends_with("X to move: \n"));
    }

    #[test]
    fn test_bad_input_is_reported_and_skipped() {
        let mut board = Board::new();
        let (outcome, out) = run(&mut board, "5\n6\n17\nfive\n5\nq\n0\n");
        assert_eq!(outcome, Outcome::Abandoned);
        // only the first move stuck; `q` stops before the final 0
        assert_eq!(board, Board::play(&[5]).unwrap());
        assert!(out.contains("cell 6 is next to an opponent stone"));
        assert!(out.contains("cell 17 is outside the 4x4 board"));
        assert!(out.contains("cannot parse move \"five\""));
        assert!(out.contains("cell 5 is already occupied"));
    }

    #[test]
    fn test_stuck_side_passes_until_game_over() {
        // A: 0 4 5 15   B: 2 3 10 12, A to move and stuck; B may play 7 or 13.
        let mut board = Board::play(&[0, 2, 4, 3, 5, 10, 15, 12]).unwrap();
        let (outcome, out) = run(&mut board, "7 13\n");
        assert_eq!(outcome, Outcome::Finished);
        assert_eq!(out.matches("O cannot move and passes").count(), 2);
        assert!(out.contains("Game over: O 4 stones, X 6 stones"));
        assert_eq!(board.stone_count(), 10);
    }
}
