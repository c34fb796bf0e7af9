//! Rule and search properties over random reachable positions.

use british_core::{evaluate, score_after_pass, Board, Cell, MoveGuard, Negamax, Score};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Play up to `plies` random legal moves from the empty board.
fn random_position(rng: &mut StdRng, plies: usize) -> Board {
    let mut board = Board::new();
    for _ in 0..plies {
        let moves: Vec<Cell> = board.legal_moves().collect();
        if moves.is_empty() {
            break;
        }
        board.apply_move(moves[rng.random_range(0..moves.len())]);
    }
    board
}

/// Legality written out cell by cell from row/column arithmetic.
fn is_legal_by_hand(board: &Board, cell: Cell) -> bool {
    if board.owner(cell).is_some() {
        return false;
    }
    let opp = board.side_to_move().opponent();
    let (row, col) = (cell.row() as i8, cell.col() as i8);
    [(-1, 0), (1, 0), (0, -1), (0, 1)].iter().all(|&(dr, dc)| {
        let (r, c) = (row + dr, col + dc);
        if !(0..4).contains(&r) || !(0..4).contains(&c) {
            return true;
        }
        board.owner(Cell::from_row_col(r as u8, c as u8)) != Some(opp)
    })
}

#[test]
fn test_legality_matches_hand_rule() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..500 {
        let plies = rng.random_range(0..12);
        let board = random_position(&mut rng, plies);
        let listed: Vec<Cell> = board.legal_moves().collect();
        for cell in Cell::all() {
            let expected = is_legal_by_hand(&board, cell);
            assert_eq!(board.is_valid_move(cell), expected, "{board}cell {cell}");
            assert_eq!(listed.contains(&cell), expected, "{board}cell {cell}");
        }
    }
}

#[test]
fn test_apply_undo_restores_every_reachable_board() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..200 {
        let mut board = Board::new();
        loop {
            let before = board;
            for cell in board.legal_moves() {
                board.apply_move(cell);
                assert_ne!(board.side_to_move(), before.side_to_move());
                board.undo_move(cell);
                assert_eq!(board, before);
                assert_eq!(board.to_u64(), before.to_u64());
            }
            let moves: Vec<Cell> = board.legal_moves().collect();
            if moves.is_empty() {
                break;
            }
            board.apply_move(moves[rng.random_range(0..moves.len())]);
        }
    }
}

#[test]
fn test_negamax_recurrence_holds() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..40 {
        let plies = rng.random_range(6..11);
        let mut board = random_position(&mut rng, plies);
        let value = evaluate(&mut board);

        let mut children: Vec<Score> = Vec::new();
        for cell in board.legal_moves() {
            let mut child = MoveGuard::new(&mut board, cell);
            children.push(-evaluate(&mut child));
        }
        let expected = children
            .into_iter()
            .max()
            .unwrap_or_else(|| score_after_pass(&board));
        assert_eq!(value, expected, "{board}");
    }
}

#[test]
fn test_search_depth_is_bounded() {
    let mut rng = StdRng::seed_from_u64(31);
    for _ in 0..40 {
        let plies = rng.random_range(4..10);
        let mut board = random_position(&mut rng, plies);
        let before = board;
        let mut search = Negamax::new();
        search.evaluate(&mut board);
        assert_eq!(board, before);
        assert!(u32::from(search.max_ply) + board.stone_count() <= 16);
        assert!(search.passes >= 1);
    }
}

#[test]
fn test_symmetric_positions_score_alike() {
    let mut rng = StdRng::seed_from_u64(47);
    for _ in 0..20 {
        let plies = rng.random_range(6..11);
        let mut board = random_position(&mut rng, plies);
        let value = evaluate(&mut board);
        for t in 1..Board::NUM_TRANSFORMS {
            let mut image = Board::from_u64(board.transform(t)).unwrap();
            assert_eq!(image.canonical(), board.canonical());
            assert_eq!(evaluate(&mut image), value, "{board}transform {t}");
        }
    }
}
