//! Move generation and check detection over a [`Board`].
//!
//! Two layers: *pseudo-legal* moves follow each piece's movement pattern and
//! board occupancy only; *legal* moves are the pseudo-legal ones that do not
//! leave the mover's own king attacked. Attack detection always uses the
//! pseudo-legal layer so the two never recurse into each other.
//!
//! Castling, en passant and promotion are not part of this rule set: a pawn
//! that reaches the last rank stays a pawn.

use super::board::{Board, Color, Coord, PieceKind};

const KNIGHT_OFFSETS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const ORTHOGONALS: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const DIAGONALS: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Queen rays and king steps.
const ALL_DIRECTIONS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Destinations the piece on `from` could reach ignoring king safety.
/// Empty if `from` is empty.
pub fn pseudo_legal_moves(board: &Board, from: Coord) -> Vec<Coord> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    let color = piece.color;
    match piece.kind {
        PieceKind::Pawn => pawn_moves(board, from, color),
        PieceKind::Knight => step_moves(board, from, color, &KNIGHT_OFFSETS),
        PieceKind::Bishop => slide_moves(board, from, color, &DIAGONALS),
        PieceKind::Rook => slide_moves(board, from, color, &ORTHOGONALS),
        PieceKind::Queen => slide_moves(board, from, color, &ALL_DIRECTIONS),
        PieceKind::King => step_moves(board, from, color, &ALL_DIRECTIONS),
    }
}

/// Destinations the piece on `from` may legally move to.
pub fn legal_moves(board: &Board, from: Coord) -> Vec<Coord> {
    let Some(piece) = board.get(from) else {
        return Vec::new();
    };
    pseudo_legal_moves(board, from)
        .into_iter()
        .filter(|&to| !would_be_in_check(board, from, to, piece.color))
        .collect()
}

pub fn is_legal_move(board: &Board, from: Coord, to: Coord) -> bool {
    legal_moves(board, from).contains(&to)
}

/// Every legal `(from, to)` pair for `color`, generated lazily.
pub fn all_legal_moves(board: &Board, color: Color) -> impl Iterator<Item = (Coord, Coord)> + '_ {
    board.pieces_of(color).flat_map(move |(from, _)| {
        legal_moves(board, from)
            .into_iter()
            .map(move |to| (from, to))
    })
}

/// Whether `color`'s king would be attacked after playing `from -> to`.
/// Works on a copy; `board` is not modified.
pub fn would_be_in_check(board: &Board, from: Coord, to: Coord, color: Color) -> bool {
    is_in_check(&board.with_move(from, to), color)
}

pub fn find_king(board: &Board, color: Color) -> Option<Coord> {
    board
        .pieces_of(color)
        .find(|(_, piece)| piece.kind == PieceKind::King)
        .map(|(coord, _)| coord)
}

/// True iff some piece of color `by` could capture on `target`.
///
/// Pawns only attack diagonally onto occupied squares, so this is meant for
/// squares holding a piece of the other color (the king's square).
pub fn is_square_attacked(board: &Board, target: Coord, by: Color) -> bool {
    board
        .pieces_of(by)
        .any(|(from, _)| pseudo_legal_moves(board, from).contains(&target))
}

/// A color without a king on the board is reported as not in check.
pub fn is_in_check(board: &Board, color: Color) -> bool {
    match find_king(board, color) {
        Some(king) => is_square_attacked(board, king, color.opponent()),
        None => false,
    }
}

pub fn has_any_legal_move(board: &Board, color: Color) -> bool {
    all_legal_moves(board, color).next().is_some()
}

pub fn is_checkmate(board: &Board, color: Color) -> bool {
    is_in_check(board, color) && !has_any_legal_move(board, color)
}

/// King present, not in check, and nothing to move.
pub fn is_stalemate(board: &Board, color: Color) -> bool {
    find_king(board, color).is_some()
        && !is_in_check(board, color)
        && !has_any_legal_move(board, color)
}

fn can_land(board: &Board, to: Coord, color: Color) -> bool {
    board.get(to).map_or(true, |occupant| occupant.color != color)
}

fn pawn_moves(board: &Board, from: Coord, color: Color) -> Vec<Coord> {
    let dir = color.pawn_direction();
    let mut moves = Vec::new();

    if let Some(one) = from.offset(dir, 0).filter(|&c| board.get(c).is_none()) {
        moves.push(one);
        if from.row == color.pawn_start_row() {
            if let Some(two) = from.offset(2 * dir, 0).filter(|&c| board.get(c).is_none()) {
                moves.push(two);
            }
        }
    }

    for dc in [-1, 1] {
        if let Some(target) = from.offset(dir, dc) {
            if board.get(target).is_some_and(|p| p.color != color) {
                moves.push(target);
            }
        }
    }

    moves
}

fn step_moves(board: &Board, from: Coord, color: Color, offsets: &[(isize, isize)]) -> Vec<Coord> {
    offsets
        .iter()
        .filter_map(|&(dr, dc)| from.offset(dr, dc))
        .filter(|&to| can_land(board, to, color))
        .collect()
}

fn slide_moves(board: &Board, from: Coord, color: Color, directions: &[(isize, isize)]) -> Vec<Coord> {
    let mut moves = Vec::new();
    for &(dr, dc) in directions {
        let mut cur = from;
        while let Some(next) = cur.offset(dr, dc) {
            match board.get(next) {
                None => moves.push(next),
                Some(occupant) => {
                    if occupant.color != color {
                        moves.push(next);
                    }
                    break;
                }
            }
            cur = next;
        }
    }
    moves
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Piece;
    use std::collections::BTreeSet;
    use std::str::FromStr;

    fn sq(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn squares(coords: &[Coord]) -> BTreeSet<String> {
        coords.iter().map(|c| c.to_string()).collect()
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn position(placement: &str) -> Board {
        Board::from_placement(placement).unwrap()
    }

    fn side_char(color: Color) -> &'static str {
        match color {
            Color::White => "w",
            Color::Black => "b",
        }
    }

    fn our_moves(board: &Board, side: Color) -> BTreeSet<(String, String)> {
        all_legal_moves(board, side)
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    /// Legal (from, to) pairs according to the `chess` crate. Promotion
    /// choices collapse into one destination.
    fn oracle_moves(board: &Board, side: Color) -> BTreeSet<(String, String)> {
        let fen = format!("{} {} - - 0 1", board.placement(), side_char(side));
        let oracle = chess::Board::from_str(&fen).unwrap();
        chess::MoveGen::new_legal(&oracle)
            .map(|m| (m.get_source().to_string(), m.get_dest().to_string()))
            .collect()
    }

    fn assert_matches_oracle(placement: &str, side: Color) {
        let board = position(placement);
        assert_eq!(
            our_moves(&board, side),
            oracle_moves(&board, side),
            "move sets differ for {placement} ({side} to move)"
        );
        let fen = format!("{placement} {} - - 0 1", side_char(side));
        let oracle = chess::Board::from_str(&fen).unwrap();
        assert_eq!(is_in_check(&board, side), oracle.checkers().popcnt() > 0);
        assert_eq!(
            is_checkmate(&board, side),
            oracle.status() == chess::BoardStatus::Checkmate
        );
        assert_eq!(
            is_stalemate(&board, side),
            oracle.status() == chess::BoardStatus::Stalemate
        );
    }

    #[test]
    fn opening_position_has_twenty_moves() {
        let board = Board::standard();
        assert_eq!(all_legal_moves(&board, Color::White).count(), 20);
        assert_eq!(all_legal_moves(&board, Color::Black).count(), 20);
        assert_eq!(squares(&legal_moves(&board, sq("e2"))), set(&["e3", "e4"]));
        assert_eq!(squares(&legal_moves(&board, sq("g1"))), set(&["f3", "h3"]));
        assert!(legal_moves(&board, sq("a1")).is_empty());
        assert!(legal_moves(&board, sq("e4")).is_empty());
    }

    #[test]
    fn black_pawns_move_toward_higher_rows() {
        let board = Board::standard();
        assert_eq!(squares(&legal_moves(&board, sq("d7"))), set(&["d6", "d5"]));
    }

    #[test]
    fn pawn_double_step_needs_both_squares_empty() {
        let board = position("4k3/8/8/8/8/4n3/4P3/4K3");
        assert!(legal_moves(&board, sq("e2")).is_empty());

        let board = position("4k3/8/8/8/4n3/8/4P3/4K3");
        assert_eq!(squares(&legal_moves(&board, sq("e2"))), set(&["e3"]));
    }

    #[test]
    fn pawn_captures_only_diagonally_onto_enemies() {
        let board = position("4k3/8/8/3p1P2/4P3/8/8/4K3");
        assert_eq!(squares(&legal_moves(&board, sq("e4"))), set(&["e5", "d5"]));
    }

    #[test]
    fn pawn_on_last_rank_has_no_moves() {
        let board = position("P3k3/8/8/8/8/8/8/4K3");
        assert!(pseudo_legal_moves(&board, sq("a8")).is_empty());
        assert_eq!(
            board.get(sq("a8")),
            Some(Piece::new(PieceKind::Pawn, Color::White))
        );
    }

    #[test]
    fn sliders_stop_at_first_piece() {
        let board = position("4k3/8/8/1p6/8/8/8/RN2K3");
        assert_eq!(
            squares(&pseudo_legal_moves(&board, sq("a1"))),
            set(&["a2", "a3", "a4", "a5", "a6", "a7", "a8"])
        );

        let board = position("4k3/8/8/1p6/8/3B4/8/4K3");
        assert_eq!(
            squares(&pseudo_legal_moves(&board, sq("d3"))),
            set(&["c4", "b5", "e4", "f5", "g6", "h7", "c2", "b1", "e2", "f1"])
        );
    }

    #[test]
    fn pinned_piece_cannot_leave_the_line() {
        // White knight on e2 is pinned against the king by the rook on e8.
        let board = position("4r2k/8/8/8/8/8/4N3/4K3");
        assert!(!pseudo_legal_moves(&board, sq("e2")).is_empty());
        assert!(legal_moves(&board, sq("e2")).is_empty());
        assert!(would_be_in_check(&board, sq("e2"), sq("c3"), Color::White));
    }

    #[test]
    fn king_cannot_step_into_attack() {
        let board = position("7k/8/8/8/8/8/r7/4K3");
        assert_eq!(
            squares(&legal_moves(&board, sq("e1"))),
            set(&["d1", "f1"])
        );
    }

    #[test]
    fn check_and_checkmate_detection() {
        // Fool's mate final position.
        let board = position("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR");
        assert!(is_in_check(&board, Color::White));
        assert!(is_checkmate(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
        assert!(!has_any_legal_move(&board, Color::White));
        for (from, _) in board.pieces_of(Color::White) {
            assert!(legal_moves(&board, from).is_empty());
        }
    }

    #[test]
    fn check_with_escape_is_not_mate() {
        let board = position("4k3/8/8/8/8/8/8/r3K3");
        assert!(is_in_check(&board, Color::White));
        assert!(!is_checkmate(&board, Color::White));
        assert_eq!(
            squares(&legal_moves(&board, sq("e1"))),
            set(&["d2", "e2", "f2"])
        );
    }

    #[test]
    fn stalemate_is_not_check() {
        let board = position("7k/5Q2/6K1/8/8/8/8/8");
        assert!(!is_in_check(&board, Color::Black));
        assert!(!is_checkmate(&board, Color::Black));
        assert!(is_stalemate(&board, Color::Black));
    }

    #[test]
    fn missing_king_is_not_in_check() {
        let board = position("8/8/8/8/8/8/8/q3K3");
        assert_eq!(find_king(&board, Color::Black), None);
        assert!(!is_in_check(&board, Color::Black));
        assert!(!is_stalemate(&board, Color::Black));
        assert_eq!(find_king(&board, Color::White), Some(sq("e1")));
    }

    #[test]
    fn speculation_never_touches_the_board() {
        let board = position("4r2k/8/8/8/8/8/4N3/4K3");
        let before = board;
        let _ = legal_moves(&board, sq("e2"));
        let _ = is_checkmate(&board, Color::White);
        assert_eq!(board, before);
    }

    #[test]
    fn agrees_with_reference_generator() {
        let positions = [
            ("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR", Color::White),
            ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R", Color::White),
            ("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R", Color::Black),
            ("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8", Color::White),
            ("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1", Color::White),
            ("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R", Color::White),
            ("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR", Color::White),
            ("7k/5Q2/6K1/8/8/8/8/8", Color::Black),
        ];
        for (placement, side) in positions {
            assert_matches_oracle(placement, side);
        }
    }

    #[test]
    fn agrees_with_reference_generator_through_a_game() {
        let moves = [
            ("e2", "e4"),
            ("e7", "e5"),
            ("g1", "f3"),
            ("b8", "c6"),
            ("f1", "c4"),
            ("f8", "c5"),
            ("c2", "c3"),
            ("g8", "f6"),
            ("d2", "d4"),
            ("e5", "d4"),
            ("c3", "d4"),
            ("c5", "b4"),
            ("c1", "d2"),
            ("b4", "d2"),
            ("b1", "d2"),
            ("d7", "d5"),
            ("e4", "d5"),
            ("f6", "d5"),
            ("d1", "b3"),
            ("c6", "e7"),
        ];
        let mut board = Board::standard();
        let mut side = Color::White;
        for (from, to) in moves {
            assert_matches_oracle(&board.placement(), side);
            assert!(
                is_legal_move(&board, sq(from), sq(to)),
                "{from}-{to} should be legal"
            );
            board.apply_move(sq(from), sq(to));
            side = side.opponent();
        }
        assert_matches_oracle(&board.placement(), side);
    }
}
