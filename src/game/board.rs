use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::GameError;

/// Side length of the board
pub const BOARD_SIZE: usize = 8;

const BACK_RANK: [PieceKind; BOARD_SIZE] = [
    PieceKind::Rook,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Queen,
    PieceKind::King,
    PieceKind::Bishop,
    PieceKind::Knight,
    PieceKind::Rook,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row delta of a pawn step: white moves toward row 0, black toward row 7.
    pub fn pawn_direction(self) -> isize {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// Row on which this color's pawns start (and may double-step from).
    pub fn pawn_start_row(self) -> usize {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A piece value. Moving a piece places a copy on the destination; pieces
/// are never mutated in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    #[serde(rename = "type")]
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Piece {
        Piece { kind, color }
    }

    /// FEN letter: uppercase for white, lowercase for black.
    pub fn fen_char(self) -> char {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        Some(Piece::new(kind, color))
    }
}

/// True iff both coordinates are in `[0, 8)`.
pub fn is_on_board(row: isize, col: isize) -> bool {
    (0..BOARD_SIZE as isize).contains(&row) && (0..BOARD_SIZE as isize).contains(&col)
}

/// Grid position. Row 0 is rank 8 (black's back rank), row 7 is rank 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(row: usize, col: usize) -> Option<Coord> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Coord { row, col })
    }

    /// The square `(dr, dc)` away, if it is still on the board.
    pub fn offset(self, dr: isize, dc: isize) -> Option<Coord> {
        let row = self.row as isize + dr;
        let col = self.col as isize + dc;
        is_on_board(row, col).then(|| Coord {
            row: row as usize,
            col: col as usize,
        })
    }

    /// Iterates every square, row by row from rank 8 down to rank 1.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Coord { row, col }))
    }
}

/// Parses algebraic square text such as `"e4"`.
pub fn square_to_coord(square: &str) -> Result<Coord, GameError> {
    match square.as_bytes() {
        [file @ b'a'..=b'h', rank @ b'1'..=b'8'] => Ok(Coord {
            row: (b'8' - rank) as usize,
            col: (file - b'a') as usize,
        }),
        _ => Err(GameError::InvalidSquare(square.to_string())),
    }
}

pub fn coord_to_square(coord: Coord) -> String {
    let file = (b'a' + coord.col as u8) as char;
    let rank = (b'8' - coord.row as u8) as char;
    format!("{file}{rank}")
}

impl FromStr for Coord {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        square_to_coord(s)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&coord_to_square(*self))
    }
}

impl From<Coord> for String {
    fn from(coord: Coord) -> String {
        coord_to_square(coord)
    }
}

/// 8x8 grid of optional pieces.
///
/// `Board` is a plain `Copy` value: speculative positions are produced with
/// [`Board::with_move`], which leaves `self` untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn empty() -> Board {
        Board {
            cells: [[None; BOARD_SIZE]; BOARD_SIZE],
        }
    }

    /// Standard chess starting arrangement.
    pub fn standard() -> Board {
        let mut board = Board::empty();
        for (col, kind) in BACK_RANK.into_iter().enumerate() {
            board.cells[0][col] = Some(Piece::new(kind, Color::Black));
            board.cells[1][col] = Some(Piece::new(PieceKind::Pawn, Color::Black));
            board.cells[6][col] = Some(Piece::new(PieceKind::Pawn, Color::White));
            board.cells[7][col] = Some(Piece::new(kind, Color::White));
        }
        board
    }

    pub fn get(&self, coord: Coord) -> Option<Piece> {
        self.cells[coord.row][coord.col]
    }

    pub fn set(&mut self, coord: Coord, piece: Option<Piece>) {
        self.cells[coord.row][coord.col] = piece;
    }

    /// Moves whatever stands on `from` to `to`, overwriting the destination.
    /// Returns the piece that was captured, if any.
    pub fn apply_move(&mut self, from: Coord, to: Coord) -> Option<Piece> {
        let moving = self.cells[from.row][from.col].take();
        std::mem::replace(&mut self.cells[to.row][to.col], moving)
    }

    /// Copy of this board with the move applied.
    pub fn with_move(&self, from: Coord, to: Coord) -> Board {
        let mut next = *self;
        next.apply_move(from, to);
        next
    }

    /// All occupied squares.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        Coord::all().filter_map(move |coord| self.get(coord).map(|piece| (coord, piece)))
    }

    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        self.pieces().filter(move |(_, piece)| piece.color == color)
    }

    /// FEN piece-placement field, rank 8 first.
    pub fn placement(&self) -> String {
        let mut out = String::new();
        for (row, cells) in self.cells.iter().enumerate() {
            let mut empty = 0;
            for cell in cells {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if row + 1 < BOARD_SIZE {
                out.push('/');
            }
        }
        out
    }

    /// Parses a FEN piece-placement field (the part before the first space).
    pub fn from_placement(placement: &str) -> Result<Board, GameError> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE {
            return Err(GameError::InvalidPlacement(format!(
                "expected {BOARD_SIZE} ranks, found {}",
                rows.len()
            )));
        }

        let mut board = Board::empty();
        for (row, text) in rows.into_iter().enumerate() {
            let mut col = 0;
            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                    continue;
                }
                let piece = Piece::from_fen_char(c).ok_or_else(|| {
                    GameError::InvalidPlacement(format!("unknown piece letter {c:?}"))
                })?;
                let coord = Coord::new(row, col).ok_or_else(|| {
                    GameError::InvalidPlacement(format!("rank {} is too long", BOARD_SIZE - row))
                })?;
                board.set(coord, Some(piece));
                col += 1;
            }
            if col != BOARD_SIZE {
                return Err(GameError::InvalidPlacement(format!(
                    "rank {} covers {col} files",
                    BOARD_SIZE - row
                )));
            }
        }
        Ok(board)
    }
}
