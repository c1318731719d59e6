use log::{debug, info, warn};
use serde::Serialize;

use crate::game::board::{Board, Color, Coord, Piece, PieceKind};
use crate::game::rules;
use crate::models::messages::{RoomSnapshot, RoomSummary};
use crate::models::GameError;

/// A seated player with no activity for longer than this loses the game.
pub const DISCONNECT_TIMEOUT_MS: u64 = 30_000;

pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Winner::White,
            Color::Black => Winner::Black,
        }
    }
}

/// One value per seat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Seats<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub black: Option<T>,
}

impl<T> Seats<T> {
    pub fn get(&self, color: Color) -> Option<&T> {
        match color {
            Color::White => self.white.as_ref(),
            Color::Black => self.black.as_ref(),
        }
    }

    fn slot_mut(&mut self, color: Color) -> &mut Option<T> {
        match color {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }

    pub fn count(&self) -> usize {
        self.white.is_some() as usize + self.black.is_some() as usize
    }
}

/// An accepted move, with the check state it produced for the opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRecord {
    pub from: Coord,
    pub to: Coord,
    pub piece: Piece,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<Piece>,
    pub is_check: bool,
    pub is_checkmate: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LastMove {
    pub from: Coord,
    pub to: Coord,
    pub timestamp: u64,
}

/// Authoritative state of one game.
///
/// Fields are only changed through [`Room::join`], [`Room::heartbeat`],
/// [`Room::check_disconnect`] and [`Room::make_move`]. Each of them either
/// succeeds or returns an error having changed nothing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    id: String,
    name: String,
    creator: String,
    board: Board,
    current_player: Color,
    players: Seats<String>,
    status: RoomStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    winner: Option<Winner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disconnected_player: Option<Color>,
    move_history: Vec<MoveRecord>,
    last_activity: Seats<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_move: Option<LastMove>,
    is_check: bool,
    is_checkmate: bool,
    is_stalemate: bool,
}

impl Room {
    /// New room with the creator seated as white, waiting for an opponent.
    pub fn new(id: String, name: String, creator: String, now: u64) -> Room {
        info!("Room {} ({:?}) created by {}", id, name, creator);
        Room {
            id,
            name,
            board: Board::standard(),
            current_player: Color::White,
            players: Seats {
                white: Some(creator.clone()),
                black: None,
            },
            creator,
            status: RoomStatus::Waiting,
            winner: None,
            disconnected_player: None,
            move_history: Vec::new(),
            last_activity: Seats {
                white: Some(now),
                black: None,
            },
            last_move: None,
            is_check: false,
            is_checkmate: false,
            is_stalemate: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn players(&self) -> &Seats<String> {
        &self.players
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn disconnected_player(&self) -> Option<Color> {
        self.disconnected_player
    }

    pub fn move_history(&self) -> &[MoveRecord] {
        &self.move_history
    }

    pub fn last_activity(&self) -> &Seats<u64> {
        &self.last_activity
    }

    pub fn last_move(&self) -> Option<LastMove> {
        self.last_move
    }

    pub fn is_check(&self) -> bool {
        self.is_check
    }

    pub fn is_checkmate(&self) -> bool {
        self.is_checkmate
    }

    pub fn is_stalemate(&self) -> bool {
        self.is_stalemate
    }

    /// Seat occupied by `player`, if any.
    pub fn seat_of(&self, player: &str) -> Option<Color> {
        [Color::White, Color::Black]
            .into_iter()
            .find(|&color| self.players.get(color).is_some_and(|name| name == player))
    }

    /// Seats `player`, or returns the seat they already hold.
    ///
    /// Taking the black seat while white is present starts the game. Rejoining
    /// a finished room reports the seat without touching any state.
    pub fn join(&mut self, player: &str, now: u64) -> Result<Color, GameError> {
        if let Some(color) = self.seat_of(player) {
            if self.status != RoomStatus::Finished {
                *self.last_activity.slot_mut(color) = Some(now);
            }
            debug!("{} rejoined room {} as {}", player, self.id, color);
            return Ok(color);
        }

        if self.players.black.is_some() {
            warn!("{} cannot join room {}: room is full", player, self.id);
            return Err(GameError::RoomFull);
        }

        self.players.black = Some(player.to_string());
        self.last_activity.black = Some(now);
        info!("{} joined room {} as black", player, self.id);

        if self.players.white.is_some() && self.status == RoomStatus::Waiting {
            self.status = RoomStatus::Playing;
            info!("Room {}: game started", self.id);
        }
        Ok(Color::Black)
    }

    /// Refreshes the activity timestamp of `player`'s seat.
    pub fn heartbeat(&mut self, player: &str, now: u64) -> Result<Color, GameError> {
        let color = self
            .seat_of(player)
            .ok_or_else(|| GameError::PlayerNotFound(player.to_string()))?;
        *self.last_activity.slot_mut(color) = Some(now);
        Ok(color)
    }

    /// Ends a game in progress if a seated player has been silent for longer
    /// than [`DISCONNECT_TIMEOUT_MS`]. White is checked before black, so when
    /// both are stale white is the one declared disconnected.
    ///
    /// Returns true only when this call finished the game.
    pub fn check_disconnect(&mut self, now: u64) -> bool {
        if self.status != RoomStatus::Playing {
            return false;
        }

        let stale = [Color::White, Color::Black].into_iter().find(|&color| {
            self.players.get(color).is_some()
                && self
                    .last_activity
                    .get(color)
                    .is_some_and(|&seen| now.saturating_sub(seen) > DISCONNECT_TIMEOUT_MS)
        });

        match stale {
            Some(color) => {
                info!("Room {}: {} disconnected", self.id, color);
                self.finish(color.opponent().into(), Some(color));
                true
            }
            None => false,
        }
    }

    /// Fully-legal destinations for the piece on `from`.
    pub fn legal_moves(&self, from: Coord) -> Vec<Coord> {
        rules::legal_moves(&self.board, from)
    }

    /// Plays `from -> to` for `player` and recomputes check state for the
    /// side now to move.
    pub fn make_move(
        &mut self,
        from: Coord,
        to: Coord,
        player: &str,
        now: u64,
    ) -> Result<MoveRecord, GameError> {
        if self.status != RoomStatus::Playing {
            return Err(GameError::GameNotInProgress);
        }

        let mover = self
            .seat_of(player)
            .filter(|&color| color == self.current_player)
            .ok_or(GameError::NotYourTurn)?;

        let piece = self
            .board
            .get(from)
            .ok_or_else(|| GameError::NoPieceAtSource(from.to_string()))?;

        if piece.color != mover || !rules::is_legal_move(&self.board, from, to) {
            return Err(GameError::IllegalMove {
                from: from.to_string(),
                to: to.to_string(),
            });
        }

        let captured = self.board.apply_move(from, to);
        let next = mover.opponent();
        self.current_player = next;

        let king_present = rules::find_king(&self.board, next).is_some();
        self.is_check = rules::is_in_check(&self.board, next);
        self.is_checkmate = rules::is_checkmate(&self.board, next);
        self.is_stalemate = rules::is_stalemate(&self.board, next);

        let record = MoveRecord {
            from,
            to,
            piece,
            captured,
            is_check: self.is_check,
            is_checkmate: self.is_checkmate,
            timestamp: now,
        };
        self.move_history.push(record.clone());
        self.last_move = Some(LastMove {
            from,
            to,
            timestamp: now,
        });
        *self.last_activity.slot_mut(mover) = Some(now);
        info!("Room {}: {} played {}-{}", self.id, mover, from, to);

        if self.is_checkmate {
            info!("Room {}: checkmate, {} wins", self.id, mover);
            self.finish(mover.into(), None);
        } else if !king_present {
            info!("Room {}: {} king captured, {} wins", self.id, next, mover);
            self.finish(mover.into(), None);
        } else if self.is_stalemate {
            info!("Room {}: stalemate", self.id);
            self.finish(Winner::Draw, None);
        } else if self.is_check {
            info!("Room {}: {} is in check", self.id, next);
        }

        Ok(record)
    }

    /// FEN of the current position. Castling and en passant are never
    /// available here, so those fields are always `-`.
    pub fn fen(&self) -> String {
        let side = match self.current_player {
            Color::White => 'w',
            Color::Black => 'b',
        };
        let halfmove_clock = self
            .move_history
            .iter()
            .rev()
            .take_while(|record| record.piece.kind != PieceKind::Pawn && record.captured.is_none())
            .count();
        let fullmove = 1 + self.move_history.len() / 2;
        format!(
            "{} {} - - {} {}",
            self.board.placement(),
            side,
            halfmove_clock,
            fullmove
        )
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            fen: self.fen(),
            room: self.clone(),
        }
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            creator: self.creator.clone(),
            player_count: self.players.count(),
            max_players: MAX_PLAYERS,
            status: self.status,
        }
    }

    fn finish(&mut self, winner: Winner, disconnected: Option<Color>) {
        self.status = RoomStatus::Finished;
        self.winner = Some(winner);
        self.disconnected_player = disconnected;
    }
}
