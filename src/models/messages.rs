use serde::{Deserialize, Serialize};

use crate::game::board::{Color, Coord};
use crate::models::room::{Room, RoomStatus};

/// Body of a room-creation request
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub room_name: String,
    #[serde(default)]
    pub player_name: String,
}

/// Body of join and heartbeat requests
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRequest {
    #[serde(default)]
    pub player_name: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub player_name: String,
}

/// Query string of the legal-moves lookup
#[derive(Deserialize, Debug, Clone)]
pub struct MovesQuery {
    pub from: String,
}

/// Full state of one room as seen by clients
#[derive(Serialize, Debug, Clone)]
pub struct RoomSnapshot {
    #[serde(flatten)]
    pub room: Room,
    pub fen: String,
}

/// Lobby entry
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub creator: String,
    pub player_count: usize,
    pub max_players: usize,
    pub status: RoomStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomCreated {
    pub room_id: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct RoomList {
    pub rooms: Vec<RoomSummary>,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub game_state: RoomSnapshot,
}

#[derive(Serialize, Debug, Clone)]
pub struct Joined {
    pub color: Color,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatAck {
    pub success: bool,
    pub disconnection_detected: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct MoveAccepted {
    pub success: bool,
}

#[derive(Serialize, Debug, Clone)]
pub struct LegalMoves {
    pub from: Coord,
    pub moves: Vec<Coord>,
}

/// Body of every rejected request
#[derive(Serialize, Debug, Clone)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}
