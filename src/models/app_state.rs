use log::{info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::game::board::{square_to_coord, Color, Coord};
use crate::models::messages::{RoomSnapshot, RoomSummary};
use crate::models::room::{MoveRecord, Room};
use crate::models::GameError;

/// Application state shared between request handlers: every open room,
/// keyed by id.
///
/// The outer map lock is only held to find or insert a room. Each room sits
/// behind its own mutex, so operations on one room are serialized while
/// different rooms proceed independently.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<Mutex<Room>>>>,
    clock: Arc<dyn Clock>,
}

impl RoomRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> RoomRegistry {
        RoomRegistry {
            rooms: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn with_system_clock() -> RoomRegistry {
        RoomRegistry::new(Arc::new(SystemClock))
    }

    /// Inserts `room` under `id` unless the id is taken.
    pub fn create(&self, id: String, room: Room) -> bool {
        let mut rooms = self.write_rooms();
        if rooms.contains_key(&id) {
            return false;
        }
        rooms.insert(id, Arc::new(Mutex::new(room)));
        true
    }

    pub fn get(&self, id: &str) -> Option<Arc<Mutex<Room>>> {
        self.read_rooms().get(id).cloned()
    }

    /// Stores `room` under `id`, replacing any previous room.
    pub fn set(&self, id: String, room: Room) {
        self.write_rooms().insert(id, Arc::new(Mutex::new(room)));
    }

    pub fn list(&self) -> Vec<Arc<Mutex<Room>>> {
        self.read_rooms().values().cloned().collect()
    }

    pub fn create_room(&self, room_name: &str, creator: &str) -> Result<String, GameError> {
        let room_name = required(room_name, "room name is required")?;
        let creator = required(creator, "player name is required")?;

        loop {
            let id = Uuid::new_v4().to_string();
            let room = Room::new(
                id.clone(),
                room_name.to_string(),
                creator.to_string(),
                self.clock.now_millis(),
            );
            if self.create(id.clone(), room) {
                return Ok(id);
            }
        }
    }

    pub fn join_room(&self, room_id: &str, player: &str) -> Result<Color, GameError> {
        let player = required(player, "player name is required")?;
        self.with_room(room_id, |room, now| room.join(player, now))
    }

    /// Records activity for `player`, then runs the disconnect check.
    /// Returns whether that check ended the game.
    pub fn heartbeat(&self, room_id: &str, player: &str) -> Result<bool, GameError> {
        let player = required(player, "player name is required")?;
        self.with_room(room_id, |room, now| {
            room.heartbeat(player, now)?;
            Ok(room.check_disconnect(now))
        })
    }

    /// Snapshot of the room after a disconnect check, so polling clients
    /// see abandoned games end.
    pub fn room_state(&self, room_id: &str) -> Result<RoomSnapshot, GameError> {
        self.with_room(room_id, |room, now| {
            room.check_disconnect(now);
            Ok(room.snapshot())
        })
    }

    /// Lobby view, ordered by room name.
    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .list()
            .iter()
            .map(|room| lock_room(room).summary())
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        summaries
    }

    pub fn make_move(
        &self,
        room_id: &str,
        from: &str,
        to: &str,
        player: &str,
    ) -> Result<MoveRecord, GameError> {
        let from = square_to_coord(from)?;
        let to = square_to_coord(to)?;
        let player = required(player, "player name is required")?;

        self.with_room(room_id, |room, now| room.make_move(from, to, player, now))
            .map_err(|err| {
                warn!("Room {}: move {}-{} by {} rejected: {}", room_id, from, to, player, err);
                err
            })
    }

    pub fn legal_moves(&self, room_id: &str, from: &str) -> Result<Vec<Coord>, GameError> {
        let from = square_to_coord(from)?;
        self.with_room(room_id, |room, _| Ok(room.legal_moves(from)))
    }

    /// Runs `op` with exclusive access to one room. The clock is read after
    /// the room lock is taken, so timestamps within a room never go backward.
    fn with_room<T>(
        &self,
        room_id: &str,
        op: impl FnOnce(&mut Room, u64) -> Result<T, GameError>,
    ) -> Result<T, GameError> {
        let Some(room) = self.get(room_id) else {
            info!("Room not found: {}", room_id);
            return Err(GameError::RoomNotFound(room_id.to_string()));
        };
        let mut guard = lock_room(&room);
        let now = self.clock.now_millis();
        op(&mut guard, now)
    }

    fn read_rooms(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Mutex<Room>>>> {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_rooms(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Mutex<Room>>>> {
        self.rooms.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Room operations validate before they mutate, so a poisoned lock still
/// guards a consistent room.
fn lock_room(room: &Mutex<Room>) -> MutexGuard<'_, Room> {
    room.lock().unwrap_or_else(PoisonError::into_inner)
}

fn required<'a>(value: &'a str, message: &'static str) -> Result<&'a str, GameError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GameError::InvalidInput(message));
    }
    Ok(trimmed)
}
