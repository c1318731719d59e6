use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use log::{info, warn};

use crate::game::board::square_to_coord;
use crate::models::messages::{
    CreateRoomRequest, ErrorBody, HeartbeatAck, Joined, LegalMoves, MoveAccepted, MoveRequest,
    MovesQuery, PlayerRequest, RoomCreated, RoomList, RoomState,
};
use crate::models::{GameError, RoomRegistry};

impl ResponseError for GameError {
    fn status_code(&self) -> StatusCode {
        match self {
            GameError::InvalidInput(_)
            | GameError::InvalidSquare(_)
            | GameError::InvalidPlacement(_) => StatusCode::BAD_REQUEST,
            GameError::RoomNotFound(_) | GameError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            GameError::RoomFull
            | GameError::GameNotInProgress
            | GameError::NotYourTurn
            | GameError::NoPieceAtSource(_)
            | GameError::IllegalMove { .. } => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        })
    }
}

/// HTTP handler for the index page
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Chess Rooms")
}

pub async fn list_rooms(registry: web::Data<RoomRegistry>) -> impl Responder {
    HttpResponse::Ok().json(RoomList {
        rooms: registry.list_rooms(),
    })
}

pub async fn create_room(
    registry: web::Data<RoomRegistry>,
    body: web::Json<CreateRoomRequest>,
) -> Result<HttpResponse, GameError> {
    let room_id = registry.create_room(&body.room_name, &body.player_name)?;
    info!("Created room {}", room_id);
    Ok(HttpResponse::Ok().json(RoomCreated { room_id }))
}

pub async fn room_state(
    registry: web::Data<RoomRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, GameError> {
    let game_state = registry.room_state(&path)?;
    Ok(HttpResponse::Ok().json(RoomState { game_state }))
}

pub async fn join_room(
    registry: web::Data<RoomRegistry>,
    path: web::Path<String>,
    body: web::Json<PlayerRequest>,
) -> Result<HttpResponse, GameError> {
    let color = registry.join_room(&path, &body.player_name)?;
    Ok(HttpResponse::Ok().json(Joined { color }))
}

pub async fn heartbeat(
    registry: web::Data<RoomRegistry>,
    path: web::Path<String>,
    body: web::Json<PlayerRequest>,
) -> Result<HttpResponse, GameError> {
    let disconnection_detected = registry.heartbeat(&path, &body.player_name)?;
    Ok(HttpResponse::Ok().json(HeartbeatAck {
        success: true,
        disconnection_detected,
    }))
}

pub async fn make_move(
    registry: web::Data<RoomRegistry>,
    path: web::Path<String>,
    body: web::Json<MoveRequest>,
) -> Result<HttpResponse, GameError> {
    registry.make_move(&path, &body.from, &body.to, &body.player_name)?;
    Ok(HttpResponse::Ok().json(MoveAccepted { success: true }))
}

pub async fn legal_moves(
    registry: web::Data<RoomRegistry>,
    path: web::Path<String>,
    query: web::Query<MovesQuery>,
) -> Result<HttpResponse, GameError> {
    let from = square_to_coord(&query.from)?;
    let moves = registry.legal_moves(&path, &query.from)?;
    Ok(HttpResponse::Ok().json(LegalMoves { from, moves }))
}

/// Malformed JSON bodies get the same error shape as rejected operations.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Error parsing request body: {}", err);
        let body = ErrorBody {
            error: format!("Invalid message format: {}", err),
            kind: "InvalidInput",
        };
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// Configure the HTTP routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(
            web::scope("/api/rooms")
                .route("", web::get().to(list_rooms))
                .route("", web::post().to(create_room))
                .route("/{room_id}", web::get().to(room_state))
                .route("/{room_id}/join", web::post().to(join_room))
                .route("/{room_id}/heartbeat", web::post().to(heartbeat))
                .route("/{room_id}/move", web::post().to(make_move))
                .route("/{room_id}/moves", web::get().to(legal_moves)),
        )
        .service(web::resource("/").route(web::get().to(index)));
}
