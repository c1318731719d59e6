//! Game room engine for two-player online chess: authoritative boards,
//! move legality, check and checkmate detection, and disconnect handling,
//! served over a small JSON API.

pub mod clock;
pub mod config;
pub mod game;
pub mod models;
pub mod routes;
