use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use log::info;

use chess_rooms::config::ServerConfig;
use chess_rooms::models::RoomRegistry;
use chess_rooms::routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    info!("Starting chess rooms server at http://{}", config.bind_addr);

    // One registry for the whole process, handed to every handler
    let registry = web::Data::new(RoomRegistry::with_system_clock());

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(registry.clone())
            .configure(routes::configure_routes)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
