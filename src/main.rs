use std::io;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use log::{error, info};

use todo_api::{auth::TokenService, config::Config, routes, store::PgStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let store = PgStore::connect(&config.database_url).await.map_err(|e| {
        error!("Failed to connect to database: {}", e);
        io::Error::new(io::ErrorKind::Other, e)
    })?;

    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl);
    let configure = routes::configure_app(Arc::new(store), tokens);

    info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(configure.clone())
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
