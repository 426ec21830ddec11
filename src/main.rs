use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;

use todolist::auth::TokenCodec;
use todolist::config::Config;
use todolist::routes;
use todolist::state::AppState;
use todolist::store::{MemoryStore, PgStore, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(|e| {
        log::error!("invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let store = PgStore::connect(url).await.map_err(|e| {
                log::error!("cannot connect to the database: {}", e);
                std::io::Error::new(std::io::ErrorKind::Other, e)
            })?;
            log::info!("connected to the database");
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL is not set; data is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let tokens = TokenCodec::new(
        config.jwt_secret.as_bytes(),
        chrono::Duration::seconds(config.token_ttl_secs),
    );
    let state = web::Data::new(AppState::new(store, tokens));

    log::info!("Starting server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
