use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod ai;
mod commands;
mod config;
mod controllers;
mod http;
mod memory;

use ai::{AiClient, GroqClient};
use config::Config;
use memory::MemoryStore;

pub struct AppState {
    pub memory: Arc<MemoryStore>,
    pub ai: Arc<AiClient>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    let memory = Arc::new(MemoryStore::from_config(&config));
    log::info!(
        "User memory file: {} (source: {})",
        memory.writable_path().display(),
        memory.user_source().display()
    );

    let ai = Arc::new(AiClient::Groq(GroqClient::new(
        &config.groq_api_key,
        config.endpoint.as_deref(),
        config.model.as_deref(),
    )));
    log::info!("Using model {}", ai.model());

    log::info!("Starting WB AI backend on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                memory: Arc::clone(&memory),
                ai: Arc::clone(&ai),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::chat::config)
            .configure(controllers::status::config)
            .route("/", web::get().to(index))
            .service(Files::new("/static", "./static"))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn index() -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open("./static/index.html")?)
}
