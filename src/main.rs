use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix::Actor;
use actix_web::{get, web, App, HttpRequest, HttpResponse, HttpServer, Responder};
use actix_web_actors::ws;
use dotenv::dotenv;
use tracing::info;

use duel_server::agent::AgentDeckConfig;
use duel_server::catalog::CardCatalog;
use duel_server::config::Settings;
use duel_server::matchmaker::{MatchQueues, Matchmaker};
use duel_server::room::{DirectoryLogSink, MatchLogSink};
use duel_server::session::{PlayerSession, SessionRegistry};
use duel_server::{AppState, LoggerManager};

#[get("/health")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "duel-server"
    }))
}

#[get("/ws")]
async fn ws_endpoint(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> actix_web::Result<HttpResponse> {
    let session = PlayerSession::new(
        state.matchmaker_addr.clone(),
        state.registry_addr.clone(),
        state.settings.session.clone(),
    );
    ws::start(session, &req, stream)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let settings = Settings::new().expect("failed to load configuration");
    let logger_manager = Arc::new(LoggerManager::setup(&settings));

    let catalog: Arc<CardCatalog> = CardCatalog::from_json_file(Path::new(&settings.catalog.cards_path))
        .expect("failed to load card catalog");

    let log_sink: Option<Arc<dyn MatchLogSink>> = if settings.archive.enabled {
        Some(Arc::new(DirectoryLogSink::new(PathBuf::from(
            &settings.archive.directory,
        ))))
    } else {
        None
    };

    let registry_addr = SessionRegistry::new().start();
    let queues = MatchQueues::new(
        settings.matchmaking.queue_names.clone(),
        settings.matchmaking.custom_queue_prefix.clone(),
        settings.matchmaking.game_types.clone(),
    );
    let agent_deck = AgentDeckConfig {
        deck_name: settings.agent.deck_name.clone(),
        decks_directory: settings.agent.decks_directory.clone().map(PathBuf::from),
    };
    let matchmaker_addr = Matchmaker::new(
        queues,
        catalog.clone(),
        registry_addr.clone(),
        agent_deck,
        log_sink,
    )
    .start();

    let state = AppState {
        settings: settings.clone(),
        catalog,
        matchmaker_addr,
        registry_addr,
        logger_manager,
    };

    let bind = (settings.server.bind_address.clone(), settings.server.port);
    info!("Server started on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(health_check)
            .service(ws_endpoint)
    })
    .bind(bind)?
    .run()
    .await
}
