use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use anyhow::Context;
use classroom_api::application::auth_service::AuthService;
use classroom_api::application::ticket_service::TicketService;
use classroom_api::data::ticket_repository::InMemoryTicketRepository;
use classroom_api::data::user_repository::InMemoryUserRepository;
use classroom_api::domain::user::Role;
use classroom_api::infrastructure::config::AppConfig;
use classroom_api::infrastructure::logging::init_logging;
use classroom_api::presentation::auth::{login, register};
use classroom_api::presentation::handlers::{
    AppState, create_ticket, health_check, list_users, my_tickets, review_tickets,
};
use classroom_api::presentation::middleware::{AuthGuard, RequestTrace};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    info!(host = %config.host, port = config.port, "Configuration loaded");

    let user_repository = Arc::new(InMemoryUserRepository::new());
    let ticket_repository = Arc::new(InMemoryTicketRepository::new());

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        config.jwt_secret.clone(),
        config.token_ttl_secs,
    ));
    let ticket_service = TicketService::new(ticket_repository);

    let state = web::Data::new(AppState {
        auth_service,
        ticket_service,
    });

    let secret = config.jwt_secret.clone();
    let cors_origin = config.cors_origin.clone();

    info!("Configuring HTTP server");
    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .app_data(state.clone())
            .wrap(RequestTrace)
            .wrap(cors)
            .route("/health", web::get().to(health_check))
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(register))
                    .route("/login", web::post().to(login)),
            )
            .service(
                web::resource("/tickets/review")
                    .wrap(AuthGuard::allow(secret.clone(), &[Role::Teacher]))
                    .route(web::get().to(review_tickets)),
            )
            .service(
                web::resource("/tickets")
                    .wrap(AuthGuard::authenticated(secret.clone()))
                    .route(web::post().to(create_ticket))
                    .route(web::get().to(my_tickets)),
            )
            .service(
                web::resource("/admin/users")
                    .wrap(AuthGuard::allow(secret.clone(), &[Role::Admin]))
                    .route(web::get().to(list_users)),
            )
    });

    let bind_addr = format!("{}:{}", config.host, config.port);
    let server = server
        .bind((config.host.as_str(), config.port))
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    info!(
        address = %bind_addr,
        routes = %"GET /health, POST /auth/register, POST /auth/login, POST /tickets, GET /tickets, GET /tickets/review, GET /admin/users",
        "Starting HTTP server"
    );
    server.run().await?;
    Ok(())
}
