use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use matchday_be::Config;
use matchday_be::database::{
    MatchRepository, PlayerRepository, ReminderRepository, init_database,
};
use matchday_be::handlers::{cron, matches, payments, players};
use matchday_be::services::{GeminiClient, MercadoPagoClient, WhatsAppClient};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Matchday API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env()?;
    log::info!("Configuration loaded (environment: {})", config.environment);

    let pool = init_database(&config.database_url).await?;
    log::info!("Database initialized");

    let match_repository = MatchRepository::new(pool.clone());
    let player_repository = PlayerRepository::new(pool.clone());
    let reminder_repository = ReminderRepository::new(pool.clone());
    let whatsapp = WhatsAppClient::from_config(&config);
    let mercadopago = MercadoPagoClient::new(config.clone());
    let gemini = GeminiClient::from_config(&config);

    let match_repo_data = web::Data::new(match_repository);
    let player_repo_data = web::Data::new(player_repository);
    let reminder_repo_data = web::Data::new(reminder_repository);
    let whatsapp_data = web::Data::new(whatsapp);
    let mercadopago_data = web::Data::new(mercadopago);
    let gemini_data = web::Data::new(gemini);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    log::info!("Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(match_repo_data.clone())
            .app_data(player_repo_data.clone())
            .app_data(reminder_repo_data.clone())
            .app_data(whatsapp_data.clone())
            .app_data(mercadopago_data.clone())
            .app_data(gemini_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                    .allowed_headers(vec!["Authorization", "Content-Type", "Accept"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(hello)
            .service(health)
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/matches")
                            .route("", web::post().to(matches::create_match))
                            .route("", web::get().to(matches::get_matches))
                            .route("/{id}", web::get().to(matches::get_match))
                            .route(
                                "/{id}",
                                web::put().to(matches::update_match::<WhatsAppClient>),
                            )
                            .route("/{id}", web::delete().to(matches::delete_match))
                            .route("/{id}/cancel", web::post().to(matches::cancel_match))
                            .route(
                                "/{id}/summary",
                                web::post().to(matches::generate_summary::<GeminiClient>),
                            )
                            .route(
                                "/{id}/players",
                                web::post().to(players::register_player::<WhatsAppClient>),
                            )
                            .route(
                                "/{match_id}/players/{player_id}",
                                web::delete().to(players::unsubscribe_player),
                            )
                            .route(
                                "/{match_id}/players/{player_id}/payment",
                                web::put().to(players::set_player_payment),
                            )
                            .route(
                                "/{match_id}/players/{player_id}/pay",
                                web::post().to(payments::create_payment::<MercadoPagoClient>),
                            )
                            .route(
                                "/{match_id}/manage/{player_id}",
                                web::get().to(players::manage_view),
                            ),
                    )
                    .service(web::scope("/webhooks").route(
                        "/mercadopago",
                        web::post().to(payments::mercadopago_webhook::<MercadoPagoClient>),
                    ))
                    .service(web::scope("/cron").route(
                        "/notifications",
                        web::get().to(cron::run_notifications::<WhatsAppClient>),
                    )),
            )
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
