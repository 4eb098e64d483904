use actix_web::{App, web};
use anyhow::Result;
use chrono::NaiveDate;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Mutex;
use tempfile::TempDir;

use matchday_be::Config;
use matchday_be::database::models::{Match, MatchInput, MatchStatus, Player};
use matchday_be::database::{
    MatchRepository, PlayerRepository, ReminderRepository, init_database,
};
use matchday_be::handlers::{cron, matches, payments, players};
use matchday_be::services::{Notifier, PaymentInfo, PaymentProvider, SummaryGenerator};

pub const CRON_SECRET: &str = "test-cron-secret";
pub const FALLBACK_PAYMENT_LINK: &str = "https://pay.example.test/static";
pub const FALLBACK_LOCATION_LINK: &str = "https://maps.example.test/cancha";

/// Notifier double that records every send instead of hitting the gateway.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentMessage>>,
}

#[derive(Debug, Clone)]
pub struct SentMessage {
    pub to: String,
    pub template: String,
    pub params: Vec<String>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn send_template(&self, to: &str, template: &str, params: &[String]) {
        self.sent.lock().unwrap().push(SentMessage {
            to: to.to_string(),
            template: template.to_string(),
            params: params.to_vec(),
        });
    }
}

/// Scriptable payment gateway double. Tests insert payments by id and set the
/// preference URL the checkout call should hand back.
#[derive(Default)]
pub struct FakeGateway {
    pub payments: Mutex<HashMap<String, PaymentInfo>>,
    pub preference_url: Mutex<Option<String>>,
}

impl FakeGateway {
    pub fn add_payment(&self, id: &str, status: &str, external_reference: Option<&str>) {
        self.payments.lock().unwrap().insert(
            id.to_string(),
            PaymentInfo {
                status: status.to_string(),
                external_reference: external_reference.map(str::to_string),
            },
        );
    }

    pub fn set_preference_url(&self, url: Option<&str>) {
        *self.preference_url.lock().unwrap() = url.map(str::to_string);
    }
}

impl PaymentProvider for FakeGateway {
    async fn create_preference(&self, _match: &Match, _player: &Player) -> Result<Option<String>> {
        Ok(self.preference_url.lock().unwrap().clone())
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo> {
        self.payments
            .lock()
            .unwrap()
            .get(payment_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown payment {payment_id}"))
    }
}

/// Summary generator double scripted per test: a canned recap, unconfigured
/// (`None`), or a forced failure.
#[derive(Default)]
pub struct ScriptedSummarizer {
    pub summary: Mutex<Option<String>>,
    pub failing: Mutex<bool>,
}

impl ScriptedSummarizer {
    pub fn set_summary(&self, summary: Option<&str>) {
        *self.summary.lock().unwrap() = summary.map(str::to_string);
    }

    pub fn set_failing(&self) {
        *self.failing.lock().unwrap() = true;
    }
}

impl SummaryGenerator for ScriptedSummarizer {
    async fn generate_summary(&self, _match: &Match) -> Result<Option<String>> {
        if *self.failing.lock().unwrap() {
            anyhow::bail!("summary generator unavailable");
        }
        Ok(self.summary.lock().unwrap().clone())
    }
}

pub struct TestDb {
    pub pool: SqlitePool,
    pub database_url: String,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(&database_url).await?;

        Ok(TestDb {
            pool,
            database_url,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestApp {
    pub db: TestDb,
    pub config: Config,
    pub matches: web::Data<MatchRepository>,
    pub players: web::Data<PlayerRepository>,
    pub reminders: web::Data<ReminderRepository>,
    pub notifier: web::Data<RecordingNotifier>,
    pub gateway: web::Data<FakeGateway>,
    pub summarizer: web::Data<ScriptedSummarizer>,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;

        let config = Config {
            database_url: db.database_url.clone(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            base_url: "http://localhost:3000".to_string(),
            whatsapp_phone_number_id: None,
            whatsapp_access_token: None,
            mp_access_token: None,
            gemini_api_key: None,
            cron_secret: CRON_SECRET.to_string(),
            utc_offset_hours: -3,
            fallback_payment_link: FALLBACK_PAYMENT_LINK.to_string(),
            fallback_location_link: FALLBACK_LOCATION_LINK.to_string(),
        };

        Ok(TestApp {
            matches: web::Data::new(MatchRepository::new(db.pool.clone())),
            players: web::Data::new(PlayerRepository::new(db.pool.clone())),
            reminders: web::Data::new(ReminderRepository::new(db.pool.clone())),
            notifier: web::Data::new(RecordingNotifier::default()),
            gateway: web::Data::new(FakeGateway::default()),
            summarizer: web::Data::new(ScriptedSummarizer::default()),
            db,
            config,
        })
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.matches.clone())
            .app_data(self.players.clone())
            .app_data(self.reminders.clone())
            .app_data(self.notifier.clone())
            .app_data(self.gateway.clone())
            .app_data(self.summarizer.clone())
            .app_data(web::Data::new(self.config.clone()))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/matches")
                            .route("", web::post().to(matches::create_match))
                            .route("", web::get().to(matches::get_matches))
                            .route("/{id}", web::get().to(matches::get_match))
                            .route(
                                "/{id}",
                                web::put().to(matches::update_match::<RecordingNotifier>),
                            )
                            .route("/{id}", web::delete().to(matches::delete_match))
                            .route("/{id}/cancel", web::post().to(matches::cancel_match))
                            .route(
                                "/{id}/summary",
                                web::post().to(matches::generate_summary::<ScriptedSummarizer>),
                            )
                            .route(
                                "/{id}/players",
                                web::post().to(players::register_player::<RecordingNotifier>),
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
                                web::post().to(payments::create_payment::<FakeGateway>),
                            )
                            .route(
                                "/{match_id}/manage/{player_id}",
                                web::get().to(players::manage_view),
                            ),
                    )
                    .service(web::scope("/webhooks").route(
                        "/mercadopago",
                        web::post().to(payments::mercadopago_webhook::<FakeGateway>),
                    ))
                    .service(web::scope("/cron").route(
                        "/notifications",
                        web::get().to(cron::run_notifications::<RecordingNotifier>),
                    )),
            )
    }

    pub async fn seed_match(&self, date: NaiveDate, time: &str, max_players: i64) -> Match {
        self.matches
            .create_match(MatchInput {
                name: "Jueves en Leconte".to_string(),
                date,
                time: time.to_string(),
                price_per_player: 5000.0,
                max_players,
                location_link: String::new(),
            })
            .await
            .expect("seed match")
    }

    pub async fn seed_player(
        &self,
        match_id: &str,
        name: &str,
        phone: &str,
        has_paid: bool,
    ) -> Player {
        let player = self
            .players
            .register_if_capacity(match_id, name, phone)
            .await
            .expect("seed player")
            .expect("seeded match should have capacity");
        if has_paid {
            self.players
                .set_payment(&player.id, true, Some("Cash"))
                .await
                .expect("mark seed player paid");
        }
        player
    }

    pub async fn set_status(&self, match_id: &str, status: MatchStatus) {
        assert!(
            self.matches
                .set_status(match_id, status)
                .await
                .expect("set match status")
        );
    }

    pub async fn player_count(&self, match_id: &str) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM players WHERE match_id = ?1")
                .bind(match_id)
                .fetch_one(&self.db.pool)
                .await
                .expect("count players");
        count
    }

    pub async fn reload_player(&self, player_id: &str) -> Player {
        self.players
            .get_player_by_id(player_id)
            .await
            .expect("reload player")
            .expect("player should exist")
    }
}
