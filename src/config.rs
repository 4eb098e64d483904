use anyhow::Result;
use chrono::FixedOffset;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Public base URL of the app, used to build manage links and callback URLs.
    pub base_url: String,
    pub whatsapp_phone_number_id: Option<String>,
    pub whatsapp_access_token: Option<String>,
    pub mp_access_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub cron_secret: String,
    /// Offset from UTC, in hours, used for every date/time decision in the
    /// reminder sweep. Defaults to -3 (Buenos Aires, no DST).
    pub utc_offset_hours: i32,
    /// Static payment link sent in day-after payment reminders.
    pub fallback_payment_link: String,
    /// Location link used in match reminders when the match has none.
    pub fallback_location_link: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:matchday.db".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            base_url: env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string()),
            whatsapp_phone_number_id: env::var("WHATSAPP_PHONE_NUMBER_ID").ok(),
            whatsapp_access_token: env::var("WHATSAPP_ACCESS_TOKEN").ok(),
            mp_access_token: env::var("MP_ACCESS_TOKEN").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            cron_secret: env::var("CRON_SECRET").unwrap_or_else(|_| "dev-cron-secret".to_string()),
            utc_offset_hours: env::var("UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "-3".to_string())
                .parse()
                .unwrap_or(-3),
            fallback_payment_link: env::var("FALLBACK_PAYMENT_LINK")
                .unwrap_or_else(|_| "https://link.mercadopago.com.ar/canchaleconte".to_string()),
            fallback_location_link: env::var("FALLBACK_LOCATION_LINK").unwrap_or_else(|_| {
                "https://maps.app.goo.gl/HkvCMsKvaMeDvaNa8?g_st=iw".to_string()
            }),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Self-service link a player receives to manage their registration.
    pub fn manage_url(&self, match_id: &str, player_id: &str) -> String {
        format!("{}/match/{}/manage/{}", self.base_url, match_id, player_id)
    }

    pub fn webhook_url(&self) -> String {
        format!("{}/api/v1/webhooks/mercadopago", self.base_url)
    }

    pub fn timezone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours.clamp(-23, 23) * 3600)
            .unwrap_or_else(|| FixedOffset::west_opt(3 * 3600).expect("static UTC-3 offset"))
    }
}
