use anyhow::{Result, bail};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::database::models::{Match, Player};
use crate::services::traits::{PaymentInfo, PaymentProvider};

const MP_API_URL: &str = "https://api.mercadopago.com";
const CURRENCY_ID: &str = "ARS";
const STATEMENT_DESCRIPTOR: &str = "CANCHA LECONTE";

/// Mercado Pago checkout client. Preferences carry the player id as
/// `external_reference`, which is the only correlation key the webhook gets
/// back from the gateway.
#[derive(Clone)]
pub struct MercadoPagoClient {
    config: Config,
    api_url: String,
    client: Client,
}

impl MercadoPagoClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            api_url: MP_API_URL.to_string(),
            client: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PreferenceResponse {
    init_point: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    status: Option<String>,
    external_reference: Option<String>,
}

impl PaymentProvider for MercadoPagoClient {
    async fn create_preference(
        &self,
        match_info: &Match,
        player: &Player,
    ) -> Result<Option<String>> {
        let Some(access_token) = &self.config.mp_access_token else {
            log::error!("Mercado Pago access token not configured");
            return Ok(None);
        };

        let manage_url = self.config.manage_url(&match_info.id, &player.id);
        let body = json!({
            "items": [{
                "id": match_info.id,
                "title": format!("Partido: {}", match_info.name),
                "description": format!("Reserva para {} a las {}", match_info.date, match_info.time),
                "quantity": 1,
                "unit_price": match_info.price_per_player,
                "currency_id": CURRENCY_ID,
            }],
            "payer": { "name": player.name },
            "back_urls": {
                "success": format!("{manage_url}?status=success"),
                "failure": format!("{manage_url}?status=failure"),
                "pending": format!("{manage_url}?status=pending"),
            },
            "auto_return": "approved",
            "external_reference": player.id,
            "notification_url": self.config.webhook_url(),
            "statement_descriptor": STATEMENT_DESCRIPTOR,
        });

        let response = self
            .client
            .post(format!("{}/checkout/preferences", self.api_url))
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            bail!("preference creation failed with status {status}: {detail}");
        }

        let preference: PreferenceResponse = response.json().await?;
        Ok(preference.init_point)
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentInfo> {
        let Some(access_token) = &self.config.mp_access_token else {
            bail!("Mercado Pago access token not configured");
        };

        let response = self
            .client
            .get(format!("{}/v1/payments/{}", self.api_url, payment_id))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            bail!("payment lookup failed with status {status}: {detail}");
        }

        let payment: PaymentResponse = response.json().await?;
        Ok(PaymentInfo {
            status: payment.status.unwrap_or_default(),
            external_reference: payment.external_reference,
        })
    }
}
