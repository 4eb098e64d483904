use reqwest::Client;
use serde_json::json;

use crate::config::Config;
use crate::services::traits::Notifier;

const GRAPH_API_URL: &str = "https://graph.facebook.com/v17.0";

// Pre-approved template names on the WhatsApp business account.
pub const TPL_REGISTRATION_CONFIRMED: &str = "match_registration_confirmed";
pub const TPL_MATCH_REMINDER: &str = "match_reminder";
pub const TPL_PAYMENT_REQUEST: &str = "match_payment_request";

/// Strips separators and prefixes the Argentine mobile code when the number
/// looks like a bare 10-digit local number (e.g. "11 5555-4444").
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 && !digits.starts_with("54") {
        format!("549{digits}")
    } else {
        digits
    }
}

/// WhatsApp Cloud API client. Without credentials it runs in a silent no-op
/// mode that only logs the would-be payload, so local development works
/// without a business account.
#[derive(Clone)]
pub struct WhatsAppClient {
    phone_number_id: Option<String>,
    access_token: Option<String>,
    api_url: String,
    client: Client,
}

impl WhatsAppClient {
    pub fn new(phone_number_id: Option<String>, access_token: Option<String>) -> Self {
        Self {
            phone_number_id,
            access_token,
            api_url: GRAPH_API_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.whatsapp_phone_number_id.clone(),
            config.whatsapp_access_token.clone(),
        )
    }
}

impl Notifier for WhatsAppClient {
    async fn send_template(&self, to: &str, template: &str, params: &[String]) {
        let to = normalize_phone(to);
        let parameters: Vec<_> = params
            .iter()
            .map(|p| json!({ "type": "text", "text": p }))
            .collect();
        let body = json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "template",
            "template": {
                "name": template,
                "language": { "code": "es_AR" },
                "components": [{ "type": "body", "parameters": parameters }],
            },
        });

        let (Some(phone_number_id), Some(access_token)) =
            (&self.phone_number_id, &self.access_token)
        else {
            log::info!(
                "WhatsApp credentials not configured, skipping template '{}' to {}: {}",
                template,
                to,
                body
            );
            return;
        };

        let url = format!("{}/{}/messages", self.api_url, phone_number_id);
        match self
            .client
            .post(&url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => {
                log::info!("WhatsApp template '{}' sent to {}", template, to);
            }
            Ok(response) => {
                let status = response.status();
                let detail = response.text().await.unwrap_or_default();
                log::error!(
                    "WhatsApp send of '{}' to {} failed with status {}: {}",
                    template,
                    to,
                    status,
                    detail
                );
            }
            Err(e) => {
                log::error!("WhatsApp send of '{}' to {} failed: {}", template, to, e);
            }
        }
    }
}

pub async fn send_registration_confirmation<N: Notifier>(
    notifier: &N,
    to: &str,
    match_name: &str,
    manage_link: &str,
) {
    notifier
        .send_template(
            to,
            TPL_REGISTRATION_CONFIRMED,
            &[match_name.to_string(), manage_link.to_string()],
        )
        .await;
}

pub async fn send_match_reminder<N: Notifier>(
    notifier: &N,
    to: &str,
    match_name: &str,
    time: &str,
    location_link: &str,
) {
    notifier
        .send_template(
            to,
            TPL_MATCH_REMINDER,
            &[
                match_name.to_string(),
                time.to_string(),
                location_link.to_string(),
            ],
        )
        .await;
}

pub async fn send_payment_request<N: Notifier>(
    notifier: &N,
    to: &str,
    match_name: &str,
    payment_link: &str,
) {
    notifier
        .send_template(
            to,
            TPL_PAYMENT_REQUEST,
            &[match_name.to_string(), payment_link.to_string()],
        )
        .await;
}
