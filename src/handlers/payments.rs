use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::database::{MatchRepository, PlayerRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::PaymentProvider;

#[derive(Debug, Serialize)]
pub struct PaymentLink {
    pub url: String,
}

/// Creates a gateway preference for one player's share and returns the
/// checkout URL. Gateway trouble is reported as a structured failure, not a
/// 5xx: the caller is a player mid-flow, not an operator.
pub async fn create_payment<P: PaymentProvider + 'static>(
    matches: web::Data<MatchRepository>,
    players: web::Data<PlayerRepository>,
    gateway: web::Data<P>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (match_id, player_id) = path.into_inner();
    let m = matches
        .get_match_by_id(&match_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
    let player = players
        .get_player_by_id(&player_id)
        .await?
        .filter(|p| p.match_id == match_id)
        .ok_or_else(|| AppError::NotFound("Player not found".to_string()))?;

    match gateway.create_preference(&m, &player).await {
        Ok(Some(url)) => Ok(HttpResponse::Ok().json(ApiResponse::success(PaymentLink { url }))),
        Ok(None) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::error(
            "Payment gateway is not configured",
        ))),
        Err(e) => {
            log::error!(
                "Failed to create payment preference for player {}: {}",
                player_id,
                e
            );
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::error(
                "Could not reach the payment gateway",
            )))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    // The gateway sends the id as either a string or a number.
    pub id: Option<serde_json::Value>,
}

/// Gateway callback. The body is only a hint: the payment status is always
/// re-fetched by id. Responds 200 for everything inactionable so the gateway
/// stops retrying; 500 only when an approved payment could not be persisted,
/// which is exactly the case a retry can fix.
pub async fn mercadopago_webhook<P: PaymentProvider + 'static>(
    players: web::Data<PlayerRepository>,
    gateway: web::Data<P>,
    body: web::Json<WebhookEvent>,
) -> HttpResponse {
    let event = body.into_inner();

    if event.event_type.as_deref() != Some("payment") {
        return received();
    }
    let Some(payment_id) = event.data.as_ref().and_then(|d| d.id.as_ref()).map(id_as_string)
    else {
        return received();
    };

    let payment = match gateway.get_payment(&payment_id).await {
        Ok(payment) => payment,
        Err(e) => {
            log::error!("Failed to fetch payment {}: {}", payment_id, e);
            return received();
        }
    };

    if payment.status != "approved" {
        return received();
    }
    let Some(player_id) = payment.external_reference else {
        log::warn!("Approved payment {} has no external reference", payment_id);
        return received();
    };

    match players.set_payment(&player_id, true, Some("MercadoPago")).await {
        Ok(true) => {
            log::info!("Payment approved for player {}", player_id);
            HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
                None,
                "Payment recorded",
            ))
        }
        Ok(false) => {
            log::warn!(
                "Approved payment {} references unknown player {}",
                payment_id,
                player_id
            );
            received()
        }
        Err(e) => {
            log::error!("Failed to record payment for player {}: {}", player_id, e);
            HttpResponse::InternalServerError()
                .json(ApiResponse::<()>::error("Failed to record payment"))
        }
    }
}

fn id_as_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn received() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "received": true }))
}
