use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::database::models::{Match, Player, MatchStatus, RegisterPlayerRequest};
use crate::database::{MatchRepository, PlayerRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::Notifier;
use crate::services::whatsapp::send_registration_confirmation;

/// Public self-registration. The capacity check and the insert are one
/// conditional write in the repository, so a full match never over-admits.
/// The confirmation message is best effort and never rolls back the insert.
pub async fn register_player<N: Notifier + 'static>(
    matches: web::Data<MatchRepository>,
    players: web::Data<PlayerRepository>,
    notifier: web::Data<N>,
    config: web::Data<Config>,
    path: web::Path<String>,
    input: web::Json<RegisterPlayerRequest>,
) -> Result<HttpResponse, AppError> {
    let match_id = path.into_inner();
    let m = matches
        .get_match_by_id(&match_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

    let request = input.into_inner();
    let Some(player) = players
        .register_if_capacity(&match_id, &request.name, &request.phone)
        .await?
    else {
        return Err(AppError::Conflict("Match is already full".to_string()));
    };

    let manage_link = config.manage_url(&match_id, &player.id);
    send_registration_confirmation(notifier.get_ref(), &player.phone, &m.name, &manage_link).await;

    Ok(HttpResponse::Created().json(ApiResponse::success(player)))
}

/// Self-service unsubscribe. Only allowed while the match is not finished and
/// the player has not paid.
pub async fn unsubscribe_player(
    matches: web::Data<MatchRepository>,
    players: web::Data<PlayerRepository>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (match_id, player_id) = path.into_inner();
    let (m, player) = lookup_pair(&matches, &players, &match_id, &player_id).await?;

    if m.status == MatchStatus::Finished {
        return Err(AppError::Conflict(
            "Cannot unsubscribe from a finished match".to_string(),
        ));
    }
    if player.has_paid {
        return Err(AppError::Conflict(
            "Cannot unsubscribe after payment".to_string(),
        ));
    }

    players.delete_player(&player_id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Player removed",
    )))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentToggleRequest {
    pub has_paid: bool,
    pub payment_method: Option<String>,
}

/// Admin toggle for cash payments and manual corrections.
pub async fn set_player_payment(
    matches: web::Data<MatchRepository>,
    players: web::Data<PlayerRepository>,
    path: web::Path<(String, String)>,
    input: web::Json<PaymentToggleRequest>,
) -> Result<HttpResponse, AppError> {
    let (match_id, player_id) = path.into_inner();
    lookup_pair(&matches, &players, &match_id, &player_id).await?;

    let request = input.into_inner();
    players
        .set_payment(
            &player_id,
            request.has_paid,
            request.payment_method.as_deref(),
        )
        .await?;

    let player = players
        .get_player_by_id(&player_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Player not found".to_string()))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(player)))
}

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    /// Gateway back-url status flag (success | failure | pending).
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageView {
    #[serde(rename = "match")]
    pub match_info: Match,
    pub player: Player,
    pub payment_status: Option<String>,
}

/// Read model behind the self-service link sent in every notification.
pub async fn manage_view(
    matches: web::Data<MatchRepository>,
    players: web::Data<PlayerRepository>,
    path: web::Path<(String, String)>,
    query: web::Query<ManageQuery>,
) -> Result<HttpResponse, AppError> {
    let (match_id, player_id) = path.into_inner();
    let (match_info, player) = lookup_pair(&matches, &players, &match_id, &player_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(ManageView {
        match_info,
        player,
        payment_status: query.into_inner().status,
    })))
}

async fn lookup_pair(
    matches: &MatchRepository,
    players: &PlayerRepository,
    match_id: &str,
    player_id: &str,
) -> Result<(Match, Player), AppError> {
    let m = matches
        .get_match_by_id(match_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
    let player = players
        .get_player_by_id(player_id)
        .await?
        .filter(|p| p.match_id == match_id)
        .ok_or_else(|| AppError::NotFound("Player not found".to_string()))?;
    Ok((m, player))
}
