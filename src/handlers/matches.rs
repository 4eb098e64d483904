use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::config::Config;
use crate::database::MatchRepository;
use crate::database::models::{MatchInput, MatchStatus, MatchUpdate};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::whatsapp::send_payment_request;
use crate::services::{Notifier, SummaryGenerator};

pub async fn create_match(
    repo: web::Data<MatchRepository>,
    input: web::Json<MatchInput>,
) -> Result<HttpResponse, AppError> {
    let m = repo.create_match(input.into_inner()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::success(m)))
}

pub async fn get_matches(repo: web::Data<MatchRepository>) -> Result<HttpResponse, AppError> {
    let matches = repo.get_all_matches().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(matches)))
}

pub async fn get_match(
    repo: web::Data<MatchRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let m = repo
        .get_match_with_players(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(m)))
}

/// Persists a full match update. When the stored status ends up Finished,
/// re-fetches the authoritative player list and fans out a payment request to
/// every unpaid player with a phone on record. Sends are best effort: one
/// failure never halts the rest and never fails the update.
pub async fn update_match<N: Notifier + 'static>(
    repo: web::Data<MatchRepository>,
    notifier: web::Data<N>,
    config: web::Data<Config>,
    path: web::Path<String>,
    input: web::Json<MatchUpdate>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let updated = repo
        .update_match(&id, input.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

    if updated.status == MatchStatus::Finished {
        if let Some(m) = repo.get_match_with_players(&id).await? {
            for player in &m.players {
                if player.has_paid || player.phone.trim().is_empty() {
                    continue;
                }
                let manage_link = config.manage_url(&m.info.id, &player.id);
                send_payment_request(
                    notifier.get_ref(),
                    &player.phone,
                    &m.info.name,
                    &manage_link,
                )
                .await;
            }
        }
    }

    Ok(HttpResponse::Ok().json(ApiResponse::success(updated)))
}

#[derive(Debug, Serialize)]
pub struct MatchSummary {
    pub summary: String,
}

/// Drafts a post-match recap from the stored result fields. The text is only
/// returned, never persisted: the admin reviews it and saves it through the
/// regular update. Generator trouble is a structured failure, not a 5xx.
pub async fn generate_summary<S: SummaryGenerator + 'static>(
    repo: web::Data<MatchRepository>,
    generator: web::Data<S>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let m = repo
        .get_match_by_id(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

    match generator.generate_summary(&m).await {
        Ok(Some(summary)) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(MatchSummary { summary })))
        }
        Ok(None) => Ok(HttpResponse::Ok().json(ApiResponse::<()>::error(
            "Summary generator is not configured",
        ))),
        Err(e) => {
            log::error!("Failed to generate summary for match {}: {}", id, e);
            Ok(HttpResponse::Ok().json(ApiResponse::<()>::error(
                "Could not generate a match summary",
            )))
        }
    }
}

/// Cancel keeps the row (and its players) around as history.
pub async fn cancel_match(
    repo: web::Data<MatchRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !repo.set_status(&id, MatchStatus::Canceled).await? {
        return Err(AppError::NotFound("Match not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Match canceled",
    )))
}

pub async fn delete_match(
    repo: web::Data<MatchRepository>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    if !repo.delete_match(&id).await? {
        return Err(AppError::NotFound("Match not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::<()>::success_with_message(
        None,
        "Match deleted",
    )))
}
