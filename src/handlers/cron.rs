use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::Utc;

use crate::config::Config;
use crate::database::{MatchRepository, ReminderRepository};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::Notifier;
use crate::services::reminders::run_sweep;

/// Entry point for the external scheduler (expected every 10-15 minutes).
/// Guarded by a shared-secret bearer token.
pub async fn run_notifications<N: Notifier + 'static>(
    req: HttpRequest,
    matches: web::Data<MatchRepository>,
    sent_log: web::Data<ReminderRepository>,
    notifier: web::Data<N>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let expected = format!("Bearer {}", config.cron_secret);
    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|h| h == expected);
    if !authorized {
        return Err(AppError::Unauthorized);
    }

    let now = Utc::now().with_timezone(&config.timezone());
    let summary = run_sweep(
        matches.get_ref(),
        sent_log.get_ref(),
        notifier.get_ref(),
        config.get_ref(),
        now,
    )
    .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(summary)))
}
