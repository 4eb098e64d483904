use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    PreMatch,
    PaymentRequest,
}

impl ReminderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderKind::PreMatch => "pre_match",
            ReminderKind::PaymentRequest => "payment_request",
        }
    }
}

#[derive(Clone)]
pub struct ReminderRepository {
    pool: SqlitePool,
}

impl ReminderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records that a reminder of `kind` went out for `match_id`. Returns
    /// false when a previous sweep already claimed it, which is the signal to
    /// skip sending.
    pub async fn try_mark_sent(&self, match_id: &str, kind: ReminderKind) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO reminder_log (match_id, kind, sent_at) VALUES (?1, ?2, ?3)",
        )
        .bind(match_id)
        .bind(kind.as_str())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
