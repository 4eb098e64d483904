use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::Player;

#[derive(Clone)]
pub struct PlayerRepository {
    pool: SqlitePool,
}

impl PlayerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers a player if and only if the match still has room. The
    /// capacity check and the insert are one statement, so two concurrent
    /// registrations cannot both slip past the cap. Returns `None` when the
    /// match is full (or gone).
    pub async fn register_if_capacity(
        &self,
        match_id: &str,
        name: &str,
        phone: &str,
    ) -> Result<Option<Player>> {
        let now = Utc::now().naive_utc();
        let id = Uuid::new_v4().to_string();
        let result = sqlx::query(
            r#"
            INSERT INTO players (id, match_id, name, phone, has_paid, payment_method, created_at)
            SELECT ?1, ?2, ?3, ?4, 0, NULL, ?5
            WHERE (SELECT COUNT(*) FROM players WHERE match_id = ?2)
                  < (SELECT max_players FROM matches WHERE id = ?2)
            "#,
        )
        .bind(&id)
        .bind(match_id)
        .bind(name)
        .bind(phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(Player {
            id,
            match_id: match_id.to_string(),
            name: name.to_string(),
            phone: phone.to_string(),
            has_paid: false,
            payment_method: None,
            created_at: now,
        }))
    }

    pub async fn get_player_by_id(&self, id: &str) -> Result<Option<Player>> {
        let player = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, match_id, name, phone, has_paid, payment_method, created_at
            FROM players WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(player)
    }

    pub async fn set_payment(
        &self,
        id: &str,
        has_paid: bool,
        payment_method: Option<&str>,
    ) -> Result<bool> {
        let result =
            sqlx::query("UPDATE players SET has_paid = ?1, payment_method = ?2 WHERE id = ?3")
                .bind(has_paid)
                .bind(payment_method)
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_player(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM players WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
