use anyhow::Result;
use chrono::{NaiveDate, Utc};
use sqlx::SqlitePool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::database::models::{Match, MatchInput, MatchStatus, MatchUpdate, MatchWithPlayers, Player};

#[derive(Clone)]
pub struct MatchRepository {
    pool: SqlitePool,
}

impl MatchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_match(&self, input: MatchInput) -> Result<Match> {
        let now = Utc::now().naive_utc();
        let id = Uuid::new_v4().to_string();
        let m = sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (id, name, date, time, price_per_player, max_players, location_link, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            RETURNING id, name, date, time, price_per_player, max_players, location_link, status,
                      result, team_a, team_b, score_a, score_b, mvp, comments, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&input.name)
        .bind(input.date)
        .bind(&input.time)
        .bind(input.price_per_player)
        .bind(input.max_players)
        .bind(&input.location_link)
        .bind(MatchStatus::Open)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(m)
    }

    pub async fn get_match_by_id(&self, id: &str) -> Result<Option<Match>> {
        let m = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, name, date, time, price_per_player, max_players, location_link, status,
                   result, team_a, team_b, score_a, score_b, mvp, comments, created_at, updated_at
            FROM matches WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(m)
    }

    /// A match together with its registered players, newest registration last.
    pub async fn get_match_with_players(&self, id: &str) -> Result<Option<MatchWithPlayers>> {
        let Some(info) = self.get_match_by_id(id).await? else {
            return Ok(None);
        };
        let players = self.load_players(id).await?;
        Ok(Some(MatchWithPlayers { info, players }))
    }

    pub async fn get_all_matches(&self) -> Result<Vec<MatchWithPlayers>> {
        let matches = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, name, date, time, price_per_player, max_players, location_link, status,
                   result, team_a, team_b, score_a, score_b, mvp, comments, created_at, updated_at
            FROM matches ORDER BY date DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, match_id, name, phone, has_paid, payment_method, created_at
            FROM players ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_match: HashMap<String, Vec<Player>> = HashMap::new();
        for p in players {
            by_match.entry(p.match_id.clone()).or_default().push(p);
        }

        Ok(matches
            .into_iter()
            .map(|info| {
                let players = by_match.remove(&info.id).unwrap_or_default();
                MatchWithPlayers { info, players }
            })
            .collect())
    }

    pub async fn update_match(&self, id: &str, input: MatchUpdate) -> Result<Option<Match>> {
        let now = Utc::now().naive_utc();
        let m = sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches
            SET name = ?1, date = ?2, time = ?3, price_per_player = ?4, max_players = ?5,
                location_link = ?6, status = ?7, result = ?8, team_a = ?9, team_b = ?10,
                score_a = ?11, score_b = ?12, mvp = ?13, comments = ?14, updated_at = ?15
            WHERE id = ?16
            RETURNING id, name, date, time, price_per_player, max_players, location_link, status,
                      result, team_a, team_b, score_a, score_b, mvp, comments, created_at, updated_at
            "#,
        )
        .bind(&input.name)
        .bind(input.date)
        .bind(&input.time)
        .bind(input.price_per_player)
        .bind(input.max_players)
        .bind(&input.location_link)
        .bind(input.status)
        .bind(&input.result)
        .bind(&input.team_a)
        .bind(&input.team_b)
        .bind(input.score_a)
        .bind(input.score_b)
        .bind(&input.mvp)
        .bind(&input.comments)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(m)
    }

    pub async fn set_status(&self, id: &str, status: MatchStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE matches SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status)
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete. Player rows cascade via the schema-level foreign key.
    pub async fn delete_match(&self, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM matches WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Matches on `date` that are still playable (neither canceled nor finished).
    pub async fn playable_on_date(&self, date: NaiveDate) -> Result<Vec<MatchWithPlayers>> {
        let matches = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, name, date, time, price_per_player, max_players, location_link, status,
                   result, team_a, team_b, score_a, score_b, mvp, comments, created_at, updated_at
            FROM matches WHERE date = ?1 AND status NOT IN ('Canceled', 'Finished')
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        self.attach_players(matches).await
    }

    pub async fn finished_on_date(&self, date: NaiveDate) -> Result<Vec<MatchWithPlayers>> {
        let matches = sqlx::query_as::<_, Match>(
            r#"
            SELECT id, name, date, time, price_per_player, max_players, location_link, status,
                   result, team_a, team_b, score_a, score_b, mvp, comments, created_at, updated_at
            FROM matches WHERE date = ?1 AND status = 'Finished'
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        self.attach_players(matches).await
    }

    async fn attach_players(&self, matches: Vec<Match>) -> Result<Vec<MatchWithPlayers>> {
        let mut out = Vec::with_capacity(matches.len());
        for info in matches {
            let players = self.load_players(&info.id).await?;
            out.push(MatchWithPlayers { info, players });
        }
        Ok(out)
    }

    async fn load_players(&self, match_id: &str) -> Result<Vec<Player>> {
        let players = sqlx::query_as::<_, Player>(
            r#"
            SELECT id, match_id, name, phone, has_paid, payment_method, created_at
            FROM players WHERE match_id = ?1 ORDER BY created_at
            "#,
        )
        .bind(match_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(players)
    }
}
