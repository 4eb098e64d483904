use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum MatchStatus {
    Open,
    // Present in the original status set but never assigned by any flow.
    Full,
    Finished,
    Canceled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub name: String,
    pub date: NaiveDate,
    /// Free-form clock time as entered by the organizer ("20:00", "20:00hs", "20").
    pub time: String,
    pub price_per_player: f64,
    pub max_players: i64,
    pub location_link: String,
    pub status: MatchStatus,
    pub result: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub score_a: Option<i64>,
    pub score_b: Option<i64>,
    pub mvp: Option<String>,
    pub comments: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: String,
    pub match_id: String,
    pub name: String,
    pub phone: String,
    pub has_paid: bool,
    pub payment_method: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWithPlayers {
    #[serde(flatten)]
    pub info: Match,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInput {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub price_per_player: f64,
    pub max_players: i64,
    #[serde(default)]
    pub location_link: String,
}

/// Full update payload, including the result fields an admin fills in when
/// settling a match.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdate {
    pub name: String,
    pub date: NaiveDate,
    pub time: String,
    pub price_per_player: f64,
    pub max_players: i64,
    #[serde(default)]
    pub location_link: String,
    pub status: MatchStatus,
    pub result: Option<String>,
    pub team_a: Option<String>,
    pub team_b: Option<String>,
    pub score_a: Option<i64>,
    pub score_b: Option<i64>,
    pub mvp: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPlayerRequest {
    pub name: String,
    pub phone: String,
}
