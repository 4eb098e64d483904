use anyhow::{Result, bail};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::Config;
use crate::database::models::Match;
use crate::services::traits::SummaryGenerator;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini client that writes the post-match recap an admin pastes into the
/// group chat. Without an API key it reports itself unconfigured instead of
/// failing.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: Option<String>,
    api_url: String,
    client: Client,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            api_url: GEMINI_API_URL.to_string(),
            client: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.gemini_api_key.clone())
    }
}

fn result_line(match_info: &Match) -> String {
    if let Some(result) = match_info.result.as_deref().filter(|r| !r.trim().is_empty()) {
        return result.to_string();
    }
    match (
        &match_info.team_a,
        &match_info.team_b,
        match_info.score_a,
        match_info.score_b,
    ) {
        (Some(a), Some(b), Some(sa), Some(sb)) => format!("{a} {sa} - {sb} {b}"),
        _ => "sin resultado cargado".to_string(),
    }
}

fn build_prompt(match_info: &Match) -> String {
    format!(
        "Actúa como un comentarista de fútbol argentino apasionado y un poco gracioso.\n\
         Escribe un resumen corto (máximo 300 caracteres) para el grupo de WhatsApp de \"Cancha Leconte\".\n\
         \n\
         Datos del partido:\n\
         - Nombre: {}\n\
         - Resultado: {}\n\
         - Figura (MVP): {}\n\
         - Notas extra: {}\n\
         \n\
         Usa emojis. Sé carismático.",
        match_info.name,
        result_line(match_info),
        match_info.mvp.as_deref().unwrap_or("sin figura"),
        match_info.comments.as_deref().unwrap_or(""),
    )
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
    }
}

impl SummaryGenerator for GeminiClient {
    async fn generate_summary(&self, match_info: &Match) -> Result<Option<String>> {
        let Some(api_key) = &self.api_key else {
            log::warn!("Gemini API key not configured, cannot generate summary");
            return Ok(None);
        };

        let body = json!({
            "contents": [{ "parts": [{ "text": build_prompt(match_info) }] }],
        });

        let url = format!(
            "{}/models/{}:generateContent",
            self.api_url, GEMINI_MODEL
        );
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            bail!("summary generation failed with status {status}: {detail}");
        }

        let parsed: GenerateContentResponse = response.json().await?;
        match parsed.into_text() {
            Some(text) => Ok(Some(text)),
            None => bail!("summary response contained no text"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::database::models::MatchStatus;

    fn settled_match() -> Match {
        let now = Utc::now().naive_utc();
        Match {
            id: "m1".to_string(),
            name: "Jueves en Leconte".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 8, 14).unwrap(),
            time: "20:00".to_string(),
            price_per_player: 5000.0,
            max_players: 10,
            location_link: String::new(),
            status: MatchStatus::Finished,
            result: None,
            team_a: Some("Rojo".to_string()),
            team_b: Some("Negro".to_string()),
            score_a: Some(3),
            score_b: Some(2),
            mvp: Some("Lolo".to_string()),
            comments: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn prompt_prefers_the_free_text_result() {
        let mut m = settled_match();
        m.result = Some("Ganó el rojo 3 a 2".to_string());
        assert!(build_prompt(&m).contains("Ganó el rojo 3 a 2"));
    }

    #[test]
    fn prompt_falls_back_to_the_structured_score() {
        let m = settled_match();
        assert!(build_prompt(&m).contains("Rojo 3 - 2 Negro"));
    }

    #[actix_web::test]
    async fn missing_api_key_reports_unconfigured() {
        let client = GeminiClient::new(None);
        let summary = client.generate_summary(&settled_match()).await.unwrap();
        assert_eq!(summary, None);
    }
}
