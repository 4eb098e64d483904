use anyhow::Result;
use chrono::{DateTime, Days, FixedOffset, Timelike};
use serde::Serialize;

use crate::config::Config;
use crate::database::reminder_repository::ReminderKind;
use crate::database::{MatchRepository, ReminderRepository};
use crate::services::traits::Notifier;
use crate::services::whatsapp::{send_match_reminder, send_payment_request};

/// Pre-match reminders go out when the match starts in 110..=130 minutes.
/// The window is wider than the cron cadence so a sweep cannot miss it.
pub const PRE_MATCH_WINDOW_MIN: i64 = 110;
pub const PRE_MATCH_WINDOW_MAX: i64 = 130;

/// Day-after payment reminders go out within 20 minutes of the match's clock
/// time, i.e. roughly 24 hours after kickoff.
pub const POST_MATCH_TOLERANCE: i64 = 20;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    pub match_reminders: Vec<String>,
    pub payment_reminders: Vec<String>,
}

/// Parses the free-form match time field. Accepted formats: "20:00",
/// "20:00hs", "20" and "20hs". Anything else yields `None`.
pub fn parse_clock_time(raw: &str) -> Option<(u32, u32)> {
    let s = raw.trim();
    let s = s.strip_suffix("hs").unwrap_or(s).trim();
    let (hour, minute) = match s.split_once(':') {
        Some((h, m)) => (h.trim().parse().ok()?, m.trim().parse().ok()?),
        None => (s.parse().ok()?, 0),
    };
    (hour < 24 && minute < 60).then_some((hour, minute))
}

fn minutes_of_day(hour: u32, minute: u32) -> i64 {
    i64::from(hour) * 60 + i64::from(minute)
}

pub fn in_pre_match_window(match_minutes: i64, now_minutes: i64) -> bool {
    let diff = match_minutes - now_minutes;
    (PRE_MATCH_WINDOW_MIN..=PRE_MATCH_WINDOW_MAX).contains(&diff)
}

pub fn in_post_match_window(match_minutes: i64, now_minutes: i64) -> bool {
    (now_minutes - match_minutes).abs() <= POST_MATCH_TOLERANCE
}

/// One stateless reminder sweep. Both passes use the same fixed-offset `now`;
/// a match with an unparseable time is skipped, and a match already marked in
/// the reminder log is never sent twice.
pub async fn run_sweep<N: Notifier>(
    matches: &MatchRepository,
    sent_log: &ReminderRepository,
    notifier: &N,
    config: &Config,
    now: DateTime<FixedOffset>,
) -> Result<SweepSummary> {
    let mut summary = SweepSummary::default();
    let today = now.date_naive();
    let yesterday = today - Days::new(1);
    let now_minutes = minutes_of_day(now.hour(), now.minute());

    // Pass 1: pre-match reminders for today's playable matches.
    for m in matches.playable_on_date(today).await? {
        let Some((hour, minute)) = parse_clock_time(&m.info.time) else {
            log::warn!(
                "Skipping match '{}': unparseable time {:?}",
                m.info.name,
                m.info.time
            );
            continue;
        };
        if !in_pre_match_window(minutes_of_day(hour, minute), now_minutes) {
            continue;
        }
        match sent_log.try_mark_sent(&m.info.id, ReminderKind::PreMatch).await {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::error!("Failed to record reminder for match {}: {}", m.info.id, e);
                continue;
            }
        }

        let location = if m.info.location_link.trim().is_empty() {
            config.fallback_location_link.as_str()
        } else {
            m.info.location_link.as_str()
        };
        for player in &m.players {
            if player.phone.trim().is_empty() {
                continue;
            }
            send_match_reminder(notifier, &player.phone, &m.info.name, &m.info.time, location)
                .await;
        }
        log::info!("Match reminders sent for '{}'", m.info.name);
        summary.match_reminders.push(m.info.id.clone());
    }

    // Pass 2: payment requests for yesterday's finished matches, ~24h after
    // kickoff. Uses the static payment link, not a per-player preference.
    for m in matches.finished_on_date(yesterday).await? {
        let Some((hour, minute)) = parse_clock_time(&m.info.time) else {
            log::warn!(
                "Skipping match '{}': unparseable time {:?}",
                m.info.name,
                m.info.time
            );
            continue;
        };
        if !in_post_match_window(minutes_of_day(hour, minute), now_minutes) {
            continue;
        }
        match sent_log
            .try_mark_sent(&m.info.id, ReminderKind::PaymentRequest)
            .await
        {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => {
                log::error!("Failed to record reminder for match {}: {}", m.info.id, e);
                continue;
            }
        }

        for player in &m.players {
            if player.has_paid || player.phone.trim().is_empty() {
                continue;
            }
            send_payment_request(
                notifier,
                &player.phone,
                &m.info.name,
                &config.fallback_payment_link,
            )
            .await;
        }
        log::info!("Payment reminders sent for '{}'", m.info.name);
        summary.payment_reminders.push(m.info.id.clone());
    }

    Ok(summary)
}
