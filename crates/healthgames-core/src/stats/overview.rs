//! Personal and admin dashboard figures.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::games::GameId;
use crate::session::GameSession;

/// Sessions started within this window count a user as active.
const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Minutes and session count of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUsage {
    pub game_id: GameId,
    pub sessions: u32,
    /// Total play time, rounded to whole minutes.
    pub minutes: u64,
    /// Mean session length in whole seconds.
    pub average_seconds: u64,
}

/// Headline figures of one user's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_sessions: u32,
    pub completed_sessions: u32,
    /// Percentage, 0 when there are no sessions.
    pub completion_rate: f64,
    pub total_minutes: u64,
    pub sessions_today: u32,
    /// Distinct UTC days with at least one session.
    pub active_days: u32,
    pub per_game: Vec<GameUsage>,
}

fn rounded_minutes(ms: u64) -> u64 {
    (ms + 30_000) / 60_000
}

fn day_of(ms: u64) -> Option<NaiveDate> {
    let ms = i64::try_from(ms).ok()?;
    DateTime::from_timestamp_millis(ms).map(|t| t.date_naive())
}

/// Fold `sessions` into dashboard figures. `now_ms` decides what "today" is.
pub fn overview(sessions: &[GameSession], now_ms: u64) -> Overview {
    let today = day_of(now_ms);
    let mut per_game: BTreeMap<GameId, (u32, u64)> = BTreeMap::new();
    let mut days = Vec::new();
    let mut completed = 0;
    let mut sessions_today = 0;
    let mut total_ms = 0;

    for session in sessions {
        let entry = per_game.entry(session.game_id).or_default();
        entry.0 += 1;
        entry.1 += session.duration.unwrap_or(0);
        total_ms += session.duration.unwrap_or(0);
        if session.completed {
            completed += 1;
        }

        let day = day_of(session.start_time);
        if day.is_some() && day == today {
            sessions_today += 1;
        }
        if let Some(day) = day {
            days.push(day);
        }
    }
    days.sort_unstable();
    days.dedup();

    let total = sessions.len() as u32;
    Overview {
        total_sessions: total,
        completed_sessions: completed,
        completion_rate: if total == 0 {
            0.0
        } else {
            f64::from(completed) / f64::from(total) * 100.0
        },
        total_minutes: rounded_minutes(total_ms),
        sessions_today,
        active_days: days.len() as u32,
        per_game: per_game
            .into_iter()
            .map(|(game_id, (count, ms))| GameUsage {
                game_id,
                sessions: count,
                minutes: rounded_minutes(ms),
                average_seconds: (ms / u64::from(count) + 500) / 1_000,
            })
            .collect(),
    }
}

/// The `n` most recently started sessions, newest first.
pub fn recent(sessions: &[GameSession], n: usize) -> Vec<&GameSession> {
    let mut sorted: Vec<&GameSession> = sessions.iter().collect();
    sorted.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    sorted.truncate(n);
    sorted
}

/// Plays and average length of one game across all users.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminGameUsage {
    pub game_id: GameId,
    pub plays: u32,
    pub average_minutes: f64,
}

/// Figures across every stored user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_users: u32,
    /// Users with a session started in the last seven days.
    pub active_users: u32,
    pub total_sessions: u32,
    pub average_session_minutes: f64,
    pub games: Vec<AdminGameUsage>,
}

impl AdminOverview {
    /// Fold `(user id, sessions)` pairs, as returned by
    /// [`stored_sessions`](crate::session::stored_sessions).
    pub fn build(users: &[(String, Vec<GameSession>)], now_ms: u64) -> Self {
        let cutoff = DateTime::from_timestamp_millis(i64::try_from(now_ms).unwrap_or(i64::MAX))
            .map(|now| now - Duration::days(ACTIVE_WINDOW_DAYS))
            .map(|t| t.timestamp_millis().max(0) as u64)
            .unwrap_or(0);

        let mut games: BTreeMap<GameId, (u32, u64)> = BTreeMap::new();
        let mut active_users = 0;
        let mut total_sessions = 0;
        let mut total_ms = 0;

        for (_, sessions) in users {
            if sessions.iter().any(|s| s.start_time >= cutoff) {
                active_users += 1;
            }
            for session in sessions {
                total_sessions += 1;
                let ms = session.duration.unwrap_or(0);
                total_ms += ms;
                let entry = games.entry(session.game_id).or_default();
                entry.0 += 1;
                entry.1 += ms;
            }
        }

        Self {
            total_users: users.len() as u32,
            active_users,
            total_sessions,
            average_session_minutes: average_minutes(total_ms, total_sessions),
            games: games
                .into_iter()
                .map(|(game_id, (plays, ms))| AdminGameUsage {
                    game_id,
                    plays,
                    average_minutes: average_minutes(ms, plays),
                })
                .collect(),
        }
    }

    /// The same figures as of the current wall-clock time.
    pub fn now(users: &[(String, Vec<GameSession>)]) -> Self {
        Self::build(users, Utc::now().timestamp_millis().max(0) as u64)
    }
}

/// Mean minutes to one decimal place.
fn average_minutes(total_ms: u64, count: u32) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let minutes = total_ms as f64 / f64::from(count) / 60_000.0;
    (minutes * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: u64 = 86_400_000;
    // 2024-03-10T12:00:00Z
    const NOW: u64 = 1_710_072_000_000;

    fn session(game_id: GameId, start: u64, duration: Option<u64>, completed: bool) -> GameSession {
        GameSession {
            game_id,
            start_time: start,
            end_time: duration.map(|d| start + d),
            duration,
            completed,
            closed_tab: false,
            stats: None,
        }
    }

    #[test]
    fn overview_counts_minutes_and_completion() {
        let sessions = [
            session(GameId::Memory, NOW - DAY_MS, Some(90_000), true),
            session(GameId::Memory, NOW - 1_000, Some(150_000), false),
            session(GameId::Breathing, NOW - 500, None, true),
        ];
        let view = overview(&sessions, NOW);
        assert_eq!(view.total_sessions, 3);
        assert_eq!(view.completed_sessions, 2);
        assert!((view.completion_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(view.total_minutes, 4);
        assert_eq!(view.sessions_today, 2);
        assert_eq!(view.active_days, 2);

        let memory = &view.per_game[0];
        assert_eq!(memory.game_id, GameId::Memory);
        assert_eq!(memory.sessions, 2);
        assert_eq!(memory.minutes, 4);
        assert_eq!(memory.average_seconds, 120);
        assert_eq!(view.per_game[1].minutes, 0);
    }

    #[test]
    fn empty_overview_is_zeroed() {
        let view = overview(&[], NOW);
        assert_eq!(view.total_sessions, 0);
        assert_eq!(view.completion_rate, 0.0);
        assert!(view.per_game.is_empty());
    }

    #[test]
    fn recent_is_newest_first_and_bounded() {
        let sessions: Vec<GameSession> = (0..12)
            .map(|i| session(GameId::Reaction, NOW + i, Some(1_000), true))
            .collect();
        let latest = recent(&sessions, 10);
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].start_time, NOW + 11);
        assert_eq!(latest[9].start_time, NOW + 2);
        assert_eq!(recent(&sessions[..1], 10).len(), 1);
    }

    #[test]
    fn admin_overview_counts_every_user() {
        let users = vec![
            (
                "ana".to_string(),
                vec![
                    session(GameId::Memory, NOW - DAY_MS, Some(120_000), true),
                    session(GameId::Breathing, NOW - 2 * DAY_MS, Some(60_000), true),
                ],
            ),
            (
                "bo".to_string(),
                vec![session(GameId::Memory, NOW - 30 * DAY_MS, Some(240_000), false)],
            ),
            ("cy".to_string(), Vec::new()),
        ];
        let admin = AdminOverview::build(&users, NOW);
        assert_eq!(admin.total_users, 3);
        assert_eq!(admin.active_users, 1);
        assert_eq!(admin.total_sessions, 3);
        assert_eq!(admin.average_session_minutes, 2.3);
        assert_eq!(
            admin.games[0],
            AdminGameUsage {
                game_id: GameId::Memory,
                plays: 2,
                average_minutes: 3.0,
            }
        );
    }
}
