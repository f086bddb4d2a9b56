//! Record filters and corpus construction

use crate::corpus::records::GameRecord;
use crate::error::{RankingError, Result};
use crate::types::{Game, RankingCorpus};
use anyhow::Context;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Workers above this id ran untrusted builds
pub const SUSPECT_WORKER_CUTOFF: i64 = 160;

/// Usernames of bots that crash in every game they play
pub const CRASH_BOTS: [&str; 12] = [
    "FredericWantiez",
    "Sametine",
    "aikinogard",
    "ozadDaro",
    "cymb01",
    "byrd106",
    "kxmbrian",
    "sscholle",
    "patrisk",
    "jvienna",
    "ardapekis",
    "fbastos1",
];

/// Drop every game in which any participant left an error log
pub fn filter_error_games(records: Vec<GameRecord>) -> Vec<GameRecord> {
    let kept: Vec<GameRecord> = records.into_iter().filter(|r| !r.had_error()).collect();
    info!("Filtered out error games, leaving {}", kept.len());
    kept
}

fn is_suspect(record: &GameRecord) -> bool {
    let untrusted_worker = match record.worker_id.as_ref().map(|w| w.as_i64()) {
        Some(Some(worker)) => worker > SUSPECT_WORKER_CUTOFF,
        _ => true,
    };
    untrusted_worker && record.had_error()
}

/// Drop games played on an unknown or untrusted worker that also had an error
pub fn filter_suspect_games(records: Vec<GameRecord>) -> Vec<GameRecord> {
    let start = records.len();
    let kept: Vec<GameRecord> = records.into_iter().filter(|r| !is_suspect(r)).collect();
    info!(
        "Filtered out {} suspect games, leaving {}",
        start - kept.len(),
        kept.len()
    );
    kept
}

/// Per-player and per-range selection applied while building the corpus
#[derive(Debug, Clone, Default)]
pub struct CorpusFilter {
    /// Usernames whose entries are removed from every game
    pub excluded_players: BTreeSet<String>,
    /// Positive keeps the first N games, negative keeps the last N
    pub game_limit: Option<i64>,
}

impl CorpusFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exclude<I, S>(mut self, players: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_players
            .extend(players.into_iter().map(Into::into));
        self
    }

    /// Also exclude every bot in [`CRASH_BOTS`]
    pub fn exclude_crash_bots(self) -> Self {
        info!("Removing crash bots.");
        self.exclude(CRASH_BOTS)
    }

    pub fn with_game_limit(mut self, limit: i64) -> Self {
        self.game_limit = Some(limit);
        self
    }
}

/// Convert records into games, dropping excluded players and any game left
/// with fewer than two competitors, then apply the game limit
pub fn build_corpus(records: &[GameRecord], filter: &CorpusFilter) -> Result<RankingCorpus> {
    if !filter.excluded_players.is_empty() {
        info!("Excluding {:?}", filter.excluded_players);
    }

    let mut games = Vec::with_capacity(records.len());
    for record in records {
        let entries = record
            .users
            .iter()
            .filter(|user| !filter.excluded_players.contains(&user.username))
            .map(|user| Ok((user.competitor_name(), user.placing()?)))
            .collect::<Result<Vec<(String, u32)>>>()?;

        if entries.len() < 2 {
            debug!("Skipping game {} with {} competitor(s)", record.game_id, entries.len());
            continue;
        }

        let game = Game::from_ranks(entries).map_err(|e| RankingError::InvalidGameRecord {
            reason: format!("game {}: {}", record.game_id, e),
        })?;
        games.push(game);
    }

    match filter.game_limit {
        Some(limit) if limit > 0 => {
            games.truncate(usize::try_from(limit).context("game limit out of range")?);
            info!("Using first {} games.", games.len());
        }
        Some(limit) if limit < 0 => {
            let keep = usize::try_from(limit.unsigned_abs()).context("game limit out of range")?;
            let skip = games.len().saturating_sub(keep);
            games.drain(..skip);
            info!("Using last {} games.", games.len());
        }
        _ => {}
    }

    Ok(RankingCorpus::new(games))
}
