//! JSON game records as exported by the game server

use crate::error::{RankingError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// Identifier or placing that may be exported either as a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    Number(i64),
    Text(String),
}

impl RecordValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RecordValue::Number(n) => Some(*n),
            RecordValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for RecordValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordValue::Number(n) => write!(f, "{}", n),
            RecordValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// One participant of a recorded game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(rename = "userID")]
    pub user_id: RecordValue,
    pub rank: RecordValue,
    #[serde(rename = "errorLogName", default)]
    pub error_log_name: Option<String>,
}

impl UserRecord {
    /// Name the competitor is rated under, `"username (userID)"`
    pub fn competitor_name(&self) -> String {
        format!("{} ({})", self.username, self.user_id)
    }

    pub fn had_error(&self) -> bool {
        self.error_log_name.is_some()
    }

    pub fn placing(&self) -> Result<u32> {
        self.rank
            .as_i64()
            .and_then(|rank| u32::try_from(rank).ok())
            .ok_or_else(|| {
                RankingError::InvalidGameRecord {
                    reason: format!("{} has invalid rank {}", self.username, self.rank),
                }
                .into()
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(rename = "gameID")]
    pub game_id: RecordValue,
    #[serde(rename = "workerID", default)]
    pub worker_id: Option<RecordValue>,
    pub users: Vec<UserRecord>,
}

impl GameRecord {
    pub fn game_number(&self) -> Result<i64> {
        self.game_id.as_i64().ok_or_else(|| {
            RankingError::InvalidGameRecord {
                reason: format!("game id {:?} is not numeric", self.game_id.to_string()),
            }
            .into()
        })
    }

    /// True when any participant left an error log
    pub fn had_error(&self) -> bool {
        self.users.iter().any(UserRecord::had_error)
    }
}

/// Parse one JSON document holding an array of game records
pub fn parse_game_records(text: &str) -> Result<Vec<GameRecord>> {
    serde_json::from_str(text).map_err(|e| {
        RankingError::InvalidGameRecord {
            reason: e.to_string(),
        }
        .into()
    })
}

/// Concatenate batches, keep the first record seen for each game id and sort
/// by numeric game id
pub fn merge_game_records<I>(batches: I) -> Result<Vec<GameRecord>>
where
    I: IntoIterator<Item = Vec<GameRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for record in batches.into_iter().flatten() {
        if seen.insert(record.game_number()?) {
            merged.push(record);
        }
    }

    merged.sort_by_key(|record| record.game_id.as_i64());
    Ok(merged)
}

/// Read and merge every file in `paths`
pub fn load_game_records<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<GameRecord>> {
    let mut batches = Vec::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        info!("Reading {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read game file {}", path.display()))?;
        let records = parse_game_records(&text)
            .with_context(|| format!("Failed to parse game file {}", path.display()))?;
        batches.push(records);
    }

    let records = merge_game_records(batches)?;
    info!("{} games loaded.", records.len());
    Ok(records)
}
