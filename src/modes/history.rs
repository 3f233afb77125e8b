//! History ledger.
//!
//! Finished rounds are appended as `HistoryRow`s. `history` merges a new row,
//! persists the ledger through a `HistoryStore` and returns a ranked view.
//! Rows may carry a `partition` (a session key) so a recurring event can be
//! ranked per session.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModeError;

/// One ledger row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub player: String,
    pub team: String,
    pub score: f64,
    /// Stamped when the row is added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    /// Mode-specific columns.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryRow {
    pub fn new(player: impl Into<String>, team: impl Into<String>, score: f64) -> Self {
        Self {
            player: player.into(),
            team: team.into(),
            score,
            timestamp: None,
            partition: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Mean score of one team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamScore {
    pub team: String,
    pub mean: f64,
}

/// Ranked view of a ledger.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryView {
    pub columns: Vec<String>,
    /// Sorted by score, best first.
    pub rows: Vec<HistoryRow>,
    /// Sorted by mean, best first.
    pub teams: Vec<TeamScore>,
    /// Rank of the row added by this call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_index: Option<usize>,
}

/// Where a ledger lives.
pub trait HistoryStore: Send {
    fn load(&self) -> Result<Vec<HistoryRow>, ModeError>;

    fn save(&mut self, rows: &[HistoryRow]) -> Result<(), ModeError>;
}

/// In-memory ledger.
#[derive(Clone, Debug, Default)]
pub struct MemoryHistory {
    rows: Vec<HistoryRow>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rows(rows: Vec<HistoryRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[HistoryRow] {
        &self.rows
    }
}

impl HistoryStore for MemoryHistory {
    fn load(&self) -> Result<Vec<HistoryRow>, ModeError> {
        Ok(self.rows.clone())
    }

    fn save(&mut self, rows: &[HistoryRow]) -> Result<(), ModeError> {
        self.rows = rows.to_vec();
        Ok(())
    }
}

/// Merge `add` into the ledger and rank it.
///
/// `existing` replaces the stored ledger as the base when given. With
/// `partition`, only rows of that session are ranked, but the whole ledger is
/// persisted. Returns `None` for an empty ledger with nothing to add.
pub fn history(
    store: &mut dyn HistoryStore,
    existing: Option<Vec<HistoryRow>>,
    add: Option<HistoryRow>,
    partition: Option<&str>,
) -> Result<Option<HistoryView>, ModeError> {
    let mut ledger = match existing {
        Some(rows) => rows,
        None => store.load()?,
    };
    if ledger.is_empty() && add.is_none() {
        return Ok(None);
    }

    let added = add.map(|mut row| {
        row.timestamp = Some(Utc::now());
        ledger.push(row.clone());
        row
    });
    if added.is_some() {
        store.save(&ledger)?;
    }

    let mut rows: Vec<HistoryRow> = ledger
        .into_iter()
        .filter(|row| partition.map_or(true, |p| row.partition.as_deref() == Some(p)))
        .collect();
    rows.sort_by(|a, b| b.score.total_cmp(&a.score));

    let new_index = added.and_then(|new| rows.iter().position(|row| *row == new));

    let mut columns = vec!["Player".to_string(), "Team".to_string(), "Score".to_string()];
    if rows.iter().any(|row| row.partition.is_some()) {
        columns.push("Session".to_string());
    }

    Ok(Some(HistoryView {
        columns,
        teams: team_means(&rows),
        rows,
        new_index,
    }))
}

fn team_means(rows: &[HistoryRow]) -> Vec<TeamScore> {
    let mut sums: FxHashMap<&str, (f64, usize)> = FxHashMap::default();
    for row in rows {
        let entry = sums.entry(row.team.as_str()).or_insert((0.0, 0));
        entry.0 += row.score;
        entry.1 += 1;
    }

    let mut teams: Vec<TeamScore> = sums
        .into_iter()
        .map(|(team, (sum, n))| TeamScore {
            team: team.to_string(),
            mean: sum / n as f64,
        })
        .collect();
    teams.sort_by(|a, b| b.mean.total_cmp(&a.mean).then_with(|| a.team.cmp(&b.team)));
    teams
}
