// SQLite persistence layer for finished sessions and their final scores.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::record::{DraftMethod, DraftResult, SessionRecord, SessionSnapshot, UsageCounts};

/// SQLite-backed record store: one `sessions` row per allocation and one
/// `session_players` row per player in it.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sessions (
                id                INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at        TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                player_count      INTEGER NOT NULL,
                turn_sequence     TEXT NOT NULL,
                first_round_order TEXT NOT NULL,
                method            TEXT NOT NULL,
                board_variant     TEXT NOT NULL,
                scored            INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS session_players (
                session_id           INTEGER NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                player_name          TEXT NOT NULL,
                seat                 INTEGER NOT NULL,
                faction              TEXT NOT NULL,
                role                 TEXT NOT NULL,
                contract             TEXT NOT NULL,
                bid                  INTEGER,
                starting_score       INTEGER NOT NULL,
                first_round_position INTEGER NOT NULL,
                final_score          INTEGER,
                PRIMARY KEY (session_id, player_name)
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_scored ON sessions(scored);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the connection lock. A poisoned lock is recovered since the
    /// connection itself stays usable.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a finished allocation and return its new session id. The
    /// session row and all player rows are written in one transaction.
    pub fn append_session(&self, record: &SessionRecord) -> Result<i64> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin append transaction")?;

        let turn_json = serde_json::to_string(&record.turn_sequence)
            .context("failed to serialize turn sequence")?;
        let first_round_json = serde_json::to_string(&record.first_round_order)
            .context("failed to serialize first-round order")?;

        tx.execute(
            "INSERT INTO sessions (player_count, turn_sequence, first_round_order, method, board_variant)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.player_count as i64,
                turn_json,
                first_round_json,
                record.method.as_str(),
                record.board_variant,
            ],
        )
        .context("failed to insert session")?;
        let session_id = tx.last_insert_rowid();

        for result in &record.results {
            let seat = record
                .turn_sequence
                .iter()
                .position(|p| p == &result.player)
                .with_context(|| format!("result for '{}' has no seat", result.player))?;
            let first_round = record
                .first_round_position(&result.player)
                .with_context(|| format!("'{}' missing from first-round order", result.player))?;

            tx.execute(
                "INSERT INTO session_players
                    (session_id, player_name, seat, faction, role, contract, bid, starting_score, first_round_position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session_id,
                    result.player,
                    seat as i64,
                    result.faction,
                    result.role,
                    result.contract,
                    result.bid.map(i64::from),
                    result.starting_score,
                    first_round as i64,
                ],
            )
            .context("failed to insert session player")?;
        }

        tx.commit().context("failed to commit append_session")?;
        debug!("appended session {} ({} players)", session_id, record.player_count);
        Ok(session_id)
    }

    /// Read one session back. Returns `None` if the id is unknown.
    pub fn load_session(&self, session_id: i64) -> Result<Option<SessionSnapshot>> {
        let conn = self.conn();

        let header = conn
            .query_row(
                "SELECT created_at, player_count, turn_sequence, first_round_order, method, board_variant
                 FROM sessions WHERE id = ?1",
                params![session_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, String>(5)?,
                    ))
                },
            )
            .optional()
            .context("failed to query session")?;

        let Some((created_at, player_count, turn_json, first_round_json, method_str, board_variant)) =
            header
        else {
            return Ok(None);
        };

        let turn_sequence: Vec<String> =
            serde_json::from_str(&turn_json).context("failed to parse turn sequence")?;
        let first_round_order: Vec<String> =
            serde_json::from_str(&first_round_json).context("failed to parse first-round order")?;
        let method = DraftMethod::from_str_method(&method_str)
            .with_context(|| format!("unknown draft method '{method_str}'"))?;

        let mut stmt = conn
            .prepare(
                "SELECT player_name, faction, role, contract, bid, starting_score, final_score
                 FROM session_players WHERE session_id = ?1 ORDER BY seat",
            )
            .context("failed to prepare session players query")?;

        let rows = stmt
            .query_map(params![session_id], |row| {
                let bid: Option<i64> = row.get(4)?;
                Ok((
                    DraftResult {
                        player: row.get(0)?,
                        faction: row.get(1)?,
                        role: row.get(2)?,
                        contract: row.get(3)?,
                        bid: bid.and_then(|b| u8::try_from(b).ok()),
                        starting_score: row.get(5)?,
                    },
                    row.get::<_, Option<i32>>(6)?,
                ))
            })
            .context("failed to query session players")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map session player rows")?;

        let mut results = Vec::with_capacity(rows.len());
        let mut final_scores = HashMap::new();
        for (result, final_score) in rows {
            if let Some(score) = final_score {
                final_scores.insert(result.player.clone(), score);
            }
            results.push(result);
        }

        Ok(Some(SessionSnapshot {
            id: session_id,
            created_at,
            record: SessionRecord {
                player_count: player_count as usize,
                turn_sequence,
                results,
                first_round_order,
                method,
                board_variant,
            },
            final_scores,
        }))
    }

    /// The most recent session that does not yet have every final score.
    pub fn find_unscored_session(&self) -> Result<Option<SessionSnapshot>> {
        let id: Option<i64> = {
            let conn = self.conn();
            conn.query_row(
                "SELECT id FROM sessions WHERE scored = 0 ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query unscored session")?
        };
        match id {
            Some(id) => self.load_session(id),
            None => Ok(None),
        }
    }

    /// Record final scores for some or all players of a session.
    ///
    /// Returns `false` without writing anything if the session does not
    /// exist or any name is not one of its players. The session is marked
    /// scored once every player has a final score.
    pub fn apply_final_scores(&self, session_id: i64, scores: &HashMap<String, i32>) -> Result<bool> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin scoring transaction")?;

        let exists: bool = tx
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sessions WHERE id = ?1)",
                params![session_id],
                |row| row.get(0),
            )
            .context("failed to check session existence")?;
        if !exists {
            return Ok(false);
        }

        for (player, score) in scores {
            let updated = tx
                .execute(
                    "UPDATE session_players SET final_score = ?1
                     WHERE session_id = ?2 AND player_name = ?3",
                    params![score, session_id, player],
                )
                .context("failed to update final score")?;
            if updated == 0 {
                // Dropping the transaction rolls back earlier updates.
                return Ok(false);
            }
        }

        let missing: i64 = tx
            .query_row(
                "SELECT COUNT(*) FROM session_players WHERE session_id = ?1 AND final_score IS NULL",
                params![session_id],
                |row| row.get(0),
            )
            .context("failed to count unscored players")?;
        if missing == 0 {
            tx.execute("UPDATE sessions SET scored = 1 WHERE id = ?1", params![session_id])
                .context("failed to mark session scored")?;
        }

        tx.commit().context("failed to commit apply_final_scores")?;
        Ok(true)
    }

    /// Count faction and role appearances over the `k` most recent sessions.
    pub fn recent_usage_counts(&self, k: usize) -> Result<UsageCounts> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT faction, role FROM session_players
                 WHERE session_id IN (SELECT id FROM sessions ORDER BY id DESC LIMIT ?1)",
            )
            .context("failed to prepare usage query")?;

        let rows = stmt
            .query_map(params![k as i64], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .context("failed to query usage counts")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map usage rows")?;

        let mut usage = UsageCounts::default();
        for (faction, role) in rows {
            *usage.factions.entry(faction).or_insert(0) += 1;
            *usage.roles.entry(role).or_insert(0) += 1;
        }
        Ok(usage)
    }

    /// Total number of stored sessions.
    pub fn session_count(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
            .context("failed to count sessions")?;
        Ok(count as usize)
    }
}
