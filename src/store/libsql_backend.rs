//! libSQL store — async `Store` trait implementation.
//!
//! Supports local file and in-memory databases. Profile mutations are
//! single-statement whole-field updates, so a transition either commits
//! fully or not at all.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, Row, params};
use tracing::{debug, info};

use crate::engagement::model::{Challenge, ProfileUpdate, UserProfile};
use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::Store;

/// libSQL store backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to open libSQL database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("Failed to create in-memory database: {e}"))
            })?;

        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Connection(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 datetime string, falling back to the epoch minimum.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Convert `Option<i64>` to a libsql Value (NULL when absent).
fn opt_int(v: Option<i64>) -> libsql::Value {
    match v {
        Some(v) => libsql::Value::Integer(v),
        None => libsql::Value::Null,
    }
}

fn row_to_profile(row: &Row) -> Result<UserProfile, DatabaseError> {
    let responses_json: String = row
        .get(3)
        .map_err(|e| DatabaseError::Query(format!("responses column: {e}")))?;
    let responses: Vec<String> = serde_json::from_str(&responses_json)
        .map_err(|e| DatabaseError::Serialization(format!("responses JSON: {e}")))?;

    let points: i64 = row
        .get(2)
        .map_err(|e| DatabaseError::Query(format!("points column: {e}")))?;
    let awaiting: i64 = row
        .get(4)
        .map_err(|e| DatabaseError::Query(format!("awaiting_response column: {e}")))?;

    let created_at: String = row
        .get(6)
        .map_err(|e| DatabaseError::Query(format!("created_at column: {e}")))?;
    let updated_at: String = row
        .get(7)
        .map_err(|e| DatabaseError::Query(format!("updated_at column: {e}")))?;

    Ok(UserProfile {
        id: row
            .get(0)
            .map_err(|e| DatabaseError::Query(format!("id column: {e}")))?,
        name: row
            .get(1)
            .map_err(|e| DatabaseError::Query(format!("name column: {e}")))?,
        points: points as u32,
        responses,
        awaiting_response: awaiting != 0,
        current_challenge_id: row.get::<i64>(5).ok(),
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

const PROFILE_COLUMNS: &str =
    "id, name, points, responses, awaiting_response, current_challenge_id, created_at, updated_at";

// ── Store trait implementation ──────────────────────────────────────

#[async_trait]
impl Store for LibSqlStore {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?1"),
                params![user_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("get_profile: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_profile(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("get_profile: {e}"))),
        }
    }

    async fn create_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError> {
        let responses = serde_json::to_string(&profile.responses)
            .map_err(|e| DatabaseError::Serialization(format!("responses JSON: {e}")))?;

        self.conn()
            .execute(
                &format!(
                    "INSERT INTO users ({PROFILE_COLUMNS}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
                ),
                params![
                    profile.id.as_str(),
                    profile.name.as_str(),
                    profile.points as i64,
                    responses,
                    profile.awaiting_response as i64,
                    opt_int(profile.current_challenge_id),
                    profile.created_at.to_rfc3339(),
                    profile.updated_at.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("create_profile: {e}")))?;

        debug!(user_id = %profile.id, "Profile created");
        Ok(())
    }

    async fn apply_update(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn();

        let affected = match update {
            ProfileUpdate::ChallengeAssigned { challenge_id } => conn
                .execute(
                    "UPDATE users SET awaiting_response = 1, current_challenge_id = ?1, \
                     updated_at = ?2 WHERE id = ?3",
                    params![*challenge_id, now, user_id],
                )
                .await
                .map_err(|e| DatabaseError::Query(format!("apply_update (assign): {e}")))?,
            ProfileUpdate::ResponseAccepted { text, new_points } => conn
                .execute(
                    "UPDATE users SET responses = json_insert(responses, '$[#]', ?1), \
                     points = ?2, awaiting_response = 0, updated_at = ?3 WHERE id = ?4",
                    params![text.as_str(), *new_points as i64, now, user_id],
                )
                .await
                .map_err(|e| DatabaseError::Query(format!("apply_update (accept): {e}")))?,
            ProfileUpdate::Exited => conn
                .execute(
                    "UPDATE users SET awaiting_response = 0, updated_at = ?1 WHERE id = ?2",
                    params![now, user_id],
                )
                .await
                .map_err(|e| DatabaseError::Query(format!("apply_update (exit): {e}")))?,
        };

        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "user".into(),
                id: user_id.into(),
            });
        }

        debug!(user_id, update = ?update, "Profile updated");
        Ok(())
    }

    async fn query_next_challenge(
        &self,
        min_exclusive_id: i64,
    ) -> Result<Option<Challenge>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(
                "SELECT id, text FROM challenges WHERE id > ?1 ORDER BY id ASC LIMIT 1",
                params![min_exclusive_id],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("query_next_challenge: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let id: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("challenge id column: {e}")))?;
                let text: String = row
                    .get(1)
                    .map_err(|e| DatabaseError::Query(format!("challenge text column: {e}")))?;
                Ok(Some(Challenge { id, text }))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("query_next_challenge: {e}"))),
        }
    }

    async fn insert_challenge(&self, challenge: &Challenge) -> Result<bool, DatabaseError> {
        let affected = self
            .conn()
            .execute(
                "INSERT OR IGNORE INTO challenges (id, text) VALUES (?1, ?2)",
                params![challenge.id, challenge.text.as_str()],
            )
            .await
            .map_err(|e| DatabaseError::Query(format!("insert_challenge: {e}")))?;

        Ok(affected > 0)
    }

    async fn challenge_count(&self) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM challenges", ())
            .await
            .map_err(|e| DatabaseError::Query(format!("challenge_count: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| DatabaseError::Query(format!("challenge_count: {e}")))?;
                Ok(count as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(DatabaseError::Query(format!("challenge_count: {e}"))),
        }
    }
}
