use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};

use crate::{
    db::{
        connection::Database,
        helpers::{format_datetime, parse_datetime, to_u32},
    },
    models::BurstSession,
};

const SELECT_COLUMNS: &str =
    "SELECT id, folder_name, subject, started_at, stopped_at, frame_count FROM burst_sessions";

fn row_to_burst_session(row: &Row) -> Result<BurstSession> {
    let started_at: String = row.get("started_at")?;
    let stopped_at: String = row.get("stopped_at")?;
    let frame_count: i64 = row.get("frame_count")?;

    Ok(BurstSession {
        id: row.get("id")?,
        folder_name: row.get("folder_name")?,
        subject: row.get("subject")?,
        started_at: parse_datetime(&started_at, "started_at")?,
        stopped_at: parse_datetime(&stopped_at, "stopped_at")?,
        frame_count: to_u32(frame_count, "frame_count")?,
    })
}

impl Database {
    pub async fn insert_burst_session(&self, session: &BurstSession) -> Result<()> {
        let record = session.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO burst_sessions (id, folder_name, subject, started_at, stopped_at, frame_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.id,
                    record.folder_name,
                    record.subject,
                    format_datetime(&record.started_at),
                    format_datetime(&record.stopped_at),
                    i64::from(record.frame_count),
                    format_datetime(&Utc::now()),
                ],
            )
            .with_context(|| format!("failed to insert burst session {}", record.id))?;
            Ok(())
        })
        .await
    }

    /// Newest burst first.
    pub async fn list_burst_sessions(&self) -> Result<Vec<BurstSession>> {
        self.execute(|conn| {
            let mut stmt =
                conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY started_at DESC, rowid DESC"))?;
            let mut rows = stmt.query([])?;
            let mut sessions = Vec::new();
            while let Some(row) = rows.next()? {
                sessions.push(row_to_burst_session(row)?);
            }
            Ok(sessions)
        })
        .await
    }

    pub async fn get_burst_session(&self, id: &str) -> Result<Option<BurstSession>> {
        let id = id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
            let raw = stmt
                .query_row(params![id], |row| Ok(row_to_burst_session(row)))
                .optional()?;
            raw.transpose()
        })
        .await
    }

    /// Forgets one session. The frames on disk are left alone.
    pub async fn delete_burst_session(&self, id: &str) -> Result<bool> {
        let id = id.to_string();
        self.execute(move |conn| {
            let removed = conn.execute("DELETE FROM burst_sessions WHERE id = ?1", params![id])?;
            Ok(removed > 0)
        })
        .await
    }

    pub async fn clear_burst_history(&self) -> Result<usize> {
        self.execute(|conn| {
            let removed = conn
                .execute("DELETE FROM burst_sessions", [])
                .context("failed to clear burst history")?;
            Ok(removed)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone};

    fn session(id: &str, started_at: DateTime<Utc>, frame_count: u32) -> BurstSession {
        BurstSession {
            id: id.into(),
            folder_name: format!("2024-03-09_Mouse_BURST_{id}"),
            subject: "Mouse".into(),
            started_at,
            stopped_at: started_at + Duration::seconds(2),
            frame_count,
        }
    }

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("history.db")).unwrap();
        (dir, db)
    }

    #[tokio::test]
    async fn history_lists_newest_first() {
        let (_dir, db) = open();
        let base = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        db.insert_burst_session(&session("a", base, 3)).await.unwrap();
        db.insert_burst_session(&session("c", base + Duration::minutes(5), 8))
            .await
            .unwrap();
        db.insert_burst_session(&session("b", base + Duration::minutes(1), 1))
            .await
            .unwrap();

        let ids: Vec<String> = db
            .list_burst_sessions()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, ["c", "b", "a"]);
    }

    #[tokio::test]
    async fn get_returns_stored_fields() {
        let (_dir, db) = open();
        let stored = session("x", Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap(), 42);
        db.insert_burst_session(&stored).await.unwrap();

        assert_eq!(db.get_burst_session("x").await.unwrap(), Some(stored));
        assert_eq!(db.get_burst_session("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_sessions_are_refused_by_schema() {
        let (_dir, db) = open();
        let empty = session("e", Utc::now(), 0);
        assert!(db.insert_burst_session(&empty).await.is_err());
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let (_dir, db) = open();
        let base = Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap();
        db.insert_burst_session(&session("a", base, 3)).await.unwrap();
        db.insert_burst_session(&session("b", base, 4)).await.unwrap();

        assert!(db.delete_burst_session("a").await.unwrap());
        assert!(!db.delete_burst_session("a").await.unwrap());
        assert_eq!(db.clear_burst_history().await.unwrap(), 1);
        assert!(db.list_burst_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn history_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let db = Database::new(path.clone()).unwrap();
            db.insert_burst_session(&session("keep", Utc::now(), 2))
                .await
                .unwrap();
        }
        let db = Database::new(path).unwrap();
        assert_eq!(db.list_burst_sessions().await.unwrap().len(), 1);
    }
}
