use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::error::Result;
use crate::types::ContestRecord;

/// Persistent home of processed contests, keyed by contest id.
#[async_trait]
pub trait ContestStore: Send + Sync {
    async fn exists(&self, contest_id: i64) -> Result<bool>;

    /// Insert, or replace the row with the same `contest_id`.
    async fn upsert(&self, record: &ContestRecord) -> Result<()>;
}

pub struct SqliteContestStore {
    pool: SqlitePool,
}

impl SqliteContestStore {
    /// Open (creating if missing) the database file and run migrations.
    pub async fn connect(db_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn count(&self) -> Result<i64> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM contest_perf")
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }
}

#[async_trait]
impl ContestStore for SqliteContestStore {
    async fn exists(&self, contest_id: i64) -> Result<bool> {
        let found: Option<(i64,)> =
            sqlx::query_as("SELECT contest_id FROM contest_perf WHERE contest_id = ?")
                .bind(contest_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    async fn upsert(&self, record: &ContestRecord) -> Result<()> {
        let data = serde_json::to_string(&record.data)?;
        let uploaded_at = now_ns() as i64;

        sqlx::query(
            r#"
            INSERT INTO contest_perf (contest_id, division, data, uploaded_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(contest_id) DO UPDATE SET
                division = excluded.division,
                data = excluded.data,
                uploaded_at = excluded.uploaded_at
            "#,
        )
        .bind(record.contest_id)
        .bind(record.division.as_str())
        .bind(data)
        .bind(uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}

#[cfg(test)]
impl SqliteContestStore {
    pub(crate) async fn load(&self, contest_id: i64) -> Result<Option<ContestRecord>> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT contest_id, division, data FROM contest_perf WHERE contest_id = ?",
        )
        .bind(contest_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((contest_id, division, data)) => Ok(Some(ContestRecord {
                contest_id,
                division,
                data: serde_json::from_str(&data)?,
            })),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> SqliteContestStore {
    // One connection: every `sqlite::memory:` connection is its own database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteContestStore::with_pool(pool).await.unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Participant;

    fn record(contest_id: i64, handles: &[&str]) -> ContestRecord {
        ContestRecord {
            contest_id,
            division: "Div2".to_string(),
            data: handles
                .iter()
                .enumerate()
                .map(|(i, h)| Participant {
                    handle: h.to_string(),
                    rank: i as u32 + 1,
                    old_rating: 1500,
                    performance: Some(1600 - 100 * i as i32),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn missing_contest_does_not_exist() {
        let store = memory_store().await;
        assert!(!store.exists(1).await.unwrap());
        assert!(store.load(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_then_load_preserves_order() {
        let store = memory_store().await;
        let rec = record(1900, &["alice", "bob", "carol"]);
        store.upsert(&rec).await.unwrap();

        assert!(store.exists(1900).await.unwrap());
        assert!(!store.exists(1901).await.unwrap());
        assert_eq!(store.load(1900).await.unwrap(), Some(rec));
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let store = memory_store().await;
        store.upsert(&record(5, &["alice"])).await.unwrap();

        let mut replacement = record(5, &["bob", "carol"]);
        replacement.division = "Div1".to_string();
        store.upsert(&replacement).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let loaded = store.load(5).await.unwrap().unwrap();
        assert_eq!(loaded.division, "Div1");
        assert_eq!(loaded.data.len(), 2);
    }
}
