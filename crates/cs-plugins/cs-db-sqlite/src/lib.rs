//! # cs-db-sqlite Implementation
//!
//! Maps between the SQLite relational model and the `cs-core` domain
//! models. Array-valued columns (screenshots, tags) are stored as JSON
//! text; UUIDs as 16-byte blobs.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use cs_core::error::{AppError, Result};
use cs_core::models::{Comment, NewComment, Suggestion, SuggestionRecord};
use cs_core::traits::{CommentStore, SuggestionStore};

/// Connects (creating the file if needed), ensures the schema, and hands
/// back the pool both stores share.
///
/// The pool is capped at one connection: SQLite in-memory databases are
/// per-connection, and the controller is single-writer anyway.
pub async fn connect(url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)
        .map_err(store_err)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(store_err)?;
    migrate(&pool).await?;
    log::debug!("sqlite schema ready at {url}");
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS suggestions (
            id BLOB PRIMARY KEY,
            title TEXT NOT NULL,
            short_description TEXT NOT NULL DEFAULT '',
            long_description TEXT NOT NULL DEFAULT '',
            header_image TEXT NOT NULL DEFAULT '',
            screenshots TEXT NOT NULL DEFAULT '[]',
            tags TEXT NOT NULL DEFAULT '[]',
            price REAL NOT NULL DEFAULT 0,
            username TEXT NOT NULL,
            is_default INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(store_err)?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS comments (
            id BLOB PRIMARY KEY,
            suggestion_id BLOB NOT NULL,
            username TEXT NOT NULL,
            content TEXT NOT NULL,
            rating INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(store_err)?;

    Ok(())
}

#[derive(Clone)]
pub struct SqliteSuggestionStore {
    pool: SqlitePool,
}

impl SqliteSuggestionStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteSuggestionStore { pool }
    }

    async fn fetch_by_id(&self, id: Uuid) -> Result<Option<Suggestion>> {
        let row = sqlx::query("SELECT * FROM suggestions WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| row_to_suggestion(&r)))
    }
}

#[derive(Clone)]
pub struct SqliteCommentStore {
    pool: SqlitePool,
}

impl SqliteCommentStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCommentStore { pool }
    }
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

fn store_err(err: sqlx::Error) -> AppError {
    AppError::Transport(err.to_string())
}

fn json_column(value: &[String]) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "[]".to_string())
}

fn row_to_suggestion(row: &SqliteRow) -> Suggestion {
    Suggestion {
        id: Some(blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice())),
        title: row.get("title"),
        short_description: row.get("short_description"),
        long_description: row.get("long_description"),
        header_image: row.get("header_image"),
        screenshots: serde_json::from_str(&row.get::<String, _>("screenshots")).unwrap_or_default(),
        tags: serde_json::from_str(&row.get::<String, _>("tags")).unwrap_or_default(),
        price: row.get("price"),
        username: row.get("username"),
        is_default: row.get("is_default"),
        created_at: Some(row.get::<DateTime<Utc>, _>("created_at")),
        updated_at: Some(row.get::<DateTime<Utc>, _>("updated_at")),
    }
}

fn row_to_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        suggestion_id: blob_to_uuid(row.get::<Vec<u8>, _>("suggestion_id").as_slice()),
        username: row.get("username"),
        content: row.get("content"),
        rating: row.get("rating"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl SuggestionStore for SqliteSuggestionStore {
    async fn fetch_default(&self) -> Result<Option<Suggestion>> {
        let row = sqlx::query("SELECT * FROM suggestions WHERE is_default = 1 LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| row_to_suggestion(&r)))
    }

    async fn fetch_shared(&self, username: &str, title: &str) -> Result<Option<Suggestion>> {
        let row = sqlx::query("SELECT * FROM suggestions WHERE username = ? AND title = ? LIMIT 1")
            .bind(username)
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| row_to_suggestion(&r)))
    }

    async fn list_recent(&self) -> Result<Vec<Suggestion>> {
        let rows = sqlx::query("SELECT * FROM suggestions ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(row_to_suggestion).collect())
    }

    async fn insert(&self, record: SuggestionRecord) -> Result<Suggestion> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO suggestions (id, title, short_description, long_description, header_image,
                 screenshots, tags, price, username, is_default, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(id))
        .bind(&record.title)
        .bind(&record.short_description)
        .bind(&record.long_description)
        .bind(&record.header_image)
        .bind(json_column(&record.screenshots))
        .bind(json_column(&record.tags))
        .bind(record.price)
        .bind(&record.username)
        .bind(record.is_default)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(Suggestion {
            id: Some(id),
            title: record.title,
            short_description: record.short_description,
            long_description: record.long_description,
            header_image: record.header_image,
            screenshots: record.screenshots,
            tags: record.tags,
            price: record.price,
            username: record.username,
            is_default: record.is_default,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }

    async fn update(&self, id: Uuid, record: SuggestionRecord) -> Result<Suggestion> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE suggestions SET title = ?, short_description = ?, long_description = ?,
                 header_image = ?, screenshots = ?, tags = ?, price = ?, username = ?,
                 is_default = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&record.title)
        .bind(&record.short_description)
        .bind(&record.long_description)
        .bind(&record.header_image)
        .bind(json_column(&record.screenshots))
        .bind(json_column(&record.tags))
        .bind(record.price)
        .bind(&record.username)
        .bind(record.is_default)
        .bind(now)
        .bind(uuid_to_blob(id))
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("suggestion {id} not found")));
        }
        self.fetch_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("suggestion {id} not found")))
    }

    async fn delete(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        let result = match owner {
            Some(owner) => {
                sqlx::query("DELETE FROM suggestions WHERE id = ? AND username = ?")
                    .bind(uuid_to_blob(id))
                    .bind(owner)
                    .execute(&self.pool)
                    .await
            }
            None => {
                sqlx::query("DELETE FROM suggestions WHERE id = ?")
                    .bind(uuid_to_blob(id))
                    .execute(&self.pool)
                    .await
            }
        }
        .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("suggestion {id} not found")));
        }
        Ok(())
    }

    async fn clear_default(&self, owner: &str) -> Result<()> {
        sqlx::query("UPDATE suggestions SET is_default = 0 WHERE username = ? AND is_default = 1")
            .bind(owner)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(())
    }

    async fn set_default(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("UPDATE suggestions SET is_default = 1 WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("suggestion {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl CommentStore for SqliteCommentStore {
    async fn list_for(&self, suggestion_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query("SELECT * FROM comments WHERE suggestion_id = ? ORDER BY created_at ASC")
            .bind(uuid_to_blob(suggestion_id))
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn insert(&self, record: NewComment) -> Result<Comment> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO comments (id, suggestion_id, username, content, rating, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(id))
        .bind(uuid_to_blob(record.suggestion_id))
        .bind(&record.username)
        .bind(&record.content)
        .bind(record.rating)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(Comment {
            id,
            suggestion_id: record.suggestion_id,
            username: record.username,
            content: record.content,
            rating: record.rating,
            created_at: now,
            updated_at: now,
        })
    }

    async fn update(&self, id: Uuid, content: &str, rating: i32) -> Result<Comment> {
        let now = Utc::now();
        let result = sqlx::query("UPDATE comments SET content = ?, rating = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(rating)
            .bind(now)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("comment {id} not found")));
        }

        let row = sqlx::query("SELECT * FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row_to_comment(&row))
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("comment {id} not found")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, username: &str) -> SuggestionRecord {
        SuggestionRecord {
            title: title.to_string(),
            short_description: "short".to_string(),
            long_description: "long".to_string(),
            header_image: "/static/uploads/header.png".to_string(),
            screenshots: vec!["/static/uploads/a.png".to_string()],
            tags: vec!["Survival".to_string()],
            price: 19.99,
            username: username.to_string(),
            is_default: false,
        }
    }

    async fn memory_store() -> SqliteSuggestionStore {
        let pool = connect("sqlite::memory:").await.unwrap();
        SqliteSuggestionStore::new(pool)
    }

    #[tokio::test]
    async fn insert_assigns_an_id_and_round_trips() {
        let store = memory_store().await;
        let created = store.insert(record("Raftbound", "alice")).await.unwrap();
        assert!(created.id.is_some());

        let fetched = store.fetch_shared("alice", "Raftbound").await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.screenshots, vec!["/static/uploads/a.png".to_string()]);
        assert_eq!(fetched.tags, vec!["Survival".to_string()]);
        assert_eq!(fetched.price, 19.99);
        assert!(!fetched.is_default);
    }

    #[tokio::test]
    async fn list_recent_is_newest_first() {
        let store = memory_store().await;
        store.insert(record("first", "alice")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.insert(record("second", "alice")).await.unwrap();

        let rows = store.list_recent().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].title, "second");
        assert_eq!(rows[1].title, "first");
    }

    #[tokio::test]
    async fn update_patches_in_place() {
        let store = memory_store().await;
        let created = store.insert(record("Raftbound", "alice")).await.unwrap();
        let id = created.id.unwrap();

        let mut patch = record("Raftbound: Tides", "alice");
        patch.price = 24.99;
        let updated = store.update(id, patch).await.unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.title, "Raftbound: Tides");
        assert_eq!(updated.price, 24.99);
        assert_eq!(store.list_recent().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_of_a_missing_row_is_not_found() {
        let store = memory_store().await;
        let err = store.update(Uuid::now_v7(), record("x", "alice")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn owner_constrained_delete_skips_foreign_rows() {
        let store = memory_store().await;
        let created = store.insert(record("Raftbound", "alice")).await.unwrap();
        let id = created.id.unwrap();

        let err = store.delete(id, Some("bob")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.list_recent().await.unwrap().len(), 1);

        store.delete(id, Some("alice")).await.unwrap();
        assert!(store.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unconstrained_delete_removes_any_row() {
        let store = memory_store().await;
        let created = store.insert(record("Raftbound", "alice")).await.unwrap();
        store.delete(created.id.unwrap(), None).await.unwrap();
        assert!(store.list_recent().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn default_flag_moves_between_rows() {
        let store = memory_store().await;
        let mut first = record("Old Template", "curator");
        first.is_default = true;
        let old = store.insert(first).await.unwrap();
        let new = store.insert(record("New Template", "curator")).await.unwrap();

        assert_eq!(store.fetch_default().await.unwrap().unwrap().id, old.id);

        store.clear_default("curator").await.unwrap();
        assert!(store.fetch_default().await.unwrap().is_none());

        store.set_default(new.id.unwrap()).await.unwrap();
        assert_eq!(store.fetch_default().await.unwrap().unwrap().id, new.id);
    }

    #[tokio::test]
    async fn shared_lookup_matches_awkward_titles_exactly() {
        let store = memory_store().await;
        store.insert(record("AD 2049/Redux: 100%?", "alice")).await.unwrap();

        let hit = store.fetch_shared("alice", "AD 2049/Redux: 100%?").await.unwrap();
        assert!(hit.is_some());
        let miss = store.fetch_shared("alice", "AD 2049").await.unwrap();
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn comments_crud_and_ordering() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let suggestions = SqliteSuggestionStore::new(pool.clone());
        let comments = SqliteCommentStore::new(pool);

        let suggestion = suggestions.insert(record("Raftbound", "alice")).await.unwrap();
        let sid = suggestion.id.unwrap();

        let first = comments
            .insert(NewComment {
                suggestion_id: sid,
                username: "bob".to_string(),
                content: "early impressions".to_string(),
                rating: 4,
            })
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        comments
            .insert(NewComment {
                suggestion_id: sid,
                username: "carol".to_string(),
                content: "later impressions".to_string(),
                rating: 5,
            })
            .await
            .unwrap();

        let listed = comments.list_for(sid).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].username, "bob");

        let updated = comments.update(first.id, "revised", 3).await.unwrap();
        assert_eq!(updated.content, "revised");
        assert!(updated.updated_at > updated.created_at);

        comments.delete(first.id).await.unwrap();
        assert_eq!(comments.list_for(sid).await.unwrap().len(), 1);

        // a different suggestion id sees nothing
        assert!(comments.list_for(Uuid::now_v7()).await.unwrap().is_empty());
    }
}
