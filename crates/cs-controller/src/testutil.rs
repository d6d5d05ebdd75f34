//! In-memory port fakes shared by the controller tests. Failure flags make
//! transport errors deterministic; a fake clock keeps list ordering stable.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use cs_core::{
    AppError, Comment, CommentStore, MediaFile, MediaKind, MediaStore, NewComment, Result,
    Session, SessionStore, Suggestion, SuggestionRecord, SuggestionStore,
};

fn transport() -> AppError {
    AppError::Transport("store unreachable".to_string())
}

fn missing() -> AppError {
    AppError::NotFound("no such row".to_string())
}

pub struct MemoryStore {
    pub rows: Mutex<Vec<Suggestion>>,
    pub fail_list: AtomicBool,
    pub fail_mutations: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_clear_default: AtomicBool,
    pub delete_calls: AtomicUsize,
    pub set_default_calls: AtomicUsize,
    clock: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryStore {
            rows: Mutex::new(Vec::new()),
            fail_list: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            fail_clear_default: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
            set_default_calls: AtomicUsize::new(0),
            clock: AtomicI64::new(0),
        })
    }

    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n)
    }

    pub fn seed_row(&self, title: &str, username: &str) -> Suggestion {
        let now = self.tick();
        let row = Suggestion {
            id: Some(Uuid::now_v7()),
            title: title.to_string(),
            username: username.to_string(),
            created_at: Some(now),
            updated_at: Some(now),
            ..Suggestion::default()
        };
        self.rows.lock().unwrap().push(row.clone());
        row
    }

    pub fn seed_default_row(&self, title: &str, username: &str) -> Suggestion {
        let mut row = self.seed_row(title, username);
        row.is_default = true;
        let mut rows = self.rows.lock().unwrap();
        let stored = rows.last_mut().unwrap();
        stored.is_default = true;
        row
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn fetch_default(&self) -> Result<Option<Suggestion>> {
        Ok(self.rows.lock().unwrap().iter().find(|s| s.is_default).cloned())
    }

    async fn fetch_shared(&self, username: &str, title: &str) -> Result<Option<Suggestion>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.username == username && s.title == title)
            .cloned())
    }

    async fn list_recent(&self) -> Result<Vec<Suggestion>> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn insert(&self, record: SuggestionRecord) -> Result<Suggestion> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let now = self.tick();
        let row = Suggestion {
            id: Some(Uuid::now_v7()),
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
        };
        self.rows.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn update(&self, id: Uuid, record: SuggestionRecord) -> Result<Suggestion> {
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let now = self.tick();
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or_else(missing)?;
        row.title = record.title;
        row.short_description = record.short_description;
        row.long_description = record.long_description;
        row.header_image = record.header_image;
        row.screenshots = record.screenshots;
        row.tags = record.tags;
        row.price = record.price;
        row.username = record.username;
        row.is_default = record.is_default;
        row.updated_at = Some(now);
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid, owner: Option<&str>) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) || self.fail_mutations.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|s| !(s.id == Some(id) && owner.map_or(true, |o| s.username == o)));
        if rows.len() == before {
            return Err(missing());
        }
        Ok(())
    }

    async fn clear_default(&self, owner: &str) -> Result<()> {
        if self.fail_clear_default.load(Ordering::SeqCst) {
            return Err(transport());
        }
        for row in self.rows.lock().unwrap().iter_mut().filter(|s| s.username == owner) {
            row.is_default = false;
        }
        Ok(())
    }

    async fn set_default(&self, id: Uuid) -> Result<()> {
        self.set_default_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or_else(missing)?;
        row.is_default = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessions {
    slot: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessions {
    fn load(&self) -> Option<Session> {
        self.slot.lock().unwrap().clone()
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap() = None;
        Ok(())
    }
}

pub struct MemoryComments {
    pub rows: Mutex<Vec<Comment>>,
    pub fail: AtomicBool,
    pub insert_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    clock: AtomicI64,
}

impl MemoryComments {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryComments {
            rows: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
            insert_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            clock: AtomicI64::new(0),
        })
    }

    fn tick(&self) -> DateTime<Utc> {
        let n = self.clock.fetch_add(1, Ordering::SeqCst);
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n)
    }

    pub fn seed(&self, suggestion_id: Uuid, username: &str, rating: i32) -> Comment {
        let now = self.tick();
        let comment = Comment {
            id: Uuid::now_v7(),
            suggestion_id,
            username: username.to_string(),
            content: "seeded".to_string(),
            rating,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(comment.clone());
        comment
    }
}

#[async_trait]
impl CommentStore for MemoryComments {
    async fn list_for(&self, suggestion_id: Uuid) -> Result<Vec<Comment>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let mut rows: Vec<Comment> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.suggestion_id == suggestion_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert(&self, record: NewComment) -> Result<Comment> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let now = self.tick();
        let comment = Comment {
            id: Uuid::now_v7(),
            suggestion_id: record.suggestion_id,
            username: record.username,
            content: record.content,
            rating: record.rating,
            created_at: now,
            updated_at: now,
        };
        self.rows.lock().unwrap().push(comment.clone());
        Ok(comment)
    }

    async fn update(&self, id: Uuid, content: &str, rating: i32) -> Result<Comment> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let now = self.tick();
        let mut rows = self.rows.lock().unwrap();
        let comment = rows
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(missing)?;
        comment.content = content.to_string();
        comment.rating = rating;
        comment.updated_at = now;
        Ok(comment.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(transport());
        }
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != id);
        if rows.len() == before {
            return Err(missing());
        }
        Ok(())
    }
}

pub struct MemoryMedia {
    pub files: Mutex<Vec<MediaFile>>,
    pub upload_calls: AtomicUsize,
}

impl MemoryMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(MemoryMedia {
            files: Mutex::new(Vec::new()),
            upload_calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl MediaStore for MemoryMedia {
    async fn list(&self) -> Result<Vec<MediaFile>> {
        let mut files = self.files.lock().unwrap().clone();
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    async fn upload(&self, name: &str, _data: Vec<u8>) -> Result<MediaFile> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let kind = MediaKind::from_name(name)
            .ok_or_else(|| AppError::Validation("unacceptable media".to_string()))?;
        let file = MediaFile {
            name: name.to_string(),
            url: format!("/static/uploads/{name}"),
            kind,
        };
        self.files.lock().unwrap().push(file.clone());
        Ok(file)
    }

    async fn remove(&self, name: &str) -> Result<()> {
        let mut files = self.files.lock().unwrap();
        let before = files.len();
        files.retain(|f| f.name != name);
        if files.len() == before {
            return Err(missing());
        }
        Ok(())
    }
}
