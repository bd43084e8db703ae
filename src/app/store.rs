// src/app/store.rs
//! Local SQLite store backing every list in the app.
//!
//! Each call is atomic on its own; there are no cross-call transactions.
//! Callers reload from here after a successful write instead of patching
//! their in-memory copies.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use rusqlite::{params, Connection, DatabaseName, OpenFlags, OptionalExtension, Row, Transaction};
use thiserror::Error;
use tracing::{debug, info};

use super::filters::parse_date_key;
use super::types::{
    ItemKind, Movie, NewMovie, NewNote, NewTag, NewTask, Note, NoteColor, Tag, TagRef, TagType,
    Task, TripDetails,
};

const CURRENT_SCHEMA_VERSION: i64 = 2;
const NEW_ID: &str = "lower(hex(randomblob(16)))";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub struct Store {
    conn: Connection,
}

// ---- validation helpers ----
fn required(field: &str, value: &str) -> StoreResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(StoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(v.to_string())
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn optional_date(field: &str, value: Option<&str>) -> StoreResult<Option<String>> {
    let Some(v) = optional_text(value) else {
        return Ok(None);
    };
    if parse_date_key(&v).is_none() {
        return Err(StoreError::Validation(format!(
            "{field} `{v}` is not an ISO date (YYYY-MM-DD)"
        )));
    }
    Ok(Some(v))
}

fn expect_changed(changed: usize, what: &str, id: &str) -> StoreResult<()> {
    if changed == 0 {
        Err(StoreError::NotFound(format!("{what} {id}")))
    } else {
        Ok(())
    }
}

// ---- row mappers ----
fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get("id")?,
        title: row.get("title")?,
        notes: row.get("notes")?,
        watch_date: row.get("watch_date")?,
        watched: row.get("watched")?,
        tags: Vec::new(),
        release_year: row.get("release_year")?,
        poster_url: row.get("poster_url")?,
        deep_link: row.get("deep_link")?,
        justwatch_id: row.get("justwatch_id")?,
    })
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date: row.get("due_date")?,
        completed: row.get("completed")?,
        tags: Vec::new(),
    })
}

fn note_from_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    let color: String = row.get("color")?;
    Ok(Note {
        id: row.get("id")?,
        content: row.get("content")?,
        color: NoteColor::from_str(&color).unwrap_or_default(),
        pinned: row.get("pinned")?,
        created_at: row.get("created_at")?,
    })
}

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    let kind: String = row.get("kind")?;
    Ok(Tag {
        id: row.get("id")?,
        name: row.get("name")?,
        // CHECK constraint keeps `kind` to the three known values
        tag_type: TagType::from_str(&kind).unwrap_or(TagType::Attraction),
        parent_id: row.get("parent_id")?,
        icon: row.get("icon")?,
        done: row.get("done")?,
    })
}

// ---- migrations ----
fn migrate_to_v1(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS movies (
            id            TEXT PRIMARY KEY,
            title         TEXT NOT NULL,
            notes         TEXT,
            watch_date    TEXT,
            watched       INTEGER NOT NULL DEFAULT 0,
            release_year  INTEGER,
            poster_url    TEXT,
            deep_link     TEXT,
            justwatch_id  INTEGER,
            created_at    TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS tasks (
            id           TEXT PRIMARY KEY,
            title        TEXT NOT NULL,
            description  TEXT,
            due_date     TEXT,
            completed    INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS notes (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            color       TEXT NOT NULL DEFAULT 'yellow',
            pinned      INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS tags (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            kind        TEXT NOT NULL CHECK (kind IN ('park', 'land', 'attraction')),
            parent_id   TEXT REFERENCES tags(id) ON DELETE CASCADE,
            icon        TEXT,
            done        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE TABLE IF NOT EXISTS item_tags (
            item_kind  TEXT NOT NULL,
            item_id    TEXT NOT NULL,
            tag_id     TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (item_kind, item_id, tag_id)
        );
        CREATE TABLE IF NOT EXISTS trip (
            id           INTEGER PRIMARY KEY CHECK (id = 1),
            name         TEXT NOT NULL DEFAULT '',
            destination  TEXT NOT NULL DEFAULT '',
            start_date   TEXT,
            end_date     TEXT,
            lodging      TEXT NOT NULL DEFAULT '',
            notes        TEXT NOT NULL DEFAULT ''
        );
        "#,
    )
}

fn migrate_to_v2(tx: &Transaction<'_>) -> rusqlite::Result<()> {
    tx.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_item_tags_tag ON item_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_tags_parent ON tags(parent_id);
        "#,
    )
}

fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let mut version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    while version < CURRENT_SCHEMA_VERSION {
        let target = version + 1;
        let tx = conn.transaction()?;
        match target {
            1 => migrate_to_v1(&tx)?,
            2 => migrate_to_v2(&tx)?,
            _ => {
                return Err(StoreError::Validation(format!(
                    "unsupported schema version {target}"
                )))
            }
        }
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()?;
        debug!("store schema migrated to v{target}");
        version = target;
    }
    Ok(())
}

impl Store {
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        let store = Self::init(conn)?;
        info!("Opened trip store {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> StoreResult<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// Cheap liveness check.
    pub fn ping(&self) -> StoreResult<()> {
        self.conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
    }

    /// Online copy of the whole database to `dest`.
    pub fn backup_to(&self, dest: &Path) -> StoreResult<()> {
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        self.conn.backup(DatabaseName::Main, dest, None)?;
        info!("Backed up trip store to {}", dest.display());
        Ok(())
    }

    // ---- item tag helpers ----
    fn tag_refs_for(&self, kind: ItemKind) -> StoreResult<HashMap<String, Vec<TagRef>>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT it.item_id, t.id, t.name, t.icon, p.name AS parent_name
            FROM item_tags it
            JOIN tags t ON t.id = it.tag_id
            LEFT JOIN tags p ON p.id = t.parent_id
            WHERE it.item_kind = ?1
            ORDER BY t.name COLLATE NOCASE
            "#,
        )?;
        let mut out: HashMap<String, Vec<TagRef>> = HashMap::new();
        let mut rows = stmt.query([kind.as_str()])?;
        while let Some(row) = rows.next()? {
            let item_id: String = row.get(0)?;
            out.entry(item_id).or_default().push(TagRef {
                id: row.get(1)?,
                name: row.get(2)?,
                icon: row.get(3)?,
                parent_name: row.get(4)?,
            });
        }
        Ok(out)
    }

    fn item_exists(&self, kind: ItemKind, id: &str) -> StoreResult<bool> {
        let sql = match kind {
            ItemKind::Movies => "SELECT 1 FROM movies WHERE id = ?1",
            ItemKind::Tasks => "SELECT 1 FROM tasks WHERE id = ?1",
        };
        Ok(self
            .conn
            .query_row(sql, [id], |_| Ok(()))
            .optional()?
            .is_some())
    }

    /// Replace the tag set of one movie or task.
    pub fn set_tags(&mut self, kind: ItemKind, item_id: &str, tag_ids: &[String]) -> StoreResult<()> {
        if !self.item_exists(kind, item_id)? {
            return Err(StoreError::NotFound(format!("{} {item_id}", kind.as_str())));
        }
        for tag_id in tag_ids {
            let known = self
                .conn
                .query_row("SELECT 1 FROM tags WHERE id = ?1", [tag_id], |_| Ok(()))
                .optional()?
                .is_some();
            if !known {
                return Err(StoreError::Validation(format!("unknown tag {tag_id}")));
            }
        }

        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM item_tags WHERE item_kind = ?1 AND item_id = ?2",
            params![kind.as_str(), item_id],
        )?;
        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO item_tags (item_kind, item_id, tag_id) VALUES (?1, ?2, ?3)",
            )?;
            for tag_id in tag_ids {
                insert.execute(params![kind.as_str(), item_id, tag_id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn delete_item(&mut self, kind: ItemKind, id: &str) -> StoreResult<()> {
        let sql = match kind {
            ItemKind::Movies => "DELETE FROM movies WHERE id = ?1",
            ItemKind::Tasks => "DELETE FROM tasks WHERE id = ?1",
        };
        let tx = self.conn.transaction()?;
        let changed = tx.execute(sql, [id])?;
        expect_changed(changed, kind.as_str(), id)?;
        tx.execute(
            "DELETE FROM item_tags WHERE item_kind = ?1 AND item_id = ?2",
            params![kind.as_str(), id],
        )?;
        tx.commit()?;
        Ok(())
    }

    // ---- movies ----
    pub fn list_movies(&self) -> StoreResult<Vec<Movie>> {
        let mut tags = self.tag_refs_for(ItemKind::Movies)?;
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM movies ORDER BY created_at, rowid")?;
        let rows = stmt.query_map([], movie_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            let mut movie = row?;
            movie.tags = tags.remove(&movie.id).unwrap_or_default();
            out.push(movie);
        }
        Ok(out)
    }

    pub fn create_movie(&mut self, new: &NewMovie) -> StoreResult<String> {
        let title = required("title", &new.title)?;
        let watch_date = optional_date("watch date", new.watch_date.as_deref())?;
        let id: String = self.conn.query_row(
            &format!(
                "INSERT INTO movies (id, title, notes, watch_date, release_year, poster_url, deep_link, justwatch_id)
                 VALUES ({NEW_ID}, ?1, ?2, ?3, ?4, ?5, ?6, ?7) RETURNING id"
            ),
            params![
                title,
                optional_text(new.notes.as_deref()),
                watch_date,
                new.release_year,
                optional_text(new.poster_url.as_deref()),
                optional_text(new.deep_link.as_deref()),
                new.justwatch_id,
            ],
            |r| r.get(0),
        )?;
        debug!("created movie {id} ({title})");
        Ok(id)
    }

    pub fn update_movie(&mut self, movie: &Movie) -> StoreResult<()> {
        let title = required("title", &movie.title)?;
        let watch_date = optional_date("watch date", movie.watch_date.as_deref())?;
        let changed = self.conn.execute(
            "UPDATE movies SET title = ?2, notes = ?3, watch_date = ?4, watched = ?5,
                 release_year = ?6, poster_url = ?7, deep_link = ?8, justwatch_id = ?9
             WHERE id = ?1",
            params![
                movie.id,
                title,
                optional_text(movie.notes.as_deref()),
                watch_date,
                movie.watched,
                movie.release_year,
                optional_text(movie.poster_url.as_deref()),
                optional_text(movie.deep_link.as_deref()),
                movie.justwatch_id,
            ],
        )?;
        expect_changed(changed, "movie", &movie.id)
    }

    pub fn set_movie_watched(&mut self, id: &str, watched: bool) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE movies SET watched = ?2 WHERE id = ?1",
            params![id, watched],
        )?;
        expect_changed(changed, "movie", id)
    }

    pub fn delete_movie(&mut self, id: &str) -> StoreResult<()> {
        self.delete_item(ItemKind::Movies, id)
    }

    // ---- tasks ----
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        let mut tags = self.tag_refs_for(ItemKind::Tasks)?;
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM tasks ORDER BY created_at, rowid")?;
        let rows = stmt.query_map([], task_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            let mut task = row?;
            task.tags = tags.remove(&task.id).unwrap_or_default();
            out.push(task);
        }
        Ok(out)
    }

    pub fn create_task(&mut self, new: &NewTask) -> StoreResult<String> {
        let title = required("title", &new.title)?;
        let due_date = optional_date("due date", new.due_date.as_deref())?;
        let id: String = self.conn.query_row(
            &format!(
                "INSERT INTO tasks (id, title, description, due_date)
                 VALUES ({NEW_ID}, ?1, ?2, ?3) RETURNING id"
            ),
            params![title, optional_text(new.description.as_deref()), due_date],
            |r| r.get(0),
        )?;
        debug!("created task {id} ({title})");
        Ok(id)
    }

    pub fn update_task(&mut self, task: &Task) -> StoreResult<()> {
        let title = required("title", &task.title)?;
        let due_date = optional_date("due date", task.due_date.as_deref())?;
        let changed = self.conn.execute(
            "UPDATE tasks SET title = ?2, description = ?3, due_date = ?4, completed = ?5
             WHERE id = ?1",
            params![
                task.id,
                title,
                optional_text(task.description.as_deref()),
                due_date,
                task.completed,
            ],
        )?;
        expect_changed(changed, "task", &task.id)
    }

    pub fn set_task_completed(&mut self, id: &str, completed: bool) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks SET completed = ?2 WHERE id = ?1",
            params![id, completed],
        )?;
        expect_changed(changed, "task", id)
    }

    pub fn delete_task(&mut self, id: &str) -> StoreResult<()> {
        self.delete_item(ItemKind::Tasks, id)
    }

    // ---- notes ----
    pub fn list_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM notes ORDER BY pinned DESC, created_at DESC, rowid DESC")?;
        let rows = stmt.query_map([], note_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn create_note(&mut self, new: &NewNote) -> StoreResult<String> {
        let content = required("note", &new.content)?;
        let id: String = self.conn.query_row(
            &format!("INSERT INTO notes (id, content, color) VALUES ({NEW_ID}, ?1, ?2) RETURNING id"),
            params![content, new.color.as_str()],
            |r| r.get(0),
        )?;
        Ok(id)
    }

    pub fn update_note(&mut self, note: &Note) -> StoreResult<()> {
        let content = required("note", &note.content)?;
        let changed = self.conn.execute(
            "UPDATE notes SET content = ?2, color = ?3, pinned = ?4 WHERE id = ?1",
            params![note.id, content, note.color.as_str(), note.pinned],
        )?;
        expect_changed(changed, "note", &note.id)
    }

    pub fn delete_note(&mut self, id: &str) -> StoreResult<()> {
        let changed = self.conn.execute("DELETE FROM notes WHERE id = ?1", [id])?;
        expect_changed(changed, "note", id)
    }

    // ---- tags: parks, lands, attractions ----
    pub fn list_tags(&self) -> StoreResult<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM tags ORDER BY name COLLATE NOCASE, rowid")?;
        let rows = stmt.query_map([], tag_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn tag_type_of(&self, id: &str) -> StoreResult<Option<TagType>> {
        let kind: Option<String> = self
            .conn
            .query_row("SELECT kind FROM tags WHERE id = ?1", [id], |r| r.get(0))
            .optional()?;
        Ok(kind.as_deref().and_then(TagType::from_str))
    }

    pub fn create_tag(&mut self, new: &NewTag) -> StoreResult<String> {
        let name = required("name", &new.name)?;
        let parent_id = match new.tag_type.parent_type() {
            None => None,
            Some(want) => {
                let Some(pid) = optional_text(new.parent_id.as_deref()) else {
                    return Err(StoreError::Validation(format!(
                        "a {} needs a parent {}",
                        new.tag_type.as_str(),
                        want.as_str()
                    )));
                };
                match self.tag_type_of(&pid)? {
                    Some(found) if found == want => Some(pid),
                    Some(found) => {
                        return Err(StoreError::Validation(format!(
                            "a {} cannot live under a {}",
                            new.tag_type.as_str(),
                            found.as_str()
                        )))
                    }
                    None => return Err(StoreError::NotFound(format!("{} {pid}", want.as_str()))),
                }
            }
        };

        let id: String = self.conn.query_row(
            &format!(
                "INSERT INTO tags (id, name, kind, parent_id, icon)
                 VALUES ({NEW_ID}, ?1, ?2, ?3, ?4) RETURNING id"
            ),
            params![
                name,
                new.tag_type.as_str(),
                parent_id,
                optional_text(new.icon.as_deref())
            ],
            |r| r.get(0),
        )?;
        debug!("created {} {id} ({name})", new.tag_type.as_str());
        Ok(id)
    }

    pub fn rename_tag(&mut self, id: &str, name: &str, icon: Option<&str>) -> StoreResult<()> {
        let name = required("name", name)?;
        let changed = self.conn.execute(
            "UPDATE tags SET name = ?2, icon = ?3 WHERE id = ?1",
            params![id, name, optional_text(icon)],
        )?;
        expect_changed(changed, "tag", id)
    }

    pub fn set_attraction_done(&mut self, id: &str, done: bool) -> StoreResult<()> {
        match self.tag_type_of(id)? {
            Some(TagType::Attraction) => {}
            Some(other) => {
                return Err(StoreError::Validation(format!(
                    "only attractions can be marked done, not a {}",
                    other.as_str()
                )))
            }
            None => return Err(StoreError::NotFound(format!("attraction {id}"))),
        }
        self.conn.execute(
            "UPDATE tags SET done = ?2 WHERE id = ?1",
            params![id, done],
        )?;
        Ok(())
    }

    /// Deletes the tag, its descendants and every item association to them.
    pub fn delete_tag(&mut self, id: &str) -> StoreResult<()> {
        let changed = self.conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
        expect_changed(changed, "tag", id)
    }

    // ---- trip ----
    pub fn trip(&self) -> StoreResult<TripDetails> {
        let found = self
            .conn
            .query_row(
                "SELECT name, destination, start_date, end_date, lodging, notes FROM trip WHERE id = 1",
                [],
                |r| {
                    Ok(TripDetails {
                        name: r.get(0)?,
                        destination: r.get(1)?,
                        start_date: r.get(2)?,
                        end_date: r.get(3)?,
                        lodging: r.get(4)?,
                        notes: r.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(found.unwrap_or_default())
    }

    pub fn save_trip(&mut self, trip: &TripDetails) -> StoreResult<()> {
        let start = optional_date("start date", trip.start_date.as_deref())?;
        let end = optional_date("end date", trip.end_date.as_deref())?;
        if let (Some(s), Some(e)) = (&start, &end) {
            if parse_date_key(e) < parse_date_key(s) {
                return Err(StoreError::Validation(
                    "end date is before start date".into(),
                ));
            }
        }
        self.conn.execute(
            r#"
            INSERT INTO trip (id, name, destination, start_date, end_date, lodging, notes)
            VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                destination = excluded.destination,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                lodging = excluded.lodging,
                notes = excluded.notes
            "#,
            params![
                trip.name.trim(),
                trip.destination.trim(),
                start,
                end,
                trip.lodging.trim(),
                trip.notes,
            ],
        )?;
        Ok(())
    }

    /// (table, row count) for every user table; used by the explorer tool.
    pub fn table_counts(&self) -> StoreResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names: Vec<String> = stmt
            .query_map([], |r| r.get(0))?
            .collect::<Result<_, _>>()?;
        let mut out = Vec::with_capacity(names.len());
        for name in names {
            let count: i64 =
                self.conn
                    .query_row(&format!("SELECT COUNT(*) FROM \"{name}\""), [], |r| r.get(0))?;
            out.push((name, count));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::open_in_memory().unwrap()
    }

    fn park_land_attraction(s: &mut Store) -> (String, String, String) {
        let park = s
            .create_tag(&NewTag {
                name: "Magic Kingdom".into(),
                tag_type: TagType::Park,
                parent_id: None,
                icon: Some("🏰".into()),
            })
            .unwrap();
        let land = s
            .create_tag(&NewTag {
                name: "Tomorrowland".into(),
                tag_type: TagType::Land,
                parent_id: Some(park.clone()),
                icon: None,
            })
            .unwrap();
        let ride = s
            .create_tag(&NewTag {
                name: "Space Mountain".into(),
                tag_type: TagType::Attraction,
                parent_id: Some(land.clone()),
                icon: None,
            })
            .unwrap();
        (park, land, ride)
    }

    #[test]
    fn movie_round_trip_with_tags() {
        let mut s = store();
        let (park, _land, ride) = park_land_attraction(&mut s);
        let id = s
            .create_movie(&NewMovie {
                title: "  Moana ".into(),
                watch_date: Some("2024-05-01".into()),
                notes: Some("  ".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(id.len(), 32);

        s.set_tags(ItemKind::Movies, &id, &[ride.clone(), park.clone()])
            .unwrap();
        let movies = s.list_movies().unwrap();
        assert_eq!(movies.len(), 1);
        let m = &movies[0];
        assert_eq!(m.title, "Moana");
        assert_eq!(m.notes, None);
        assert_eq!(m.watch_date.as_deref(), Some("2024-05-01"));
        assert!(!m.watched);
        let names: Vec<&str> = m.tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Magic Kingdom", "Space Mountain"]);
        assert_eq!(m.tags[1].parent_name.as_deref(), Some("Tomorrowland"));

        s.set_tags(ItemKind::Movies, &id, &[park]).unwrap();
        assert_eq!(s.list_movies().unwrap()[0].tags.len(), 1);
    }

    #[test]
    fn empty_title_is_rejected_before_insert() {
        let mut s = store();
        let err = s
            .create_movie(&NewMovie {
                title: "   ".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(s.list_movies().unwrap().is_empty());

        let err = s
            .create_task(&NewTask {
                title: "Book dinner".into(),
                due_date: Some("tomorrow".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn updates_report_missing_rows() {
        let mut s = store();
        let ghost = Movie {
            id: "nope".into(),
            title: "Ghost".into(),
            ..Default::default()
        };
        assert!(matches!(s.update_movie(&ghost), Err(StoreError::NotFound(_))));
        assert!(matches!(s.delete_task("nope"), Err(StoreError::NotFound(_))));
        assert!(matches!(
            s.set_tags(ItemKind::Tasks, "nope", &[]),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn task_lifecycle() {
        let mut s = store();
        let id = s
            .create_task(&NewTask {
                title: "Buy park tickets".into(),
                description: Some("Park hopper".into()),
                due_date: Some("2024-04-10".into()),
            })
            .unwrap();
        s.set_task_completed(&id, true).unwrap();
        let mut task = s.list_tasks().unwrap().remove(0);
        assert!(task.completed);

        task.title = "Buy park hopper tickets".into();
        task.due_date = None;
        s.update_task(&task).unwrap();
        let task = s.list_tasks().unwrap().remove(0);
        assert_eq!(task.title, "Buy park hopper tickets");
        assert_eq!(task.due_date, None);

        s.delete_task(&id).unwrap();
        assert!(s.list_tasks().unwrap().is_empty());
    }

    #[test]
    fn tag_hierarchy_is_enforced() {
        let mut s = store();
        let (park, land, _ride) = park_land_attraction(&mut s);

        let orphan_land = s.create_tag(&NewTag {
            name: "Nowhere".into(),
            tag_type: TagType::Land,
            parent_id: None,
            icon: None,
        });
        assert!(matches!(orphan_land, Err(StoreError::Validation(_))));

        let ride_on_park = s.create_tag(&NewTag {
            name: "Misplaced".into(),
            tag_type: TagType::Attraction,
            parent_id: Some(park),
            icon: None,
        });
        assert!(matches!(ride_on_park, Err(StoreError::Validation(_))));

        assert!(matches!(
            s.set_attraction_done(&land, true),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn deleting_a_park_cascades() {
        let mut s = store();
        let (park, _land, ride) = park_land_attraction(&mut s);
        let task = s
            .create_task(&NewTask {
                title: "Fastpass".into(),
                ..Default::default()
            })
            .unwrap();
        s.set_tags(ItemKind::Tasks, &task, &[ride.clone()]).unwrap();
        s.set_attraction_done(&ride, true).unwrap();
        assert!(s.list_tags().unwrap().iter().any(|t| t.id == ride && t.done));

        s.delete_tag(&park).unwrap();
        assert!(s.list_tags().unwrap().is_empty());
        assert!(s.list_tasks().unwrap()[0].tags.is_empty());
    }

    #[test]
    fn unknown_tag_ids_are_rejected() {
        let mut s = store();
        let id = s
            .create_movie(&NewMovie {
                title: "Up".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(matches!(
            s.set_tags(ItemKind::Movies, &id, &["missing".to_string()]),
            Err(StoreError::Validation(_))
        ));
    }

    #[test]
    fn notes_pinned_first() {
        let mut s = store();
        let a = s
            .create_note(&NewNote {
                content: "Bring ponchos".into(),
                color: NoteColor::Blue,
            })
            .unwrap();
        s.create_note(&NewNote {
            content: "Parade at 3pm".into(),
            color: NoteColor::Yellow,
        })
        .unwrap();
        let mut first = s.list_notes().unwrap().into_iter().find(|n| n.id == a).unwrap();
        first.pinned = true;
        s.update_note(&first).unwrap();

        let notes = s.list_notes().unwrap();
        assert_eq!(notes[0].id, a);
        assert_eq!(notes[0].color, NoteColor::Blue);
        assert!(s.create_note(&NewNote::default()).is_err());
    }

    #[test]
    fn trip_upserts_and_validates_range() {
        let mut s = store();
        assert_eq!(s.trip().unwrap(), TripDetails::default());

        let mut trip = TripDetails {
            name: "Orlando 2025".into(),
            destination: "Orlando, FL".into(),
            start_date: Some("2025-03-01".into()),
            end_date: Some("2025-03-09".into()),
            ..Default::default()
        };
        s.save_trip(&trip).unwrap();
        trip.lodging = "Pop Century".into();
        s.save_trip(&trip).unwrap();
        assert_eq!(s.trip().unwrap().lodging, "Pop Century");

        trip.end_date = Some("2025-02-01".into());
        assert!(matches!(s.save_trip(&trip), Err(StoreError::Validation(_))));
    }

    #[test]
    fn file_store_survives_reopen_and_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("trip.db");
        {
            let mut s = Store::open(&path).unwrap();
            s.create_movie(&NewMovie {
                title: "Encanto".into(),
                ..Default::default()
            })
            .unwrap();
            s.backup_to(&dir.path().join("backup.db")).unwrap();
        }
        let s = Store::open(&path).unwrap();
        s.ping().unwrap();
        assert_eq!(s.list_movies().unwrap()[0].title, "Encanto");

        let copy = Store::open(&dir.path().join("backup.db")).unwrap();
        let counts = copy.table_counts().unwrap();
        assert!(counts.contains(&("movies".to_string(), 1)));
    }
}
