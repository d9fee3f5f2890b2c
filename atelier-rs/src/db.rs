//! SQLite layer for users and links.
//!
//! Wraps a single `rusqlite` connection behind a mutex and runs schema
//! migrations on open. All access goes through parameterized queries.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    category TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_links_category ON links(category, id);
"#;

/// Account role. Unknown values stored in the database read back as `User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    fn from_db(raw: &str) -> Self {
        match raw {
            "admin" => Role::Admin,
            _ => Role::User,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Link {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub category: Option<String>,
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("username already exists")]
    DuplicateUsername,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl Database {
    /// Open or create the database at the given path and run migrations.
    pub fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let conn = Connection::open(&path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            path: PathBuf::from(":memory:"),
        };
        db.run_migrations()?;
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_migrations(&self) -> DbResult<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn create_user(&self, username: &str, password_hash: &str, role: Role) -> DbResult<User> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)",
            params![username, password_hash, role.as_str()],
        )
        .map_err(map_unique_violation)?;

        let id = conn.last_insert_rowid();
        let created_at = conn.query_row(
            "SELECT created_at FROM users WHERE id = ?",
            [id],
            |row| row.get(0),
        )?;

        Ok(User {
            id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at,
        })
    }

    pub fn find_user(&self, username: &str) -> DbResult<Option<User>> {
        let conn = self.conn();
        let user = conn
            .query_row(
                "SELECT id, username, password_hash, role, created_at FROM users WHERE username = ?",
                [username],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password_hash: row.get(2)?,
                        role: Role::from_db(&row.get::<_, String>(3)?),
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(user)
    }

    /// Create the user as admin, or promote an existing account. An existing
    /// account keeps its stored password.
    pub fn grant_admin(&self, username: &str, password_hash: &str) -> DbResult<()> {
        self.conn().execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?, ?, 'admin')
             ON CONFLICT(username) DO UPDATE SET role = 'admin'",
            params![username, password_hash],
        )?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Links ordered for the public grouped listing: category first, then
    /// insertion id within each category.
    pub fn list_links(&self) -> DbResult<Vec<Link>> {
        self.query_links("SELECT id, name, url, category FROM links ORDER BY category, id")
    }

    /// Raw rows for the management view, in insertion order.
    pub fn list_links_all(&self) -> DbResult<Vec<Link>> {
        self.query_links("SELECT id, name, url, category FROM links ORDER BY id")
    }

    fn query_links(&self, sql: &str) -> DbResult<Vec<Link>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let links = stmt
            .query_map([], |row| {
                Ok(Link {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                    category: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(links)
    }

    pub fn get_link(&self, id: i64) -> DbResult<Option<Link>> {
        let conn = self.conn();
        let link = conn
            .query_row(
                "SELECT id, name, url, category FROM links WHERE id = ?",
                [id],
                |row| {
                    Ok(Link {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        url: row.get(2)?,
                        category: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(link)
    }

    pub fn create_link(&self, name: &str, url: &str, category: Option<&str>) -> DbResult<Link> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO links (name, url, category) VALUES (?, ?, ?)",
            params![name, url, category],
        )?;
        Ok(Link {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            url: url.to_string(),
            category: category.map(str::to_string),
        })
    }

    /// Returns false when no row with this id exists.
    pub fn update_link(
        &self,
        id: i64,
        name: &str,
        url: &str,
        category: Option<&str>,
    ) -> DbResult<bool> {
        let affected = self.conn().execute(
            "UPDATE links SET name = ?, url = ?, category = ? WHERE id = ?",
            params![name, url, category, id],
        )?;
        Ok(affected > 0)
    }

    /// Returns false when no row with this id exists.
    pub fn delete_link(&self, id: i64) -> DbResult<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM links WHERE id = ?", [id])?;
        Ok(affected > 0)
    }
}

fn map_unique_violation(err: rusqlite::Error) -> DbError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DbError::DuplicateUsername
        }
        _ => DbError::Sqlite(err),
    }
}
