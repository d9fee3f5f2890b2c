//! Password hashing and admin bootstrap credentials.
//!
//! Passwords are stored as `<salt>$<rounds>$<digest>` using iterated SHA-256
//! with a per-user random salt. Verification recomputes the digest and
//! compares in constant time.
//!
//! ## Admin file format
//!
//! The optional `--admin-file` TOML grants admin role at startup:
//!
//! ```toml
//! username = "curator"
//! password = "secret"
//! ```
//!
//! or, for several admins:
//!
//! ```toml
//! [[admins]]
//! username = "curator"
//! password = "pw1"
//!
//! [[admins]]
//! username = "assistant"
//! password = "pw2"
//! ```
//!
//! Entries with empty usernames or passwords are skipped.
//!
//! **Security:** Use `chmod 600` on the admin file. The server warns if it is
//! world-readable (Unix).

use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::warn;

const HASH_ROUNDS: u32 = 100_000;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = uuid::Uuid::new_v4().simple().to_string();
    let digest = iterated_digest(&salt, password, HASH_ROUNDS);
    format!("{salt}${HASH_ROUNDS}${digest}")
}

/// Check a password against a stored `<salt>$<rounds>$<digest>` value.
/// Malformed stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(salt), Some(rounds), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };

    let computed = iterated_digest(salt, password, rounds);
    computed.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn iterated_digest(salt: &str, password: &str, rounds: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..rounds {
        digest = Sha256::digest(digest);
    }

    hex::encode(digest)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredential {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum AdminFileError {
    #[error("failed to read admin file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid admin file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("admin file {path} does not define valid credentials")]
    EmptyCredentials { path: String },
}

#[derive(Debug, Default, Deserialize)]
struct AdminFile {
    username: Option<String>,
    password: Option<String>,
    admins: Option<Vec<AdminEntry>>,
}

#[derive(Debug, Clone, Deserialize)]
struct AdminEntry {
    username: String,
    password: String,
}

/// Load admin credentials from a TOML file. Requires at least one valid entry.
/// Warns if the file is world-readable (Unix only).
pub fn load_admin_file(path: &Path) -> Result<Vec<AdminCredential>, AdminFileError> {
    check_admin_file_permissions(path);

    let raw = std::fs::read_to_string(path).map_err(|source| AdminFileError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let parsed: AdminFile = toml::from_str(&raw).map_err(|source| AdminFileError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    let mut admins = Vec::new();

    if let (Some(username), Some(password)) = (parsed.username, parsed.password) {
        admins.push(AdminCredential { username, password });
    }
    if let Some(more) = parsed.admins {
        admins.extend(more.into_iter().map(|entry| AdminCredential {
            username: entry.username,
            password: entry.password,
        }));
    }

    admins.retain(|admin| !admin.username.trim().is_empty() && !admin.password.trim().is_empty());

    if admins.is_empty() {
        return Err(AdminFileError::EmptyCredentials {
            path: path.display().to_string(),
        });
    }

    Ok(admins)
}

#[cfg(unix)]
fn check_admin_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = std::fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o004 != 0 {
            warn!(
                path = %path.display(),
                "admin file is world-readable; consider chmod 600"
            );
        }
    }
}

#[cfg(not(unix))]
fn check_admin_file_permissions(_path: &Path) {}
