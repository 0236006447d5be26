//! Artifact holder
//!
//! `VulnDb` tracks the artifact file on disk and hands out query sessions.
//! The artifact is immutable once built; when a rebuild swaps in a new file,
//! the holder notices the size/mtime change and new sessions see the new
//! data.

use crate::session::Session;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use vulnmatch_core::{Error, Result};

/// The vulnerability matching database, stored as a flat SQLite file.
pub struct VulnDb {
    db_path: PathBuf,
    last_modified: Option<SystemTime>,
    last_size: u64,
}

impl VulnDb {
    /// Open the vulnerability database at `db_path`. Fails if the artifact
    /// does not exist yet.
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let meta = std::fs::metadata(&db_path).map_err(|_| Error::ArtifactNotFound {
            path: db_path.display().to_string(),
        })?;

        Ok(Self {
            last_modified: meta.modified().ok(),
            last_size: meta.len(),
            db_path,
        })
    }

    /// Path of the artifact file.
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Open a new read-only query session. Each session gets its own
    /// connection, so sessions may run in parallel. If the artifact file
    /// changed since the last session, the reload is noted.
    pub fn session(&mut self) -> Result<Session> {
        self.refresh()?;
        Session::open_read_only(&self.db_path)
    }

    /// Re-stat the artifact and record a swap when size or mtime changed.
    fn refresh(&mut self) -> Result<()> {
        let meta = std::fs::metadata(&self.db_path).map_err(|_| Error::ArtifactNotFound {
            path: self.db_path.display().to_string(),
        })?;

        let modified = meta.modified().ok();
        if meta.len() != self.last_size || modified != self.last_modified {
            self.last_size = meta.len();
            self.last_modified = modified;
            debug!("reloaded vulnerability database artifact");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    #[test]
    fn test_open_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.sqlite");
        assert!(matches!(
            VulnDb::open(&missing),
            Err(Error::ArtifactNotFound { .. })
        ));
    }

    #[test]
    fn test_open_and_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vulndb.sqlite");

        let session = Session::create(&path).unwrap();
        schema::create_schema(session.raw()).unwrap();
        session.commit_and_close().unwrap();

        let mut vdb = VulnDb::open(&path).unwrap();
        let session = vdb.session().unwrap();
        let platforms = session.find_platforms().unwrap();
        assert_eq!(platforms.len(), 21);
    }
}
