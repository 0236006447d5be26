//! Windows 10 release table ingestion
//!
//! The release-info crawler delivers `(version, os_build, availability_date)`
//! rows; rows are deduplicated by version before insertion.

use std::collections::HashSet;
use tracing::debug;
use vulnmatch_core::Result;
use vulnmatch_db::{Session, Windows10Version};

/// Insert Windows 10 release rows, deduplicated by version. Returns how many
/// rows were inserted.
pub fn ingest_windows10_versions(
    session: &mut Session,
    versions: &[Windows10Version],
) -> Result<usize> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut inserted = 0;

    for version in versions {
        if seen.insert(version.version.as_str()) {
            session.insert_windows10_version(version)?;
            inserted += 1;
        }
    }

    debug!("adding {} windows10 versions", inserted);
    Ok(inserted)
}
