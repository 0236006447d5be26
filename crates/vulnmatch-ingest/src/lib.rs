//! VulnMatch Ingest - Artifact building from feed records
//!
//! This crate turns the structured records delivered by the feed
//! collaborators (NVD CVE JSON files, MSRC JSON, Red Hat OVAL definitions,
//! alias/ignore XML, Windows 10 release rows) into the SQLite artifact.
//!
//! The dataset is rebuilt from scratch on every run: the artifact file is
//! deleted, the schema recreated and all rows bulk-inserted through one
//! recycled write transaction. On any error the caller must discard the
//! partial artifact; restarting ingestion against one is undefined.

pub mod aliases;
pub mod msrc;
pub mod nvd;
pub mod platform;
pub mod redhat;
pub mod windows;

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use tracing::{debug, info};
use vulnmatch_core::{Error, Result};
use vulnmatch_db::{schema, Session, Windows10Version};

pub use platform::PlatformRules;

/// Inputs for one artifact build.
#[derive(Debug, Default)]
pub struct BuildParams {
    /// Where to write the artifact; an existing file is replaced.
    pub db_path: PathBuf,
    /// NVD CVE JSON feed files (one per year), already decompressed.
    pub cve_paths: Vec<PathBuf>,
    /// Vendor aliases XML file.
    pub vendor_aliases_path: PathBuf,
    /// Product aliases XML file.
    pub product_aliases_path: PathBuf,
    /// Product ignore-list XML file.
    pub ignore_list_path: PathBuf,
    /// MSRC vulnerability JSON file.
    pub msrc_path: Option<PathBuf>,
    /// Pre-parsed Red Hat OVAL definitions per release.
    pub redhat_releases: Vec<redhat::OvalRelease>,
    /// Windows 10 release rows from the release-info crawler.
    pub windows10_versions: Vec<Windows10Version>,
}

impl BuildParams {
    /// Check that the required inputs are set.
    pub fn validate(&self) -> Result<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(Error::InvalidParams("db_path is required".into()));
        }
        if self.cve_paths.is_empty() {
            return Err(Error::InvalidParams("at least one CVE feed is required".into()));
        }
        if self.vendor_aliases_path.as_os_str().is_empty() {
            return Err(Error::InvalidParams("vendor_aliases_path is required".into()));
        }
        if self.product_aliases_path.as_os_str().is_empty() {
            return Err(Error::InvalidParams("product_aliases_path is required".into()));
        }
        if self.ignore_list_path.as_os_str().is_empty() {
            return Err(Error::InvalidParams("ignore_list_path is required".into()));
        }
        Ok(())
    }
}

/// Counters from one build run.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuildStats {
    pub total_inserts: i64,
    pub windows10_versions: usize,
}

/// Build the vulnerability database artifact from the configured feeds.
pub fn build(params: &BuildParams) -> Result<BuildStats> {
    params.validate()?;

    // Remove if exists; the artifact is rebuilt from scratch.
    let _ = std::fs::remove_file(&params.db_path);

    let mut session = Session::create(&params.db_path)?;
    let mut stats = BuildStats::default();

    let result = build_into(&mut session, params, &mut stats);
    match result {
        Ok(()) => {
            stats.total_inserts = session.total_insert_count();
            session.commit_and_close()?;
            info!(
                "built vulnerability database at {} ({} rows)",
                params.db_path.display(),
                stats.total_inserts
            );
            Ok(stats)
        }
        Err(e) => {
            // Leave rollback to the dropped connection; the partial artifact
            // file is the caller's to delete.
            drop(session);
            Err(e)
        }
    }
}

fn build_into(session: &mut Session, params: &BuildParams, stats: &mut BuildStats) -> Result<()> {
    session.exec_batch(schema::SCHEMA)?;

    let rules = PlatformRules::load(session)?;

    // NVD CVE feeds.
    let mut platform_vuln_seen: HashSet<String> = HashSet::new();
    for cve_path in &params.cve_paths {
        debug!("processing {}", cve_path.display());
        let file = File::open(cve_path)?;
        let feed = nvd::NvdFeed::from_reader(BufReader::new(file))?;
        let dir = nvd::build_directory(&feed)?;
        nvd::ingest_directory(session, &dir, &rules, &mut platform_vuln_seen)?;
    }

    // Windows 10 release table.
    stats.windows10_versions =
        windows::ingest_windows10_versions(session, &params.windows10_versions)?;

    // Vendor aliases.
    let vendor_aliases =
        aliases::read_vendor_aliases(&std::fs::read_to_string(&params.vendor_aliases_path)?)?;
    aliases::ingest_vendor_aliases(session, &vendor_aliases)?;

    // Product aliases.
    let product_aliases =
        aliases::read_product_aliases(&std::fs::read_to_string(&params.product_aliases_path)?)?;
    aliases::ingest_product_aliases(session, &product_aliases)?;

    // Ignore list.
    let ignore_list =
        aliases::read_ignore_list(&std::fs::read_to_string(&params.ignore_list_path)?)?;
    aliases::ingest_ignore_list(session, &ignore_list)?;

    // MSRC.
    if let Some(msrc_path) = &params.msrc_path {
        let file = File::open(msrc_path)?;
        let feed = msrc::MsrcFeed::from_reader(BufReader::new(file))?;
        msrc::ingest_msrc(session, &feed, &rules)?;
    } else {
        debug!("no MSRC feed configured - skipping");
    }

    // Red Hat OVAL.
    redhat::ingest_redhat_oval(session, &params.redhat_releases)?;

    Ok(())
}
