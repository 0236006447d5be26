//! MSRC feed ingestion
//!
//! The MSRC API collaborator delivers a JSON map of CVE id to affected
//! product entries. Platform rules are matched against the product strings;
//! CVEs missing from the NVD data get a minimal advisory row so the platform
//! link has something to point at.

use crate::platform::PlatformRules;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use tracing::debug;
use vulnmatch_core::Result;
use vulnmatch_db::{Advisory, PlatformVulnerability, Session, SOURCE_MSRC};

/// Decoded MSRC vulnerability data.
#[derive(Debug, Default, Deserialize)]
pub struct MsrcFeed {
    #[serde(default)]
    pub vulnerabilities: BTreeMap<String, Vec<MsrcProductEntry>>,
}

/// One affected-product record under a CVE.
#[derive(Debug, Default, Deserialize)]
pub struct MsrcProductEntry {
    #[serde(default)]
    pub product: String,
}

impl MsrcFeed {
    /// Decode a feed from a JSON byte stream.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Write MSRC platform links into the artifact.
pub fn ingest_msrc(session: &mut Session, feed: &MsrcFeed, rules: &PlatformRules) -> Result<()> {
    let mut seen: HashSet<String> = HashSet::new();

    for (cve_id, patch_infos) in &feed.vulnerabilities {
        let advisory = match session.advisory_by_cve_exact(cve_id)? {
            Some(advisory) => advisory,
            None => {
                debug!("CVE not found in NVD: {} - adding", cve_id);
                let mut advisory = Advisory {
                    cve_id: cve_id.clone(),
                    ..Default::default()
                };
                session.insert_advisory(&mut advisory)?;
                advisory
            }
        };

        for info in patch_infos {
            for platform_id in rules.matching_ids(&info.product) {
                let key = format!("{}:{}", platform_id, advisory.id);
                if seen.insert(key) {
                    session.insert_platform_vulnerability(&PlatformVulnerability {
                        platform_id,
                        vulnerability_id: advisory.id,
                        source: SOURCE_MSRC.to_string(),
                    })?;
                }
            }
        }
    }

    Ok(())
}
