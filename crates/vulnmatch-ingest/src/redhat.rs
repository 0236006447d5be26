//! Red Hat OVAL ingestion
//!
//! The OVAL decode collaborator delivers definition records per RHEL
//! release. CVEs already known from NVD only gain a platform link; unknown
//! CVEs are created from the OVAL data itself.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use tracing::{debug, error};
use vulnmatch_core::{Error, Result};
use vulnmatch_db::{Advisory, PlatformVulnerability, Session, SOURCE_REDHAT_OVAL};

const OVAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// OVAL definitions for one RHEL release.
#[derive(Debug, Default, Deserialize)]
pub struct OvalRelease {
    /// Release number, e.g. "7"
    pub release: String,
    #[serde(default)]
    pub definitions: Vec<OvalDefinition>,
}

impl OvalRelease {
    /// Decode a release's definition records from a JSON byte stream.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A single OVAL definition with its advisory metadata.
#[derive(Debug, Default, Deserialize)]
pub struct OvalDefinition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub advisory: OvalAdvisory,
}

#[derive(Debug, Default, Deserialize)]
pub struct OvalAdvisory {
    #[serde(default)]
    pub issued: OvalDate,
    #[serde(default)]
    pub updated: OvalDate,
    #[serde(default)]
    pub cves: Vec<OvalCve>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OvalDate {
    #[serde(default)]
    pub date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct OvalCve {
    #[serde(default)]
    pub cve_id: String,
    #[serde(default)]
    pub cvss3: String,
    #[serde(default)]
    pub href: String,
}

fn parse_oval_date(value: &str) -> Option<i64> {
    NaiveDate::parse_from_str(value, OVAL_DATE_FORMAT)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

/// Write the OVAL data of every release into the artifact.
pub fn ingest_redhat_oval(session: &mut Session, releases: &[OvalRelease]) -> Result<()> {
    debug!("processing Red Hat OVAL data");
    for release in releases {
        ingest_release(session, release)?;
    }
    Ok(())
}

fn ingest_release(session: &mut Session, release: &OvalRelease) -> Result<()> {
    let mut advisory_ids = session.advisory_ids_by_cve()?;

    let display_name = format!("Redhat Linux {}", release.release);
    let platform = session
        .platform_by_display_name(&display_name)?
        .ok_or_else(|| Error::MissingReference {
            entity: "platform",
            name: display_name.clone(),
        })?;

    let mut seen: HashSet<String> = session
        .find_platform_vulnerabilities()?
        .iter()
        .map(|pv| format!("{}:{}", pv.platform_id, pv.vulnerability_id))
        .collect();

    debug!("updating Red Hat {} OVAL data", release.release);
    let mut created: i64 = 0;

    for definition in &release.definitions {
        for cve in &definition.advisory.cves {
            if let Some(advisory_id) = advisory_ids.get(&cve.cve_id).copied() {
                let key = format!("{}:{}", platform.id, advisory_id);
                if seen.insert(key) {
                    session.insert_platform_vulnerability(&PlatformVulnerability {
                        platform_id: platform.id,
                        vulnerability_id: advisory_id,
                        source: SOURCE_REDHAT_OVAL.to_string(),
                    })?;
                }
                continue;
            }

            let published_at = match parse_oval_date(&definition.advisory.issued.date) {
                Some(ts) => ts,
                None => {
                    error!(
                        "unable to parse issued date '{}' for {}",
                        definition.advisory.issued.date, cve.cve_id
                    );
                    continue;
                }
            };
            let last_modified_at = match parse_oval_date(&definition.advisory.updated.date) {
                Some(ts) => ts,
                None => {
                    error!(
                        "unable to parse updated date '{}' for {}",
                        definition.advisory.updated.date, cve.cve_id
                    );
                    continue;
                }
            };

            created += 1;
            let mut advisory = Advisory {
                cve_id: cve.cve_id.clone(),
                summary: definition.description.clone(),
                published_at,
                last_modified_at,
                cvss3_vector_string: Some(cve.cvss3.clone()),
                vendor_ref_url: Some(cve.href.clone()),
                ..Default::default()
            };
            session.insert_advisory(&mut advisory)?;
            advisory_ids.insert(cve.cve_id.clone(), advisory.id);

            session.insert_platform_vulnerability(&PlatformVulnerability {
                platform_id: platform.id,
                vulnerability_id: advisory.id,
                source: SOURCE_REDHAT_OVAL.to_string(),
            })?;
            seen.insert(format!("{}:{}", platform.id, advisory.id));
        }
    }

    debug!("added {} advisories from Redhat {} OVAL", created, release.release);
    Ok(())
}
