//! NVD CVE feed ingestion
//!
//! The decode collaborator delivers NVD 1.1 JSON feed files (already
//! decompressed). The feed is first folded into a `CveDirectory`: the list
//! of advisories plus a `systype -> vendor -> product -> entries` map of the
//! vulnerable CPE configurations, which is then written into the artifact.

use crate::platform::PlatformRules;
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use tracing::debug;
use vulnmatch_core::{cvss, Error, Result};
use vulnmatch_db::{Advisory, PlatformVulnerability, Product, ProductItem, Session, Vendor, SOURCE_CPE};

const NVD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

const REFERENCE_TAG_VENDOR: &str = "Vendor Advisory";
const REFERENCE_TAG_PATCH: &str = "Patch";

// === Feed model (NVD 1.1 JSON) ===

/// An NVD CVE JSON data feed file.
#[derive(Debug, Default, Deserialize)]
pub struct NvdFeed {
    #[serde(rename = "CVE_Items", default)]
    pub cve_items: Vec<CveItem>,
}

impl NvdFeed {
    /// Decode a feed from a JSON byte stream.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// A CVE including impact and vulnerable configurations.
#[derive(Debug, Default, Deserialize)]
pub struct CveItem {
    pub cve: Cve,
    #[serde(default)]
    pub configurations: Configurations,
    #[serde(default)]
    pub impact: Impact,
    #[serde(rename = "publishedDate", default)]
    pub published_date: String,
    #[serde(rename = "lastModifiedDate", default)]
    pub last_modified_date: String,
}

impl CveItem {
    /// All vulnerable CPE matches of this item, flattened across
    /// configuration nodes.
    pub fn vulnerable_cpes(&self) -> Vec<&CpeMatchEntry> {
        let mut items = Vec::new();
        for node in &self.configurations.nodes {
            node.collect_vulnerable(&mut items);
        }
        items
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Cve {
    #[serde(rename = "CVE_data_meta")]
    pub meta: CveMeta,
    #[serde(default)]
    pub references: References,
    #[serde(default)]
    pub description: Description,
}

impl Cve {
    /// The English description of the CVE.
    pub fn description_en(&self) -> String {
        self.description
            .data
            .iter()
            .find(|d| d.lang == "en")
            .map(|d| d.value.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CveMeta {
    #[serde(rename = "ID")]
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct References {
    #[serde(rename = "reference_data", default)]
    pub data: Vec<ReferenceData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "refsource", default)]
    pub ref_source: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ReferenceData {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_vendor(&self) -> bool {
        self.has_tag(REFERENCE_TAG_VENDOR)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Description {
    #[serde(rename = "description_data", default)]
    pub data: Vec<LangValue>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LangValue {
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Configurations {
    #[serde(default)]
    pub nodes: Vec<ConfigurationNode>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigurationNode {
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub children: Vec<ConfigurationNode>,
    #[serde(rename = "cpe_match", default)]
    pub cpe_matches: Vec<CpeMatchEntry>,
}

impl ConfigurationNode {
    fn collect_vulnerable<'a>(&'a self, out: &mut Vec<&'a CpeMatchEntry>) {
        for child in &self.children {
            child.collect_vulnerable(out);
        }
        for cpe_match in &self.cpe_matches {
            if cpe_match.vulnerable {
                out.push(cpe_match);
            }
        }
    }
}

/// A CPE match for a given advisory.
#[derive(Debug, Default, Deserialize)]
pub struct CpeMatchEntry {
    #[serde(default)]
    pub vulnerable: bool,
    #[serde(rename = "cpe23Uri", default)]
    pub cpe23_uri: String,
    #[serde(rename = "versionStartIncluding")]
    pub version_start_including: Option<String>,
    #[serde(rename = "versionStartExcluding")]
    pub version_start_excluding: Option<String>,
    #[serde(rename = "versionEndIncluding")]
    pub version_end_including: Option<String>,
    #[serde(rename = "versionEndExcluding")]
    pub version_end_excluding: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Impact {
    #[serde(rename = "baseMetricV3")]
    pub base_metric_v3: Option<BaseMetricV3>,
    #[serde(rename = "baseMetricV2")]
    pub base_metric_v2: Option<BaseMetricV2>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BaseMetricV3 {
    #[serde(rename = "cvssV3")]
    pub cvss_v3: CvssV3,
}

#[derive(Debug, Default, Deserialize)]
pub struct CvssV3 {
    #[serde(rename = "vectorString", default)]
    pub vector_string: String,
    #[serde(rename = "attackVector", default)]
    pub attack_vector: String,
    #[serde(rename = "attackComplexity", default)]
    pub attack_complexity: String,
    #[serde(rename = "privilegesRequired", default)]
    pub privileges_required: String,
    #[serde(rename = "userInteraction", default)]
    pub user_interaction: String,
    #[serde(default)]
    pub scope: String,
    #[serde(rename = "confidentialityImpact", default)]
    pub confidentiality_impact: String,
    #[serde(rename = "integrityImpact", default)]
    pub integrity_impact: String,
    #[serde(rename = "availabilityImpact", default)]
    pub availability_impact: String,
    #[serde(rename = "baseScore", default)]
    pub base_score: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BaseMetricV2 {
    #[serde(rename = "cvssV2")]
    pub cvss_v2: CvssV2,
}

#[derive(Debug, Default, Deserialize)]
pub struct CvssV2 {
    #[serde(rename = "accessVector", default)]
    pub access_vector: String,
    #[serde(rename = "accessComplexity", default)]
    pub access_complexity: String,
    #[serde(default)]
    pub authentication: String,
    #[serde(rename = "confidentialityImpact", default)]
    pub confidentiality_impact: String,
    #[serde(rename = "baseScore", default)]
    pub base_score: f64,
}

// === Directory ===

/// One vulnerable configuration of a product, keyed under the directory map.
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub cve_id: String,
    pub version: Option<String>,
    pub version_start_excluding: Option<String>,
    pub version_start_including: Option<String>,
    pub version_end_excluding: Option<String>,
    pub version_end_including: Option<String>,
    /// The CPE "update" field
    pub update: String,
    pub sw_target: String,
    pub raw_cpe23: String,
}

type ProductMap = BTreeMap<String, Vec<DirEntry>>;
type VendorMap = BTreeMap<String, ProductMap>;

/// NVD CVE entries from one feed file, folded for insertion.
#[derive(Debug, Default)]
pub struct CveDirectory {
    /// Advisory rows to insert (ids not yet assigned).
    pub advisories: Vec<Advisory>,
    /// systype -> vendor -> product -> entries
    pub map: BTreeMap<String, VendorMap>,
}

fn parse_feed_date(value: &str) -> Option<i64> {
    NaiveDateTime::parse_from_str(value, NVD_DATE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc().timestamp())
}

/// Fold a decoded NVD feed into a `CveDirectory`. Advisories whose dates do
/// not parse are logged and skipped; a malformed CPE URI fails the feed.
pub fn build_directory(feed: &NvdFeed) -> Result<CveDirectory> {
    let mut dir = CveDirectory::default();
    debug!("CVE dict with {} items", feed.cve_items.len());

    for item in &feed.cve_items {
        let mut advisory = Advisory {
            cve_id: item.cve.meta.id.clone(),
            summary: item.cve.description_en(),
            ..Default::default()
        };

        advisory.published_at = match parse_feed_date(&item.published_date) {
            Some(ts) => ts,
            None => {
                debug!("unable to parse pub date '{}' - skipping", item.published_date);
                continue;
            }
        };
        advisory.last_modified_at = match parse_feed_date(&item.last_modified_date) {
            Some(ts) => ts,
            None => {
                debug!("unable to parse mod date '{}' - skipping", item.last_modified_date);
                continue;
            }
        };

        for reference in &item.cve.references.data {
            if reference.is_vendor() {
                if !reference.url.is_empty() {
                    advisory.vendor_ref_url = Some(reference.url.clone());
                }
                if reference.ref_source == "CONFIRM" {
                    advisory.report_confirmed = Some(1);
                }
            }
            if reference.has_tag(REFERENCE_TAG_PATCH) {
                advisory.has_patch = Some(1);
            }
        }

        if let Some(metric) = &item.impact.base_metric_v2 {
            let cvss2 = &metric.cvss_v2;
            advisory.cvss2_base_score = Some(cvss2.base_score);
            advisory.cvss2_access_vector = cvss::cvss2_access_vector(&cvss2.access_vector);
            advisory.cvss2_access_complexity = cvss::cvss2_access_complexity(&cvss2.access_complexity);
            advisory.cvss2_authentication = cvss::cvss2_authentication(&cvss2.authentication);
            advisory.cvss2_confidentiality_impact =
                cvss::cvss2_confidentiality_impact(&cvss2.confidentiality_impact);
        }

        if let Some(metric) = &item.impact.base_metric_v3 {
            let cvss3 = &metric.cvss_v3;
            advisory.cvss3_base_score = Some(cvss3.base_score);
            advisory.cvss3_attack_vector = cvss::cvss3_attack_vector(&cvss3.attack_vector);
            advisory.cvss3_attack_complexity = cvss::cvss3_attack_complexity(&cvss3.attack_complexity);
            advisory.cvss3_privileges_required =
                cvss::cvss3_privileges_required(&cvss3.privileges_required);
            advisory.cvss3_user_interaction = cvss::cvss3_user_interaction(&cvss3.user_interaction);
            advisory.cvss3_scope = cvss::cvss3_scope(&cvss3.scope);
            advisory.cvss3_confidentiality_impact =
                cvss::cvss3_cia_impact(&cvss3.confidentiality_impact);
            advisory.cvss3_integrity_impact = cvss::cvss3_cia_impact(&cvss3.integrity_impact);
            advisory.cvss3_availability_impact = cvss::cvss3_cia_impact(&cvss3.availability_impact);
            advisory.cvss3_vector_string = Some(cvss3.vector_string.clone());
        }

        dir.advisories.push(advisory);

        for vuln_item in item.vulnerable_cpes() {
            let parts = vulnmatch_cpe::parse_cpe(&vuln_item.cpe23_uri).map_err(|e| {
                Error::Parse(format!("invalid CPE '{}': {}", vuln_item.cpe23_uri, e))
            })?;

            if parts.vendor.is_empty() || parts.product.is_empty() {
                continue;
            }

            let version = if parts.version.is_empty() {
                None
            } else {
                Some(parts.version.clone())
            };

            let entry = DirEntry {
                cve_id: item.cve.meta.id.clone(),
                version,
                version_start_excluding: vuln_item.version_start_excluding.clone(),
                version_start_including: vuln_item.version_start_including.clone(),
                version_end_excluding: vuln_item.version_end_excluding.clone(),
                version_end_including: vuln_item.version_end_including.clone(),
                update: parts.patch.clone(),
                sw_target: parts.target_sw.clone(),
                raw_cpe23: vuln_item.cpe23_uri.clone(),
            };

            dir.map
                .entry(parts.systype.clone())
                .or_default()
                .entry(parts.vendor.clone())
                .or_default()
                .entry(parts.product.clone())
                .or_default()
                .push(entry);
        }
    }

    debug!(
        "CVE directory with {} OS vendors, {} application vendors",
        dir.map.get("o").map_or(0, |m| m.len()),
        dir.map.get("a").map_or(0, |m| m.len()),
    );
    Ok(dir)
}

// === Insertion ===

/// Write one `CveDirectory` into the artifact: advisories, vendor/product
/// rows, product items, vulnerability joins and platform links for OS
/// entries. `platform_vuln_seen` deduplicates platform links across feed
/// files within the run.
pub fn ingest_directory(
    session: &mut Session,
    dir: &CveDirectory,
    rules: &PlatformRules,
    platform_vuln_seen: &mut HashSet<String>,
) -> Result<()> {
    let mut advisory_ids: HashMap<String, i64> = HashMap::new();

    for template in &dir.advisories {
        let mut advisory = template.clone();
        session.insert_advisory(&mut advisory)?;
        advisory_ids.insert(advisory.cve_id.clone(), advisory.id);
    }

    for (systype, vendor_map) in &dir.map {
        for (vendor_name, product_map) in vendor_map {
            let vendor = match session.vendor_by_name(vendor_name)? {
                Some(vendor) => vendor,
                None => {
                    let mut vendor = Vendor {
                        id: 0,
                        name: vendor_name.clone(),
                    };
                    session.insert_vendor(&mut vendor)?;
                    vendor
                }
            };

            for (product_name, entries) in product_map {
                let product = match session.product_by_vendor_and_name(vendor.id, product_name)? {
                    Some(product) => product,
                    None => {
                        let mut product = Product {
                            id: 0,
                            vendor_id: vendor.id,
                            product_name: product_name.clone(),
                        };
                        session.insert_product(&mut product)?;
                        product
                    }
                };

                for entry in entries {
                    let advisory_id = advisory_ids.get(&entry.cve_id).copied().unwrap_or(0);

                    if systype == "o" {
                        for platform_id in rules.matching_ids(&entry.raw_cpe23) {
                            let key = format!("{}:{}", platform_id, advisory_id);
                            if platform_vuln_seen.insert(key) {
                                session.insert_platform_vulnerability(&PlatformVulnerability {
                                    platform_id,
                                    vulnerability_id: advisory_id,
                                    source: SOURCE_CPE.to_string(),
                                })?;
                            }
                        }
                    }

                    let item = product_item_for_entry(product.id, systype, entry);
                    let item_id = match session.find_product_item_matching(&item)? {
                        Some(existing) => existing.id,
                        None => {
                            let mut item = item;
                            session.insert_product_item(&mut item)?;
                            item.id
                        }
                    };

                    session.insert_vulnerability(item_id, advisory_id)?;
                }
            }
        }
    }

    Ok(())
}

fn product_item_for_entry(product_id: i64, systype: &str, entry: &DirEntry) -> ProductItem {
    let mut item = ProductItem {
        product_id,
        systype: systype.to_string(),
        version_start_excluding: entry.version_start_excluding.clone(),
        version_start_including: entry.version_start_including.clone(),
        version_end_excluding: entry.version_end_excluding.clone(),
        version_end_including: entry.version_end_including.clone(),
        ..Default::default()
    };
    if let Some(version) = &entry.version {
        if version != "*" {
            item.version = Some(version.clone());
        }
    }
    if !entry.update.is_empty() && entry.update != "*" {
        item.patch = entry.update.clone();
    }
    if !entry.sw_target.is_empty() && entry.sw_target != "*" {
        item.sw_target = Some(entry.sw_target.clone());
    }
    item
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_json() -> &'static str {
        r#"{
          "CVE_Items": [
            {
              "cve": {
                "CVE_data_meta": {"ID": "CVE-2018-1000"},
                "references": {"reference_data": [
                  {"url": "https://vendor.example/adv", "name": "adv", "refsource": "CONFIRM",
                   "tags": ["Vendor Advisory", "Patch"]}
                ]},
                "description": {"description_data": [
                  {"lang": "en", "value": "Buffer overflow in example product."}
                ]}
              },
              "configurations": {"nodes": [
                {"operator": "OR", "cpe_match": [
                  {"vulnerable": true,
                   "cpe23Uri": "cpe:2.3:a:example:widget:*:*:*:*:*:*:*:*",
                   "versionEndExcluding": "2.5.1"},
                  {"vulnerable": false,
                   "cpe23Uri": "cpe:2.3:a:example:widget:2.5.1:*:*:*:*:*:*:*"}
                ]}
              ]},
              "impact": {"baseMetricV3": {"cvssV3": {
                "vectorString": "CVSS:3.0/AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H",
                "attackVector": "NETWORK", "attackComplexity": "LOW",
                "privilegesRequired": "NONE", "userInteraction": "NONE",
                "scope": "UNCHANGED", "confidentialityImpact": "HIGH",
                "integrityImpact": "HIGH", "availabilityImpact": "HIGH",
                "baseScore": 9.8, "baseSeverity": "CRITICAL"
              }}},
              "publishedDate": "2018-02-01T14:29Z",
              "lastModifiedDate": "2018-03-07T19:12Z"
            },
            {
              "cve": {
                "CVE_data_meta": {"ID": "CVE-2018-1001"},
                "description": {"description_data": [
                  {"lang": "en", "value": "Bad date."}
                ]}
              },
              "publishedDate": "not-a-date",
              "lastModifiedDate": "2018-03-07T19:12Z"
            }
          ]
        }"#
    }

    #[test]
    fn test_build_directory() {
        let feed = NvdFeed::from_reader(feed_json().as_bytes()).unwrap();
        let dir = build_directory(&feed).unwrap();

        // The malformed-date advisory is skipped.
        assert_eq!(dir.advisories.len(), 1);
        let advisory = &dir.advisories[0];
        assert_eq!(advisory.cve_id, "CVE-2018-1000");
        assert_eq!(advisory.cvss3_base_score, Some(9.8));
        assert_eq!(advisory.cvss3_attack_vector, Some(cvss::ATTACK_VECTOR_NETWORK));
        assert_eq!(advisory.has_patch, Some(1));
        assert_eq!(advisory.report_confirmed, Some(1));
        assert_eq!(advisory.vendor_ref_url.as_deref(), Some("https://vendor.example/adv"));
        assert_eq!(advisory.published_at, 1517495340);

        // Only the vulnerable CPE match lands in the map.
        let entries = &dir.map["a"]["example"]["widget"];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].version.as_deref(), Some("*"));
        assert_eq!(entries[0].version_end_excluding.as_deref(), Some("2.5.1"));
    }

    #[test]
    fn test_product_item_for_entry_strips_wildcards() {
        let entry = DirEntry {
            cve_id: "CVE-2018-1000".into(),
            version: Some("*".into()),
            version_start_excluding: None,
            version_start_including: None,
            version_end_excluding: Some("2.5.1".into()),
            version_end_including: None,
            update: "*".into(),
            sw_target: "*".into(),
            raw_cpe23: String::new(),
        };
        let item = product_item_for_entry(7, "a", &entry);
        assert_eq!(item.version, None);
        assert_eq!(item.patch, "");
        assert_eq!(item.sw_target, None);
        assert_eq!(item.version_end_excluding.as_deref(), Some("2.5.1"));
    }
}
