//! Row models for the artifact tables

use rusqlite::Row;

/// A vendor with a canonical CPE name (lowercased, underscore-joined).
#[derive(Debug, Clone, PartialEq)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
}

impl Vendor {
    pub const COLUMNS: &'static str = "id, name";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
        })
    }
}

/// A raw vendor string as it may appear in a software inventory,
/// e.g. "Microsoft Incorporated" -> microsoft.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorAlias {
    pub vendor_id: i64,
    pub alias: String,
}

impl VendorAlias {
    pub const COLUMNS: &'static str = "vendor_id, alias";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            vendor_id: row.get(0)?,
            alias: row.get(1)?,
        })
    }
}

/// A product identified by vendor and CPE product name.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub vendor_id: i64,
    pub product_name: String,
}

impl Product {
    pub const COLUMNS: &'static str = "id, vendor_id, product_name";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            vendor_id: row.get(1)?,
            product_name: row.get(2)?,
        })
    }
}

/// Alias of vendor/product display strings for a product. `product_alias`
/// uses SQL GLOB pattern semantics; `vendor_alias` is exact.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAlias {
    pub product_id: i64,
    pub vendor_alias: String,
    pub product_alias: String,
}

impl ProductAlias {
    pub const COLUMNS: &'static str = "product_id, vendor_alias, product_alias";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            product_id: row.get(0)?,
            vendor_alias: row.get(1)?,
            product_alias: row.get(2)?,
        })
    }
}

/// A specific version/update of a product, either an exact version or a
/// half/fully-open range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductItem {
    pub id: i64,
    pub product_id: i64,
    pub systype: String,
    pub version: Option<String>,
    pub version_start_excluding: Option<String>,
    pub version_start_including: Option<String>,
    pub version_end_excluding: Option<String>,
    pub version_end_including: Option<String>,
    pub patch: String,
    pub sw_target: Option<String>,
}

impl ProductItem {
    pub const COLUMNS: &'static str = "id, product_id, systype, version, version_start_excluding, \
         version_start_including, version_end_excluding, version_end_including, patch, sw_target";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            product_id: row.get(1)?,
            systype: row.get(2)?,
            version: row.get(3)?,
            version_start_excluding: row.get(4)?,
            version_start_including: row.get(5)?,
            version_end_excluding: row.get(6)?,
            version_end_including: row.get(7)?,
            patch: row.get(8)?,
            sw_target: row.get(9)?,
        })
    }

    /// The version constraint of this item as a sum type. The storage schema
    /// keeps the denormalized columns for index efficiency; matching code
    /// operates on this form.
    pub fn version_spec(&self) -> VersionSpec {
        match &self.version {
            Some(version) if !version.is_empty() && version != "*" => {
                VersionSpec::Exact(version.clone())
            }
            _ => {
                let start = if let Some(v) = &self.version_start_including {
                    VersionBound::Including(v.clone())
                } else if let Some(v) = &self.version_start_excluding {
                    VersionBound::Excluding(v.clone())
                } else {
                    VersionBound::Unbounded
                };
                let end = if let Some(v) = &self.version_end_including {
                    VersionBound::Including(v.clone())
                } else if let Some(v) = &self.version_end_excluding {
                    VersionBound::Excluding(v.clone())
                } else {
                    VersionBound::Unbounded
                };
                VersionSpec::Range { start, end }
            }
        }
    }
}

/// One endpoint of a version range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionBound {
    Unbounded,
    Including(String),
    Excluding(String),
}

/// Version constraint of a product item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// A concrete version (never `*`)
    Exact(String),
    /// A half- or fully-open range
    Range { start: VersionBound, end: VersionBound },
}

/// An item in the vendor/product ignore list.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoreListItem {
    pub vendor_name: String,
    pub product_name_glob: String,
}

/// A supported platform; `rule` is a comma-separated list of regexes
/// matched against raw CPE URIs or MSRC product strings.
#[derive(Debug, Clone, PartialEq)]
pub struct Platform {
    pub id: i64,
    pub rule: String,
    pub display_name: String,
}

impl Platform {
    pub const COLUMNS: &'static str = "id, rule, display_name";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            rule: row.get(1)?,
            display_name: row.get(2)?,
        })
    }
}

/// Connects a platform with an advisory, tagged by the feed that produced
/// the link.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformVulnerability {
    pub platform_id: i64,
    pub vulnerability_id: i64,
    pub source: String,
}

impl PlatformVulnerability {
    pub const COLUMNS: &'static str = "platform_id, vulnerability_id, source";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            platform_id: row.get(0)?,
            vulnerability_id: row.get(1)?,
            source: row.get(2)?,
        })
    }
}

/// A Windows 10 release row.
#[derive(Debug, Clone, PartialEq)]
pub struct Windows10Version {
    pub version: String,
    pub os_build: String,
    pub availability_date: String,
}

/// An NVD CVE advisory with encoded CVSS2/CVSS3 metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Advisory {
    pub id: i64,
    pub cve_id: String,
    pub summary: String,
    pub published_at: i64,
    pub last_modified_at: i64,
    // CVSS2.
    pub cvss2_base_score: Option<f64>,
    pub cvss2_access_vector: Option<i64>,
    pub cvss2_access_complexity: Option<i64>,
    pub cvss2_authentication: Option<i64>,
    pub cvss2_confidentiality_impact: Option<i64>,
    // CVSS3.
    pub cvss3_base_score: Option<f64>,
    pub cvss3_attack_complexity: Option<i64>,
    pub cvss3_attack_vector: Option<i64>,
    pub cvss3_availability_impact: Option<i64>,
    pub cvss3_confidentiality_impact: Option<i64>,
    pub cvss3_integrity_impact: Option<i64>,
    pub cvss3_privileges_required: Option<i64>,
    pub cvss3_scope: Option<i64>,
    pub cvss3_user_interaction: Option<i64>,
    pub cvss3_vector_string: Option<String>,
    pub cvss3_exploitability_score: Option<i64>,

    pub vendor_ref_url: Option<String>,
    pub has_patch: Option<i64>,
    pub report_confirmed: Option<i64>,
}

impl Advisory {
    pub const COLUMNS: &'static str = "id, cve_id, summary, published_at, last_modified_at, \
         cvss2_base_score, cvss2_access_vector, cvss2_access_complexity, cvss2_authentication, \
         cvss2_confidentiality_impact, cvss3_base_score, cvss3_attack_complexity, \
         cvss3_attack_vector, cvss3_availability_impact, cvss3_confidentiality_impact, \
         cvss3_integrity_impact, cvss3_privileges_required, cvss3_scope, cvss3_user_interaction, \
         cvss3_vector_string, cvss3_exploitability_score, vendor_ref_url, has_patch, report_confirmed";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            cve_id: row.get(1)?,
            summary: row.get(2)?,
            published_at: row.get(3)?,
            last_modified_at: row.get(4)?,
            cvss2_base_score: row.get(5)?,
            cvss2_access_vector: row.get(6)?,
            cvss2_access_complexity: row.get(7)?,
            cvss2_authentication: row.get(8)?,
            cvss2_confidentiality_impact: row.get(9)?,
            cvss3_base_score: row.get(10)?,
            cvss3_attack_complexity: row.get(11)?,
            cvss3_attack_vector: row.get(12)?,
            cvss3_availability_impact: row.get(13)?,
            cvss3_confidentiality_impact: row.get(14)?,
            cvss3_integrity_impact: row.get(15)?,
            cvss3_privileges_required: row.get(16)?,
            cvss3_scope: row.get(17)?,
            cvss3_user_interaction: row.get(18)?,
            cvss3_vector_string: row.get(19)?,
            cvss3_exploitability_score: row.get(20)?,
            vendor_ref_url: row.get(21)?,
            has_patch: row.get(22)?,
            report_confirmed: row.get(23)?,
        })
    }
}

/// A vendor-published CVSS entry tracked alongside NVD data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorCvssEntry {
    pub id: i64,
    pub cve_id: String,
    pub created_at: i64,
    pub last_crawled_at: i64,
    pub last_modified_at: i64,
    pub cvss3_vector_string: String,
    pub source: String,
}

impl VendorCvssEntry {
    pub const COLUMNS: &'static str =
        "id, cve_id, created_at, last_crawled_at, last_modified_at, cvss3_vector_string, source";

    pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            cve_id: row.get(1)?,
            created_at: row.get(2)?,
            last_crawled_at: row.get(3)?,
            last_modified_at: row.get(4)?,
            cvss3_vector_string: row.get(5)?,
            source: row.get(6)?,
        })
    }
}

/// A matched advisory returned from CVE matching.
#[derive(Debug, Clone, PartialEq)]
pub struct CveMatch {
    pub advisory: Advisory,
    /// True if the match was specific to the queried target_sw.
    pub targeted_sw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_spec_exact() {
        let item = ProductItem {
            version: Some("1.2.3".into()),
            ..Default::default()
        };
        assert_eq!(item.version_spec(), VersionSpec::Exact("1.2.3".into()));
    }

    #[test]
    fn test_version_spec_wildcard_is_range() {
        let item = ProductItem {
            version: Some("*".into()),
            version_end_excluding: Some("3.1.5".into()),
            ..Default::default()
        };
        assert_eq!(
            item.version_spec(),
            VersionSpec::Range {
                start: VersionBound::Unbounded,
                end: VersionBound::Excluding("3.1.5".into()),
            }
        );
    }

    #[test]
    fn test_version_spec_range_bounds() {
        let item = ProductItem {
            version_start_including: Some("2.0".into()),
            version_end_including: Some("2.17.0".into()),
            ..Default::default()
        };
        assert_eq!(
            item.version_spec(),
            VersionSpec::Range {
                start: VersionBound::Including("2.0".into()),
                end: VersionBound::Including("2.17.0".into()),
            }
        );
    }
}
