//! Artifact schema
//!
//! All tables are created atomically at build start; the platforms table is
//! preseeded with the supported platform rules.

use rusqlite::Connection;
use vulnmatch_core::{Error, Result};

/// Source tags for platform_vulnerabilities rows.
pub const SOURCE_CPE: &str = "cpe";
pub const SOURCE_MSRC: &str = "msrcAPI";
pub const SOURCE_REDHAT_OVAL: &str = "redhat_oval";
pub const SOURCE_CISCO: &str = "cisco";

/// DDL for the vulnerability database artifact (SQLite).
pub const SCHEMA: &str = r#"
CREATE TABLE vulndb_vendors(
  id INTEGER PRIMARY KEY,
  name TEXT NOT NULL
);
CREATE INDEX vulndb_vendors_name_idx ON vulndb_vendors(name);

CREATE TABLE vulndb_vendor_aliases(
  vendor_id INTEGER NOT NULL,
  alias TEXT NOT NULL
);
CREATE INDEX vulndb_vendor_aliases_alias_idx ON vulndb_vendor_aliases(alias);

CREATE TABLE vulndb_products(
  id INTEGER PRIMARY KEY,
  vendor_id INTEGER NOT NULL,
  product_name TEXT NOT NULL
);
CREATE INDEX vulndb_products_vendor_id_product_name_idx ON vulndb_products(vendor_id, product_name);
CREATE INDEX vulndb_products_product_name_idx ON vulndb_products(product_name);

CREATE TABLE vulndb_product_aliases(
  product_id INTEGER NOT NULL,
  vendor_alias TEXT NOT NULL,
  product_alias TEXT NOT NULL
);
CREATE INDEX vulndb_product_aliases_alias_idx ON vulndb_product_aliases(vendor_alias, product_alias);

CREATE TABLE vulndb_ignore_list(
  vendor_name TEXT NOT NULL,
  product_name_glob TEXT NOT NULL
);
CREATE INDEX vulndb_ignore_list_vendor_product_idx ON vulndb_ignore_list(vendor_name);

CREATE TABLE vulndb_product_items(
  id INTEGER PRIMARY KEY,
  product_id INTEGER NOT NULL,
  systype TEXT NOT NULL,
  version TEXT,
  version_start_excluding TEXT,
  version_start_including TEXT,
  version_end_excluding TEXT,
  version_end_including TEXT,
  sw_target TEXT,
  patch TEXT NOT NULL
);
CREATE INDEX vulndb_product_items_product_id_systype_version ON vulndb_product_items(product_id,systype,version);
CREATE INDEX vulndb_product_items_product_id_systype_version_patch_idx ON vulndb_product_items(product_id,systype,version,patch);

CREATE TABLE vulndb_vulnerabilities(
  product_item_id INTEGER NOT NULL,
  advisory_id INTEGER NOT NULL
);
CREATE INDEX vulndb_vulnerabilities_product_id_idx ON vulndb_vulnerabilities(product_item_id);

CREATE TABLE nvd_cve_advisories(
  id INTEGER PRIMARY KEY,
  cve_id TEXT NOT NULL,
  summary TEXT NOT NULL,
  published_at INTEGER NOT NULL,
  last_modified_at INTEGER NOT NULL,
  cvss2_base_score DOUBLE,
  cvss2_access_vector INTEGER,
  cvss2_access_complexity INTEGER,
  cvss2_authentication INTEGER,
  cvss2_confidentiality_impact INTEGER,
  cvss3_base_score DOUBLE,
  cvss3_attack_complexity INTEGER,
  cvss3_attack_vector INTEGER,
  cvss3_availability_impact INTEGER,
  cvss3_confidentiality_impact INTEGER,
  cvss3_integrity_impact INTEGER,
  cvss3_privileges_required INTEGER,
  cvss3_scope INTEGER,
  cvss3_user_interaction INTEGER,
  cvss3_vector_string TEXT,
  cvss3_exploitability_score INTEGER,
  vendor_ref_url TEXT,
  has_patch INTEGER,
  report_confirmed INTEGER
);
CREATE INDEX nvd_cve_advisories_cve_id_idx ON nvd_cve_advisories(cve_id);
CREATE INDEX nvd_cve_advisories_cvss2_base_score_idx ON nvd_cve_advisories(cvss2_base_score);
CREATE INDEX nvd_cve_advisories_cvss3_base_score_idx ON nvd_cve_advisories(cvss3_base_score);

CREATE TABLE vendor_cvss_entries(
  id INTEGER PRIMARY KEY,
  cve_id TEXT NOT NULL,
  created_at INTEGER NOT NULL,
  last_crawled_at INTEGER NOT NULL,
  last_modified_at INTEGER NOT NULL,
  cvss3_vector_string TEXT NOT NULL,
  source TEXT NOT NULL
);
CREATE INDEX vendor_cvss_entries_cve_id_idx ON vendor_cvss_entries(cve_id);

CREATE TABLE platforms(
  id INTEGER PRIMARY KEY,
  rule TEXT NOT NULL,
  display_name TEXT NOT NULL
);
INSERT INTO platforms VALUES (1, ':o:centos:centos:6.0:', 'CentOS Linux 6');
INSERT INTO platforms VALUES (2, ':o:centos:centos:6.0:', 'CentOS Linux 7');
INSERT INTO platforms VALUES (3, ':o:centos:centos:6.0:', 'CentOS Linux 8');
INSERT INTO platforms VALUES (4, ':o:cisco:ios:', 'Cisco IOS');
INSERT INTO platforms VALUES (5, ':o:debian:debian_linux:10.0:', 'Debian Linux Buster 10');
INSERT INTO platforms VALUES (6, ':o:debian:debian_linux:9.0:', 'Debian Linux Stretch 9');
INSERT INTO platforms VALUES (7, ':o:microsoft:windows_10:,Microsoft Windows 10', 'Microsoft Windows 10');
INSERT INTO platforms VALUES (8, ':o:microsoft:windows_server_2008:r2,Windows Server 2008 R2', 'Microsoft Windows Server 2008 R2');
INSERT INTO platforms VALUES (9, ':o:microsoft:windows_server_2012:-:,Windows Server 2012', 'Microsoft Windows Server 2012');
INSERT INTO platforms VALUES (10, ':o:microsoft:windows_server_2012:r2:,Windows Server 2012 R2', 'Microsoft Windows Server 2012 R2');
INSERT INTO platforms VALUES (11, ':o:microsoft:windows_server_2016:,Windows Server 2016', 'Microsoft Windows Server 2016');
INSERT INTO platforms VALUES (12, ':o:microsoft:windows_server_2019:,Windows Server 2019', 'Microsoft Windows Server 2019');
INSERT INTO platforms VALUES (13, ':o:redhat:enterprise_linux:4.0:', 'Redhat Linux 4');
INSERT INTO platforms VALUES (14, ':o:redhat:enterprise_linux:5.0:', 'Redhat Linux 5');
INSERT INTO platforms VALUES (15, ':o:redhat:enterprise_linux:6.0:', 'Redhat Linux 6');
INSERT INTO platforms VALUES (16, ':o:redhat:enterprise_linux:7.0:', 'Redhat Linux 7');
INSERT INTO platforms VALUES (17, ':o:redhat:enterprise_linux:8.0:', 'Redhat Linux 8');
INSERT INTO platforms VALUES (18, ':o:oracle:solaris:', 'Solaris');
INSERT INTO platforms VALUES (19, ':o:canonical:ubuntu_linux:18.04:', 'Ubuntu Linux Bionic 1804');
INSERT INTO platforms VALUES (20, ':o:canonical:ubuntu_linux:16.04:', 'Ubuntu Linux Xenial 1604');
INSERT INTO platforms VALUES (21, ':o:canonical:ubuntu_linux:20.04:', 'Ubuntu Linux Focal 2004');

CREATE TABLE platform_vulnerabilities(
  platform_id INTEGER NOT NULL,
  vulnerability_id INTEGER NOT NULL,
  source TEXT
);
CREATE INDEX platform_vulnerabilities_vulnerability_id_idx ON platform_vulnerabilities(vulnerability_id);

CREATE TABLE windows10_versions(
  version TEXT PRIMARY KEY,
  os_build TEXT,
  availability_date TEXT
);
"#;

/// Create the artifact schema on `conn`.
pub fn create_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .map_err(|e| Error::Database(format!("failed to create schema: {}", e)))
}
