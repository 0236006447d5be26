//! Transactional session over the artifact
//!
//! A `Session` wraps one SQLite connection. Writes run inside a long-lived
//! transaction that is committed and reopened every
//! `INSERT_COMMIT_THRESHOLD` insertions, bounding WAL growth while keeping
//! bulk-insert throughput. Query results are cached per session: resolved
//! vendors/products by id and complete CVE match results by query signature.

use crate::models::{
    Advisory, CveMatch, IgnoreListItem, Platform, PlatformVulnerability, Product, ProductAlias,
    ProductItem, Vendor, VendorAlias, VendorCvssEntry, Windows10Version,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;
use tracing::debug;
use vulnmatch_core::{Error, Result};

/// Commit and reopen the write transaction after this many insertions.
const INSERT_COMMIT_THRESHOLD: i64 = 50_000;

/// Emit an insertion-speed debug line every this many insertions.
const INSERT_STATS_THRESHOLD: i64 = 100_000;

/// Session wrapper with automatic commit recycling and per-session caches.
pub struct Session {
    conn: Connection,
    in_tx: bool,

    insert_count: i64,
    total_insert_count: i64,
    started_at: Instant,
    print_stats: bool,

    // Cached CVE results by query signature.
    cve_cache: HashMap<String, Vec<CveMatch>>,

    // Product and vendor cache by id.
    product_cache: HashMap<i64, Option<Product>>,
    vendor_cache: HashMap<i64, Option<Vendor>>,
}

fn db_err(context: &str, e: rusqlite::Error) -> Error {
    Error::Database(format!("{}: {}", context, e))
}

/// Build an `IN (?, ?, ...)` clause for `n` parameters.
pub fn in_clause(column: &str, n: usize) -> String {
    let placeholders = vec!["?"; n].join(",");
    format!("{} IN ({})", column, placeholders)
}

impl Session {
    fn new(conn: Connection) -> Self {
        Self {
            conn,
            in_tx: false,
            insert_count: 0,
            total_insert_count: 0,
            started_at: Instant::now(),
            print_stats: true,
            cve_cache: HashMap::new(),
            product_cache: HashMap::new(),
            vendor_cache: HashMap::new(),
        }
    }

    /// Open a read-write session, creating the file if needed.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| db_err("failed to open vulnerability database", e))?;
        Ok(Self::new(conn))
    }

    /// Open a read-only session against an existing artifact.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| db_err("failed to open vulnerability database", e))?;
        Ok(Self::new(conn))
    }

    /// Open an in-memory session (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| db_err("failed to create in-memory database", e))?;
        Ok(Self::new(conn))
    }

    /// Direct access to the underlying connection for query code that builds
    /// its own SQL.
    pub fn raw(&self) -> &Connection {
        &self.conn
    }

    /// Total number of rows inserted through this session.
    pub fn total_insert_count(&self) -> i64 {
        self.total_insert_count
    }

    /// Execute a batch of SQL statements (schema creation).
    pub fn exec_batch(&mut self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| db_err("failed to execute batch", e))
    }

    // === Transaction management ===

    /// Commit the current transaction (if any) and begin a fresh one.
    /// Session caches are dropped with the transaction.
    pub fn commit_and_restart(&mut self) -> Result<()> {
        if self.in_tx {
            self.conn
                .execute_batch("COMMIT")
                .map_err(|e| db_err("failed to commit", e))?;
            self.in_tx = false;
        }

        self.conn
            .execute_batch("BEGIN")
            .map_err(|e| db_err("failed to begin transaction", e))?;
        self.in_tx = true;

        self.cve_cache.clear();
        self.product_cache.clear();
        self.vendor_cache.clear();
        Ok(())
    }

    /// Commit the current transaction, if one is open.
    pub fn commit(&mut self) -> Result<()> {
        if self.in_tx {
            self.conn
                .execute_batch("COMMIT")
                .map_err(|e| db_err("failed to commit", e))?;
            self.in_tx = false;
        }
        Ok(())
    }

    /// Commit and close the session.
    pub fn commit_and_close(mut self) -> Result<()> {
        self.commit()?;
        self.conn
            .close()
            .map_err(|(_, e)| db_err("failed to close database", e))
    }

    /// Close the session; an open transaction is rolled back.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| db_err("failed to close database", e))
    }

    /// Called before every insert: recycles the transaction at the commit
    /// threshold.
    fn before_insert(&mut self) -> Result<()> {
        if !self.in_tx || self.insert_count == INSERT_COMMIT_THRESHOLD {
            self.insert_count = 0;
            self.commit_and_restart()?;
        }
        Ok(())
    }

    /// Called after every insert: tracks counts and reports speed.
    fn after_insert(&mut self) {
        self.insert_count += 1;
        self.total_insert_count += 1;

        if self.print_stats && self.total_insert_count % INSERT_STATS_THRESHOLD == 0 {
            let secs = self.started_at.elapsed().as_secs_f64();
            debug!("{} insertions in {:.0} seconds", self.total_insert_count, secs);
            debug!(
                "[insertion speed: {:.1} inserts/sec]",
                self.total_insert_count as f64 / secs
            );
        }
    }

    // === Inserts ===

    /// Insert an advisory; the generated row id is written back to
    /// `advisory.id`.
    pub fn insert_advisory(&mut self, advisory: &mut Advisory) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO nvd_cve_advisories (cve_id, summary, published_at, last_modified_at, \
                 cvss2_base_score, cvss2_access_vector, cvss2_access_complexity, cvss2_authentication, \
                 cvss2_confidentiality_impact, cvss3_base_score, cvss3_attack_complexity, \
                 cvss3_attack_vector, cvss3_availability_impact, cvss3_confidentiality_impact, \
                 cvss3_integrity_impact, cvss3_privileges_required, cvss3_scope, cvss3_user_interaction, \
                 cvss3_vector_string, cvss3_exploitability_score, vendor_ref_url, has_patch, report_confirmed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23)",
                params![
                    advisory.cve_id,
                    advisory.summary,
                    advisory.published_at,
                    advisory.last_modified_at,
                    advisory.cvss2_base_score,
                    advisory.cvss2_access_vector,
                    advisory.cvss2_access_complexity,
                    advisory.cvss2_authentication,
                    advisory.cvss2_confidentiality_impact,
                    advisory.cvss3_base_score,
                    advisory.cvss3_attack_complexity,
                    advisory.cvss3_attack_vector,
                    advisory.cvss3_availability_impact,
                    advisory.cvss3_confidentiality_impact,
                    advisory.cvss3_integrity_impact,
                    advisory.cvss3_privileges_required,
                    advisory.cvss3_scope,
                    advisory.cvss3_user_interaction,
                    advisory.cvss3_vector_string,
                    advisory.cvss3_exploitability_score,
                    advisory.vendor_ref_url,
                    advisory.has_patch,
                    advisory.report_confirmed,
                ],
            )
            .map_err(|e| db_err("failed to insert advisory", e))?;
        advisory.id = self.conn.last_insert_rowid();
        self.after_insert();
        Ok(())
    }

    /// Insert a vendor; the generated row id is written back.
    pub fn insert_vendor(&mut self, vendor: &mut Vendor) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute("INSERT INTO vulndb_vendors (name) VALUES (?1)", params![vendor.name])
            .map_err(|e| db_err("failed to insert vendor", e))?;
        vendor.id = self.conn.last_insert_rowid();
        self.after_insert();
        Ok(())
    }

    /// Insert a product; the generated row id is written back.
    pub fn insert_product(&mut self, product: &mut Product) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vulndb_products (vendor_id, product_name) VALUES (?1, ?2)",
                params![product.vendor_id, product.product_name],
            )
            .map_err(|e| db_err("failed to insert product", e))?;
        product.id = self.conn.last_insert_rowid();
        self.after_insert();
        Ok(())
    }

    /// Insert a product item; the generated row id is written back.
    pub fn insert_product_item(&mut self, item: &mut ProductItem) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vulndb_product_items (product_id, systype, version, \
                 version_start_excluding, version_start_including, version_end_excluding, \
                 version_end_including, sw_target, patch) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    item.product_id,
                    item.systype,
                    item.version,
                    item.version_start_excluding,
                    item.version_start_including,
                    item.version_end_excluding,
                    item.version_end_including,
                    item.sw_target,
                    item.patch,
                ],
            )
            .map_err(|e| db_err("failed to insert product item", e))?;
        item.id = self.conn.last_insert_rowid();
        self.after_insert();
        Ok(())
    }

    /// Insert a vulnerability row connecting a product item to an advisory.
    pub fn insert_vulnerability(&mut self, product_item_id: i64, advisory_id: i64) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vulndb_vulnerabilities (product_item_id, advisory_id) VALUES (?1, ?2)",
                params![product_item_id, advisory_id],
            )
            .map_err(|e| db_err("failed to insert vulnerability", e))?;
        self.after_insert();
        Ok(())
    }

    /// Insert a vendor alias.
    pub fn insert_vendor_alias(&mut self, alias: &VendorAlias) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vulndb_vendor_aliases (vendor_id, alias) VALUES (?1, ?2)",
                params![alias.vendor_id, alias.alias],
            )
            .map_err(|e| db_err("failed to insert vendor alias", e))?;
        self.after_insert();
        Ok(())
    }

    /// Insert a product alias.
    pub fn insert_product_alias(&mut self, alias: &ProductAlias) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vulndb_product_aliases (product_id, vendor_alias, product_alias) \
                 VALUES (?1, ?2, ?3)",
                params![alias.product_id, alias.vendor_alias, alias.product_alias],
            )
            .map_err(|e| db_err("failed to insert product alias", e))?;
        self.after_insert();
        Ok(())
    }

    /// Insert an ignore-list item.
    pub fn insert_ignore_item(&mut self, item: &IgnoreListItem) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vulndb_ignore_list (vendor_name, product_name_glob) VALUES (?1, ?2)",
                params![item.vendor_name, item.product_name_glob],
            )
            .map_err(|e| db_err("failed to insert ignore item", e))?;
        self.after_insert();
        Ok(())
    }

    /// Insert a platform/vulnerability link.
    pub fn insert_platform_vulnerability(&mut self, pv: &PlatformVulnerability) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO platform_vulnerabilities (platform_id, vulnerability_id, source) \
                 VALUES (?1, ?2, ?3)",
                params![pv.platform_id, pv.vulnerability_id, pv.source],
            )
            .map_err(|e| db_err("failed to insert platform vulnerability", e))?;
        self.after_insert();
        Ok(())
    }

    /// Insert a Windows 10 release row.
    pub fn insert_windows10_version(&mut self, version: &Windows10Version) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO windows10_versions (version, os_build, availability_date) \
                 VALUES (?1, ?2, ?3)",
                params![version.version, version.os_build, version.availability_date],
            )
            .map_err(|e| db_err("failed to insert windows10 version", e))?;
        self.after_insert();
        Ok(())
    }

    /// Insert a vendor CVSS entry (tracked by the vendor advisory
    /// crawlers); the generated row id is written back.
    pub fn insert_vendor_cvss_entry(&mut self, entry: &mut VendorCvssEntry) -> Result<()> {
        self.before_insert()?;
        self.conn
            .execute(
                "INSERT INTO vendor_cvss_entries (cve_id, created_at, last_crawled_at, \
                 last_modified_at, cvss3_vector_string, source) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    entry.cve_id,
                    entry.created_at,
                    entry.last_crawled_at,
                    entry.last_modified_at,
                    entry.cvss3_vector_string,
                    entry.source,
                ],
            )
            .map_err(|e| db_err("failed to insert vendor CVSS entry", e))?;
        entry.id = self.conn.last_insert_rowid();
        self.after_insert();
        Ok(())
    }

    // === Queries ===

    /// Vendor CVSS entries recorded for a CVE id.
    pub fn vendor_cvss_entries_by_cve(&self, cve: &str) -> Result<Vec<VendorCvssEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM vendor_cvss_entries WHERE cve_id = ?1",
                VendorCvssEntry::COLUMNS
            ))
            .map_err(|e| db_err("failed to prepare vendor CVSS query", e))?;
        let rows = stmt
            .query_map(params![cve], VendorCvssEntry::from_row)
            .map_err(|e| db_err("failed to query vendor CVSS entries", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read vendor CVSS entries", e))
    }

    /// Look up a vendor by canonical name (exact, case-sensitive).
    pub fn vendor_by_name(&self, name: &str) -> Result<Option<Vendor>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM vulndb_vendors WHERE name = ?1", Vendor::COLUMNS),
                params![name],
                Vendor::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query vendor", e))
    }

    /// Look up a vendor alias by exact alias string.
    pub fn vendor_alias_by_alias(&self, alias: &str) -> Result<Option<VendorAlias>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM vulndb_vendor_aliases WHERE alias = ?1",
                    VendorAlias::COLUMNS
                ),
                params![alias],
                VendorAlias::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query vendor alias", e))
    }

    /// Return a vendor by id through the session cache.
    pub fn vendor_by_id(&mut self, vendor_id: i64) -> Result<Option<Vendor>> {
        if let Some(cached) = self.vendor_cache.get(&vendor_id) {
            return Ok(cached.clone());
        }
        let vendor = self
            .conn
            .query_row(
                &format!("SELECT {} FROM vulndb_vendors WHERE id = ?1", Vendor::COLUMNS),
                params![vendor_id],
                Vendor::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query vendor", e))?;
        if vendor.is_none() {
            debug!("vendor id {} missing - skipping", vendor_id);
        }
        self.vendor_cache.insert(vendor_id, vendor.clone());
        Ok(vendor)
    }

    /// Return a product by id through the session cache.
    pub fn product_by_id(&mut self, product_id: i64) -> Result<Option<Product>> {
        if let Some(cached) = self.product_cache.get(&product_id) {
            return Ok(cached.clone());
        }
        let product = self
            .conn
            .query_row(
                &format!("SELECT {} FROM vulndb_products WHERE id = ?1", Product::COLUMNS),
                params![product_id],
                Product::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query product", e))?;
        if product.is_none() {
            debug!("product id {} missing - skipping", product_id);
        }
        self.product_cache.insert(product_id, product.clone());
        Ok(product)
    }

    /// Look up a product by vendor id and product name.
    pub fn product_by_vendor_and_name(
        &self,
        vendor_id: i64,
        product_name: &str,
    ) -> Result<Option<Product>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM vulndb_products WHERE vendor_id = ?1 AND product_name = ?2",
                    Product::COLUMNS
                ),
                params![vendor_id, product_name],
                Product::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query product", e))
    }

    /// Find products under a vendor whose name is in `names`.
    pub fn find_products_by_names(&self, vendor_id: i64, names: &[String]) -> Result<Vec<Product>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM vulndb_products WHERE vendor_id = ? AND {}",
            Product::COLUMNS,
            in_clause("product_name", names.len())
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| db_err("failed to prepare product query", e))?;
        let mut values: Vec<Value> = vec![Value::Integer(vendor_id)];
        values.extend(names.iter().map(|name| Value::Text(name.clone())));
        let rows = stmt
            .query_map(params_from_iter(values), Product::from_row)
            .map_err(|e| db_err("failed to query products", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read products", e))
    }

    /// Look up a product alias where the vendor alias matches exactly and
    /// `title` matches the stored GLOB pattern.
    pub fn find_product_alias_match(
        &self,
        publisher: &str,
        title: &str,
    ) -> Result<Option<ProductAlias>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM vulndb_product_aliases \
                     WHERE vendor_alias = ?1 AND ?2 GLOB product_alias",
                    ProductAlias::COLUMNS
                ),
                params![publisher, title],
                ProductAlias::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query product alias", e))
    }

    /// Load product items for a set of products and a systype
    /// (case-insensitive).
    pub fn find_product_items(
        &self,
        product_ids: &[i64],
        systype: &str,
    ) -> Result<Vec<ProductItem>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM vulndb_product_items WHERE {} AND LOWER(systype) = LOWER(?)",
            ProductItem::COLUMNS,
            in_clause("product_id", product_ids.len())
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| db_err("failed to prepare product item query", e))?;
        let mut values: Vec<Value> = product_ids.iter().map(|id| Value::Integer(*id)).collect();
        values.push(Value::Text(systype.to_string()));
        let rows = stmt
            .query_map(params_from_iter(values), ProductItem::from_row)
            .map_err(|e| db_err("failed to query product items", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read product items", e))
    }

    /// Find an existing product item equal to `item` on systype, product and
    /// every constraint column that is set.
    pub fn find_product_item_matching(&self, item: &ProductItem) -> Result<Option<ProductItem>> {
        let mut sql = format!(
            "SELECT {} FROM vulndb_product_items WHERE product_id = ? AND systype = ?",
            ProductItem::COLUMNS
        );
        let mut values: Vec<Value> = vec![
            Value::Integer(item.product_id),
            Value::Text(item.systype.clone()),
        ];

        if let Some(version) = &item.version {
            if version != "*" {
                sql.push_str(" AND version = ?");
                values.push(Value::Text(version.clone()));
            }
        }
        if let Some(v) = &item.version_start_excluding {
            sql.push_str(" AND version_start_excluding = ?");
            values.push(Value::Text(v.clone()));
        }
        if let Some(v) = &item.version_start_including {
            sql.push_str(" AND version_start_including = ?");
            values.push(Value::Text(v.clone()));
        }
        if let Some(v) = &item.version_end_excluding {
            sql.push_str(" AND version_end_excluding = ?");
            values.push(Value::Text(v.clone()));
        }
        if let Some(v) = &item.version_end_including {
            sql.push_str(" AND version_end_including = ?");
            values.push(Value::Text(v.clone()));
        }
        if !item.patch.is_empty() && item.patch != "*" {
            sql.push_str(" AND patch = ?");
            values.push(Value::Text(item.patch.clone()));
        }

        self.conn
            .query_row(&sql, params_from_iter(values), ProductItem::from_row)
            .optional()
            .map_err(|e| db_err("failed to query product item", e))
    }

    /// Check the ignore list for a resolved vendor/product pair.
    pub fn is_ignored(&self, vendor_name: &str, product_name: &str) -> Result<bool> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM vulndb_ignore_list \
                 WHERE vendor_name = ?1 AND ?2 GLOB product_name_glob",
                params![vendor_name, product_name],
                |row| row.get(0),
            )
            .map_err(|e| db_err("failed to query ignore list", e))?;
        Ok(count > 0)
    }

    /// Load vulnerability rows for a set of product items, returning
    /// `(product_item_id, advisory_id)` pairs.
    pub fn find_vulnerabilities(&self, product_item_ids: &[i64]) -> Result<Vec<(i64, i64)>> {
        if product_item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT product_item_id, advisory_id FROM vulndb_vulnerabilities WHERE {}",
            in_clause("product_item_id", product_item_ids.len())
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| db_err("failed to prepare vulnerability query", e))?;
        let rows = stmt
            .query_map(params_from_iter(product_item_ids.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .map_err(|e| db_err("failed to query vulnerabilities", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read vulnerabilities", e))
    }

    /// Load advisories by id ordered by CVSS3 base score descending.
    pub fn find_advisories_ranked(&self, advisory_ids: &[i64]) -> Result<Vec<Advisory>> {
        if advisory_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM nvd_cve_advisories WHERE {} ORDER BY cvss3_base_score DESC",
            Advisory::COLUMNS,
            in_clause("id", advisory_ids.len())
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| db_err("failed to prepare advisory query", e))?;
        let rows = stmt
            .query_map(params_from_iter(advisory_ids.iter()), Advisory::from_row)
            .map_err(|e| db_err("failed to query advisories", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read advisories", e))
    }

    /// Look up an advisory by CVE id, case-insensitively.
    pub fn advisory_by_cve(&self, cve: &str) -> Result<Option<Advisory>> {
        self.conn
            .query_row(
                &format!(
                    "SELECT {} FROM nvd_cve_advisories WHERE LOWER(cve_id) = LOWER(?1)",
                    Advisory::COLUMNS
                ),
                params![cve],
                Advisory::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query advisory", e))
    }

    /// Look up an advisory by exact CVE id.
    pub fn advisory_by_cve_exact(&self, cve: &str) -> Result<Option<Advisory>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM nvd_cve_advisories WHERE cve_id = ?1", Advisory::COLUMNS),
                params![cve],
                Advisory::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query advisory", e))
    }

    /// Map of all advisory CVE ids to row ids.
    pub fn advisory_ids_by_cve(&self) -> Result<HashMap<String, i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT cve_id, id FROM nvd_cve_advisories")
            .map_err(|e| db_err("failed to prepare advisory id query", e))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| db_err("failed to query advisory ids", e))?;
        rows.collect::<rusqlite::Result<HashMap<_, _>>>()
            .map_err(|e| db_err("failed to read advisory ids", e))
    }

    /// Load all platforms.
    pub fn find_platforms(&self) -> Result<Vec<Platform>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM platforms", Platform::COLUMNS))
            .map_err(|e| db_err("failed to prepare platform query", e))?;
        let rows = stmt
            .query_map([], Platform::from_row)
            .map_err(|e| db_err("failed to query platforms", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read platforms", e))
    }

    /// Look up a platform by display name.
    pub fn platform_by_display_name(&self, display_name: &str) -> Result<Option<Platform>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM platforms WHERE display_name = ?1", Platform::COLUMNS),
                params![display_name],
                Platform::from_row,
            )
            .optional()
            .map_err(|e| db_err("failed to query platform", e))
    }

    /// Load all platform/vulnerability links.
    pub fn find_platform_vulnerabilities(&self) -> Result<Vec<PlatformVulnerability>> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM platform_vulnerabilities",
                PlatformVulnerability::COLUMNS
            ))
            .map_err(|e| db_err("failed to prepare platform vulnerability query", e))?;
        let rows = stmt
            .query_map([], PlatformVulnerability::from_row)
            .map_err(|e| db_err("failed to query platform vulnerabilities", e))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| db_err("failed to read platform vulnerabilities", e))
    }

    // === Match result cache ===

    /// Cached CVE matches for a query signature.
    pub fn cached_matches(&self, key: &str) -> Option<&Vec<CveMatch>> {
        self.cve_cache.get(key)
    }

    /// Store CVE matches for a query signature.
    pub fn store_matches(&mut self, key: String, matches: Vec<CveMatch>) {
        self.cve_cache.insert(key, matches);
    }
}
