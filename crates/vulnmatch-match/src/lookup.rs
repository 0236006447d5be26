//! Product lookup queries
//!
//! Inventory tooling resolves display names and CPE URIs to the products,
//! product aliases and vendor aliases known by the artifact, using the same
//! resolution chain as the matcher.

use crate::resolver;
use rusqlite::params_from_iter;
use tracing::debug;
use vulnmatch_cpe::parse_cpe;
use vulnmatch_core::{Error, Result};
use vulnmatch_db::session::in_clause;
use vulnmatch_db::Session;

/// Products and aliases resolved for a lookup.
#[derive(Debug, Clone, Default)]
pub struct ProductLookup {
    /// True if matched on a product alias
    pub alias_match: bool,
    /// True if matched via the CPE-friendly name
    pub cpe_friendly_match: bool,
    /// Set if matched via the CPE-friendly name
    pub cpe_friendly_name: String,
    pub products: Vec<ProductListing>,
    pub aliases: Vec<ProductAliasListing>,
    pub vendor_aliases: Vec<String>,
}

/// One resolved product row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub vendor_name: String,
    pub product_name: String,
    pub product_id: i64,
}

/// One product alias attached to a resolved product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAliasListing {
    pub product_id: i64,
    pub product_name: String,
    pub vendor_name: String,
    pub vendor_alias: String,
    pub product_alias: String,
}

/// Resolve products by display strings, the same way `match_cves` does.
/// Returns `None` when nothing resolves.
pub fn find_products_by_titles(
    session: &mut Session,
    publisher: &str,
    title: &str,
) -> Result<Option<ProductLookup>> {
    let resolution = resolver::match_product(session, publisher, title)?;
    if resolution.product_ids.is_empty() {
        return Ok(None);
    }

    let mut lookup = populate(session, &resolution.product_ids)?;
    lookup.alias_match = resolution.alias_match;
    lookup.cpe_friendly_match = resolution.cpe_friendly_match;
    lookup.cpe_friendly_name = resolution.cpe_friendly_name;
    Ok(Some(lookup))
}

/// Resolve products from a CPE URI (ignoring version). Returns `None` when
/// nothing resolves.
pub fn find_products_by_cpe(session: &mut Session, cpe: &str) -> Result<Option<ProductLookup>> {
    let parts = parse_cpe(cpe).map_err(|e| {
        debug!("CPE parse error: {}", e);
        Error::Parse(format!("invalid CPE '{}': {}", cpe, e))
    })?;

    let mut product_ids: Vec<i64> = Vec::new();
    let mut alias_match = false;

    if let Some(alias) = session.find_product_alias_match(&parts.vendor, &parts.product)? {
        alias_match = true;
        product_ids.push(alias.product_id);
    }

    if product_ids.is_empty() {
        let vendor = match resolver::get_vendor(session, &parts.vendor)? {
            Some(vendor) => vendor,
            None => return Ok(None),
        };

        let candidates = vec![parts.product.clone()];
        for product in session.find_products_by_names(vendor.id, &candidates)? {
            product_ids.push(product.id);
        }
    }

    if product_ids.is_empty() {
        return Ok(None);
    }

    let mut lookup = populate(session, &product_ids)?;
    lookup.alias_match = alias_match;
    Ok(Some(lookup))
}

/// Load the listing rows for a set of resolved product ids.
fn populate(session: &Session, product_ids: &[i64]) -> Result<ProductLookup> {
    let conn = session.raw();
    let mut lookup = ProductLookup::default();

    let sql = format!(
        "SELECT vv.name, vp.product_name, vp.id \
         FROM vulndb_products vp \
         INNER JOIN vulndb_vendors vv ON vv.id = vp.vendor_id \
         WHERE {}",
        in_clause("vp.id", product_ids.len())
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::Database(format!("failed to prepare product listing: {}", e)))?;
    let rows = stmt
        .query_map(params_from_iter(product_ids.iter()), |row| {
            Ok(ProductListing {
                vendor_name: row.get(0)?,
                product_name: row.get(1)?,
                product_id: row.get(2)?,
            })
        })
        .map_err(|e| Error::Database(format!("failed to query product listing: {}", e)))?;
    lookup.products = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::Database(format!("failed to read product listing: {}", e)))?;

    let sql = format!(
        "SELECT vpa.product_id, vp.product_name, vv.name, vpa.vendor_alias, vpa.product_alias \
         FROM vulndb_product_aliases vpa \
         INNER JOIN vulndb_products vp ON vp.id = vpa.product_id \
         INNER JOIN vulndb_vendors vv ON vv.id = vp.vendor_id \
         WHERE {}",
        in_clause("vpa.product_id", product_ids.len())
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::Database(format!("failed to prepare alias listing: {}", e)))?;
    let rows = stmt
        .query_map(params_from_iter(product_ids.iter()), |row| {
            Ok(ProductAliasListing {
                product_id: row.get(0)?,
                product_name: row.get(1)?,
                vendor_name: row.get(2)?,
                vendor_alias: row.get(3)?,
                product_alias: row.get(4)?,
            })
        })
        .map_err(|e| Error::Database(format!("failed to query alias listing: {}", e)))?;
    lookup.aliases = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::Database(format!("failed to read alias listing: {}", e)))?;

    let sql = format!(
        "SELECT vva.alias \
         FROM vulndb_vendor_aliases vva \
         INNER JOIN vulndb_vendors vv ON vv.id = vva.vendor_id \
         INNER JOIN vulndb_products vp ON vp.vendor_id = vv.id \
         WHERE {} \
         GROUP BY vv.id, vv.name, vva.alias",
        in_clause("vp.id", product_ids.len())
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::Database(format!("failed to prepare vendor alias listing: {}", e)))?;
    let rows = stmt
        .query_map(params_from_iter(product_ids.iter()), |row| row.get::<_, String>(0))
        .map_err(|e| Error::Database(format!("failed to query vendor alias listing: {}", e)))?;
    lookup.vendor_aliases = rows
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::Database(format!("failed to read vendor alias listing: {}", e)))?;

    Ok(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vulnmatch_db::{schema, Product, ProductAlias, Vendor, VendorAlias};

    fn session_with_catalog() -> Session {
        let mut session = Session::open_in_memory().unwrap();
        schema::create_schema(session.raw()).unwrap();

        let mut vendor = Vendor { id: 0, name: "videolan".into() };
        session.insert_vendor(&mut vendor).unwrap();
        session
            .insert_vendor_alias(&VendorAlias {
                vendor_id: vendor.id,
                alias: "VideoLAN".into(),
            })
            .unwrap();

        let mut product = Product {
            id: 0,
            vendor_id: vendor.id,
            product_name: "vlc_media_player".into(),
        };
        session.insert_product(&mut product).unwrap();
        session
            .insert_product_alias(&ProductAlias {
                product_id: product.id,
                vendor_alias: "VideoLAN".into(),
                product_alias: "VLC media player*".into(),
            })
            .unwrap();

        session
    }

    #[test]
    fn test_find_products_by_titles() {
        let mut session = session_with_catalog();

        let lookup = find_products_by_titles(&mut session, "VideoLAN", "VLC media player")
            .unwrap()
            .unwrap();
        assert!(lookup.alias_match);
        assert_eq!(lookup.products.len(), 1);
        assert_eq!(lookup.products[0].product_name, "vlc_media_player");
        assert_eq!(lookup.aliases.len(), 1);
        assert_eq!(lookup.vendor_aliases, vec!["VideoLAN".to_string()]);

        assert!(find_products_by_titles(&mut session, "Nobody", "Nothing")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_find_products_by_cpe() {
        let mut session = session_with_catalog();

        let lookup = find_products_by_cpe(
            &mut session,
            "cpe:2.3:a:videolan:vlc_media_player:3.0.0:*:*:*:*:*:*:*",
        )
        .unwrap()
        .unwrap();
        assert!(!lookup.alias_match);
        assert_eq!(lookup.products.len(), 1);
        assert_eq!(lookup.products[0].vendor_name, "videolan");

        assert!(find_products_by_cpe(&mut session, "cpe:/a:acme:unknown")
            .unwrap()
            .is_none());
    }
}
