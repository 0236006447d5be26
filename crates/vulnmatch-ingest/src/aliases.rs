//! Vendor/product alias and ignore-list ingestion
//!
//! The alias tables are maintained by hand as XML:
//!
//! ```xml
//! <vendor-aliases>
//!   <vendor-alias for="microsoft">Microsoft Corporation</vendor-alias>
//! </vendor-aliases>
//!
//! <product-aliases>
//!   <product vendor="google" product="chrome">
//!     <alias vendor="Google Inc." product="Google Chrome*"/>
//!   </product>
//! </product-aliases>
//!
//! <ignore-list>
//!   <ignore vendor="oracle" product="jdk*"/>
//! </ignore-list>
//! ```
//!
//! Aliases reference vendors/products that must already exist from the CVE
//! ingestion; a dangling reference fails the build.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;
use vulnmatch_core::{Error, Result};
use vulnmatch_db::{IgnoreListItem, ProductAlias, Session, VendorAlias};

/// One `<vendor-alias>` record.
#[derive(Debug, Clone, PartialEq)]
pub struct VendorAliasRecord {
    /// Canonical vendor name the alias points at
    pub for_vendor: String,
    /// Raw inventory vendor string
    pub alias: String,
}

/// One `<product>` record with its aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductAliasRecord {
    pub vendor: String,
    pub product: String,
    pub aliases: Vec<ProductAliasEntry>,
}

/// One `<alias>` under a product: exact vendor string, GLOB product pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductAliasEntry {
    pub vendor: String,
    pub product: String,
}

/// One `<ignore>` record.
#[derive(Debug, Clone, PartialEq)]
pub struct IgnoreRecord {
    pub vendor: String,
    pub product_glob: String,
}

fn xml_err(e: quick_xml::Error) -> Error {
    Error::Parse(format!("XML error: {}", e))
}

fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| Error::Parse(format!("XML attribute error: {}", e)))?;
        if attr.key.as_ref() == name {
            let value = attr
                .unescape_value()
                .map_err(xml_err)?
                .into_owned();
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn required_attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<String> {
    attribute(element, name)?.ok_or_else(|| {
        Error::Parse(format!(
            "missing '{}' attribute on <{}>",
            String::from_utf8_lossy(name),
            String::from_utf8_lossy(element.name().as_ref())
        ))
    })
}

/// Parse vendor aliases XML.
pub fn read_vendor_aliases(xml: &str) -> Result<Vec<VendorAliasRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<String> = None;
    let mut text = String::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.name().as_ref() == b"vendor-alias" => {
                current = Some(required_attribute(&e, b"for")?);
                text.clear();
            }
            Event::Text(t) => {
                if current.is_some() {
                    text.push_str(&t.unescape().map_err(xml_err)?);
                }
            }
            Event::End(e) if e.name().as_ref() == b"vendor-alias" => {
                if let Some(for_vendor) = current.take() {
                    records.push(VendorAliasRecord {
                        for_vendor,
                        alias: text.trim().to_string(),
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Parse product aliases XML.
pub fn read_product_aliases(xml: &str) -> Result<Vec<ProductAliasRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = Vec::new();
    let mut current: Option<ProductAliasRecord> = None;

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) if e.name().as_ref() == b"product" => {
                current = Some(ProductAliasRecord {
                    vendor: required_attribute(&e, b"vendor")?,
                    product: required_attribute(&e, b"product")?,
                    aliases: Vec::new(),
                });
            }
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"alias" => {
                if let Some(record) = current.as_mut() {
                    record.aliases.push(ProductAliasEntry {
                        vendor: required_attribute(&e, b"vendor")?,
                        product: required_attribute(&e, b"product")?,
                    });
                }
            }
            Event::End(e) if e.name().as_ref() == b"product" => {
                if let Some(record) = current.take() {
                    records.push(record);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Parse ignore-list XML.
pub fn read_ignore_list(xml: &str) -> Result<Vec<IgnoreRecord>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut records = Vec::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"ignore" => {
                records.push(IgnoreRecord {
                    vendor: required_attribute(&e, b"vendor")?,
                    product_glob: required_attribute(&e, b"product")?,
                });
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}

/// Insert vendor aliases; every alias must reference an existing vendor.
pub fn ingest_vendor_aliases(
    session: &mut Session,
    records: &[VendorAliasRecord],
) -> Result<()> {
    for record in records {
        let vendor = session.vendor_by_name(&record.for_vendor)?.ok_or_else(|| {
            debug!("vendor '{}' not present", record.for_vendor);
            Error::MissingReference {
                entity: "vendor",
                name: record.for_vendor.clone(),
            }
        })?;

        session.insert_vendor_alias(&VendorAlias {
            vendor_id: vendor.id,
            alias: record.alias.clone(),
        })?;
    }
    Ok(())
}

/// Insert product aliases; vendor and product must already exist.
pub fn ingest_product_aliases(
    session: &mut Session,
    records: &[ProductAliasRecord],
) -> Result<()> {
    for record in records {
        let vendor = session.vendor_by_name(&record.vendor)?.ok_or_else(|| {
            debug!("vendor '{}' not present", record.vendor);
            Error::MissingReference {
                entity: "vendor",
                name: record.vendor.clone(),
            }
        })?;

        let product = session
            .product_by_vendor_and_name(vendor.id, &record.product)?
            .ok_or_else(|| {
                debug!("product '{}' not present", record.product);
                Error::MissingReference {
                    entity: "product",
                    name: record.product.clone(),
                }
            })?;

        for alias in &record.aliases {
            session.insert_product_alias(&ProductAlias {
                product_id: product.id,
                vendor_alias: alias.vendor.clone(),
                product_alias: alias.product.clone(),
            })?;
        }
    }
    Ok(())
}

/// Insert ignore-list records.
pub fn ingest_ignore_list(session: &mut Session, records: &[IgnoreRecord]) -> Result<()> {
    for record in records {
        session.insert_ignore_item(&IgnoreListItem {
            vendor_name: record.vendor.clone(),
            product_name_glob: record.product_glob.clone(),
        })?;
    }
    Ok(())
}
